//! Ruleset (game settings) document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::model::{MissionDefinition, RulesetVersion};

/// Collection name for published rulesets
pub const RULESET_COLLECTION: &str = "settings";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MissionDefinitionDoc {
    pub id: i32,
    #[serde(rename = "type", default)]
    pub kind: i32,
    pub target: i64,
}

/// Ruleset document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RulesetDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    pub version: i64,

    #[serde(default)]
    pub missions: Vec<MissionDefinitionDoc>,

    #[serde(default)]
    pub mission_gem_reward: i64,

    #[serde(default)]
    pub mission_cooldown_minutes: i64,
}

impl From<&RulesetVersion> for RulesetDoc {
    fn from(ruleset: &RulesetVersion) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name: ruleset.name.clone(),
            version: ruleset.version,
            missions: ruleset
                .missions
                .iter()
                .map(|m| MissionDefinitionDoc {
                    id: m.id,
                    kind: m.kind,
                    target: m.target,
                })
                .collect(),
            mission_gem_reward: ruleset.mission_gem_reward,
            mission_cooldown_minutes: ruleset.mission_cooldown_minutes,
        }
    }
}

impl From<RulesetDoc> for RulesetVersion {
    fn from(doc: RulesetDoc) -> Self {
        Self {
            version: doc.version,
            name: doc.name,
            missions: doc
                .missions
                .into_iter()
                .map(|m| MissionDefinition {
                    id: m.id,
                    kind: m.kind,
                    target: m.target,
                })
                .collect(),
            mission_gem_reward: doc.mission_gem_reward,
            mission_cooldown_minutes: doc.mission_cooldown_minutes,
        }
    }
}

impl IntoIndexes for RulesetDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "name": 1, "version": -1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_version_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for RulesetDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
