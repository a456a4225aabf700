//! Player document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::model::{MissionSlot, PlayerRecord};

/// Collection name for player records
pub const PLAYER_COLLECTION: &str = "playerdatas";

/// Mission slot as stored
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MissionSlotDoc {
    pub id: i32,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_claimed: bool,
    /// Older documents may lack this; they read as the epoch
    #[serde(default = "epoch")]
    pub next_mission_time: DateTime,
}

fn epoch() -> DateTime {
    DateTime::from_millis(0)
}

/// Player document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Creation and update stamps
    #[serde(default)]
    pub metadata: Metadata,

    pub player_id: String,

    #[serde(default)]
    pub high_score: i64,

    #[serde(default)]
    pub gem: i64,

    #[serde(default)]
    pub total_mission_completed: i64,

    #[serde(default)]
    pub missions: Vec<MissionSlotDoc>,

    /// Write counter for conditional updates; absent on legacy documents
    #[serde(default)]
    pub revision: i64,
}

impl From<&MissionSlot> for MissionSlotDoc {
    fn from(slot: &MissionSlot) -> Self {
        Self {
            id: slot.id,
            progress: slot.progress,
            is_completed: slot.is_completed,
            is_claimed: slot.is_claimed,
            next_mission_time: DateTime::from_chrono(slot.next_mission_time),
        }
    }
}

impl From<MissionSlotDoc> for MissionSlot {
    fn from(doc: MissionSlotDoc) -> Self {
        Self {
            id: doc.id,
            progress: doc.progress,
            is_completed: doc.is_completed || doc.is_claimed,
            is_claimed: doc.is_claimed,
            next_mission_time: doc.next_mission_time.to_chrono(),
        }
    }
}

impl From<&PlayerRecord> for PlayerDoc {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            player_id: record.player_id.clone(),
            high_score: record.high_score,
            gem: record.gem,
            total_mission_completed: record.total_mission_completed,
            missions: record.missions.iter().map(MissionSlotDoc::from).collect(),
            revision: i64::try_from(record.revision).unwrap_or(i64::MAX),
        }
    }
}

impl From<PlayerDoc> for PlayerRecord {
    fn from(doc: PlayerDoc) -> Self {
        Self {
            player_id: doc.player_id,
            high_score: doc.high_score,
            gem: doc.gem.max(0),
            total_mission_completed: doc.total_mission_completed,
            missions: doc.missions.into_iter().map(MissionSlot::from).collect(),
            revision: u64::try_from(doc.revision).unwrap_or(0),
        }
    }
}

impl IntoIndexes for PlayerDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "playerId": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("player_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for PlayerDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_record_round_trips_through_doc() {
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 2, 2, 2).unwrap();
        let mut record = PlayerRecord::new("p-9", 3, now);
        record.gem = 70;
        record.revision = 4;
        record.missions[1].id = 8;
        record.missions[1].progress = 3;

        let back = PlayerRecord::from(PlayerDoc::from(&record));
        assert_eq!(back, record);
    }

    #[test]
    fn test_legacy_document_without_revision() {
        let legacy = doc! {
            "playerId": "old",
            "highScore": 10_i64,
            "gem": 5_i64,
            "totalMissionCompleted": 1_i64,
            "missions": [
                { "id": 3, "progress": 4_i64, "isCompleted": false, "isClaimed": false, "nextMissionTime": DateTime::now() }
            ],
        };
        let doc: PlayerDoc = bson::from_document(legacy).unwrap();
        let record = PlayerRecord::from(doc);
        assert_eq!(record.revision, 0);
        assert_eq!(record.missions[0].id, 3);
    }

    #[test]
    fn test_slot_without_next_mission_time_reads_as_epoch() {
        let legacy = doc! {
            "playerId": "older",
            "missions": [
                { "id": 4, "progress": 2_i64, "isCompleted": false, "isClaimed": true }
            ],
        };
        let doc: PlayerDoc = bson::from_document(legacy).unwrap();
        let record = PlayerRecord::from(doc);

        assert_eq!(record.missions[0].next_mission_time, Utc.timestamp_opt(0, 0).unwrap());
        assert!(record.missions[0].is_claimed);
    }
}
