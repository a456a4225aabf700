//! MongoDB-backed stores

use bson::{doc, DateTime, Document};
use tracing::debug;

use super::{PlayerStore, RulesetSource};
use crate::db::schemas::{PlayerDoc, RulesetDoc, PLAYER_COLLECTION, RULESET_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::model::{PlayerRecord, RulesetVersion};
use crate::types::{LedgerError, Result};

/// Player records in the `playerdatas` collection
pub struct MongoPlayerStore {
    mongo: MongoClient,
    players: MongoCollection<PlayerDoc>,
}

impl MongoPlayerStore {
    pub async fn new(mongo: MongoClient) -> Result<Self> {
        let players = mongo.collection::<PlayerDoc>(PLAYER_COLLECTION).await?;
        Ok(Self { mongo, players })
    }
}

/// Filter matching a player at an exact revision.
///
/// Documents written before revisions existed have no field at all and count
/// as revision 0.
fn revision_filter(player_id: &str, revision: u64) -> Result<Document> {
    let revision = i64::try_from(revision)
        .map_err(|_| LedgerError::Internal(format!("revision {} out of range", revision)))?;
    if revision == 0 {
        Ok(doc! {
            "playerId": player_id,
            "$or": [ { "revision": 0_i64 }, { "revision": { "$exists": false } } ],
        })
    } else {
        Ok(doc! { "playerId": player_id, "revision": revision })
    }
}

#[async_trait::async_trait]
impl PlayerStore for MongoPlayerStore {
    async fn find(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        let found = self.players.find_one(doc! { "playerId": player_id }).await?;
        Ok(found.map(PlayerRecord::from))
    }

    async fn insert(&self, record: PlayerRecord) -> Result<PlayerRecord> {
        let id = self.players.insert_one(PlayerDoc::from(&record)).await?;
        debug!("inserted player {} as {}", record.player_id, id);
        Ok(record)
    }

    async fn replace_if_current(&self, record: &PlayerRecord) -> Result<Option<PlayerRecord>> {
        let filter = revision_filter(&record.player_id, record.revision)?;

        let mut next = PlayerDoc::from(record);
        next.revision = next.revision.saturating_add(1);

        let mut fields = bson::to_document(&next)?;
        fields.remove("_id");
        fields.remove("metadata");
        fields.insert("metadata.updated_at", DateTime::now());

        let written = self
            .players
            .find_one_and_update(filter, doc! { "$set": fields })
            .await?;
        Ok(written.map(PlayerRecord::from))
    }

    async fn ping(&self) -> Result<()> {
        self.mongo.ping().await
    }
}

/// Published rulesets in the `settings` collection
pub struct MongoRulesetSource {
    rulesets: MongoCollection<RulesetDoc>,
}

impl MongoRulesetSource {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let rulesets = mongo.collection::<RulesetDoc>(RULESET_COLLECTION).await?;
        Ok(Self { rulesets })
    }
}

#[async_trait::async_trait]
impl RulesetSource for MongoRulesetSource {
    async fn latest_at_or_below(&self, name: &str, version: i64) -> Result<Option<RulesetVersion>> {
        let found = self
            .rulesets
            .find_latest(
                doc! { "name": name, "version": { "$lte": version } },
                doc! { "version": -1 },
            )
            .await?;
        Ok(found.map(RulesetVersion::from))
    }

    async fn publish(&self, ruleset: RulesetVersion) -> Result<()> {
        let existing = self
            .rulesets
            .find_one(doc! { "name": ruleset.name.as_str(), "version": ruleset.version })
            .await?;
        if existing.is_some() {
            return Err(LedgerError::BadRequest(format!(
                "ruleset {} v{} already published",
                ruleset.name, ruleset.version
            )));
        }
        self.rulesets.insert_one(RulesetDoc::from(&ruleset)).await?;
        Ok(())
    }
}
