//! In-memory document store
//!
//! Each player entry is updated under its `DashMap` shard lock, which gives the
//! same compare-and-set semantics as the MongoDB conditional update.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::RwLock;
use tracing::debug;

use super::{PlayerStore, RulesetSource};
use crate::model::{select_latest_compatible, PlayerRecord, RulesetVersion};
use crate::types::{LedgerError, Result};

/// Player and ruleset storage held in process memory
#[derive(Default)]
pub struct MemoryStore {
    players: DashMap<String, PlayerRecord>,
    rulesets: RwLock<Vec<RulesetVersion>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored player records
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

#[async_trait::async_trait]
impl PlayerStore for MemoryStore {
    async fn find(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        Ok(self.players.get(player_id).map(|r| r.value().clone()))
    }

    async fn insert(&self, record: PlayerRecord) -> Result<PlayerRecord> {
        match self.players.entry(record.player_id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::BadRequest(format!(
                "player {} already exists",
                record.player_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn replace_if_current(&self, record: &PlayerRecord) -> Result<Option<PlayerRecord>> {
        let Some(mut stored) = self.players.get_mut(&record.player_id) else {
            return Ok(None);
        };

        if stored.revision != record.revision {
            debug!(
                "revision mismatch for {}: stored {}, expected {}",
                record.player_id, stored.revision, record.revision
            );
            return Ok(None);
        }

        let mut written = record.clone();
        written.revision = record.revision + 1;
        *stored = written.clone();
        Ok(Some(written))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl RulesetSource for MemoryStore {
    async fn latest_at_or_below(&self, name: &str, version: i64) -> Result<Option<RulesetVersion>> {
        let rulesets = self
            .rulesets
            .read()
            .map_err(|_| LedgerError::Internal("ruleset lock poisoned".into()))?;
        Ok(select_latest_compatible(rulesets.iter().filter(|r| r.name == name), version).cloned())
    }

    async fn publish(&self, ruleset: RulesetVersion) -> Result<()> {
        let mut rulesets = self
            .rulesets
            .write()
            .map_err(|_| LedgerError::Internal("ruleset lock poisoned".into()))?;
        if rulesets
            .iter()
            .any(|r| r.name == ruleset.name && r.version == ruleset.version)
        {
            return Err(LedgerError::BadRequest(format!(
                "ruleset {} v{} already published",
                ruleset.name, ruleset.version
            )));
        }
        rulesets.push(ruleset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ruleset(name: &str, version: i64) -> RulesetVersion {
        RulesetVersion {
            version,
            name: name.into(),
            missions: vec![],
            mission_gem_reward: 10,
            mission_cooldown_minutes: 5,
        }
    }

    #[tokio::test]
    async fn test_replace_bumps_revision() {
        let store = MemoryStore::new();
        let record = store.insert(PlayerRecord::new("p", 3, Utc::now())).await.unwrap();

        let mut next = record.clone();
        next.gem = 10;
        let written = store.replace_if_current(&next).await.unwrap().unwrap();
        assert_eq!(written.revision, 1);
        assert_eq!(store.find("p").await.unwrap().unwrap().gem, 10);
    }

    #[tokio::test]
    async fn test_stale_replace_is_refused() {
        let store = MemoryStore::new();
        let record = store.insert(PlayerRecord::new("p", 3, Utc::now())).await.unwrap();

        let mut first = record.clone();
        first.gem = 1;
        let mut second = record.clone();
        second.gem = 2;

        assert!(store.replace_if_current(&first).await.unwrap().is_some());
        assert!(store.replace_if_current(&second).await.unwrap().is_none());
        assert_eq!(store.find("p").await.unwrap().unwrap().gem, 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let store = MemoryStore::new();
        store.insert(PlayerRecord::new("p", 1, Utc::now())).await.unwrap();
        assert!(store.insert(PlayerRecord::new("p", 1, Utc::now())).await.is_err());
        assert_eq!(store.player_count(), 1);
    }

    #[tokio::test]
    async fn test_rulesets_are_scoped_by_name() {
        let store = MemoryStore::new();
        store.publish(ruleset("GameSettings", 1)).await.unwrap();
        store.publish(ruleset("GameSettings", 5)).await.unwrap();
        store.publish(ruleset("Other", 3)).await.unwrap();

        let found = store.latest_at_or_below("GameSettings", 4).await.unwrap().unwrap();
        assert_eq!(found.version, 1);
        assert!(store.latest_at_or_below("Missing", 10).await.unwrap().is_none());
        assert!(store.publish(ruleset("GameSettings", 5)).await.is_err());
    }
}
