//! Document store seams
//!
//! The services only see these traits. `MemoryStore` backs dev mode and tests;
//! `MongoPlayerStore` / `MongoRulesetSource` back production.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::{MongoPlayerStore, MongoRulesetSource};

use crate::model::{PlayerRecord, RulesetVersion};
use crate::types::Result;

/// Persistence for player records
#[async_trait::async_trait]
pub trait PlayerStore: Send + Sync {
    /// Load a record by player identity
    async fn find(&self, player_id: &str) -> Result<Option<PlayerRecord>>;

    /// Insert a brand new record, returning it as stored
    async fn insert(&self, record: PlayerRecord) -> Result<PlayerRecord>;

    /// Replace the stored record if its revision still equals
    /// `record.revision`.
    ///
    /// On success the stored revision becomes `record.revision + 1` and the
    /// written record is returned. `None` means another writer got there first.
    async fn replace_if_current(&self, record: &PlayerRecord) -> Result<Option<PlayerRecord>>;

    /// Whether the backing store is reachable
    async fn ping(&self) -> Result<()>;
}

/// Persistence for published rulesets
#[async_trait::async_trait]
pub trait RulesetSource: Send + Sync {
    /// Highest version of `name` that is `<= version`
    async fn latest_at_or_below(&self, name: &str, version: i64) -> Result<Option<RulesetVersion>>;

    /// Store a new ruleset version; the `(name, version)` pair must be new
    async fn publish(&self, ruleset: RulesetVersion) -> Result<()>;
}
