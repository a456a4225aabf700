//! Database schemas for Mission Ledger
//!
//! Documents keep the camelCase field names of the existing `playerdatas` and
//! `settings` collections so records written by earlier deployments load as-is.

mod metadata;
mod player;
mod ruleset;

pub use metadata::Metadata;
pub use player::{MissionSlotDoc, PlayerDoc, PLAYER_COLLECTION};
pub use ruleset::{MissionDefinitionDoc, RulesetDoc, RULESET_COLLECTION};
