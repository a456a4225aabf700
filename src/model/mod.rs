//! Domain model shared by the engine, the services and the stores

mod outcome;
mod player;
mod ruleset;

pub use outcome::{Outcome, OutcomeCode};
pub use player::{MissionSlot, PlayerRecord, EMPTY_MISSION_ID};
pub use ruleset::{select_latest_compatible, MissionDefinition, RulesetVersion};
