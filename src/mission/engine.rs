//! Claim validation
//!
//! Preconditions are checked in a fixed order and the first failure wins:
//!
//! 1. slot index in bounds (`InvalidSlot`)
//! 2. slot holds the requested mission (`MissionMismatch`)
//! 3. mission exists in the resolved ruleset (`UnknownMission`)
//! 4. progress reached the target (`NotYetEligible`)
//! 5. slot not claimed yet (`AlreadyClaimed`)
//!
//! A granted claim marks the slot completed and claimed, stamps the cooldown,
//! pays the ruleset's gem reward and bumps the completion counter.

use chrono::{DateTime, Utc};

use crate::clock::add_minutes;
use crate::model::{OutcomeCode, PlayerRecord, RulesetVersion};

/// Why a claim was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimRejection {
    InvalidSlot,
    MissionMismatch,
    UnknownMission,
    NotYetEligible,
    AlreadyClaimed,
}

impl From<ClaimRejection> for OutcomeCode {
    fn from(rejection: ClaimRejection) -> Self {
        match rejection {
            ClaimRejection::InvalidSlot => OutcomeCode::InvalidSlot,
            ClaimRejection::MissionMismatch => OutcomeCode::MissionMismatch,
            ClaimRejection::UnknownMission => OutcomeCode::UnknownMission,
            ClaimRejection::NotYetEligible => OutcomeCode::NotYetEligible,
            ClaimRejection::AlreadyClaimed => OutcomeCode::AlreadyClaimed,
        }
    }
}

/// The mutated player on success, the rejection otherwise
pub type ClaimResult = Result<PlayerRecord, ClaimRejection>;

/// Decide a claim and build the post-claim record.
///
/// `player` is never modified; on success a new record is returned with the
/// same revision as the input (the store bumps it on write).
pub fn evaluate_claim(
    player: &PlayerRecord,
    slot_index: i64,
    mission_id: i32,
    ruleset: &RulesetVersion,
    now: DateTime<Utc>,
) -> ClaimResult {
    let index = usize::try_from(slot_index).map_err(|_| ClaimRejection::InvalidSlot)?;
    let slot = player.missions.get(index).ok_or(ClaimRejection::InvalidSlot)?;

    if slot.id != mission_id {
        return Err(ClaimRejection::MissionMismatch);
    }

    let definition = ruleset.mission(mission_id).ok_or(ClaimRejection::UnknownMission)?;

    if slot.progress < definition.target {
        return Err(ClaimRejection::NotYetEligible);
    }

    if slot.is_claimed {
        return Err(ClaimRejection::AlreadyClaimed);
    }

    let mut next = player.clone();
    let slot = &mut next.missions[index];
    slot.is_completed = true;
    slot.is_claimed = true;
    slot.next_mission_time = add_minutes(now, ruleset.mission_cooldown_minutes);
    next.gem = next.gem.saturating_add(ruleset.mission_gem_reward);
    next.total_mission_completed = next.total_mission_completed.saturating_add(1);

    Ok(next)
}
