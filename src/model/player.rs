//! Per-player progress record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mission id marking an empty, unassigned slot
pub const EMPTY_MISSION_ID: i32 = -1;

/// One addressable mission slot held by a player.
///
/// Slots are addressed by their index in [`PlayerRecord::missions`], never by
/// mission id. `is_claimed` implies `is_completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSlot {
    pub id: i32,
    pub progress: i64,
    pub is_completed: bool,
    pub is_claimed: bool,
    pub next_mission_time: DateTime<Utc>,
}

impl MissionSlot {
    /// Empty slot available for assignment at `now`
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            id: EMPTY_MISSION_ID,
            progress: 0,
            is_completed: false,
            is_claimed: false,
            next_mission_time: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == EMPTY_MISSION_ID
    }

    /// Whether the slot may take a new mission at `now`
    pub fn is_reassignable(&self, now: DateTime<Utc>) -> bool {
        self.is_empty() || (self.is_claimed && now >= self.next_mission_time)
    }
}

/// Mutable per-player state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Stable player identity
    pub player_id: String,
    pub high_score: i64,
    /// Currency balance, never negative
    pub gem: i64,
    /// Monotonic count of claimed missions
    pub total_mission_completed: i64,
    pub missions: Vec<MissionSlot>,
    /// Bumped on every successful write, used for conditional updates
    #[serde(default)]
    pub revision: u64,
}

impl PlayerRecord {
    /// Fresh record with `slot_count` empty slots
    pub fn new(player_id: impl Into<String>, slot_count: usize, now: DateTime<Utc>) -> Self {
        Self {
            player_id: player_id.into(),
            high_score: 0,
            gem: 0,
            total_mission_completed: 0,
            missions: vec![MissionSlot::empty(now); slot_count],
            revision: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_record_has_empty_slots() {
        let record = PlayerRecord::new("p1", 3, t0());
        assert_eq!(record.missions.len(), 3);
        assert!(record.missions.iter().all(|s| s.is_empty() && s.next_mission_time == t0()));
        assert_eq!(record.gem, 0);
        assert_eq!(record.revision, 0);
    }

    #[test]
    fn test_reassignable_after_cooldown() {
        let mut slot = MissionSlot::empty(t0());
        assert!(slot.is_reassignable(t0()));

        slot.id = 5;
        slot.is_completed = true;
        slot.is_claimed = true;
        slot.next_mission_time = t0() + Duration::minutes(60);
        assert!(!slot.is_reassignable(t0()));
        assert!(slot.is_reassignable(t0() + Duration::minutes(60)));
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let record = PlayerRecord::new("p1", 1, t0());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["playerId"], "p1");
        assert_eq!(json["totalMissionCompleted"], 0);
        assert_eq!(json["missions"][0]["id"], -1);
        assert_eq!(json["missions"][0]["isClaimed"], false);
        assert!(json["missions"][0]["nextMissionTime"].is_string());
    }
}
