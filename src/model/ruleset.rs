//! Versioned, server-authoritative mission configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::LedgerError;

/// A single mission in a ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionDefinition {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: i32,
    /// Progress required before the mission can be claimed
    pub target: i64,
}

/// Immutable published ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetVersion {
    pub version: i64,
    pub name: String,
    pub missions: Vec<MissionDefinition>,
    pub mission_gem_reward: i64,
    pub mission_cooldown_minutes: i64,
}

impl RulesetVersion {
    /// Look up a mission by id
    pub fn mission(&self, id: i32) -> Option<&MissionDefinition> {
        self.missions.iter().find(|m| m.id == id)
    }

    /// Check the ruleset is publishable
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::BadRequest("ruleset name must not be empty".into()));
        }
        if self.mission_gem_reward < 0 {
            return Err(LedgerError::BadRequest(format!(
                "ruleset {} v{}: missionGemReward must not be negative",
                self.name, self.version
            )));
        }
        if self.mission_cooldown_minutes < 0 {
            return Err(LedgerError::BadRequest(format!(
                "ruleset {} v{}: missionCooldownMinutes must not be negative",
                self.name, self.version
            )));
        }

        let mut seen = HashSet::new();
        for mission in &self.missions {
            if !seen.insert(mission.id) {
                return Err(LedgerError::BadRequest(format!(
                    "ruleset {} v{}: duplicate mission id {}",
                    self.name, self.version, mission.id
                )));
            }
            if mission.target < 0 {
                return Err(LedgerError::BadRequest(format!(
                    "ruleset {} v{}: mission {} has a negative target",
                    self.name, self.version, mission.id
                )));
            }
        }
        Ok(())
    }
}

/// Pick the highest version that does not exceed `requested`.
///
/// A client is never served a ruleset from a newer version than it reports.
pub fn select_latest_compatible<'a, I>(candidates: I, requested: i64) -> Option<&'a RulesetVersion>
where
    I: IntoIterator<Item = &'a RulesetVersion>,
{
    candidates
        .into_iter()
        .filter(|r| r.version <= requested)
        .max_by_key(|r| r.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruleset(version: i64) -> RulesetVersion {
        RulesetVersion {
            version,
            name: "GameSettings".into(),
            missions: vec![MissionDefinition { id: 5, kind: 0, target: 10 }],
            mission_gem_reward: 50,
            mission_cooldown_minutes: 60,
        }
    }

    #[test]
    fn test_select_latest_at_or_below() {
        let published = vec![ruleset(1), ruleset(4), ruleset(9)];

        assert_eq!(select_latest_compatible(&published, 4).map(|r| r.version), Some(4));
        assert_eq!(select_latest_compatible(&published, 8).map(|r| r.version), Some(4));
        assert_eq!(select_latest_compatible(&published, 100).map(|r| r.version), Some(9));
        assert!(select_latest_compatible(&published, 0).is_none());
    }

    #[test]
    fn test_select_never_returns_future_version() {
        let published = vec![ruleset(2), ruleset(3), ruleset(7)];
        for requested in 2..7 {
            let chosen = select_latest_compatible(&published, requested).unwrap();
            assert!(chosen.version <= requested);
            assert_ne!(chosen.version, 7);
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_mission_ids() {
        let mut r = ruleset(1);
        r.missions.push(MissionDefinition { id: 5, kind: 1, target: 3 });
        assert!(matches!(r.validate(), Err(LedgerError::BadRequest(_))));
    }

    #[test]
    fn test_validate_rejects_negative_reward() {
        let mut r = ruleset(1);
        r.mission_gem_reward = -1;
        assert!(r.validate().is_err());
        assert!(ruleset(1).validate().is_ok());
    }

    #[test]
    fn test_type_field_uses_wire_name() {
        let json = serde_json::json!({"id": 3, "type": 2, "target": 7});
        let def: MissionDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.kind, 2);
    }
}
