//! Outcome taxonomy returned by every player operation

use serde::{Serialize, Serializer};

use super::PlayerRecord;

/// Status code carried by every response envelope.
///
/// Serialized as an integer. `Success`, `InvalidRequest` and `ServerError`
/// keep the values older clients already understand (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCode {
    Success,
    InvalidRequest,
    ServerError,
    InvalidSlot,
    MissionMismatch,
    UnknownMission,
    NotYetEligible,
    AlreadyClaimed,
    PlayerNotFound,
    RulesetUnavailable,
    WriteConflict,
}

impl OutcomeCode {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InvalidRequest => 1,
            Self::ServerError => 2,
            Self::InvalidSlot => 3,
            Self::MissionMismatch => 4,
            Self::UnknownMission => 5,
            Self::NotYetEligible => 6,
            Self::AlreadyClaimed => 7,
            Self::PlayerNotFound => 8,
            Self::RulesetUnavailable => 9,
            Self::WriteConflict => 10,
        }
    }
}

impl Serialize for OutcomeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Response envelope: a status plus the best available player snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub status: OutcomeCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PlayerRecord>,
}

impl Outcome {
    pub fn success(player: PlayerRecord) -> Self {
        Self {
            status: OutcomeCode::Success,
            data: Some(player),
        }
    }

    pub fn with_snapshot(status: OutcomeCode, player: Option<PlayerRecord>) -> Self {
        Self { status, data: player }
    }

    pub fn status_only(status: OutcomeCode) -> Self {
        Self { status, data: None }
    }
}
