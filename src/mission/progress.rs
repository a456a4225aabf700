//! Merging client-reported progress into the stored record
//!
//! Saves are client driven, so only fields the client legitimately owns are
//! taken from the report. Currency and the completion counter only move
//! through claims.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{MissionSlot, OutcomeCode, PlayerRecord};

/// Progress a client reports on save
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    #[serde(default)]
    pub high_score: i64,
    pub missions: Vec<ReportedSlot>,
}

/// Client view of one slot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedSlot {
    pub id: i32,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub is_completed: bool,
}

/// Why a save was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRejection {
    /// Reported slot count differs from the stored one
    InvalidSlot,
    /// A slot was reassigned while its mission was still active
    MissionMismatch,
}

impl From<SaveRejection> for OutcomeCode {
    fn from(rejection: SaveRejection) -> Self {
        match rejection {
            SaveRejection::InvalidSlot => OutcomeCode::InvalidSlot,
            SaveRejection::MissionMismatch => OutcomeCode::MissionMismatch,
        }
    }
}

/// Build the record to persist from `stored` and the client `report`
pub fn merge_progress(
    stored: &PlayerRecord,
    report: &ProgressReport,
    now: DateTime<Utc>,
) -> Result<PlayerRecord, SaveRejection> {
    if report.missions.len() != stored.missions.len() {
        return Err(SaveRejection::InvalidSlot);
    }

    let missions = stored
        .missions
        .iter()
        .zip(&report.missions)
        .map(|(current, reported)| merge_slot(current, reported, now))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlayerRecord {
        high_score: stored.high_score.max(report.high_score),
        missions,
        ..stored.clone()
    })
}

fn merge_slot(
    current: &MissionSlot,
    reported: &ReportedSlot,
    now: DateTime<Utc>,
) -> Result<MissionSlot, SaveRejection> {
    let progress = reported.progress.max(0);

    if reported.id == current.id {
        if current.is_empty() {
            return Ok(current.clone());
        }
        return Ok(MissionSlot {
            progress: current.progress.max(progress),
            is_completed: current.is_completed || reported.is_completed,
            ..current.clone()
        });
    }

    if !current.is_reassignable(now) {
        return Err(SaveRejection::MissionMismatch);
    }

    let mut slot = MissionSlot::empty(current.next_mission_time);
    slot.id = reported.id;
    if !slot.is_empty() {
        slot.progress = progress;
        slot.is_completed = reported.is_completed;
    }
    Ok(slot)
}
