//! Claim coordination
//!
//! Loads the player, resolves the ruleset for the client's version, asks the
//! mission engine for a decision and persists it behind the revision guard.
//! Two claims racing on the same record cannot both pay out: the loser
//! re-reads, sees the slot already claimed and reports `AlreadyClaimed`.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{bounded, guarded_update, RulesetStore, Update};
use crate::clock::Clock;
use crate::mission::evaluate_claim;
use crate::model::{Outcome, OutcomeCode};
use crate::store::PlayerStore;
use crate::types::LedgerError;

/// Claim request as sent by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub player_id: String,
    pub game_version: i64,
    pub mission_id: i32,
    /// Slot index in the player's mission list
    pub mission_index: i64,
}

pub struct ClaimCoordinator {
    players: Arc<dyn PlayerStore>,
    rulesets: RulesetStore,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl ClaimCoordinator {
    pub fn new(
        players: Arc<dyn PlayerStore>,
        rulesets: RulesetStore,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            players,
            rulesets,
            clock,
            timeout,
        }
    }

    /// Claim the reward of one mission slot
    pub async fn claim(&self, request: &ClaimRequest) -> Outcome {
        let player = match bounded(self.timeout, self.players.find(&request.player_id)).await {
            Ok(Some(player)) => player,
            Ok(None) => {
                info!("claim for unknown player {}", request.player_id);
                return Outcome::status_only(OutcomeCode::PlayerNotFound);
            }
            Err(e) => {
                self.log_failure(request, "load player", &e);
                return Outcome::status_only(OutcomeCode::ServerError);
            }
        };

        let ruleset = match self.rulesets.resolve(request.game_version).await {
            Ok(ruleset) => ruleset,
            Err(LedgerError::NotFound(reason)) => {
                warn!(
                    "{} (player {}, game version {})",
                    reason, request.player_id, request.game_version
                );
                return Outcome::with_snapshot(OutcomeCode::RulesetUnavailable, Some(player));
            }
            Err(e) => {
                self.log_failure(request, "resolve ruleset", &e);
                return Outcome::with_snapshot(OutcomeCode::ServerError, Some(player));
            }
        };

        let now = self.clock.now();
        let snapshot = player.clone();
        let update = guarded_update(self.players.as_ref(), self.timeout, player, |current| {
            evaluate_claim(
                current,
                request.mission_index,
                request.mission_id,
                &ruleset,
                now,
            )
            .map_err(OutcomeCode::from)
        })
        .await;

        match update {
            Ok(Update::Written(written)) => {
                info!(
                    "mission {} claimed by {} (slot {}, ruleset v{}, gem {})",
                    request.mission_id,
                    written.player_id,
                    request.mission_index,
                    ruleset.version,
                    written.gem
                );
                Outcome::success(written)
            }
            Ok(Update::Rejected(status, seen)) => {
                info!(
                    "claim rejected with {:?}: player {}, mission {}, slot {}",
                    status, request.player_id, request.mission_id, request.mission_index
                );
                Outcome::with_snapshot(status, Some(seen))
            }
            Ok(Update::Conflict(seen)) => {
                warn!(
                    "claim lost the write race twice: player {}, mission {}, slot {}",
                    request.player_id, request.mission_id, request.mission_index
                );
                Outcome::with_snapshot(OutcomeCode::WriteConflict, Some(seen))
            }
            Ok(Update::Vanished) => Outcome::status_only(OutcomeCode::PlayerNotFound),
            Err(e) => {
                self.log_failure(request, "persist claim", &e);
                Outcome::with_snapshot(OutcomeCode::ServerError, Some(snapshot))
            }
        }
    }

    fn log_failure(&self, request: &ClaimRequest, stage: &str, err: &LedgerError) {
        error!(
            player_id = %request.player_id,
            mission_id = request.mission_id,
            slot_index = request.mission_index,
            game_version = request.game_version,
            "claim failed to {}: {}",
            stage,
            err
        );
    }
}
