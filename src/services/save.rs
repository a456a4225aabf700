//! Saving client-reported progress

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{bounded, guarded_update, Update};
use crate::clock::Clock;
use crate::mission::{merge_progress, ProgressReport};
use crate::model::{Outcome, OutcomeCode};
use crate::store::PlayerStore;

/// Save request: the player identity plus the reported progress
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub player_id: String,
    #[serde(flatten)]
    pub report: ProgressReport,
}

pub struct SaveCoordinator {
    players: Arc<dyn PlayerStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl SaveCoordinator {
    pub fn new(players: Arc<dyn PlayerStore>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            players,
            clock,
            timeout,
        }
    }

    pub async fn save(&self, request: &SaveRequest) -> Outcome {
        let player = match bounded(self.timeout, self.players.find(&request.player_id)).await {
            Ok(Some(player)) => player,
            Ok(None) => return Outcome::status_only(OutcomeCode::PlayerNotFound),
            Err(e) => {
                error!(player_id = %request.player_id, "save failed to load player: {}", e);
                return Outcome::status_only(OutcomeCode::ServerError);
            }
        };

        let now = self.clock.now();
        let snapshot = player.clone();
        let update = guarded_update(self.players.as_ref(), self.timeout, player, |current| {
            merge_progress(current, &request.report, now).map_err(OutcomeCode::from)
        })
        .await;

        match update {
            Ok(Update::Written(written)) => {
                info!("saved player {} (revision {})", written.player_id, written.revision);
                Outcome::success(written)
            }
            Ok(Update::Rejected(status, seen)) => {
                info!("save rejected with {:?} for player {}", status, request.player_id);
                Outcome::with_snapshot(status, Some(seen))
            }
            Ok(Update::Conflict(seen)) => {
                warn!("save lost the write race twice for player {}", request.player_id);
                Outcome::with_snapshot(OutcomeCode::WriteConflict, Some(seen))
            }
            Ok(Update::Vanished) => Outcome::status_only(OutcomeCode::PlayerNotFound),
            Err(e) => {
                error!(player_id = %request.player_id, "save failed to persist: {}", e);
                Outcome::with_snapshot(OutcomeCode::ServerError, Some(snapshot))
            }
        }
    }
}
