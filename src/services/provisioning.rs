//! Player loading and provisioning
//!
//! A request that carries an identity only ever loads; a request without one
//! mints a new identity and stores a fresh record. The two paths never mix.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use super::bounded;
use crate::clock::Clock;
use crate::model::{Outcome, OutcomeCode, PlayerRecord};
use crate::store::PlayerStore;
use crate::types::Result;

/// Load request; an absent or empty `playerId` asks for a new player
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    #[serde(default)]
    pub player_id: Option<String>,
}

impl LoadRequest {
    fn identity(&self) -> Option<&str> {
        self.player_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

pub struct ProvisioningService {
    players: Arc<dyn PlayerStore>,
    clock: Arc<dyn Clock>,
    slot_count: usize,
    timeout: Duration,
}

impl ProvisioningService {
    pub fn new(
        players: Arc<dyn PlayerStore>,
        clock: Arc<dyn Clock>,
        slot_count: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            players,
            clock,
            slot_count,
            timeout,
        }
    }

    /// Load the identified player, or provision one when no identity is given
    pub async fn load_or_create(&self, request: &LoadRequest) -> Outcome {
        match request.identity() {
            Some(player_id) => match self.load_existing(player_id).await {
                Ok(Some(player)) => Outcome::success(player),
                Ok(None) => {
                    info!("load for unknown player {}", player_id);
                    Outcome::status_only(OutcomeCode::PlayerNotFound)
                }
                Err(e) => {
                    error!(player_id = %player_id, "load player failed: {}", e);
                    Outcome::status_only(OutcomeCode::ServerError)
                }
            },
            None => match self.provision_new().await {
                Ok(player) => Outcome::success(player),
                Err(e) => {
                    error!("provisioning new player failed: {}", e);
                    Outcome::status_only(OutcomeCode::ServerError)
                }
            },
        }
    }

    pub async fn load_existing(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        bounded(self.timeout, self.players.find(player_id)).await
    }

    /// Create and store a record under a freshly minted identity
    pub async fn provision_new(&self) -> Result<PlayerRecord> {
        let player_id = Uuid::new_v4().to_string();
        let record = PlayerRecord::new(player_id, self.slot_count, self.clock.now());
        let stored = bounded(self.timeout, self.players.insert(record)).await?;
        info!(
            "provisioned player {} with {} mission slots",
            stored.player_id,
            stored.missions.len()
        );
        Ok(stored)
    }
}
