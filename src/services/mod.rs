//! Player-facing services
//!
//! Each service drives one transport operation end to end and always answers
//! with an [`Outcome`](crate::model::Outcome). Store failures become
//! `ServerError`; business rejections keep their own status codes.

pub mod claim;
pub mod provisioning;
pub mod ruleset;
pub mod save;

pub use claim::{ClaimCoordinator, ClaimRequest};
pub use provisioning::{LoadRequest, ProvisioningService};
pub use ruleset::RulesetStore;
pub use save::{SaveCoordinator, SaveRequest};

use std::future::Future;
use std::time::Duration;

use crate::model::{OutcomeCode, PlayerRecord};
use crate::store::PlayerStore;
use crate::types::{LedgerError, Result};

/// Writes attempted per request: the first try plus one retry on conflict
pub const MAX_WRITE_ATTEMPTS: usize = 2;

/// Run a store operation under a deadline
pub(crate) async fn bounded<T, F>(limit: Duration, op: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Timeout(
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

/// Result of a guarded read-modify-write
#[derive(Debug)]
pub(crate) enum Update {
    /// The new record was written
    Written(PlayerRecord),
    /// The decision refused the change; the record is the one it saw
    Rejected(OutcomeCode, PlayerRecord),
    /// Every attempt lost the revision race; carries the last record read
    Conflict(PlayerRecord),
    /// The record disappeared between attempts
    Vanished,
}

/// Apply `decide` to `current` and persist the result with a revision guard.
///
/// A lost race re-reads the record and decides again, up to
/// [`MAX_WRITE_ATTEMPTS`] writes in total.
pub(crate) async fn guarded_update<F>(
    players: &dyn PlayerStore,
    limit: Duration,
    mut current: PlayerRecord,
    mut decide: F,
) -> Result<Update>
where
    F: FnMut(&PlayerRecord) -> std::result::Result<PlayerRecord, OutcomeCode>,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let next = match decide(&current) {
            Ok(next) => next,
            Err(status) => return Ok(Update::Rejected(status, current)),
        };

        if let Some(written) = bounded(limit, players.replace_if_current(&next)).await? {
            return Ok(Update::Written(written));
        }

        if attempt == MAX_WRITE_ATTEMPTS {
            break;
        }

        current = match bounded(limit, players.find(&current.player_id)).await? {
            Some(fresh) => fresh,
            None => return Ok(Update::Vanished),
        };
    }

    Ok(Update::Conflict(current))
}
