//! Player operation endpoints
//!
//! Every endpoint answers HTTP 200 with the `{status, data?}` envelope, even
//! for rejected or failed operations. A body that does not decode yields
//! `InvalidRequest`.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::json_response;
use crate::model::{Outcome, OutcomeCode};
use crate::server::AppState;
use crate::services::{ClaimRequest, LoadRequest, SaveRequest};

/// POST /claimMission
pub async fn claim_mission(state: &AppState, body: &[u8]) -> Response<Full<Bytes>> {
    let outcome = match parse::<ClaimRequest>(body) {
        Ok(request) => state.claims.claim(&request).await,
        Err(outcome) => outcome,
    };
    envelope(&outcome)
}

/// POST /savePlayerData
pub async fn save_player_data(state: &AppState, body: &[u8]) -> Response<Full<Bytes>> {
    let outcome = match parse::<SaveRequest>(body) {
        Ok(request) => state.saves.save(&request).await,
        Err(outcome) => outcome,
    };
    envelope(&outcome)
}

/// POST /loadPlayerData
pub async fn load_player_data(state: &AppState, body: &[u8]) -> Response<Full<Bytes>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(LoadRequest::default())
    } else {
        parse::<LoadRequest>(body)
    };
    let outcome = match request {
        Ok(request) => state.provisioning.load_or_create(&request).await,
        Err(outcome) => outcome,
    };
    envelope(&outcome)
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, Outcome> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("undecodable request body: {}", e);
        Outcome::status_only(OutcomeCode::InvalidRequest)
    })
}

fn envelope(outcome: &Outcome) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, outcome)
}
