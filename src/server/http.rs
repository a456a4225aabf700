//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; one task per connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::Args;
use crate::model::{Outcome, OutcomeCode};
use crate::routes;
use crate::services::{ClaimCoordinator, ProvisioningService, RulesetStore, SaveCoordinator};
use crate::store::{PlayerStore, RulesetSource};
use crate::types::LedgerError;

/// Largest request body accepted
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Which document store backs this instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// Shared application state
pub struct AppState {
    pub backend: StoreBackend,
    pub store_timeout: Duration,
    pub players: Arc<dyn PlayerStore>,
    pub rulesets: RulesetStore,
    pub claims: ClaimCoordinator,
    pub saves: SaveCoordinator,
    pub provisioning: ProvisioningService,
}

impl AppState {
    /// Wire the services over the given stores
    pub fn new(
        args: &Args,
        backend: StoreBackend,
        players: Arc<dyn PlayerStore>,
        ruleset_source: Arc<dyn RulesetSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let timeout = args.store_timeout();
        let rulesets = RulesetStore::new(ruleset_source, args.ruleset_name.clone(), timeout);

        Self {
            backend,
            store_timeout: timeout,
            players: Arc::clone(&players),
            claims: ClaimCoordinator::new(
                Arc::clone(&players),
                rulesets.clone(),
                Arc::clone(&clock),
                timeout,
            ),
            saves: SaveCoordinator::new(Arc::clone(&players), Arc::clone(&clock), timeout),
            provisioning: ProvisioningService::new(
                Arc::clone(&players),
                clock,
                args.mission_slots,
                timeout,
            ),
            rulesets,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>, listen: SocketAddr) -> Result<(), LedgerError> {
    let listener = TcpListener::bind(listen).await?;

    info!("Mission Ledger listening on {} ({:?} store)", listen, state.backend);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        (Method::OPTIONS, _) => routes::preflight_response(),

        (Method::GET, "/health-check") => routes::health_check(&state).await,

        (Method::POST, "/claimMission") => match read_body(req).await {
            Some(body) => routes::claim_mission(&state, &body).await,
            None => invalid_request(),
        },

        (Method::POST, "/savePlayerData") => match read_body(req).await {
            Some(body) => routes::save_player_data(&state, &body).await,
            None => invalid_request(),
        },

        (Method::POST, "/loadPlayerData") => match read_body(req).await {
            Some(body) => routes::load_player_data(&state, &body).await,
            None => invalid_request(),
        },

        _ => routes::not_found_response(&path),
    };

    Ok(response)
}

/// Collect a bounded request body
async fn read_body(req: Request<Incoming>) -> Option<Bytes> {
    match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => Some(collected.to_bytes()),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            None
        }
    }
}

fn invalid_request() -> Response<Full<Bytes>> {
    routes::json_response(
        hyper::StatusCode::OK,
        &Outcome::status_only(OutcomeCode::InvalidRequest),
    )
}
