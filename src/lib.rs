//! Mission Ledger - player progress and mission claims
//!
//! Persists per-player progress (score, gems, mission slots) and decides
//! mission reward claims against versioned, server-authoritative rulesets.
//!
//! ## Components
//!
//! - **Model**: player records, mission slots, ruleset versions, outcome codes
//! - **Mission engine**: pure claim validation and save merging
//! - **Services**: claim coordination, saving, loading/provisioning, ruleset resolution
//! - **Store**: document store seam with MongoDB and in-memory implementations
//! - **Server**: hyper HTTP transport for the three player operations

pub mod clock;
pub mod config;
pub mod db;
pub mod mission;
pub mod model;
pub mod routes;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState, StoreBackend};
pub use types::{LedgerError, Result};
