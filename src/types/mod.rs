//! Shared types for Mission Ledger

mod error;

pub use error::{LedgerError, Result};
