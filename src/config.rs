//! Configuration for Mission Ledger
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Mission Ledger - player progress and mission-claim service
#[derive(Parser, Debug, Clone)]
#[command(name = "mission-ledger")]
#[command(about = "Player progress and mission-claim service backed by versioned rulesets")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "mission_ledger")]
    pub mongodb_db: String,

    /// Name of the active game configuration in the ruleset collection
    #[arg(long, env = "RULESET_NAME", default_value = "GameSettings")]
    pub ruleset_name: String,

    /// Number of mission slots given to a new player
    #[arg(long, env = "MISSION_SLOTS", default_value = "3")]
    pub mission_slots: usize,

    /// Upper bound for any single store operation, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value = "5000")]
    pub store_timeout_ms: u64,

    /// JSON file with ruleset versions to publish at startup (object or array)
    #[arg(long, env = "RULESET_FILE")]
    pub ruleset_file: Option<PathBuf>,

    /// Enable development mode (falls back to an in-memory store)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.mission_slots == 0 {
            return Err("MISSION_SLOTS must be at least 1".to_string());
        }

        if self.store_timeout_ms == 0 {
            return Err("STORE_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.ruleset_name.trim().is_empty() {
            return Err("RULESET_NAME must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["mission-ledger"]);
        assert_eq!(args.mission_slots, 3);
        assert_eq!(args.ruleset_name, "GameSettings");
        assert_eq!(args.store_timeout(), Duration::from_secs(5));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_slots_rejected() {
        let args = Args::parse_from(["mission-ledger", "--mission-slots", "0"]);
        assert!(args.validate().is_err());
    }
}
