//! Mission Ledger - player progress and mission-claim service

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mission_ledger::{
    clock::SystemClock,
    config::Args,
    db::MongoClient,
    model::RulesetVersion,
    server::{self, AppState, StoreBackend},
    services::RulesetStore,
    store::{MemoryStore, MongoPlayerStore, MongoRulesetSource, PlayerStore, RulesetSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mission_ledger={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Mission Ledger");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Ruleset: {}", args.ruleset_name);
    info!("Mission slots: {}", args.mission_slots);
    info!("Store timeout: {} ms", args.store_timeout_ms);
    info!("======================================");

    let (backend, players, rulesets) = connect_stores(&args).await?;

    let state = AppState::new(&args, backend, players, rulesets, Arc::new(SystemClock));

    if let Some(ref path) = args.ruleset_file {
        seed_rulesets(&state.rulesets, path).await?;
    }

    server::run(Arc::new(state), args.listen).await?;
    Ok(())
}

type Stores = (StoreBackend, Arc<dyn PlayerStore>, Arc<dyn RulesetSource>);

/// Connect to MongoDB, falling back to memory in dev mode
async fn connect_stores(args: &Args) -> anyhow::Result<Stores> {
    match MongoClient::new(&args.mongodb_uri, &args.mongodb_db, args.store_timeout_ms).await {
        Ok(mongo) => {
            info!("MongoDB connected successfully");
            let rulesets: Arc<dyn RulesetSource> = Arc::new(MongoRulesetSource::new(&mongo).await?);
            let players: Arc<dyn PlayerStore> = Arc::new(MongoPlayerStore::new(mongo).await?);
            Ok((StoreBackend::Mongo, players, rulesets))
        }
        Err(e) if args.dev_mode => {
            warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
            let store = Arc::new(MemoryStore::new());
            let players: Arc<dyn PlayerStore> = store.clone();
            let rulesets: Arc<dyn RulesetSource> = store;
            Ok((StoreBackend::Memory, players, rulesets))
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Publish every ruleset in a JSON file that is not published yet
async fn seed_rulesets(rulesets: &RulesetStore, path: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read(path).await?;
    let value: serde_json::Value = serde_json::from_slice(&raw)?;
    let versions: Vec<RulesetVersion> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    for ruleset in versions {
        if ruleset.name != rulesets.name() {
            warn!(
                "Ruleset file entry '{}' v{} does not match active configuration '{}'",
                ruleset.name,
                ruleset.version,
                rulesets.name()
            );
        }
        let label = format!("{} v{}", ruleset.name, ruleset.version);
        if let Err(e) = rulesets.publish(ruleset).await {
            warn!("Skipping ruleset {}: {}", label, e);
        }
    }
    Ok(())
}
