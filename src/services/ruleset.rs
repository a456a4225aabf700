//! Ruleset resolution
//!
//! A client reports the game version it was built against and is served the
//! newest ruleset of the active configuration that does not exceed it. Older
//! builds keep working during a rollout; nobody sees a ruleset from the future.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::bounded;
use crate::model::RulesetVersion;
use crate::store::RulesetSource;
use crate::types::{LedgerError, Result};

/// Read access to the published rulesets of one named configuration
#[derive(Clone)]
pub struct RulesetStore {
    source: Arc<dyn RulesetSource>,
    name: String,
    timeout: Duration,
}

impl RulesetStore {
    pub fn new(source: Arc<dyn RulesetSource>, name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            source,
            name: name.into(),
            timeout,
        }
    }

    /// Name of the active configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the ruleset for a client version.
    ///
    /// Fails with [`LedgerError::NotFound`] when no published version is at or
    /// below `requested_version`, or when the matching version does not pass
    /// [`RulesetVersion::validate`]. Stored rulesets may predate validation.
    pub async fn resolve(&self, requested_version: i64) -> Result<RulesetVersion> {
        let found = bounded(
            self.timeout,
            self.source.latest_at_or_below(&self.name, requested_version),
        )
        .await?;

        match found {
            Some(ruleset) => {
                if let Err(e) = ruleset.validate() {
                    error!(
                        "refusing stored ruleset {} v{} for client version {}: {}",
                        self.name, ruleset.version, requested_version, e
                    );
                    return Err(LedgerError::NotFound(format!(
                        "{} v{} is not usable",
                        self.name, ruleset.version
                    )));
                }
                debug!(
                    "client version {} resolved to {} v{}",
                    requested_version, self.name, ruleset.version
                );
                Ok(ruleset)
            }
            None => Err(LedgerError::NotFound(format!(
                "no {} ruleset at or below version {}",
                self.name, requested_version
            ))),
        }
    }

    /// Validate and publish a ruleset version
    pub async fn publish(&self, ruleset: RulesetVersion) -> Result<()> {
        ruleset.validate()?;
        let (name, version) = (ruleset.name.clone(), ruleset.version);
        bounded(self.timeout, self.source.publish(ruleset)).await?;
        info!("Published ruleset {} v{}", name, version);
        Ok(())
    }
}
