//! Engine configuration loading, validation and site scope
//!
//! The config itself lives in gallery-wall-types so the CLI and extension share
//! it; this module adds TOML loading and the checks that keep a bad file from
//! silently disabling decoration.

mod error;

use std::time::Duration;

use gallery_wall_types::EngineConfig;
use tracing::warn;

use crate::dom::Selector;

pub use error::ConfigError;

/// Anything longer than a minute is almost certainly a unit mistake
const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Extension trait for EngineConfig loading and validation
pub trait EngineConfigExt: Sized {
    fn from_toml_str(source: &str) -> Result<Self, ConfigError>;
    fn load_or_default(source: &str) -> Self;
    fn validate(&self) -> Result<(), ConfigError>;
    fn settle_delay(&self) -> Duration;
    fn site_scope(&self) -> SiteScope;
}

impl EngineConfigExt for EngineConfig {
    /// Parse and validate
    fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse, falling back to built-in defaults on any error
    fn load_or_default(source: &str) -> Self {
        Self::from_toml_str(source).unwrap_or_else(|e| {
            warn!(error = %e, "invalid engine config, using defaults");
            Self::default()
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(ConfigError::SettleDelay {
                delay_ms: self.settle_delay_ms,
            });
        }
        for (list, keywords) in [
            ("wall_color", &self.routes.wall_color),
            ("frame_color", &self.routes.frame_color),
        ] {
            if keywords.is_empty() {
                return Err(ConfigError::EmptyKeywords { list });
            }
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::BlankKeyword { list });
            }
        }
        for (anchor, selector) in self.anchors.entries() {
            Selector::parse(selector).map_err(|source| ConfigError::Selector { anchor, source })?;
        }
        if self.sites.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoSites);
        }
        Ok(())
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    fn site_scope(&self) -> SiteScope {
        SiteScope::new(&self.sites)
    }
}

/// Allow-list of host domains the engine runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScope {
    domains: Vec<String>,
}

impl SiteScope {
    pub fn new(domains: &[String]) -> Self {
        Self {
            domains: domains
                .iter()
                .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// Whether `host` is a configured domain or a subdomain of one
    pub fn allows(&self, host: &str) -> bool {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        // strip a port if one slipped in
        let host = host.split(':').next().unwrap_or_default();
        self.domains.iter().any(|domain| {
            host == domain.as_str()
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}
