//! Error types for engine configuration

use thiserror::Error;

use crate::dom::SelectorError;

/// Errors while loading or validating an engine config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config")]
    Parse(#[from] toml::de::Error),

    #[error("route keyword list '{list}' is empty")]
    EmptyKeywords { list: &'static str },

    #[error("route keyword list '{list}' contains a blank keyword")]
    BlankKeyword { list: &'static str },

    #[error("invalid selector for anchor '{anchor}'")]
    Selector {
        anchor: &'static str,
        #[source]
        source: SelectorError,
    },

    #[error("no sites configured")]
    NoSites,

    #[error("settle delay of {delay_ms} ms is out of range")]
    SettleDelay { delay_ms: u64 },
}
