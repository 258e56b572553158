//! Tracing subscriber setup for binaries embedding the catalog.
//!
//! `RUST_LOG` always wins over the configured level.

use tracing_subscriber::EnvFilter;

use crate::errors::{CatalogError, CatalogResult};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `catalog_core=debug`.
    pub level: String,
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
        }
    }
}

pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install a compact fmt subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LogConfig) -> CatalogResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.show_target)
        .compact()
        .try_init()
        .map_err(|err| CatalogError::Config(format!("tracing init failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_error() {
        let config = LogConfig::default();
        // Another test may already have installed a subscriber; either way the
        // second call must fail instead of panicking.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
