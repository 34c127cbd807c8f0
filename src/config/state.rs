// Application state module
// Read-only state shared by all connections

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::{CodesConfig, Config};

/// Optional rendering capabilities, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub datamatrix: bool,
}

impl Capabilities {
    /// Data Matrix needs both the `datamatrix` feature and the config switch
    pub const fn detect(codes: &CodesConfig) -> Self {
        Self {
            datamatrix: cfg!(feature = "datamatrix") && codes.datamatrix,
        }
    }
}

/// Application state
pub struct AppState {
    pub config: Config,
    pub capabilities: Capabilities,
    pub shutdown_signal: Arc<Notify>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_capabilities(config, Capabilities::detect(&config.codes))
    }

    /// Build state with explicit capabilities instead of detecting them
    pub fn with_capabilities(config: &Config, capabilities: Capabilities) -> Self {
        Self {
            config: config.clone(),
            capabilities,
            shutdown_signal: Arc::new(Notify::new()),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_switch_off() {
        let codes = CodesConfig {
            datamatrix: false,
            max_scale: 32,
            max_border: 64,
            max_pixels: 16_777_216,
        };
        assert!(!Capabilities::detect(&codes).datamatrix);
    }

    #[test]
    fn test_capability_follows_feature() {
        let codes = CodesConfig {
            datamatrix: true,
            max_scale: 32,
            max_border: 64,
            max_pixels: 16_777_216,
        };
        assert_eq!(
            Capabilities::detect(&codes).datamatrix,
            cfg!(feature = "datamatrix")
        );
    }
}
