//! Background maintenance configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Configuration for the periodic sweep
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaintenanceConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,

    /// Whether the background sweep is enabled
    pub enabled: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl MaintenanceConfig {
    /// Load from `MAINTENANCE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval_seconds: env_or("MAINTENANCE_INTERVAL", defaults.interval_seconds),
            enabled: env_or("MAINTENANCE_ENABLED", defaults.enabled),
        }
    }
}
