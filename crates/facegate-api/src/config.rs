//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Path to the camera registry JSON file
    pub cameras_file: Option<String>,
    /// Interval between sampling ticks
    pub tick_interval: Duration,
    /// Process one in `skip_factor` ticks
    pub skip_factor: u32,
    /// Per-subscriber event buffer capacity
    pub event_capacity: usize,
    /// Detections retained in the in-memory store
    pub detection_retention: usize,
    /// Start every active camera at boot
    pub autostart: bool,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cameras_file: None,
            tick_interval: Duration::from_millis(100),
            skip_factor: 5,
            event_capacity: 256,
            detection_retention: 1000,
            autostart: true,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cameras_file: std::env::var("CAMERAS_FILE").ok(),
            tick_interval: Duration::from_millis(
                std::env::var("TICK_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(100),
            ),
            skip_factor: std::env::var("FRAME_SKIP_FACTOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.skip_factor),
            event_capacity: std::env::var("EVENT_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.event_capacity),
            detection_retention: std::env::var("DETECTION_RETENTION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.detection_retention),
            autostart: std::env::var("AUTOSTART_CAMERAS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.autostart),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Supervisor tuning derived from this config.
    pub fn supervisor_config(&self) -> facegate_engine::SupervisorConfig {
        facegate_engine::SupervisorConfig {
            tick_interval: self.tick_interval,
            skip_factor: self.skip_factor,
            event_capacity: self.event_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.skip_factor, 5);
        assert!(!config.is_production());
    }
}
