// crates/points-daemon/src/config.rs
//
// Runtime configuration for the points daemon.
// Loaded from a TOML file or populated with sensible defaults.
//
// Example:
//
//   log_level = "debug"
//   event_buffer = 1024
//   epoch_interval_secs = 86400
//
//   [policy]
//   epoch_mint_cap = 500000
//   ltv_bps = 7000

use std::fs;

use serde::Deserialize;
use thiserror::Error;

use points_core::PointsError;
use points_economics::PolicyConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid policy: {0}")]
    Invalid(#[from] PointsError),
}

impl From<ConfigError> for PointsError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Invalid(inner) => inner,
            other => PointsError::Config(other.to_string()),
        }
    }
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capacity of the event broadcast channel. Subscribers that fall further
    /// behind than this lose the oldest events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Wall-clock seconds per epoch. The daemon advances the economy's epoch
    /// counter once per interval.
    #[serde(default = "default_epoch_interval_secs")]
    pub epoch_interval_secs: u64,

    /// Economic policy parameters.
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_buffer() -> usize {
    256
}

fn default_epoch_interval_secs() -> u64 {
    86_400
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            event_buffer: default_event_buffer(),
            epoch_interval_secs: default_epoch_interval_secs(),
            policy: PolicyConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// A leading `~/` is expanded to the home directory. The policy table is
    /// validated before the config is returned.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let path = expand_tilde(path);
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path, source },
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: DaemonConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        if config.epoch_interval_secs == 0 {
            return Err(ConfigError::Invalid(PointsError::Config(
                "epoch_interval_secs must be greater than zero".to_string(),
            )));
        }
        config.policy.validate()?;
        Ok(config)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DaemonConfig::from_toml("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.event_buffer, 256);
        assert_eq!(config.epoch_interval_secs, 86_400);
        assert_eq!(config.policy, PolicyConfig::default());
    }

    #[test]
    fn test_policy_table_overrides() {
        let config = DaemonConfig::from_toml(
            r#"
            log_level = "debug"

            [policy]
            epoch_mint_cap = 500
            annual_interest_bps = 1200
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.policy.epoch_mint_cap, 500);
        assert_eq!(config.policy.annual_interest_bps, 1_200);
        assert_eq!(config.policy.ltv_bps, 7_000);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let err = DaemonConfig::from_toml("[policy]\nltv_bps = 20000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(PointsError::Config(_))));
    }

    #[test]
    fn test_zero_epoch_interval_rejected() {
        let err = DaemonConfig::from_toml("epoch_interval_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(PointsError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = DaemonConfig::from_toml("log_level = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(matches!(PointsError::from(err), PointsError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = DaemonConfig::load("/nonexistent/points/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/etc/points.toml"), "/etc/points.toml");
    }
}
