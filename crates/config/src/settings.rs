//! Application settings
//!
//! Layered: defaults, then an optional TOML file, then DIALER_-prefixed
//! environment variables (double underscore as section separator, e.g.
//! DIALER_PACING__RATE=3).

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Pacing rates the dialer accepts, in calls per second. The rate selector
/// is a pick from this set, not free-form.
pub const ALLOWED_PACING_RATES: [u32; 4] = [1, 2, 3, 5];

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub pacing: PacingConfig,
    pub provider: ProviderConfig,
    pub pool: PoolConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Pacing scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Calls per second; must be one of `ALLOWED_PACING_RATES`
    pub rate: u32,
    /// Maximum leads snapshotted for one run
    pub snapshot_limit: usize,
    /// Watchdog poll interval over the live lead set
    pub watchdog_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            rate: 1,
            snapshot_limit: 1000,
            watchdog_interval_ms: 1000,
        }
    }
}

impl PacingConfig {
    /// Tick interval for the configured rate.
    pub fn tick_interval_ms(&self) -> u64 {
        1000 / self.rate as u64
    }
}

/// Voice-call provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider API base URL; empty means use the stub provider
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Phone resource pool settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Assignable phone resource ids
    pub phone_ids: Vec<String>,
}

impl Settings {
    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ALLOWED_PACING_RATES.contains(&self.pacing.rate) {
            return Err(ConfigError::InvalidValue {
                field: "pacing.rate".to_string(),
                message: format!(
                    "{} is not one of the allowed rates {:?}",
                    self.pacing.rate, ALLOWED_PACING_RATES
                ),
            });
        }
        if self.pacing.snapshot_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pacing.snapshot_limit".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from an optional file plus environment overrides.
pub fn load_settings(path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !std::path::Path::new(path).exists() {
            return Err(ConfigError::FileNotFound(path.to_string()));
        }
        builder = builder.add_source(config::File::with_name(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("DIALER")
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    tracing::debug!(rate = settings.pacing.rate, "Settings loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.pacing.rate, 1);
        assert_eq!(settings.pacing.tick_interval_ms(), 1000);
    }

    #[test]
    fn test_rate_whitelist() {
        let mut settings = Settings::default();
        settings.pacing.rate = 4;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        for rate in ALLOWED_PACING_RATES {
            settings.pacing.rate = rate;
            assert!(settings.validate().is_ok());
        }
    }

    #[test]
    fn test_tick_interval() {
        let mut pacing = PacingConfig::default();
        pacing.rate = 2;
        assert_eq!(pacing.tick_interval_ms(), 500);
        pacing.rate = 5;
        assert_eq!(pacing.tick_interval_ms(), 200);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[pacing]\nrate = 3\n\n[provider]\nbase_url = \"https://api.example.com\"\n"
        )
        .unwrap();

        let settings = load_settings(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(settings.pacing.rate, 3);
        assert_eq!(settings.provider.base_url, "https://api.example.com");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            load_settings(Some("/nonexistent/dialer.toml")),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
