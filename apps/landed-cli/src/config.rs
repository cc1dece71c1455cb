//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LANDED_LOG_LEVEL=debug                                             │
//! │     LANDED_GBP_RATE_AVG_BDT=152                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config PATH, else $LANDED_CONFIG, else                           │
//! │     ~/.config/landed/landed.toml (Linux)                               │
//! │     ~/Library/Application Support/com.landed.landed/landed.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     info logging, pretty output, no shipment defaults                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [logging]
//! level = "info"
//!
//! [output]
//! pretty = true
//!
//! # Used only when a pricing record leaves the field out
//! [shipment_defaults]
//! cargo_cost_per_kg_gbp = 8.5
//! gbp_rate_avg_bdt = 152.0
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LANDED_CONFIG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter level when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Pretty-print JSON on stdout.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings { pretty: true }
    }
}

/// Fill-ins for pricing records that leave shipment-level fields out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_cost_per_kg_gbp: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gbp_rate_avg_bdt: Option<f64>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    pub shipment_defaults: ShipmentDefaults,
}

impl CliConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    ///
    /// A path given explicitly (flag or `LANDED_CONFIG`) must exist; the
    /// platform default path is optional.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: PathBuf) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses a config document.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let level = self.logging.level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Unknown log level: '{}'. Valid options: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        let defaults = [
            ("cargo_cost_per_kg_gbp", self.shipment_defaults.cargo_cost_per_kg_gbp),
            ("gbp_rate_avg_bdt", self.shipment_defaults.gbp_rate_avg_bdt),
        ];
        for (field, value) in defaults {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "shipment_defaults.{field} must be > 0, got {v}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides read through `lookup`.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LANDED_LOG_LEVEL") {
            debug!(level = %level, "Overriding log level from environment");
            self.logging.level = level;
        }

        if let Some(pretty) = lookup("LANDED_OUTPUT_PRETTY") {
            match pretty.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => self.output.pretty = true,
                "0" | "false" | "no" => self.output.pretty = false,
                _ => warn!(value = %pretty, "Unknown LANDED_OUTPUT_PRETTY value in environment"),
            }
        }

        if let Some(cargo) = lookup("LANDED_CARGO_COST_PER_KG_GBP") {
            match cargo.trim().parse::<f64>() {
                Ok(v) => self.shipment_defaults.cargo_cost_per_kg_gbp = Some(v),
                Err(_) => warn!(value = %cargo, "Ignoring unparseable LANDED_CARGO_COST_PER_KG_GBP"),
            }
        }

        if let Some(rate) = lookup("LANDED_GBP_RATE_AVG_BDT") {
            match rate.trim().parse::<f64>() {
                Ok(v) => self.shipment_defaults.gbp_rate_avg_bdt = Some(v),
                Err(_) => warn!(value = %rate, "Ignoring unparseable LANDED_GBP_RATE_AVG_BDT"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "landed", "landed")
            .map(|dirs| dirs.config_dir().join("landed.toml"))
    }

    /// Returns the log filter directive from the config.
    pub fn log_level(&self) -> String {
        self.logging.level.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.output.pretty);
        assert_eq!(config.shipment_defaults, ShipmentDefaults::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let config = CliConfig::from_toml(
            r#"
            [logging]
            level = "debug"

            [output]
            pretty = false

            [shipment_defaults]
            cargo_cost_per_kg_gbp = 8.5
            gbp_rate_avg_bdt = 152.0
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(!config.output.pretty);
        assert_eq!(config.shipment_defaults.cargo_cost_per_kg_gbp, Some(8.5));
        assert_eq!(config.shipment_defaults.gbp_rate_avg_bdt, Some(152.0));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = CliConfig::from_toml("[shipment_defaults]\ngbp_rate_avg_bdt = 150\n").unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.output.pretty);
        assert_eq!(config.shipment_defaults.cargo_cost_per_kg_gbp, None);
    }

    #[test]
    fn test_malformed_file_fails() {
        assert!(matches!(
            CliConfig::from_toml("[output]\npretty = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config.apply_env_overrides_from(env(&[
            ("LANDED_LOG_LEVEL", "warn"),
            ("LANDED_OUTPUT_PRETTY", "no"),
            ("LANDED_CARGO_COST_PER_KG_GBP", "9.25"),
            ("LANDED_GBP_RATE_AVG_BDT", "not-a-number"),
        ]));

        assert_eq!(config.logging.level, "warn");
        assert!(!config.output.pretty);
        assert_eq!(config.shipment_defaults.cargo_cost_per_kg_gbp, Some(9.25));
        assert_eq!(config.shipment_defaults.gbp_rate_avg_bdt, None);
    }

    #[test]
    fn test_validation() {
        let mut config = CliConfig::default();

        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.logging.level = " DEBUG ".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level(), "debug");

        config.shipment_defaults.gbp_rate_avg_bdt = Some(0.0);
        assert!(config.validate().is_err());

        config.shipment_defaults.gbp_rate_avg_bdt = Some(f64::INFINITY);
        assert!(config.validate().is_err());

        config.shipment_defaults.gbp_rate_avg_bdt = Some(151.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let result = CliConfig::load(Some(PathBuf::from("/definitely/not/here/landed.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_toml_serialization() {
        let config = CliConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("[output]"));
    }
}
