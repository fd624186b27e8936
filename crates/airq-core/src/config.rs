use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use airq_airkorea::{ClientSettings, Coordinate, ThresholdTable};

/// Environment variable consulted when no service key is configured
pub const SERVICE_KEY_ENV: &str = "AIRKOREA_SERVICE_KEY";

/// Prefix for environment overrides, e.g. `AIRQ__AIRKOREA__BASE_URL`
const ENV_PREFIX: &str = "AIRQ";

const KNOWN_DATA_TERMS: [&str; 3] = ["DAILY", "MONTH", "3MONTH"];

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// AirKorea open API settings
    pub airkorea: AirKoreaConfig,

    /// Fixed location used when no location provider is available
    #[serde(default)]
    pub location: LocationConfig,

    /// Grade thresholds per pollutant
    #[serde(default)]
    pub thresholds: ThresholdTable,

    /// Display preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirKoreaConfig {
    /// Base URL of the open data portal
    pub base_url: String,

    /// Service key issued by the portal (can be set via environment).
    /// Use the decoded key: requests percent-encode it, so the portal's
    /// encoded key would be encoded twice.
    #[serde(default)]
    pub service_key: Option<String>,

    /// Measurement history window
    #[serde(default = "default_data_term")]
    pub data_term: String,

    /// Measurement API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_data_term() -> String {
    "DAILY".to_string()
}

fn default_api_version() -> String {
    "1.3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for AirKoreaConfig {
    fn default() -> Self {
        Self {
            base_url: airq_airkorea::client::AIRKOREA_API_BASE.to_string(),
            service_key: None,
            data_term: default_data_term(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AirKoreaConfig {
    /// Configured key, falling back to the environment
    pub fn effective_service_key(&self) -> Option<String> {
        self.service_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(SERVICE_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// The fixed coordinate, if both halves are set
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

/// Language of grade labels and pollutant names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Label language
    #[serde(default)]
    pub locale: Locale,

    /// Append units to pollutant values
    #[serde(default = "default_show_units")]
    pub show_units: bool,
}

fn default_show_units() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            show_units: default_show_units(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airq")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            airkorea: AirKoreaConfig::default(),
            location: LocationConfig::default(),
            thresholds: ThresholdTable::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if needed
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, layered with `AIRQ__*` environment
    /// overrides. A missing file is created with defaults first.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Creating default config at {}", path.display());
            Self::default().save_to(path)?;
        }

        let config: Config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?
            .try_deserialize()
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.airkorea.base_url, "airkorea.base_url", &mut result);

        if self.airkorea.effective_service_key().is_none() {
            result.add_warning(
                "airkorea.service_key",
                format!(
                    "No service key configured (set it here or in {})",
                    SERVICE_KEY_ENV
                ),
            );
        }

        if self.airkorea.timeout_secs == 0 {
            result.add_error("airkorea.timeout_secs", "Timeout must be greater than 0");
        }

        if !KNOWN_DATA_TERMS.contains(&self.airkorea.data_term.as_str()) {
            result.add_warning(
                "airkorea.data_term",
                format!("Unknown data term: {}", self.airkorea.data_term),
            );
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("location.latitude", "Latitude must be within -90..90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error("location.longitude", "Longitude must be within -180..180");
                }
            }
            (None, None) => {}
            _ => result.add_error(
                "location",
                "Latitude and longitude must be set together",
            ),
        }

        for kind in self.thresholds.invalid_kinds() {
            result.add_error(
                format!("thresholds.{}", kind.symbol().to_lowercase().replace('.', "")),
                "Bounds must be non-negative and strictly ascending (good < normal < bad)",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Settings for the AirKorea client
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.airkorea.base_url.clone(),
            service_key: self.airkorea.effective_service_key().unwrap_or_default(),
            data_term: self.airkorea.data_term.clone(),
            api_version: self.airkorea.api_version.clone(),
            timeout: Duration::from_secs(self.airkorea.timeout_secs),
            thresholds: self.thresholds.clone(),
            ..Default::default()
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("airq");

        Ok(config_dir.join("config.toml"))
    }
}
