use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use nimbus_weather::provider::DEFAULT_BASE_URL;
use nimbus_weather::UnitSet;

const APP_DIR: &str = "nimbus";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "NIMBUS";
const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

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
    /// Directory holding config.toml and the state database
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub features: FeatureConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenWeatherMap API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; falls back to OPENWEATHER_API_KEY when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// IP geolocation endpoint; unset means geolocation is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_url: Option<String>,

    /// Locate automatically on the very first run
    #[serde(default = "default_true")]
    pub auto_locate: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            lookup_url: Some("http://ip-api.com/json".to_string()),
            auto_locate: true,
        }
    }
}

/// Optional dashboard regions. All off gives the reduced dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "default_true")]
    pub kelvin: bool,
    #[serde(default = "default_true")]
    pub hourly_trend: bool,
    #[serde(default = "default_true")]
    pub air_quality: bool,
}

impl FeatureConfig {
    pub fn reduced() -> Self {
        Self {
            kelvin: false,
            hourly_trend: false,
            air_quality: false,
        }
    }

    pub fn unit_set(&self) -> UnitSet {
        UnitSet::with_kelvin(self.kelvin)
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            kelvin: true,
            hourly_trend: true,
            air_quality: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File name inside config_dir
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_database_file() -> String {
    "state.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            provider: ProviderConfig::default(),
            location: LocationConfig::default(),
            features: FeatureConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Fails if the config directory cannot be determined or the file is unreadable.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`, layering `NIMBUS__SECTION__KEY`
    /// environment overrides on top. A missing file is created with defaults.
    /// Without an explicit `config_dir`, state lives next to the file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written, read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            tracing::info!("Created default config at {}", path.display());
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to read config file")?;

        let dir_is_explicit = settings.get_string("config_dir").is_ok();
        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to parse config file")?;

        if !dir_is_explicit {
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
        }

        if config.provider.api_key.is_none() {
            config.provider.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|k| !k.trim().is_empty());
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings, unlogged so the
    /// caller can report them once logging is up.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or validation finds critical errors.
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

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_url(&self.provider.base_url, "provider.base_url", &mut result);

        if self.provider.api_key.is_none() {
            result.add_warning(
                "provider.api_key",
                format!("No API key configured - set {API_KEY_ENV} to fetch weather"),
            );
        }

        if self.provider.request_timeout_secs == 0 {
            result.add_error(
                "provider.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.provider.request_timeout_secs > 120 {
            result.add_warning(
                "provider.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        match &self.location.lookup_url {
            Some(url) => Self::validate_url(url, "location.lookup_url", &mut result),
            None => result.add_warning(
                "location.lookup_url",
                "No lookup URL - geolocation is unavailable",
            ),
        }

        if self.storage.database_file.trim().is_empty() {
            result.add_error("storage.database_file", "Database file name is empty");
        }

        if tracing_subscriber::EnvFilter::try_new(&self.logging.filter).is_err() {
            result.add_warning(
                "logging.filter",
                format!("Unparseable filter '{}', falling back to info", self.logging.filter),
            );
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
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

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created or the file written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Path to the state database
    pub fn database_path(&self) -> PathBuf {
        self.config_dir.join(&self.storage.database_file)
    }

    /// `<platform config dir>/nimbus/config.toml`
    ///
    /// # Errors
    ///
    /// Fails when the platform has no config directory.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR);

        Ok(config_dir.join(CONFIG_FILE))
    }
}
