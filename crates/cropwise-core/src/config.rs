//! Service configuration.
//!
//! Configuration is read once at startup from environment variables (after
//! `.env` has been loaded by the binary), falling back to the constants in
//! [`crate::defaults`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cropwise_core::AppConfig;
//!
//! let config = AppConfig::from_env().expect("invalid configuration");
//! println!("listening on {}:{}", config.host, config.port);
//! ```

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Locations of the startup artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub pest_model: PathBuf,
    /// Optional newline-delimited vocabulary overriding the built-in labels.
    pub pest_labels: Option<PathBuf>,
    pub pesticide_csv: PathBuf,
    pub yield_model: PathBuf,
    pub yield_scaler: PathBuf,
    pub yield_encoders: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            pest_model: PathBuf::from(defaults::PEST_MODEL_PATH),
            pest_labels: None,
            pesticide_csv: PathBuf::from(defaults::PESTICIDE_CSV_PATH),
            yield_model: PathBuf::from(defaults::YIELD_MODEL_PATH),
            yield_scaler: PathBuf::from(defaults::YIELD_SCALER_PATH),
            yield_encoders: PathBuf::from(defaults::YIELD_ENCODERS_PATH),
        }
    }
}

/// Settings for the external generative advisor.
#[derive(Clone, PartialEq)]
pub struct AdvisorSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for AdvisorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub allowed_origins: Vec<String>,
    pub artifacts: ArtifactPaths,
    pub advisor: AdvisorSettings,
    /// Map feature-encoding failures to 400 instead of 500.
    pub strict_input_errors: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let path_or = |name: &str, default: &str| PathBuf::from(get(name).unwrap_or_else(|| default.to_string()));

        let port = parse_or(&get, defaults::ENV_PORT, defaults::PORT)?;
        let max_upload_bytes =
            parse_or(&get, defaults::ENV_MAX_UPLOAD_BYTES, defaults::MAX_UPLOAD_BYTES)?;

        let allowed_origins = match get(defaults::ENV_ALLOWED_ORIGINS) {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => defaults::ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
        };

        let artifacts = ArtifactPaths {
            pest_model: path_or(defaults::ENV_PEST_MODEL_PATH, defaults::PEST_MODEL_PATH),
            pest_labels: get(defaults::ENV_PEST_LABELS_PATH).map(PathBuf::from),
            pesticide_csv: path_or(defaults::ENV_PESTICIDE_CSV_PATH, defaults::PESTICIDE_CSV_PATH),
            yield_model: path_or(defaults::ENV_YIELD_MODEL_PATH, defaults::YIELD_MODEL_PATH),
            yield_scaler: path_or(defaults::ENV_YIELD_SCALER_PATH, defaults::YIELD_SCALER_PATH),
            yield_encoders: path_or(
                defaults::ENV_YIELD_ENCODERS_PATH,
                defaults::YIELD_ENCODERS_PATH,
            ),
        };

        let advisor = AdvisorSettings {
            api_key: get(defaults::ENV_GEMINI_API_KEY)
                .ok_or(ConfigError::Missing(defaults::ENV_GEMINI_API_KEY))?,
            base_url: get(defaults::ENV_GEMINI_BASE_URL)
                .unwrap_or_else(|| defaults::GEMINI_BASE_URL.to_string()),
            model: get(defaults::ENV_GEMINI_MODEL)
                .unwrap_or_else(|| defaults::GEMINI_MODEL.to_string()),
            temperature: parse_or(
                &get,
                defaults::ENV_GEMINI_TEMPERATURE,
                defaults::GEMINI_TEMPERATURE,
            )?,
            timeout_secs: parse_or(
                &get,
                defaults::ENV_GEMINI_TIMEOUT_SECS,
                defaults::GEMINI_TIMEOUT_SECS,
            )?,
            max_retries: parse_or(
                &get,
                defaults::ENV_GEMINI_MAX_RETRIES,
                defaults::GEMINI_MAX_RETRIES,
            )?,
        };

        let strict_input_errors = match get(defaults::ENV_STRICT_INPUT_ERRORS) {
            Some(v) => parse_bool(defaults::ENV_STRICT_INPUT_ERRORS, &v)?,
            None => false,
        };

        let config = Self {
            host: get(defaults::ENV_HOST).unwrap_or_else(|| defaults::HOST.to_string()),
            port,
            upload_dir: path_or(defaults::ENV_UPLOAD_DIR, defaults::UPLOAD_DIR),
            max_upload_bytes,
            allowed_origins,
            artifacts,
            advisor,
            strict_input_errors,
        };
        config.validate()?;

        debug!(
            host = %config.host,
            port = config.port,
            model = %config.advisor.model,
            strict_input_errors = config.strict_input_errors,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = &self.advisor.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "GEMINI_BASE_URL must start with http:// or https://, got: {}",
                url
            )));
        }

        if !(0.0..=2.0).contains(&self.advisor.temperature) {
            return Err(ConfigError::Validation(format!(
                "GEMINI_TEMPERATURE must be within [0, 2], got: {}",
                self.advisor.temperature
            )));
        }

        if self.advisor.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "GEMINI_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.advisor.max_retries > 1 {
            return Err(ConfigError::Validation(format!(
                "GEMINI_MAX_RETRIES allows at most one retry, got: {}",
                self.advisor.max_retries
            )));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "MAX_UPLOAD_BYTES must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}
