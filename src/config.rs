use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::backend::{CollectionRef, DEFAULT_TIMEOUT};
use crate::retry::RetryPolicy;

/// Appwrite Cloud API endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Backend API endpoint
    pub endpoint: ConfigValue<String>,
    /// Backend project id
    pub project_id: ConfigValue<String>,
    /// Server API key. Never printed.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Database holding the patient collection
    pub database_id: ConfigValue<String>,
    /// Collection of patient documents
    pub patient_collection_id: ConfigValue<String>,
    /// HTTP request timeout in seconds
    pub timeout_secs: ConfigValue<u64>,
    /// Retry policy for patient lookups
    pub retry: RetryPolicy,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    endpoint: Option<String>,
    project_id: Option<String>,
    api_key: Option<String>,
    database_id: Option<String>,
    patient_collection_id: Option<String>,
    timeout_secs: Option<u64>,
    retry: Option<RetryPolicy>,
}

/// Everything needed to talk to the backend, resolved and validated.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub patients: CollectionRef,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut endpoint = ConfigValue::new(DEFAULT_ENDPOINT.to_string(), ConfigSource::Default);
        let mut project_id = ConfigValue::new(String::new(), ConfigSource::Default);
        let mut api_key = None;
        let mut database_id = ConfigValue::new(String::new(), ConfigSource::Default);
        let mut patient_collection_id = ConfigValue::new(String::new(), ConfigSource::Default);
        let mut timeout_secs = ConfigValue::new(DEFAULT_TIMEOUT.as_secs(), ConfigSource::Default);
        let mut retry = RetryPolicy::default();
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(value) = file_config.endpoint {
                endpoint = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(value) = file_config.project_id {
                project_id = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(value) = file_config.database_id {
                database_id = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(value) = file_config.patient_collection_id {
                patient_collection_id = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(value) = file_config.timeout_secs {
                timeout_secs = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(policy) = file_config.retry {
                retry = policy;
            }
            api_key = file_config.api_key;
        }

        // Apply environment variable overrides
        if let Ok(value) = std::env::var("CAREPULSE_ENDPOINT") {
            endpoint = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Ok(value) = std::env::var("CAREPULSE_PROJECT_ID") {
            project_id = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Ok(value) = std::env::var("CAREPULSE_DATABASE_ID") {
            database_id = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Ok(value) = std::env::var("CAREPULSE_PATIENT_COLLECTION_ID") {
            patient_collection_id = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("CAREPULSE_API_KEY") {
            api_key = Some(key);
        }

        Ok(Self {
            endpoint,
            project_id,
            api_key,
            database_id,
            patient_collection_id,
            timeout_secs,
            retry,
            config_file,
        })
    }

    /// Returns the backend settings, failing on the first missing value.
    pub fn backend_settings(&self) -> Result<BackendSettings, ConfigError> {
        fn required(key: &'static str, value: &str) -> Result<String, ConfigError> {
            if value.trim().is_empty() {
                Err(ConfigError::Missing(key))
            } else {
                Ok(value.to_string())
            }
        }

        Ok(BackendSettings {
            endpoint: required("endpoint", &self.endpoint.value)?,
            project_id: required("project_id", &self.project_id.value)?,
            api_key: required("api_key", self.api_key.as_deref().unwrap_or_default())?,
            patients: CollectionRef::new(
                required("database_id", &self.database_id.value)?,
                required("patient_collection_id", &self.patient_collection_id.value)?,
            ),
            timeout: Duration::from_secs(self.timeout_secs.value),
            retry: self.retry,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/carepulse/
    /// - macOS: ~/Library/Application Support/carepulse/
    /// - Windows: %APPDATA%/carepulse/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("carepulse")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    /// A required value is empty or unset
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::Missing(key) => write!(
                f,
                "Missing configuration value '{}'. Set it in the config file or via CAREPULSE_{}.",
                key,
                key.to_uppercase()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
