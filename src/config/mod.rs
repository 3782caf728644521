pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::Path;
use toml_config::{has_unresolved_placeholder, unresolved, TomlConfig};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "https://secure.splitwise.com/api/v3.0";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Splitwise credentials. Requests authenticate with the API key; the
/// consumer pair is carried for the OAuth application registration.
#[derive(Clone, Default)]
pub struct Credentials {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(value: Option<&str>) -> &'static str {
            match value {
                Some(v) if !v.is_empty() => "<redacted>",
                _ => "<unset>",
            }
        }

        f.debug_struct("Credentials")
            .field("consumer_key", &mask(self.consumer_key.as_deref()))
            .field("consumer_secret", &mask(self.consumer_secret.as_deref()))
            .field("api_key", &mask(Some(self.api_key.as_str())))
            .finish()
    }
}

/// What happened when loading a `.env` file into the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    Loaded,
    Missing,
    Invalid(String),
}

/// Loads `path` into the environment without overriding variables that are
/// already set.
pub fn load_env_file(path: &Path) -> EnvFile {
    match dotenvy::from_path(path) {
        Ok(()) => EnvFile::Loaded,
        Err(e) if e.not_found() => EnvFile::Missing,
        Err(e) => EnvFile::Invalid(e.to_string()),
    }
}

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub default_group_id: i64,
    pub port: u16,
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
}

impl AppConfig {
    /// Environment over file over defaults.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => {
                tracing::debug!("Loading configuration file {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    pub fn from_sources<F>(file: TomlConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = env("SPLITWISE_API_KEY").or(file.splitwise.api_key);
        let default_group_id = match env("DEFAULT_GROUP_ID") {
            Some(raw) => Some(parse_number::<i64>("DEFAULT_GROUP_ID", &raw)?),
            None => file.relay.default_group_id,
        };
        let port = match env("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => file.relay.port.unwrap_or(DEFAULT_PORT),
        };
        let request_timeout_seconds = match env("SPLITWISE_TIMEOUT_SECONDS") {
            Some(raw) => parse_number::<u64>("SPLITWISE_TIMEOUT_SECONDS", &raw)?,
            None => file
                .splitwise
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        };

        Ok(Self {
            credentials: Credentials {
                consumer_key: env("SPLITWISE_CONSUMER_KEY").or(file.splitwise.consumer_key),
                consumer_secret: env("SPLITWISE_CONSUMER_SECRET")
                    .or(file.splitwise.consumer_secret),
                api_key: validation::validate_required_field("SPLITWISE_API_KEY", &api_key)?
                    .clone(),
            },
            default_group_id: *validation::validate_required_field(
                "DEFAULT_GROUP_ID",
                &default_group_id,
            )?,
            port,
            api_base_url: env("SPLITWISE_API_URL")
                .or(file.splitwise.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout_seconds,
        })
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

fn parse_number<T>(field: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| RelayError::InvalidConfigValueError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

impl ConfigProvider for AppConfig {
    fn default_group_id(&self) -> i64 {
        self.default_group_id
    }

    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_secret("SPLITWISE_API_KEY", &self.credentials.api_key)?;
        if has_unresolved_placeholder(&self.credentials.api_key) {
            return Err(unresolved("SPLITWISE_API_KEY", &self.credentials.api_key));
        }
        for (field, value) in [
            ("SPLITWISE_CONSUMER_KEY", &self.credentials.consumer_key),
            ("SPLITWISE_CONSUMER_SECRET", &self.credentials.consumer_secret),
        ] {
            if let Some(value) = value {
                if has_unresolved_placeholder(value) {
                    return Err(unresolved(field, value));
                }
            }
        }

        validation::validate_url("SPLITWISE_API_URL", &self.api_base_url)?;
        validation::validate_positive_id("DEFAULT_GROUP_ID", self.default_group_id)?;
        validation::validate_range("SPLITWISE_TIMEOUT_SECONDS", self.request_timeout_seconds, 1, 300)?;
        validation::validate_range("PORT", self.port, 1, u16::MAX)?;

        if self.credentials.consumer_key.is_none() || self.credentials.consumer_secret.is_none() {
            tracing::warn!("Splitwise consumer key/secret not set; using API key only");
        }

        tracing::debug!("Configuration validation passed: {:?}", self);
        Ok(())
    }
}
