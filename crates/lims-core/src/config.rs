//! Configuration loading and typed config structures for the LIMS server.
//!
//! The optional configuration file is `lims-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads the file and applies
//! environment overrides. Every field has a default, so an empty file (or
//! no file at all) yields a working demo setup.

use std::path::{Path, PathBuf};

use lims_types::UserProfile;
use serde::Deserialize;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lims-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// The environment variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `lims-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LimsConfig {
    /// Listening sockets and static asset location.
    #[serde(default)]
    pub server: ServerConfig,

    /// The single accepted credential pair and its profile.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demo data seeding.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl LimsConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for deployment settings:
    /// - `LIMS_HOST` overrides `server.host`
    /// - `LIMS_WS_PORT` overrides `server.ws_port`
    /// - `LIMS_HTTP_PORT` overrides `server.http_port`
    /// - `LIMS_WEB_ROOT` overrides `server.web_root`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidValue`] for a malformed override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load `lims-config.yaml` when present, otherwise defaults plus
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Same as [`LimsConfig::from_file`].
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.server.apply_env_overrides()?;
            Ok(config)
        }
    }
}

/// Listening sockets and static asset settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind both listeners to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the WebSocket message channel.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Port of the static asset server.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Document root for static assets.
    #[serde(default = "default_web_root")]
    pub web_root: PathBuf,

    /// Document served for `/`.
    #[serde(default = "default_index_document")]
    pub index_document: String,
}

impl ServerConfig {
    /// Override deployment settings with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a port variable is not a
    /// valid `u16`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a port value is not a
    /// valid `u16`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("LIMS_HOST") {
            self.host = val;
        }
        if let Some(val) = lookup("LIMS_WS_PORT") {
            self.ws_port = parse_port("LIMS_WS_PORT", val)?;
        }
        if let Some(val) = lookup("LIMS_HTTP_PORT") {
            self.http_port = parse_port("LIMS_HTTP_PORT", val)?;
        }
        if let Some(val) = lookup("LIMS_WEB_ROOT") {
            self.web_root = PathBuf::from(val);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            ws_port: default_ws_port(),
            http_port: default_http_port(),
            web_root: default_web_root(),
            index_document: default_index_document(),
        }
    }
}

fn parse_port(key: &'static str, value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_e| ConfigError::InvalidValue { key, value })
}

/// The accepted credential pair and the profile handed out on success.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    /// Accepted login name.
    #[serde(default = "default_username")]
    pub username: String,

    /// Accepted password.
    #[serde(default = "default_password")]
    pub password: String,

    /// Profile returned on a successful login.
    #[serde(default = "default_user")]
    pub user: UserConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            user: default_user(),
        }
    }
}

/// Profile fields of the configured user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserConfig {
    /// Stable user identifier.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Given name.
    #[serde(default = "default_first_name")]
    pub first_name: String,
    /// Family name.
    #[serde(default = "default_last_name")]
    pub last_name: String,
    /// Contact address.
    #[serde(default = "default_email")]
    pub email: String,
    /// Role label.
    #[serde(default = "default_role")]
    pub role: String,
}

impl UserConfig {
    /// Build the wire profile for the given login name.
    pub fn profile(&self, username: &str) -> UserProfile {
        UserProfile {
            user_id: self.user_id.clone(),
            username: username.to_owned(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Demo data seeding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
    /// Insert the demo samples and equipment at startup.
    #[serde(default = "default_true")]
    pub demo_data: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            demo_data: default_true(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_ws_port() -> u16 {
    8887
}

const fn default_http_port() -> u16 {
    8080
}

fn default_web_root() -> PathBuf {
    PathBuf::from("web")
}

fn default_index_document() -> String {
    "index.html".to_owned()
}

fn default_username() -> String {
    "admin".to_owned()
}

fn default_password() -> String {
    "admin123".to_owned()
}

fn default_user() -> UserConfig {
    UserConfig {
        user_id: default_user_id(),
        first_name: default_first_name(),
        last_name: default_last_name(),
        email: default_email(),
        role: default_role(),
    }
}

fn default_user_id() -> String {
    "USR-001".to_owned()
}

fn default_first_name() -> String {
    "Admin".to_owned()
}

fn default_last_name() -> String {
    "User".to_owned()
}

fn default_email() -> String {
    "admin@lims.com".to_owned()
}

fn default_role() -> String {
    "ADMIN".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
