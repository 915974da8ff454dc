//! Configuration management for the `TravelPlanner` service
//!
//! Handles loading configuration from files and environment variables,
//! resolving API credentials and validating all settings.

use crate::TravelPlannerError;
use ::config::{Config, Environment, File, FileFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for the `TravelPlanner` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Google Maps (directions + static map) settings
    #[serde(default)]
    pub maps: MapsConfig,
    /// Gemini language model settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Google Maps API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Maps API key
    pub api_key: Option<String>,
    /// File holding the Maps API key, used when `api_key` is not set
    pub api_key_file: Option<PathBuf>,
    /// Directions endpoint
    #[serde(default = "default_directions_url")]
    pub directions_url: String,
    /// Static map image endpoint
    #[serde(default = "default_static_map_url")]
    pub static_map_url: String,
    /// Static map image size, `WIDTHxHEIGHT`
    #[serde(default = "default_static_map_size")]
    pub static_map_size: String,
    /// Request timeout in seconds
    #[serde(default = "default_maps_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default)]
    pub max_retries: u32,
}

/// Gemini API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Gemini API key
    pub api_key: Option<String>,
    /// File holding the Gemini API key, used when `api_key` is not set
    pub api_key_file: Option<PathBuf>,
    /// Base URL of the models endpoint
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_directions_url() -> String {
    "https://maps.googleapis.com/maps/api/directions/json".to_string()
}

fn default_static_map_url() -> String {
    "https://maps.googleapis.com/maps/api/staticmap".to_string()
}

fn default_static_map_size() -> String {
    "600x300".to_string()
}

fn default_maps_timeout() -> u32 {
    10
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_timeout() -> u32 {
    60
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_file: None,
            directions_url: default_directions_url(),
            static_map_url: default_static_map_url(),
            static_map_size: default_static_map_size(),
            timeout_seconds: default_maps_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_file: None,
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_seconds: default_gemini_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl MapsConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// The Maps API key, read from `api_key_file` when no inline key is set.
    /// Missing keys resolve to an empty string; the upstream rejects those.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_key(self.api_key.as_deref(), self.api_key_file.as_deref())
    }
}

impl GeminiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_key(self.api_key.as_deref(), self.api_key_file.as_deref())
    }
}

fn resolve_key(inline: Option<&str>, file: Option<&Path>) -> Result<String> {
    if let Some(key) = inline {
        return Ok(key.trim().to_string());
    }
    match file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read API key file: {}", path.display()))?;
            Ok(contents.trim().to_string())
        }
        None => Ok(String::new()),
    }
}

impl PlannerConfig {
    /// Load configuration from a file (or the default location when `None`)
    /// and environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // TRAVELPLANNER__MAPS__API_KEY -> maps.api_key
        builder = builder.add_source(
            Environment::with_prefix("TRAVELPLANNER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travelplanner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.maps.directions_url.is_empty() {
            self.maps.directions_url = default_directions_url();
        }
        if self.maps.static_map_url.is_empty() {
            self.maps.static_map_url = default_static_map_url();
        }
        if self.maps.static_map_size.is_empty() {
            self.maps.static_map_size = default_static_map_size();
        }
        if self.maps.timeout_seconds == 0 {
            self.maps.timeout_seconds = default_maps_timeout();
        }
        if self.gemini.base_url.is_empty() {
            self.gemini.base_url = default_gemini_base_url();
        }
        if self.gemini.model.is_empty() {
            self.gemini.model = default_gemini_model();
        }
        if self.gemini.timeout_seconds == 0 {
            self.gemini.timeout_seconds = default_gemini_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Maps", &self.maps.api_key),
            ("Gemini", &self.gemini.api_key),
        ] {
            if let Some(key) = key {
                if key.trim().is_empty() {
                    return Err(TravelPlannerError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.maps.timeout_seconds > 300 {
            return Err(
                TravelPlannerError::config("Maps API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.maps.max_retries > 10 {
            return Err(TravelPlannerError::config("Maps API max retries cannot exceed 10").into());
        }

        if self.gemini.timeout_seconds > 300 {
            return Err(
                TravelPlannerError::config("Gemini API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.server.port == 0 {
            return Err(TravelPlannerError::config("Server port must be non-zero").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Directions", &self.maps.directions_url),
            ("Static map", &self.maps.static_map_url),
            ("Gemini", &self.gemini.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelPlannerError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        let valid_size = self
            .maps
            .static_map_size
            .split_once('x')
            .is_some_and(|(w, h)| w.parse::<u16>().is_ok() && h.parse::<u16>().is_ok());
        if !valid_size {
            return Err(TravelPlannerError::config(format!(
                "Invalid static map size '{}'. Expected WIDTHxHEIGHT",
                self.maps.static_map_size
            ))
            .into());
        }

        Ok(())
    }
}
