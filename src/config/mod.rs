//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::validation::validate_base_url;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub headscale: HeadscaleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Headscale server connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeadscaleConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: String,
    /// Timeout in seconds (supports both timeout_secs and timeout field names)
    #[serde(default = "default_timeout", alias = "timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,
    /// Additional CA bundle (PEM) trusted for the server certificate
    #[serde(default)]
    pub ssl_ca: Option<PathBuf>,
}

impl Default for HeadscaleConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
            ssl_verify: default_ssl_verify(),
            ssl_ca: None,
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_ssl_verify() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix (default: "headscale-admin")
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to stderr
    #[default]
    Console,
    /// Log to file with optional rotation
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|p| p.join("headscale-admin"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn default_log_prefix() -> String {
    "headscale-admin".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("HEADSCALE_ADMIN_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => Self::from_file(path)?,
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => AppConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a YAML configuration file without applying overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            // Current directory
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            // System config directory
            PathBuf::from("/etc/headscale-admin/config.yaml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("headscale-admin/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HEADSCALE_URL") {
            self.headscale.url = url;
        }
        if let Some(key) = lookup("HEADSCALE_API_KEY") {
            self.headscale.api_key = key;
        }
        if let Some(timeout) = lookup("HEADSCALE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.headscale.timeout_secs = t;
            }
        }
        if let Some(ca) = lookup("HEADSCALE_SSL_CA") {
            self.headscale.ssl_ca = Some(PathBuf::from(ca));
        }

        // Logging overrides
        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("HEADSCALE_ADMIN_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !validate_base_url(&self.headscale.url) {
            anyhow::bail!(
                "Invalid Headscale URL: {:?}. Must start with http:// or https://",
                self.headscale.url
            );
        }

        if self.headscale.api_key.trim().is_empty() {
            anyhow::bail!("Headscale API key cannot be empty (set headscale.api_key or HEADSCALE_API_KEY)");
        }

        if self.headscale.timeout_secs == 0 {
            anyhow::bail!("Headscale timeout cannot be 0");
        }

        if let Some(ref ca) = self.headscale.ssl_ca {
            if !ca.exists() {
                anyhow::bail!("CA bundle not found: {:?}", ca);
            }
        }

        Ok(())
    }

    /// Create a default configuration file
    pub fn create_default_config(path: &Path) -> Result<()> {
        let config = AppConfig::default();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let yaml = serde_norway::to_string(&config).context("Failed to serialize config")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}
