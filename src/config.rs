//! Configuration management for the file drop server
//!
//! Settings come from `config.toml` layered with `FILE_DROP__*` environment
//! variables. Everything is read once at startup.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Locations searched for `config.toml`, in order
const CONFIG_PATHS: [&str; 2] = [
    "file-drop/config", // Docker: /app/file-drop/config.toml
    "config",           // Local development: ./config.toml
];

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the control listener binds to
    pub bind_address: String,

    /// Port of the control listener, 0 picks an ephemeral port
    pub port: u16,

    /// Directory uploaded files are stored in
    pub upload_dir: String,

    /// Maximum concurrent clients
    pub max_clients: usize,

    /// Maximum accepted upload size in MB
    pub max_file_size_mb: u64,

    /// Maximum length of one command line
    pub max_command_length: usize,

    /// Log the `data` entries of uploaded JSON payloads
    pub inspect_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 2121,
            upload_dir: "./uploads".to_string(),
            max_clients: 10,
            max_file_size_mb: 100,
            max_command_length: 512,
            inspect_json: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = Self::with_defaults(Config::builder())?;
        for path in CONFIG_PATHS {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("FILE_DROP").separator("__"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single explicit file, without environment overrides
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(path))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = Self::default();
        builder
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("upload_dir", defaults.upload_dir)?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("max_file_size_mb", defaults.max_file_size_mb as i64)?
            .set_default("max_command_length", defaults.max_command_length as i64)?
            .set_default("inspect_json", defaults.inspect_json)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.upload_dir.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "upload_dir cannot be empty".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_file_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_file_size_mb must be greater than 0".into(),
            ));
        }

        if self.max_command_length < 16 {
            return Err(config::ConfigError::Message(
                "max_command_length must be at least 16".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn upload_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.upload_dir)
    }

    /// Get maximum file size in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}
