use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::error::{SlidewrightError, SlidewrightResult};
use crate::repo::STORAGE_KEY;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigLoadError> for SlidewrightError {
    fn from(err: ConfigLoadError) -> Self {
        match err {
            ConfigLoadError::Config(e) => e.into(),
            ConfigLoadError::MissingRequired(key) => SlidewrightError::InvalidConfigValue {
                key,
                message: "Value is required".to_string(),
            },
            ConfigLoadError::InvalidValue { key, message } => {
                SlidewrightError::InvalidConfigValue { key, message }
            }
            ConfigLoadError::Io(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlidewrightConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub generate_images: bool,

    /// Reject slides with an empty title or content.
    #[serde(default)]
    pub require_slide_fields: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `file` or `memory`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_json_indent")]
    pub json_indent: usize,

    #[serde(default = "default_footer_text")]
    pub footer_text: String,

    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

// plain gemini-2.0-flash answers image requests with text only
fn default_image_model() -> String {
    "gemini-2.0-flash-preview-image-generation".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_storage_backend() -> String {
    "file".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json_indent() -> usize {
    2
}

fn default_footer_text() -> String {
    "AI Generated Presentation".to_string()
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M:%S UTC".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            text_model: default_model(),
            image_model: default_image_model(),
            request_timeout_secs: default_request_timeout(),
            generate_images: true,
            require_slide_fields: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            json_indent: default_json_indent(),
            footer_text: default_footer_text(),
            datetime_format: default_datetime_format(),
        }
    }
}

impl SlidewrightConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("SLIDEWRIGHT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut slidewright_config: SlidewrightConfig = config.try_deserialize()?;

        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            slidewright_config.generation.api_key = Some(key);
        } else if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            slidewright_config.generation.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("SLIDEWRIGHT_LOG_LEVEL") {
            slidewright_config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            slidewright_config.logging.level = level;
        }

        if let Ok(path) = std::env::var("SLIDEWRIGHT_STORAGE_PATH") {
            slidewright_config.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(port) = std::env::var("SLIDEWRIGHT_PORT") {
            if let Ok(port) = port.parse() {
                slidewright_config.server.port = port;
            }
        }

        slidewright_config.validate()?;

        Ok(slidewright_config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.port".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.generation.text_model.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "generation.text_model".to_string(),
            ));
        }

        if self.generation.image_model.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "generation.image_model".to_string(),
            ));
        }

        if self.generation.request_timeout_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "generation.request_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if !self.generation.api_base.starts_with("http://")
            && !self.generation.api_base.starts_with("https://")
        {
            return Err(ConfigLoadError::InvalidValue {
                key: "generation.api_base".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        let valid_backends = ["file", "memory"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(ConfigLoadError::InvalidValue {
                key: "storage.backend".to_string(),
                message: format!(
                    "Unknown backend '{}'. Must be one of: {:?}",
                    self.storage.backend, valid_backends
                ),
            });
        }

        // same directive syntax the CLI hands to its log filter
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!("Invalid log filter '{}': {}", self.logging.level, e),
            });
        }

        if self.export.json_indent > 8 {
            return Err(ConfigLoadError::InvalidValue {
                key: "export.json_indent".to_string(),
                message: "Must be between 0 and 8".to_string(),
            });
        }

        Ok(())
    }

    /// The API key, or `MissingEnvVar` when none is configured.
    pub fn require_api_key(&self) -> SlidewrightResult<&str> {
        match self.generation.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SlidewrightError::MissingEnvVar("GOOGLE_API_KEY".to_string())),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.request_timeout_secs)
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    /// Location of the presentation history file.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage
            .path
            .clone()
            .or_else(|| get_data_dir().map(|d| d.join(format!("{}.json", STORAGE_KEY))))
    }

    /// A copy safe to print, with the API key masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.generation.api_key = copy.generation.api_key.as_deref().map(mask_secret);
        copy
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "********".to_string()
    } else {
        format!("{}********", visible)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("slidewright.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("slidewright").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".slidewright").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".slidewright").join(".env"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("slidewright").join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slidewright"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("slidewright"))
}
