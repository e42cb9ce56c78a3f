use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const API_KEY_ENV_FALLBACK: &str = "GOOGLE_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the Gemini API; the environment takes precedence
    pub api_key: Option<String>,

    /// Base URL of the generative language API
    pub api_base: String,

    /// Model used for chat, refinement and image analysis
    pub text_model: String,

    /// Model used for image generation
    pub image_model: String,

    /// Optional HTTP timeout; unset leaves it to the transport
    pub request_timeout_secs: Option<u64>,

    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,

    /// UI preferences
    pub ui: UiConfig,

    /// Sparkle home directory
    #[serde(skip)]
    pub sparkle_home: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long informational notices stay visible
    pub notice_secs: u64,
    /// Characters quoted when preparing a reply
    pub reply_excerpt_chars: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_secs: 3,
            reply_excerpt_chars: crate::prompts::REPLY_EXCERPT_CHARS,
        }
    }
}

impl UiConfig {
    pub fn notice_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.notice_secs as i64)
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.0-flash".to_string(),
            image_model: "imagen-3.0-generate-002".to_string(),
            request_timeout_secs: None,
            log_filter: "info".to_string(),
            ui: UiConfig::default(),
            sparkle_home: home.join(".sparkle"),
        }
    }
}

impl Config {
    /// Load configuration from `~/.sparkle/config.toml`, creating the directory if needed
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let sparkle_home = home.join(".sparkle");

        fs::create_dir_all(&sparkle_home)
            .context("Failed to create .sparkle directory")?;

        Self::load_from(&sparkle_home)
    }

    /// Load configuration from `<dir>/config.toml`, falling back to defaults when absent
    pub fn load_from(sparkle_home: &Path) -> Result<Self> {
        let config_path = sparkle_home.join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content)
                .context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.sparkle_home = sparkle_home.to_path_buf();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.sparkle_home)
            .context("Failed to create .sparkle directory")?;
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(self.config_path(), content)
            .context("Failed to write config file")?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.sparkle_home.join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.sparkle_home.join("sparkle.log")
    }

    /// Check if API key is configured
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }

    /// Get API key from the environment or config
    pub fn get_api_key(&self) -> Option<String> {
        [API_KEY_ENV, API_KEY_ENV_FALLBACK]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    /// Update API key
    pub fn set_api_key(&mut self, key: String) {
        self.api_key = Some(key);
    }
}
