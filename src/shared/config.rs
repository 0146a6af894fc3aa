//! Application configuration. Bot credentials, inference app address, paths.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-call bound on the inference service, in seconds.
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Discord bot token. Read from OVERLAY_BOT_DISCORD_TOKEN, DISCORD_TOKEN or BOT_TOKEN.
    #[serde(default)]
    pub discord_token: Option<String>,

    /// Discord application id, used for the invite link. Read from APPLICATION_ID.
    #[serde(default)]
    pub application_id: Option<u64>,

    /// Gradio app URL or Hugging Face Space id. Read from HUGGINGFACE_SPACE_NAME.
    #[serde(default)]
    pub space: Option<String>,

    /// Hugging Face token for private Spaces. Read from HF_TOKEN.
    #[serde(default)]
    pub hf_token: Option<String>,

    /// Endpoint name on the Gradio app (default "/predict").
    #[serde(default)]
    pub api_name: Option<String>,

    /// Command prefix (default "?").
    #[serde(default)]
    pub command_prefix: Option<String>,

    /// Directory for temporary upload copies (default: OS temp dir + "overlay-bot").
    #[serde(default)]
    pub temp_dir: Option<String>,

    /// Bound on one inference call in seconds (default 120). Read from OVERLAY_BOT_INFERENCE_TIMEOUT_SECS.
    #[serde(default)]
    pub inference_timeout_secs: Option<u64>,

    /// Directory for bot.log (default "logs"). Empty string disables file logging.
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("OVERLAY_BOT"));
        if let Ok(path) = std::env::var("OVERLAY_BOT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Numeric values from the environment arrive as strings; parse them directly.
        if let Ok(s) = std::env::var("OVERLAY_BOT_INFERENCE_TIMEOUT_SECS") {
            if let Ok(secs) = s.parse::<u64>() {
                cfg.inference_timeout_secs = Some(secs);
            }
        }
        if cfg.application_id.is_none() {
            cfg.application_id = std::env::var("APPLICATION_ID")
                .ok()
                .and_then(|s| s.trim().parse().ok());
        }
        Ok(cfg)
    }

    /// Returns the bot token from config, DISCORD_TOKEN or BOT_TOKEN.
    pub fn discord_token(&self) -> Option<String> {
        self.discord_token
            .clone()
            .or_else(|| std::env::var("DISCORD_TOKEN").ok())
            .or_else(|| std::env::var("BOT_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// Returns the inference app from config or HUGGINGFACE_SPACE_NAME.
    pub fn space(&self) -> Option<String> {
        self.space
            .clone()
            .or_else(|| std::env::var("HUGGINGFACE_SPACE_NAME").ok())
            .filter(|s| !s.trim().is_empty())
    }

    /// Returns the Hugging Face token from config or HF_TOKEN.
    pub fn hf_token(&self) -> Option<String> {
        self.hf_token
            .clone()
            .or_else(|| std::env::var("HF_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn api_name_or_default(&self) -> String {
        self.api_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "/predict".to_string())
    }

    pub fn command_prefix_or_default(&self) -> String {
        self.command_prefix
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn temp_dir_or_default(&self) -> PathBuf {
        self.temp_dir
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("overlay-bot"))
    }

    /// Returns the inference timeout. Zero is treated as unset.
    pub fn inference_timeout(&self) -> Duration {
        let secs = self
            .inference_timeout_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_INFERENCE_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Returns the log directory, or None when file logging is disabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        match self.log_dir.as_deref() {
            Some("") => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from("logs")),
        }
    }
}
