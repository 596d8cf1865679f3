use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Default Whisper model size (tiny/base/small/medium/large)
    pub default_model: Option<String>,
    /// Default transcription language hint
    pub default_lang: Option<String>,
    /// Default caption language preference order, comma-separated
    pub default_sub_langs: Option<String>,
}

impl Config {
    /// Load config from ~/.config/subdown/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("subdown")
        .join("config.toml")
}
