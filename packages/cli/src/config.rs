use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vellum_editor::StoreConfig;
use vellum_tokens::TokenResolver;

pub const DEFAULT_CONFIG_NAME: &str = "vellum.config.json";

/// Vellum configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Token schema JSON, relative to the config file
    pub tokens: Option<String>,

    /// History and validation settings for the document store
    pub store: StoreConfig,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tokens: None,
            store: StoreConfig::default(),
            log_level: "info".to_string(),
            pretty: true,
        }
    }
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Cannot read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config in {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Token path from the command line if given, otherwise from the config
    pub fn tokens_path(&self, cwd: &Path, flag: Option<&Path>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.tokens.as_ref().map(|tokens| cwd.join(tokens)))
    }

    pub fn load_tokens(&self, cwd: &Path, flag: Option<&Path>) -> Result<TokenResolver> {
        let Some(path) = self.tokens_path(cwd, flag) else {
            return Ok(TokenResolver::empty());
        };
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read token schema {}", path.display()))?;
        TokenResolver::from_json(&json).with_context(|| format!("Invalid token schema {}", path.display()))
    }

    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}
