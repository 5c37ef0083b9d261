use serde::{Deserialize, Serialize};

use super::directory::Directory;
use crate::error::{BotError, Result};

fn default_prefix() -> String {
    "!".to_string()
}

fn default_liveness_port() -> u16 {
    8080
}

fn default_log_file() -> Option<String> {
    Some("discord.log".to_string())
}

/// Top-level bot settings
/// Loaded from an optional JSON file, then overridden from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotSettings {
    /// Prefix for text commands (`!setup`, `!hello`)
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Port for the liveness HTTP endpoint
    #[serde(default = "default_liveness_port")]
    pub liveness_port: u16,

    /// File receiving a copy of the process log, truncated on startup
    #[serde(default = "default_log_file")]
    pub log_file: Option<String>,

    #[serde(default)]
    pub directory: Directory,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            liveness_port: default_liveness_port(),
            log_file: default_log_file(),
            directory: Directory::default(),
        }
    }
}

impl BotSettings {
    /// Load from a JSON file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BotError::ConfigLoad {
            path: path.to_string(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| BotError::ConfigParse {
            path: path.to_string(),
            source: e,
        })
    }

    /// Load settings from `path` (if any) and the process environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("COMMAND_PREFIX") {
            self.prefix = prefix.trim().to_string();
        }

        if let Some(port) = lookup("LIVENESS_PORT") {
            self.liveness_port =
                port.trim()
                    .parse()
                    .map_err(|e| BotError::ConfigValidation {
                        message: format!("LIVENESS_PORT must be a port number, got '{}': {}", port, e),
                    })?;
        }

        if let Some(log_file) = lookup("LOG_FILE") {
            let log_file = log_file.trim();
            self.log_file = if log_file.is_empty() {
                None
            } else {
                Some(log_file.to_string())
            };
        }

        self.directory.apply_overrides(lookup)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(BotError::ConfigValidation {
                message: "command prefix must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
