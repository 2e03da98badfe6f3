//! Configuration file support

use devshell_core::RevealCadence;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for devshell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether to use TUI mode by default
    pub tui: bool,
    /// Color theme (dark, light)
    pub theme: String,
    /// Simulated delay before a reply appears
    pub response_latency_ms: u64,
    /// Per-character reveal cadence
    pub cadence: CadenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tui: true,
            theme: "dark".to_string(),
            response_latency_ms: 1500,
            cadence: CadenceConfig::default(),
        }
    }
}

/// Reveal cadence in milliseconds per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub content_ms: u64,
    pub thinking_ms: u64,
    pub terminal_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            content_ms: 15,
            thinking_ms: 10,
            terminal_ms: 5,
        }
    }
}

impl From<CadenceConfig> for RevealCadence {
    fn from(c: CadenceConfig) -> Self {
        RevealCadence {
            content: Duration::from_millis(c.content_ms),
            thinking: Duration::from_millis(c.thinking_ms),
            terminal: Duration::from_millis(c.terminal_ms),
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("devshell")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("DEVSHELL_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load config from file, falling back to defaults on any problem
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "failed to parse config file: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read config file: {e}");
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }
        Config::default().save()?;
        Ok(path)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.response_latency_ms)
    }

    pub fn reveal_cadence(&self) -> RevealCadence {
        self.cadence.into()
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# devshell configuration file
# Place at ~/.config/devshell/config.toml (Linux) or set DEVSHELL_CONFIG_PATH

# Whether to use TUI mode by default
# Set to false for line mode on stdin/stdout
tui = true

# Color theme (dark, light)
theme = "dark"

# Delay before a reply appears, in milliseconds
response_latency_ms = 1500

# Milliseconds per revealed character
[cadence]
content_ms = 15
thinking_ms = 10
terminal_ms = 5
"#
}
