//! TOML configuration.
//!
//! ```toml
//! channels = ["https://www.youtube.com/@SomeChannel"]
//!
//! [data]
//! path = "./data.json"
//!
//! [display]
//! days_to_show = 7
//!
//! [fetch]
//! request_delay_ms = 1000
//! timeout_secs = 15
//!
//! [ai]
//! provider = "disabled"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub channels: Vec<String>,
    #[serde(default)]
    pub data: DataConfig,
    pub display: DisplayConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    pub days_to_show: i64,
}

impl DisplayConfig {
    /// Validated window. `load_config` rejects anything below 1.
    pub fn window_days(&self) -> u32 {
        u32::try_from(self.days_to_show).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_request_delay_ms() -> u64 {
    1000
}
fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; feedroll/0.1)".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key_env_var: None,
            max_retries: default_max_retries(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_ai_timeout_secs() -> u64 {
    60
}

impl AiConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// Defaults for commands that can run without a config file
    /// (`stats`, `changed` against an explicit `--data` path).
    pub fn minimal() -> Self {
        Self {
            channels: Vec::new(),
            data: DataConfig::default(),
            display: DisplayConfig { days_to_show: 7 },
            fetch: FetchConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.channels.is_empty() {
        anyhow::bail!("channels must be a non-empty list");
    }

    if config.display.days_to_show < 1 {
        anyhow::bail!("display.days_to_show must be a positive integer");
    }

    match config.ai.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown ai provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }

    if config.ai.is_enabled() {
        if config.ai.model.is_none() {
            anyhow::bail!(
                "ai.model must be specified when provider is '{}'",
                config.ai.provider
            );
        }
        if config.ai.api_key_env_var.is_none() {
            anyhow::bail!(
                "ai.api_key_env_var must be specified when provider is '{}'",
                config.ai.provider
            );
        }
    }

    config.channels = dedup_channels(std::mem::take(&mut config.channels));

    info!(
        channels = config.channels.len(),
        days_to_show = config.display.days_to_show,
        "config loaded"
    );
    Ok(config)
}

fn dedup_channels(channels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(channels.len());
    for ch in channels {
        if seen.insert(ch.clone()) {
            unique.push(ch);
        } else {
            warn!(url = %ch, "duplicate channel URL removed");
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
channels = ["https://www.youtube.com/@Test"]

[display]
days_to_show = 7

[ai]
provider = "gemini"
model = "gemini-2.0-flash"
api_key_env_var = "GEMINI_API_KEY"
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_valid_config() {
        let f = write_config(VALID);
        let config = load_config(f.path()).unwrap();
        assert_eq!(config.ai.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(config.channels.len(), 1);
        assert_eq!(config.display.window_days(), 7);
        assert_eq!(config.data.path, PathBuf::from("./data.json"));
        assert_eq!(config.fetch.request_delay_ms, 1000);
    }

    #[test]
    fn missing_ai_model_fails() {
        let f = write_config(&VALID.replace("model = \"gemini-2.0-flash\"\n", ""));
        let err = load_config(f.path()).unwrap_err().to_string();
        assert!(err.contains("ai.model"), "{}", err);
    }

    #[test]
    fn ai_section_is_optional() {
        let f = write_config(
            "channels = [\"https://www.youtube.com/@Test\"]\n[display]\ndays_to_show = 3\n",
        );
        let config = load_config(f.path()).unwrap();
        assert!(!config.ai.is_enabled());
    }

    #[test]
    fn empty_channels_fails() {
        let f = write_config(&VALID.replace("[\"https://www.youtube.com/@Test\"]", "[]"));
        let err = load_config(f.path()).unwrap_err().to_string();
        assert!(err.contains("channels"), "{}", err);
    }

    #[test]
    fn negative_days_fails() {
        let f = write_config(&VALID.replace("days_to_show = 7", "days_to_show = -1"));
        let err = load_config(f.path()).unwrap_err().to_string();
        assert!(err.contains("days_to_show"), "{}", err);
    }

    #[test]
    fn oversized_window_is_capped() {
        let f = write_config(&VALID.replace("days_to_show = 7", "days_to_show = 99999999999"));
        let config = load_config(f.path()).unwrap();
        assert_eq!(config.display.window_days(), u32::MAX);
    }

    #[test]
    fn unknown_provider_fails() {
        let f = write_config(&VALID.replace("\"gemini\"", "\"palm\""));
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn deduplicates_channels() {
        let f = write_config(&VALID.replace(
            "[\"https://www.youtube.com/@Test\"]",
            "[\"https://www.youtube.com/@Test\", \"https://www.youtube.com/@Test\", \"https://www.youtube.com/@Other\"]",
        ));
        let config = load_config(f.path()).unwrap();
        assert_eq!(
            config.channels,
            vec![
                "https://www.youtube.com/@Test".to_string(),
                "https://www.youtube.com/@Other".to_string()
            ]
        );
    }

    #[test]
    fn missing_file_fails() {
        assert!(load_config(Path::new("/nonexistent/feedroll.toml")).is_err());
    }
}
