use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::difficulty::Difficulty;
use crate::engine::scoring::StreakRule;

pub const API_URL_ENV: &str = "POEM_SCRAMBLE_API_URL";
pub const API_KEY_ENV: &str = "POEM_SCRAMBLE_API_KEY";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_penalty")]
    pub presence_penalty: f32,
    #[serde(default = "default_penalty")]
    pub frequency_penalty: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_duplicate_retries")]
    pub max_duplicate_retries: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Reproduce the best-streak bookkeeping of older saves.
    #[serde(default)]
    pub legacy_best_streak: bool,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("poem-scramble")
        .to_string_lossy()
        .to_string()
}
fn default_model() -> String {
    "Doubao-lite-4k".to_string()
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_temperature() -> f32 {
    0.7
}
fn default_penalty() -> f32 {
    1.0
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_duplicate_retries() -> u32 {
    3
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            presence_penalty: default_penalty(),
            frequency_penalty: default_penalty(),
            timeout_secs: default_timeout_secs(),
            max_duplicate_retries: default_max_duplicate_retries(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            data_dir: default_data_dir(),
            generator: GeneratorConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("poem-scramble")
            .join("config.toml")
    }

    /// Endpoint and key may come from the environment; it wins over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.generator.api_url = Some(url);
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.generator.api_key = Some(key);
        }
    }

    pub fn streak_rule(&self) -> StreakRule {
        if self.scoring.legacy_best_streak {
            StreakRule::Legacy
        } else {
            StreakRule::Exact
        }
    }
}
