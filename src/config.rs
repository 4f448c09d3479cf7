use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_index_path")]
    pub index_path: String,

    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_num_predict")]
    pub num_predict: u32,

    /// Minimum full-text score required to trust a fuzzy match over
    /// falling back to generation.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,

    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

fn data_dir() -> PathBuf {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deskhelp");
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn default_db_path() -> String {
    data_dir().join("faq.db").to_string_lossy().to_string()
}

fn default_index_path() -> String {
    data_dir().join("faq-index").to_string_lossy().to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_num_predict() -> u32 {
    2048
}

fn default_relevance_threshold() -> f32 {
    0.3
}

fn default_history_limit() -> u32 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            index_path: default_index_path(),
            ollama_url: default_ollama_url(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            num_predict: default_num_predict(),
            relevance_threshold: default_relevance_threshold(),
            history_limit: default_history_limit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deskhelp")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.model, "mistral");
        assert_eq!(config.relevance_threshold, 0.3);
        assert_eq!(config.history_limit, 10);
        assert!(!config.db_path.is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(r#"model = "llama3""#).unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.relevance_threshold, 0.3);
        assert_eq!(config.num_predict, 2048);
    }
}
