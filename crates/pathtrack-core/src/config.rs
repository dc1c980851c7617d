use crate::error::PathtrackError;
use crate::extraction::DEFAULT_MIN_SELECTABLE_CHARS;
use crate::llm::RetryPolicy;
use crate::store::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runtime settings, read from TOML. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub min_selectable_chars: usize,
    pub ocr_language: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub multiplier: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub batch_size: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_selectable_chars: DEFAULT_MIN_SELECTABLE_CHARS,
            ocr_language: "eng".to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_attempts: 3,
            base_delay_ms: 800,
            multiplier: 2,
            timeout_secs: 60,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Load settings from `path`. No path, or a path that does not exist,
    /// gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, PathtrackError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PathtrackError> {
        let config: Config =
            toml::from_str(content).map_err(|e| PathtrackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PathtrackError> {
        if self.store.batch_size == 0 {
            return Err(PathtrackError::Config("store.batch_size must be at least 1".into()));
        }
        if self.llm.max_attempts == 0 {
            return Err(PathtrackError::Config("llm.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

impl LlmConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.multiplier,
        }
    }

    /// The API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, PathtrackError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PathtrackError::Config(format!("{} is not set", self.api_key_env)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_retry_policy() {
        let config = Config::default();
        assert_eq!(config.llm.retry_policy(), RetryPolicy::default());
        assert_eq!(config.store.batch_size, 500);
        assert_eq!(config.extraction.min_selectable_chars, 30);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str(
            "[llm]\nmodel = \"gpt-4o\"\n\n[extraction]\nocr_language = \"eng+deu\"\n",
        )
        .unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_attempts, 3);
        assert_eq!(config.extraction.ocr_language, "eng+deu");
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("[store]\nbatch = 10\n").unwrap_err();
        assert!(matches!(err, PathtrackError::Config(_)));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(Config::from_toml_str("[store]\nbatch_size = 0\n").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_missing_api_key_env() {
        let llm = LlmConfig {
            api_key_env: "PATHTRACK_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(llm.api_key(), Err(PathtrackError::Config(_))));
    }
}
