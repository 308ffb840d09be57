use core_config::{ConfigError, FromEnv, env_or_default};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Where the Ollama server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    pub url: String,
}

impl OllamaConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub(crate) fn pull_url(&self) -> String {
        format!("{}/api/pull", self.url.trim_end_matches('/'))
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL)
    }
}

impl FromEnv for OllamaConfig {
    /// - OLLAMA_URL: base URL, default `http://localhost:11434`
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(env_or_default("OLLAMA_URL", DEFAULT_OLLAMA_URL)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        temp_env::with_var_unset("OLLAMA_URL", || {
            let config = OllamaConfig::from_env().unwrap();
            assert_eq!(config.url, DEFAULT_OLLAMA_URL);
            assert_eq!(config.pull_url(), "http://localhost:11434/api/pull");
        });
    }

    #[test]
    fn test_url_override_strips_trailing_slash() {
        temp_env::with_var("OLLAMA_URL", Some("http://gpu-box:11434/"), || {
            let config = OllamaConfig::from_env().unwrap();
            assert_eq!(config.pull_url(), "http://gpu-box:11434/api/pull");
        });
    }
}
