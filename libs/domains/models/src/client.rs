use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::config::OllamaConfig;
use crate::error::{ModelError, ModelResult};

/// Result of asking Ollama to pull a model.
///
/// A non-2xx answer from Ollama is still an outcome, not an error: the
/// upstream status and body are passed through to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub status: StatusCode,
    pub detail: String,
    pub error: Option<String>,
}

impl PullOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// Thin client for the Ollama model registry endpoints.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Pull `name` and wait until Ollama reports the download finished.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn pull_model(&self, name: &str) -> ModelResult<PullOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::Validation(
                "Model name must not be blank".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.config.pull_url())
            .json(&PullRequest {
                name,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(%status, "Model pull completed");
            return Ok(PullOutcome {
                status,
                detail: format!("Model '{}' download completed.", name),
                error: None,
            });
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, body = %body, "Model pull rejected");
        Ok(PullOutcome {
            status,
            detail: format!("Failed to start download for model '{}'.", name),
            error: Some(body),
        })
    }
}
