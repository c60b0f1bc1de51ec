use crate::error::{ClarifierError, Result};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of `POST /api/generate`, borrowed from the caller for one call.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
    options: SamplingOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SamplingOptions {
    temperature: f32,
    top_p: f32,
    num_predict: i32,
}

// Rule lookups want repeatable answers
const RULE_LOOKUP_SAMPLING: SamplingOptions = SamplingOptions {
    temperature: 0.1,
    top_p: 0.9,
    num_predict: 1024,
};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    total_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TaggedModel>,
}

#[derive(Debug, Deserialize)]
struct TaggedModel {
    name: String,
}

/// Thin client over the Ollama HTTP API: JSON-mode generation and model tags.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// `timeout` bounds a whole generation, not only the connect.
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Runs one non-streaming generation with `format: json` and returns the
    /// raw model text.
    pub async fn generate_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            system: system_prompt,
            prompt: user_prompt,
            stream: false,
            format: "json",
            options: RULE_LOOKUP_SAMPLING,
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = user_prompt.chars().count(),
            "Requesting Ollama generation"
        );

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| unreachable_service("generate", e))?;

        let generated: GenerateResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ClarifierError::ServiceError(format!("unreadable generate reply: {}", e)))?;

        if !generated.done {
            tracing::warn!(model = %self.model, "Ollama returned an unfinished generation");
        }
        tracing::debug!(
            model = %self.model,
            seconds = generated.total_duration.unwrap_or_default() as f64 / 1e9,
            output_chars = generated.response.len(),
            "Ollama generation complete"
        );

        Ok(generated.response)
    }

    async fn tags(&self) -> Result<TagsResponse> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| unreachable_service("tags", e))?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ClarifierError::ServiceError(format!("unreadable tags reply: {}", e)))
    }

    /// True when the service answers at all.
    pub async fn health_check(&self) -> Result<bool> {
        match self.tags().await {
            Ok(_) => Ok(true),
            Err(ClarifierError::ServiceError(reason)) => {
                tracing::warn!(%reason, "Ollama health check failed");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// True when the configured model (any tag of it) is installed.
    pub async fn verify_model(&self) -> Result<bool> {
        let tags = self.tags().await?;
        Ok(tags.models.iter().any(|m| model_matches(&m.name, &self.model)))
    }
}

/// `qwen2.5:7b` matches exactly; a bare `qwen2.5` matches any of its tags.
fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || installed
            .split_once(':')
            .is_some_and(|(name, _)| !wanted.contains(':') && name == wanted)
}

fn unreachable_service(call: &str, error: reqwest::Error) -> ClarifierError {
    ClarifierError::ServiceError(format!("Ollama {} request failed: {}", call, error))
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClarifierError::ServiceError(format!(
        "Ollama answered {}: {}",
        status, body
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> OllamaClient {
        OllamaClient::new(
            "http://localhost:11434/".to_string(),
            "qwen2.5:7b".to_string(),
            Duration::from_secs(60),
        )
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(local().url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "qwen2.5:7b",
            system: "referee",
            prompt: "foul",
            stream: false,
            format: "json",
            options: RULE_LOOKUP_SAMPLING,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_predict"], 1024);
    }

    #[test]
    fn test_model_matches() {
        assert!(model_matches("qwen2.5:7b", "qwen2.5:7b"));
        assert!(model_matches("qwen2.5:latest", "qwen2.5"));
        assert!(!model_matches("qwen2.5:14b", "qwen2.5:7b"));
        assert!(!model_matches("qwen2:7b", "qwen2.5"));
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is running
    async fn test_ollama_health_check() {
        assert!(local().health_check().await.unwrap());
    }
}
