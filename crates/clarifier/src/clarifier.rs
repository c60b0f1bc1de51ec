use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{ClarifierError, Result};
use crate::ollama_client::OllamaClient;
use crate::prompts::PromptTemplate;

pub const MAX_DESCRIPTION_CHARS: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClarifyRequest {
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub pelanggaran_description: String,
}

/// Rule matched to a foul description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Clarification {
    #[validate(custom(function = "not_blank"))]
    pub relevant_rule: String,
    #[validate(custom(function = "not_blank"))]
    pub rule_explanation: String,
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Explains which competition rule a described foul falls under.
#[async_trait]
pub trait RuleClarifier: Send + Sync {
    async fn clarify(&self, description: &str) -> Result<Clarification>;
}

/// Model output is checked against the `Clarification` schema before it is
/// handed out.
pub fn parse_clarification(raw: &str) -> Result<Clarification> {
    let clarification: Clarification = serde_json::from_str(raw.trim())
        .map_err(|e| ClarifierError::InvalidOutput(format!("not a clarification: {}", e)))?;

    clarification
        .validate()
        .map_err(|e| ClarifierError::InvalidOutput(e.to_string()))?;

    Ok(clarification)
}

#[derive(Debug, Clone)]
pub struct OllamaSettings {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// `RuleClarifier` backed by a local Ollama model. Every call is a fresh
/// inference request: no retry, no cache.
pub struct OllamaRuleClarifier {
    ollama: OllamaClient,
    template: PromptTemplate,
}

impl OllamaRuleClarifier {
    pub fn new(settings: OllamaSettings, template: PromptTemplate) -> Result<Self> {
        Ok(Self {
            ollama: OllamaClient::new(settings.base_url, settings.model, settings.timeout)?,
            template,
        })
    }

    pub async fn health_check(&self) -> Result<bool> {
        if !self.ollama.health_check().await? {
            return Ok(false);
        }
        self.ollama.verify_model().await
    }
}

#[async_trait]
impl RuleClarifier for OllamaRuleClarifier {
    async fn clarify(&self, description: &str) -> Result<Clarification> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ClarifierError::InvalidInput(
                "pelanggaran description is empty".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ClarifierError::InvalidInput(format!(
                "pelanggaran description exceeds {} characters",
                MAX_DESCRIPTION_CHARS
            )));
        }

        let raw = self
            .ollama
            .generate_json(
                self.template.system_prompt(),
                &self.template.user_prompt(description),
            )
            .await?;

        let clarification = parse_clarification(&raw)?;
        tracing::info!(
            model = self.ollama.model(),
            rule = %clarification.relevant_rule,
            "Pelanggaran clarified"
        );
        Ok(clarification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_output() {
        let raw = r#"{"relevantRule": "Pasal 17 ayat 2", "ruleExplanation": "Serangan ke leher dilarang."}"#;
        let clarification = parse_clarification(raw).unwrap();
        assert_eq!(clarification.relevant_rule, "Pasal 17 ayat 2");
    }

    #[test]
    fn test_parse_rejects_missing_or_blank_fields() {
        assert!(matches!(
            parse_clarification(r#"{"relevantRule": "Pasal 17"}"#),
            Err(ClarifierError::InvalidOutput(_))
        ));
        assert!(matches!(
            parse_clarification(r#"{"relevantRule": " ", "ruleExplanation": "x"}"#),
            Err(ClarifierError::InvalidOutput(_))
        ));
        assert!(parse_clarification("not json").is_err());
    }

    #[test]
    fn test_request_validation() {
        let blank = ClarifyRequest {
            pelanggaran_description: "   ".to_string(),
        };
        assert!(blank.validate().is_err());

        let ok = ClarifyRequest {
            pelanggaran_description: "Menendang kemaluan lawan".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request: ClarifyRequest =
            serde_json::from_str(r#"{"pelanggaranDescription": "Mendorong keluar"}"#).unwrap();
        assert_eq!(request.pelanggaran_description, "Mendorong keluar");
    }

    #[tokio::test]
    async fn test_empty_description_rejected_before_network() {
        let clarifier =
            OllamaRuleClarifier::new(OllamaSettings::default(), PromptTemplate::default()).unwrap();
        assert!(matches!(
            clarifier.clarify("  ").await,
            Err(ClarifierError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is running
    async fn test_clarify_against_local_model() {
        let clarifier =
            OllamaRuleClarifier::new(OllamaSettings::default(), PromptTemplate::default()).unwrap();
        let result = clarifier
            .clarify("Pesilat merah memukul bagian belakang kepala lawan")
            .await;
        assert!(result.is_ok());
    }
}
