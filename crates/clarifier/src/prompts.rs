use std::path::Path;

use crate::error::{ClarifierError, Result};

pub const DESCRIPTION_PLACEHOLDER: &str = "{{description}}";

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert referee of Pencak Silat competitions under the IPSI / PERSILAT competition regulations.
A judge describes a pelanggaran (foul) observed during a tanding match. Identify the single most relevant rule and explain it.

Output ONLY valid JSON with exactly these fields:
{
  "relevantRule": "rule name and article number",
  "ruleExplanation": "short explanation of the rule and the sanction it carries (teguran, peringatan or diskualifikasi)"
}

Answer in the language of the description."#;

const DEFAULT_USER_PROMPT: &str = "Pelanggaran description:\n\n{{description}}";

/// Prompt text for the rule clarifier. Loaded as configuration so the wording
/// can change without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: String,
    user: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Result<Self> {
        let template = Self {
            system: system.into(),
            user: user.into(),
        };
        if !template.user.contains(DESCRIPTION_PLACEHOLDER) {
            return Err(ClarifierError::TemplateError(format!(
                "user prompt must contain {}",
                DESCRIPTION_PLACEHOLDER
            )));
        }
        Ok(template)
    }

    /// Reads a template file: system prompt, a line with `---`, user prompt.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ClarifierError::TemplateError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let (system, user) = raw.split_once("\n---\n").ok_or_else(|| {
            ClarifierError::TemplateError("expected a '---' line between system and user prompt".to_string())
        })?;
        Self::new(system.trim(), user.trim())
    }

    pub fn system_prompt(&self) -> &str {
        &self.system
    }

    pub fn user_prompt(&self, description: &str) -> String {
        self.user.replace(DESCRIPTION_PLACEHOLDER, description)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            user: DEFAULT_USER_PROMPT.to_string(),
        }
    }
}
