pub mod clarifier;
pub mod error;
pub mod ollama_client;
pub mod prompts;

pub use clarifier::{
    Clarification, ClarifyRequest, OllamaRuleClarifier, OllamaSettings, RuleClarifier,
    parse_clarification,
};
pub use error::{ClarifierError, Result};
pub use prompts::PromptTemplate;
