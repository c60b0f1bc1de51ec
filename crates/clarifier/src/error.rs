use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClarifierError>;

#[derive(Error, Debug)]
pub enum ClarifierError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Model service error: {0}")]
    ServiceError(String),

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prompt template error: {0}")]
    TemplateError(String),
}

impl ClarifierError {
    /// True when the failure lies with the model service rather than the
    /// caller's input.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }
}
