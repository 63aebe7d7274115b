//! AI review drafting port.

use async_trait::async_trait;

use crate::domain::ReviewPrompt;

/// Drafts review text from a customer's prompt.
#[async_trait]
pub trait ReviewTextGenerator: Send + Sync {
    async fn generate(&self, prompt: &ReviewPrompt) -> Result<String, GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Request to provider failed: {0}")]
    Transport(String),

    #[error("Provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Provider response had no text")]
    EmptyResponse,
}
