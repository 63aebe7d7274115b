//! AI-assisted review drafting.

use std::sync::Arc;

use crate::domain::ReviewPrompt;
use crate::error::DomainError;
use crate::ports::{GenerationError, ReviewTextGenerator};

/// Validates prompts and delegates to the configured generator, if any.
#[derive(Clone)]
pub struct ReviewWriter {
    generator: Option<Arc<dyn ReviewTextGenerator>>,
}

impl ReviewWriter {
    pub fn new(generator: Option<Arc<dyn ReviewTextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn generate(&self, prompt: &ReviewPrompt) -> Result<String, DomainError> {
        prompt.validate()?;

        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| DomainError::Unavailable("review generation is not configured".into()))?;

        let text = generator.generate(prompt).await.map_err(|e| {
            tracing::warn!(error = %e, "Review generation failed");
            match e {
                GenerationError::EmptyResponse => {
                    DomainError::Upstream("provider returned no text".into())
                }
                other => DomainError::Upstream(other.to_string()),
            }
        })?;

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl ReviewTextGenerator for Echo {
        async fn generate(&self, prompt: &ReviewPrompt) -> Result<String, GenerationError> {
            Ok(format!("  Loved {}!  ", prompt.outlet_name))
        }
    }

    struct Silent;

    #[async_trait]
    impl ReviewTextGenerator for Silent {
        async fn generate(&self, _prompt: &ReviewPrompt) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyResponse)
        }
    }

    fn prompt() -> ReviewPrompt {
        ReviewPrompt {
            outlet_name: "Kopi Corner".into(),
            rating: 4,
            highlights: vec![],
            language: "en".into(),
        }
    }

    #[tokio::test]
    async fn test_generate_trims_output() {
        let writer = ReviewWriter::new(Some(Arc::new(Echo)));
        assert_eq!(writer.generate(&prompt()).await.unwrap(), "Loved Kopi Corner!");
    }

    #[tokio::test]
    async fn test_unconfigured_writer_is_unavailable() {
        let writer = ReviewWriter::new(None);
        assert!(!writer.is_enabled());
        assert!(matches!(
            writer.generate(&prompt()).await,
            Err(DomainError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_prompt_is_rejected_before_generation() {
        let writer = ReviewWriter::new(Some(Arc::new(Echo)));
        let mut p = prompt();
        p.rating = 9;
        assert!(matches!(writer.generate(&p).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_is_upstream_error() {
        let writer = ReviewWriter::new(Some(Arc::new(Silent)));
        assert!(matches!(
            writer.generate(&prompt()).await,
            Err(DomainError::Upstream(_))
        ));
    }
}
