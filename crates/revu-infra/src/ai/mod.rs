//! Review drafting through an OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use revu_core::domain::ReviewPrompt;
use revu_core::ports::{GenerationError, ReviewTextGenerator};

const SYSTEM_PROMPT: &str =
    "You help restaurant and retail customers put their experience into words. \
     Reply with the review text only.";

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ReviewAiConfig {
    /// Full chat completions endpoint URL.
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl ReviewAiConfig {
    /// Returns `None` unless both `REVIEW_AI_URL` and `REVIEW_AI_KEY` are set.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("REVIEW_AI_URL").ok()?;
        let api_key = std::env::var("REVIEW_AI_KEY").ok()?;

        Some(Self {
            url,
            api_key,
            model: std::env::var("REVIEW_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout: Duration::from_secs(
                std::env::var("REVIEW_AI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP review generator.
pub struct HttpReviewGenerator {
    client: reqwest::Client,
    config: ReviewAiConfig,
}

impl HttpReviewGenerator {
    pub fn new(config: ReviewAiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn request_body(&self, prompt: &ReviewPrompt) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.instructions(),
                },
            ],
            temperature: 0.8,
        }
    }
}

fn first_text(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .map(|c| c.message.content)
        .find(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

#[async_trait]
impl ReviewTextGenerator for HttpReviewGenerator {
    async fn generate(&self, prompt: &ReviewPrompt) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        first_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> HttpReviewGenerator {
        HttpReviewGenerator::new(ReviewAiConfig {
            url: "http://localhost:9/v1/chat/completions".to_string(),
            api_key: "test".to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_carries_instructions() {
        let prompt = ReviewPrompt {
            outlet_name: "Kopi Corner".into(),
            rating: 5,
            highlights: vec!["kaya toast".into()],
            language: "ms".into(),
        };

        let generator = generator();
        let body = serde_json::to_value(generator.request_body(&prompt)).unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], prompt.instructions());
    }

    #[test]
    fn test_first_non_empty_choice_wins() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  " } },
                { "message": { "role": "assistant", "content": "Lovely place." } }
            ]
        }))
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "Lovely place.");

        let empty: ChatResponse = serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert!(matches!(first_text(empty), Err(GenerationError::EmptyResponse)));
    }
}
