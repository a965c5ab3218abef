use async_trait::async_trait;

use crate::types::LLMMessage;

/// The external chat endpoint. Implementations own transport and auth.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, model: &str, messages: &[LLMMessage]) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Response blocked by safety filters: {0}")]
    Blocked(String),

    #[error("Rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Chat request failed: {0}")]
    Failed(String),
}

impl ChatError {
    /// Sort a raw provider error message into a category.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("blocked") || lower.contains("safety") {
            ChatError::Blocked(message)
        } else if lower.contains("quota") || lower.contains("limit") {
            ChatError::RateLimited(message)
        } else if lower.contains("key") || lower.contains("authentication") {
            ChatError::Auth(message)
        } else {
            ChatError::Failed(message)
        }
    }

    /// Short text suitable for showing to the end user
    pub fn user_hint(&self) -> String {
        match self {
            ChatError::Blocked(_) => {
                "The response was blocked by safety filters. Please try rephrasing your question."
                    .to_string()
            }
            ChatError::RateLimited(_) => {
                "API quota exceeded or rate limit reached. Please try again later.".to_string()
            }
            ChatError::Auth(_) => "API key issue. Please check your API key configuration.".to_string(),
            ChatError::Failed(message) => format!("An error occurred: {message}"),
        }
    }
}
