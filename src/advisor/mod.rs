//! Advice generation on top of the chat client.
//!
//! [`AdviceGenerator`] is the seam between the caching pipeline and the LLM
//! provider. Implementations must not fail: upstream errors turn into a
//! fixed fallback text, which the caller treats like any other advice.

pub mod analysis;

use crate::client::ChatClient;
use crate::types::Specialist;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub use analysis::{
    parse_calibration, AnalysisRequest, DailyTipsRequest, NutritionData, WorkoutData,
};

#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, specialist: Specialist) -> String;
}

/// Text returned in place of advice when the provider is unavailable.
pub fn fallback_advice(specialist: Specialist) -> String {
    format!(
        "Recommendations from the {} are temporarily unavailable. Please try again later.",
        specialist
    )
}

/// [`AdviceGenerator`] backed by the chat-completions client.
pub struct OpenRouterAdvisor {
    client: Arc<ChatClient>,
    max_tokens: u32,
}

impl OpenRouterAdvisor {
    pub fn new(client: Arc<ChatClient>) -> Self {
        Self {
            client,
            max_tokens: 2000,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl AdviceGenerator for OpenRouterAdvisor {
    async fn generate(&self, prompt: &str, specialist: Specialist) -> String {
        let result = self
            .client
            .chat()
            .system(specialist.system_prompt())
            .user(prompt)
            .max_tokens(self.max_tokens)
            .execute()
            .await;
        match result {
            Ok(advice) => advice,
            Err(e) => {
                warn!(specialist = specialist.as_str(), error = %e, "advice generation failed");
                fallback_advice(specialist)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_names_specialist() {
        for s in Specialist::ALL {
            assert!(fallback_advice(s).contains(s.as_str()));
        }
    }
}
