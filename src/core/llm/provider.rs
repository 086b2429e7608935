//! LLM Provider Trait

use async_trait::async_trait;

use super::error::Result;
use super::types::{ChatMessage, ChatRequest, ChatResponse};

/// A chat-completion backend.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Stable provider identifier, e.g. `openai`
    fn id(&self) -> &str;

    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Model used for completions
    fn model(&self) -> &str;

    /// Send a chat completion request
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Send a single user prompt and return the completion text.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]).with_max_tokens(max_tokens);
        Ok(self.chat(request).await?.content)
    }

    /// Release any resources held by the provider.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
