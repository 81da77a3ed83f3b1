// src/llm/mod.rs
// The language model boundary. Curio treats the provider as a black box:
// send text, receive text. Concrete clients live outside this crate.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, input: &str) -> Result<String>;
}
