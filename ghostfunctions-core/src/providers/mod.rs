//! Completion backends
//!
//! A backend turns a conversation into a [`CompletionResult`]. The default
//! [`OpenAIBackend`] talks to the OpenAI chat completions API; anything else
//! implementing [`CompletionBackend`] can be injected in its place.

mod error;
pub mod openai;

pub use error::{BackendError, BackendResult};
pub use openai::OpenAIBackend;

use crate::protocol::{CompletionResult, Message};
use async_trait::async_trait;
use std::sync::Arc;

/// Passthrough options forwarded verbatim to the backend on every call
pub type CompletionOptions = serde_json::Map<String, serde_json::Value>;

/// Issues one completion request per call
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete `messages`, honouring any passthrough `options`
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: &CompletionOptions,
    ) -> BackendResult<CompletionResult>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "custom"
    }
}

#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: &CompletionOptions,
    ) -> BackendResult<CompletionResult> {
        (**self).complete(messages, options).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for Box<T> {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: &CompletionOptions,
    ) -> BackendResult<CompletionResult> {
        (**self).complete(messages, options).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
