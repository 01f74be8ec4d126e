//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use ghostfunctions::providers::{BackendError, BackendResult, CompletionBackend, CompletionOptions};
use ghostfunctions::{CompletionResult, Message};
use std::sync::Mutex;

/// One recorded backend invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub options: CompletionOptions,
}

/// Backend returning fixed choice texts and recording what it was sent
pub struct RecordingBackend {
    texts: Vec<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBackend {
    pub fn new<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        let calls = self.calls();
        let last = calls.last().expect("backend was never called");
        last.messages
            .last()
            .map(|m| m.content().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: &CompletionOptions,
    ) -> BackendResult<CompletionResult> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages,
            options: options.clone(),
        });
        Ok(CompletionResult::from_texts(self.texts.clone()))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Backend that always fails
pub struct FailingBackend;

#[async_trait]
impl CompletionBackend for FailingBackend {
    async fn complete(
        &self,
        _messages: Vec<Message>,
        _options: &CompletionOptions,
    ) -> BackendResult<CompletionResult> {
        Err(BackendError::ServiceUnavailable("down for maintenance".to_string()))
    }
}
