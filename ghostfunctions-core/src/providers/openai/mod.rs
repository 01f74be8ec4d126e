//! OpenAI chat completions backend

mod client;
pub mod types;

pub use client::OpenAIBackend;
pub use types::{OpenAIError, OpenAIErrorDetail};
