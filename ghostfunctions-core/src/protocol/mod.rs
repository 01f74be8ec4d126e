//! Protocol module for conversation and completion structures
//!
//! These structures are shared by the prompt builder, the completion
//! backends and the result interpreter.

pub mod types;

pub use types::{
    ChatRequest, Choice, ChoiceMessage, CompletionResult, CompletionUsage, Message, Role,
};
