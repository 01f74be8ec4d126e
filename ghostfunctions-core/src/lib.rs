//! Ghostfunctions
//!
//! A ghostfunction is a function declared by name, docstring and signature
//! whose body is delegated to a text-completion model. Each call renders a
//! short interpreter transcript from the bound arguments, sends it to a
//! [`CompletionBackend`], and parses the reply into a [`Value`] that must
//! conform to the declared return type.
//!
//! ```no_run
//! use ghostfunctions::{ghostfunction, CallArgs, FunctionDescriptor};
//!
//! # async fn demo() -> ghostfunctions::Result<()> {
//! let generate = ghostfunction(
//!     FunctionDescriptor::builder("generate_n_random_words")
//!         .doc("Return a list of `n` random words that start with `startswith`.")
//!         .param("n", ghostfunctions::TypeDescriptor::Int)
//!         .param("startswith", ghostfunctions::TypeDescriptor::Str)
//!         .returns_type::<Vec<String>>()
//!         .build()?,
//! )?;
//!
//! let words: Vec<String> = generate
//!     .call_as(CallArgs::new().kwarg("n", 4).kwarg("startswith", "goo"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod config;
pub mod error;
pub mod function;
pub mod ghost;
pub mod interpreter;
pub mod prompt;
pub mod protocol;
pub mod providers;
pub mod value;

pub use annotation::{ContainerKind, Describe, TypeDescriptor};
pub use error::{ContractRequirement, GhostError, Result};
pub use function::{BoundArguments, CallArgs, FunctionDescriptor, Parameter, Signature};
pub use ghost::{ghostfunction, ghostfunction_with, GhostBuilder, GhostFunction};
pub use interpreter::{Aggregator, FirstChoice};
pub use prompt::{PromptBuilder, ReplPrompt};
pub use protocol::{CompletionResult, Message, Role};
pub use providers::{BackendError, CompletionBackend, CompletionOptions, OpenAIBackend};
pub use value::{parse_literal, Value};

/// Returns the version of the ghostfunctions library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
