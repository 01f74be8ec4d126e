//! Turning completion results into typed return values

use crate::annotation::TypeDescriptor;
use crate::error::GhostError;
use crate::protocol::CompletionResult;
use crate::value::{parse_literal, Value};
use tracing::warn;

/// Combines the texts of all choices into one
pub trait Aggregator: Send + Sync {
    fn aggregate(&self, texts: &[String]) -> String;
}

impl<F> Aggregator for F
where
    F: Fn(&[String]) -> String + Send + Sync,
{
    fn aggregate(&self, texts: &[String]) -> String {
        self(texts)
    }
}

/// Keeps the first choice and ignores the rest
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoice;

impl Aggregator for FirstChoice {
    fn aggregate(&self, texts: &[String]) -> String {
        texts.first().cloned().unwrap_or_default()
    }
}

/// Texts of every choice, in backend order
pub fn choice_texts(result: &CompletionResult) -> Result<Vec<String>, GhostError> {
    if result.choices.is_empty() {
        return Err(GhostError::malformed("response contains no choices", ""));
    }
    result
        .choices
        .iter()
        .map(|choice| {
            choice.message.content.clone().ok_or_else(|| {
                GhostError::malformed(
                    format!("choice {} has no text content", choice.index),
                    "",
                )
            })
        })
        .collect()
}

/// Aggregate, parse and validate a completion against `returns`
///
/// Text returns come back verbatim unless `unquote_text` is set, in which
/// case one layer of matching quotes is removed by parsing the text as a
/// string literal.
pub fn interpret(
    result: &CompletionResult,
    returns: &TypeDescriptor,
    aggregator: &dyn Aggregator,
    unquote_text: bool,
) -> Result<Value, GhostError> {
    let texts = choice_texts(result)?;
    let text = aggregator.aggregate(&texts);

    if returns.is_text() {
        if unquote_text {
            return Ok(Value::Str(unquote(text)));
        }
        return Ok(Value::Str(text));
    }

    let value = parse_literal(&text).map_err(|e| {
        warn!("Completion is not a literal: {}", e);
        GhostError::malformed(e.to_string(), text.clone())
    })?;
    returns.check(&value).map_err(|e| {
        warn!("Completion does not match {}: {}", returns, e);
        e
    })?;
    Ok(value)
}

fn unquote(text: String) -> String {
    let quoted = text.len() >= 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"')));
    if !quoted {
        return text;
    }
    match parse_literal(&text) {
        Ok(Value::Str(inner)) => inner,
        _ => text,
    }
}
