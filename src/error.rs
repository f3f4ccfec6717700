//! Fatal expansion failures.
//!
//! Malformed placeholders are not errors: they fall back to their literal
//! source text. Only the two kinds below abort an expansion.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A `${` with no matching `}` before end of input.
    #[error("unclosed brace in variable expression starting at byte {offset}")]
    UnclosedBrace { offset: usize },

    /// `${name:?message}` met an unset or empty variable.
    #[error("variable '{name}' is unset or empty: {message}")]
    Required { name: String, message: String },
}
