//! Placeholder expansion facade.
//!
//! | Form              | Set and non-empty | Unset or empty              |
//! |-------------------|-------------------|-----------------------------|
//! | `$name` `${name}` | value             | `""` (or source, see [`UnsetPolicy`]) |
//! | `${name:-word}`   | value             | `word`                      |
//! | `${name:+word}`   | `word`            | `""`                        |
//! | `${name:?word}`   | value             | error                       |
//! | `${name:=word}`   | value             | `word`, and `name` := `word` |
//!
//! `word` is always taken verbatim; placeholders inside it are not expanded.

pub mod engine;
pub mod parser;

use crate::{
    error::ExpandError,
    store::{ProcessEnv, VarStore},
};
use parser::Scanner;

/// What a plain `$name` / `${name}` becomes when the variable is unset or empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsetPolicy {
    /// Substitute the empty string.
    #[default]
    Empty,
    /// Leave the placeholder's source text in place.
    Keep,
}

/// Expansion settings. The default matches POSIX-ish `envsubst` behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct Expander {
    unset: UnsetPolicy,
}

impl Expander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unset_policy(mut self, policy: UnsetPolicy) -> Self {
        self.unset = policy;
        self
    }

    /// Expand every placeholder in `input` against `store`.
    ///
    /// On error nothing is returned, but `:=` assignments made before the
    /// failing placeholder remain in `store`.
    pub fn expand<S: VarStore + ?Sized>(
        &self,
        input: &str,
        store: &mut S,
    ) -> Result<String, ExpandError> {
        let mut out = String::with_capacity(input.len());
        for seg in Scanner::new(input) {
            engine::resolve(&seg?, &mut *store, self.unset, &mut out)?;
        }
        Ok(out)
    }
}

/// Expand with default settings.
pub fn expand<S: VarStore + ?Sized>(input: &str, store: &mut S) -> Result<String, ExpandError> {
    Expander::new().expand(input, store)
}

/// Expand against the process environment. `:=` mutates it.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    expand(input, &mut ProcessEnv)
}
