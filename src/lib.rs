//! `oxidize-env` — shell-style placeholder expansion.
//!
//! Expands `$NAME`, `${NAME}` and the four `${NAME:OP operand}` forms in a
//! single forward scan, resolving names against a [`VarStore`].
//!
//! ```
//! use std::collections::HashMap;
//!
//! let mut vars = HashMap::from([("USER".to_owned(), "alice".to_owned())]);
//! let out = oxidize_env::expand("hi $USER, ${SHELL:-/bin/sh}", &mut vars).unwrap();
//! assert_eq!(out, "hi alice, /bin/sh");
//! ```

pub mod error;
pub mod expand;
pub mod store;

pub use error::ExpandError;
pub use expand::{Expander, UnsetPolicy, expand, expand_env};
pub use store::{Overlay, ProcessEnv, VarStore};
