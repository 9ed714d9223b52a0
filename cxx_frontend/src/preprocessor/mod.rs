//! Token filter engine
//!
//! Sits between a [`TokenSource`](crate::lexical::TokenSource) and the
//! consumer, rewriting the stream with user-supplied defines and macros.
//! A define replaces every occurrence of its name; a macro replaces its name
//! only when called, dropping the argument list. Neither is a full C
//! preprocessor: there is no parameter substitution, no conditional
//! compilation and no include handling.

pub mod buffer;
pub mod definitions;
pub mod engine;
pub mod error;
pub mod filter;

pub use buffer::{Pending, TokenBuffer};
pub use definitions::{parse_definition, FilterDefinitions};
pub use engine::{Preprocessor, PreprocessorMetrics};
pub use error::{PreprocessorError, PreprocessorResult};
pub use filter::{validate_trigger_name, FilterKind, Replacement, ReplacementFilter};
