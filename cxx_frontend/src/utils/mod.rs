//! Shared primitive types used by the lexer, the preprocessor and the
//! scope resolver.

pub mod span;

pub use span::{Position, Span};
