//! Scope resolver
//!
//! Tracks the namespaces and classes opened while walking a translation unit
//! and turns names into fully-qualified spellings such as `A::B::x`.

pub mod error;
pub mod tree;

pub use error::{ScopeError, ScopeResult};
pub use tree::{ScopeId, ScopeRef, ScopeTree};
