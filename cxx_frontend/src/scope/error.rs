//! Scope tree errors

use crate::config::constants::compile_time::scope::MAX_SCOPE_DEPTH;
use crate::logging::codes;

pub type ScopeResult<T> = Result<T, ScopeError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("Invalid scope or type name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Type '{name}' is already declared in scope '{scope}'")]
    DuplicateType { name: String, scope: String },

    #[error("Scope nesting too deep: {depth} (max {MAX_SCOPE_DEPTH})")]
    NestingTooDeep { depth: usize },
}

impl ScopeError {
    pub fn invalid_name(name: &str, reason: &str) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::InvalidName { .. } => codes::scope::INVALID_SCOPE_NAME,
            Self::DuplicateType { .. } => codes::scope::DUPLICATE_TYPE_NAME,
            Self::NestingTooDeep { .. } => codes::scope::SCOPE_NESTING_TOO_DEEP,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
