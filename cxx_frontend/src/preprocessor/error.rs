//! Errors raised while registering or applying defines and macros

use super::filter::FilterKind;
use crate::config::constants::compile_time::preprocessor::*;
use crate::lexical::LexerError;
use crate::logging::codes;
use crate::utils::Span;

/// Result type for token filter operations
pub type PreprocessorResult<T> = Result<T, PreprocessorError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum PreprocessorError {
    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidTriggerName {
        kind: FilterKind,
        name: String,
        reason: String,
    },

    #[error("Cannot register {kind} '{name}': already registered as a {existing}")]
    DuplicateFilter {
        name: String,
        kind: FilterKind,
        existing: FilterKind,
    },

    #[error("Argument list of macro '{name}' invoked at {span} is not closed before end of input")]
    UnbalancedMacroArguments { name: String, span: Span },

    #[error("Argument list of macro '{name}' invoked at {span} exceeds {MAX_MACRO_ARGUMENT_TOKENS} tokens")]
    MacroArgumentsTooLong { name: String, span: Span },

    #[error("Replacement of '{name}' cannot be tokenized: {source}")]
    InvalidReplacement { name: String, source: LexerError },

    #[error("Lexical error: {0}")]
    Lexer(#[from] LexerError),

    #[error("Too many defines and macros: {count} (max {MAX_FILTERS})")]
    TooManyFilters { count: usize },

    #[error("Invalid definition '{text}': {reason}")]
    InvalidDefinition { text: String, reason: String },

    #[error("Cannot load definitions from {path}: {message}")]
    DefinitionsFile { path: String, message: String },
}

impl PreprocessorError {
    pub fn invalid_trigger_name(kind: FilterKind, name: &str, reason: &str) -> Self {
        Self::InvalidTriggerName {
            kind,
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_definition(text: &str, reason: &str) -> Self {
        Self::InvalidDefinition {
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn definitions_file(path: &str, message: impl ToString) -> Self {
        Self::DefinitionsFile {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::InvalidTriggerName { .. } => codes::preprocessor::INVALID_TRIGGER_NAME,
            Self::DuplicateFilter { .. } => codes::preprocessor::DUPLICATE_FILTER,
            Self::UnbalancedMacroArguments { .. } => {
                codes::preprocessor::UNBALANCED_MACRO_ARGUMENTS
            }
            Self::MacroArgumentsTooLong { .. } => codes::preprocessor::MACRO_ARGUMENTS_TOO_LONG,
            Self::InvalidReplacement { .. } => codes::preprocessor::INVALID_REPLACEMENT,
            Self::Lexer(e) => e.error_code(),
            Self::TooManyFilters { .. } => codes::preprocessor::TOO_MANY_FILTERS,
            Self::InvalidDefinition { .. } | Self::DefinitionsFile { .. } => {
                codes::preprocessor::INVALID_DEFINITION
            }
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    /// Source location, when the error is tied to one
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnbalancedMacroArguments { span, .. }
            | Self::MacroArgumentsTooLong { span, .. } => Some(*span),
            _ => None,
        }
    }
}
