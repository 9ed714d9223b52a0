//! C++ front-end building blocks
//!
//! A lexer producing tokens with trivia, a token filter engine that applies
//! defines and macros on the fly, and a scope tree that resolves names to
//! their fully-qualified form.

pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod preprocessor;
pub mod scope;
pub mod tokens;
pub mod utils;

pub use file_processor::{FileProcessor, FileProcessorError, SourceFile};
pub use lexical::{Lexer, LexerError, TokenSource};
pub use preprocessor::{FilterDefinitions, Preprocessor, PreprocessorError, PreprocessorResult};
pub use scope::{ScopeError, ScopeId, ScopeTree};
pub use tokens::{Token, TokenKind, Trivia, TriviaKind};
pub use utils::{Position, Span};
