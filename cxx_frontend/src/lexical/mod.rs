//! Lexical analysis
//!
//! [`TokenSource`] is the seam between character input and the token filter
//! engine; [`Lexer`] is the C++ implementation used by default and for
//! tokenizing define/macro replacement text.

pub mod analyzer;

use crate::tokens::Token;

pub use analyzer::{Lexer, LexerError, LexicalMetrics};

/// Pull-based producer of significant tokens
///
/// After the end of input every call returns an `Eof` token.
pub trait TokenSource {
    /// Discard all state and start over on `input`
    fn reset(&mut self, input: &str);

    fn next_token(&mut self) -> Result<Token, LexerError>;
}

/// Tokenize `input` with the default lexer, `Eof` excluded
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::tokenize(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn test_source_keeps_returning_eof() {
        let mut source: Box<dyn TokenSource> = Box::new(Lexer::new());
        source.reset("a");

        assert_eq!(source.next_token().unwrap().kind, TokenKind::Identifier);
        for _ in 0..3 {
            assert!(source.next_token().unwrap().is_eof());
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  \n\t ").unwrap().is_empty());
    }
}
