//! Token and trivia types shared by the lexer and the filter engine

use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical category of a significant token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    IntegerLiteral,
    FloatingLiteral,
    CharacterLiteral,
    StringLiteral,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `::`
    ScopeSeparator,
    /// Every other operator or punctuator
    Punctuator,
    Eof,
}

impl TokenKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "ID",
            Self::Keyword => "KEYWORD",
            Self::IntegerLiteral => "INTEGER",
            Self::FloatingLiteral => "FLOATING",
            Self::CharacterLiteral => "CHARACTER",
            Self::StringLiteral => "STRING",
            Self::LeftParen => "LPAREN",
            Self::RightParen => "RPAREN",
            Self::ScopeSeparator => "SCOPE",
            Self::Punctuator => "PUNCT",
            Self::Eof => "EOF",
        }
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral
                | Self::FloatingLiteral
                | Self::CharacterLiteral
                | Self::StringLiteral
        )
    }

    /// Punctuation in the broad sense, including the dedicated kinds
    pub const fn is_punctuation(self) -> bool {
        matches!(
            self,
            Self::LeftParen | Self::RightParen | Self::ScopeSeparator | Self::Punctuator
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriviaKind {
    LineComment,
    BlockComment,
    /// A `#` line, continuations included
    Directive,
}

/// Non-significant text carried by the next significant token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub image: String,
    pub span: Span,
}

impl Trivia {
    pub fn new(kind: TriviaKind, image: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            image: image.into(),
            span,
        }
    }
}

/// A significant token
///
/// `trivia` holds the comments and directive lines that preceded the token,
/// oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub image: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trivia: Vec<Trivia>,
}

impl Token {
    pub fn new(kind: TokenKind, image: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            image: image.into(),
            span,
            trivia: Vec::new(),
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    /// Copy of this token's kind and image located at `span`, without trivia
    pub fn stamped(&self, span: Span) -> Self {
        Self::new(self.kind, self.image.clone(), span)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.image == name
    }

    /// `true` for a keyword or punctuator with exactly this text
    pub fn is_symbol(&self, text: &str) -> bool {
        self.kind != TokenKind::Identifier && !self.kind.is_literal() && self.image == text
    }

    pub fn begin_line(&self) -> u32 {
        self.span.start().line
    }

    pub fn begin_column(&self) -> u32 {
        self.span.start().column
    }

    pub fn end_line(&self) -> u32 {
        self.span.end().line
    }

    /// Column of the last character (inclusive)
    pub fn end_column(&self) -> u32 {
        if self.span.is_empty() {
            self.span.end().column
        } else {
            self.span.end().column.saturating_sub(1).max(1)
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn span(line: u32, begin: u32, end: u32) -> Span {
        Span::new(
            Position::new(0, line, begin),
            Position::new((end - begin) as usize, line, end),
        )
    }

    #[test]
    fn test_display_uses_kind_name_and_image() {
        let token = Token::new(TokenKind::Identifier, "widget", span(1, 1, 7));
        assert_eq!(token.to_string(), "ID(widget)");
        assert_eq!(
            Token::new(TokenKind::ScopeSeparator, "::", span(1, 1, 3)).to_string(),
            "SCOPE(::)"
        );
    }

    #[test]
    fn test_location_accessors() {
        let token = Token::new(TokenKind::Identifier, "abc", span(4, 5, 8));
        assert_eq!(token.begin_line(), 4);
        assert_eq!(token.begin_column(), 5);
        assert_eq!(token.end_line(), 4);
        assert_eq!(token.end_column(), 7);
    }

    #[test]
    fn test_stamped_drops_trivia_and_moves_span() {
        let mut template = Token::new(TokenKind::Keyword, "int", span(1, 1, 4));
        template.trivia.push(Trivia::new(
            TriviaKind::LineComment,
            "// note",
            span(1, 1, 8),
        ));

        let target = span(9, 3, 5);
        let stamped = template.stamped(target);

        assert_eq!(stamped.kind, TokenKind::Keyword);
        assert_eq!(stamped.image, "int");
        assert_eq!(stamped.span, target);
        assert!(stamped.trivia.is_empty());
    }

    #[test]
    fn test_symbol_and_identifier_predicates() {
        let lparen = Token::new(TokenKind::LeftParen, "(", span(1, 1, 2));
        assert!(lparen.is_symbol("("));
        assert!(!lparen.is_identifier("("));

        let string = Token::new(TokenKind::StringLiteral, "\"(\"", span(1, 1, 4));
        assert!(!string.is_symbol("\"(\""));
    }
}
