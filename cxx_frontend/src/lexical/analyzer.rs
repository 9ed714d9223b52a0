//! C++ lexer
//!
//! Produces significant tokens one at a time. Whitespace is skipped;
//! comments and `#` directive lines are collected as trivia and handed to
//! the next significant token (or to `Eof`).

use super::TokenSource;
use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{is_keyword, punctuators, Token, TokenKind, Trivia, TriviaKind};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error};

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at line {line}, column {column}")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Unterminated literal starting at line {line}, column {column}")]
    UnterminatedLiteral { line: u32, column: u32 },

    #[error("Unterminated block comment starting at line {line}, column {column}")]
    UnterminatedComment { line: u32, column: u32 },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedLiteral { .. } => codes::lexical::UNTERMINATED_LITERAL,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// Counters for one input, cleared by every reset
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub keyword_tokens: usize,
    pub literal_tokens: usize,
    pub punctuator_tokens: usize,
    pub comment_count: usize,
    pub directive_count: usize,
    pub max_identifier_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        if !preferences.collect_detailed_metrics {
            return;
        }

        match token.kind {
            TokenKind::Identifier => {
                self.identifier_tokens += 1;
                self.max_identifier_length = self.max_identifier_length.max(token.image.len());
            }
            TokenKind::Keyword => self.keyword_tokens += 1,
            kind if kind.is_literal() => self.literal_tokens += 1,
            kind if kind.is_punctuation() => self.punctuator_tokens += 1,
            _ => {}
        }
    }

    pub(crate) fn record_trivia(&mut self, kind: TriviaKind) {
        match kind {
            TriviaKind::LineComment | TriviaKind::BlockComment => self.comment_count += 1,
            TriviaKind::Directive => self.directive_count += 1,
        }
    }
}

/// Encoding prefix found in front of a quote
enum LiteralPrefix {
    Quoted(char),
    Raw,
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

fn is_identifier_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric()
}

/// Integer or floating, judged on the pp-number text without any ud-suffix
fn classify_number(image: &str) -> TokenKind {
    let lower = image.to_ascii_lowercase();
    let body = lower.split('_').next().unwrap_or_default();
    let floating = if body.starts_with("0x") {
        body.contains('.') || body.contains('p')
    } else {
        body.contains('.') || body.contains('e')
    };

    if floating {
        TokenKind::FloatingLiteral
    } else {
        TokenKind::IntegerLiteral
    }
}

pub struct Lexer {
    input: String,
    pos: Position,
    line_start: bool,
    token_count: usize,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl Lexer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            input: String::new(),
            pos: Position::start(),
            line_start: true,
            token_count: 0,
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Every significant token of `input`, `Eof` excluded
    ///
    /// Trivia after the last token is dropped along with `Eof`.
    pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
        let mut lexer = Self::new();
        lexer.reset(input);

        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token.is_eof() {
                break;
            }
            tokens.push(token);
        }

        log_debug!("Tokenization complete",
            "tokens" => tokens.len(),
            "comments" => lexer.metrics.comment_count,
            "directives" => lexer.metrics.directive_count
        );

        Ok(tokens)
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    fn rest(&self) -> &str {
        &self.input[self.pos.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn image_from(&self, start: Position) -> &str {
        &self.input[start.offset..self.pos.offset]
    }

    /// Byte length of a backslash-newline at the cursor
    fn line_splice_len(&self) -> Option<usize> {
        let rest = self.rest();
        if rest.starts_with("\\\n") {
            Some(2)
        } else if rest.starts_with("\\\r\n") {
            Some(3)
        } else {
            None
        }
    }

    fn skip_line_splice(&mut self) -> bool {
        match self.line_splice_len() {
            Some(len) => {
                for _ in 0..len {
                    self.bump();
                }
                true
            }
            None => false,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => {
                    self.bump();
                    self.line_start = true;
                }
                ' ' | '\t' | '\r' | '\x0B' | '\x0C' => {
                    self.bump();
                }
                '\\' if self.skip_line_splice() => {}
                _ => break,
            }
        }
    }

    /// Consume up to, not including, the end of the logical line
    fn skip_to_line_end(&mut self) {
        loop {
            if self.skip_line_splice() {
                continue;
            }
            match self.peek() {
                None | Some('\n') => break,
                Some('\r') if self.peek_nth(1) == Some('\n') => break,
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn trivia_from(&self, kind: TriviaKind, start: Position) -> Trivia {
        Trivia::new(kind, self.image_from(start), Span::new(start, self.pos))
    }

    fn line_comment(&mut self) -> Trivia {
        let start = self.pos;
        self.skip_to_line_end();
        self.trivia_from(TriviaKind::LineComment, start)
    }

    fn block_comment(&mut self) -> Result<Trivia, LexerError> {
        let start = self.pos;
        self.bump();
        self.bump();

        loop {
            if self.rest().starts_with("*/") {
                self.bump();
                self.bump();
                return Ok(self.trivia_from(TriviaKind::BlockComment, start));
            }
            if self.bump().is_none() {
                return Err(LexerError::UnterminatedComment {
                    line: start.line,
                    column: start.column,
                });
            }
        }
    }

    fn directive(&mut self) -> Trivia {
        let start = self.pos;
        self.skip_to_line_end();
        self.trivia_from(TriviaKind::Directive, start)
    }

    fn identifier_continue(&mut self) {
        while let Some(ch) = self.peek() {
            if !is_identifier_continue(ch) {
                break;
            }
            self.bump();
        }
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        self.bump();

        loop {
            match self.peek() {
                Some('e' | 'E' | 'p' | 'P') if matches!(self.peek_nth(1), Some('+' | '-')) => {
                    self.bump();
                    self.bump();
                }
                Some('\'') if self.peek_nth(1).is_some_and(|c| c.is_ascii_alphanumeric()) => {
                    self.bump();
                }
                Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {
                    self.bump();
                }
                _ => break,
            }
        }

        classify_number(self.image_from(start))
    }

    fn quoted(&mut self, quote: char, start: Position) -> Result<(), LexerError> {
        self.bump();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexerError::UnterminatedLiteral {
                        line: start.line,
                        column: start.column,
                    })
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }

        // user-defined literal suffix
        if self.peek().is_some_and(is_identifier_start) {
            self.identifier_continue();
        }
        Ok(())
    }

    fn raw_string(&mut self, start: Position) -> Result<(), LexerError> {
        let unterminated = LexerError::UnterminatedLiteral {
            line: start.line,
            column: start.column,
        };
        self.bump();

        let mut delimiter = String::new();
        loop {
            match self.peek() {
                Some('(') => {
                    self.bump();
                    break;
                }
                Some(c)
                    if delimiter.len() < 16
                        && !c.is_whitespace()
                        && !matches!(c, ')' | '\\' | '"') =>
                {
                    delimiter.push(c);
                    self.bump();
                }
                _ => return Err(unterminated),
            }
        }

        let closing = format!("){}\"", delimiter);
        let Some(index) = self.rest().find(&closing) else {
            return Err(unterminated);
        };
        let end = self.pos.offset + index + closing.len();
        self.pos = self.pos.advance_str(&self.input[self.pos.offset..end]);

        if self.peek().is_some_and(is_identifier_start) {
            self.identifier_continue();
        }
        Ok(())
    }

    fn identifier_or_prefixed_literal(&mut self, start: Position) -> Result<TokenKind, LexerError> {
        self.identifier_continue();

        let word = self.image_from(start);
        let prefix = match (word, self.peek()) {
            ("L" | "u" | "U" | "u8", Some(q @ ('"' | '\''))) => Some(LiteralPrefix::Quoted(q)),
            ("R" | "LR" | "uR" | "UR" | "u8R", Some('"')) => Some(LiteralPrefix::Raw),
            _ => None,
        };
        let length = word.chars().count();
        let keyword = is_keyword(word);

        match prefix {
            Some(LiteralPrefix::Quoted('\'')) => {
                self.quoted('\'', start)?;
                Ok(TokenKind::CharacterLiteral)
            }
            Some(LiteralPrefix::Quoted(q)) => {
                self.quoted(q, start)?;
                Ok(TokenKind::StringLiteral)
            }
            Some(LiteralPrefix::Raw) => {
                self.raw_string(start)?;
                Ok(TokenKind::StringLiteral)
            }
            None if length > MAX_IDENTIFIER_LENGTH => Err(LexerError::IdentifierTooLong { length }),
            None if keyword => Ok(TokenKind::Keyword),
            None => Ok(TokenKind::Identifier),
        }
    }

    fn punctuator(&mut self, ch: char, start: Position) -> Result<TokenKind, LexerError> {
        if self.rest().starts_with("::") {
            self.bump();
            self.bump();
            return Ok(TokenKind::ScopeSeparator);
        }

        let rest = self.rest();
        let Some(len) = punctuators()
            .iter()
            .find(|p| rest.starts_with(**p))
            .map(|p| p.len())
        else {
            return Err(LexerError::InvalidCharacter {
                character: ch,
                line: start.line,
                column: start.column,
            });
        };

        // punctuators are ASCII
        for _ in 0..len {
            self.bump();
        }
        Ok(TokenKind::Punctuator)
    }

    fn scan(&mut self, ch: char, start: Position) -> Result<TokenKind, LexerError> {
        if ch.is_ascii_digit() || (ch == '.' && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return Ok(self.number());
        }
        if is_identifier_start(ch) {
            return self.identifier_or_prefixed_literal(start);
        }

        match ch {
            '"' => self.quoted('"', start).map(|_| TokenKind::StringLiteral),
            '\'' => self.quoted('\'', start).map(|_| TokenKind::CharacterLiteral),
            '(' => {
                self.bump();
                Ok(TokenKind::LeftParen)
            }
            ')' => {
                self.bump();
                Ok(TokenKind::RightParen)
            }
            _ => self.punctuator(ch, start),
        }
    }

    fn fail(&self, error: LexerError, start: Position) -> LexerError {
        log_error!(error.error_code(), &error.to_string(),
            span = Span::new(start, self.pos),
            "line" => start.line,
            "column" => start.column
        );
        error
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for Lexer {
    fn reset(&mut self, input: &str) {
        self.input.clear();
        self.input.push_str(input);
        self.pos = Position::start();
        self.line_start = true;
        self.token_count = 0;
        self.metrics = LexicalMetrics::default();
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        let mut trivia = Vec::new();

        loop {
            self.skip_whitespace();

            let start = self.pos;
            let rest = self.rest();
            let (line_comment, block_comment) = (rest.starts_with("//"), rest.starts_with("/*"));
            let directive = self.line_start && rest.starts_with('#');

            let item = if line_comment {
                self.line_comment()
            } else if block_comment {
                self.block_comment().map_err(|e| self.fail(e, start))?
            } else if directive {
                self.directive()
            } else {
                break;
            };

            self.metrics.record_trivia(item.kind);
            let keep = match item.kind {
                TriviaKind::Directive => self.preferences.keep_directives,
                _ => self.preferences.keep_comments,
            };
            if keep {
                trivia.push(item);
            }
        }

        let start = self.pos;
        let Some(ch) = self.peek() else {
            let mut eof = Token::eof(Span::point(start));
            eof.trivia = trivia;
            return Ok(eof);
        };

        if self.token_count >= MAX_TOKEN_COUNT {
            let error = LexerError::TooManyTokens {
                count: self.token_count,
            };
            return Err(self.fail(error, start));
        }

        let kind = self.scan(ch, start).map_err(|e| self.fail(e, start))?;
        self.token_count += 1;
        self.line_start = false;

        let mut token = Token::new(kind, self.image_from(start), Span::new(start, self.pos));
        token.trivia = trivia;
        self.metrics.record_token(&token, &self.preferences);

        Ok(token)
    }
}
