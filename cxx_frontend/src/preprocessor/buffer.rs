//! Token source wrapped with a LIFO push-back buffer
//!
//! Nothing popped from the buffer is offered to the filters again.

use crate::lexical::{LexerError, TokenSource};
use crate::tokens::Token;

/// A buffered token and how it got into the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// Output of a substitution
    Replacement(Token),
    /// A token read ahead by a macro that then declined
    Lookahead(Token),
}

impl Pending {
    pub fn token(&self) -> &Token {
        match self {
            Pending::Replacement(token) | Pending::Lookahead(token) => token,
        }
    }

    pub fn into_token(self) -> Token {
        match self {
            Pending::Replacement(token) | Pending::Lookahead(token) => token,
        }
    }
}

pub struct TokenBuffer<S> {
    source: S,
    pending: Vec<Pending>,
}

impl<S: TokenSource> TokenBuffer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: Vec::new(),
        }
    }

    pub fn reset(&mut self, input: &str) {
        self.pending.clear();
        self.source.reset(input);
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Top of the buffer, without falling back to the source
    pub fn pop(&mut self) -> Option<Pending> {
        self.pending.pop()
    }

    /// Top of the buffer, or a fresh source token wrapped as lookahead
    pub fn next_pending(&mut self) -> Result<Pending, LexerError> {
        match self.pending.pop() {
            Some(pending) => Ok(pending),
            None => self.source.next_token().map(Pending::Lookahead),
        }
    }

    pub fn next_from_source(&mut self) -> Result<Token, LexerError> {
        self.source.next_token()
    }

    pub fn restore(&mut self, pending: Pending) {
        self.pending.push(pending);
    }

    /// Queue `tokens` so that popping yields them left to right
    pub fn push_replacement<I>(&mut self, tokens: I)
    where
        I: DoubleEndedIterator<Item = Token>,
    {
        self.pending
            .extend(tokens.rev().map(Pending::Replacement));
    }
}
