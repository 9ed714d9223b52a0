//! Token model for C++ source
//!
//! Only significant tokens travel through the pipeline. Comments and
//! preprocessor directive lines ride along as [`Trivia`] on the token that
//! follows them, so a consumer that rewrites the stream keeps them in order.

pub mod keywords;
pub mod token;

pub use keywords::{is_keyword, punctuators, reserved_keywords};
pub use token::{Token, TokenKind, Trivia, TriviaKind};

pub use crate::utils::{Position, Span};
