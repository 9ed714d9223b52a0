//! Define and macro replacement filters

use super::buffer::{Pending, TokenBuffer};
use super::error::{PreprocessorError, PreprocessorResult};
use crate::config::constants::compile_time::preprocessor::MAX_MACRO_ARGUMENT_TOKENS;
use crate::lexical::{Lexer, TokenSource};
use crate::tokens::{is_keyword, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    Define,
    Macro,
}

impl FilterKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            FilterKind::Define => "define",
            FilterKind::Macro => "macro",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger name plus the token template it expands to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    name: String,
    template: Vec<Token>,
}

impl Replacement {
    fn build(kind: FilterKind, name: &str, value: &str) -> PreprocessorResult<Self> {
        validate_trigger_name(kind, name)?;

        let template = Lexer::tokenize(value)
            .map_err(|source| PreprocessorError::InvalidReplacement {
                name: name.to_string(),
                source,
            })?
            .into_iter()
            .map(|mut token| {
                token.trivia.clear();
                token
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            template,
        })
    }

    /// Template tokens stamped with the location of `trigger`
    fn instantiate<'a>(&'a self, trigger: &'a Token) -> impl DoubleEndedIterator<Item = Token> + 'a {
        self.template.iter().map(|t| t.stamped(trigger.span))
    }
}

/// Check that `name` is usable as a trigger: one identifier, nothing else
pub fn validate_trigger_name(kind: FilterKind, name: &str) -> PreprocessorResult<()> {
    let invalid = |reason: &str| PreprocessorError::invalid_trigger_name(kind, name, reason);

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains("::") {
        return Err(invalid("name must not contain '::'"));
    }

    let tokens = Lexer::tokenize(name).map_err(|e| invalid(&e.to_string()))?;
    match tokens.as_slice() {
        [token] if token.kind == TokenKind::Identifier && token.image == name => Ok(()),
        [token] if token.kind == TokenKind::Keyword || is_keyword(&token.image) => {
            Err(invalid("name is a C++ keyword"))
        }
        _ => Err(invalid("name must be a single identifier")),
    }
}

/// A rule that rewrites one trigger identifier
///
/// A define fires on every occurrence of its name. A macro fires only when
/// its name is directly followed by `(`; the argument list up to the
/// matching `)` is consumed and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementFilter {
    Define(Replacement),
    Macro(Replacement),
}

impl ReplacementFilter {
    pub fn new_define(name: &str, value: &str) -> PreprocessorResult<Self> {
        Replacement::build(FilterKind::Define, name, value).map(Self::Define)
    }

    pub fn new_macro(name: &str, value: &str) -> PreprocessorResult<Self> {
        Replacement::build(FilterKind::Macro, name, value).map(Self::Macro)
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Define(_) => FilterKind::Define,
            Self::Macro(_) => FilterKind::Macro,
        }
    }

    fn replacement(&self) -> &Replacement {
        match self {
            Self::Define(r) | Self::Macro(r) => r,
        }
    }

    pub fn name(&self) -> &str {
        &self.replacement().name
    }

    pub fn template(&self) -> &[Token] {
        &self.replacement().template
    }

    pub fn matches(&self, token: &Token) -> bool {
        token.is_identifier(self.name())
    }

    /// Rewrite `trigger` into `stream` if this filter applies
    ///
    /// Returns `Ok(false)` when the filter declines; the stream is then left
    /// as it was found.
    pub fn apply<S: TokenSource>(
        &self,
        trigger: &Token,
        stream: &mut TokenBuffer<S>,
    ) -> PreprocessorResult<bool> {
        if !self.matches(trigger) {
            return Ok(false);
        }

        match self {
            Self::Define(replacement) => {
                stream.push_replacement(replacement.instantiate(trigger));
                Ok(true)
            }
            Self::Macro(replacement) => {
                let lookahead = stream.next_pending()?;
                if !lookahead.token().is(TokenKind::LeftParen) {
                    stream.restore(lookahead);
                    return Ok(false);
                }

                self.skip_arguments(trigger, stream)?;
                stream.push_replacement(replacement.instantiate(trigger));
                Ok(true)
            }
        }
    }

    /// Consume through the `)` that closes an already consumed `(`
    fn skip_arguments<S: TokenSource>(
        &self,
        trigger: &Token,
        stream: &mut TokenBuffer<S>,
    ) -> PreprocessorResult<()> {
        let mut depth = 1usize;
        let mut consumed = 0usize;

        while depth > 0 {
            let token = stream.next_pending()?.into_token();
            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth -= 1,
                TokenKind::Eof => {
                    // leave Eof for the caller
                    stream.restore(Pending::Lookahead(token));
                    return Err(PreprocessorError::UnbalancedMacroArguments {
                        name: self.name().to_string(),
                        span: trigger.span,
                    });
                }
                _ => {}
            }

            consumed += 1;
            if consumed > MAX_MACRO_ARGUMENT_TOKENS {
                return Err(PreprocessorError::MacroArgumentsTooLong {
                    name: self.name().to_string(),
                    span: trigger.span,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn stream_over(input: &str) -> TokenBuffer<Lexer> {
        let mut stream = TokenBuffer::new(Lexer::new());
        stream.reset(input);
        stream
    }

    fn drain(stream: &mut TokenBuffer<Lexer>) -> Vec<String> {
        let mut images = Vec::new();
        loop {
            let token = stream.next_pending().unwrap().into_token();
            if token.is_eof() {
                return images;
            }
            images.push(token.image);
        }
    }

    #[test]
    fn test_trigger_name_validation() {
        assert!(validate_trigger_name(FilterKind::Define, "my").is_ok());
        assert!(validate_trigger_name(FilterKind::Define, "_EXPORT_2").is_ok());

        for bad in ["", "a::b", "::a", "two words", "a+b", "1abc", " my", "\"s\"", "my//c"] {
            assert_matches!(
                validate_trigger_name(FilterKind::Macro, bad),
                Err(PreprocessorError::InvalidTriggerName { kind: FilterKind::Macro, .. }),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_keyword_trigger_rejected() {
        assert_matches!(
            ReplacementFilter::new_define("class", "struct"),
            Err(PreprocessorError::InvalidTriggerName { reason, .. }) if reason.contains("keyword")
        );
    }

    #[test]
    fn test_template_is_captured_once() {
        let filter = ReplacementFilter::new_define("API", "__declspec ( dllexport )").unwrap();
        let images: Vec<&str> = filter.template().iter().map(|t| t.image.as_str()).collect();
        assert_eq!(images, vec!["__declspec", "(", "dllexport", ")"]);
        assert_eq!(filter.kind(), FilterKind::Define);
        assert_eq!(filter.name(), "API");
    }

    #[test]
    fn test_invalid_replacement_text() {
        assert_matches!(
            ReplacementFilter::new_define("BAD", "\"open"),
            Err(PreprocessorError::InvalidReplacement { name, .. }) if name == "BAD"
        );
    }

    #[test]
    fn test_define_pushes_stamped_replacement() {
        let filter = ReplacementFilter::new_define("my", "int long").unwrap();
        let mut stream = stream_over("my x");
        let trigger = stream.next_from_source().unwrap();

        assert!(filter.apply(&trigger, &mut stream).unwrap());

        let first = stream.pop().unwrap();
        assert_matches!(&first, Pending::Replacement(t) if t.image == "int" && t.span == trigger.span);
        assert_eq!(drain(&mut stream), vec!["long", "x"]);
    }

    #[test]
    fn test_macro_declines_without_parenthesis() {
        let filter = ReplacementFilter::new_macro("my", "").unwrap();
        let mut stream = stream_over("my text()");
        let trigger = stream.next_from_source().unwrap();

        assert!(!filter.apply(&trigger, &mut stream).unwrap());
        assert_eq!(drain(&mut stream), vec!["text", "(", ")"]);
    }

    #[test]
    fn test_macro_consumes_nested_arguments() {
        let filter = ReplacementFilter::new_macro("my", "").unwrap();
        let mut stream = stream_over("my(a, (b), f(c(d))) after");
        let trigger = stream.next_from_source().unwrap();

        assert!(filter.apply(&trigger, &mut stream).unwrap());
        assert_eq!(drain(&mut stream), vec!["after"]);
    }

    #[test]
    fn test_unbalanced_arguments() {
        let filter = ReplacementFilter::new_macro("my", "x").unwrap();
        let mut stream = stream_over("my(a, (b)");
        let trigger = stream.next_from_source().unwrap();

        assert_matches!(
            filter.apply(&trigger, &mut stream),
            Err(PreprocessorError::UnbalancedMacroArguments { name, span }) if name == "my" && span == trigger.span
        );
    }

    #[test]
    fn test_non_matching_trigger_is_declined() {
        let filter = ReplacementFilter::new_define("my", "x").unwrap();
        let mut stream = stream_over("other");
        let trigger = stream.next_from_source().unwrap();
        assert!(!filter.apply(&trigger, &mut stream).unwrap());
        assert!(stream.is_empty());
    }
}
