//! Token filter engine

use super::buffer::TokenBuffer;
use super::error::{PreprocessorError, PreprocessorResult};
use super::filter::{FilterKind, ReplacementFilter};
use crate::config::constants::compile_time::preprocessor::MAX_FILTERS;
use crate::config::runtime::PreprocessorPreferences;
use crate::lexical::{Lexer, TokenSource};
use crate::logging::codes;
use crate::tokens::{Token, Trivia};
use crate::{log_debug, log_error, log_success};
use std::mem;

/// Counters for the current input, cleared by [`Preprocessor::reset`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PreprocessorMetrics {
    pub tokens_emitted: usize,
    pub define_substitutions: usize,
    pub macro_substitutions: usize,
    /// Macro names seen without a following `(`
    pub declined_macro_calls: usize,
}

/// Rewrites a token stream by applying registered defines and macros
///
/// Tokens produced by a substitution, and a token a macro read ahead and
/// declined, are emitted as they are; they are not offered to the filters
/// again. Comments and directives attached to a
/// substituted token move to the next token that is emitted.
pub struct Preprocessor<S: TokenSource = Lexer> {
    filters: Vec<ReplacementFilter>,
    stream: TokenBuffer<S>,
    pending_trivia: Vec<Trivia>,
    metrics: PreprocessorMetrics,
    preferences: PreprocessorPreferences,
}

impl Preprocessor<Lexer> {
    pub fn new() -> Self {
        Self::with_source(Lexer::new())
    }
}

impl Default for Preprocessor<Lexer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TokenSource> Preprocessor<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            filters: Vec::new(),
            stream: TokenBuffer::new(source),
            pending_trivia: Vec::new(),
            metrics: PreprocessorMetrics::default(),
            preferences: PreprocessorPreferences::default(),
        }
    }

    pub fn with_preferences(mut self, preferences: PreprocessorPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Start over on `input`; registered filters are kept
    pub fn reset(&mut self, input: &str) {
        self.stream.reset(input);
        self.pending_trivia.clear();
        self.metrics = PreprocessorMetrics::default();
    }

    pub fn add_define(&mut self, name: &str, value: &str) -> PreprocessorResult<()> {
        let filter = ReplacementFilter::new_define(name, value).map_err(Self::report)?;
        self.add_filter(filter)
    }

    pub fn add_macro(&mut self, name: &str, value: &str) -> PreprocessorResult<()> {
        let filter = ReplacementFilter::new_macro(name, value).map_err(Self::report)?;
        self.add_filter(filter)
    }

    pub fn add_filter(&mut self, filter: ReplacementFilter) -> PreprocessorResult<()> {
        if let Some(existing) = self.filters.iter().find(|f| f.name() == filter.name()) {
            return Err(Self::report(PreprocessorError::DuplicateFilter {
                name: filter.name().to_string(),
                kind: filter.kind(),
                existing: existing.kind(),
            }));
        }

        if self.filters.len() >= MAX_FILTERS {
            return Err(Self::report(PreprocessorError::TooManyFilters {
                count: self.filters.len() + 1,
            }));
        }

        if self.preferences.log_registrations {
            log_success!(codes::success::FILTER_REGISTERED, "Filter registered",
                "kind" => filter.kind(),
                "name" => filter.name(),
                "replacement_tokens" => filter.template().len()
            );
        }

        self.filters.push(filter);
        Ok(())
    }

    pub fn filters(&self) -> &[ReplacementFilter] {
        &self.filters
    }

    pub fn metrics(&self) -> &PreprocessorMetrics {
        &self.metrics
    }

    pub fn source(&self) -> &S {
        self.stream.source()
    }

    /// Next token of the rewritten stream; `Eof` once input is exhausted
    pub fn next_token(&mut self) -> PreprocessorResult<Token> {
        loop {
            let token = match self.stream.pop() {
                Some(pending) => return Ok(self.emit(pending.into_token())),
                None => self.stream.next_from_source()?,
            };

            if token.is_eof() {
                return Ok(self.emit(token));
            }

            if self.substitute(&token).map_err(Self::report)? {
                self.pending_trivia.extend(token.trivia);
                continue;
            }

            return Ok(self.emit(token));
        }
    }

    /// Rewrite all of `input`; the last token is always `Eof`
    pub fn tokenize_all(&mut self, input: &str) -> PreprocessorResult<Vec<Token>> {
        self.reset(input);

        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }

        log_debug!("Preprocessing complete",
            "tokens" => self.metrics.tokens_emitted,
            "define_substitutions" => self.metrics.define_substitutions,
            "macro_substitutions" => self.metrics.macro_substitutions
        );

        Ok(tokens)
    }

    /// Offer `token` to the filters in registration order
    fn substitute(&mut self, token: &Token) -> PreprocessorResult<bool> {
        for filter in &self.filters {
            if !filter.matches(token) {
                continue;
            }

            if filter.apply(token, &mut self.stream)? {
                match filter.kind() {
                    FilterKind::Define => self.metrics.define_substitutions += 1,
                    FilterKind::Macro => self.metrics.macro_substitutions += 1,
                }
                if self.preferences.log_substitutions {
                    log_debug!("Token substituted",
                        "kind" => filter.kind(),
                        "name" => filter.name(),
                        "line" => token.begin_line(),
                        "column" => token.begin_column()
                    );
                }
                return Ok(true);
            }

            if filter.kind() == FilterKind::Macro {
                self.metrics.declined_macro_calls += 1;
            }
        }

        Ok(false)
    }

    fn emit(&mut self, mut token: Token) -> Token {
        if !self.pending_trivia.is_empty() {
            let mut trivia = mem::take(&mut self.pending_trivia);
            trivia.append(&mut token.trivia);
            token.trivia = trivia;
        }
        self.metrics.tokens_emitted += 1;
        token
    }

    /// Log errors the lexer has not already reported
    fn report(error: PreprocessorError) -> PreprocessorError {
        if !matches!(error, PreprocessorError::Lexer(_)) {
            match error.span() {
                Some(span) => log_error!(error.error_code(), &error.to_string(), span = span),
                None => log_error!(error.error_code(), &error.to_string()),
            }
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexerError;
    use crate::tokens::{TokenKind, TriviaKind};
    use assert_matches::assert_matches;

    fn images(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.image.as_str())
            .collect()
    }

    fn rewrite(engine: &mut Preprocessor, input: &str) -> Vec<String> {
        let tokens = engine.tokenize_all(input).unwrap();
        images(&tokens).into_iter().map(String::from).collect()
    }

    #[test]
    fn test_identity_without_filters() {
        let input = "namespace A { int f(int x) { return x::y + 1; } }";
        let mut engine = Preprocessor::new();

        let rewritten = engine.tokenize_all(input).unwrap();
        let direct = Lexer::tokenize(input).unwrap();

        assert_eq!(rewritten.len(), direct.len() + 1);
        for (a, b) in rewritten.iter().zip(direct.iter()) {
            assert_eq!(a, b);
        }
        assert!(rewritten.last().unwrap().is_eof());
    }

    #[test]
    fn test_define_substitution() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "int").unwrap();

        assert_eq!(rewrite(&mut engine, "my x ;"), vec!["int", "x", ";"]);

        let tokens = engine.tokenize_all("my").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
    }

    #[test]
    fn test_empty_define_erases_back_to_back() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "").unwrap();

        assert_eq!(rewrite(&mut engine, "my my"), Vec::<String>::new());
        assert_eq!(rewrite(&mut engine, "a my my b"), vec!["a", "b"]);
    }

    #[test]
    fn test_many_consecutive_erasures() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "").unwrap();

        let input = "my ".repeat(50_000) + "end";
        assert_eq!(rewrite(&mut engine, &input), vec!["end"]);
        assert_eq!(engine.metrics().define_substitutions, 50_000);
    }

    #[test]
    fn test_macro_requires_call_shape() {
        let mut engine = Preprocessor::new();
        engine.add_macro("my", "").unwrap();

        assert_eq!(
            rewrite(&mut engine, "my text ()"),
            vec!["my", "text", "(", ")"]
        );
        assert_eq!(engine.metrics().declined_macro_calls, 1);
        assert_eq!(rewrite(&mut engine, "my"), vec!["my"]);
    }

    #[test]
    fn test_macro_consumes_balanced_arguments() {
        let mut engine = Preprocessor::new();
        engine.add_macro("my", "").unwrap();

        assert_eq!(
            rewrite(&mut engine, "my ( ( ) ) text"),
            vec!["text"]
        );
        assert_eq!(
            rewrite(&mut engine, "a my(x, f(y), (z)) b"),
            vec!["a", "b"]
        );
        assert_eq!(engine.metrics().macro_substitutions, 1);
    }

    #[test]
    fn test_macro_with_replacement() {
        let mut engine = Preprocessor::new();
        engine.add_macro("DECLARE", "int declared ;").unwrap();

        assert_eq!(
            rewrite(&mut engine, "DECLARE(Foo, Bar) next"),
            vec!["int", "declared", ";", "next"]
        );
    }

    #[test]
    fn test_declined_lookahead_is_returned_unfiltered() {
        let mut engine = Preprocessor::new();
        engine.add_macro("CALL", "").unwrap();
        engine.add_define("X", "replaced").unwrap();

        assert_eq!(rewrite(&mut engine, "CALL X"), vec!["CALL", "X"]);
        assert_eq!(rewrite(&mut engine, "CALL X X"), vec!["CALL", "X", "replaced"]);
    }

    #[test]
    fn test_declined_macro_name_is_not_retried() {
        let mut engine = Preprocessor::new();
        engine.add_macro("my", "your").unwrap();

        assert_eq!(
            rewrite(&mut engine, "my my ( x )"),
            vec!["my", "my", "(", "x", ")"]
        );
        assert_eq!(engine.metrics().declined_macro_calls, 1);
        assert_eq!(engine.metrics().macro_substitutions, 0);
    }

    #[test]
    fn test_erasing_define_inside_sentence() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "").unwrap();

        assert_eq!(
            rewrite(&mut engine, "here is my my text"),
            vec!["here", "is", "text"]
        );
    }

    #[test]
    fn test_macro_swallows_nested_argument_list() {
        let mut engine = Preprocessor::new();
        engine.add_macro("my", "your").unwrap();

        assert_eq!(rewrite(&mut engine, "my( ((a ! (a !)) a !) )"), vec!["your"]);
    }

    #[test]
    fn test_replacements_are_not_rescanned() {
        let mut engine = Preprocessor::new();
        engine.add_define("A", "B").unwrap();
        engine.add_define("B", "C").unwrap();

        assert_eq!(rewrite(&mut engine, "A B"), vec!["B", "C"]);
    }

    #[test]
    fn test_replacement_stamped_with_trigger_location() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "unsigned long").unwrap();

        let tokens = engine.tokenize_all("int\n  my x").unwrap();
        let trigger_span = Lexer::tokenize("int\n  my x").unwrap()[1].span;

        assert_eq!(tokens[1].image, "unsigned");
        assert_eq!(tokens[2].image, "long");
        for token in &tokens[1..3] {
            assert_eq!(token.span, trigger_span);
            assert_eq!(token.begin_line(), 2);
            assert_eq!(token.begin_column(), 3);
        }
        assert_eq!(tokens[3].begin_column(), 6);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "a").unwrap();

        assert_matches!(
            engine.add_define("my", "b"),
            Err(PreprocessorError::DuplicateFilter { kind: FilterKind::Define, existing: FilterKind::Define, .. })
        );
        assert_matches!(
            engine.add_macro("my", ""),
            Err(PreprocessorError::DuplicateFilter { kind: FilterKind::Macro, existing: FilterKind::Define, .. })
        );
        assert_eq!(engine.filters().len(), 1);
    }

    #[test]
    fn test_invalid_names_fail_at_registration() {
        let mut engine = Preprocessor::new();
        assert_matches!(
            engine.add_define("a::b", "x"),
            Err(PreprocessorError::InvalidTriggerName { .. })
        );
        assert_matches!(
            engine.add_macro("", "x"),
            Err(PreprocessorError::InvalidTriggerName { .. })
        );
        assert!(engine.filters().is_empty());
    }

    #[test]
    fn test_trivia_moves_to_next_emitted_token() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "").unwrap();

        let tokens = engine
            .tokenize_all("/* one */ my // two\n my /* three */ x")
            .unwrap();

        assert_eq!(tokens[0].image, "x");
        let trivia: Vec<&str> = tokens[0].trivia.iter().map(|t| t.image.as_str()).collect();
        assert_eq!(trivia, vec!["/* one */", "// two", "/* three */"]);
    }

    #[test]
    fn test_trivia_attaches_to_replacement_head() {
        let mut engine = Preprocessor::new();
        engine.add_macro("EXPORT", "extern").unwrap();

        let tokens = engine.tokenize_all("// doc\nEXPORT() int f;").unwrap();

        assert_eq!(tokens[0].image, "extern");
        assert_eq!(tokens[0].trivia.len(), 1);
        assert_eq!(tokens[0].trivia[0].kind, TriviaKind::LineComment);
        assert!(tokens[1].trivia.is_empty());
    }

    #[test]
    fn test_trailing_erasure_moves_trivia_to_eof() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "").unwrap();

        let tokens = engine.tokenize_all("a\n#pragma once\nmy").unwrap();

        assert_eq!(tokens.len(), 2);
        assert!(tokens[1].is_eof());
        assert_eq!(tokens[1].trivia.len(), 1);
        assert_eq!(tokens[1].trivia[0].image, "#pragma once");
    }

    #[test]
    fn test_unbalanced_macro_arguments_fail() {
        let mut engine = Preprocessor::new();
        engine.add_macro("my", "").unwrap();

        assert_matches!(
            engine.tokenize_all("my ( ( )"),
            Err(PreprocessorError::UnbalancedMacroArguments { name, .. }) if name == "my"
        );
    }

    #[test]
    fn test_lexer_errors_propagate() {
        let mut engine = Preprocessor::new();
        assert_matches!(
            engine.tokenize_all("a ` b"),
            Err(PreprocessorError::Lexer(LexerError::InvalidCharacter { character: '`', .. }))
        );
    }

    #[test]
    fn test_filters_survive_reset() {
        let mut engine = Preprocessor::new();
        engine.add_define("my", "int").unwrap();

        engine.reset("my");
        engine.reset("my");
        assert_eq!(engine.next_token().unwrap().image, "int");
        assert!(engine.next_token().unwrap().is_eof());
        assert!(engine.next_token().unwrap().is_eof());

        assert_eq!(rewrite(&mut engine, "my"), vec!["int"]);
    }

    /// Source that replays canned tokens, for checking the engine against the
    /// trait rather than the lexer
    struct Replay {
        tokens: Vec<Token>,
        next: usize,
    }

    impl TokenSource for Replay {
        fn reset(&mut self, _input: &str) {
            self.next = 0;
        }

        fn next_token(&mut self) -> Result<Token, LexerError> {
            let token = self
                .tokens
                .get(self.next)
                .cloned()
                .unwrap_or_else(|| Token::eof(Default::default()));
            self.next += 1;
            Ok(token)
        }
    }

    #[test]
    fn test_custom_token_source() {
        let tokens = Lexer::tokenize("keep drop keep").unwrap();
        let mut engine = Preprocessor::with_source(Replay { tokens, next: 0 });
        engine.add_define("drop", "").unwrap();

        let out = engine.tokenize_all("ignored").unwrap();
        assert_eq!(images(&out), vec!["keep", "keep"]);
    }
}
