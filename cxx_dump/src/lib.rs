//! # cxx-dump
//!
//! Runs C++ sources through the token filter engine and prints either the
//! rewritten token stream or an outline of the declared scopes and types.

pub mod collectors;
pub mod outline;
pub mod output;

use cxx_frontend::file_processor::{FileProcessor, FileProcessorError};
use cxx_frontend::log_success;
use cxx_frontend::logging::{codes, Code};
use cxx_frontend::preprocessor::{FilterDefinitions, Preprocessor, PreprocessorError};
use cxx_frontend::scope::ScopeError;
use std::io::{self, Write};
use std::path::Path;

pub use outline::{build_outline, EntryKind, Outline, OutlineEntry};
pub use output::OutputFormat;

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error(transparent)]
    File(#[from] FileProcessorError),

    #[error(transparent)]
    Preprocessor(#[from] PreprocessorError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl DumpError {
    pub fn error_code(&self) -> Code {
        match self {
            DumpError::File(e) => e.error_code(),
            DumpError::Preprocessor(e) => e.error_code(),
            DumpError::Scope(e) => e.error_code(),
            DumpError::Output(_) => codes::file_processing::IO_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Rewritten token stream
    Tokens,
    /// Fully-qualified namespaces, classes and type aliases
    Outline,
}

#[derive(Debug, Clone, Copy)]
pub struct DumpOptions {
    pub mode: Mode,
    pub format: OutputFormat,
    pub with_trivia: bool,
}

/// Build an engine with every definition registered
pub fn create_preprocessor(definitions: &FilterDefinitions) -> Result<Preprocessor, DumpError> {
    let mut engine = Preprocessor::new();
    definitions.apply_to(&mut engine)?;
    Ok(engine)
}

/// Dump one source text; the engine is reset first and keeps its filters
pub fn dump_source<W: Write>(
    engine: &mut Preprocessor,
    source: &str,
    options: DumpOptions,
    out: &mut W,
) -> Result<(), DumpError> {
    let tokens = engine.tokenize_all(source)?;

    match options.mode {
        Mode::Tokens => output::write_tokens(out, &tokens, options.format, options.with_trivia)?,
        Mode::Outline => {
            let outline = build_outline(&tokens)?;
            log_success!(codes::success::SCOPE_OUTLINE_COMPLETE, "Outline built",
                "entries" => outline.entries.len(),
                "scopes" => outline.tree.scope_count()
            );
            output::write_outline(out, &outline.entries, options.format)?;
        }
    }
    Ok(())
}

/// Read and dump one file
pub fn dump_file<W: Write>(
    engine: &mut Preprocessor,
    path: &Path,
    options: DumpOptions,
    out: &mut W,
) -> Result<(), DumpError> {
    let file = FileProcessor::new().process_file(path)?;
    dump_source(engine, &file.source, options, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(mode: Mode) -> DumpOptions {
        DumpOptions {
            mode,
            format: OutputFormat::Text,
            with_trivia: false,
        }
    }

    #[test]
    fn test_dump_tokens_with_definitions() {
        let mut definitions = FilterDefinitions::new();
        definitions.add_define("my=int").unwrap();
        definitions.add_macro("TEXT").unwrap();
        let mut engine = create_preprocessor(&definitions).unwrap();

        let mut out = Vec::new();
        dump_source(&mut engine, "my TEXT(\"x\") y;", options(Mode::Tokens), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let images: Vec<&str> = text
            .lines()
            .map(|l| l.split_whitespace().nth(2).unwrap_or(""))
            .collect();
        assert_eq!(images, vec!["int", "y", ";", ""]);
    }

    #[test]
    fn test_engine_is_reused_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.hpp");
        let second = dir.path().join("b.hpp");
        fs::write(&first, "namespace a { struct S {}; }").unwrap();
        fs::write(&second, "namespace b { API struct T {}; }").unwrap();

        let mut definitions = FilterDefinitions::new();
        definitions.add_define("API").unwrap();
        let mut engine = create_preprocessor(&definitions).unwrap();

        let mut out = Vec::new();
        dump_file(&mut engine, &first, options(Mode::Outline), &mut out).unwrap();
        dump_file(&mut engine, &second, options(Mode::Outline), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("a::S"));
        assert!(text.contains("b::T"));
    }

    #[test]
    fn test_errors_are_reported_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.cpp");
        fs::write(&broken, "CALL(1, (2)").unwrap();

        let mut definitions = FilterDefinitions::new();
        definitions.add_macro("CALL").unwrap();
        let mut engine = create_preprocessor(&definitions).unwrap();

        let mut out = Vec::new();
        let error = dump_file(&mut engine, &broken, options(Mode::Tokens), &mut out).unwrap_err();
        assert!(matches!(
            error,
            DumpError::Preprocessor(PreprocessorError::UnbalancedMacroArguments { .. })
        ));

        let missing = dump_file(
            &mut engine,
            &dir.path().join("missing.cpp"),
            options(Mode::Tokens),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(missing, DumpError::File(FileProcessorError::FileNotFound { .. })));
        assert_eq!(missing.error_code().as_str(), "E005");
    }

    #[test]
    fn test_definition_errors_surface() {
        let mut definitions = FilterDefinitions::new();
        definitions.add_define("int=long").unwrap();
        assert!(matches!(
            create_preprocessor(&definitions),
            Err(DumpError::Preprocessor(PreprocessorError::InvalidTriggerName { .. }))
        ));
    }
}
