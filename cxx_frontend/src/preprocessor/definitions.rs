//! Define and macro sets loaded from TOML or command-line style strings
//!
//! ```toml
//! [defines]
//! EXPORT = ""
//! my = "int"
//!
//! [macros]
//! DECLARE_TYPE = ""
//! ```

use super::engine::Preprocessor;
use super::error::{PreprocessorError, PreprocessorResult};
use crate::config::constants::compile_time::file_processing::MAX_FILE_SIZE;
use crate::lexical::TokenSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinitions {
    #[serde(default)]
    pub defines: BTreeMap<String, String>,
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
}

/// Split `NAME=VALUE`; a bare `NAME` has an empty value
pub fn parse_definition(text: &str) -> PreprocessorResult<(String, String)> {
    let (name, value) = match text.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => (text.trim(), ""),
    };

    if name.is_empty() {
        return Err(PreprocessorError::invalid_definition(text, "missing name"));
    }

    Ok((name.to_string(), value.to_string()))
}

impl FilterDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str) -> PreprocessorResult<Self> {
        toml::from_str(text).map_err(|e| PreprocessorError::definitions_file("<inline>", e))
    }

    pub fn from_file(path: &Path) -> PreprocessorResult<Self> {
        let display = path.display().to_string();

        let metadata =
            std::fs::metadata(path).map_err(|e| PreprocessorError::definitions_file(&display, e))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(PreprocessorError::definitions_file(
                &display,
                format!("file is {} bytes (max {})", metadata.len(), MAX_FILE_SIZE),
            ));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| PreprocessorError::definitions_file(&display, e))?;
        toml::from_str(&text).map_err(|e| PreprocessorError::definitions_file(&display, e))
    }

    pub fn add_define(&mut self, text: &str) -> PreprocessorResult<()> {
        let (name, value) = parse_definition(text)?;
        self.defines.insert(name, value);
        Ok(())
    }

    pub fn add_macro(&mut self, text: &str) -> PreprocessorResult<()> {
        let (name, value) = parse_definition(text)?;
        self.macros.insert(name, value);
        Ok(())
    }

    /// Entries of `other` win on name clashes within the same table
    pub fn merge(&mut self, other: FilterDefinitions) {
        self.defines.extend(other.defines);
        self.macros.extend(other.macros);
    }

    pub fn len(&self) -> usize {
        self.defines.len() + self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty() && self.macros.is_empty()
    }

    /// Register everything with `engine`, defines first
    pub fn apply_to<S: TokenSource>(&self, engine: &mut Preprocessor<S>) -> PreprocessorResult<()> {
        for (name, value) in &self.defines {
            engine.add_define(name, value)?;
        }
        for (name, value) in &self.macros {
            engine.add_macro(name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::FilterKind;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_parse_definition() {
        assert_eq!(
            parse_definition("my=int").unwrap(),
            ("my".to_string(), "int".to_string())
        );
        assert_eq!(
            parse_definition("API = __declspec(dllexport)").unwrap(),
            ("API".to_string(), "__declspec(dllexport)".to_string())
        );
        assert_eq!(
            parse_definition("EXPORT").unwrap(),
            ("EXPORT".to_string(), String::new())
        );
        assert_eq!(
            parse_definition("EQ==").unwrap(),
            ("EQ".to_string(), "=".to_string())
        );
        assert_matches!(
            parse_definition("=value"),
            Err(PreprocessorError::InvalidDefinition { .. })
        );
    }

    #[test]
    fn test_from_toml_str() {
        let definitions = FilterDefinitions::from_toml_str(
            r#"
            [defines]
            EXPORT = ""
            my = "int"

            [macros]
            DECLARE = "struct declared ;"
            "#,
        )
        .unwrap();

        assert_eq!(definitions.len(), 3);
        assert_eq!(definitions.defines["my"], "int");
        assert_eq!(definitions.macros["DECLARE"], "struct declared ;");
    }

    #[test]
    fn test_missing_tables_default_to_empty() {
        let definitions = FilterDefinitions::from_toml_str("[macros]\nM = \"\"").unwrap();
        assert!(definitions.defines.is_empty());
        assert_eq!(definitions.macros.len(), 1);
        assert!(FilterDefinitions::from_toml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_toml() {
        assert_matches!(
            FilterDefinitions::from_toml_str("[defines]\nmy = "),
            Err(PreprocessorError::DefinitionsFile { .. })
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defines]\nmy = \"long\"").unwrap();

        let definitions = FilterDefinitions::from_file(file.path()).unwrap();
        assert_eq!(definitions.defines["my"], "long");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_matches!(
            FilterDefinitions::from_file(&missing),
            Err(PreprocessorError::DefinitionsFile { path, .. }) if path.ends_with("absent.toml")
        );
    }

    #[test]
    fn test_merge_and_apply() {
        let mut definitions = FilterDefinitions::from_toml_str("[defines]\nmy = \"int\"").unwrap();
        let mut overrides = FilterDefinitions::new();
        overrides.add_define("my=long").unwrap();
        overrides.add_macro("CALL").unwrap();
        definitions.merge(overrides);

        let mut engine = Preprocessor::new();
        definitions.apply_to(&mut engine).unwrap();

        let kinds: Vec<FilterKind> = engine.filters().iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec![FilterKind::Define, FilterKind::Macro]);

        let tokens = engine.tokenize_all("my CALL(1) x").unwrap();
        let images: Vec<&str> = tokens.iter().map(|t| t.image.as_str()).collect();
        assert_eq!(images, vec!["long", "x", ""]);
    }

    #[test]
    fn test_apply_reports_clash_between_tables() {
        let mut definitions = FilterDefinitions::new();
        definitions.add_define("SAME").unwrap();
        definitions.add_macro("SAME").unwrap();

        let mut engine = Preprocessor::new();
        assert_matches!(
            definitions.apply_to(&mut engine),
            Err(PreprocessorError::DuplicateFilter { kind: FilterKind::Macro, .. })
        );
    }
}
