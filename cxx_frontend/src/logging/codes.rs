//! Error and success codes with their classification metadata
//!
//! Single source of truth for every code the front-end logs. Errors of the
//! lexer, the preprocessor and the scope resolver map onto these codes via
//! their `error_code()` methods.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_PATH: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_LITERAL: Code = Code::new("E021");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Token filter (define/macro) error codes
pub mod preprocessor {
    use super::Code;

    pub const INVALID_TRIGGER_NAME: Code = Code::new("E060");
    pub const DUPLICATE_FILTER: Code = Code::new("E061");
    pub const UNBALANCED_MACRO_ARGUMENTS: Code = Code::new("E062");
    pub const INVALID_REPLACEMENT: Code = Code::new("E063");
    pub const TOO_MANY_FILTERS: Code = Code::new("E064");
    pub const INVALID_DEFINITION: Code = Code::new("E065");
    pub const MACRO_ARGUMENTS_TOO_LONG: Code = Code::new("E066");
}

/// Scope resolution error codes
pub mod scope {
    use super::Code;

    pub const INVALID_SCOPE_NAME: Code = Code::new("E070");
    pub const DUPLICATE_TYPE_NAME: Code = Code::new("E071");
    pub const SCOPE_NESTING_TOO_DEEP: Code = Code::new("E072");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const FILTER_REGISTERED: Code = Code::new("I030");
    pub const PREPROCESSING_COMPLETE: Code = Code::new("I031");
    pub const SCOPE_OUTLINE_COMPLETE: Code = Code::new("I040");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut register = |code: Code,
                            category: &'static str,
                            severity: Severity,
                            recoverable: bool,
                            requires_halt: bool,
                            description: &'static str,
                            recommended_action: &'static str| {
            registry.insert(
                code.as_str(),
                ErrorMetadata {
                    code: code.as_str(),
                    category,
                    severity,
                    recoverable,
                    requires_halt,
                    description,
                    recommended_action,
                },
            );
        };

        register(
            system::INTERNAL_ERROR,
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal error",
            "File a bug report with the input that triggered it",
        );
        register(
            system::INITIALIZATION_FAILURE,
            "System",
            Severity::Critical,
            false,
            true,
            "Initialization failure",
            "Check logging configuration and environment variables",
        );

        register(
            file_processing::FILE_NOT_FOUND,
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Input file not found",
            "Check the path passed on the command line",
        );
        register(
            file_processing::INVALID_PATH,
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Path is not a regular file",
            "Pass a source file or a directory to walk",
        );
        register(
            file_processing::FILE_TOO_LARGE,
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Input file exceeds the maximum size",
            "Split the translation unit or skip generated sources",
        );
        register(
            file_processing::INVALID_ENCODING,
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Input file is not valid UTF-8",
            "Convert the file to UTF-8",
        );
        register(
            file_processing::IO_ERROR,
            "FileProcessing",
            Severity::High,
            true,
            false,
            "I/O error while reading input",
            "Check file permissions and disk state",
        );

        register(
            lexical::INVALID_CHARACTER,
            "Lexical",
            Severity::High,
            false,
            true,
            "Character outside the C++ basic source character set",
            "Remove or escape the character",
        );
        register(
            lexical::UNTERMINATED_LITERAL,
            "Lexical",
            Severity::High,
            false,
            true,
            "Character or string literal is not terminated",
            "Close the literal before the end of the line",
        );
        register(
            lexical::UNTERMINATED_COMMENT,
            "Lexical",
            Severity::High,
            false,
            true,
            "Block comment is not terminated",
            "Add the closing */",
        );
        register(
            lexical::IDENTIFIER_TOO_LONG,
            "Lexical",
            Severity::Medium,
            false,
            true,
            "Identifier exceeds the maximum length",
            "Shorten the identifier",
        );
        register(
            lexical::TOO_MANY_TOKENS,
            "Lexical",
            Severity::High,
            false,
            true,
            "Input produced more tokens than allowed",
            "Split the input",
        );

        register(
            preprocessor::INVALID_TRIGGER_NAME,
            "Preprocessor",
            Severity::High,
            false,
            true,
            "Define or macro name is not a single identifier",
            "Use a plain identifier without scope qualifiers",
        );
        register(
            preprocessor::DUPLICATE_FILTER,
            "Preprocessor",
            Severity::High,
            false,
            true,
            "Define or macro registered twice",
            "Remove the redefinition",
        );
        register(
            preprocessor::UNBALANCED_MACRO_ARGUMENTS,
            "Preprocessor",
            Severity::High,
            false,
            true,
            "Macro argument list not closed before end of input",
            "Check the parentheses following the macro invocation",
        );
        register(
            preprocessor::INVALID_REPLACEMENT,
            "Preprocessor",
            Severity::High,
            false,
            true,
            "Replacement value cannot be tokenized",
            "Fix the replacement text",
        );
        register(
            preprocessor::TOO_MANY_FILTERS,
            "Preprocessor",
            Severity::Medium,
            false,
            true,
            "Too many defines and macros registered",
            "Reduce the number of definitions",
        );
        register(
            preprocessor::INVALID_DEFINITION,
            "Preprocessor",
            Severity::High,
            false,
            true,
            "Definition text or file could not be parsed",
            "Use NAME=VALUE or a TOML file with [defines] and [macros] tables",
        );
        register(
            preprocessor::MACRO_ARGUMENTS_TOO_LONG,
            "Preprocessor",
            Severity::High,
            false,
            true,
            "Macro argument list exceeds the token limit",
            "Check for a missing closing parenthesis",
        );

        register(
            scope::INVALID_SCOPE_NAME,
            "Scope",
            Severity::High,
            false,
            true,
            "Scope or type name contains a scope qualifier",
            "Declare nested names from inside their enclosing scope",
        );
        register(
            scope::DUPLICATE_TYPE_NAME,
            "Scope",
            Severity::Medium,
            true,
            false,
            "Type name declared twice in the same scope",
            "Remove the duplicate declaration",
        );
        register(
            scope::SCOPE_NESTING_TOO_DEEP,
            "Scope",
            Severity::High,
            false,
            true,
            "Scopes nested deeper than allowed",
            "Flatten the nesting",
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            file_processing::FILE_NOT_FOUND,
            file_processing::INVALID_PATH,
            file_processing::FILE_TOO_LARGE,
            file_processing::INVALID_ENCODING,
            file_processing::IO_ERROR,
            lexical::INVALID_CHARACTER,
            lexical::UNTERMINATED_LITERAL,
            lexical::UNTERMINATED_COMMENT,
            lexical::IDENTIFIER_TOO_LONG,
            lexical::TOO_MANY_TOKENS,
            preprocessor::INVALID_TRIGGER_NAME,
            preprocessor::DUPLICATE_FILTER,
            preprocessor::UNBALANCED_MACRO_ARGUMENTS,
            preprocessor::INVALID_REPLACEMENT,
            preprocessor::TOO_MANY_FILTERS,
            preprocessor::INVALID_DEFINITION,
            preprocessor::MACRO_ARGUMENTS_TOO_LONG,
            scope::INVALID_SCOPE_NAME,
            scope::DUPLICATE_TYPE_NAME,
            scope::SCOPE_NESTING_TOO_DEEP,
        ];

        for code in codes {
            let metadata = get_error_metadata(code.as_str());
            assert!(metadata.is_some(), "missing metadata for {}", code);
            assert_ne!(get_description(code.as_str()), "Unknown error");
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E062"), "Preprocessor");
        assert!(requires_halt("E062"));
        assert!(is_recoverable("E071"));
        assert_eq!(get_severity("ERR001"), Severity::Critical);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert!(!requires_halt("E999"));
        assert_eq!(get_severity("E999"), Severity::Medium);
    }
}
