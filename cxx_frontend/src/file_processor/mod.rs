//! Reading translation units from disk
//!
//! Size and encoding checks happen before anything reaches the lexer.

mod processor;

use crate::config::constants::compile_time::file_processing::SOURCE_EXTENSIONS;
use std::path::Path;

pub use processor::{FileProcessor, FileProcessorError, SourceFile};

/// Read one source file with the default processor
pub fn process_file(path: &Path) -> Result<SourceFile, FileProcessorError> {
    FileProcessor::new().process_file(path)
}

/// Whether `path` carries one of the recognised C/C++ extensions
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
