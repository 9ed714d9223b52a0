//! File processor implementation

use crate::config::constants::compile_time::file_processing::MAX_FILE_SIZE;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Not a regular file: {path}")]
    InvalidPath { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading {path}: {message}")]
    IoError { path: String, message: String },
}

impl FileProcessorError {
    fn from_io(path: &Path, error: std::io::Error) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => Self::FileNotFound { path },
            ErrorKind::InvalidData => Self::InvalidEncoding { path },
            _ => Self::IoError {
                path,
                message: error.to_string(),
            },
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// A translation unit read into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub size: u64,
}

impl SourceFile {
    pub fn line_count(&self) -> usize {
        self.source.lines().count()
    }
}

/// Reads source files, enforcing the compile-time size limit
#[derive(Debug, Clone)]
pub struct FileProcessor {
    max_file_size: u64,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
        }
    }

    /// Lower the size limit; it can never be raised past the compile-time maximum
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self {
            max_file_size: max_file_size.min(MAX_FILE_SIZE),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn process_file(&self, path: &Path) -> Result<SourceFile, FileProcessorError> {
        let result = self.read(path);

        match &result {
            Ok(file) => log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "Source file read",
                "path" => file.path.display(),
                "size" => file.size,
                "lines" => file.line_count()
            ),
            Err(error) => log_error!(
                error.error_code(),
                &error.to_string(),
                "path" => path.display()
            ),
        }

        result
    }

    fn read(&self, path: &Path) -> Result<SourceFile, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| FileProcessorError::from_io(path, e))?;

        if !metadata.is_file() {
            return Err(FileProcessorError::InvalidPath {
                path: path.display().to_string(),
            });
        }

        let size = metadata.len();
        if size > self.max_file_size {
            return Err(FileProcessorError::FileTooLarge {
                size,
                max_size: self.max_file_size,
            });
        }

        log_debug!("Reading source file", "path" => path.display(), "size" => size);

        let bytes = fs::read(path).map_err(|e| FileProcessorError::from_io(path, e))?;
        let source = String::from_utf8(bytes).map_err(|_| FileProcessorError::InvalidEncoding {
            path: path.display().to_string(),
        })?;

        Ok(SourceFile {
            path: path.to_path_buf(),
            source,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_reads_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "namespace A {{\n}}\n").unwrap();

        let source = FileProcessor::new().process_file(file.path()).unwrap();
        assert_eq!(source.source, "namespace A {\n}\n");
        assert_eq!(source.size, 16);
        assert_eq!(source.line_count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = FileProcessor::new()
            .process_file(&dir.path().join("absent.cpp"))
            .unwrap_err();
        assert_matches!(error, FileProcessorError::FileNotFound { .. });
        assert_eq!(error.error_code().as_str(), "E005");
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            FileProcessor::new().process_file(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_size_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b'x'; 64]).unwrap();

        let processor = FileProcessor::with_max_file_size(10);
        assert_matches!(
            processor.process_file(file.path()),
            Err(FileProcessorError::FileTooLarge { size: 64, max_size: 10 })
        );
        assert_eq!(
            FileProcessor::with_max_file_size(u64::MAX).max_file_size(),
            MAX_FILE_SIZE
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x69, 0x6e, 0x74, 0xff, 0xfe]).unwrap();

        let error = FileProcessor::new().process_file(file.path()).unwrap_err();
        assert_matches!(error, FileProcessorError::InvalidEncoding { .. });
        assert!(!error.requires_halt());
    }
}
