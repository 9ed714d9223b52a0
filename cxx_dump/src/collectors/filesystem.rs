//! Expands command-line paths into the list of C/C++ sources to process

use cxx_frontend::file_processor::is_source_file;
use cxx_frontend::log_warning;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Descend into subdirectories
    pub recursive: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self { recursive: true }
    }
}

/// Files are taken as given; directories contribute their C/C++ sources in
/// sorted order. Paths that do not exist are passed through so the reader
/// reports them.
pub fn collect_sources(paths: &[PathBuf], options: CollectOptions) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            sources.extend(walk_directory(path, options));
        } else {
            sources.push(path.clone());
        }
    }
    sources
}

fn walk_directory(dir: &Path, options: CollectOptions) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).sort_by_file_name();
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                log_warning!("Skipping unreadable directory entry", "error" => error);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.cpp"), "").unwrap();
        fs::write(dir.path().join("a.hpp"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.cc"), "").unwrap();

        let explicit = dir.path().join("notes.txt");
        let found = collect_sources(
            &[dir.path().to_path_buf(), explicit.clone()],
            CollectOptions::default(),
        );
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.hpp", "b.cpp", "c.cc", "notes.txt"]);

        let shallow = collect_sources(
            &[dir.path().to_path_buf()],
            CollectOptions { recursive: false },
        );
        assert_eq!(shallow.len(), 2);
    }
}
