use std::{fs, io};

use ahash::AHashMap;

/// Source of `@file` argument contents.
///
/// Implement this trait to control where argument files come from. The parser asks
/// for the tokens of a path only when an input token starts with one of the configured
/// `fromfile_prefix_chars`; the returned tokens are spliced in place of the reference.
pub trait FileReader {
    /// Returns the whitespace-delimited tokens of `path`.
    fn read_tokens(&self, path: &str) -> io::Result<Vec<String>>;
}

fn split_tokens(contents: &str) -> Vec<String> {
    contents.split_whitespace().map(str::to_owned).collect()
}

/// Reads argument files from the local filesystem.
///
/// The file is read in a single call, so the handle is closed before the tokens are
/// returned, on success and on error alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read_tokens(&self, path: &str) -> io::Result<Vec<String>> {
        fs::read_to_string(path).map(|contents| split_tokens(&contents))
    }
}

/// In-memory argument files, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileReader {
    files: AHashMap<String, String>,
}

impl MemoryFileReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl FileReader for MemoryFileReader {
    fn read_tokens(&self, path: &str) -> io::Result<Vec<String>> {
        self.files
            .get(path)
            .map(|contents| split_tokens(contents))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No such file or directory"))
    }
}

impl<R: FileReader + ?Sized> FileReader for &R {
    fn read_tokens(&self, path: &str) -> io::Result<Vec<String>> {
        (**self).read_tokens(path)
    }
}
