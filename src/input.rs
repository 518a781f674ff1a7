//! Reading the message to encrypt or decrypt

use crate::error::{BoxsealError, ErrorCategory, ErrorKind, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Trait for reading command input from various sources
pub trait InputReader {
    /// Read the whole input as arbitrary bytes (not necessarily UTF-8)
    fn read_input(&mut self) -> Result<Vec<u8>>;
}

/// Returns fixed bytes (for testing)
pub struct ConstantInputReader {
    data: Vec<u8>,
}

impl ConstantInputReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl InputReader for ConstantInputReader {
    fn read_input(&mut self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

/// Reads input from any io::Read source, typically stdin
pub struct ReaderInputReader {
    reader: Box<dyn Read>,
}

impl ReaderInputReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl InputReader for ReaderInputReader {
    fn read_input(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data).map_err(|e| {
            BoxsealError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to read from standard input",
                e,
            )
        })?;
        Ok(data)
    }
}

/// Reads input from a file
pub struct FileInputReader {
    path: PathBuf,
}

impl FileInputReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InputReader for FileInputReader {
    fn read_input(&mut self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| {
            let category = if e.kind() == io::ErrorKind::NotFound {
                ErrorCategory::User
            } else {
                ErrorCategory::Internal
            };
            BoxsealError::with_kind_and_source(
                category,
                ErrorKind::Io,
                format!("failed to read from {}", self.path.display()),
                e,
            )
        })
    }
}

/// The file at `path` if one was given, standard input otherwise
pub fn file_or_stdin(path: Option<&Path>) -> Box<dyn InputReader> {
    match path {
        Some(path) => Box::new(FileInputReader::new(path)),
        None => Box::new(ReaderInputReader::new(Box::new(io::stdin()))),
    }
}
