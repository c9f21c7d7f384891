//! Compile failure reported by a page compiler.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A compile error with an optional source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileError {
    pub message: String,
    pub file: PathBuf,
    /// 1-based, 0 when unknown.
    pub line: usize,
    pub column: usize,
    /// Length of the offending span in characters.
    pub length: usize,
}

impl CompileError {
    /// An error not tied to any position in the file.
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: file.into(),
            line: 0,
            column: 0,
            length: 0,
        }
    }

    /// Attach a location computed from a byte offset into `source`.
    pub fn at(mut self, source: &str, offset: usize, length: usize) -> Self {
        let before = &source[..offset.min(source.len())];
        self.line = before.matches('\n').count() + 1;
        self.column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        self.length = length;
        self
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{}:{}:{}: {}",
                self.file.display(),
                self.line,
                self.column,
                self.message
            )
        } else {
            write!(f, "{}: {}", self.file.display(), self.message)
        }
    }
}

impl std::error::Error for CompileError {}
