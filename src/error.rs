//! Error taxonomy for module analysis.
//!
//! Only [`AnalysisError::Parse`] is recoverable: the driver records it as a
//! [`Diagnostic`](crate::analysis::Diagnostic) and moves on to the next file.
//! Every other variant aborts the run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A 1-indexed source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Location {
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
}

impl Location {
    /// Position of the first byte of a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        Self {
            line: start.row + 1, // tree-sitter is 0-indexed
            column: start.column + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single file that could not be turned into a syntax tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error in {file} at {location}: {message}")]
pub struct ParseError {
    pub file: String,
    pub location: Location,
    pub message: String,
}

/// Errors that can occur while analyzing a module.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("module not found: {module} (looked in {})", path.display())]
    ModuleNotFound { module: String, path: PathBuf },

    #[error("filesystem error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Whether the driver may skip the offending file and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
