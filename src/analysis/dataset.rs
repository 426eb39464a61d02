//! Record datasets accumulated over one module run.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A function or method definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub file: String,
    /// Line of the `def` keyword (1-indexed).
    pub line: usize,
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub file: String,
    /// Line of the `class` keyword (1-indexed).
    pub line: usize,
}

/// A name-based call edge. Nothing is resolved: `callee` is the identifier
/// as written at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub caller: String,
    pub callee: String,
    pub file: String,
}

/// Record counts of a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetCounts {
    pub functions: usize,
    pub classes: usize,
    pub calls: usize,
}

/// Functions, classes and calls of a module, in discovery order and then
/// in-file document order.
///
/// The dataset is append-only: records are never removed or rewritten and
/// duplicate names are kept as separate records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisDataset {
    functions: Vec<FunctionRecord>,
    classes: Vec<ClassRecord>,
    calls: Vec<CallRecord>,
}

impl AnalysisDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn functions(&self) -> &[FunctionRecord] {
        &self.functions
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    pub fn counts(&self) -> DatasetCounts {
        DatasetCounts {
            functions: self.functions.len(),
            classes: self.classes.len(),
            calls: self.calls.len(),
        }
    }

    pub(crate) fn push_function(&mut self, record: FunctionRecord) {
        self.functions.push(record);
    }

    pub(crate) fn push_class(&mut self, record: ClassRecord) {
        self.classes.push(record);
    }

    pub(crate) fn push_call(&mut self, record: CallRecord) {
        self.calls.push(record);
    }

    /// Append another dataset's records after this one's.
    pub(crate) fn append(&mut self, other: AnalysisDataset) {
        self.functions.extend(other.functions);
        self.classes.extend(other.classes);
        self.calls.extend(other.calls);
    }
}

/// A file that was skipped because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Self {
            file: err.file,
            line: err.location.line,
            column: err.location.column,
            message: err.message,
        }
    }
}
