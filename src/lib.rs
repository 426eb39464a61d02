//! Callmap - static structure and call relationships of Python modules.
//!
//! Callmap parses the source files of one module directory with
//! tree-sitter, walks each tree in document order and records every
//! function definition, class definition and bare-name call made inside a
//! function. The results are written as three reports per module.
//!
//! # Architecture
//!
//! - `discovery`: selects the source files of a module tree
//! - `analysis`: language analyzers, tree walker and record extraction
//! - `driver`: runs discovery and extraction, folds parse errors into diagnostics
//! - `report`: report files (JSON, YAML) and the terminal summary
//! - `graph`: caller/callee adjacency over the calls dataset
//! - `config`: YAML configuration schema
//!
//! # Adding a New Language
//!
//! Implement the `LanguageAnalyzer` trait (see `src/analysis/languages/`)
//! and register it in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod graph;
pub mod report;

pub use analysis::{
    register_analyzers, AnalysisDataset, CallRecord, ClassRecord, Diagnostic, FunctionRecord,
    LanguageAnalyzer, PythonAnalyzer,
};
pub use config::{Config, ReportFormat};
pub use driver::{AnalysisOutcome, Driver, Summary};
pub use error::{AnalysisError, ParseError};
pub use graph::CallGraph;
pub use report::ReportWriter;

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}
