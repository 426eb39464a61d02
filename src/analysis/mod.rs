//! AST-backed structure extraction.
//!
//! Source files are parsed with tree-sitter, walked in document order, and
//! every node is classified into a small closed set of kinds. The extractor
//! turns those kinds into the three record datasets.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐     ┌───────────────┐
//! │ Source file │────▶│ Analyzer     │────▶│ DocumentOrder │────▶│ Extractor     │
//! └─────────────┘     │ (parse,      │     │ (pre-order    │     │ (slot, records│
//!                     │  classify)   │     │  node walk)   │     │  per file)    │
//!                     └──────────────┘     └───────────────┘     └───────────────┘
//!                                                                        │
//!                                                                        ▼
//!                                                                ┌───────────────┐
//!                                                                │AnalysisDataset│
//!                                                                └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement `LanguageAnalyzer` (`parse` and `classify`)
//! 3. Register the analyzer in `languages/mod.rs`

mod dataset;
mod extractor;
mod facts;
mod languages;
mod traits;
mod walker;

pub use dataset::{
    AnalysisDataset, CallRecord, ClassRecord, DatasetCounts, Diagnostic, FunctionRecord,
};
pub use extractor::{extract, Extractor, FileContext};
pub use facts::{Callee, NodeKind};
pub use languages::{get_analyzer, register_analyzers, registered_extensions, PythonAnalyzer};
pub use traits::{LanguageAnalyzer, ParsedFile};
pub use walker::DocumentOrder;
