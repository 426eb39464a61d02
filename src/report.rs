//! Report persistence and terminal output.
//!
//! Two concerns live here:
//! - `ReportWriter`: the three dataset files (JSON or YAML arrays)
//! - `write_pretty`: colored run summary for humans

use colored::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisDataset, Diagnostic};
use crate::config::ReportFormat;
use crate::driver::Summary;
use crate::error::{AnalysisError, Result};

// =============================================================================
// Report files
// =============================================================================

/// Paths of the three reports of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub functions: PathBuf,
    pub classes: PathBuf,
    pub calls: PathBuf,
}

impl ReportPaths {
    /// The paths in write order.
    pub fn all(&self) -> [&Path; 3] {
        [
            self.functions.as_path(),
            self.classes.as_path(),
            self.calls.as_path(),
        ]
    }
}

/// Serializes datasets to `{module}_functions`, `{module}_classes` and
/// `{module}_calls` under an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, format: ReportFormat) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the reports of `module` are written.
    pub fn report_paths(&self, module: &str) -> ReportPaths {
        let stem = report_stem(module);
        let ext = self.format.extension();
        ReportPaths {
            functions: self.output_dir.join(format!("{}_functions.{}", stem, ext)),
            classes: self.output_dir.join(format!("{}_classes.{}", stem, ext)),
            calls: self.output_dir.join(format!("{}_calls.{}", stem, ext)),
        }
    }

    /// Write all three reports, replacing existing files.
    ///
    /// Stops at the first failure; reports written before it stay on disk.
    pub fn write(&self, module: &str, dataset: &AnalysisDataset) -> Result<ReportPaths> {
        fs::create_dir_all(&self.output_dir).map_err(|e| AnalysisError::Write {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let paths = self.report_paths(module);
        self.write_records(&paths.functions, dataset.functions())?;
        self.write_records(&paths.classes, dataset.classes())?;
        self.write_records(&paths.calls, dataset.calls())?;

        tracing::info!(
            module,
            output = %self.output_dir.display(),
            format = %self.format,
            "reports written"
        );
        Ok(paths)
    }

    fn write_records<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<()> {
        let content = encode(records, self.format).map_err(|message| AnalysisError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, message),
        })?;
        fs::write(path, content).map_err(|e| AnalysisError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Encode a record array. Output always ends with a newline.
pub fn encode<T: Serialize>(records: &[T], format: ReportFormat) -> std::result::Result<String, String> {
    match format {
        ReportFormat::Json => serde_json::to_string_pretty(records)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
        ReportFormat::Yaml => serde_yaml::to_string(records).map_err(|e| e.to_string()),
    }
}

/// File-name stem for a module; nested module names become `a_b`.
fn report_stem(module: &str) -> String {
    module
        .trim_matches(['/', '\\'])
        .replace(['/', '\\'], "_")
}

// =============================================================================
// Pretty Format (colored terminal output)
// =============================================================================

/// Write the run summary in a human-readable format.
pub fn write_pretty(summary: &Summary, show_leaves: bool) {
    println!();
    println!("  {} {}", "callmap".bold(), summary.module.bold());
    println!();

    let counts = summary.counts;
    println!("  {:<22}{}", "Files analyzed:", summary.files_analyzed);
    println!("  {:<22}{}", "Functions found:", counts.functions.to_string().green());
    println!("  {:<22}{}", "Classes found:", counts.classes.to_string().green());
    println!("  {:<22}{}", "Call relationships:", counts.calls.to_string().green());
    println!("  {:<22}{}", "Distinct callers:", summary.callers);
    println!("  {:<22}{}", "Leaf functions:", summary.leaf_functions.len());
    println!();

    if show_leaves && !summary.leaf_functions.is_empty() {
        println!("  {}", "Leaf functions (no outgoing calls):".bold());
        for name in &summary.leaf_functions {
            println!("    {}", name);
        }
        println!();
    }

    if !summary.diagnostics.is_empty() {
        write_diagnostics(&summary.diagnostics);
    }

    println!("  {}", "Output:".bold());
    for path in summary.reports.all() {
        println!("    {}", path.display().to_string().blue());
    }
    println!();

    if summary.diagnostics.is_empty() {
        println!("  {}", "✓ Analysis complete".green());
    } else {
        let plural = if summary.diagnostics.len() != 1 { "s" } else { "" };
        println!(
            "  {}",
            format!(
                "✓ Analysis complete ({} file{} skipped)",
                summary.diagnostics.len(),
                plural
            )
            .yellow()
        );
    }
    println!();
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    println!("  {} ({}):", "Skipped files".yellow().bold(), diagnostics.len());
    println!();

    for d in diagnostics {
        print!("    {} ", "PARSE".yellow());
        print!("{}", d.file.blue());
        if d.line > 0 {
            print!("{}", format!(":{}:{}", d.line, d.column).dimmed());
        }
        println!();
        println!("          {}", d.message);
    }
    println!();
}
