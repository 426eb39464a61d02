//! Configuration for callmap runs.
//!
//! Every key is optional; accessors fall back to the defaults documented in
//! `templates/default.yaml`. Command-line flags override file values.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis;
use crate::error::{AnalysisError, Result};

/// File names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["callmap.yaml", ".callmap.yaml"];

/// Documented default configuration, written by `callmap init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

const DEFAULT_BASE_DIR: &str = "erpnext/erpnext";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_EXTENSIONS: &[&str] = &["py"];

/// Encoding of the report files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}

impl ReportFormat {
    /// File extension of reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "yaml" | "yml" => Ok(ReportFormat::Yaml),
            _ => Err(format!("unknown report format: {}", s)),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Directory that module names are resolved against.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    /// Directory the three reports are written to.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Source file extensions to analyze (without dot).
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Glob patterns, relative to the module root, to skip (e.g. "**/patches/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub follow_links: Option<bool>,
    /// Sort directory entries by name while walking (default: true).
    #[serde(default)]
    pub sort_entries: Option<bool>,
    /// Parse files on the rayon thread pool (default: false).
    #[serde(default)]
    pub parallel: Option<bool>,
    #[serde(default)]
    pub format: Option<ReportFormat>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::parse_str(&content)
            .map_err(|e| AnalysisError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a configuration from YAML text.
    pub fn parse_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Find a configuration file in `dir`, if any.
    pub fn discover_in<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Load the configuration found in the working directory, or defaults.
    pub fn load() -> Result<Self> {
        match Self::discover_in(".") {
            Some(path) => Self::parse_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.base_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_BASE_DIR))
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR))
    }

    /// Extensions to analyze, defaulting to Python sources.
    pub fn extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.to_vec()
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.'))
                .collect()
        }
    }

    pub fn follow_links(&self) -> bool {
        self.follow_links.unwrap_or(false)
    }

    pub fn sort_entries(&self) -> bool {
        self.sort_entries.unwrap_or(true)
    }

    pub fn parallel(&self) -> bool {
        self.parallel.unwrap_or(false)
    }

    pub fn format(&self) -> ReportFormat {
        self.format.unwrap_or_default()
    }

    /// Root directory of a module: base directory joined with its name.
    pub fn module_root(&self, module: &str) -> PathBuf {
        self.base_dir().join(module)
    }

    /// Compile `excluded_paths` into a single matcher.
    pub fn exclusion_matcher(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| {
                AnalysisError::Config(format!("invalid excluded_paths pattern {:?}: {}", pattern, e))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| AnalysisError::Config(format!("building exclusion set: {}", e)))
    }
}

/// Validate a configuration before use.
pub fn validate(config: &Config) -> Result<()> {
    let supported = analysis::registered_extensions();
    for ext in config.extensions() {
        if analysis::get_analyzer(ext).is_none() {
            return Err(AnalysisError::Config(format!(
                "no analyzer for extension {:?} (supported: {})",
                ext,
                supported.join(", ")
            )));
        }
    }

    config.exclusion_matcher()?;

    Ok(())
}
