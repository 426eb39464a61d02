//! Module analysis driver: discovery, per-file extraction, report writing.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::analysis::{self, AnalysisDataset, DatasetCounts, Diagnostic};
use crate::config::{self, Config};
use crate::discovery::FileDiscovery;
use crate::error::{AnalysisError, Location, ParseError, Result};
use crate::graph::CallGraph;
use crate::report::{ReportPaths, ReportWriter};

/// Everything extracted from one module, before it is written.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutcome {
    pub dataset: AnalysisDataset,
    /// Files skipped because they could not be parsed.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of source files discovered.
    pub files_discovered: usize,
}

impl AnalysisOutcome {
    /// Whether every discovered file contributed to the dataset.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn absorb(&mut self, path: &Path, result: Result<AnalysisDataset>) -> Result<()> {
        match result {
            Ok(records) => {
                self.dataset.append(records);
                Ok(())
            }
            Err(AnalysisError::Parse(err)) => {
                tracing::warn!(file = %path.display(), location = %err.location, "skipping file: {}", err.message);
                self.diagnostics.push(Diagnostic::from(err));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub module: String,
    pub output_dir: PathBuf,
    pub reports: ReportPaths,
    pub counts: DatasetCounts,
    pub diagnostics: Vec<Diagnostic>,
    pub files_analyzed: usize,
    /// Distinct names that make at least one call.
    pub callers: usize,
    /// Defined functions without outgoing calls.
    pub leaf_functions: Vec<String>,
}

/// Runs the analysis of one module at a time.
pub struct Driver {
    config: Config,
    discovery: FileDiscovery,
    parallel: bool,
}

impl Driver {
    /// Create a driver; the configuration is validated first.
    pub fn new(config: Config) -> Result<Self> {
        config::validate(&config)?;
        let discovery = FileDiscovery::from_config(&config)?;
        Ok(Self {
            parallel: config.parallel(),
            config,
            discovery,
        })
    }

    /// Parse files on the rayon pool. Record order is unaffected.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover and extract every source file of `module`.
    ///
    /// Parse errors become diagnostics; any other error aborts the run.
    pub fn analyze(&self, module: &str) -> Result<AnalysisOutcome> {
        if module.trim().is_empty() {
            return Err(AnalysisError::Usage("a module name is required".to_string()));
        }
        // The module must stay below base_dir.
        let escapes = Path::new(module)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(AnalysisError::Usage(format!(
                "module name must be a relative path inside the base directory: {}",
                module
            )));
        }

        let root = self.config.module_root(module);
        tracing::info!(module, root = %root.display(), "analyzing module");

        let files = self.discovery.discover(module, &root)?;
        let mut outcome = AnalysisOutcome {
            files_discovered: files.len(),
            ..Default::default()
        };

        if self.parallel {
            // Buffers come back in discovery order; merging them in that
            // order gives the same output as the sequential loop.
            let results: Vec<Result<AnalysisDataset>> =
                files.par_iter().map(|path| self.analyze_file(path)).collect();
            for (path, result) in files.iter().zip(results) {
                outcome.absorb(path, result)?;
            }
        } else {
            for path in &files {
                outcome.absorb(path, self.analyze_file(path))?;
            }
        }

        Ok(outcome)
    }

    /// Analyze `module` and write its three reports.
    pub fn run(&self, module: &str) -> Result<Summary> {
        let outcome = self.analyze(module)?;

        let writer = ReportWriter::new(self.config.output_dir(), self.config.format());
        let reports = writer.write(module, &outcome.dataset)?;

        let graph = CallGraph::from_calls(outcome.dataset.calls());
        Ok(Summary {
            module: module.to_string(),
            output_dir: writer.output_dir().to_path_buf(),
            reports,
            counts: outcome.dataset.counts(),
            files_analyzed: outcome.files_discovered - outcome.diagnostics.len(),
            callers: graph.caller_count(),
            leaf_functions: graph.leaf_functions(outcome.dataset.functions()),
            diagnostics: outcome.diagnostics,
        })
    }

    /// Parse, walk and extract one file.
    fn analyze_file(&self, path: &Path) -> Result<AnalysisDataset> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let analyzer = analysis::get_analyzer(ext)
            .ok_or_else(|| AnalysisError::Config(format!("no analyzer for {}", path.display())))?;

        let file = path.to_string_lossy().to_string();
        tracing::debug!(file = %file, language = analyzer.language_id(), "reading");

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(ParseError {
                    file,
                    location: Location::default(),
                    message: "file is not valid UTF-8".to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(AnalysisError::FileSystem {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let parsed = analyzer.parse(&file, &source)?;
        Ok(analysis::extract(analyzer, &parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module_with(files: &[(&str, &str)]) -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("base").join("accounts");
        for (rel, content) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let config = Config {
            base_dir: Some(temp.path().join("base")),
            output_dir: Some(temp.path().join("out")),
            ..Default::default()
        };
        (temp, config)
    }

    #[test]
    fn test_empty_module_name_is_usage_error() {
        let driver = Driver::new(Config::default()).unwrap();
        assert!(matches!(driver.analyze("  "), Err(AnalysisError::Usage(_))));
    }

    #[test]
    fn test_module_name_must_stay_inside_base_dir() {
        let (_temp, config) = module_with(&[("a.py", "def a():\n    pass\n")]);
        let driver = Driver::new(config).unwrap();

        for module in ["/etc", "../accounts", "accounts/../../secrets"] {
            assert!(
                matches!(driver.analyze(module), Err(AnalysisError::Usage(_))),
                "{module} should be rejected"
            );
        }
        assert!(driver.analyze("./accounts").is_ok());
    }

    #[test]
    fn test_missing_module() {
        let (_temp, config) = module_with(&[]);
        let driver = Driver::new(config).unwrap();
        let err = driver.analyze("selling").unwrap_err();
        assert!(matches!(err, AnalysisError::ModuleNotFound { ref module, .. } if module == "selling"));
    }

    #[test]
    fn test_parse_errors_become_diagnostics() {
        let (_temp, config) = module_with(&[
            ("a.py", "def foo():\n    bar()\n"),
            ("b.py", "def broken(:\n    pass\n"),
            ("c.py", "class Baz:\n    pass\n"),
        ]);
        let driver = Driver::new(config).unwrap();

        let outcome = driver.analyze("accounts").unwrap();

        assert_eq!(outcome.files_discovered, 3);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].file.ends_with("b.py"));
        assert_eq!(outcome.dataset.functions().len(), 1);
        assert_eq!(outcome.dataset.classes().len(), 1);
        assert_eq!(outcome.dataset.calls().len(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_a_diagnostic() {
        let (temp, config) = module_with(&[("ok.py", "def ok():\n    pass\n")]);
        fs::write(
            temp.path().join("base/accounts/latin1.py"),
            b"# caf\xe9\ndef f():\n    pass\n",
        )
        .unwrap();
        let driver = Driver::new(config).unwrap();

        let outcome = driver.analyze("accounts").unwrap();

        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].message, "file is not valid UTF-8");
        assert_eq!(outcome.dataset.functions().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_failure_aborts_without_reports() {
        let (temp, mut config) = module_with(&[("a.py", "def a():\n    b()\n")]);
        std::os::unix::fs::symlink(
            temp.path().join("missing"),
            temp.path().join("base/accounts/dangling"),
        )
        .unwrap();
        config.follow_links = Some(true);
        let driver = Driver::new(config).unwrap();

        let err = driver.run("accounts").unwrap_err();

        assert!(matches!(err, AnalysisError::FileSystem { .. }), "got {err}");
        assert!(!err.is_recoverable());
        assert!(!temp.path().join("out/accounts_functions.json").exists());
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let (temp, config) = module_with(&[("a.py", "def a():\n    pass\n")]);
        let driver = Driver::new(config).unwrap();

        let err = driver
            .analyze_file(&temp.path().join("base/accounts/gone.py"))
            .unwrap_err();

        assert!(matches!(err, AnalysisError::FileSystem { .. }));
    }

    #[test]
    fn test_write_failure_keeps_earlier_reports() {
        let (temp, config) = module_with(&[("a.py", "class A:\n    def a(self):\n        b()\n")]);
        fs::create_dir_all(temp.path().join("out/accounts_classes.json")).unwrap();
        let driver = Driver::new(config).unwrap();

        let err = driver.run("accounts").unwrap_err();

        match err {
            AnalysisError::Write { path, .. } => assert!(path.ends_with("accounts_classes.json")),
            other => panic!("unexpected error: {other}"),
        }
        let functions = fs::read_to_string(temp.path().join("out/accounts_functions.json")).unwrap();
        assert!(functions.contains("\"name\": \"a\""));
        assert!(!temp.path().join("out/accounts_calls.json").exists());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let files: Vec<(String, String)> = (0..12)
            .map(|i| {
                (
                    format!("pkg{}/mod_{:02}.py", i % 3, i),
                    format!("def f{i}():\n    g{i}()\n\nclass C{i}:\n    def m{i}(self):\n        h{i}()\n"),
                )
            })
            .collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let (_temp, config) = module_with(&refs);

        let sequential = Driver::new(config.clone()).unwrap().analyze("accounts").unwrap();
        let parallel = Driver::new(config)
            .unwrap()
            .parallel(true)
            .analyze("accounts")
            .unwrap();

        assert_eq!(sequential.dataset, parallel.dataset);
        assert_eq!(sequential.dataset.functions().len(), 24);
    }

    #[test]
    fn test_run_writes_reports_and_summary() {
        let (_temp, config) = module_with(&[(
            "ledger.py",
            "def post():\n    validate()\n\ndef validate():\n    pass\n",
        )]);
        let driver = Driver::new(config).unwrap();

        let summary = driver.run("accounts").unwrap();

        assert_eq!(summary.counts.functions, 2);
        assert_eq!(summary.counts.calls, 1);
        assert_eq!(summary.files_analyzed, 1);
        assert_eq!(summary.callers, 1);
        assert_eq!(summary.leaf_functions, vec!["validate".to_string()]);
        for path in summary.reports.all() {
            assert!(path.is_file(), "missing report {}", path.display());
        }
    }
}
