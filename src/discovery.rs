//! Source file discovery for a module tree.

use globset::GlobSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{AnalysisError, Result};

/// Walks a module root and selects the files to analyze.
pub struct FileDiscovery {
    extensions: Vec<String>,
    excluded: GlobSet,
    follow_links: bool,
    sort_entries: bool,
}

impl FileDiscovery {
    /// Create a discovery for the given extensions (without dot).
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.as_ref().to_string()).collect(),
            excluded: GlobSet::empty(),
            follow_links: false,
            sort_entries: true,
        }
    }

    /// Build a discovery from the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(&config.extensions())
            .excluded(config.exclusion_matcher()?)
            .follow_links(config.follow_links())
            .sort_entries(config.sort_entries()))
    }

    /// Skip paths (relative to the module root) matching this set.
    pub fn excluded(mut self, excluded: GlobSet) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Sort the entries of each directory by file name.
    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        match path.strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => self.excluded.is_match(rel),
            _ => false,
        }
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    /// Enumerate the source files of a module in traversal order.
    ///
    /// Fails with `ModuleNotFound` before touching anything when `root` is
    /// not a directory, and with `FileSystem` on the first walk error.
    pub fn discover(&self, module: &str, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(AnalysisError::ModuleNotFound {
                module: module.to_string(),
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root).follow_links(self.follow_links);
        if self.sort_entries {
            walker = walker.sort_by_file_name();
        }

        let mut files = Vec::new();

        for entry in walker
            .into_iter()
            .filter_entry(|e| !self.is_excluded(root, e.path()))
        {
            let entry = entry.map_err(|e| AnalysisError::FileSystem {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: io::Error::from(e),
            })?;

            if entry.file_type().is_file() && self.has_source_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }

        tracing::debug!(module, count = files.len(), "discovered source files");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_selects_source_files_recursively() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.py");
        touch(temp.path(), "a.py");
        touch(temp.path(), "README.md");
        touch(temp.path(), "doctype/item/item.py");
        touch(temp.path(), "doctype/item/item.js");
        touch(temp.path(), "compiled.pyc");

        let files = FileDiscovery::new(&["py"])
            .discover("stock", temp.path())
            .unwrap();

        assert_eq!(
            names(temp.path(), &files),
            vec!["a.py", "b.py", "doctype/item/item.py"]
        );
    }

    #[test]
    fn test_missing_root_is_module_not_found() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nope");

        let err = FileDiscovery::new(&["py"])
            .discover("nope", &root)
            .unwrap_err();
        match err {
            AnalysisError::ModuleNotFound { module, path } => {
                assert_eq!(module, "nope");
                assert_eq!(path, root);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_root_is_module_not_found() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "module.py");

        let err = FileDiscovery::new(&["py"])
            .discover("module.py", &temp.path().join("module.py"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ModuleNotFound { .. }));
    }

    #[test]
    fn test_excluded_paths() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "keep.py");
        touch(temp.path(), "patches/v1/fix.py");
        touch(temp.path(), "tests/test_keep.py");

        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("patches").unwrap());
        builder.add(Glob::new("**/test_*.py").unwrap());

        let files = FileDiscovery::new(&["py"])
            .excluded(builder.build().unwrap())
            .discover("m", temp.path())
            .unwrap();

        assert_eq!(names(temp.path(), &files), vec!["keep.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_error_is_filesystem_error() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.py");
        std::os::unix::fs::symlink(temp.path().join("nowhere"), temp.path().join("link")).unwrap();

        let err = FileDiscovery::new(&["py"])
            .follow_links(true)
            .discover("m", temp.path())
            .unwrap_err();
        match err {
            AnalysisError::FileSystem { path, .. } => assert!(path.ends_with("link")),
            other => panic!("unexpected error: {other}"),
        }

        // Without following, the link is just a non-source entry.
        let files = FileDiscovery::new(&["py"])
            .discover("m", temp.path())
            .unwrap();
        assert_eq!(names(temp.path(), &files), vec!["a.py"]);
    }

    #[test]
    fn test_empty_module() {
        let temp = TempDir::new().unwrap();
        let files = FileDiscovery::new(&["py"])
            .discover("empty", temp.path())
            .unwrap();
        assert!(files.is_empty());
    }
}
