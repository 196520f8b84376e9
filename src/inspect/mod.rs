//! Source inspection
//!
//! Two kinds of boolean probes against a target program:
//!
//! - [`SourceInspector::has_function`] loads the program through a
//!   [`ModuleLoader`] and checks whether a name is defined. A program that
//!   fails to load simply has no functions.
//! - [`SourceInspector::has_literal`] searches the raw source text. The text is
//!   read once per path and kept for the lifetime of the inspector.

mod loader;

pub use loader::{ModuleLoader, ProbeOutcome, PythonModuleLoader};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, HarnessResult};

/// Answers function and literal probes for target programs.
pub struct SourceInspector<L: ModuleLoader> {
    loader: L,
    sources: HashMap<PathBuf, String>,
}

impl<L: ModuleLoader> SourceInspector<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            sources: HashMap::new(),
        }
    }

    /// Whether `name` is defined once the program at `path` is loaded.
    pub fn has_function(&self, path: &Path, name: &str) -> bool {
        tracing::info!("Checking whether function {} is in {}", name, path.display());

        let found = match self.loader.probe(path, name) {
            ProbeOutcome::Found => true,
            ProbeOutcome::Missing => false,
            ProbeOutcome::LoadFailed(reason) => {
                tracing::error!("Error loading {}: {}", path.display(), reason);
                return false;
            }
        };
        tracing::info!("--> {}", found);
        found
    }

    /// Whether `text` occurs anywhere in the source at `path`.
    pub fn has_literal(&mut self, path: &Path, text: &str) -> HarnessResult<bool> {
        tracing::info!("Checking whether string \"{}\" is in {}", text, path.display());

        let found = self.source(path)?.contains(text);
        tracing::info!("--> {}", found);
        Ok(found)
    }

    /// Number of distinct sources read so far.
    pub fn cached_sources(&self) -> usize {
        self.sources.len()
    }

    fn source(&mut self, path: &Path) -> HarnessResult<&str> {
        if !self.sources.contains_key(path) {
            let content = fs::read_to_string(path).map_err(|source| HarnessError::SourceRead {
                path: path.to_path_buf(),
                source,
            })?;
            self.sources.insert(path.to_path_buf(), content);
        }
        Ok(self.sources.get(path).map(String::as_str).unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Loader that answers from a fixed list and records every probe.
    struct FakeLoader {
        defined: Vec<&'static str>,
        fail: bool,
        probes: RefCell<Vec<String>>,
    }

    impl FakeLoader {
        fn defining(defined: Vec<&'static str>) -> Self {
            Self {
                defined,
                fail: false,
                probes: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModuleLoader for FakeLoader {
        fn probe(&self, _path: &Path, name: &str) -> ProbeOutcome {
            self.probes.borrow_mut().push(name.to_string());
            if self.fail {
                ProbeOutcome::LoadFailed("SyntaxError: invalid syntax".to_string())
            } else if self.defined.contains(&name) {
                ProbeOutcome::Found
            } else {
                ProbeOutcome::Missing
            }
        }
    }

    #[test]
    fn test_has_function_follows_loader() {
        let inspector = SourceInspector::new(FakeLoader::defining(vec!["add", "main"]));
        let path = Path::new("calculator.py");
        assert!(inspector.has_function(path, "add"));
        assert!(inspector.has_function(path, "main"));
        assert!(!inspector.has_function(path, "divide"));
    }

    #[test]
    fn test_load_failure_means_absent() {
        let mut loader = FakeLoader::defining(vec!["add"]);
        loader.fail = true;
        let inspector = SourceInspector::new(loader);
        assert!(!inspector.has_function(Path::new("calculator.py"), "add"));
    }

    #[test]
    fn test_has_literal_reads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calculator.py");
        fs::write(&path, "import logging\nlogging.basicConfig()\n").unwrap();

        let mut inspector = SourceInspector::new(FakeLoader::defining(vec![]));
        assert!(inspector.has_literal(&path, "import logging").unwrap());

        // Later edits are not observed: the first read is reused.
        fs::write(&path, "import argparse\n").unwrap();
        assert!(inspector.has_literal(&path, "logging.basicConfig").unwrap());
        assert!(!inspector.has_literal(&path, "import argparse").unwrap());
        assert_eq!(inspector.cached_sources(), 1);
    }

    #[test]
    fn test_has_literal_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.py");
        let mut inspector = SourceInspector::new(FakeLoader::defining(vec![]));
        let err = inspector.has_literal(&path, "--debug").unwrap_err();
        assert!(matches!(err, HarnessError::SourceRead { .. }));
        assert_eq!(inspector.cached_sources(), 0);
    }

    #[test]
    fn test_separate_inspectors_do_not_share_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calculator.py");
        fs::write(&path, "--seed").unwrap();

        let mut first = SourceInspector::new(FakeLoader::defining(vec![]));
        assert!(first.has_literal(&path, "--seed").unwrap());

        fs::write(&path, "--debug").unwrap();
        let mut second = SourceInspector::new(FakeLoader::defining(vec![]));
        assert!(!second.has_literal(&path, "--seed").unwrap());
        assert!(second.has_literal(&path, "--debug").unwrap());
    }
}
