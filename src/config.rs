//! Harness configuration
//!
//! Where the target program lives, which interpreter runs it, and where the
//! expected-output fixtures are kept.

use std::path::{Path, PathBuf};

/// Default name of the student program.
pub const DEFAULT_SOURCE: &str = "calculator.py";
/// Default directory holding `expected-results-*.txt` fixtures.
pub const DEFAULT_FIXTURES_DIR: &str = "tests";
/// Default interpreter used both for function probes and for runs.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Path of the target program source
    pub source: PathBuf,
    /// Directory containing the fixture files
    pub fixtures_dir: PathBuf,
    /// Interpreter that loads and runs the target program
    pub interpreter: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            interpreter: DEFAULT_INTERPRETER.to_string(),
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target program source path
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the fixture directory
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Full path of a fixture file given its file name.
    pub fn fixture_path(&self, file_name: &str) -> PathBuf {
        self.fixtures_dir.join(file_name)
    }

    /// Path used on the target's command line.
    ///
    /// Bare relative file names get a `./` prefix, so the invocation reads
    /// `python3 ./calculator.py`.
    pub fn program_path(&self) -> PathBuf {
        let source = self.source.as_path();
        if source.is_relative() && source.parent() == Some(Path::new("")) {
            Path::new(".").join(source)
        } else {
            source.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.source, PathBuf::from("calculator.py"));
        assert_eq!(config.fixtures_dir, PathBuf::from("tests"));
        assert_eq!(config.interpreter, "python3");
    }

    #[test]
    fn test_builder_setters() {
        let config = HarnessConfig::new()
            .with_source("student/calc.py")
            .with_fixtures_dir("fixtures")
            .with_interpreter("python3.12");
        assert_eq!(config.source, PathBuf::from("student/calc.py"));
        assert_eq!(config.fixtures_dir, PathBuf::from("fixtures"));
        assert_eq!(config.interpreter, "python3.12");
    }

    #[test]
    fn test_fixture_path_joins_dir() {
        let config = HarnessConfig::default();
        assert_eq!(
            config.fixture_path("expected-results-1-original.txt"),
            PathBuf::from("tests/expected-results-1-original.txt")
        );
    }

    #[test]
    fn test_program_path_prefixes_bare_names() {
        assert_eq!(HarnessConfig::default().program_path(), PathBuf::from("./calculator.py"));
        let nested = HarnessConfig::new().with_source("student/calc.py");
        assert_eq!(nested.program_path(), PathBuf::from("student/calc.py"));
        let absolute = HarnessConfig::new().with_source("/tmp/calc.py");
        assert_eq!(absolute.program_path(), PathBuf::from("/tmp/calc.py"));
    }
}
