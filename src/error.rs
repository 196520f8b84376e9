//! Harness error taxonomy
//!
//! Every variant here is fatal: the driver stops at the first one and the CLI
//! turns it into a non-zero exit. A target program that fails to load during a
//! function probe is *not* represented here; the inspector reports it as
//! "function absent" and moves on.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a grading run.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("failed to read source {}: {source}", .path.display())]
    #[diagnostic(code(grader::source_read), help("check that the target program exists and is UTF-8 text"))]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Did not find a valid testing scenario (capability mask {mask})")]
    #[diagnostic(
        code(grader::unrecognized_scenario),
        help("the program is either non-functional (e.g. a syntax error) or does not match a known capability set")
    )]
    UnrecognizedCapabilitySet { mask: u8 },

    #[error("failed to start `{command}`: {source}")]
    #[diagnostic(code(grader::spawn))]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command returned non-zero exit status ({status}): {command}")]
    #[diagnostic(code(grader::invocation_failed))]
    InvocationFailure {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to read fixture {}: {source}", .path.display())]
    #[diagnostic(code(grader::fixture_read), help("fixtures are named expected-results-<mask>-<name>[-debug|-seeds].txt"))]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command returned unexpected output: {command}")]
    #[diagnostic(code(grader::output_mismatch), help("the expected and actual output are logged above"))]
    OutputMismatch {
        command: String,
        fixture: PathBuf,
        report: String,
    },
}

impl HarnessError {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::SourceRead { .. } => "source_read",
            HarnessError::UnrecognizedCapabilitySet { .. } => "unrecognized_capability_set",
            HarnessError::Spawn { .. } => "spawn",
            HarnessError::InvocationFailure { .. } => "invocation_failure",
            HarnessError::FixtureRead { .. } => "fixture_read",
            HarnessError::OutputMismatch { .. } => "output_mismatch",
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
