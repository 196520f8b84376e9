//! CLI module for the calculator grader
//!
//! ## Modes
//!
//! - default: detect, resolve, run every step, compare against fixtures
//! - `--detect-only`: stop after the scenario lookup and print the plan
//! - `--list-scenarios`: print the scenario table
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Mode functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use crate::config::{DEFAULT_FIXTURES_DIR, DEFAULT_INTERPRETER, DEFAULT_SOURCE, HarnessConfig};
use crate::error::HarnessError;
use crate::executor::ProgramRunner;
use crate::harness::Harness;
use crate::inspect::ModuleLoader;
use crate::report::{ConsoleReporter, HarnessReporter, JsonReporter};
use crate::scenario::{ArgToken, RunSpec, SCENARIOS, Scenario};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        let report = miette::Report::new(err);
        CliError::failure(format!("{:?}", report))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Log lines on stdout
    Text,
    /// One JSON document on stdout (logs go to stderr)
    Json,
}

/// Grade a calculator submission by detecting what it implements
#[derive(Parser, Debug)]
#[command(name = "calc-grader")]
#[command(version)]
#[command(about = "Grade a calculator submission by detecting what it implements", long_about = None)]
pub struct Cli {
    /// Target program source
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SOURCE)]
    pub source: PathBuf,

    /// Directory holding the expected-results fixtures
    #[arg(long, value_name = "DIR", default_value = DEFAULT_FIXTURES_DIR)]
    pub fixtures: PathBuf,

    /// Interpreter used to load and run the target program
    #[arg(long, value_name = "PROG", default_value = DEFAULT_INTERPRETER)]
    pub interpreter: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Only detect capabilities and print the selected scenario
    #[arg(long, conflicts_with = "list_scenarios")]
    pub detect_only: bool,

    /// Print the recognized scenarios and exit
    #[arg(long)]
    pub list_scenarios: bool,

    /// Verbose logging (state transitions)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new()
            .with_source(&self.source)
            .with_fixtures_dir(&self.fixtures)
            .with_interpreter(&self.interpreter)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.format, cli.verbose);

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Structured logging with an env-based filter, defaulting to info.
///
/// Text mode logs to stdout like the grading output it accompanies; JSON mode
/// keeps stdout for the report. Colors only when the log stream is a terminal,
/// so captured logs stay plain `LEVEL message` lines.
fn init_tracing(format: ReportFormat, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();

    let _ = match format {
        ReportFormat::Text => builder
            .with_ansi(io::stdout().is_terminal())
            .with_writer(io::stdout)
            .try_init(),
        ReportFormat::Json => builder
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .try_init(),
    };
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    if cli.list_scenarios {
        print!("{}", scenario_table());
        return Ok(ExitCode::SUCCESS);
    }

    let mut harness = Harness::from_config(cli.config());
    if cli.detect_only {
        return detect_only(&mut harness, cli.format);
    }

    let mut reporter: Box<dyn HarnessReporter> = match cli.format {
        ReportFormat::Text => Box::new(ConsoleReporter),
        ReportFormat::Json => Box::new(JsonReporter::new()),
    };
    harness.run(reporter.as_mut())?;
    Ok(ExitCode::SUCCESS)
}

fn detect_only<L: ModuleLoader, R: ProgramRunner>(
    harness: &mut Harness<L, R>,
    format: ReportFormat,
) -> CliResult<ExitCode> {
    let detection = harness.detect()?;

    match format {
        ReportFormat::Text => {
            println!("capabilities: {}", detection.flags.present().join(", "));
            println!("mask: {}", detection.mask);
            match detection.scenario {
                Some(scenario) => {
                    println!("scenario: {} ({})", scenario.fixture_base(), scenario.description);
                    for spec in scenario.run_specs() {
                        let runs = if spec.count == 1 {
                            String::new()
                        } else {
                            format!(" x{}", spec.count)
                        };
                        println!("  {}{} -> {}", spec_args(&spec), runs, spec.fixture);
                    }
                }
                None => println!("scenario: unrecognized"),
            }
        }
        ReportFormat::Json => {
            let steps: Vec<serde_json::Value> = detection
                .scenario
                .map(Scenario::run_specs)
                .unwrap_or_default()
                .iter()
                .map(|spec| serde_json::json!({ "fixture": spec.fixture, "runs": spec.count }))
                .collect();
            let doc = serde_json::json!({
                "capabilities": detection.flags.present(),
                "mask": detection.mask.value(),
                "scenario": detection.scenario.map(Scenario::fixture_base),
                "steps": steps,
            });
            let rendered = serde_json::to_string_pretty(&doc)
                .map_err(|e| CliError::failure(format!("failed to render JSON: {}", e)))?;
            println!("{}", rendered);
        }
    }

    if detection.scenario.is_none() {
        return Err(HarnessError::UnrecognizedCapabilitySet {
            mask: detection.mask.value(),
        }
        .into());
    }
    Ok(ExitCode::SUCCESS)
}

/// Argument template of a step as shown to humans, e.g. `--debug --seed {i}`.
fn spec_args(spec: &RunSpec) -> String {
    let args: Vec<&str> = spec
        .args
        .iter()
        .map(|token| match token {
            ArgToken::Literal(arg) => *arg,
            ArgToken::SeedIteration => "--seed {i}",
        })
        .collect();
    if args.is_empty() {
        "(no arguments)".to_string()
    } else {
        args.join(" ")
    }
}

/// The recognized masks and their plans.
pub fn scenario_table() -> String {
    let mut out = String::new();
    for scenario in &SCENARIOS {
        let steps = scenario.run_specs().len();
        out.push_str(&format!(
            "{:>2}  {:<28} {} step{}  {}\n",
            scenario.mask,
            scenario.fixture_base(),
            steps,
            if steps == 1 { "" } else { "s" },
            scenario.description
        ));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::capability::CapabilityMask;
    use crate::scenario::resolve;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["calc-grader"]).unwrap();
        assert_eq!(cli.source, PathBuf::from("calculator.py"));
        assert_eq!(cli.fixtures, PathBuf::from("tests"));
        assert_eq!(cli.interpreter, "python3");
        assert_eq!(cli.format, ReportFormat::Text);
        assert!(!cli.detect_only);
    }

    #[test]
    fn test_cli_parse_options() {
        let cli = Cli::try_parse_from([
            "calc-grader",
            "--source",
            "student/calc.py",
            "--fixtures",
            "fixtures",
            "--format",
            "json",
            "--detect-only",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.source, PathBuf::from("student/calc.py"));
        assert_eq!(config.fixtures_dir, PathBuf::from("fixtures"));
        assert_eq!(cli.format, ReportFormat::Json);
        assert!(cli.detect_only);
    }

    #[test]
    fn test_cli_detect_only_conflicts_with_list() {
        assert!(Cli::try_parse_from(["calc-grader", "--detect-only", "--list-scenarios"]).is_err());
    }

    #[test]
    fn test_scenario_table_lists_every_mask() {
        let table = scenario_table();
        assert_eq!(table.lines().count(), SCENARIOS.len());
        assert!(table.contains("expected-results-63-all"));
        assert!(table.contains("expected-results-25-logging  2 steps"));
    }

    #[test]
    fn test_spec_args_rendering() {
        let specs = resolve(CapabilityMask(57)).unwrap().run_specs();
        assert_eq!(spec_args(&specs[0]), "(no arguments)");
        assert_eq!(spec_args(&specs[1]), "--debug");
        assert_eq!(spec_args(&specs[2]), "--debug --seed {i}");
    }

    #[test]
    fn test_harness_error_maps_to_failure() {
        let err: CliError = HarnessError::UnrecognizedCapabilitySet { mask: 2 }.into();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("capability mask 2"));
    }
}
