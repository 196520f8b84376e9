//! Target program execution
//!
//! Runs every repetition of a [`RunSpec`] strictly in order and joins the
//! outputs. The first non-zero exit aborts the step; nothing after it runs.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{HarnessError, HarnessResult};
use crate::scenario::RunSpec;

/// Captured result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub success: bool,
    /// Human-readable exit status, e.g. `exit status: 1`.
    pub status: String,
    /// Standard output and standard error, interleaved.
    pub output: String,
}

/// Run the target program once with the given arguments.
pub trait ProgramRunner {
    /// Command line shown in logs and error messages.
    fn command_line(&self, args: &[String]) -> String;

    fn run(&self, args: &[String]) -> HarnessResult<RunOutput>;
}

/// Runs `<interpreter> <program> <args...>` as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interpreter: String,
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(interpreter: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            program: program.into(),
        }
    }
}

impl ProgramRunner for ProcessRunner {
    fn command_line(&self, args: &[String]) -> String {
        let mut parts = vec![self.interpreter.clone(), self.program.display().to_string()];
        parts.extend(args.iter().cloned());
        parts.join(" ")
    }

    fn run(&self, args: &[String]) -> HarnessResult<RunOutput> {
        let command = self.command_line(args);
        let spawn_err = |source| HarnessError::Spawn {
            command: command.clone(),
            source,
        };

        // One pipe for both streams keeps their interleaving intact.
        let (mut reader, writer) = std::io::pipe().map_err(spawn_err)?;
        let writer_err = writer.try_clone().map_err(spawn_err)?;

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err);
        let mut child = cmd.spawn().map_err(spawn_err)?;
        // The command still holds the write ends; drop them so EOF arrives.
        drop(cmd);

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw).map_err(spawn_err)?;
        let status = child.wait().map_err(spawn_err)?;

        Ok(RunOutput {
            success: status.success(),
            status: status.to_string(),
            output: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}

/// Executes run specs against a [`ProgramRunner`].
pub struct Executor<R: ProgramRunner> {
    runner: R,
}

impl<R: ProgramRunner> Executor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run all repetitions of `spec` and return the joined output along with
    /// the command line of the last invocation.
    pub fn execute(&self, spec: &RunSpec) -> HarnessResult<(String, String)> {
        let mut outputs = Vec::with_capacity(spec.count as usize);
        let mut last_command = self.runner.command_line(&spec.args_for(1));

        for iteration in 1..=spec.count {
            let args = spec.args_for(iteration);
            let command = self.runner.command_line(&args);
            tracing::info!("Running test iteration {}: {}", iteration, command);

            let run = self.runner.run(&args)?;
            if !run.success {
                tracing::error!("Command returned non-zero exit status ({}): {}", run.status, command);
                return Err(HarnessError::InvocationFailure {
                    command,
                    status: run.status,
                    output: run.output,
                });
            }

            if !run.output.is_empty() {
                outputs.push(run.output.trim().to_string());
            }
            last_command = command;
        }

        Ok((join_outputs(&outputs), last_command))
    }
}

/// Join already-trimmed outputs with newlines and trim the result.
pub fn join_outputs(outputs: &[String]) -> String {
    outputs.join("\n").trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scenario::ArgToken;
    use std::cell::RefCell;

    /// Runner that echoes its arguments and fails on a chosen invocation.
    struct ScriptedRunner {
        calls: RefCell<Vec<Vec<String>>>,
        fail_on: Option<usize>,
    }

    impl ScriptedRunner {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on,
            }
        }
    }

    impl ProgramRunner for ScriptedRunner {
        fn command_line(&self, args: &[String]) -> String {
            format!("calc {}", args.join(" ")).trim_end().to_string()
        }

        fn run(&self, args: &[String]) -> HarnessResult<RunOutput> {
            let mut calls = self.calls.borrow_mut();
            calls.push(args.to_vec());
            let failed = self.fail_on == Some(calls.len());
            Ok(RunOutput {
                success: !failed,
                status: if failed { "exit status: 1".into() } else { "exit status: 0".into() },
                output: format!("  args: {}\n", args.join(" ")),
            })
        }
    }

    fn seeded_spec(count: u32) -> RunSpec {
        RunSpec {
            fixture: "expected-results-63-all-seeds.txt".to_string(),
            args: vec![ArgToken::Literal("--debug"), ArgToken::SeedIteration],
            count,
        }
    }

    #[test]
    fn test_seeds_increase_in_order() {
        let executor = Executor::new(ScriptedRunner::new(None));
        let (output, last) = executor.execute(&seeded_spec(100)).unwrap();

        let calls = executor.runner().calls.borrow();
        assert_eq!(calls.len(), 100);
        for (i, args) in calls.iter().enumerate() {
            assert_eq!(args, &vec!["--debug".to_string(), "--seed".to_string(), (i + 1).to_string()]);
        }
        assert!(output.starts_with("args: --debug --seed 1\nargs: --debug --seed 2\n"));
        assert!(output.ends_with("args: --debug --seed 100"));
        assert_eq!(last, "calc --debug --seed 100");
    }

    #[test]
    fn test_failure_stops_remaining_iterations() {
        let executor = Executor::new(ScriptedRunner::new(Some(3)));
        let err = executor.execute(&seeded_spec(100)).unwrap_err();

        assert_eq!(executor.runner().calls.borrow().len(), 3);
        match err {
            HarnessError::InvocationFailure { command, .. } => assert_eq!(command, "calc --debug --seed 3"),
            other => panic!("expected invocation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_join_trims_each_and_all() {
        let outputs = vec!["a".to_string(), "b".to_string(), "".to_string()];
        assert_eq!(join_outputs(&outputs), "a\nb");
    }

    #[test]
    fn test_process_runner_combines_streams() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("calc.sh");
        std::fs::write(&script, "echo one\necho two 1>&2\necho three\n").unwrap();

        let runner = ProcessRunner::new("sh", &script);
        let run = runner.run(&[]).unwrap();
        assert!(run.success);
        assert_eq!(run.output, "one\ntwo\nthree\n");
    }

    #[test]
    fn test_process_runner_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("calc.sh");
        std::fs::write(&script, "echo \"args: $*\"\nexit 4\n").unwrap();

        let runner = ProcessRunner::new("sh", &script);
        let run = runner.run(&["--debug".to_string()]).unwrap();
        assert!(!run.success);
        assert_eq!(run.output, "args: --debug\n");
        assert!(run.status.contains('4'));
    }

    #[test]
    fn test_process_runner_missing_interpreter() {
        let runner = ProcessRunner::new("definitely-not-an-interpreter-xyz", "calculator.py");
        assert!(matches!(runner.run(&[]), Err(HarnessError::Spawn { .. })));
    }
}
