//! Module loaders for function-presence probes
//!
//! A loader answers one question: after loading the target program as a
//! module, does it expose a callable with the given name? Loading may run the
//! program's top-level statements, so each probe gets a fresh, disposable
//! evaluation context.

use std::path::Path;
use std::process::{Command, Stdio};

/// Result of one load-and-lookup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The module loaded and the name is defined.
    Found,
    /// The module loaded but the name is not defined.
    Missing,
    /// The module could not be loaded at all.
    LoadFailed(String),
}

/// Load a program as a module and look up a name in it.
pub trait ModuleLoader {
    fn probe(&self, path: &Path, name: &str) -> ProbeOutcome;
}

/// Exit status of the probe when the name is defined.
const PROBE_FOUND: i32 = 10;
/// Exit status of the probe when the module loaded but lacks the name.
const PROBE_MISSING: i32 = 11;

/// Probe script handed to the interpreter with `-c`.
///
/// argv: `<path> <module name> <function name>`. The answer travels on exit
/// statuses Python never produces by itself, so an uncaught exception or a
/// top-level `sys.exit()` in the target can only ever read as a load failure.
/// `os._exit` skips any atexit hooks the target registered.
const PYTHON_PROBE: &str = "\
import importlib.util
import os
import sys
path, module_name, function_name = sys.argv[1], sys.argv[2], sys.argv[3]
try:
    spec = importlib.util.spec_from_file_location(module_name, path)
    if spec is None or spec.loader is None:
        raise ImportError('cannot load ' + path)
    module = importlib.util.module_from_spec(spec)
    spec.loader.exec_module(module)
except BaseException as e:
    sys.stderr.write('%s: %s\\n' % (type(e).__name__, e))
    sys.stderr.flush()
    os._exit(12)
os._exit(10 if hasattr(module, function_name) else 11)
";

/// Loads Python programs in a separate interpreter process per probe.
#[derive(Debug, Clone)]
pub struct PythonModuleLoader {
    interpreter: String,
}

impl PythonModuleLoader {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl ModuleLoader for PythonModuleLoader {
    fn probe(&self, path: &Path, name: &str) -> ProbeOutcome {
        let module_name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("target");

        let output = match Command::new(&self.interpreter)
            .arg("-c")
            .arg(PYTHON_PROBE)
            .arg(path)
            .arg(module_name)
            .arg(name)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => return ProbeOutcome::LoadFailed(format!("failed to run {}: {}", self.interpreter, e)),
        };

        match output.status.code() {
            Some(PROBE_FOUND) => ProbeOutcome::Found,
            Some(PROBE_MISSING) => ProbeOutcome::Missing,
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = stderr.trim().lines().last().unwrap_or("").to_string();
                if reason.is_empty() {
                    ProbeOutcome::LoadFailed(format!("interpreter exited with {}", output.status))
                } else {
                    ProbeOutcome::LoadFailed(reason)
                }
            }
        }
    }
}
