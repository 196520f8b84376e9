//! Grading driver
//!
//! Sequences detection, scenario lookup, execution and comparison:
//!
//! ```text
//! DETECTING -> RESOLVING -> UNRECOGNIZED
//!                        -> RUNNING <-> COMPARING -> PASSED | FAILED
//! ```
//!
//! Steps run in the scenario's fixed order. The first failure of any kind ends
//! the run; there is no retry and no partial success.

use crate::capability::{self, CapabilityFlags, CapabilityMask};
use crate::compare;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::executor::{Executor, ProcessRunner, ProgramRunner};
use crate::inspect::{ModuleLoader, PythonModuleLoader, SourceInspector};
use crate::report::HarnessReporter;
use crate::scenario::{self, Scenario};

/// Where the driver currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Detecting,
    Resolving,
    Unrecognized,
    Running,
    Comparing,
    Passed,
    Failed,
}

/// Flags, mask and the scenario they select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub flags: CapabilityFlags,
    pub mask: CapabilityMask,
    pub scenario: Option<&'static Scenario>,
}

/// Summary of a passing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOutcome {
    pub mask: CapabilityMask,
    pub scenario: &'static Scenario,
    pub steps_passed: usize,
}

/// The grading harness for one target program.
pub struct Harness<L: ModuleLoader, R: ProgramRunner> {
    config: HarnessConfig,
    inspector: SourceInspector<L>,
    executor: Executor<R>,
    phase: Phase,
}

impl Harness<PythonModuleLoader, ProcessRunner> {
    /// Harness that probes and runs the target with the configured interpreter.
    pub fn from_config(config: HarnessConfig) -> Self {
        let loader = PythonModuleLoader::new(config.interpreter.clone());
        let runner = ProcessRunner::new(config.interpreter.clone(), config.program_path());
        Self::new(config, loader, runner)
    }
}

impl<L: ModuleLoader, R: ProgramRunner> Harness<L, R> {
    pub fn new(config: HarnessConfig, loader: L, runner: R) -> Self {
        Self {
            config,
            inspector: SourceInspector::new(loader),
            executor: Executor::new(runner),
            phase: Phase::Detecting,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!(from = ?self.phase, to = ?next, "harness transition");
        self.phase = next;
    }

    /// Detect capabilities and look up the scenario without running anything.
    pub fn detect(&mut self) -> HarnessResult<Detection> {
        self.transition(Phase::Detecting);
        let source = self.config.source.clone();
        let flags = capability::detect(&mut self.inspector, &source)?;
        let mask = flags.mask();
        tracing::info!("Testing case: {}", mask);

        self.transition(Phase::Resolving);
        let scenario = scenario::resolve(mask);
        if scenario.is_none() {
            self.transition(Phase::Unrecognized);
        }
        Ok(Detection { flags, mask, scenario })
    }

    /// Grade the target program, reporting progress to `reporter`.
    pub fn run(&mut self, reporter: &mut dyn HarnessReporter) -> HarnessResult<HarnessOutcome> {
        let result = self.run_steps(reporter);
        match &result {
            Ok(_) => self.transition(Phase::Passed),
            Err(HarnessError::UnrecognizedCapabilitySet { .. }) => {}
            Err(_) => self.transition(Phase::Failed),
        }
        reporter.on_finished(result.as_ref().err());
        result
    }

    fn run_steps(&mut self, reporter: &mut dyn HarnessReporter) -> HarnessResult<HarnessOutcome> {
        let detection = self.detect()?;
        reporter.on_detected(&detection.flags, detection.mask);
        reporter.on_resolved(detection.scenario);

        let Some(scenario) = detection.scenario else {
            return Err(HarnessError::UnrecognizedCapabilitySet {
                mask: detection.mask.value(),
            });
        };

        let specs = scenario.run_specs();
        for (index, spec) in specs.iter().enumerate() {
            self.transition(Phase::Running);
            reporter.on_step_start(index, spec);
            let (actual, command) = self.executor.execute(spec)?;

            self.transition(Phase::Comparing);
            let fixture = self.config.fixture_path(&spec.fixture);
            compare::check_fixture(&fixture, &actual, &command)?;
            reporter.on_step_passed(index, spec);
        }

        Ok(HarnessOutcome {
            mask: detection.mask,
            scenario,
            steps_passed: specs.len(),
        })
    }
}
