//! Reporting
//!
//! The harness drives a [`HarnessReporter`] so the presentation of a run is
//! separate from its logic. [`ConsoleReporter`] writes log lines;
//! [`JsonReporter`] emits one JSON document when the run finishes.

use serde_json::{Value, json};

use crate::capability::{CapabilityFlags, CapabilityMask};
use crate::error::HarnessError;
use crate::scenario::{RunSpec, Scenario};

/// Trait for reporting harness progress and results.
pub trait HarnessReporter {
    /// Called once the capability flags are known
    fn on_detected(&mut self, flags: &CapabilityFlags, mask: CapabilityMask);

    /// Called after the mask lookup; `None` means unrecognized
    fn on_resolved(&mut self, _scenario: Option<&Scenario>) {}

    /// Called before a step's first invocation
    fn on_step_start(&mut self, _index: usize, _spec: &RunSpec) {}

    /// Called when a step's output matched its fixture
    fn on_step_passed(&mut self, index: usize, spec: &RunSpec);

    /// Called exactly once at the end of a run
    fn on_finished(&mut self, error: Option<&HarnessError>);
}

/// Log-line reporter.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl HarnessReporter for ConsoleReporter {
    fn on_detected(&mut self, flags: &CapabilityFlags, mask: CapabilityMask) {
        tracing::info!("Capabilities: {} (mask {})", flags.present().join(", "), mask);
    }

    fn on_resolved(&mut self, scenario: Option<&Scenario>) {
        if let Some(scenario) = scenario {
            tracing::info!("Scenario {}: {}", scenario.fixture_base(), scenario.description);
        }
    }

    fn on_step_passed(&mut self, index: usize, spec: &RunSpec) {
        tracing::info!("Step {} passed: {}", index + 1, spec.fixture);
    }

    fn on_finished(&mut self, error: Option<&HarnessError>) {
        match error {
            None => tracing::info!("SUCCESS!"),
            Some(HarnessError::UnrecognizedCapabilitySet { .. }) => {
                tracing::error!("Did not find a valid testing scenario -- fail")
            }
            Some(_) => tracing::error!("Test failure"),
        }
    }
}

/// Collects the run and prints it as JSON at the end.
#[derive(Debug, Default)]
pub struct JsonReporter {
    capabilities: Vec<&'static str>,
    mask: Option<u8>,
    scenario: Option<String>,
    steps: Vec<Value>,
    error: Option<Value>,
    finished: bool,
    quiet: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter that only collects; nothing is printed.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Value {
        let verdict = match (self.finished, &self.error) {
            (false, _) => "incomplete",
            (true, None) => "pass",
            (true, Some(_)) => "fail",
        };
        json!({
            "capabilities": self.capabilities,
            "mask": self.mask,
            "scenario": self.scenario,
            "steps": self.steps,
            "error": self.error,
            "verdict": verdict,
        })
    }
}

impl HarnessReporter for JsonReporter {
    fn on_detected(&mut self, flags: &CapabilityFlags, mask: CapabilityMask) {
        self.capabilities = flags.present();
        self.mask = Some(mask.value());
    }

    fn on_resolved(&mut self, scenario: Option<&Scenario>) {
        self.scenario = scenario.map(Scenario::fixture_base);
    }

    fn on_step_passed(&mut self, _index: usize, spec: &RunSpec) {
        self.steps.push(json!({
            "fixture": spec.fixture,
            "runs": spec.count,
            "passed": true,
        }));
    }

    fn on_finished(&mut self, error: Option<&HarnessError>) {
        self.finished = true;
        self.error = error.map(|e| {
            let mut value = json!({
                "kind": e.kind(),
                "message": e.to_string(),
            });
            match e {
                HarnessError::OutputMismatch { report, .. } => value["report"] = json!(report),
                HarnessError::InvocationFailure { output, .. } => value["output"] = json!(output),
                _ => {}
            }
            value
        });
        if !self.quiet {
            match serde_json::to_string_pretty(&self.to_json()) {
                Ok(doc) => println!("{}", doc),
                Err(e) => tracing::error!("failed to render JSON report: {}", e),
            }
        }
    }
}
