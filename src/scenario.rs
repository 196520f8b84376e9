//! Scenario table
//!
//! A closed mapping from capability mask to test plan. Only the masks listed in
//! [`SCENARIOS`] are gradable; every other value in `0..64` is unrecognized.
//! Nothing here is inferred from the individual bits.

use crate::capability::CapabilityMask;

/// Repetitions of the seeded step.
pub const SEED_ITERATIONS: u32 = 100;

/// Prefix shared by every fixture file name.
pub const FIXTURE_PREFIX: &str = "expected-results";

/// How a scenario is exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One plain run.
    Single,
    /// Plain run, then a `--debug` run.
    Multi,
    /// Plain run, `--debug` run, then `--debug --seed <i>` for each iteration.
    MultiSeeded,
}

/// A named test plan selected by exactly one mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub mask: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub mode: RunMode,
}

pub static SCENARIOS: [Scenario; 9] = [
    Scenario {
        mask: 1,
        name: "original",
        description: "baseline add/subtract only",
        mode: RunMode::Single,
    },
    Scenario {
        mask: 3,
        name: "divmul",
        description: "baseline + divide/multiply",
        mode: RunMode::Single,
    },
    Scenario {
        mask: 5,
        name: "addsub",
        description: "baseline + combined add-then-subtract ops",
        mode: RunMode::Single,
    },
    Scenario {
        mask: 9,
        name: "logging",
        description: "baseline + logging",
        mode: RunMode::Single,
    },
    Scenario {
        mask: 25,
        name: "logging",
        description: "baseline + logging + debug flag",
        mode: RunMode::Multi,
    },
    Scenario {
        mask: 57,
        name: "seed",
        description: "baseline + logging + debug + seed flags",
        mode: RunMode::MultiSeeded,
    },
    Scenario {
        mask: 59,
        name: "divmul",
        description: "divide/multiply + logging + debug + seed flags",
        mode: RunMode::MultiSeeded,
    },
    Scenario {
        mask: 61,
        name: "addsub",
        description: "combined ops + logging + debug + seed flags",
        mode: RunMode::MultiSeeded,
    },
    Scenario {
        mask: 63,
        name: "all",
        description: "all capabilities present",
        mode: RunMode::MultiSeeded,
    },
];

/// Look up the scenario for a mask. `None` means unrecognized.
pub fn resolve(mask: CapabilityMask) -> Option<&'static Scenario> {
    let index = match mask.value() {
        1 => 0,
        3 => 1,
        5 => 2,
        9 => 3,
        25 => 4,
        57 => 5,
        59 => 6,
        61 => 7,
        63 => 8,
        _ => return None,
    };
    Some(&SCENARIOS[index])
}

/// One element of an argument template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgToken {
    Literal(&'static str),
    /// Expands to `--seed <i>` with the 1-based iteration index.
    SeedIteration,
}

/// One executable test step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub fixture: String,
    pub args: Vec<ArgToken>,
    pub count: u32,
}

impl RunSpec {
    /// Concrete argument list for the given 1-based iteration.
    pub fn args_for(&self, iteration: u32) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        for token in &self.args {
            match token {
                ArgToken::Literal(arg) => args.push((*arg).to_string()),
                ArgToken::SeedIteration => {
                    args.push("--seed".to_string());
                    args.push(iteration.to_string());
                }
            }
        }
        args
    }
}

impl Scenario {
    /// Fixture base name, e.g. `expected-results-63-all`.
    pub fn fixture_base(&self) -> String {
        format!("{}-{}-{}", FIXTURE_PREFIX, self.mask, self.name)
    }

    pub fn is_seeded(&self) -> bool {
        self.mode == RunMode::MultiSeeded
    }

    /// The ordered steps of this scenario.
    pub fn run_specs(&self) -> Vec<RunSpec> {
        let base = self.fixture_base();
        let mut specs = vec![RunSpec {
            fixture: format!("{base}.txt"),
            args: Vec::new(),
            count: 1,
        }];
        if self.mode == RunMode::Single {
            return specs;
        }

        specs.push(RunSpec {
            fixture: format!("{base}-debug.txt"),
            args: vec![ArgToken::Literal("--debug")],
            count: 1,
        });
        if self.is_seeded() {
            specs.push(RunSpec {
                fixture: format!("{base}-seeds.txt"),
                args: vec![ArgToken::Literal("--debug"), ArgToken::SeedIteration],
                count: SEED_ITERATIONS,
            });
        }
        specs
    }
}
