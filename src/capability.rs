//! Capability detection
//!
//! Six independent facts about a target program, each built from source
//! inspector probes, packed into a 6-bit mask that keys the scenario table.

use std::fmt;
use std::path::Path;

use crate::error::HarnessResult;
use crate::inspect::{ModuleLoader, SourceInspector};

pub const ORIGINAL_FUNCTIONS: [&str; 3] = ["add", "subtract", "main"];
pub const DIVMUL_FUNCTIONS: [&str; 2] = ["divide", "multiply"];
pub const ADD_THEN_SUBTRACT: &str = "Adding then subtracting!";
pub const SUBTRACT_THEN_ADD: &str = "Subtracting then adding!";
pub const LOGGING_IMPORT: &str = "import logging";
pub const LOGGING_INIT: &str = "logging.basicConfig";
pub const CLI_IMPORT: &str = "import argparse";
pub const DEBUG_FLAG: &str = "--debug";
pub const SEED_FLAG: &str = "--seed";

/// One detectable capability, in bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Original,
    DivMul,
    AddSub,
    Logging,
    DebugFlag,
    SeedFlag,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Original,
        Capability::DivMul,
        Capability::AddSub,
        Capability::Logging,
        Capability::DebugFlag,
        Capability::SeedFlag,
    ];

    /// Weight of this capability in the mask: 1, 2, 4, 8, 16, 32.
    pub fn weight(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::Original => "original",
            Capability::DivMul => "divmul",
            Capability::AddSub => "addsub",
            Capability::Logging => "logging",
            Capability::DebugFlag => "debug_flag",
            Capability::SeedFlag => "seed_flag",
        }
    }
}

/// The six detected flags. Computed once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityFlags {
    pub has_original: bool,
    pub has_divmul: bool,
    pub has_addsub: bool,
    pub has_logging: bool,
    pub has_debug_flag: bool,
    pub has_seed_flag: bool,
}

impl CapabilityFlags {
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::Original => self.has_original,
            Capability::DivMul => self.has_divmul,
            Capability::AddSub => self.has_addsub,
            Capability::Logging => self.has_logging,
            Capability::DebugFlag => self.has_debug_flag,
            Capability::SeedFlag => self.has_seed_flag,
        }
    }

    /// Pack the flags: `Σ flag_i * weight_i`.
    pub fn mask(&self) -> CapabilityMask {
        let bits = Capability::ALL
            .iter()
            .filter(|c| self.get(**c))
            .map(|c| c.weight())
            .sum();
        CapabilityMask(bits)
    }

    /// Inverse of [`CapabilityFlags::mask`] for masks in `0..64`.
    pub fn from_mask(mask: CapabilityMask) -> Self {
        let has = |c: Capability| mask.0 & c.weight() != 0;
        Self {
            has_original: has(Capability::Original),
            has_divmul: has(Capability::DivMul),
            has_addsub: has(Capability::AddSub),
            has_logging: has(Capability::Logging),
            has_debug_flag: has(Capability::DebugFlag),
            has_seed_flag: has(Capability::SeedFlag),
        }
    }

    /// Names of the capabilities that are present, in bit order.
    pub fn present(&self) -> Vec<&'static str> {
        Capability::ALL
            .iter()
            .filter(|c| self.get(**c))
            .map(|c| c.name())
            .collect()
    }
}

/// Packed capability flags; the scenario lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityMask(pub u8);

impl CapabilityMask {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for CapabilityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run every probe against `path` and collect the flags.
///
/// Probes within a flag stop at the first miss. Each flag does its own
/// probing; shared markers such as the CLI import are simply checked again
/// (the inspector's source cache makes that cheap).
pub fn detect<L: ModuleLoader>(inspector: &mut SourceInspector<L>, path: &Path) -> HarnessResult<CapabilityFlags> {
    let has_original = ORIGINAL_FUNCTIONS.iter().all(|f| inspector.has_function(path, f));
    let has_divmul = DIVMUL_FUNCTIONS.iter().all(|f| inspector.has_function(path, f));

    let has_addsub = all_literals(inspector, path, &[ADD_THEN_SUBTRACT, SUBTRACT_THEN_ADD])?;
    let has_logging = all_literals(inspector, path, &[LOGGING_IMPORT, LOGGING_INIT])?;
    let has_debug_flag = all_literals(inspector, path, &[CLI_IMPORT, DEBUG_FLAG])?;
    let has_seed_flag = all_literals(inspector, path, &[CLI_IMPORT, SEED_FLAG])?;

    Ok(CapabilityFlags {
        has_original,
        has_divmul,
        has_addsub,
        has_logging,
        has_debug_flag,
        has_seed_flag,
    })
}

fn all_literals<L: ModuleLoader>(
    inspector: &mut SourceInspector<L>,
    path: &Path,
    literals: &[&str],
) -> HarnessResult<bool> {
    for literal in literals {
        if !inspector.has_literal(path, literal)? {
            return Ok(false);
        }
    }
    Ok(true)
}
