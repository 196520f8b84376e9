#![forbid(unsafe_code)]
//! Calculator grading harness
//!
//! Grades successive versions of a small "random calculator" exercise without
//! being told which version it is looking at:
//!
//! 1. [`inspect`] probes the program source for functions and literals.
//! 2. [`capability`] turns the probes into six flags and a 6-bit mask.
//! 3. [`scenario`] maps the mask to one of a closed set of test plans.
//! 4. [`executor`] runs the program with each step's arguments.
//! 5. [`compare`] checks the joined output against a fixture.
//!
//! [`harness`] sequences these; [`cli`] is the command-line front end.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod capability;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod executor;
pub mod harness;
pub mod inspect;
pub mod report;
pub mod scenario;

pub use capability::{Capability, CapabilityFlags, CapabilityMask};
pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
pub use harness::{Detection, Harness, HarnessOutcome, Phase};
pub use scenario::{ArgToken, RunSpec, Scenario};
