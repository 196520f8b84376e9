//! calc-grader entry point
//!
//! Logging is initialized by the CLI once the report format is known.

fn main() {
    calc_grader::cli::run();
}
