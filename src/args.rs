pub mod types;
pub mod validation;

use clap::Parser;

pub use types::{Args, CleanArgs};

/// Parses the command line and applies the cross-flag checks.
///
/// # Errors
///
/// Will return `Err` if the combination of flags is not usable
pub fn args_checks() -> Result<CleanArgs, String> {
    Args::parse().into_clean()
}
