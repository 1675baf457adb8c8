//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software installation.
///
/// The root is read from the `MANI_SW_ROOT` environment variable, which must
/// point at the directory containing the `params` and `sessions` directories.
pub fn get_mani_sw_root() -> Result<PathBuf, env::VarError> {
    Ok(PathBuf::from(env::var("MANI_SW_ROOT")?))
}
