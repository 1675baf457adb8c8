//! State filter module
//!
//! Exponentially smooths the raw joint velocities reported by the arm server
//! and estimates joint accelerations by differencing consecutive filtered
//! velocities.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during StateFilt initialisation.
#[derive(Debug, thiserror::Error)]
pub enum StateFiltInitError {
    #[error("Could not load the parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Filter coefficient must be in (0, 1), got {0}")]
    InvalidFilterCoeff(f64),
}

/// Possible errors that can occur during StateFilt processing.
///
/// Filtering has no failure modes, so this enum has no variants.
#[derive(Debug, thiserror::Error)]
pub enum StateFiltError {}
