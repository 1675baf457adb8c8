//! Parameters structure for StateFilt

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the state filter.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Exponential filter coefficient.
    ///
    /// Must be in (0, 1). Small values reject more sensor noise at the cost
    /// of tracking real motion more slowly.
    ///
    /// Units: dimensionless
    pub alpha: f64,
}
