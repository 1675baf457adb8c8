//! Implementations for the StateFilt state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, StateFiltError, StateFiltInitError};
use hw_if::arm::NUM_ARM_JOINTS;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State filter module state
#[derive(Default)]
pub struct StateFilt {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// Filtered joint velocity carried across cycles, the filter's only
    /// persistent state. `None` until the first velocity is observed.
    rate_filt_rads: Option<[f64; NUM_ARM_JOINTS]>,
}

/// Input data to the state filter.
#[derive(Clone, Copy, Default)]
pub struct InputData {
    /// Raw joint velocities reported by the arm server this cycle.
    ///
    /// Units: radians/second
    pub rate_rads: [f64; NUM_ARM_JOINTS],

    /// Time elapsed since the previous cycle.
    ///
    /// Units: seconds
    pub period_s: f64,
}

/// Output data from the state filter.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// Filtered joint velocities.
    ///
    /// Units: radians/second
    pub rate_filt_rads: [f64; NUM_ARM_JOINTS],

    /// Estimated joint accelerations, from the finite difference of
    /// consecutive filtered velocities.
    ///
    /// Units: radians/second^2
    pub accel_est_radss: [f64; NUM_ARM_JOINTS],
}

/// Status report for StateFilt processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the filter was seeded from the raw velocity this cycle.
    pub seeded: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            rate_filt_rads: [0.0; NUM_ARM_JOINTS],
            accel_est_radss: [0.0; NUM_ARM_JOINTS],
        }
    }
}

impl State for StateFilt {
    type InitData = &'static str;
    type InitError = StateFiltInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = StateFiltError;

    /// Initialise the StateFilt module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = params::load(init_data)?;

        if self.params.alpha <= 0.0 || self.params.alpha >= 1.0 {
            return Err(StateFiltInitError::InvalidFilterCoeff(self.params.alpha));
        }

        Ok(())
    }

    /// Perform cyclic processing of the state filter.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // If the filter has never seen a velocity seed it with the raw input,
        // which makes the first filtered value equal to the raw one and the
        // first acceleration estimate zero.
        let rate_prev_rads = match self.rate_filt_rads {
            Some(r) => r,
            None => {
                self.report.seeded = true;
                input_data.rate_rads
            }
        };

        let alpha = self.params.alpha;
        let mut rate_filt_rads = [0.0; NUM_ARM_JOINTS];
        let mut accel_est_radss = [0.0; NUM_ARM_JOINTS];

        for i in 0..NUM_ARM_JOINTS {
            rate_filt_rads[i] =
                (1.0 - alpha) * rate_prev_rads[i] + alpha * input_data.rate_rads[i];
        }

        // A non-positive period leaves the acceleration estimate at zero
        // rather than dividing by it
        if input_data.period_s > 0.0 {
            for i in 0..NUM_ARM_JOINTS {
                accel_est_radss[i] =
                    (rate_filt_rads[i] - rate_prev_rads[i]) / input_data.period_s;
            }
        }

        // Update the persistent filter state
        self.rate_filt_rads = Some(rate_filt_rads);

        Ok((
            OutputData {
                rate_filt_rads,
                accel_est_radss,
            },
            self.report,
        ))
    }
}

impl StateFilt {
    /// Seed the filter with a velocity observed outside cyclic processing,
    /// for example the initial joint state read during initialisation.
    pub fn seed(&mut self, rate_rads: [f64; NUM_ARM_JOINTS]) {
        self.rate_filt_rads = Some(rate_rads);
    }
}
