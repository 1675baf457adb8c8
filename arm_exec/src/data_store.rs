//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use crate::{mani_ctrl, state_filt};
use hw_if::arm::ArmDems;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Execution mode of the controller.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ExecMode {
    /// Modules and hardware handles not yet initialised, no cyclic
    /// processing may run.
    Uninit,

    /// Cyclic processing is running and demands are being emitted.
    Running,

    /// Cyclic processing has ended, no further demands are emitted.
    Stopped,
}

/// Gives the reason the controller has stopped
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum StopCause {
    /// An external stop was requested.
    StopRequest,

    /// The arm state source failed mid-operation.
    StateSourceLost,

    /// The arm demand sink failed repeatedly mid-operation.
    DemsSinkLost,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Current execution mode
    pub mode: ExecMode,

    /// Reason for being in the `Stopped` mode.
    pub stop_cause: Option<StopCause>,

    // StateFilt
    pub state_filt: state_filt::StateFilt,
    pub state_filt_input: state_filt::InputData,
    pub state_filt_output: state_filt::OutputData,
    pub state_filt_status_rpt: state_filt::StatusReport,

    // ManiCtrl
    pub mani_ctrl: mani_ctrl::ManiCtrl,
    pub mani_ctrl_input: mani_ctrl::InputData,
    pub mani_ctrl_output: mani_ctrl::OutputData,
    pub mani_ctrl_status_rpt: mani_ctrl::StatusReport,

    /// The demands emitted on the previous cycle, re-emitted as a hold if a
    /// cycle cannot produce fresh demands in time.
    pub last_dems: Option<ArmDems>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive demand send errors
    pub num_consec_dems_send_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for DataStore {
    fn default() -> Self {
        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            mode: ExecMode::Uninit,
            stop_cause: None,
            state_filt: Default::default(),
            state_filt_input: Default::default(),
            state_filt_output: Default::default(),
            state_filt_status_rpt: Default::default(),
            mani_ctrl: Default::default(),
            mani_ctrl_input: Default::default(),
            mani_ctrl_output: Default::default(),
            mani_ctrl_status_rpt: Default::default(),
            last_dems: None,
            num_consec_cycle_overruns: 0,
            num_consec_dems_send_errors: 0,
        }
    }
}

impl DataStore {
    /// Transition into the `Running` mode once initialisation is complete.
    pub fn set_running(&mut self) {
        if self.mode == ExecMode::Uninit {
            self.mode = ExecMode::Running;
            info!("Controller running");
        } else {
            warn!("Cannot start running from the {:?} mode", self.mode);
        }
    }

    /// Transition into the `Stopped` mode with the given cause.
    ///
    /// Once stopped no further demands are emitted and the mode cannot be
    /// left.
    pub fn stop(&mut self, cause: StopCause) {
        if self.mode != ExecMode::Stopped {
            self.mode = ExecMode::Stopped;
            self.stop_cause = Some(cause);
            info!("Controller stopped, cause: {:?}", cause);
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and
    /// sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.state_filt_input = state_filt::InputData::default();
        self.state_filt_output = state_filt::OutputData::default();
        self.state_filt_status_rpt = state_filt::StatusReport::default();

        self.mani_ctrl_input = mani_ctrl::InputData::default();
        self.mani_ctrl_output = mani_ctrl::OutputData::default();
        self.mani_ctrl_status_rpt = mani_ctrl::StatusReport::default();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_transitions() {
        let mut ds = DataStore::default();
        assert_eq!(ds.mode, ExecMode::Uninit);

        ds.set_running();
        assert_eq!(ds.mode, ExecMode::Running);

        ds.stop(StopCause::StopRequest);
        assert_eq!(ds.mode, ExecMode::Stopped);
        assert_eq!(ds.stop_cause, Some(StopCause::StopRequest));

        // A second stop must not overwrite the original cause
        ds.stop(StopCause::StateSourceLost);
        assert_eq!(ds.stop_cause, Some(StopCause::StopRequest));

        // Stopped is terminal
        ds.set_running();
        assert_eq!(ds.mode, ExecMode::Stopped);
    }
}
