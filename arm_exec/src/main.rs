//! Main arm controller executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop (fixed period, nominally 1 kHz):
//!         - Joint state acquisition from the arm server
//!         - State filter processing
//!         - Manipulability controller processing
//!         - Demand emission to the arm server
//!
//! # Modules
//!
//! All control modules (e.g. `mani_ctrl`) shall meet the following
//! requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{
    arm_client::{ArmClient, ArmClientError},
    data_store::{DataStore, ExecMode, StopCause},
    mani_ctrl, params::ArmExecParams, state_filt, CYCLE_FREQUENCY_HZ, CYCLE_PERIOD_S,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use hw_if::{
    arm::{ArmDems, ArmDemsResponse},
    net::NetParams,
};
use log::{error, info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Limit on the number of consecutive demand send errors before the
/// controller stops fatally.
const MAX_DEMS_SEND_ERROR_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Manipulability Arm Controller\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let exec_params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load exec params")?;

    // The joint name list fixes the joint indexing for every module, so it
    // must be right before anything else runs
    exec_params
        .validate()
        .wrap_err("Invalid exec params")?;

    info!("Exec parameters loaded, controlling arm \"{}\"", exec_params.arm_id);

    // Keep a record of the parameters used for this run
    session.save("arm_exec_params.json", &exec_params);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.state_filt
        .init("state_filt.toml", &session)
        .wrap_err("Failed to initialise StateFilt")?;
    info!("StateFilt init complete");

    ds.mani_ctrl
        .init("mani_ctrl.toml", &session)
        .wrap_err("Failed to initialise ManiCtrl")?;
    info!("ManiCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = hw_if::net::zmq::Context::new();

    let mut arm_client = ArmClient::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise the ArmClient")?;
    info!("ArmClient initialised");

    // ---- ACQUIRE INITIAL STATE ----

    // Read the joint state once before the loop starts so the velocity
    // filter is seeded with a real velocity rather than zero
    let initial_state = arm_client
        .get_joint_state()
        .wrap_err("Could not get the initial joint state")?;
    ds.state_filt.seed(initial_state.rate_rads);

    info!("Initial joint state acquired");

    // ---- STOP REQUEST HANDLER ----

    let stop_request = Arc::new(AtomicBool::new(false));
    let stop_request_flag = stop_request.clone();

    ctrlc::set_handler(move || stop_request_flag.store(true, Ordering::SeqCst))
        .wrap_err("Failed to set the stop request handler")?;

    // ---- MAIN LOOP ----

    ds.set_running();

    info!("Begining main loop\n");

    let mut prev_cycle_start: Option<Instant> = None;

    while ds.mode == ExecMode::Running {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Time since the previous cycle started, used as the period for the
        // filter and constraint calculations. Nominal on the first cycle.
        let period_s = match prev_cycle_start {
            Some(t) => cycle_start_instant.duration_since(t).as_secs_f64(),
            None => CYCLE_PERIOD_S,
        };
        prev_cycle_start = Some(cycle_start_instant);

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DATA INPUT ----

        // The state source must never fail once running, losing it means the
        // controller no longer knows what the arm is doing
        let joint_state = match arm_client.get_joint_state() {
            Ok(s) => s,
            Err(e) => {
                error!("Lost the arm state source: {}", e);
                ds.stop(StopCause::StateSourceLost);
                break;
            }
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        // StateFilt processing
        ds.state_filt_input = state_filt::InputData {
            rate_rads: joint_state.rate_rads,
            period_s,
        };
        match ds.state_filt.proc(&ds.state_filt_input) {
            Ok((o, r)) => {
                ds.state_filt_output = o;
                ds.state_filt_status_rpt = r;
            }
            Err(e) => warn!("Error during StateFilt processing: {}", e),
        }

        // ManiCtrl processing
        ds.mani_ctrl_input = mani_ctrl::InputData {
            pos_rad: joint_state.pos_rad,
            rate_filt_rads: ds.state_filt_output.rate_filt_rads,
            period_s,
        };
        let mut dems = match ds.mani_ctrl.proc(&ds.mani_ctrl_input) {
            Ok((o, r)) => {
                ds.mani_ctrl_output = o;
                ds.mani_ctrl_status_rpt = r;
                Some(ArmDems::from_rates(
                    &exec_params.joint_names,
                    &o.rate_dems_rads,
                ))
            }
            Err(e) => {
                // No fresh demands this cycle, fall through to the hold below
                warn!("Error during ManiCtrl processing: {}", e);
                None
            }
        };

        // ---- DEADLINE CHECK ----

        // If the pipeline overran the cycle budget the computed demands are
        // based on stale state, emit the previous demands (hold) instead
        let mut overrun_this_cycle = false;
        let pipeline_dur_s = cycle_start_instant.elapsed().as_secs_f64();
        if pipeline_dur_s > CYCLE_PERIOD_S {
            warn!(
                "Cycle overran by {:.06} s before emission, holding previous demands",
                pipeline_dur_s - CYCLE_PERIOD_S
            );
            ds.num_consec_cycle_overruns += 1;
            overrun_this_cycle = true;
            dems = None;
        }

        // ---- DEMAND EMISSION ----

        let dems_to_send = match dems {
            Some(d) => Some(d),
            // Hold: re-emit the previous demands if there are any
            None => ds.last_dems.clone(),
        };

        match dems_to_send {
            Some(d) => {
                match arm_client.send_demands(&d) {
                    Ok(ArmDemsResponse::DemsOk) => {
                        ds.num_consec_dems_send_errors = 0;
                    }
                    Ok(r) => warn!("Received non-nominal response from the arm server: {:?}", r),
                    Err(ArmClientError::NotConnected) => {
                        ds.num_consec_dems_send_errors += 1;
                        warn!("Arm server not connected, demands not emitted");
                    }
                    Err(e) => {
                        ds.num_consec_dems_send_errors += 1;
                        warn!("Could not send demands to the arm server: {}", e);
                    }
                }

                // If the sink keeps failing the arm can no longer be
                // commanded at all, stop fatally
                if ds.num_consec_dems_send_errors > MAX_DEMS_SEND_ERROR_LIMIT {
                    error!(
                        "Maximum number of consecutive demand send errors ({}) \
                         has been exceeded",
                        MAX_DEMS_SEND_ERROR_LIMIT
                    );
                    ds.stop(StopCause::DemsSinkLost);
                    break;
                }

                ds.last_dems = Some(d);
            }
            None => warn!("No demands available this cycle, none emitted"),
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            info!(
                "Manipulability: {:.06}",
                ds.mani_ctrl_status_rpt.manipulability
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                if !overrun_this_cycle {
                    warn!(
                        "Cycle overran by {:.06} s during emission",
                        cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                    );
                    ds.num_consec_cycle_overruns += 1;
                }
            }
        }

        // A stop request is only honoured once the cycle has run to
        // completion, preserving demand-stream continuity for the arm server
        if stop_request.load(Ordering::SeqCst) {
            info!("Stop requested");
            ds.stop(StopCause::StopRequest);
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // No zero-velocity demand is sent on stop. A jump to zero while in
    // motion would put high loads on the robot, the arm server's built-in
    // stopping behaviour ramps the joints down instead.

    info!("Executed {} cycles", ds.num_cycles);

    match ds.stop_cause {
        Some(StopCause::StateSourceLost) => {
            Err(eyre!("Stopped: the arm state source was lost mid-operation"))
        }
        Some(StopCause::DemsSinkLost) => {
            Err(eyre!("Stopped: the arm demand sink was lost mid-operation"))
        }
        _ => {
            info!("End of execution");
            Ok(())
        }
    }
}
