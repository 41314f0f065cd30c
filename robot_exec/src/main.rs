//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The executable runs the demonstration robot on simulated hardware:
//!
//!     - Initialise the session and logging
//!     - Load the executable and drive parameters
//!     - Load the mode script, which plays the part of the field control system
//!     - Run the mode scheduler until the script ends
//!
//! # Usage
//!
//! `robot_exec [MODE_SCRIPT]`
//!
//! If no mode script is given the one named in `robot_exec.toml` is used, relative to the
//! software root.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::env;
use std::path::PathBuf;
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use robot_lib::{
    demo::DemoRobot,
    drive::DriveParams,
    params::RobotExecParams,
    sched::run_robot,
    sim::ScriptedControlSystem,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new(
        "robot_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: RobotExecParams = util::params::load(
        "robot_exec.toml"
    ).wrap_err("Could not load exec params")?;
    exec_params.validate().wrap_err("Invalid exec params")?;

    let drive_params: DriveParams = util::params::load(
        "drive.toml"
    ).wrap_err("Could not load drive params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE CONTROL SYSTEM ----

    // Get the command line arguments
    let args: Vec<String> = env::args().collect();

    let script_path = match args.len() {
        1 => {
            let mut path = host::get_sw_root()
                .wrap_err("Could not find the software root")?;
            path.push(&exec_params.mode_script);
            path
        },
        2 => PathBuf::from(&args[1]),
        _ => return Err(eyre!(
            "Expected either zero or one argument, found {}", args.len() - 1
        ))
    };

    info!("Loading mode script from {:?}", script_path);

    let control = ScriptedControlSystem::from_path(
        &script_path,
        exec_params.control_packet_period()
    ).wrap_err("Failed to load the mode script")?;

    // ---- RUN ----

    let config = exec_params.sched_config();
    let robot = DemoRobot::new(drive_params, exec_params);

    run_robot(robot, control, config);

    info!("End of execution");

    Ok(())
}
