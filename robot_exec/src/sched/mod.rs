//! # Robot mode scheduler
//!
//! Runs the robot's main loop. Every cycle the scheduler observes the mode demanded by the control
//! system and dispatches to the robot's hooks:
//!
//! - On a change of mode the new mode's init hook is called, exactly once.
//! - The mode's periodic hook is called whenever a new control packet has arrived, and on
//!   every cycle in autonomous.
//! - In teleop the input listeners are ticked just before the periodic hook.
//! - In autonomous the selected program is started on entry and the command runner is
//!   advanced every cycle, before the periodic hook.
//! - Leaving autonomous cancels its commands and rebuilds the auto programs before the new
//!   mode's init hook.
//! - Outside of autonomous the scheduler blocks until the next control packet arrives.
//!
//! A dashboard task runs alongside the scheduler on its own thread.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chooser;
mod dashboard;
mod snapshot;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};

// Internal
use robot_if::{ControlSystem, ListenerManager, RobotMode};
use crate::command::CommandScheduler;
pub use chooser::AutoChooser;
pub use dashboard::DashboardTask;
pub use snapshot::SnapshotCell;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Exit status of the process when the robot fails to start.
pub const FATAL_EXIT_CODE: i32 = 7;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Error type returned by robot construction hooks.
pub type RobotError = Box<dyn std::error::Error + Send + Sync>;

/// A robot program, the hooks called by the [`ModeScheduler`].
///
/// Only the construction hooks are required, the mode hooks default to
/// doing nothing.
pub trait Robot {
    /// Build the robot's hardware. Failure here is fatal.
    fn construct_hardware(&mut self) -> Result<(), RobotError>;

    /// Build the operator input listeners. Failure here is fatal.
    fn setup_listeners(&mut self) -> Result<Vec<Box<dyn ListenerManager>>, RobotError>;

    /// Add the available autonomous programs to the chooser.
    ///
    /// Called at start-up and again whenever the robot leaves autonomous,
    /// as programs are consumed when they run.
    fn construct_auto_programs(&mut self, chooser: &mut AutoChooser);

    /// Build the function the dashboard task calls every period.
    fn dashboard_updater(&mut self) -> Option<Box<dyn FnMut() + Send>> {
        None
    }

    fn disabled_init(&mut self) {}
    fn disabled_periodic(&mut self) {}

    fn autonomous_init(&mut self) {}
    fn autonomous_periodic(&mut self) {}

    fn teleop_init(&mut self) {}
    fn teleop_periodic(&mut self) {}

    fn test_init(&mut self) {}
    fn test_periodic(&mut self) {}
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Scheduler tuning.
#[derive(Debug, Clone)]
pub struct SchedConfig {
    /// Minimum period of autonomous cycles, which don't wait for control packets
    pub cycle_period: Duration,

    pub dashboard_period: Duration,

    /// Time given to the log to flush before exiting after a fatal error
    pub fail_grace_period: Duration,

    /// Autonomous program to select after the programs are built, `None`
    /// runs the chooser's default.
    pub auto_program: Option<String>,
}

/// Runs a [`Robot`] against a [`ControlSystem`].
pub struct ModeScheduler<R, C> {
    robot: R,
    control: C,
    config: SchedConfig,

    listeners: Vec<Box<dyn ListenerManager>>,
    chooser: AutoChooser,
    commands: CommandScheduler,
    dashboard: Option<DashboardTask>,

    /// Mode whose init hook was last run, `None` before the first cycle
    current_mode: Option<RobotMode>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SchedError {
    #[error("Failed to construct the robot hardware: {0}")]
    HardwareConstruction(RobotError),

    #[error("Failed to set up the input listeners: {0}")]
    ListenerSetup(RobotError),

    #[error("Failed to spawn the dashboard task: {0}")]
    DashboardSpawn(std::io::Error),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Start the robot and run it until the control system asks for shutdown.
///
/// If the robot fails to start the error is logged, the log is given
/// `fail_grace_period` to flush, and the process exits with
/// [`FATAL_EXIT_CODE`].
pub fn run_robot<R: Robot, C: ControlSystem>(robot: R, control: C, config: SchedConfig) {
    let grace = config.fail_grace_period;
    let mut sched = ModeScheduler::new(robot, control, config);

    if let Err(e) = sched.start() {
        std::process::exit(handle_start_failure(&e, grace));
    }

    sched.run();
}

/// Exit status of the process for a start-up failure.
pub fn fatal_status(err: &SchedError) -> i32 {
    match err {
        SchedError::HardwareConstruction(_)
        | SchedError::ListenerSetup(_)
        | SchedError::DashboardSpawn(_) => FATAL_EXIT_CODE,
    }
}

/// Log a start-up failure and give the log `grace` to flush. Returns the
/// status the process should exit with.
fn handle_start_failure(err: &SchedError, grace: Duration) -> i32 {
    error!("FATAL: {}", err);
    thread::sleep(grace);
    fatal_status(err)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<R: Robot, C: ControlSystem> ModeScheduler<R, C> {
    pub fn new(robot: R, control: C, config: SchedConfig) -> Self {
        Self {
            robot,
            control,
            config,
            listeners: vec![],
            chooser: AutoChooser::new(),
            commands: CommandScheduler::new(),
            dashboard: None,
            current_mode: None,
        }
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn current_mode(&self) -> Option<RobotMode> {
        self.current_mode
    }

    pub fn commands(&self) -> &CommandScheduler {
        &self.commands
    }

    pub fn chooser(&self) -> &AutoChooser {
        &self.chooser
    }

    /// Construct the robot and start the dashboard task.
    pub fn start(&mut self) -> Result<(), SchedError> {
        info!("Constructing robot hardware");
        self.robot.construct_hardware()
            .map_err(SchedError::HardwareConstruction)?;

        self.listeners = self.robot.setup_listeners()
            .map_err(SchedError::ListenerSetup)?;
        info!("{} listener manager(s) set up", self.listeners.len());

        self.build_auto_programs();

        if let Some(update) = self.robot.dashboard_updater() {
            self.dashboard = Some(
                DashboardTask::spawn(self.config.dashboard_period, update)
                    .map_err(SchedError::DashboardSpawn)?
            );
            info!("Dashboard task started");
        }

        Ok(())
    }

    /// Run cycles until the control system asks for shutdown, then stop
    /// everything.
    pub fn run(&mut self) {
        info!("Beginning main loop\n");

        while !self.control.is_shutdown_requested() {
            let cycle_start = Instant::now();

            self.step();

            // Autonomous cycles don't wait for packets, so pace them
            if self.current_mode == Some(RobotMode::Autonomous) {
                if let Some(sleep) = self.config.cycle_period.checked_sub(cycle_start.elapsed()) {
                    thread::sleep(sleep);
                }
            }
        }

        info!("Shutdown requested, stopping");
        self.commands.cancel_all();

        if let Some(d) = self.dashboard.take() {
            d.stop();
        }
    }

    /// Run one cycle.
    pub fn step(&mut self) {
        let mode = self.control.mode();

        if self.current_mode != Some(mode) {
            self.enter_mode(mode);
        }

        if mode == RobotMode::Autonomous {
            self.commands.run();
            self.periodic(mode);
        }
        else {
            if self.control.is_new_control_data() {
                self.periodic(mode);
            }
            self.control.wait_for_data();
        }
    }

    fn enter_mode(&mut self, mode: RobotMode) {
        let previous = self.current_mode.replace(mode);

        match previous {
            Some(p) => info!("Mode change: {} -> {}", p, mode),
            None => info!("Starting in {} mode", mode),
        }

        // Nothing started in autonomous may outlive it, and the program it
        // ran has been consumed
        if previous == Some(RobotMode::Autonomous) {
            self.commands.cancel_all();
            self.build_auto_programs();
        }

        match mode {
            RobotMode::Disabled => self.robot.disabled_init(),
            RobotMode::Autonomous => {
                self.robot.autonomous_init();

                match self.chooser.take_selected() {
                    Some((name, program)) => {
                        info!("Running auto program \"{}\"", name);
                        self.commands.start(program);
                    },
                    None => warn!("No auto program selected, idling")
                }
            },
            RobotMode::Teleop => {
                self.robot.teleop_init();

                for l in self.listeners.iter_mut() {
                    if let Err(e) = l.recount_controls() {
                        warn!("Keeping previous control counts: {}", e);
                    }
                }
            },
            RobotMode::Test => self.robot.test_init(),
        }
    }

    fn periodic(&mut self, mode: RobotMode) {
        match mode {
            RobotMode::Disabled => self.robot.disabled_periodic(),
            RobotMode::Autonomous => self.robot.autonomous_periodic(),
            RobotMode::Teleop => {
                for l in self.listeners.iter_mut() {
                    l.tick();
                }
                self.robot.teleop_periodic();
            },
            RobotMode::Test => self.robot.test_periodic(),
        }
    }

    fn build_auto_programs(&mut self) {
        self.chooser.clear();
        self.robot.construct_auto_programs(&mut self.chooser);

        if let Some(name) = self.config.auto_program.as_ref() {
            self.chooser.select(name);
        }

        debug!(
            "{} auto program(s), selected {:?}",
            self.chooser.len(),
            self.chooser.selected_name()
        );
    }
}
