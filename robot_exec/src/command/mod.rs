//! # Command runner
//!
//! Autonomous programs are built from commands. A command is initialised once, then polled every
//! scheduler cycle until it reports finished, at which point it is ended. A command that is
//! cancelled before finishing is interrupted instead of ended.
//!
//! Commands declare the subsystems they require. Starting a command interrupts every running
//! command which shares a requirement with it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sequence;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};

pub use sequence::CommandSequence;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A unit of autonomous work.
pub trait Command {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Subsystems this command needs exclusive use of.
    fn requirements(&self) -> &[&'static str] {
        &[]
    }

    /// Called once when the command is started.
    fn initialize(&mut self);

    /// Called every cycle while the command is running, before `is_finished`.
    fn execute(&mut self) {}

    /// Polled every cycle, the command is ended once this returns `true`.
    fn is_finished(&mut self) -> bool;

    /// Called once after `is_finished` returns `true`.
    fn end(&mut self);

    /// Called instead of `end` if the command is cancelled.
    fn interrupted(&mut self);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs commands until they finish.
#[derive(Default)]
pub struct CommandScheduler {
    running: Vec<Box<dyn Command>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommandScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a command, interrupting any running command which shares a
    /// requirement with it.
    pub fn start(&mut self, mut cmd: Box<dyn Command>) {
        let mut i = 0;
        while i < self.running.len() {
            let conflicts = self.running[i].requirements()
                .iter()
                .any(|r| cmd.requirements().contains(r));

            if conflicts {
                let mut old = self.running.remove(i);
                info!("{} interrupted by {}", old.name(), cmd.name());
                old.interrupted();
            }
            else {
                i += 1;
            }
        }

        info!("Starting {}", cmd.name());
        cmd.initialize();
        self.running.push(cmd);
    }

    /// Run one cycle of every running command, ending those that have finished.
    pub fn run(&mut self) {
        let mut i = 0;
        while i < self.running.len() {
            let cmd = &mut self.running[i];
            cmd.execute();

            if cmd.is_finished() {
                let mut cmd = self.running.remove(i);
                cmd.end();
                debug!("{} finished", cmd.name());
            }
            else {
                i += 1;
            }
        }
    }

    /// Interrupt every running command.
    pub fn cancel_all(&mut self) {
        for mut cmd in self.running.drain(..) {
            info!("Cancelling {}", cmd.name());
            cmd.interrupted();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// Names of the running commands, in the order they were started.
    pub fn running_names(&self) -> Vec<&str> {
        self.running.iter().map(|c| c.name()).collect()
    }
}
