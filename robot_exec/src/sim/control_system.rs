//! Scripted stand-in for the competition control system

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use log::{info, warn};

// Internal
use robot_if::{ControlSystem, RobotMode};
use util::script_interpreter::{ModeCmd, PendingEntries, ScriptError, ScriptInterpreter};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A control system which follows a mode script.
///
/// Control packets arrive every `packet_period`, measured from the moment the
/// control system is created. The robot starts disabled until the script says
/// otherwise, and shutdown is requested once the script's `end` entry (or its
/// last entry) has been reached.
pub struct ScriptedControlSystem {
    script: ScriptInterpreter,
    mode: RobotMode,
    shutdown: bool,

    start: Instant,
    packet_period: Duration,

    /// Index of the last packet reported by `is_new_control_data`
    last_packet: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptedControlSystem {
    /// Load the script at `script_path`.
    pub fn from_path<P: AsRef<Path>>(script_path: P, packet_period: Duration)
        -> Result<Self, ScriptError>
    {
        Ok(Self::new(ScriptInterpreter::new(script_path)?, packet_period))
    }

    pub fn new(script: ScriptInterpreter, packet_period: Duration) -> Self {
        info!(
            "Mode script loaded, {} entries over {:.1} s",
            script.get_num_entries(),
            script.get_duration()
        );

        Self {
            script,
            mode: RobotMode::Disabled,
            shutdown: false,
            start: Instant::now(),
            packet_period,
            last_packet: 0,
        }
    }

    fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Index of the most recent packet to have arrived.
    fn current_packet(&self) -> u64 {
        let period_s = self.packet_period.as_secs_f64();

        if period_s > 0.0 {
            (self.elapsed_s() / period_s) as u64
        }
        else {
            self.last_packet + 1
        }
    }

    /// Apply every script entry that has become due.
    fn poll_script(&mut self) {
        if self.shutdown {
            return;
        }

        match self.script.get_pending_at(self.elapsed_s()) {
            PendingEntries::None => (),
            PendingEntries::Some(cmds) => {
                for cmd in cmds {
                    match cmd {
                        ModeCmd::Mode(m) => {
                            info!("Control system mode is now {}", m);
                            self.mode = m;
                        },
                        ModeCmd::End => {
                            info!("End of mode script reached");
                            self.shutdown = true;
                            break;
                        }
                    }
                }
            },
            PendingEntries::EndOfScript => {
                warn!("Mode script ran out without an end entry, shutting down");
                self.shutdown = true;
            }
        }
    }
}

impl ControlSystem for ScriptedControlSystem {
    fn mode(&self) -> RobotMode {
        self.mode
    }

    fn is_new_control_data(&mut self) -> bool {
        self.poll_script();

        let packet = self.current_packet();
        if packet > self.last_packet {
            self.last_packet = packet;
            true
        }
        else {
            false
        }
    }

    fn wait_for_data(&mut self) {
        if self.shutdown {
            return;
        }

        let next = (self.last_packet + 1) as u32;
        let due = self.packet_period * next;
        let elapsed = self.start.elapsed();

        if due > elapsed {
            thread::sleep(due - elapsed);
        }

        self.poll_script();
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn control(script: &str, period_ms: u64) -> ScriptedControlSystem {
        ScriptedControlSystem::new(
            ScriptInterpreter::from_script_str(script).unwrap(),
            Duration::from_millis(period_ms)
        )
    }

    #[test]
    fn test_follows_script() {
        let mut cs = control("0.0: autonomous;\n0.03: teleop;\n0.06: end;", 5);

        assert_eq!(cs.mode(), RobotMode::Disabled);
        cs.is_new_control_data();
        assert_eq!(cs.mode(), RobotMode::Autonomous);
        assert!(!cs.is_shutdown_requested());

        thread::sleep(Duration::from_millis(35));
        cs.is_new_control_data();
        assert_eq!(cs.mode(), RobotMode::Teleop);

        thread::sleep(Duration::from_millis(30));
        cs.wait_for_data();
        assert!(cs.is_shutdown_requested());
    }

    #[test]
    fn test_packets_are_edges() {
        let mut cs = control("0.0: teleop;\n10.0: end;", 200);

        cs.wait_for_data();
        assert!(cs.is_new_control_data());
        assert!(!cs.is_new_control_data());

        cs.wait_for_data();
        assert!(cs.is_new_control_data());
    }
}
