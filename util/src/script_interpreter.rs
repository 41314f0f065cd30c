//! # Mode script interpreter module
//!
//! This module provides an interpreter for mode scripts, which let a development host stand in
//! for the competition control system by switching the robot mode at given times.
//!
//! A script is a sequence of `<time_s>: <entry>;` statements, where the entry is one of
//! `disabled`, `autonomous`, `teleop`, `test` or `end`. For example:
//!
//! ```text
//! 0.0: disabled;
//! 1.5: autonomous;
//! 16.5: disabled;
//! 18.0: teleop;
//! 30.0: end;
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use robot_if::{ParseModeError, RobotMode};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An entry which is scripted to occur at a specific time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptEntry {
    /// The time the entry is supposed to take effect at
    pub exec_time_s: f64,

    /// What happens at that time
    pub cmd: ModeCmd
}

/// A script interpreter.
///
/// After initialising with the script to run use `.get_pending_at` to
/// acquire the entries that have become due.
#[derive(Debug)]
pub struct ScriptInterpreter {
    _script_path: Option<PathBuf>,
    entries: VecDeque<ScriptEntry>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCmd {
    /// Switch the robot into the given mode
    Mode(RobotMode),

    /// End of the run, the executable should shut down
    End
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid entry at {0} s: {1}")]
    InvalidEntry(f64, ParseModeError),

    #[error("Script entries must be in time order, {1} s comes after {0} s")]
    OutOfOrder(f64, f64),

    #[error("Failed to build the script regex: {0}")]
    RegexError(regex::Error)
}

pub enum PendingEntries {
    None,
    Some(Vec<ModeCmd>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script_str(&script)?;
        si._script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {

        // Empty queue of entries
        let mut queue: VecDeque<ScriptEntry> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::RegexError)?;

        for cap in re.captures_iter(script) {
            // Groups 1 and 3 always participate in a match
            let (time_str, entry_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(e)) => (t.as_str(), e.as_str()),
                _ => continue
            };

            // Parse the exec time
            let exec_time_s: f64 = time_str.parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the entry itself
            let cmd = match entry_str.trim() {
                "end" => ModeCmd::End,
                s => ModeCmd::Mode(
                    s.parse().map_err(|e| ScriptError::InvalidEntry(exec_time_s, e))?
                )
            };

            if let Some(last) = queue.back() {
                if last.exec_time_s > exec_time_s {
                    return Err(ScriptError::OutOfOrder(last.exec_time_s, exec_time_s));
                }
            }

            queue.push_back(ScriptEntry {
                exec_time_s,
                cmd
            });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            _script_path: None,
            entries: queue
        })
    }

    /// Return the entries due at `current_time_s` (seconds since the start
    /// of the script), removing them from the script.
    pub fn get_pending_at(&mut self, current_time_s: f64) -> PendingEntries {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.entries.is_empty() {
            return PendingEntries::EndOfScript
        }

        let mut cmd_vec: Vec<ModeCmd> = vec![];

        // Pop items from the queue while the head's exec time has passed
        while let Some(entry) = self.entries.front() {
            if entry.exec_time_s > current_time_s {
                break;
            }
            cmd_vec.push(entry.cmd);
            self.entries.pop_front();
        }

        if cmd_vec.is_empty() {
            PendingEntries::None
        }
        else {
            PendingEntries::Some(cmd_vec)
        }
    }

    /// Get the number of entries left in the script
    pub fn get_num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.entries.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = "
        0.0: disabled;
        1.5: autonomous;
        16.5: disabled;
        18: teleop;
        30.0: end;
    ";

    #[test]
    fn test_parse_script() {
        let si = ScriptInterpreter::from_script_str(SCRIPT).unwrap();

        assert_eq!(si.get_num_entries(), 5);
        assert_eq!(si.get_duration(), 30.0);
    }

    #[test]
    fn test_pending_entries() {
        let mut si = ScriptInterpreter::from_script_str(SCRIPT).unwrap();

        match si.get_pending_at(0.0) {
            PendingEntries::Some(v) => assert_eq!(v, vec![ModeCmd::Mode(RobotMode::Disabled)]),
            _ => panic!("Expected the disabled entry")
        }

        assert!(matches!(si.get_pending_at(1.0), PendingEntries::None));

        match si.get_pending_at(17.0) {
            PendingEntries::Some(v) => assert_eq!(v, vec![
                ModeCmd::Mode(RobotMode::Autonomous),
                ModeCmd::Mode(RobotMode::Disabled)
            ]),
            _ => panic!("Expected two entries")
        }

        match si.get_pending_at(100.0) {
            PendingEntries::Some(v) => assert_eq!(v, vec![
                ModeCmd::Mode(RobotMode::Teleop),
                ModeCmd::End
            ]),
            _ => panic!("Expected two entries")
        }

        assert!(matches!(si.get_pending_at(101.0), PendingEntries::EndOfScript));
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("nothing to see here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_script_str("1.0: practice;"),
            Err(ScriptError::InvalidEntry(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::from_script_str("2.0: teleop;\n1.0: disabled;"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
    }
}
