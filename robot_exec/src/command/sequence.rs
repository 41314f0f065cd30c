//! Sequential command group

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::VecDeque;
use log::debug;

use super::Command;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs a list of commands one after the other.
///
/// The next child is initialized in the same poll that sees the previous one
/// finish, and executes from the following cycle. The sequence requires
/// everything its children require.
pub struct CommandSequence {
    name: String,
    pending: VecDeque<Box<dyn Command>>,
    current: Option<Box<dyn Command>>,
    requirements: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommandSequence {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pending: VecDeque::new(),
            current: None,
            requirements: vec![],
        }
    }

    /// Append a command to the sequence.
    pub fn then(mut self, cmd: Box<dyn Command>) -> Self {
        for r in cmd.requirements() {
            if !self.requirements.contains(r) {
                self.requirements.push(*r);
            }
        }
        self.pending.push_back(cmd);
        self
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.current.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn start_next(&mut self) {
        self.current = self.pending.pop_front();

        if let Some(c) = self.current.as_mut() {
            debug!("{}: starting {}", self.name, c.name());
            c.initialize();
        }
    }
}

impl Command for CommandSequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> &[&'static str] {
        &self.requirements
    }

    fn initialize(&mut self) {
        self.start_next();
    }

    fn execute(&mut self) {
        if let Some(c) = self.current.as_mut() {
            c.execute();
        }
    }

    fn is_finished(&mut self) -> bool {
        if let Some(c) = self.current.as_mut() {
            if !c.is_finished() {
                return false;
            }
            c.end();
            self.start_next();
        }

        self.current.is_none()
    }

    fn end(&mut self) {}

    fn interrupted(&mut self) {
        if let Some(mut c) = self.current.take() {
            c.interrupted();
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::command::{test::Recorder, CommandScheduler};

    #[test]
    fn test_sequence_order() {
        let log = Arc::new(Mutex::new(vec![]));
        let seq = CommandSequence::new("seq")
            .then(Recorder::new("a", &["drive"], 1, &log))
            .then(Recorder::new("b", &["drive", "arm"], 2, &log));

        assert_eq!(seq.requirements(), &["drive", "arm"]);
        assert_eq!(seq.len(), 2);

        let mut sched = CommandScheduler::new();
        sched.start(Box::new(seq));

        sched.run();
        assert_eq!(*log.lock().unwrap(), vec!["a init", "a end", "b init"]);
        sched.run();
        assert!(!sched.is_empty());
        sched.run();
        assert!(sched.is_empty());
        assert_eq!(log.lock().unwrap().last().map(|s| s.as_str()), Some("b end"));
    }

    #[test]
    fn test_sequence_interrupted() {
        let log = Arc::new(Mutex::new(vec![]));
        let mut seq = CommandSequence::new("seq")
            .then(Recorder::new("a", &[], 5, &log))
            .then(Recorder::new("b", &[], 5, &log));

        seq.initialize();
        assert!(!seq.is_finished());
        seq.interrupted();

        assert!(seq.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["a init", "a interrupted"]);
    }

    #[test]
    fn test_empty_sequence() {
        let mut seq = CommandSequence::new("empty");
        seq.initialize();
        assert!(seq.is_finished());
    }
}
