//! Autonomous program chooser

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};

use crate::command::Command;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The autonomous programs available to the operators, and which one they
/// picked.
#[derive(Default)]
pub struct AutoChooser {
    candidates: Vec<(String, Box<dyn Command>)>,
    default: Option<String>,
    selected: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutoChooser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a program, replacing any existing program with the same name.
    pub fn add_candidate(&mut self, name: &str, program: Box<dyn Command>) {
        match self.candidates.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some(entry) => entry.1 = program,
            None => self.candidates.push((name.to_string(), program)),
        }
        debug!("Auto program \"{}\" available", name);
    }

    /// Add a program which runs when nothing is selected.
    pub fn add_default(&mut self, name: &str, program: Box<dyn Command>) {
        self.add_candidate(name, program);
        self.default = Some(name.to_string());
    }

    /// Select a program by name. Returns `false`, leaving the selection
    /// unchanged, if there is no such program.
    pub fn select(&mut self, name: &str) -> bool {
        if self.candidates.iter().any(|(n, _)| n.as_str() == name) {
            self.selected = Some(name.to_string());
            true
        }
        else {
            warn!("No auto program called \"{}\"", name);
            false
        }
    }

    /// Name of the program that would run, the selection if there is one or
    /// else the default.
    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref().or_else(|| self.default.as_deref())
    }

    /// Remove and return the program that should run.
    pub fn take_selected(&mut self) -> Option<(String, Box<dyn Command>)> {
        let name = self.selected_name()?.to_string();
        let idx = self.candidates.iter().position(|(n, _)| *n == name)?;
        Some(self.candidates.remove(idx))
    }

    /// Remove every program, keeping the selection so it applies to the
    /// rebuilt candidates.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.default = None;
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::command::test::Recorder;

    #[test]
    fn test_chooser() {
        let log = Arc::new(Mutex::new(vec![]));
        let mut chooser = AutoChooser::new();

        assert!(chooser.take_selected().is_none());

        chooser.add_default("forward", Recorder::new("forward", &[], 1, &log));
        chooser.add_candidate("square", Recorder::new("square", &[], 1, &log));
        assert_eq!(chooser.len(), 2);
        assert_eq!(chooser.selected_name(), Some("forward"));

        assert!(!chooser.select("dance"));
        assert!(chooser.select("square"));
        assert_eq!(chooser.selected_name(), Some("square"));

        let (name, program) = chooser.take_selected().unwrap();
        assert_eq!(name, "square");
        assert_eq!(program.name(), "square");
        assert_eq!(chooser.len(), 1);

        // Already taken
        assert!(chooser.take_selected().is_none());

        chooser.clear();
        assert!(chooser.is_empty());
        assert_eq!(chooser.selected_name(), Some("square"));
    }
}
