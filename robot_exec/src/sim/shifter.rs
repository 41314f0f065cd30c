//! Simulated gear shifter

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Mutex, PoisonError};
use log::info;

use robot_if::{Gear, Shifter};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A shifter which records the last gear it was asked to engage and how many
/// times it has shifted. Clones share the same record.
#[derive(Clone, Default)]
pub struct SimShifter {
    record: Arc<Mutex<ShiftRecord>>,
}

#[derive(Default)]
struct ShiftRecord {
    engaged: Option<Gear>,
    num_shifts: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimShifter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last gear engaged, `None` if the shifter has never been used.
    pub fn engaged(&self) -> Option<Gear> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner).engaged
    }

    pub fn num_shifts(&self) -> usize {
        self.record.lock().unwrap_or_else(PoisonError::into_inner).num_shifts
    }
}

impl Shifter for SimShifter {
    fn engage(&mut self, gear: Gear) {
        info!("Shifter engaged {:?} gear", gear);

        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        record.engaged = Some(gear);
        record.num_shifts += 1;
    }
}
