//! Ledger lines for noteheads outside the five-line staff.

use serde::{Deserialize, Serialize};

/// Steps of the outer staff lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffBounds {
    /// Step of the bottom line
    pub bottom: i32,
    /// Step of the top line
    pub top: i32,
}

impl StaffBounds {
    /// Step of the center line.
    pub fn middle(&self) -> i32 {
        (self.bottom + self.top) / 2
    }
}

/// Steps of the ledger lines needed for a notehead at `step`, nearest the
/// staff first. A notehead in the first space outside the staff gets none.
pub fn ledger_lines(step: i32, bounds: StaffBounds) -> Vec<i32> {
    if step < bounds.bottom {
        let count = (bounds.bottom - step) / 2;
        (1..=count).map(|k| bounds.bottom - 2 * k).collect()
    } else if step > bounds.top {
        let count = (step - bounds.top) / 2;
        (1..=count).map(|k| bounds.top + 2 * k).collect()
    } else {
        Vec::new()
    }
}

pub fn ledger_line_count(step: i32, bounds: StaffBounds) -> usize {
    ledger_lines(step, bounds).len()
}
