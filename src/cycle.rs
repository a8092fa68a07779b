//! Candidate baud rates and the wrap-around cycling cursor.

/// Candidate baud rates, ordered by expected frequency of use.
///
/// The order is deliberate and is what the cycling cursor walks through;
/// it is not numerically sorted.
pub const BAUD_CANDIDATES: &[u32] = &[9600, 38400, 19200, 57600, 115200];

/// Wrap-around cursor over [`BAUD_CANDIDATES`].
///
/// The cursor starts at the last entry, so automatic detection (which steps
/// backward on every timeout) tries 115200 first and then walks down the
/// list toward the more common rates.
#[derive(Debug, Clone)]
pub struct BaudCycle {
    index: usize,
}

impl BaudCycle {
    pub fn new() -> Self {
        Self {
            index: BAUD_CANDIDATES.len() - 1,
        }
    }

    /// The candidate at the cursor.
    pub fn current(&self) -> u32 {
        BAUD_CANDIDATES[self.index]
    }

    /// Move the cursor by `delta` entries, wrapping in both directions,
    /// and return the new candidate. Total for any delta.
    pub fn advance(&mut self, delta: i32) -> u32 {
        let len = BAUD_CANDIDATES.len() as i32;
        self.index = (self.index as i32 + delta).rem_euclid(len) as usize;
        self.current()
    }

}

impl Default for BaudCycle {
    fn default() -> Self {
        Self::new()
    }
}
