//! Clock adapters

use core::cell::Cell;

use crate::ports::clock::Clock;

/// Clock backed by the embassy time driver
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}

/// Clock that only moves when told to; for testing timed flushes
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now_ms: Cell::new(0) }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}
