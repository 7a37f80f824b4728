//! Inter-frame pacing adapters
//!
//! The peer's notification pipeline needs breathing room between frames;
//! the pacer is the seam where that delay lives, so tests can strip it out.

use embassy_time::{Duration, Timer};

use crate::config::INTER_FRAME_DELAY_MS;
use crate::ports::link::FramePacer;

/// Pacer sleeping on the embassy timer between frames
pub struct EmbassyPacer {
    delay: Duration,
}

impl EmbassyPacer {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(INTER_FRAME_DELAY_MS),
        }
    }
}

impl Default for EmbassyPacer {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePacer for EmbassyPacer {
    async fn pause(&mut self) {
        Timer::after(self.delay).await;
    }
}

/// Pacer that never waits; keeps the test suite fast
pub struct NoopPacer;

impl FramePacer for NoopPacer {
    async fn pause(&mut self) {}
}
