//! Host time adapter.
//!
//! Provides the monotonic clock and the blocking delay primitives on a
//! hosted target:
//!
//! - **clock**: `std::time::Instant`, nanoseconds since construction.
//! - **busy-wait**: spins on the clock and never yields.
//! - **sleeps**: `std::thread::sleep`, which yields to the scheduler.

use std::time::{Duration, Instant};

use crate::app::ports::{ClockPort, DelayPort};

/// Time adapter backed by the host's monotonic clock.
pub struct StdTime {
    start: Instant,
}

impl Default for StdTime {
    fn default() -> Self {
        Self::new()
    }
}

impl StdTime {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl DelayPort for StdTime {
    fn busy_wait_ms(&mut self, ms: u32) {
        let until = Instant::now() + Duration::from_millis(u64::from(ms));
        while Instant::now() < until {
            core::hint::spin_loop();
        }
    }

    fn sleep_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    /// The host scheduler offers no range primitive; sleeping the lower
    /// bound satisfies the contract.
    fn sleep_us_range(&mut self, min_us: u32, _max_us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(min_us)));
    }
}

impl ClockPort for StdTime {
    fn now_ns(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}
