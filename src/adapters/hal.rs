//! `embedded-hal` 1.0 bridge.
//!
//! [`HalGpioBank`] exposes a contiguous bank of HAL pins as numbered GPIO
//! lines; [`HalDelay`] turns any `DelayNs` provider into the sequencer's
//! delay port.  Neither owns a regulator or pin-control model, so they are
//! combined with other adapters through [`Board`](super::board::Board).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{ClockPort, DelayPort, GpioPort};
use crate::error::PortError;

// ── GPIO ──────────────────────────────────────────────────────

/// A bank of pins mapped onto lines `base..base + pins.len()`.
pub struct HalGpioBank<P> {
    base: u32,
    pins: Vec<P>,
    claimed: Vec<bool>,
}

impl<P: OutputPin + InputPin> HalGpioBank<P> {
    pub fn new(base: u32, pins: Vec<P>) -> Self {
        let claimed = vec![false; pins.len()];
        Self {
            base,
            pins,
            claimed,
        }
    }

    fn index(&self, line: u32) -> Result<usize, PortError> {
        line.checked_sub(self.base)
            .map(|i| i as usize)
            .filter(|&i| i < self.pins.len())
            .ok_or(PortError::GpioUnknownLine(line))
    }

    /// Give the pins back.
    pub fn release(self) -> Vec<P> {
        self.pins
    }
}

impl<P: OutputPin + InputPin> GpioPort for HalGpioBank<P> {
    fn request_output(&mut self, line: u32, high: bool) -> Result<(), PortError> {
        let i = self.index(line)?;
        if self.claimed[i] {
            return Err(PortError::GpioRequestFailed(line));
        }
        let pin = &mut self.pins[i];
        let driven = if high { pin.set_high() } else { pin.set_low() };
        driven.map_err(|e| {
            warn!("gpio {} drive failed: {:?}", line, e);
            PortError::GpioRequestFailed(line)
        })?;
        self.claimed[i] = true;
        Ok(())
    }

    fn free(&mut self, line: u32) {
        if let Ok(i) = self.index(line) {
            self.claimed[i] = false;
        }
    }

    fn get_value(&mut self, line: u32) -> Result<bool, PortError> {
        let i = self.index(line)?;
        self.pins[i]
            .is_high()
            .map_err(|_| PortError::GpioUnknownLine(line))
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Delay port over a HAL delay provider, with a separate clock source.
pub struct HalDelay<D, C> {
    delay: D,
    clock: C,
}

impl<D: DelayNs, C: ClockPort> HalDelay<D, C> {
    pub fn new(delay: D, clock: C) -> Self {
        Self { delay, clock }
    }
}

impl<D: DelayNs, C> DelayPort for HalDelay<D, C> {
    fn busy_wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn sleep_us_range(&mut self, min_us: u32, _max_us: u32) {
        self.delay.delay_us(min_us);
    }
}

impl<D, C: ClockPort> ClockPort for HalDelay<D, C> {
    fn now_ns(&self) -> u64 {
        self.clock.now_ns()
    }
}
