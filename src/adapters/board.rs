//! Composite board adapter.
//!
//! Pairs an IO adapter (GPIO, regulators, pin control) with a time adapter
//! (delays, clock) so that, together, they satisfy
//! [`Hardware`](crate::app::ports::Hardware).

use crate::app::ports::{
    ClockPort, DelayPort, GpioPort, PinctrlHandle, PinctrlPort, PinctrlState, RegulatorHandle,
    RegulatorPort,
};
use crate::error::PortError;

pub struct Board<I, T> {
    pub io: I,
    pub time: T,
}

impl<I, T> Board<I, T> {
    pub fn new(io: I, time: T) -> Self {
        Self { io, time }
    }
}

impl<I: GpioPort, T> GpioPort for Board<I, T> {
    fn request_output(&mut self, line: u32, high: bool) -> Result<(), PortError> {
        self.io.request_output(line, high)
    }

    fn free(&mut self, line: u32) {
        self.io.free(line);
    }

    fn get_value(&mut self, line: u32) -> Result<bool, PortError> {
        self.io.get_value(line)
    }
}

impl<I: RegulatorPort, T> RegulatorPort for Board<I, T> {
    fn get(&mut self, supply: &str) -> Result<RegulatorHandle, PortError> {
        self.io.get(supply)
    }

    fn enable(&mut self, handle: RegulatorHandle) -> Result<(), PortError> {
        self.io.enable(handle)
    }

    fn disable(&mut self, handle: RegulatorHandle) -> Result<(), PortError> {
        self.io.disable(handle)
    }

    fn put(&mut self, handle: RegulatorHandle) {
        self.io.put(handle);
    }
}

impl<I: PinctrlPort, T> PinctrlPort for Board<I, T> {
    fn get(&mut self, device: &str) -> Result<PinctrlHandle, PortError> {
        self.io.get(device)
    }

    fn lookup_state(&mut self, pins: PinctrlHandle, name: &str) -> Result<PinctrlState, PortError> {
        self.io.lookup_state(pins, name)
    }

    fn select_state(&mut self, pins: PinctrlHandle, state: PinctrlState) -> Result<(), PortError> {
        self.io.select_state(pins, state)
    }

    fn put(&mut self, pins: PinctrlHandle) {
        self.io.put(pins);
    }
}

impl<I, T: DelayPort> DelayPort for Board<I, T> {
    fn busy_wait_ms(&mut self, ms: u32) {
        self.time.busy_wait_ms(ms);
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.time.sleep_ms(ms);
    }

    fn sleep_us_range(&mut self, min_us: u32, max_us: u32) {
        self.time.sleep_us_range(min_us, max_us);
    }
}

impl<I, T: ClockPort> ClockPort for Board<I, T> {
    fn now_ns(&self) -> u64 {
        self.time.now_ns()
    }
}
