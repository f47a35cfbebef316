//! Simulated board adapter.
//!
//! In-memory GPIO lines, regulators and pin-control devices behind a virtual
//! clock.  Every hardware-visible operation is appended to a trace so tests
//! (and the host CLI) can assert on the full command history without any
//! real peripheral.  Delays advance the virtual clock instead of blocking;
//! a range sleep advances it by its lower bound.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::app::ports::{
    ClockPort, DelayPort, GpioPort, PinctrlHandle, PinctrlPort, PinctrlState, RegulatorHandle,
    RegulatorPort,
};
use crate::devtree::{DeviceTree, Property};
use crate::error::PortError;

const NSEC_PER_MSEC: u64 = 1_000_000;
const NSEC_PER_USEC: u64 = 1_000;

const PINCTRL_NAMES_PROP: &str = "pinctrl-names";
const COMPATIBLE_PROP: &str = "compatible";

// ── Operation record ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimOp {
    GpioRequest { line: u32, high: bool },
    GpioFree { line: u32 },
    RegulatorEnable { supply: String },
    RegulatorDisable { supply: String },
    PinctrlSelect { device: String, state: String },
    BusyWait { ms: u32 },
    Sleep { ms: u32 },
    SleepRange { min_us: u32, max_us: u32 },
}

#[derive(Debug)]
struct Regulator {
    name: String,
    use_count: u32,
}

#[derive(Debug)]
struct PinctrlDevice {
    name: String,
    states: Vec<String>,
    active: Option<usize>,
}

// ── SimBoard ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimBoard {
    now_ns: u64,
    trace: Vec<SimOp>,

    levels: BTreeMap<u32, bool>,
    claimed: BTreeSet<u32>,
    failing: BTreeSet<u32>,

    regulators: Vec<Regulator>,
    /// `None`: any supply name is accepted and created on first use.
    known_supplies: Option<BTreeSet<String>>,
    /// Regulator consumers, indexed by handle; `None` once put.
    consumers: Vec<Option<usize>>,

    pin_devices: Vec<PinctrlDevice>,
    /// Pin-control bindings, indexed by handle; `None` once put.
    bindings: Vec<Option<usize>>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board with a pin-control device for every bound node that declares
    /// `pinctrl-names`.
    pub fn from_tree(tree: &DeviceTree) -> Self {
        let mut board = Self::new();
        for id in tree.node_ids() {
            if tree.property(id, COMPATIBLE_PROP).is_none() {
                continue;
            }
            if let Some(Property::Strings(names)) = tree.property(id, PINCTRL_NAMES_PROP) {
                board.add_pinctrl_device(tree.node(id).name(), names);
            }
        }
        board
    }

    /// Only the listed supplies exist; any other name fails to resolve.
    pub fn with_regulators(mut self, supplies: &[&str]) -> Self {
        self.known_supplies = Some(supplies.iter().map(|s| (*s).to_owned()).collect());
        self
    }

    /// Claims of `line` always fail.
    pub fn with_failing_gpio(mut self, line: u32) -> Self {
        self.failing.insert(line);
        self
    }

    pub fn add_pinctrl_device(&mut self, device: &str, states: &[String]) {
        debug!("sim: pinctrl device {} with {} states", device, states.len());
        self.pin_devices.push(PinctrlDevice {
            name: device.to_owned(),
            states: states.to_vec(),
            active: None,
        });
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    pub fn trace(&self) -> &[SimOp] {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Advance the virtual clock without recording an operation.
    pub fn advance_ms(&mut self, ms: u32) {
        self.now_ns += u64::from(ms) * NSEC_PER_MSEC;
    }

    /// Last level driven onto (or preset on) `line`.
    pub fn level(&self, line: u32) -> Option<bool> {
        self.levels.get(&line).copied()
    }

    /// Preset the level an input read of `line` will return.
    pub fn set_level(&mut self, line: u32, high: bool) {
        self.levels.insert(line, high);
    }

    pub fn is_claimed(&self, line: u32) -> bool {
        self.claimed.contains(&line)
    }

    /// Regulator consumers acquired and not yet put.
    pub fn regulators_held(&self) -> usize {
        self.consumers.iter().flatten().count()
    }

    pub fn regulator_enabled(&self, supply: &str) -> bool {
        self.regulators
            .iter()
            .any(|r| r.name == supply && r.use_count > 0)
    }

    /// Pin-control bindings acquired and not yet put.
    pub fn pinctrl_held(&self) -> usize {
        self.bindings.iter().flatten().count()
    }

    /// Currently selected state of `device`.
    pub fn active_state(&self, device: &str) -> Option<&str> {
        let dev = self.pin_devices.iter().find(|d| d.name == device)?;
        dev.active.map(|i| dev.states[i].as_str())
    }

    fn regulator_of(&self, handle: RegulatorHandle) -> Result<usize, PortError> {
        self.consumers
            .get(handle.0 as usize)
            .copied()
            .flatten()
            .ok_or(PortError::RegulatorNotFound)
    }

    fn device_of(&self, pins: PinctrlHandle) -> Result<usize, PortError> {
        self.bindings
            .get(pins.0 as usize)
            .copied()
            .flatten()
            .ok_or(PortError::PinctrlUnavailable)
    }
}

// ── Ports ─────────────────────────────────────────────────────

impl GpioPort for SimBoard {
    fn request_output(&mut self, line: u32, high: bool) -> Result<(), PortError> {
        self.trace.push(SimOp::GpioRequest { line, high });
        if self.failing.contains(&line) || !self.claimed.insert(line) {
            return Err(PortError::GpioRequestFailed(line));
        }
        self.levels.insert(line, high);
        Ok(())
    }

    fn free(&mut self, line: u32) {
        self.trace.push(SimOp::GpioFree { line });
        self.claimed.remove(&line);
    }

    fn get_value(&mut self, line: u32) -> Result<bool, PortError> {
        self.levels
            .get(&line)
            .copied()
            .ok_or(PortError::GpioUnknownLine(line))
    }
}

impl RegulatorPort for SimBoard {
    fn get(&mut self, supply: &str) -> Result<RegulatorHandle, PortError> {
        if let Some(known) = &self.known_supplies {
            if !known.contains(supply) {
                return Err(PortError::RegulatorNotFound);
            }
        }
        let index = match self.regulators.iter().position(|r| r.name == supply) {
            Some(i) => i,
            None => {
                self.regulators.push(Regulator {
                    name: supply.to_owned(),
                    use_count: 0,
                });
                self.regulators.len() - 1
            }
        };
        self.consumers.push(Some(index));
        Ok(RegulatorHandle((self.consumers.len() - 1) as u32))
    }

    fn enable(&mut self, handle: RegulatorHandle) -> Result<(), PortError> {
        let index = self.regulator_of(handle)?;
        let reg = &mut self.regulators[index];
        reg.use_count += 1;
        self.trace.push(SimOp::RegulatorEnable {
            supply: reg.name.clone(),
        });
        Ok(())
    }

    fn disable(&mut self, handle: RegulatorHandle) -> Result<(), PortError> {
        let index = self.regulator_of(handle)?;
        let reg = &mut self.regulators[index];
        self.trace.push(SimOp::RegulatorDisable {
            supply: reg.name.clone(),
        });
        if reg.use_count == 0 {
            return Err(PortError::RegulatorFailed);
        }
        reg.use_count -= 1;
        Ok(())
    }

    fn put(&mut self, handle: RegulatorHandle) {
        if let Some(slot) = self.consumers.get_mut(handle.0 as usize) {
            *slot = None;
        }
    }
}

impl PinctrlPort for SimBoard {
    fn get(&mut self, device: &str) -> Result<PinctrlHandle, PortError> {
        let index = self
            .pin_devices
            .iter()
            .position(|d| d.name == device)
            .ok_or(PortError::PinctrlUnavailable)?;
        self.bindings.push(Some(index));
        Ok(PinctrlHandle((self.bindings.len() - 1) as u32))
    }

    fn lookup_state(&mut self, pins: PinctrlHandle, name: &str) -> Result<PinctrlState, PortError> {
        let dev = &self.pin_devices[self.device_of(pins)?];
        dev.states
            .iter()
            .position(|s| s == name)
            .map(|i| PinctrlState(i as u32))
            .ok_or(PortError::PinctrlStateNotFound)
    }

    fn select_state(&mut self, pins: PinctrlHandle, state: PinctrlState) -> Result<(), PortError> {
        let device = self.device_of(pins)?;
        let dev = &mut self.pin_devices[device];
        let index = state.0 as usize;
        let name = dev
            .states
            .get(index)
            .cloned()
            .ok_or(PortError::PinctrlSelectFailed)?;
        dev.active = Some(index);
        self.trace.push(SimOp::PinctrlSelect {
            device: dev.name.clone(),
            state: name,
        });
        Ok(())
    }

    fn put(&mut self, pins: PinctrlHandle) {
        if let Some(slot) = self.bindings.get_mut(pins.0 as usize) {
            *slot = None;
        }
    }
}

impl DelayPort for SimBoard {
    fn busy_wait_ms(&mut self, ms: u32) {
        self.trace.push(SimOp::BusyWait { ms });
        self.advance_ms(ms);
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.trace.push(SimOp::Sleep { ms });
        self.advance_ms(ms);
    }

    fn sleep_us_range(&mut self, min_us: u32, max_us: u32) {
        self.trace.push(SimOp::SleepRange { min_us, max_us });
        self.now_ns += u64::from(min_us) * NSEC_PER_USEC;
    }
}

impl ClockPort for SimBoard {
    fn now_ns(&self) -> u64 {
        self.now_ns
    }
}
