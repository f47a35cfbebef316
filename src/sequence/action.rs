//! Resolved sequence actions.

use core::fmt;

use crate::app::ports::{PinctrlHandle, PinctrlPort, PinctrlState, RegulatorHandle, RegulatorPort};

use super::timer::{Name, TimerId};

/// Action vocabulary.  Closed: the parser maps every type string onto one of
/// these, and anything it cannot map becomes [`ActionKind::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    GpioHigh,
    GpioLow,
    RegulatorEnable,
    RegulatorDisable,
    /// `delay,mdelay`: busy-wait.
    DelayMs,
    /// `delay,msleep`: yielding sleep.
    DelaySleepMs,
    /// `delay,usleep`: yielding range sleep.
    DelayUsleepRange,
    PinctrlSelect,
    TimerStart,
    /// `timer,delay`: wait for the deadline, then clear it.
    TimerWait,
    TimerClear,
    Invalid,
}

/// Category half of a type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Gpio,
    Regulator,
    Delay,
    Pinctrl,
    Timer,
    Unknown,
}

impl Category {
    pub fn from_type(type_str: &str) -> Self {
        let category = type_str.split(',').next().unwrap_or("").trim();
        match category {
            "gpio" => Self::Gpio,
            "regulator" => Self::Regulator,
            "delay" => Self::Delay,
            "pinctrl" => Self::Pinctrl,
            "timer" => Self::Timer,
            _ => Self::Unknown,
        }
    }

    /// Entries that never touch panel hardware.  These still run when no
    /// panel is attached.
    pub fn is_timing(self) -> bool {
        matches!(self, Self::Delay | Self::Timer)
    }
}

impl ActionKind {
    /// Map a `"category,subtype"` string (or bare `"pinctrl"`) onto a kind.
    pub fn from_type(type_str: &str) -> Self {
        let mut parts = type_str.splitn(2, ',');
        let category = parts.next().unwrap_or("").trim();
        let subtype = parts.next().map(str::trim);

        match (category, subtype) {
            ("gpio", Some("high")) => Self::GpioHigh,
            ("gpio", Some("low")) => Self::GpioLow,
            ("regulator", Some("enable")) => Self::RegulatorEnable,
            ("regulator", Some("disable")) => Self::RegulatorDisable,
            ("delay", Some("mdelay")) => Self::DelayMs,
            ("delay", Some("msleep")) => Self::DelaySleepMs,
            ("delay", Some("usleep")) => Self::DelayUsleepRange,
            ("pinctrl", None) => Self::PinctrlSelect,
            ("timer", Some("start")) => Self::TimerStart,
            ("timer", Some("delay")) => Self::TimerWait,
            ("timer", Some("clear")) => Self::TimerClear,
            _ => Self::Invalid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GpioHigh => "gpio,high",
            Self::GpioLow => "gpio,low",
            Self::RegulatorEnable => "regulator,enable",
            Self::RegulatorDisable => "regulator,disable",
            Self::DelayMs => "delay,mdelay",
            Self::DelaySleepMs => "delay,msleep",
            Self::DelayUsleepRange => "delay,usleep",
            Self::PinctrlSelect => "pinctrl",
            Self::TimerStart => "timer,start",
            Self::TimerWait => "timer,delay",
            Self::TimerClear => "timer,clear",
            Self::Invalid => "dummy",
        }
    }
}

/// A timer reference carried by timer actions.  The name travels along for
/// trace output only; identity is the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRef {
    pub id: TimerId,
    pub name: Name,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    GpioHigh { line: u32 },
    GpioLow { line: u32 },
    RegulatorEnable { handle: RegulatorHandle },
    RegulatorDisable { handle: RegulatorHandle },
    DelayMs(u32),
    DelaySleepMs(u32),
    DelayUsleepRange { min_us: u32, max_us: u32 },
    PinctrlSelect { pins: PinctrlHandle, state: PinctrlState },
    TimerStart(TimerRef),
    TimerWait(TimerRef),
    TimerClear(TimerRef),
    Invalid,
}

impl Op {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::GpioHigh { .. } => ActionKind::GpioHigh,
            Self::GpioLow { .. } => ActionKind::GpioLow,
            Self::RegulatorEnable { .. } => ActionKind::RegulatorEnable,
            Self::RegulatorDisable { .. } => ActionKind::RegulatorDisable,
            Self::DelayMs(_) => ActionKind::DelayMs,
            Self::DelaySleepMs(_) => ActionKind::DelaySleepMs,
            Self::DelayUsleepRange { .. } => ActionKind::DelayUsleepRange,
            Self::PinctrlSelect { .. } => ActionKind::PinctrlSelect,
            Self::TimerStart(_) => ActionKind::TimerStart,
            Self::TimerWait(_) => ActionKind::TimerWait,
            Self::TimerClear(_) => ActionKind::TimerClear,
            Self::Invalid => ActionKind::Invalid,
        }
    }
}

/// One resolved step of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub op: Op,
    /// Argument string as written in the description.
    pub arg: String,
    /// Free-text description, debug output only.
    pub desc: Option<String>,
}

impl Action {
    pub fn new(op: Op, arg: impl Into<String>, desc: Option<&str>) -> Self {
        Self {
            op,
            arg: arg.into(),
            desc: desc.map(str::to_owned),
        }
    }

    /// The placeholder that marks a sequence as built-but-empty.
    pub fn invalid() -> Self {
        Self {
            op: Op::Invalid,
            arg: String::new(),
            desc: None,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.op.kind()
    }

    /// Give back any resource acquired while parsing.
    pub fn release(&self, hw: &mut (impl RegulatorPort + PinctrlPort)) {
        match &self.op {
            Op::RegulatorEnable { handle } | Op::RegulatorDisable { handle } => {
                RegulatorPort::put(hw, *handle);
            }
            Op::PinctrlSelect { pins, .. } => PinctrlPort::put(hw, *pins),
            _ => {}
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            Op::GpioHigh { line } => write!(f, "gpio({line}) high"),
            Op::GpioLow { line } => write!(f, "gpio({line}) low"),
            Op::RegulatorEnable { .. } => write!(f, "regulator({}) enable", self.arg),
            Op::RegulatorDisable { .. } => write!(f, "regulator({}) disable", self.arg),
            Op::DelayMs(ms) => write!(f, "mdelay({ms})"),
            Op::DelaySleepMs(ms) => write!(f, "msleep({ms})"),
            Op::DelayUsleepRange { min_us, max_us } => write!(f, "usleep({min_us} {max_us})"),
            Op::PinctrlSelect { .. } => write!(f, "pinctrl({})", self.arg),
            Op::TimerStart(t) => write!(f, "timer,start({})", t.name),
            Op::TimerWait(t) => write!(f, "timer,delay({})", t.name),
            Op::TimerClear(t) => write!(f, "timer,clear({})", t.name),
            Op::Invalid => write!(f, "dummy"),
        }
    }
}

/// Per-category action counts for a built sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSummary {
    pub gpio: usize,
    pub regulator: usize,
    pub delay: usize,
    pub pinctrl: usize,
    pub timer: usize,
}

impl ActionSummary {
    pub fn of(actions: &[Action]) -> Self {
        let mut s = Self::default();
        for action in actions {
            match action.kind() {
                ActionKind::GpioHigh | ActionKind::GpioLow => s.gpio += 1,
                ActionKind::RegulatorEnable | ActionKind::RegulatorDisable => s.regulator += 1,
                ActionKind::DelayMs | ActionKind::DelaySleepMs | ActionKind::DelayUsleepRange => {
                    s.delay += 1;
                }
                ActionKind::PinctrlSelect => s.pinctrl += 1,
                ActionKind::TimerStart | ActionKind::TimerWait | ActionKind::TimerClear => {
                    s.timer += 1;
                }
                ActionKind::Invalid => {}
            }
        }
        s
    }
}

impl fmt::Display for ActionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gpio: {}, regulator: {}, delay: {}, pinctrl: {}, timer: {}",
            self.gpio, self.regulator, self.delay, self.pinctrl, self.timer
        )
    }
}
