//! Action parser: one `(type, argument)` pair in, one resolved [`Action`] out.
//!
//! Every external resource is acquired here, so that replaying a sequence
//! never has to resolve a name again.  Timing conventions are enforced, not
//! advised:
//!
//! | wait            | use                    |
//! |-----------------|------------------------|
//! | < 20ms          | `delay,usleep`         |
//! | >= 20ms         | `delay,msleep`         |
//! | cross-sequence  | `timer,*` (>= 20ms)    |

use log::{debug, info, warn};

use crate::app::ports::{PinctrlPort, RegulatorHandle, RegulatorPort};
use crate::devtree::{DeviceTree, NodeId};
use crate::error::{ParseError, PortError};

use super::action::{Action, ActionKind, Op, TimerRef};
use super::timer::{make_name, TimerRegistry};

/// Threshold between the short (range sleep) and long (msleep / timer)
/// delay forms.
pub const SMALL_MSECS: u32 = 20;

const USEC_PER_MSEC: u32 = 1_000;

/// Parses entries of one sequence section.
pub struct ActionParser<'a, H> {
    tree: &'a DeviceTree,
    /// Node holding the GPIO references and pin-control maps.
    container: NodeId,
    hw: &'a mut H,
    timers: &'a mut TimerRegistry,
}

impl<'a, H> ActionParser<'a, H>
where
    H: RegulatorPort + PinctrlPort,
{
    pub fn new(tree: &'a DeviceTree, container: NodeId, hw: &'a mut H, timers: &'a mut TimerRegistry) -> Self {
        Self {
            tree,
            container,
            hw,
            timers,
        }
    }

    /// Resolve one entry.
    pub fn parse(&mut self, type_str: &str, arg: &str, desc: Option<&str>) -> Result<Action, ParseError> {
        let kind = ActionKind::from_type(type_str);
        if kind != ActionKind::Invalid && arg.trim().is_empty() {
            warn!("invalid argument for {}", type_str);
            return Err(ParseError::MissingArgument);
        }

        let op = match kind {
            ActionKind::GpioHigh => Op::GpioHigh { line: self.gpio(arg)? },
            ActionKind::GpioLow => Op::GpioLow { line: self.gpio(arg)? },
            ActionKind::RegulatorEnable => Op::RegulatorEnable {
                handle: self.regulator(arg)?,
            },
            ActionKind::RegulatorDisable => Op::RegulatorDisable {
                handle: self.regulator(arg)?,
            },
            ActionKind::DelayMs => Op::DelayMs(parse_delay_ms(arg)?),
            ActionKind::DelaySleepMs => Op::DelaySleepMs(parse_delay_ms(arg)?),
            ActionKind::DelayUsleepRange => {
                let (min_us, max_us) = parse_usleep_range(arg)?;
                Op::DelayUsleepRange { min_us, max_us }
            }
            ActionKind::PinctrlSelect => self.pinctrl(arg)?,
            ActionKind::TimerStart => {
                let (name, delay_ms) = parse_timer_start(arg)?;
                let timer = self.timer(name)?;
                self.timers.get_mut(timer.id).delay_ms = delay_ms;
                Op::TimerStart(timer)
            }
            ActionKind::TimerWait => Op::TimerWait(self.timer(arg.trim())?),
            ActionKind::TimerClear => Op::TimerClear(self.timer(arg.trim())?),
            ActionKind::Invalid => {
                warn!("there is no valid action for {}", type_str);
                return Err(ParseError::UnknownType(type_str.to_owned()));
            }
        };

        info!("type: {}, arg: {}", kind.as_str(), arg);
        Ok(Action::new(op, arg, desc))
    }

    fn gpio(&self, arg: &str) -> Result<u32, ParseError> {
        let spec = self.tree.named_gpio(self.container, arg, 0).map_err(|e| {
            warn!("gpio lookup failed for {}: {}", arg, e);
            ParseError::Gpio(e)
        })?;
        Ok(spec.line)
    }

    fn regulator(&mut self, supply: &str) -> Result<RegulatorHandle, ParseError> {
        RegulatorPort::get(&mut *self.hw, supply).map_err(|e| {
            warn!("regulator get failed for {}: {}", supply, e);
            ParseError::Resource(e)
        })
    }

    fn pinctrl(&mut self, state_name: &str) -> Result<Op, ParseError> {
        let Some(device) = self.tree.device_for_node(self.container) else {
            warn!("no device bound to {}", self.tree.node(self.container).name());
            return Err(ParseError::Resource(PortError::DeviceNotFound));
        };
        info!("device {} for pinctrl {}", device, state_name);

        let pins = PinctrlPort::get(&mut *self.hw, device).map_err(|e| {
            warn!("pinctrl get failed for {}: {}", device, e);
            ParseError::Resource(e)
        })?;
        match self.hw.lookup_state(pins, state_name) {
            Ok(state) => Ok(Op::PinctrlSelect { pins, state }),
            Err(e) => {
                warn!("pinctrl lookup_state failed for {}: {}", state_name, e);
                PinctrlPort::put(&mut *self.hw, pins);
                Err(ParseError::Resource(e))
            }
        }
    }

    fn timer(&mut self, name: &str) -> Result<TimerRef, ParseError> {
        let id = self.timers.find_or_create(name)?;
        let name = make_name(name).ok_or_else(|| ParseError::NameTooLong(name.to_owned()))?;
        Ok(TimerRef { id, name })
    }
}

// ── Argument parsing (pure) ───────────────────────────────────

/// Unsigned integer with automatic radix: `0x` hex, leading `0` octal,
/// otherwise decimal.  One trailing newline is tolerated.
fn parse_uint(s: &str) -> Option<u32> {
    let s = s.strip_suffix('\n').unwrap_or(s);
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    // `from_str_radix` alone would take a sign after the prefix.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

/// `delay,mdelay` / `delay,msleep` argument: one non-negative integer.
pub fn parse_delay_ms(arg: &str) -> Result<u32, ParseError> {
    if !arg.starts_with(|c: char| c.is_ascii_digit()) {
        warn!("delay needs a digit parameter {}", arg);
        return Err(ParseError::NotNumeric(arg.to_owned()));
    }
    parse_uint(arg).ok_or_else(|| {
        warn!("delay parse failed for {}", arg);
        ParseError::NotNumeric(arg.to_owned())
    })
}

/// Upper bound synthesised when `delay,usleep` is given a single value:
/// `v + v/2`, nudged up by one when that would not exceed `v`.
pub fn synthesize_max(min_us: u32) -> u32 {
    let max = min_us.saturating_add(min_us >> 1);
    if max == min_us { max.saturating_add(1) } else { max }
}

/// `delay,usleep` argument: `"<min>"` or `"<min> <max>"` in microseconds.
pub fn parse_usleep_range(arg: &str) -> Result<(u32, u32), ParseError> {
    if !arg.starts_with(|c: char| c.is_ascii_digit()) {
        warn!("delay needs a digit parameter {}", arg);
        return Err(ParseError::NotNumeric(arg.to_owned()));
    }

    let mut values = arg.split_whitespace().map(|v| {
        v.parse::<u32>()
            .map_err(|_| ParseError::NotNumeric(arg.to_owned()))
    });
    let min_us = values.next().ok_or_else(|| ParseError::NotNumeric(arg.to_owned()))??;
    let max_us = match values.next() {
        Some(v) => v?,
        None => {
            let max = synthesize_max(min_us);
            debug!("usleep needs two parameters. 2nd delay is {}", max);
            max
        }
    };
    if values.next().is_some() {
        warn!("usleep needs only two parameters {}", arg);
        return Err(ParseError::TooManyValues(arg.to_owned()));
    }

    if min_us == 0 || max_us == 0 || min_us > max_us {
        warn!("usleep parameter ({} {}) invalid", min_us, max_us);
        return Err(ParseError::InvalidRange { min_us, max_us });
    }
    if min_us >= SMALL_MSECS * USEC_PER_MSEC {
        warn!("use msleep instead of usleep for {}us", min_us);
        return Err(ParseError::RangeTooLong(min_us));
    }
    Ok((min_us, max_us))
}

/// `timer,start` argument: `"<name> <delay_ms>"`.
pub fn parse_timer_start(arg: &str) -> Result<(&str, u32), ParseError> {
    let mut tokens = arg.split_whitespace();
    let (Some(name), Some(delay), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        warn!("timer start parameter invalid {}", arg);
        return Err(ParseError::TimerFormat(arg.to_owned()));
    };
    let delay_ms: u32 = delay
        .parse()
        .map_err(|_| ParseError::TimerFormat(arg.to_owned()))?;
    if delay_ms < SMALL_MSECS {
        warn!("use usleep instead of timer for {}ms", delay_ms);
        return Err(ParseError::TimerTooShort(delay_ms));
    }
    Ok((name, delay_ms))
}
