//! Named cross-sequence timers.
//!
//! A timer lets one sequence stamp a start time and another, run later,
//! wait until a minimum delay has passed since that stamp:
//!
//! ```text
//!   run("lcd_init")   timer,start  "loading 300"   deadline = t0 + 300ms
//!   ... 290ms ...
//!   run("bl_on")      timer,delay  "loading"       sleeps the last 10ms,
//!                                                  then clears the deadline
//! ```
//!
//! Timers are keyed by name in a fixed-capacity registry and never removed.

use core::fmt;

use heapless::FnvIndexMap;

use crate::error::ParseError;

/// Maximum number of distinct timer names.
pub const MAX_TIMERS: usize = 8;

/// Maximum length of a timer or sequence name.
pub const NAME_LEN: usize = 32;

pub type Name = heapless::String<NAME_LEN>;

const NSEC_PER_MSEC: u64 = 1_000_000;
const NSEC_PER_USEC: u64 = 1_000;

/// Copy `s` into a fixed-size name, or `None` if it does not fit.
pub fn make_name(s: &str) -> Option<Name> {
    let mut name = Name::new();
    name.push_str(s).ok()?;
    Some(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    name: Name,
    pub start_ns: u64,
    /// 0 means no deadline is armed.
    pub deadline_ns: u64,
    pub last_observed_ns: u64,
    pub delay_ms: u32,
}

impl Timer {
    fn new(name: Name) -> Self {
        Self {
            name,
            start_ns: 0,
            deadline_ns: 0,
            last_observed_ns: 0,
            delay_ms: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ns != 0
    }

    /// Stamp the start and arm the deadline.
    pub fn start(&mut self, now_ns: u64) {
        self.start_ns = now_ns;
        self.deadline_ns = now_ns + u64::from(self.delay_ms) * NSEC_PER_MSEC;
    }

    pub fn clear(&mut self) {
        self.deadline_ns = 0;
    }

    /// Record an observation and report how long the caller must still wait.
    pub fn observe(&mut self, now_ns: u64) -> Wait {
        self.last_observed_ns = now_ns;
        if self.deadline_ns == 0 {
            return Wait::Full(self.delay_ms);
        }
        if self.deadline_ns <= now_ns {
            return Wait::Elapsed;
        }
        let remaining_us = (self.deadline_ns - now_ns) / NSEC_PER_USEC;
        match u32::try_from(remaining_us) {
            Ok(0) | Err(_) => Wait::Elapsed,
            Ok(us) => Wait::Remaining(us),
        }
    }

    pub fn report(&self) -> TimerReport {
        TimerReport {
            name: self.name.clone(),
            delay_ms: self.delay_ms,
            start_ns: self.start_ns,
            now_ns: self.last_observed_ns,
            deadline_ns: self.deadline_ns,
        }
    }
}

/// Outcome of [`Timer::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Never started (or cleared): wait the full configured delay, in ms.
    Full(u32),
    /// Deadline still ahead by this many microseconds.
    Remaining(u32),
    /// Deadline already passed.
    Elapsed,
}

/// Snapshot of a timer at the moment it was waited on.
///
/// Displays as `name: delay: 300, 80.000000 - 80.290000 = 0.290000, remain: 0.010000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerReport {
    pub name: Name,
    pub delay_ms: u32,
    pub start_ns: u64,
    pub now_ns: u64,
    pub deadline_ns: u64,
}

struct Secs(u64);

impl fmt::Display for Secs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / 1_000_000_000, (self.0 % 1_000_000_000) / 1_000)
    }
}

impl fmt::Display for TimerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.now_ns.saturating_sub(self.start_ns);
        let overdue = self.deadline_ns < self.now_ns;
        let remain = self.deadline_ns.abs_diff(self.now_ns);
        write!(
            f,
            "{}: delay: {}, {} - {} = {}, remain: {}{}",
            self.name,
            self.delay_ms,
            Secs(self.start_ns),
            Secs(self.now_ns),
            Secs(elapsed),
            if overdue { "-" } else { "" },
            Secs(remain)
        )
    }
}

/// Name-keyed timer table.
pub struct TimerRegistry {
    timers: heapless::Vec<Timer, MAX_TIMERS>,
    index: FnvIndexMap<Name, usize, MAX_TIMERS>,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self {
            timers: heapless::Vec::new(),
            index: FnvIndexMap::new(),
        }
    }

    pub fn find(&self, name: &str) -> Option<TimerId> {
        let key = make_name(name)?;
        self.index.get(&key).copied().map(TimerId)
    }

    /// Look up `name`, creating a zeroed timer on a miss.
    pub fn find_or_create(&mut self, name: &str) -> Result<TimerId, ParseError> {
        let key = make_name(name).ok_or_else(|| ParseError::NameTooLong(name.to_owned()))?;
        if let Some(&slot) = self.index.get(&key) {
            log::debug!("{} is found", name);
            return Ok(TimerId(slot));
        }

        let slot = self.timers.len();
        self.timers
            .push(Timer::new(key.clone()))
            .map_err(|_| ParseError::TimerRegistryFull)?;
        self.index
            .insert(key, slot)
            .map_err(|_| ParseError::TimerRegistryFull)?;
        log::info!("{} does not exist, so create it", name);
        Ok(TimerId(slot))
    }

    /// Panics if `id` did not come from this registry.
    pub fn get(&self, id: TimerId) -> &Timer {
        &self.timers[id.0]
    }

    pub fn get_mut(&mut self, id: TimerId) -> &mut Timer {
        &mut self.timers[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&Timer> {
        self.find(name).map(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter()
    }
}
