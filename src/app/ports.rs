//! Port traits: the boundary between the sequencer and board subsystems.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Sequencer (parse · build · execute)
//! ```
//!
//! The sequencer only ever acquires, applies, and releases through these
//! traits.  Handles are opaque tokens minted by the adapter at parse time
//! and handed back at execution time, so replay never has to look anything
//! up by name.

use crate::error::PortError;

use super::events::SequencerEvent;

// ───────────────────────────────────────────────────────────────
// Opaque resource handles
// ───────────────────────────────────────────────────────────────

/// A regulator consumer obtained from [`RegulatorPort::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegulatorHandle(pub u32);

/// A device's pin-control binding obtained from [`PinctrlPort::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinctrlHandle(pub u32);

/// A named state within a pin-control binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinctrlState(pub u32);

// ───────────────────────────────────────────────────────────────
// GPIO port
// ───────────────────────────────────────────────────────────────

/// Numbered GPIO lines.
pub trait GpioPort {
    /// Claim `line` as an output, initialised to `high`.
    fn request_output(&mut self, line: u32, high: bool) -> Result<(), PortError>;

    /// Release a claim.  Releasing an unclaimed line is a no-op.
    fn free(&mut self, line: u32);

    /// Read the raw level of `line`.
    fn get_value(&mut self, line: u32) -> Result<bool, PortError>;
}

// ───────────────────────────────────────────────────────────────
// Regulator port
// ───────────────────────────────────────────────────────────────

pub trait RegulatorPort {
    /// Acquire a consumer for `supply`.
    fn get(&mut self, supply: &str) -> Result<RegulatorHandle, PortError>;

    fn enable(&mut self, handle: RegulatorHandle) -> Result<(), PortError>;

    fn disable(&mut self, handle: RegulatorHandle) -> Result<(), PortError>;

    /// Give the consumer back.
    fn put(&mut self, handle: RegulatorHandle);
}

// ───────────────────────────────────────────────────────────────
// Pin-control port
// ───────────────────────────────────────────────────────────────

/// Pin-control states.  A device has exactly one active state at a time;
/// selecting a new one supersedes the previous selection.
pub trait PinctrlPort {
    /// Bind to the pin-control controller of `device`.
    fn get(&mut self, device: &str) -> Result<PinctrlHandle, PortError>;

    fn lookup_state(&mut self, pins: PinctrlHandle, name: &str) -> Result<PinctrlState, PortError>;

    fn select_state(&mut self, pins: PinctrlHandle, state: PinctrlState) -> Result<(), PortError>;

    fn put(&mut self, pins: PinctrlHandle);
}

// ───────────────────────────────────────────────────────────────
// Time ports
// ───────────────────────────────────────────────────────────────

/// Blocking delays.  The busy-wait and the yielding sleeps are distinct
/// primitives: a busy-wait never gives up the CPU.
pub trait DelayPort {
    /// Spin for `ms` milliseconds without yielding.
    fn busy_wait_ms(&mut self, ms: u32);

    /// Yielding sleep of at least `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);

    /// Yielding sleep somewhere within `[min_us, max_us]`.
    fn sleep_us_range(&mut self, min_us: u32, max_us: u32);
}

/// Monotonic clock.
pub trait ClockPort {
    /// Nanoseconds since an arbitrary fixed origin.
    fn now_ns(&self) -> u64;
}

/// Everything a sequence can touch.
///
/// Blanket-implemented, so any adapter (or combination, see
/// [`Board`](crate::adapters::board::Board)) that provides the five ports
/// can be handed to [`Sequencer::run`](super::service::Sequencer::run).
pub trait Hardware: GpioPort + RegulatorPort + PinctrlPort + DelayPort + ClockPort {}

impl<T> Hardware for T where T: GpioPort + RegulatorPort + PinctrlPort + DelayPort + ClockPort {}

// ───────────────────────────────────────────────────────────────
// Event sink port
// ───────────────────────────────────────────────────────────────

/// The sequencer emits structured [`SequencerEvent`]s through this port.
/// Adapters decide where they go (serial log, trace buffer, test capture).
pub trait EventSink {
    fn emit(&mut self, event: &SequencerEvent<'_>);
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &SequencerEvent<'_>) {}
}
