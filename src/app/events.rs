//! Outbound sequencer events.
//!
//! The [`Sequencer`](super::service::Sequencer) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, trace capture, tests).

use crate::error::{BuildError, PortError};
use crate::sequence::action::{Action, ActionSummary};
use crate::sequence::timer::TimerReport;

/// Structured events emitted by the sequencer.
#[derive(Debug, Clone)]
pub enum SequencerEvent<'a> {
    /// A sequence was built for the first time.
    Built {
        sequence: &'a str,
        actions: &'a [Action],
        summary: ActionSummary,
        /// Whether the adapter should dump every action.
        dump: bool,
    },

    /// The description was missing or malformed; the sequence is a no-op.
    Degenerate {
        sequence: &'a str,
        reason: &'a BuildError,
    },

    /// An entry failed to parse; the sequence is a no-op from now on.
    BuildAborted {
        sequence: &'a str,
        reason: &'a BuildError,
    },

    /// A timer was waited on.
    TimerChecked(&'a TimerReport),

    /// A port operation failed while executing; later actions still ran.
    ActionFailed {
        sequence: &'a str,
        index: usize,
        action: &'a Action,
        error: PortError,
    },
}
