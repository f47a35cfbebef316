//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured sequencer events through
//! the `log` facade (which the host binary routes to stderr).

use log::{debug, error, info, warn};

use crate::app::events::SequencerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`SequencerEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SequencerEvent<'_>) {
        match event {
            SequencerEvent::Built {
                sequence,
                actions,
                summary,
                dump,
            } => {
                info!("BUILD | {} | {}", sequence, summary);
                if *dump {
                    for (i, action) in actions.iter().enumerate() {
                        match &action.desc {
                            Some(desc) => info!("BUILD | {} | [{:2}] {} ({})", sequence, i, action, desc),
                            None => info!("BUILD | {} | [{:2}] {}", sequence, i, action),
                        }
                    }
                }
            }
            SequencerEvent::Degenerate { sequence, reason } => {
                warn!("BUILD | {} | degenerate: {}", sequence, reason);
            }
            SequencerEvent::BuildAborted { sequence, reason } => {
                error!("BUILD | {} | aborted: {}", sequence, reason);
            }
            SequencerEvent::TimerChecked(report) => {
                debug!("TIMER | {}", report);
            }
            SequencerEvent::ActionFailed {
                sequence,
                index,
                action,
                error,
            } => {
                warn!("RUN   | {} | [{:2}] {} failed: {}", sequence, index, action, error);
            }
        }
    }
}
