//! Sequencer service: the hexagonal core.
//!
//! [`Sequencer`] owns the sequence and timer registries for one device.  A
//! sequence is built lazily on its first run and replayed on every later
//! run.  All I/O flows through port traits injected at call sites, making
//! the whole service testable against the simulated board.
//!
//! ```text
//!  DeviceTree ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                 │          Sequencer           │
//!   Hardware ◀──▶ │  build · registry · execute  │
//!                 └─────────────────────────────┘
//! ```

use log::{debug, error, info, warn};

use crate::config::SequencerConfig;
use crate::devtree::{Device, DeviceTree};
use crate::error::{BuildError, Fatal, ParseError};
use crate::sequence::builder;
use crate::sequence::executor;
use crate::sequence::registry::{Sequence, SequenceRegistry};
use crate::sequence::timer::{Timer, TimerRegistry};

use super::events::SequencerEvent;
use super::ports::{EventSink, Hardware};

// ───────────────────────────────────────────────────────────────
// Sequencer
// ───────────────────────────────────────────────────────────────

/// Per-device sequencing state.
///
/// Every mutating entry point takes `&mut self`; callers that share one
/// instance between threads wrap it in a mutex.
pub struct Sequencer {
    config: SequencerConfig,
    sequences: SequenceRegistry,
    timers: TimerRegistry,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            sequences: SequenceRegistry::new(),
            timers: TimerRegistry::new(),
        }
    }

    /// Run the sequence `name` for `device`, building it first if needed.
    ///
    /// A sequence whose description is missing or malformed degrades to a
    /// no-op and `Ok` is returned.  An entry that fails to parse also leaves
    /// the no-op behind (later runs do not retry), but is reported as
    /// [`Fatal::BuildAborted`].  Port failures during execution are logged
    /// and emitted; they do not fail the run.
    pub fn run<H, S>(
        &mut self,
        tree: &DeviceTree,
        hw: &mut H,
        sink: &mut S,
        device: &Device,
        name: &str,
    ) -> Result<(), Fatal>
    where
        H: Hardware,
        S: EventSink,
    {
        let sequence = self.sequences.find_or_create(name).inspect_err(|e| {
            error!("{}: {}", name, e);
        })?;

        if !sequence.is_built() {
            match builder::build(tree, hw, &mut self.timers, &self.config, device, name) {
                Ok(actions) => {
                    sequence.install(actions);
                    let summary = sequence.summary();
                    info!("{}: built, {}", name, summary);
                    sink.emit(&SequencerEvent::Built {
                        sequence: name,
                        actions: sequence.actions(),
                        summary,
                        dump: self.config.dump_on_build,
                    });
                }
                Err(reason @ BuildError::Entry { .. }) => {
                    sequence.install_degenerate();
                    error!("{}: {}", name, reason);
                    sink.emit(&SequencerEvent::BuildAborted {
                        sequence: name,
                        reason: &reason,
                    });
                    if matches!(
                        reason,
                        BuildError::Entry {
                            error: ParseError::TimerRegistryFull,
                            ..
                        }
                    ) {
                        return Err(Fatal::TimerRegistryFull);
                    }
                    return Err(Fatal::BuildAborted {
                        sequence: name.to_owned(),
                        error: reason,
                    });
                }
                Err(reason) => {
                    sequence.install_degenerate();
                    warn!("{}: {}, so create dummy", name, reason);
                    sink.emit(&SequencerEvent::Degenerate {
                        sequence: name,
                        reason: &reason,
                    });
                }
            }
        }

        if sequence.is_degenerate() {
            debug!("{}: nothing to run", name);
            return Ok(());
        }

        debug!("{}: run {} actions", name, sequence.actions().len());
        executor::execute(name, sequence.actions(), &mut self.timers, hw, sink);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(name)
    }

    pub fn sequences(&self) -> &SequenceRegistry {
        &self.sequences
    }

    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.timers.by_name(name)
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }
}
