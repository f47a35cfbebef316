//! Panel power-sequencing library.
//!
//! Interprets power-on/off sequences declared in a hardware description
//! and replays them against the board through port traits.  The pure
//! sequencing logic lives in [`sequence`] and [`app`]; [`adapters`]
//! provides the simulated, `embedded-hal` and host-time implementations.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod devtree;
pub mod error;
pub mod gpio;
pub mod sequence;

pub use app::service::Sequencer;
pub use config::SequencerConfig;
pub use devtree::{Device, DeviceTree};
