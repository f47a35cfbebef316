//! Application core: sequencing logic, zero I/O.
//!
//! The [`service::Sequencer`] builds and replays power sequences.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without a real board.

pub mod events;
pub mod ports;
pub mod service;
