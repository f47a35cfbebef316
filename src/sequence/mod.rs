//! Power sequencing: parse, build, register, execute.
//!
//! ```text
//!   description ──▶ builder ──▶ parser (per entry) ──▶ registry
//!                                                         │
//!   run(name) ────────────────────────────────────▶ executor ──▶ ports
//! ```

pub mod action;
pub mod builder;
pub mod executor;
pub mod parser;
pub mod registry;
pub mod timer;
