//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the simulated board.  All tests run on the host with no real
//! hardware required.

mod gpio_api_tests;
mod phandle_tests;
mod sequencer_tests;
mod support;
mod timer_tests;
