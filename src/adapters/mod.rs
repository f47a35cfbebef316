//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements             | Connects to                    |
//! |------------|------------------------|--------------------------------|
//! | `sim`      | GpioPort, RegulatorPort| In-memory board, virtual clock |
//! |            | PinctrlPort, DelayPort |                                |
//! |            | ClockPort              |                                |
//! | `hal`      | GpioPort               | `embedded-hal` pins            |
//! |            | DelayPort, ClockPort   | `embedded-hal` delay           |
//! | `time`     | DelayPort, ClockPort   | Host monotonic clock           |
//! | `board`    | all of the above       | IO adapter + time adapter      |
//! | `log_sink` | EventSink              | `log` output                   |

pub mod board;
pub mod hal;
pub mod log_sink;
pub mod sim;
pub mod time;
