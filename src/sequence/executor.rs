//! Sequence executor: replays a resolved action list.
//!
//! Runs strictly in list order and blocks for every delay.  Port failures
//! are logged and reported, and the remaining actions still run.

use log::{debug, warn};

use crate::app::events::SequencerEvent;
use crate::app::ports::{EventSink, Hardware};
use crate::error::PortError;

use super::action::{Action, Op};
use super::parser::SMALL_MSECS;
use super::timer::{TimerRegistry, Wait};

const USEC_PER_MSEC: u32 = 1_000;

/// Execute `actions` against `hw`.
pub fn execute<H, S>(sequence: &str, actions: &[Action], timers: &mut TimerRegistry, hw: &mut H, sink: &mut S)
where
    H: Hardware,
    S: EventSink,
{
    for (index, action) in actions.iter().enumerate() {
        debug!("[{:2}] {}", index, action);
        if let Err(error) = step(action, timers, hw, sink) {
            warn!("{}: [{:2}] {} failed: {}", sequence, index, action, error);
            sink.emit(&SequencerEvent::ActionFailed {
                sequence,
                index,
                action,
                error,
            });
        }
    }
}

fn step<H, S>(action: &Action, timers: &mut TimerRegistry, hw: &mut H, sink: &mut S) -> Result<(), PortError>
where
    H: Hardware,
    S: EventSink,
{
    match &action.op {
        Op::GpioHigh { line } => drive(hw, *line, true),
        Op::GpioLow { line } => drive(hw, *line, false),
        Op::RegulatorEnable { handle } => hw.enable(*handle),
        Op::RegulatorDisable { handle } => hw.disable(*handle),
        Op::DelayMs(ms) => {
            hw.busy_wait_ms(*ms);
            Ok(())
        }
        Op::DelaySleepMs(ms) => {
            hw.sleep_ms(*ms);
            Ok(())
        }
        Op::DelayUsleepRange { min_us, max_us } => {
            hw.sleep_us_range(*min_us, *max_us);
            Ok(())
        }
        Op::PinctrlSelect { pins, state } => hw.select_state(*pins, *state),
        Op::TimerStart(t) => {
            let now = hw.now_ns();
            timers.get_mut(t.id).start(now);
            Ok(())
        }
        Op::TimerWait(t) => {
            let now = hw.now_ns();
            let timer = timers.get_mut(t.id);
            let wait = timer.observe(now);
            sink.emit(&SequencerEvent::TimerChecked(&timer.report()));
            match wait {
                Wait::Full(ms) => hw.sleep_ms(ms),
                Wait::Remaining(us) if us < SMALL_MSECS * USEC_PER_MSEC => {
                    hw.sleep_us_range(us, us + (us >> 1));
                }
                Wait::Remaining(us) => hw.sleep_ms(us / USEC_PER_MSEC),
                Wait::Elapsed => {}
            }
            // A wait always consumes the deadline it waited on.
            timer.clear();
            Ok(())
        }
        Op::TimerClear(t) => {
            timers.get_mut(t.id).clear();
            Ok(())
        }
        Op::Invalid => Ok(()),
    }
}

/// Claim, drive, release.  The claim is never held across actions.
fn drive(hw: &mut impl Hardware, line: u32, high: bool) -> Result<(), PortError> {
    let result = hw.request_output(line, high);
    hw.free(line);
    result
}
