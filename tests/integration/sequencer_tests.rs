//! Sequencer integration tests.
//!
//! Build-on-first-run, ordered replay, degenerate sequences and the fatal
//! conditions, all against the simulated board.

use panelseq::adapters::sim::{SimBoard, SimOp};
use panelseq::error::{BuildError, Fatal, ParseError, PortError};
use panelseq::sequence::action::ActionKind;
use panelseq::sequence::registry::MAX_SEQUENCES;
use panelseq::{Sequencer, SequencerConfig};

use crate::support::{board, panel, Recorded, RecordingSink, MS};

fn setup() -> (panelseq::DeviceTree, SimBoard, Sequencer, RecordingSink) {
    let tree = board();
    let hw = SimBoard::from_tree(&tree);
    (tree, hw, Sequencer::new(SequencerConfig::default()), RecordingSink::new())
}

fn power_on_trace() -> Vec<SimOp> {
    vec![
        SimOp::RegulatorEnable { supply: "ldo1".into() },
        SimOp::GpioRequest { line: 45, high: true },
        SimOp::GpioFree { line: 45 },
        SimOp::SleepRange { min_us: 10_000, max_us: 11_000 },
        SimOp::PinctrlSelect {
            device: "panel".into(),
            state: "pin_on".into(),
        },
        SimOp::Sleep { ms: 30 },
    ]
}

// ── Build and replay ──────────────────────────────────────────

#[test]
fn power_on_builds_five_actions_in_order() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on").unwrap();

    let kinds: Vec<_> = seq
        .sequence("lcd_on")
        .unwrap()
        .actions()
        .iter()
        .map(|a| a.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::RegulatorEnable,
            ActionKind::GpioHigh,
            ActionKind::DelayUsleepRange,
            ActionKind::PinctrlSelect,
            ActionKind::DelaySleepMs,
        ]
    );
    assert_eq!(hw.trace(), power_on_trace().as_slice());
    assert_eq!(
        sink.events[0],
        Recorded::Built {
            sequence: "lcd_on".into(),
            actions: 5,
            summary: "gpio: 1, regulator: 1, delay: 2, pinctrl: 1, timer: 0".into(),
        }
    );
}

#[test]
fn second_run_replays_without_rebuilding() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on").unwrap();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on").unwrap();

    assert_eq!(sink.builds(), 1);
    let mut twice = power_on_trace();
    twice.extend(power_on_trace());
    assert_eq!(hw.trace(), twice.as_slice());
    // Resources were acquired once, at build time.
    assert_eq!(hw.regulators_held(), 1);
    assert_eq!(hw.pinctrl_held(), 1);
}

#[test]
fn power_off_after_power_on() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on").unwrap();
    assert!(hw.regulator_enabled("ldo1"));

    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_off").unwrap();
    assert!(!hw.regulator_enabled("ldo1"));
    assert_eq!(hw.level(45), Some(false));
    assert_eq!(hw.active_state("panel"), Some("pin_off"));
    assert!(!hw.is_claimed(45));
}

#[test]
fn later_pinctrl_selection_supersedes_earlier() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on").unwrap();
    assert_eq!(hw.active_state("panel"), Some("pin_on"));
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_sleep").unwrap();
    assert_eq!(hw.active_state("panel"), Some("pin_sleep"));
}

#[test]
fn no_panel_runs_only_timing_entries() {
    let tree = board();
    let mut hw = SimBoard::from_tree(&tree);
    let mut sink = RecordingSink::new();
    let mut seq = Sequencer::new(SequencerConfig {
        panel_present: false,
        ..SequencerConfig::default()
    });
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on").unwrap();
    assert_eq!(
        hw.trace(),
        &[
            SimOp::SleepRange { min_us: 10_000, max_us: 11_000 },
            SimOp::Sleep { ms: 30 },
        ]
    );
    assert_eq!(hw.regulators_held(), 0);

    // Nothing but hardware entries: built, but a no-op.
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_sleep").unwrap();
    assert!(seq.sequence("lcd_sleep").unwrap().is_degenerate());
    assert_eq!(hw.trace().len(), 2);
}

// ── Degenerate sequences ──────────────────────────────────────

#[test]
fn odd_type_list_degrades_to_no_op() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    assert!(seq.run(&tree, &mut hw, &mut sink, &panel(), "bad_odd").is_ok());
    assert!(seq.run(&tree, &mut hw, &mut sink, &panel(), "bad_odd").is_ok());

    let s = seq.sequence("bad_odd").unwrap();
    assert_eq!(s.actions().len(), 1);
    assert!(s.is_degenerate());
    assert!(hw.trace().is_empty());
    // Built once, never retried.
    assert_eq!(
        sink.events,
        vec![Recorded::Degenerate {
            sequence: "bad_odd".into()
        }]
    );
}

#[test]
fn missing_section_degrades_to_no_op() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    assert!(seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_doze").is_ok());
    assert!(seq.sequence("lcd_doze").unwrap().is_degenerate());
    assert!(hw.trace().is_empty());
}

#[test]
fn missing_board_property_degrades_to_no_op() {
    let tree = board();
    let mut hw = SimBoard::from_tree(&tree);
    let mut seq = Sequencer::new(SequencerConfig {
        board_property: "dsim_board".into(),
        ..SequencerConfig::default()
    });
    assert!(seq.run(&tree, &mut hw, &mut RecordingSink::new(), &panel(), "lcd_on").is_ok());
    assert!(seq.sequence("lcd_on").unwrap().is_degenerate());
    assert!(hw.trace().is_empty());
}

// ── Aborted builds ────────────────────────────────────────────

#[test]
fn parse_failure_aborts_once() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    let err = seq
        .run(&tree, &mut hw, &mut sink, &panel(), "bad_usleep")
        .unwrap_err();
    assert_eq!(
        err,
        Fatal::BuildAborted {
            sequence: "bad_usleep".into(),
            error: BuildError::Entry {
                index: 0,
                error: ParseError::RangeTooLong(20_000),
            },
        }
    );
    assert!(seq.run(&tree, &mut hw, &mut sink, &panel(), "bad_usleep").is_ok());
    assert!(hw.trace().is_empty());
    assert_eq!(
        sink.events,
        vec![Recorded::Aborted {
            sequence: "bad_usleep".into()
        }]
    );
}

#[test]
fn unknown_type_aborts() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    let err = seq
        .run(&tree, &mut hw, &mut sink, &panel(), "bad_unknown")
        .unwrap_err();
    assert!(matches!(
        err,
        Fatal::BuildAborted {
            error: BuildError::Entry {
                error: ParseError::UnknownType(_),
                ..
            },
            ..
        }
    ));
}

#[test]
fn unresolvable_regulator_aborts_and_releases_nothing() {
    let tree = board();
    let mut hw = SimBoard::from_tree(&tree).with_regulators(&["ldo2"]);
    let mut seq = Sequencer::new(SequencerConfig::default());
    let err = seq
        .run(&tree, &mut hw, &mut RecordingSink::new(), &panel(), "lcd_on")
        .unwrap_err();
    assert!(matches!(err, Fatal::BuildAborted { .. }));
    assert_eq!(hw.regulators_held(), 0);
    assert!(hw.trace().is_empty());
}

fn pinctrl_abort(tree: &panelseq::DeviceTree, name: &str) -> (Fatal, SimBoard) {
    let mut hw = SimBoard::from_tree(tree);
    let mut seq = Sequencer::new(SequencerConfig::default());
    let err = seq
        .run(tree, &mut hw, &mut RecordingSink::new(), &panel(), name)
        .unwrap_err();
    assert!(seq.sequence(name).unwrap().is_degenerate());
    assert_eq!(hw.pinctrl_held(), 0);
    assert_eq!(hw.regulators_held(), 0);
    assert!(hw.trace().is_empty());
    (err, hw)
}

#[test]
fn unknown_pin_state_aborts_and_gives_binding_back() {
    let (err, _) = pinctrl_abort(&board(), "bad_pin_state");
    assert_eq!(
        err,
        Fatal::BuildAborted {
            sequence: "bad_pin_state".into(),
            error: BuildError::Entry {
                index: 0,
                error: ParseError::Resource(PortError::PinctrlStateNotFound),
            },
        }
    );
}

#[test]
fn pinctrl_on_unbound_container_is_device_not_found() {
    let mut tree = board();
    tree.update_phandle_property("decon_board", "panel_b").unwrap();
    let (err, _) = pinctrl_abort(&tree, "lcd_pins");
    assert_eq!(
        err,
        Fatal::BuildAborted {
            sequence: "lcd_pins".into(),
            error: BuildError::Entry {
                index: 1,
                error: ParseError::Resource(PortError::DeviceNotFound),
            },
        }
    );
}

#[test]
fn late_pinctrl_failure_releases_earlier_bindings() {
    let (err, hw) = pinctrl_abort(&board(), "bad_pin_late");
    assert_eq!(
        err,
        Fatal::BuildAborted {
            sequence: "bad_pin_late".into(),
            error: BuildError::Entry {
                index: 2,
                error: ParseError::Resource(PortError::PinctrlStateNotFound),
            },
        }
    );
    assert_eq!(hw.active_state("panel"), None);
}

// ── Capacity ──────────────────────────────────────────────────

#[test]
fn timer_registry_overflow_is_fatal() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    assert_eq!(
        seq.run(&tree, &mut hw, &mut sink, &panel(), "many_timers"),
        Err(Fatal::TimerRegistryFull)
    );
    assert!(seq.sequence("many_timers").unwrap().is_degenerate());
}

#[test]
fn sequence_registry_overflow_is_fatal() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    for i in 0..MAX_SEQUENCES {
        seq.run(&tree, &mut hw, &mut sink, &panel(), &format!("absent{i}"))
            .unwrap();
    }
    assert_eq!(
        seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on"),
        Err(Fatal::SequenceRegistryFull)
    );
    // Known names still run.
    assert!(seq.run(&tree, &mut hw, &mut sink, &panel(), "absent3").is_ok());
}

// ── Runtime failures ──────────────────────────────────────────

#[test]
fn gpio_failure_is_reported_and_sequence_continues() {
    let tree = board();
    let mut hw = SimBoard::from_tree(&tree).with_failing_gpio(45);
    let mut sink = RecordingSink::new();
    let mut seq = Sequencer::new(SequencerConfig::default());

    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_on").unwrap();
    assert!(sink.events.contains(&Recorded::ActionFailed {
        sequence: "lcd_on".into(),
        index: 1,
    }));
    assert_eq!(hw.trace().last(), Some(&SimOp::Sleep { ms: 30 }));
    assert!(!hw.is_claimed(45));
    assert_eq!(hw.now_ns(), 40 * MS);
}
