//! Cross-sequence timer tests.

use panelseq::adapters::sim::{SimBoard, SimOp};
use panelseq::{Sequencer, SequencerConfig};

use crate::support::{board, panel, RecordingSink, MS};

fn setup() -> (panelseq::DeviceTree, SimBoard, Sequencer, RecordingSink) {
    let tree = board();
    let hw = SimBoard::from_tree(&tree);
    (tree, hw, Sequencer::new(SequencerConfig::default()), RecordingSink::new())
}

#[test]
fn wait_blocks_for_the_remainder_only() {
    let (tree, mut hw, mut seq, mut sink) = setup();

    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    hw.advance_ms(290);
    seq.run(&tree, &mut hw, &mut sink, &panel(), "bl_on").unwrap();

    assert_eq!(
        hw.trace(),
        &[SimOp::SleepRange { min_us: 10_000, max_us: 15_000 }]
    );
    assert_eq!(hw.now_ns(), 300 * MS);
    assert_eq!(
        sink.timer_reports(),
        vec!["loading: delay: 300, 0.000000 - 0.290000 = 0.290000, remain: 0.010000"]
    );
}

#[test]
fn wait_clears_so_next_wait_is_full() {
    let (tree, mut hw, mut seq, mut sink) = setup();

    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    hw.advance_ms(290);
    seq.run(&tree, &mut hw, &mut sink, &panel(), "bl_on").unwrap();
    assert!(!seq.timer("loading").unwrap().is_armed());

    hw.clear_trace();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "bl_on").unwrap();
    assert_eq!(hw.trace(), &[SimOp::Sleep { ms: 300 }]);
}

#[test]
fn same_name_is_the_same_timer() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "tm_clear").unwrap();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "bl_on").unwrap();

    assert_eq!(seq.timers().len(), 1);
    assert_eq!(seq.timer("loading").unwrap().delay_ms, 300);
}

#[test]
fn wait_after_deadline_does_not_block() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    hw.advance_ms(400);
    seq.run(&tree, &mut hw, &mut sink, &panel(), "bl_on").unwrap();

    assert!(hw.trace().is_empty());
    assert_eq!(hw.now_ns(), 400 * MS);
    assert!(sink.timer_reports()[0].ends_with("remain: -0.100000"));
}

#[test]
fn clear_disarms_pending_deadline() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    hw.advance_ms(100);
    seq.run(&tree, &mut hw, &mut sink, &panel(), "tm_clear").unwrap();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "bl_on").unwrap();
    assert_eq!(hw.trace(), &[SimOp::Sleep { ms: 300 }]);
}

#[test]
fn long_remainder_uses_msleep() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    hw.advance_ms(50);
    seq.run(&tree, &mut hw, &mut sink, &panel(), "bl_on").unwrap();
    assert_eq!(hw.trace(), &[SimOp::Sleep { ms: 250 }]);
}

#[test]
fn restart_rearms_from_new_start() {
    let (tree, mut hw, mut seq, mut sink) = setup();
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    hw.advance_ms(1_000);
    seq.run(&tree, &mut hw, &mut sink, &panel(), "lcd_init").unwrap();
    let t = seq.timer("loading").unwrap();
    assert_eq!(t.start_ns, 1_000 * MS);
    assert_eq!(t.deadline_ns, 1_300 * MS);
}
