//! Reference repointing tests.

use panelseq::adapters::sim::{SimBoard, SimOp};
use panelseq::error::TreeError;
use panelseq::{Sequencer, SequencerConfig};

use crate::support::{board, panel, RecordingSink};

#[test]
fn repointed_board_property_selects_other_panel() {
    let mut tree = board();
    assert_eq!(tree.update_phandle_property("decon_board", "panel_b"), Ok((1, 3)));

    let mut hw = SimBoard::from_tree(&tree);
    let mut seq = Sequencer::new(SequencerConfig::default());
    seq.run(&tree, &mut hw, &mut RecordingSink::new(), &panel(), "lcd_on")
        .unwrap();
    assert_eq!(hw.trace(), &[SimOp::Sleep { ms: 50 }]);
}

#[test]
fn repointing_to_current_target_is_rejected() {
    let mut tree = board();
    assert_eq!(
        tree.update_phandle_property("decon_board", "panel"),
        Err(TreeError::SameReference(1))
    );
}

#[test]
fn target_must_exist_and_be_referenceable() {
    let mut tree = board();
    assert_eq!(
        tree.update_phandle_property("decon_board", "panel_z"),
        Err(TreeError::NodeNotFound("panel_z".into()))
    );
    assert_eq!(
        tree.update_phandle_property("decon_board", "decon"),
        Err(TreeError::NoPhandle("decon".into()))
    );
}

#[test]
fn property_must_hold_exactly_one_reference() {
    let mut tree = board();
    assert_eq!(
        tree.update_phandle_property("two_refs", "panel_b"),
        Err(TreeError::NotSingleReference {
            property: "two_refs".into(),
            count: 2,
        })
    );
    assert_eq!(
        tree.update_phandle_property("no_such_ref", "panel_b"),
        Err(TreeError::PropertyNotFound("no_such_ref".into()))
    );
}

#[test]
fn failed_update_leaves_tree_untouched() {
    let mut tree = board();
    let _ = tree.update_phandle_property("decon_board", "panel_z");
    let decon = tree.find_node_with_property("decon_board").unwrap();
    let panel = tree.find_node_by_name(None, "panel").unwrap();
    assert_eq!(tree.parse_phandle(decon, "decon_board", 0), Some(panel));
}
