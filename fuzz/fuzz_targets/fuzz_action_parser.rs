//! Fuzz target: action argument parsers and the full entry parser
//!
//! Splits the input into a type string and an argument and verifies:
//! - No panics under arbitrary UTF-8 input
//! - Accepted usleep ranges are non-empty, ordered and below 20ms
//! - Accepted timer starts are at least 20ms
//! - A failed entry never leaves a regulator or pin-control binding held
//!
//! cargo fuzz run fuzz_action_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use panelseq::adapters::sim::SimBoard;
use panelseq::devtree::DeviceTree;
use panelseq::sequence::parser::{
    parse_delay_ms, parse_timer_start, parse_usleep_range, ActionParser, SMALL_MSECS,
};
use panelseq::sequence::timer::TimerRegistry;

const BOARD: &str = r#"{
    "name": "",
    "children": [
        {"name": "gpf1", "phandle": 2, "properties": {"gpio-base": {"cells": [40]}}},
        {"name": "panel", "phandle": 1, "properties": {
            "compatible": {"strings": ["simple-bus"]},
            "pinctrl-names": {"strings": ["pin_off", "pin_on"]},
            "gpio_lcd_en": {"gpios": [{"controller": 2, "pin": 5}]}
        }}
    ]
}"#;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let (type_str, arg) = input.split_once('\0').unwrap_or(("delay,usleep", input));

    if let Ok((min, max)) = parse_usleep_range(arg) {
        assert!(min > 0 && min <= max && min < SMALL_MSECS * 1_000);
    }
    if let Ok((_, ms)) = parse_timer_start(arg) {
        assert!(ms >= SMALL_MSECS);
    }
    let _ = parse_delay_ms(arg);

    let tree = DeviceTree::from_json(BOARD).expect("fixture parses");
    let panel = tree.find_node_by_name(None, "panel").expect("panel node");
    let mut hw = SimBoard::from_tree(&tree);
    let mut timers = TimerRegistry::new();
    let mut parser = ActionParser::new(&tree, panel, &mut hw, &mut timers);
    if parser.parse(type_str, arg, None).is_err() {
        drop(parser);
        assert_eq!(hw.regulators_held(), 0);
        assert_eq!(hw.pinctrl_held(), 0);
    }
});
