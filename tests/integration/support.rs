//! Shared board description and event capture for integration tests.

use panelseq::app::events::SequencerEvent;
use panelseq::app::ports::EventSink;
use panelseq::{Device, DeviceTree};

/// Board with one panel (`panel`, phandle 1) and an alternative panel
/// (`panel_b`, phandle 3) that `decon_board` can be repointed to.
pub const BOARD: &str = r#"{
    "name": "",
    "children": [
        {"name": "decon", "properties": {
            "decon_board": {"phandles": [1]},
            "two_refs": {"phandles": [1, 3]}
        }},
        {"name": "gpf1", "phandle": 2, "properties": {"gpio-base": {"cells": [40]}}},
        {"name": "panel", "phandle": 1, "properties": {
            "compatible": {"strings": ["simple-bus"]},
            "pinctrl-names": {"strings": ["pin_off", "pin_on", "pin_sleep"]},
            "gpio_lcd_en": {"gpios": [{"controller": 2, "pin": 5}]},
            "gpio_lcd_rst": {"gpios": [{"controller": 2, "pin": 6, "flags": 1}]}
        }, "children": [
            {"name": "lcd_on", "properties": {
                "type": {"strings": ["regulator,enable", "ldo1",
                                     "gpio,high", "gpio_lcd_en",
                                     "delay,usleep", "10000 11000",
                                     "pinctrl", "pin_on",
                                     "delay,msleep", "30"]},
                "desc": {"strings": ["vci", "enable", "settle", "pins", "power-on wait"]}
            }},
            {"name": "lcd_off", "properties": {
                "type": {"strings": ["pinctrl", "pin_off",
                                     "gpio,low", "gpio_lcd_en",
                                     "regulator,disable", "ldo1"]}
            }},
            {"name": "lcd_sleep", "properties": {"type": {"strings": ["pinctrl", "pin_sleep"]}}},
            {"name": "lcd_init", "properties": {"type": {"strings": ["timer,start", "loading 300"]}}},
            {"name": "bl_on", "properties": {"type": {"strings": ["timer,delay", "loading"]}}},
            {"name": "tm_clear", "properties": {"type": {"strings": ["timer,clear", "loading"]}}},
            {"name": "bad_odd", "properties": {"type": {"strings": ["delay,msleep", "30", "gpio,high"]}}},
            {"name": "bad_usleep", "properties": {"type": {"strings": ["delay,usleep", "20000"]}}},
            {"name": "bad_unknown", "properties": {"type": {"strings": ["led,on", "1"]}}},
            {"name": "bad_pin_state", "properties": {"type": {"strings": ["pinctrl", "pin_dim"]}}},
            {"name": "bad_pin_late", "properties": {"type": {"strings": ["regulator,enable", "ldo1",
                                                                     "pinctrl", "pin_on",
                                                                     "pinctrl", "bogus"]}}},
            {"name": "many_timers", "properties": {"type": {"strings": [
                "timer,clear", "t0", "timer,clear", "t1", "timer,clear", "t2",
                "timer,clear", "t3", "timer,clear", "t4", "timer,clear", "t5",
                "timer,clear", "t6", "timer,clear", "t7", "timer,clear", "t8"
            ]}}}
        ]},
        {"name": "panel_b", "phandle": 3, "children": [
            {"name": "lcd_on", "properties": {"type": {"strings": ["delay,msleep", "50"]}}},
            {"name": "lcd_pins", "properties": {"type": {"strings": ["regulator,enable", "ldo1",
                                                                "pinctrl", "pin_on"]}}}
        ]}
    ]
}"#;

pub const MS: u64 = 1_000_000;

pub fn board() -> DeviceTree {
    DeviceTree::from_json(BOARD).expect("board description parses")
}

pub fn panel() -> Device {
    Device::new("panel", None)
}

/// Owned copy of an emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Built { sequence: String, actions: usize, summary: String },
    Degenerate { sequence: String },
    Aborted { sequence: String },
    TimerChecked(String),
    ActionFailed { sequence: String, index: usize },
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Recorded>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builds(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Recorded::Built { .. }))
            .count()
    }

    pub fn timer_reports(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Recorded::TimerChecked(r) => Some(r.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SequencerEvent<'_>) {
        let recorded = match event {
            SequencerEvent::Built {
                sequence,
                actions,
                summary,
                ..
            } => Recorded::Built {
                sequence: (*sequence).to_owned(),
                actions: actions.len(),
                summary: summary.to_string(),
            },
            SequencerEvent::Degenerate { sequence, .. } => Recorded::Degenerate {
                sequence: (*sequence).to_owned(),
            },
            SequencerEvent::BuildAborted { sequence, .. } => Recorded::Aborted {
                sequence: (*sequence).to_owned(),
            },
            SequencerEvent::TimerChecked(report) => Recorded::TimerChecked(report.to_string()),
            SequencerEvent::ActionFailed { sequence, index, .. } => Recorded::ActionFailed {
                sequence: (*sequence).to_owned(),
                index: *index,
            },
        };
        self.events.push(recorded);
    }
}
