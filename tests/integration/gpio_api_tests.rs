//! Named GPIO helper tests.

use panelseq::adapters::sim::{SimBoard, SimOp};
use panelseq::error::{GpioError, PortError, TreeError};
use panelseq::gpio;

use crate::support::board;

#[test]
fn resolves_lines_through_controller_base() {
    let tree = board();
    assert_eq!(gpio::get_gpio_by_name(&tree, "gpio_lcd_en"), Ok(45));
    assert_eq!(gpio::get_gpio_by_name(&tree, "gpio_lcd_rst"), Ok(46));
}

#[test]
fn unknown_property_is_a_lookup_error() {
    let tree = board();
    assert_eq!(
        gpio::get_gpio_by_name(&tree, "gpio_bl_en"),
        Err(GpioError::Lookup(TreeError::PropertyNotFound("gpio_bl_en".into())))
    );
}

#[test]
fn active_level_follows_polarity() {
    let tree = board();
    let mut hw = SimBoard::new();

    hw.set_level(45, true);
    hw.set_level(46, true);
    assert_eq!(gpio::get_active(&tree, &mut hw, "gpio_lcd_en"), Ok(true));
    assert_eq!(gpio::get_active(&tree, &mut hw, "gpio_lcd_rst"), Ok(false));

    hw.set_level(46, false);
    assert_eq!(gpio::get_value(&tree, &mut hw, "gpio_lcd_rst"), Ok(false));
    assert_eq!(gpio::get_active(&tree, &mut hw, "gpio_lcd_rst"), Ok(true));
}

#[test]
fn unread_line_reports_port_error() {
    let tree = board();
    let mut hw = SimBoard::new();
    assert_eq!(
        gpio::get_value(&tree, &mut hw, "gpio_lcd_en"),
        Err(GpioError::Port(PortError::GpioUnknownLine(45)))
    );
}

#[test]
fn set_value_claims_drives_and_releases() {
    let tree = board();
    let mut hw = SimBoard::new();
    gpio::set_value(&tree, &mut hw, "gpio_lcd_rst", true).unwrap();
    gpio::set_value(&tree, &mut hw, "gpio_lcd_rst", false).unwrap();
    assert_eq!(
        hw.trace(),
        &[
            SimOp::GpioRequest { line: 46, high: true },
            SimOp::GpioFree { line: 46 },
            SimOp::GpioRequest { line: 46, high: false },
            SimOp::GpioFree { line: 46 },
        ]
    );
    assert_eq!(gpio::get_value(&tree, &mut hw, "gpio_lcd_rst"), Ok(false));
    assert!(!hw.is_claimed(46));
}
