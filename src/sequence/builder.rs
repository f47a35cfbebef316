//! Sequence builder: description section → ordered action list.
//!
//! Expected description layout:
//!
//! ```text
//!   decon_board = <&panel>;
//!   panel: panel {
//!       compatible = "simple-bus";
//!       pinctrl-names = "pin_off", "pin_on";
//!       gpio_lcd_en = <&gpf1 5 0x1>;
//!
//!       lcd_on {
//!           type = "regulator,enable", "ldo1",
//!                  "gpio,high",        "gpio_lcd_en",
//!                  "delay,usleep",     "10000 11000",
//!                  "pinctrl",          "pin_on",
//!                  "delay,msleep",     "30";
//!           desc = "vci", "reset", "settle", "pins", "power-on wait";
//!       };
//!   };
//! ```

use log::{info, warn};

use crate::app::ports::{PinctrlPort, RegulatorPort};
use crate::config::SequencerConfig;
use crate::devtree::{Device, DeviceTree, NodeId};
use crate::error::BuildError;

use super::action::{Action, Category};
use super::parser::ActionParser;
use super::timer::TimerRegistry;

const TYPE_PROP: &str = "type";
const DESC_PROP: &str = "desc";

/// Locate the section `name` for `device`.
///
/// The board property is read from the device's own description node, or
/// from the first node that carries it when the device has none.
pub fn find_section(
    tree: &DeviceTree,
    config: &SequencerConfig,
    device: &Device,
    name: &str,
) -> Result<NodeId, BuildError> {
    let prop = config.board_property.as_str();
    let holder = device
        .of_node
        .or_else(|| tree.find_node_with_property(prop))
        .ok_or(BuildError::NoBoardProperty)?;
    let container = tree
        .parse_phandle(holder, prop, 0)
        .ok_or(BuildError::NoContainer)?;
    tree.node(container)
        .children()
        .iter()
        .copied()
        .find(|&child| tree.node(child).name() == name)
        .ok_or_else(|| BuildError::NoSection(name.to_owned()))
}

/// Parse every entry of the section `name` into actions, in source order.
///
/// On the first entry that fails to parse, resources already acquired by
/// earlier entries are released and the error is returned.  An empty
/// result (every entry skipped) is returned as is; the registry turns it
/// into the placeholder.
pub fn build<H>(
    tree: &DeviceTree,
    hw: &mut H,
    timers: &mut TimerRegistry,
    config: &SequencerConfig,
    device: &Device,
    name: &str,
) -> Result<Vec<Action>, BuildError>
where
    H: RegulatorPort + PinctrlPort,
{
    let section = find_section(tree, config, device, name).inspect_err(|e| {
        warn!("{}: {}, so create dummy", name, e);
    })?;
    let container = tree.node(section).parent().ok_or(BuildError::NoContainer)?;

    let count = tree.count_strings(section, TYPE_PROP).unwrap_or(0);
    if count == 0 || count % 2 != 0 {
        info!("{} node type count {} invalid", name, count);
        return Err(BuildError::BadTypeList { count });
    }
    let entries = count / 2;
    let has_desc = tree.count_strings(section, DESC_PROP).ok() == Some(entries);

    let mut actions: Vec<Action> = Vec::with_capacity(entries);
    let mut parser = ActionParser::new(tree, container, &mut *hw, &mut *timers);

    for i in 0..entries {
        let (Ok(type_str), Ok(arg)) = (
            tree.read_string_index(section, TYPE_PROP, i * 2),
            tree.read_string_index(section, TYPE_PROP, i * 2 + 1),
        ) else {
            return Err(BuildError::BadTypeList { count });
        };

        if !config.panel_present && !Category::from_type(type_str).is_timing() {
            info!("panel not present, so skip {}: {:2}: {}", name, i, type_str);
            continue;
        }

        let desc = if has_desc {
            tree.read_string_index(section, DESC_PROP, i).ok()
        } else {
            None
        };

        match parser.parse(type_str, arg, desc) {
            Ok(action) => actions.push(action),
            Err(error) => {
                warn!("{}: entry {} ({} {}) failed: {}", name, i, type_str, arg, error);
                drop(parser);
                for action in &actions {
                    action.release(&mut *hw);
                }
                return Err(BuildError::Entry { index: i, error });
            }
        }
    }

    Ok(actions)
}
