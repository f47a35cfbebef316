//! Named GPIO helpers.
//!
//! Look up a GPIO by the name of the property that references it, wherever
//! that property lives in the description, and read or drive the line.
//! Lines are claimed only for the duration of a single write.

use log::{debug, warn};

use crate::app::ports::GpioPort;
use crate::devtree::{DeviceTree, GpioSpec};
use crate::error::{GpioError, TreeError};

fn lookup(tree: &DeviceTree, prop: &str) -> Result<GpioSpec, GpioError> {
    let node = tree.find_node_with_property(prop).ok_or_else(|| {
        warn!("{} property not found", prop);
        TreeError::PropertyNotFound(prop.to_owned())
    })?;
    let spec = tree.named_gpio(node, prop, 0).inspect_err(|e| {
        warn!("{} gpio invalid: {}", prop, e);
    })?;
    debug!("{} is gpio {}{}", prop, spec.line, if spec.active_low { " (active low)" } else { "" });
    Ok(spec)
}

/// Resolve `prop` to a line number without touching the hardware.
pub fn get_gpio_by_name(tree: &DeviceTree, prop: &str) -> Result<u32, GpioError> {
    lookup(tree, prop).map(|spec| spec.line)
}

/// Raw level of the line referenced by `prop`.
pub fn get_value(tree: &DeviceTree, hw: &mut impl GpioPort, prop: &str) -> Result<bool, GpioError> {
    let spec = lookup(tree, prop)?;
    Ok(hw.get_value(spec.line)?)
}

/// Whether the line referenced by `prop` is at its active level, honouring
/// the active-low flag of the reference.
pub fn get_active(tree: &DeviceTree, hw: &mut impl GpioPort, prop: &str) -> Result<bool, GpioError> {
    let spec = lookup(tree, prop)?;
    let level = hw.get_value(spec.line)?;
    Ok(level == spec.active_level())
}

/// Drive the line referenced by `prop` to `value`: claim, drive, release.
pub fn set_value(tree: &DeviceTree, hw: &mut impl GpioPort, prop: &str, value: bool) -> Result<(), GpioError> {
    let spec = lookup(tree, prop)?;
    let result = hw.request_output(spec.line, value);
    hw.free(spec.line);
    result.inspect_err(|e| warn!("gpio {} request failed: {}", spec.line, e))?;
    Ok(())
}
