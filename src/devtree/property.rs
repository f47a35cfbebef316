//! Property values carried by hardware-description nodes.

use serde::{Deserialize, Serialize};

/// Flag bit in a GPIO specifier: the line is active-low.
pub const GPIO_ACTIVE_LOW: u32 = 0x1;

/// Number of GPIO lines the platform exposes.  Lines at or above this are
/// rejected at resolve time.
pub const MAX_GPIO_LINES: u32 = 512;

/// A typed property value.
///
/// JSON form is externally tagged: `"empty"`, `{"strings": [..]}`,
/// `{"cells": [..]}`, `{"phandles": [..]}`, `{"gpios": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Boolean marker property (`gpio-controller;`).
    Empty,
    /// String list (`type`, `desc`, `pinctrl-names`, `compatible`).
    Strings(Vec<String>),
    /// Plain 32-bit cells (`gpio-base`).
    Cells(Vec<u32>),
    /// Cross-references to other nodes by phandle.
    Phandles(Vec<u32>),
    /// GPIO specifiers `<&controller pin flags>`.
    Gpios(Vec<GpioCell>),
}

impl Property {
    /// Number of references this property holds, the way a phandle-with-args
    /// count sees it.  Non-reference properties hold none.
    pub fn reference_count(&self) -> usize {
        match self {
            Self::Phandles(p) => p.len(),
            Self::Gpios(g) => g.len(),
            _ => 0,
        }
    }
}

/// One GPIO specifier as written in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioCell {
    /// Phandle of the GPIO controller node.
    pub controller: u32,
    /// Pin offset within the controller.
    pub pin: u32,
    #[serde(default)]
    pub flags: u32,
}

/// A GPIO specifier resolved to a global line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioSpec {
    pub line: u32,
    pub active_low: bool,
}

impl GpioSpec {
    /// Raw level that means "asserted" for this line.
    pub fn active_level(&self) -> bool {
        !self.active_low
    }
}
