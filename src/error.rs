//! Error types for the sequencing interpreter.
//!
//! Three tiers, mirroring how the panel driver treats failures:
//!
//! 1. [`ParseError`]: an entry of a sequence failed validation or a
//!    resource could not be resolved.  Aborts the current build only.
//! 2. [`BuildError`]: the hardware description itself is malformed or
//!    missing.  The sequence degrades to a single no-op action.
//! 3. [`Fatal`]: a registry overflowed or a build was aborted.  The caller
//!    must stop driving the panel.
//!
//! Runtime port failures ([`PortError`]) are logged and do not stop the
//! remaining actions.

use core::fmt;

// ---------------------------------------------------------------------------
// Port errors (GPIO / regulator / pinctrl subsystems)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortError {
    /// The GPIO line could not be claimed or driven.
    GpioRequestFailed(u32),
    /// The GPIO line is not known to the controller.
    GpioUnknownLine(u32),
    /// No regulator with that supply name exists.
    RegulatorNotFound,
    /// Enable/disable was rejected by the regulator core.
    RegulatorFailed,
    /// No device is bound to the description node.
    DeviceNotFound,
    /// The device has no pin-control binding.
    PinctrlUnavailable,
    /// The named pin-control state does not exist.
    PinctrlStateNotFound,
    /// Applying a pin-control state failed.
    PinctrlSelectFailed,
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioRequestFailed(line) => write!(f, "gpio {line} request failed"),
            Self::GpioUnknownLine(line) => write!(f, "gpio {line} unknown"),
            Self::RegulatorNotFound => write!(f, "regulator not found"),
            Self::RegulatorFailed => write!(f, "regulator operation failed"),
            Self::DeviceNotFound => write!(f, "no device for node"),
            Self::PinctrlUnavailable => write!(f, "pinctrl unavailable"),
            Self::PinctrlStateNotFound => write!(f, "pinctrl state not found"),
            Self::PinctrlSelectFailed => write!(f, "pinctrl select failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Hardware-description errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No node carries the requested property.
    PropertyNotFound(String),
    /// The property exists but has the wrong value type.
    WrongPropertyType(String),
    /// A reference property must hold exactly one phandle.
    NotSingleReference { property: String, count: usize },
    /// The phandle value is zero or resolves to no node.
    DanglingReference(u32),
    /// No node with that name exists.
    NodeNotFound(String),
    /// The node has no phandle and cannot be a reference target.
    NoPhandle(String),
    /// The property already points at the requested node.
    SameReference(u32),
    /// A GPIO specifier resolved to a line outside the valid range.
    InvalidGpioLine(i64),
    /// Index past the end of a list property.
    IndexOutOfRange { property: String, index: usize },
    /// The JSON document could not be decoded.
    Decode(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropertyNotFound(p) => write!(f, "property '{p}' not found"),
            Self::WrongPropertyType(p) => write!(f, "property '{p}' has wrong type"),
            Self::NotSingleReference { property, count } => {
                write!(f, "property '{property}' holds {count} references, expected 1")
            }
            Self::DanglingReference(ph) => write!(f, "phandle {ph} resolves to no node"),
            Self::NodeNotFound(n) => write!(f, "node '{n}' not found"),
            Self::NoPhandle(n) => write!(f, "node '{n}' has no phandle"),
            Self::SameReference(ph) => write!(f, "phandle is unchanged ({ph})"),
            Self::InvalidGpioLine(line) => write!(f, "gpio line {line} is not valid"),
            Self::IndexOutOfRange { property, index } => {
                write!(f, "property '{property}' has no index {index}")
            }
            Self::Decode(msg) => write!(f, "decode: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors (one sequence entry)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The type string names no known action.
    UnknownType(String),
    /// The argument string is empty.
    MissingArgument,
    /// A delay argument must start with a digit.
    NotNumeric(String),
    /// usleep takes one or two values.
    TooManyValues(String),
    /// usleep values must both be non-zero and ordered.
    InvalidRange { min_us: u32, max_us: u32 },
    /// usleep is only for waits under 20ms; use msleep.
    RangeTooLong(u32),
    /// A timer start needs `<name> <delay_ms>`.
    TimerFormat(String),
    /// Timers are only for delays of at least 20ms.
    TimerTooShort(u32),
    /// A timer or sequence name does not fit the fixed-size key.
    NameTooLong(String),
    /// The GPIO reference did not resolve.
    Gpio(TreeError),
    /// Acquiring a regulator or pinctrl resource failed.
    Resource(PortError),
    /// The timer registry is full.
    TimerRegistryFull,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(t) => write!(f, "no valid action for type '{t}'"),
            Self::MissingArgument => write!(f, "missing argument"),
            Self::NotNumeric(arg) => write!(f, "delay needs a numeric argument, got '{arg}'"),
            Self::TooManyValues(arg) => write!(f, "usleep takes at most two values, got '{arg}'"),
            Self::InvalidRange { min_us, max_us } => {
                write!(f, "usleep range ({min_us} {max_us}) invalid")
            }
            Self::RangeTooLong(us) => write!(f, "use msleep instead of usleep for {us}us"),
            Self::TimerFormat(arg) => write!(f, "timer start needs '<name> <ms>', got '{arg}'"),
            Self::TimerTooShort(ms) => write!(f, "use usleep instead of timer for {ms}ms"),
            Self::NameTooLong(name) => write!(f, "name '{name}' too long"),
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Resource(e) => write!(f, "resource: {e}"),
            Self::TimerRegistryFull => write!(f, "timer registry full"),
        }
    }
}

impl From<TreeError> for ParseError {
    fn from(e: TreeError) -> Self {
        Self::Gpio(e)
    }
}

impl From<PortError> for ParseError {
    fn from(e: PortError) -> Self {
        Self::Resource(e)
    }
}

// ---------------------------------------------------------------------------
// Build errors (whole sequence)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Neither the device nor the tree carries the board property.
    NoBoardProperty,
    /// The board property does not resolve to a container node.
    NoContainer,
    /// The container has no sub-section with that name.
    NoSection(String),
    /// The `type` list is missing, empty, or has an odd length.
    BadTypeList { count: usize },
    /// Entry `index` failed to parse.
    Entry { index: usize, error: ParseError },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBoardProperty => write!(f, "board property does not exist"),
            Self::NoContainer => write!(f, "board container node does not exist"),
            Self::NoSection(name) => write!(f, "section '{name}' does not exist"),
            Self::BadTypeList { count } => write!(f, "type count {count} invalid"),
            Self::Entry { index, error } => write!(f, "entry {index}: {error}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public GPIO helper errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// The GPIO reference did not resolve.
    Lookup(TreeError),
    /// The line could not be read or driven.
    Port(PortError),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup(e) => write!(f, "lookup: {e}"),
            Self::Port(e) => write!(f, "port: {e}"),
        }
    }
}

impl From<TreeError> for GpioError {
    fn from(e: TreeError) -> Self {
        Self::Lookup(e)
    }
}

impl From<PortError> for GpioError {
    fn from(e: PortError) -> Self {
        Self::Port(e)
    }
}

// ---------------------------------------------------------------------------
// Fatal conditions
// ---------------------------------------------------------------------------

/// Conditions after which the caller must not keep driving the hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fatal {
    /// More distinct sequence names than registry slots.
    SequenceRegistryFull,
    /// More distinct timer names than registry slots.
    TimerRegistryFull,
    /// A sequence name does not fit the fixed-size key.
    NameTooLong(String),
    /// An entry failed to parse; the sequence was left degenerate.
    BuildAborted { sequence: String, error: BuildError },
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SequenceRegistryFull => write!(f, "sequence registry full"),
            Self::TimerRegistryFull => write!(f, "timer registry full"),
            Self::NameTooLong(name) => write!(f, "sequence name '{name}' too long"),
            Self::BuildAborted { sequence, error } => {
                write!(f, "build of '{sequence}' aborted: {error}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document could not be deserialized.
    Corrupted(String),
    /// A field failed validation.  The `&'static str` says which and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(why) => write!(f, "config validation failed: {why}"),
        }
    }
}

impl std::error::Error for PortError {}
impl std::error::Error for TreeError {}
impl std::error::Error for ParseError {}
impl std::error::Error for BuildError {}
impl std::error::Error for GpioError {}
impl std::error::Error for Fatal {}
impl std::error::Error for ConfigError {}
