//! Sequencer configuration
//!
//! Board-level knobs that the hardware description itself does not carry.
//! Loaded from JSON by the host binary, or defaulted.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default name of the property that points at the sequence container.
pub const DEFAULT_BOARD_PROPERTY: &str = "decon_board";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Property holding the single reference to the container node.
    pub board_property: String,
    /// When false only `delay,*` and `timer,*` entries are built.
    pub panel_present: bool,
    /// Log every action of a freshly built sequence.
    pub dump_on_build: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            board_property: DEFAULT_BOARD_PROPERTY.to_owned(),
            panel_present: true,
            dump_on_build: true,
        }
    }
}

impl SequencerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_property.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("board_property must not be empty"));
        }
        if self.board_property.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationFailed("board_property must not contain whitespace"));
        }
        Ok(())
    }
}
