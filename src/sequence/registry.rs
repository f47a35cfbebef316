//! Sequence registry: name → resolved action list.

use heapless::FnvIndexMap;

use crate::error::Fatal;

use super::action::{Action, ActionKind, ActionSummary};
use super::timer::{make_name, Name};

/// Maximum number of distinct sequence names per device.
pub const MAX_SEQUENCES: usize = 16;

/// A named, ordered action list.
///
/// Empty means "not built yet".  A build that produced nothing usable
/// leaves a single [`Action::invalid`] so the list is never empty again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: Name,
    actions: Vec<Action>,
}

impl Sequence {
    fn new(name: Name) -> Self {
        Self {
            name,
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_built(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Built, but holds nothing but the placeholder.
    pub fn is_degenerate(&self) -> bool {
        self.actions.len() == 1 && self.actions[0].kind() == ActionKind::Invalid
    }

    pub fn summary(&self) -> ActionSummary {
        ActionSummary::of(&self.actions)
    }

    pub(crate) fn install(&mut self, actions: Vec<Action>) {
        self.actions = if actions.is_empty() {
            vec![Action::invalid()]
        } else {
            actions
        };
    }

    pub(crate) fn install_degenerate(&mut self) {
        self.actions = vec![Action::invalid()];
    }
}

/// Fixed-capacity, append-only map of sequences.
pub struct SequenceRegistry {
    sequences: FnvIndexMap<Name, Sequence, MAX_SEQUENCES>,
}

impl Default for SequenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self {
            sequences: FnvIndexMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(&make_name(name)?)
    }

    /// Look up `name`, creating an unbuilt entry on a miss.
    pub fn find_or_create(&mut self, name: &str) -> Result<&mut Sequence, Fatal> {
        let key = make_name(name).ok_or_else(|| Fatal::NameTooLong(name.to_owned()))?;
        if !self.sequences.contains_key(&key) {
            log::info!("{} does not exist, so create it", name);
            self.sequences
                .insert(key.clone(), Sequence::new(key.clone()))
                .map_err(|_| Fatal::SequenceRegistryFull)?;
        }
        self.sequences
            .get_mut(&key)
            .ok_or(Fatal::SequenceRegistryFull)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }
}
