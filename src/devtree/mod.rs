//! In-memory hardware description.
//!
//! A tree of named nodes carrying typed properties, with the handful of
//! lookup primitives the sequencer and the GPIO helpers need.  Nodes are
//! flattened into an arena in depth-first pre-order, so "the nodes after X"
//! is simply a slice of the arena.
//!
//! ```text
//!   /                          NodeId(0)
//!   ├── decon                  NodeId(1)   decon_board = <&panel>
//!   ├── gpf1                   NodeId(2)   gpio-base = <40>
//!   └── panel                  NodeId(3)   pinctrl-names, gpio_lcd_en
//!       ├── lcd_on             NodeId(4)   type = "...", desc = "..."
//!       └── lcd_off            NodeId(5)
//! ```

pub mod property;

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Deserialize;

use crate::error::TreeError;

pub use property::{GpioCell, GpioSpec, Property, GPIO_ACTIVE_LOW, MAX_GPIO_LINES};

/// Property marking a node as a GPIO controller's line base.
const GPIO_BASE_PROP: &str = "gpio-base";

/// A node with this property gets a platform device bound to it.
const COMPATIBLE_PROP: &str = "compatible";

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Nested node form used by the JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// 0 means the node has no label and cannot be referenced.
    #[serde(default)]
    pub phandle: u32,
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    phandle: u32,
    properties: BTreeMap<String, Property>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phandle(&self) -> u32 {
        self.phandle
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The device that owns a sequence invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    /// Description node attached to the device, if any.
    pub of_node: Option<NodeId>,
}

impl Device {
    pub fn new(name: impl Into<String>, of_node: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            of_node,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "NodeSpec")]
pub struct DeviceTree {
    nodes: Vec<Node>,
}

impl From<NodeSpec> for DeviceTree {
    fn from(root: NodeSpec) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.flatten(root, None);
        tree
    }
}

impl DeviceTree {
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        serde_json::from_str(json).map_err(|e| TreeError::Decode(e.to_string()))
    }

    fn flatten(&mut self, spec: NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: spec.name,
            phandle: spec.phandle,
            properties: spec.properties,
            parent,
            children: Vec::new(),
        });
        for child in spec.children {
            let child_id = self.flatten(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node, in tree order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&Property> {
        self.nodes.get(id.0)?.properties.get(name)
    }

    // ── Node lookups ──────────────────────────────────────────

    /// First node in tree order carrying `prop`.
    pub fn find_node_with_property(&self, prop: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.properties.contains_key(prop))
            .map(NodeId)
    }

    /// First node named `name` after `from` in tree order, or anywhere when
    /// `from` is `None`.
    pub fn find_node_by_name(&self, from: Option<NodeId>, name: &str) -> Option<NodeId> {
        let start = from.map_or(0, |id| id.0 + 1);
        self.nodes
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, n)| n.name == name)
            .map(|(i, _)| NodeId(i))
    }

    pub fn find_node_by_phandle(&self, phandle: u32) -> Option<NodeId> {
        if phandle == 0 {
            return None;
        }
        self.nodes
            .iter()
            .position(|n| n.phandle == phandle)
            .map(NodeId)
    }

    /// Follow the `index`-th reference in `prop`.
    pub fn parse_phandle(&self, id: NodeId, prop: &str, index: usize) -> Option<NodeId> {
        match self.property(id, prop)? {
            Property::Phandles(p) => self.find_node_by_phandle(*p.get(index)?),
            _ => None,
        }
    }

    /// Name of the platform device bound to `id`, if the node is one.
    pub fn device_for_node(&self, id: NodeId) -> Option<&str> {
        let node = self.nodes.get(id.0)?;
        node.properties
            .contains_key(COMPATIBLE_PROP)
            .then_some(node.name.as_str())
    }

    // ── Property readers ──────────────────────────────────────

    fn strings(&self, id: NodeId, prop: &str) -> Result<&[String], TreeError> {
        match self.property(id, prop) {
            Some(Property::Strings(s)) => Ok(s),
            Some(_) => Err(TreeError::WrongPropertyType(prop.to_owned())),
            None => Err(TreeError::PropertyNotFound(prop.to_owned())),
        }
    }

    pub fn count_strings(&self, id: NodeId, prop: &str) -> Result<usize, TreeError> {
        self.strings(id, prop).map(<[String]>::len)
    }

    pub fn read_string_index(&self, id: NodeId, prop: &str, index: usize) -> Result<&str, TreeError> {
        self.strings(id, prop)?
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| TreeError::IndexOutOfRange {
                property: prop.to_owned(),
                index,
            })
    }

    pub fn count_references(&self, id: NodeId, prop: &str) -> Result<usize, TreeError> {
        self.property(id, prop)
            .map(Property::reference_count)
            .ok_or_else(|| TreeError::PropertyNotFound(prop.to_owned()))
    }

    /// Resolve the `index`-th GPIO specifier of `prop` on `id` to a global
    /// line number: controller `gpio-base` plus pin offset.
    pub fn named_gpio(&self, id: NodeId, prop: &str, index: usize) -> Result<GpioSpec, TreeError> {
        let cell = match self.property(id, prop) {
            Some(Property::Gpios(g)) => g.get(index).copied().ok_or_else(|| {
                TreeError::IndexOutOfRange {
                    property: prop.to_owned(),
                    index,
                }
            })?,
            Some(_) => return Err(TreeError::WrongPropertyType(prop.to_owned())),
            None => return Err(TreeError::PropertyNotFound(prop.to_owned())),
        };

        let controller = self
            .find_node_by_phandle(cell.controller)
            .ok_or(TreeError::DanglingReference(cell.controller))?;
        let base = match self.property(controller, GPIO_BASE_PROP) {
            Some(Property::Cells(c)) => c.first().copied().unwrap_or(0),
            _ => 0,
        };

        let line = i64::from(base) + i64::from(cell.pin);
        if line >= i64::from(MAX_GPIO_LINES) {
            return Err(TreeError::InvalidGpioLine(line));
        }
        debug!("{} -> gpio {} (flags {:#x})", prop, line, cell.flags);
        Ok(GpioSpec {
            line: line as u32,
            active_low: cell.flags & GPIO_ACTIVE_LOW != 0,
        })
    }

    // ── Mutation ──────────────────────────────────────────────

    /// Repoint the single-reference property `prop` to the node named
    /// `node_name`.
    ///
    /// The property is located on the first node that carries it.  Returns
    /// the `(old, new)` phandle pair.
    ///
    /// ```text
    ///   node3 { panel_ref = <&node1>; }
    ///   update_phandle_property("panel_ref", "node2")
    ///   node3 { panel_ref = <&node2>; }
    /// ```
    pub fn update_phandle_property(&mut self, prop: &str, node_name: &str) -> Result<(u32, u32), TreeError> {
        let holder = self
            .find_node_with_property(prop)
            .ok_or_else(|| TreeError::PropertyNotFound(prop.to_owned()))?;

        let count = self.count_references(holder, prop)?;
        if count != 1 {
            return Err(TreeError::NotSingleReference {
                property: prop.to_owned(),
                count,
            });
        }

        let old = match self.property(holder, prop) {
            Some(Property::Phandles(p)) => p[0],
            _ => return Err(TreeError::WrongPropertyType(prop.to_owned())),
        };
        if self.find_node_by_phandle(old).is_none() {
            return Err(TreeError::DanglingReference(old));
        }

        let target = self
            .find_node_by_name(None, node_name)
            .ok_or_else(|| TreeError::NodeNotFound(node_name.to_owned()))?;
        let new = self.nodes[target.0].phandle;
        if new == 0 {
            return Err(TreeError::NoPhandle(node_name.to_owned()));
        }
        if new == old {
            return Err(TreeError::SameReference(old));
        }

        self.nodes[holder.0]
            .properties
            .insert(prop.to_owned(), Property::Phandles(vec![new]));

        info!(
            "{} {} phandle is changed. {}({})->{}({})",
            self.nodes[holder.0].name,
            prop,
            old,
            self.find_node_by_phandle(old)
                .map_or("?", |id| self.nodes[id.0].name.as_str()),
            new,
            node_name
        );
        Ok((old, new))
    }
}
