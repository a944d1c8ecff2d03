//! Sockets — the named input/output ports of a node.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value::Value;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SocketDirection {
    Input,
    Output,
}

/// An input or output port of a node.
///
/// `node_id` is a plain back-reference to the owning node; sockets never own
/// or borrow the node itself.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Socket {
    pub id: Uuid,
    pub name: String,
    pub direction: SocketDirection,
    pub node_id: Uuid,
    /// Fallback value used when an input socket is unconnected.
    pub default: Option<Value>,
}

impl Socket {
    pub fn input(node_id: Uuid, name: &str) -> Self {
        Self::new(node_id, name, SocketDirection::Input)
    }

    pub fn output(node_id: Uuid, name: &str) -> Self {
        Self::new(node_id, name, SocketDirection::Output)
    }

    fn new(node_id: Uuid, name: &str, direction: SocketDirection) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            direction,
            node_id,
            default: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}
