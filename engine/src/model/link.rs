//! Links — the directed edges of the data-flow graph.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a specific socket on a specific node.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SocketRef {
    pub node_id: Uuid,
    pub socket_id: Uuid,
}

impl SocketRef {
    pub fn new(node_id: Uuid, socket_id: Uuid) -> Self {
        Self { node_id, socket_id }
    }
}

/// A directed connection from one output socket to one input socket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Link {
    pub id: Uuid,
    pub from: SocketRef,
    pub to: SocketRef,
}

impl Link {
    pub fn new(from: SocketRef, to: SocketRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
        }
    }
}
