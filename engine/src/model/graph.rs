//! Graphs and the host-storage boundary.

use std::collections::HashMap;

use uuid::Uuid;

use super::link::{Link, SocketRef};
use super::node::Node;

/// One data-flow computation definition: a DAG of nodes and links.
///
/// Graphs live in host storage and may be rebuilt there at any time; the
/// engine never keeps references into them across ticks.
#[derive(Clone, Debug)]
pub struct Graph {
    pub id: Uuid,
    pub name: String,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> Uuid {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn connect(&mut self, from: SocketRef, to: SocketRef) -> Uuid {
        let link = Link::new(from, to);
        let id = link.id;
        self.links.push(link);
        id
    }

    /// Resolve `(node, socket name)` into a [`SocketRef`], searching both
    /// socket lists. Convenience for wiring graphs up by hand.
    pub fn socket_ref(&self, node_id: Uuid, socket_name: &str) -> Option<SocketRef> {
        let node = self.nodes.iter().find(|n| n.id == node_id)?;
        let socket = node
            .output(socket_name)
            .or_else(|| node.input(socket_name))?;
        Some(SocketRef::new(node_id, socket.id))
    }
}

/// Read access to the host's live graph storage.
///
/// The engine resolves a graph through this trait on every tick rather than
/// holding on to one, since the host may swap collections out between ticks.
pub trait GraphSource {
    fn graph(&self, graph_id: Uuid) -> Option<&Graph>;
}

impl GraphSource for HashMap<Uuid, Graph> {
    fn graph(&self, graph_id: Uuid) -> Option<&Graph> {
        self.get(&graph_id)
    }
}
