//! Data model for node-graph documents.
//!
//! Graphs, nodes, sockets and links are owned by the host application; the
//! engine addresses them by id only and re-resolves objects through
//! [`crate::index::ElementIndex`] whenever it needs them.

mod graph;
mod link;
mod node;
mod socket;
mod value;

pub use graph::{Graph, GraphSource};
pub use link::{Link, SocketRef};
pub use node::{Node, NodeLogic, SocketValues};
pub use socket::{Socket, SocketDirection};
pub use value::Value;
