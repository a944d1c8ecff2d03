//! Nodes and their opaque business logic.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::EngineError;

use super::socket::Socket;
use super::value::Value;

/// Socket-id keyed values passed into and out of node logic.
pub type SocketValues = HashMap<Uuid, Value>;

/// The business logic of a node.
///
/// Implementations receive the node they run for (to address its sockets)
/// and the values gathered for its input sockets (absent entries mean
/// "unconnected, no default"), and return the values to publish on its
/// output sockets. A failing node returns [`EngineError::NodeFailure`]; the
/// engine logs it and keeps evaluating independent nodes.
pub trait NodeLogic: Send + Sync {
    fn process(&self, node: &Node, inputs: &SocketValues) -> Result<SocketValues, EngineError>;
}

impl<F> NodeLogic for F
where
    F: Fn(&Node, &SocketValues) -> Result<SocketValues, EngineError> + Send + Sync,
{
    fn process(&self, node: &Node, inputs: &SocketValues) -> Result<SocketValues, EngineError> {
        self(node, inputs)
    }
}

/// A computational unit of a graph: ordered input/output sockets plus the
/// opaque logic invoked once per evaluation.
#[derive(Clone)]
pub struct Node {
    pub id: Uuid,
    pub name: String,
    pub inputs: Vec<Socket>,
    pub outputs: Vec<Socket>,
    pub logic: Arc<dyn NodeLogic>,
}

impl Node {
    pub fn new(name: &str, logic: impl NodeLogic + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            logic: Arc::new(logic),
        }
    }

    pub fn with_input(mut self, name: &str) -> Self {
        self.inputs.push(Socket::input(self.id, name));
        self
    }

    pub fn with_input_default(mut self, name: &str, default: Value) -> Self {
        self.inputs
            .push(Socket::input(self.id, name).with_default(default));
        self
    }

    pub fn with_output(mut self, name: &str) -> Self {
        self.outputs.push(Socket::output(self.id, name));
        self
    }

    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.name == name)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}
