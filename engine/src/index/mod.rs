//! Id → object lookup cache over host-owned node/link collections.
//!
//! The backing collections can be rebuilt by the host at any time, so the
//! index stores positions rather than references and is dropped wholesale on
//! [`ElementIndex::reset`]; the first lookup afterwards walks the live
//! collection once and serves O(1) lookups from then on. Entries are never
//! patched incrementally.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{Graph, Link, Node};

#[derive(Default)]
pub struct ElementIndex {
    nodes: HashMap<Uuid, HashMap<Uuid, usize>>,
    links: HashMap<Uuid, HashMap<Uuid, usize>>,
}

impl ElementIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_node<'g>(
        &mut self,
        graph: &'g Graph,
        node_id: Uuid,
    ) -> Result<&'g Node, EngineError> {
        let positions = self
            .nodes
            .entry(graph.id)
            .or_insert_with(|| graph.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect());
        match positions.get(&node_id).and_then(|&i| graph.nodes.get(i)) {
            Some(node) if node.id == node_id => Ok(node),
            _ => Err(EngineError::NodeNotFound {
                graph_id: graph.id,
                node_id,
            }),
        }
    }

    pub fn get_link<'g>(
        &mut self,
        graph: &'g Graph,
        link_id: Uuid,
    ) -> Result<&'g Link, EngineError> {
        let positions = self
            .links
            .entry(graph.id)
            .or_insert_with(|| graph.links.iter().enumerate().map(|(i, l)| (l.id, i)).collect());
        match positions.get(&link_id).and_then(|&i| graph.links.get(i)) {
            Some(link) if link.id == link_id => Ok(link),
            _ => Err(EngineError::LinkNotFound {
                graph_id: graph.id,
                link_id,
            }),
        }
    }

    /// Drop cached mappings. `graph_id = None` drops every graph's index;
    /// the flags select which of the two maps to drop.
    pub fn reset(&mut self, graph_id: Option<Uuid>, reset_nodes: bool, reset_links: bool) {
        match graph_id {
            Some(id) => {
                if reset_nodes {
                    self.nodes.remove(&id);
                }
                if reset_links {
                    self.links.remove(&id);
                }
            }
            None => {
                if reset_nodes {
                    self.nodes.clear();
                }
                if reset_links {
                    self.links.clear();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, SocketValues};

    fn passthrough(_: &Node, inputs: &SocketValues) -> Result<SocketValues, EngineError> {
        Ok(inputs.clone())
    }

    fn sample_graph() -> Graph {
        let mut graph = Graph::new("index test");
        let a = graph.add_node(Node::new("a", passthrough).with_output("out"));
        let b = graph.add_node(Node::new("b", passthrough).with_input("in"));
        let from = graph.socket_ref(a, "out").unwrap();
        let to = graph.socket_ref(b, "in").unwrap();
        graph.connect(from, to);
        graph
    }

    #[test]
    fn node_and_link_lookup() {
        let graph = sample_graph();
        let mut index = ElementIndex::new();
        let node_id = graph.nodes[0].id;
        let link_id = graph.links[0].id;
        assert_eq!(index.get_node(&graph, node_id).unwrap().id, node_id);
        assert_eq!(index.get_link(&graph, link_id).unwrap().id, link_id);
    }

    #[test]
    fn vanished_id_is_not_found() {
        let graph = sample_graph();
        let mut index = ElementIndex::new();
        let missing = Uuid::new_v4();
        assert!(matches!(
            index.get_node(&graph, missing),
            Err(EngineError::NodeNotFound { .. })
        ));
        assert!(matches!(
            index.get_link(&graph, missing),
            Err(EngineError::LinkNotFound { .. })
        ));
    }

    #[test]
    fn mapping_is_cached_until_reset() {
        let mut graph = sample_graph();
        let mut index = ElementIndex::new();
        index.get_node(&graph, graph.nodes[0].id).unwrap();

        // the host appends a node without telling the index; the stale
        // mapping proves lookups are served from the cached build
        let late = graph.add_node(Node::new("late", passthrough));
        assert!(index.get_node(&graph, late).is_err());

        index.reset(Some(graph.id), true, true);
        assert_eq!(index.get_node(&graph, late).unwrap().id, late);
    }

    #[test]
    fn reset_flags_are_independent() {
        let mut graph = sample_graph();
        let mut index = ElementIndex::new();
        index.get_node(&graph, graph.nodes[0].id).unwrap();
        index.get_link(&graph, graph.links[0].id).unwrap();

        let late = graph.add_node(Node::new("late", passthrough).with_input("in"));
        let from = graph.socket_ref(graph.nodes[0].id, "out").unwrap();
        let to = graph.socket_ref(late, "in").unwrap();
        let late_link = graph.connect(from, to);

        index.reset(Some(graph.id), true, false);
        assert!(index.get_node(&graph, late).is_ok());
        assert!(index.get_link(&graph, late_link).is_err());

        index.reset(Some(graph.id), false, true);
        assert!(index.get_link(&graph, late_link).is_ok());
    }

    #[test]
    fn reset_without_graph_drops_everything() {
        let mut first = sample_graph();
        let mut second = sample_graph();
        let mut index = ElementIndex::new();
        index.get_node(&first, first.nodes[0].id).unwrap();
        index.get_node(&second, second.nodes[0].id).unwrap();

        let late_first = first.add_node(Node::new("late", passthrough));
        let late_second = second.add_node(Node::new("late", passthrough));
        index.reset(None, true, true);
        assert!(index.get_node(&first, late_first).is_ok());
        assert!(index.get_node(&second, late_second).is_ok());
    }

    #[test]
    fn stale_position_does_not_resolve_to_wrong_node() {
        let mut graph = sample_graph();
        let mut index = ElementIndex::new();
        let removed = graph.nodes[0].id;
        index.get_node(&graph, removed).unwrap();

        // the host rebuilt the collection under the index's feet
        graph.nodes.remove(0);
        assert!(matches!(
            index.get_node(&graph, removed),
            Err(EngineError::NodeNotFound { .. })
        ));
    }
}
