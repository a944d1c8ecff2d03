//! Per-node outcome bookkeeping for one evaluation run.

use std::collections::HashMap;
use std::time::Duration;

use uuid::Uuid;

/// Outcome of one node within a run: how long its logic took, or why it
/// produced nothing.
#[derive(Clone, Debug, Default)]
pub struct NodeStat {
    pub elapsed: Option<Duration>,
    pub error: Option<String>,
}

/// Outcomes for every node processed in one run, kept by the scheduler per
/// graph so the host can show timings and errors after the run settled.
#[derive(Debug, Default)]
pub struct RunStats {
    nodes: HashMap<Uuid, NodeStat>,
}

impl RunStats {
    pub fn record_ok(&mut self, node_id: Uuid, elapsed: Duration) {
        self.nodes.insert(
            node_id,
            NodeStat {
                elapsed: Some(elapsed),
                error: None,
            },
        );
    }

    pub fn record_error(&mut self, node_id: Uuid, error: String) {
        self.nodes.insert(
            node_id,
            NodeStat {
                elapsed: None,
                error: Some(error),
            },
        );
    }

    pub fn node_time(&self, node_id: Uuid) -> Option<Duration> {
        self.nodes.get(&node_id)?.elapsed
    }

    pub fn node_error(&self, node_id: Uuid) -> Option<&str> {
        self.nodes.get(&node_id)?.error.as_deref()
    }

    /// Nodes that produced no output this run; folded back into the next
    /// partial submit so they get retried.
    pub fn failed_nodes(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.nodes
            .iter()
            .filter(|(_, stat)| stat.error.is_some())
            .map(|(id, _)| *id)
    }

    pub fn processed_count(&self) -> usize {
        self.nodes.len()
    }
}
