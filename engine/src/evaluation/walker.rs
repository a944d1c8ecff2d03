//! Graph walker — a lazy, resumable, dependency-ordered evaluation of one
//! graph.
//!
//! The walker is an explicit state machine instead of a coroutine: each
//! [`GraphWalker::step`] fully evaluates exactly one node, so suspension and
//! cancellation points exist only between nodes.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use log::{debug, error, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::SocketValues;
use crate::util::ScopedTimer;

use super::context::EvalContext;
use super::stats::RunStats;

/// What one `step()` produced.
pub enum Step {
    /// The node just evaluated, for progress reporting.
    Node(Uuid),
    /// Every reachable node has been stepped.
    Done,
}

pub struct GraphWalker {
    graph_id: Uuid,
    /// `None` re-evaluates every node; `Some` restricts the plan to the
    /// downstream closure of these nodes.
    outdated: Option<HashSet<Uuid>>,
    plan: Option<VecDeque<Uuid>>,
    stats: RunStats,
    cancelled: bool,
    unwound: bool,
    finished: bool,
}

impl GraphWalker {
    pub fn new(graph_id: Uuid, outdated: Option<HashSet<Uuid>>) -> Self {
        Self {
            graph_id,
            outdated,
            plan: None,
            stats: RunStats::default(),
            cancelled: false,
            unwound: false,
            finished: false,
        }
    }

    pub fn graph_id(&self) -> Uuid {
        self.graph_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Widen the set of nodes to re-evaluate. Only meaningful before the
    /// first `step()` builds the plan.
    pub fn merge_outdated(&mut self, other: Option<HashSet<Uuid>>) {
        match (&mut self.outdated, other) {
            (Some(mine), Some(theirs)) => mine.extend(theirs),
            (_, None) => self.outdated = None,
            (None, Some(_)) => {}
        }
    }

    /// Evaluate the next node in dependency order.
    ///
    /// After [`GraphWalker::cancel`] the first call unwinds with
    /// [`EngineError::Cancelled`] (the single place that control signal
    /// surfaces) and every later call reports `Done`.
    pub fn step(&mut self, ctx: &mut EvalContext) -> Result<Step, EngineError> {
        if self.cancelled {
            if self.unwound {
                return Ok(Step::Done);
            }
            self.unwound = true;
            self.finished = true;
            return Err(EngineError::Cancelled);
        }
        if self.finished {
            return Ok(Step::Done);
        }
        if self.plan.is_none() {
            self.plan = Some(self.build_plan(ctx));
        }
        loop {
            let Some(node_id) = self.plan.as_mut().and_then(|p| p.pop_front()) else {
                self.finished = true;
                return Ok(Step::Done);
            };
            match self.process_node(node_id, ctx) {
                Ok(()) => return Ok(Step::Node(node_id)),
                Err(EngineError::NodeNotFound { .. }) => {
                    // the host removed the node mid-run; nothing to evaluate
                    warn!(
                        "graph {}: node {node_id} vanished from the live collection, skipping",
                        self.graph_id
                    );
                }
                Err(err) => {
                    error!(
                        "graph {}: node {node_id} produced no output: {err}",
                        self.graph_id
                    );
                    self.stats.record_error(node_id, err.to_string());
                    self.forget_outputs(node_id, ctx);
                    return Ok(Step::Node(node_id));
                }
            }
        }
    }

    /// Request termination. Takes effect on the next resumption attempt;
    /// never interrupts a node mid-flight.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn take_stats(&mut self) -> RunStats {
        std::mem::take(&mut self.stats)
    }

    /// Evaluate one node end to end: gather inputs from the cache, invoke
    /// the logic exactly once, publish all outputs. Outputs are written only
    /// after the logic returns, so a failure leaves no partial entry.
    fn process_node(&mut self, node_id: Uuid, ctx: &mut EvalContext) -> Result<(), EngineError> {
        let graph = ctx.graph;
        let node = ctx.index.get_node(graph, node_id)?;

        let mut inputs = SocketValues::new();
        for socket in &node.inputs {
            match ctx.cache.resolve_source(graph, socket.id) {
                // a linked input whose upstream wrote nothing this run
                // fails here with NoData
                Some(source) => {
                    let value = ctx.cache.get(graph.id, source.socket_id, true)?;
                    inputs.insert(socket.id, value);
                }
                None => {
                    if let Some(default) = &socket.default {
                        inputs.insert(socket.id, default.deep_copy());
                    }
                }
            }
        }

        let started = Instant::now();
        let outputs = node.logic.process(node, &inputs)?;
        let elapsed = started.elapsed();
        debug!(
            "graph {}: node {node_id} ({}) processed in {} ms",
            self.graph_id,
            node.name,
            elapsed.as_millis()
        );

        for (socket_id, value) in outputs {
            ctx.cache.set(graph.id, socket_id, value);
        }
        self.stats.record_ok(node_id, elapsed);
        Ok(())
    }

    /// A failing node must not leave last run's values visible to its
    /// dependents; they read NoData instead.
    fn forget_outputs(&mut self, node_id: Uuid, ctx: &mut EvalContext) {
        let graph = ctx.graph;
        if let Ok(node) = ctx.index.get_node(graph, node_id) {
            for socket in &node.outputs {
                ctx.cache.forget(graph.id, socket.id);
            }
        }
    }

    /// Topological order over the live graph (Kahn), seeded in document
    /// order for determinism, then restricted to the outdated closure when
    /// this is a partial run.
    fn build_plan(&self, ctx: &mut EvalContext) -> VecDeque<Uuid> {
        let _timer = ScopedTimer::debug("building evaluation plan");
        let graph = ctx.graph;

        let mut downstream: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut in_degree: HashMap<Uuid, usize> =
            graph.nodes.iter().map(|n| (n.id, 0)).collect();
        for link in &graph.links {
            if !in_degree.contains_key(&link.from.node_id) {
                continue;
            }
            let Some(degree) = in_degree.get_mut(&link.to.node_id) else {
                continue;
            };
            *degree += 1;
            downstream
                .entry(link.from.node_id)
                .or_default()
                .push(link.to.node_id);
        }

        let mut queue: VecDeque<Uuid> = graph
            .nodes
            .iter()
            .filter(|n| in_degree.get(&n.id) == Some(&0))
            .map(|n| n.id)
            .collect();
        let mut order: Vec<Uuid> = Vec::with_capacity(graph.nodes.len());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(children) = downstream.get(&id) {
                for &child in children {
                    if let Some(degree) = in_degree.get_mut(&child) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(child);
                        }
                    }
                }
            }
        }
        if order.len() < graph.nodes.len() {
            warn!(
                "graph {}: {} nodes form a cycle and were left out of the plan",
                graph.id,
                graph.nodes.len() - order.len()
            );
        }

        match &self.outdated {
            None => order.into_iter().collect(),
            Some(seeds) => {
                let affected = downstream_closure(&downstream, seeds);
                order.retain(|id| affected.contains(id));
                order.into_iter().collect()
            }
        }
    }
}

fn downstream_closure(
    downstream: &HashMap<Uuid, Vec<Uuid>>,
    seeds: &HashSet<Uuid>,
) -> HashSet<Uuid> {
    let mut affected = seeds.clone();
    let mut stack: Vec<Uuid> = seeds.iter().copied().collect();
    while let Some(id) = stack.pop() {
        if let Some(children) = downstream.get(&id) {
            for &child in children {
                if affected.insert(child) {
                    stack.push(child);
                }
            }
        }
    }
    affected
}
