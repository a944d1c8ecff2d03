//! Task — one pending or in-progress evaluation run of a graph.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::debug;
use uuid::Uuid;

use super::context::EvalContext;
use super::stats::RunStats;
use super::walker::{GraphWalker, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Exhausted,
}

/// Binds one [`GraphWalker`] to the timing and state bookkeeping the
/// scheduler slices with.
pub struct Task {
    walker: GraphWalker,
    state: TaskState,
    last_node: Option<Uuid>,
    elapsed: Duration,
}

impl Task {
    pub fn new(graph_id: Uuid, outdated: Option<HashSet<Uuid>>) -> Self {
        Self {
            walker: GraphWalker::new(graph_id, outdated),
            state: TaskState::Pending,
            last_node: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn graph_id(&self) -> Uuid {
        self.walker.graph_id()
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == TaskState::Exhausted
    }

    /// The node most recently evaluated, for progress reporting.
    pub fn last_node(&self) -> Option<Uuid> {
        self.last_node
    }

    /// Wall-clock time spent across all `run` calls so far.
    pub fn total_elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn merge_outdated(&mut self, outdated: Option<HashSet<Uuid>>) {
        self.walker.merge_outdated(outdated);
    }

    /// Step the walker until it reports `Done` or the budget is spent.
    ///
    /// The budget check happens only between whole-node steps (a node is
    /// never preempted mid-flight), and at least one step executes per
    /// call. Returns actual elapsed time so the caller can account for
    /// overshoot.
    pub fn run(&mut self, ctx: &mut EvalContext, max_duration: Duration) -> Duration {
        self.state = TaskState::Running;
        let started = Instant::now();
        loop {
            match self.walker.step(ctx) {
                Ok(Step::Node(node_id)) => self.last_node = Some(node_id),
                Ok(Step::Done) => {
                    self.state = TaskState::Exhausted;
                    break;
                }
                Err(err) => {
                    // the one place the cancellation signal is caught
                    debug!("run of graph {} stopped: {err}", self.graph_id());
                    self.state = TaskState::Exhausted;
                    break;
                }
            }
            if started.elapsed() >= max_duration {
                break;
            }
        }
        let elapsed = started.elapsed();
        self.elapsed += elapsed;
        elapsed
    }

    /// Cancel the walker, then mark the task exhausted unconditionally so
    /// the scheduler can never stall on an uncooperative walker.
    pub fn cancel(&mut self) {
        self.walker.cancel();
        self.state = TaskState::Exhausted;
    }

    pub fn stats(&self) -> &RunStats {
        self.walker.stats()
    }

    pub fn take_stats(&mut self) -> RunStats {
        self.walker.take_stats()
    }
}

/// Two tasks are the same task iff they evaluate the same graph; the
/// scheduler relies on this to never double-queue a graph.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.graph_id() == other.graph_id()
    }
}

impl Eq for Task {}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("graph_id", &self.graph_id())
            .field("state", &self.state)
            .field("last_node", &self.last_node)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}
