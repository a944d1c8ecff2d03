//! Scheduler — time-slices pending graph evaluations behind a single
//! periodic entry point.
//!
//! The host calls [`Scheduler::tick`] on a timer; the scheduler pops pending
//! tasks, runs the current one in whole-node slices until the tick budget is
//! spent, reports progress, and finalizes once everything settled. Because
//! host data may only be touched from one logical thread, nodes are the
//! atomic unit of preemption: the scheduler yields between nodes, never
//! inside one.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use log::{debug, error};
use uuid::Uuid;

use crate::cache::ValueCache;
use crate::error::EngineError;
use crate::evaluation::{EvalContext, RunStats, Task};
use crate::index::ElementIndex;
use crate::model::{GraphSource, Value};
use crate::util::ScopedTimer;

/// Outbound progress channel: `(graph id, last processed node)` on every
/// tick while a run is active, plus a single settled notification when the
/// scheduler drains, so the host need not re-trigger for the same cause.
pub trait ProgressReporter {
    fn node_processed(&mut self, graph_id: Uuid, last_node: Option<Uuid>);

    fn settled(&mut self) {}
}

/// Optional scoped pause of non-essential background maintenance (automatic
/// memory reclamation, housekeeping timers) for the duration of a run.
/// `resume` is guaranteed on every exit path, including cancellation.
pub trait MaintenanceHook {
    fn pause(&mut self);
    fn resume(&mut self);
}

pub struct Scheduler {
    cache: ValueCache,
    index: ElementIndex,
    pending: Vec<Task>,
    current: Option<Task>,
    /// Present exactly while a run is active; logs the total duration when
    /// dropped at finalization.
    run_timer: Option<ScopedTimer>,
    stats: HashMap<Uuid, RunStats>,
    reporter: Option<Box<dyn ProgressReporter>>,
    maintenance: Option<Box<dyn MaintenanceHook>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            cache: ValueCache::new(),
            index: ElementIndex::new(),
            pending: Vec::new(),
            current: None,
            run_timer: None,
            stats: HashMap::new(),
            reporter: None,
            maintenance: None,
        }
    }

    pub fn set_reporter(&mut self, reporter: Box<dyn ProgressReporter>) {
        self.reporter = Some(reporter);
    }

    pub fn set_maintenance_hook(&mut self, hook: Box<dyn MaintenanceHook>) {
        self.maintenance = Some(hook);
    }

    /// Enqueue a full evaluation of the graph. Idempotent while the graph
    /// is already pending or current.
    pub fn submit(&mut self, graph_id: Uuid) {
        self.enqueue(graph_id, None);
    }

    /// Enqueue a partial evaluation: only the given nodes and everything
    /// downstream of them re-run; the rest keep their cached values. Merges
    /// into an already pending task for the same graph.
    pub fn submit_nodes(&mut self, graph_id: Uuid, nodes: &[Uuid]) {
        self.enqueue(graph_id, Some(nodes.iter().copied().collect()));
    }

    fn enqueue(&mut self, graph_id: Uuid, outdated: Option<HashSet<Uuid>>) {
        if self
            .current
            .as_ref()
            .is_some_and(|task| task.graph_id() == graph_id)
        {
            return;
        }
        // nodes that failed last run are folded into partial submits so
        // they get retried
        let outdated = outdated.map(|mut set| {
            if let Some(stats) = self.stats.get(&graph_id) {
                set.extend(stats.failed_nodes());
            }
            set
        });
        if let Some(task) = self
            .pending
            .iter_mut()
            .find(|task| task.graph_id() == graph_id)
        {
            task.merge_outdated(outdated);
            return;
        }
        self.pending.push(Task::new(graph_id, outdated));
    }

    /// The periodic entry point. Runs the current task in whole-node slices
    /// until the budget is spent, popping further pending tasks as earlier
    /// ones exhaust. Returns whether work remains. Bounded by `budget` plus
    /// at most one node's processing time.
    pub fn tick(&mut self, source: &dyn GraphSource, budget: Duration) -> bool {
        let tick_started = Instant::now();
        loop {
            let mut task = match self.current.take() {
                Some(task) => task,
                None => match self.pending.pop() {
                    Some(task) => {
                        self.begin_run();
                        task
                    }
                    None => break,
                },
            };
            let graph_id = task.graph_id();
            match source.graph(graph_id) {
                Some(graph) => {
                    let mut ctx = EvalContext::new(graph, &mut self.index, &mut self.cache);
                    let remaining = budget.saturating_sub(tick_started.elapsed());
                    task.run(&mut ctx, remaining);
                    if let Some(reporter) = self.reporter.as_mut() {
                        reporter.node_processed(graph_id, task.last_node());
                    }
                }
                None => {
                    error!("dropping task: {}", EngineError::GraphNotFound(graph_id));
                    task.cancel();
                }
            }
            if task.is_exhausted() {
                self.stats.insert(graph_id, task.take_stats());
            } else {
                self.current = Some(task);
            }
            if tick_started.elapsed() >= budget {
                break;
            }
        }
        let has_more = self.current.is_some() || !self.pending.is_empty();
        if !has_more && self.run_timer.is_some() {
            self.finalize();
        }
        has_more
    }

    /// Synchronously cancel every pending and current task. The scheduler
    /// is guaranteed idle afterwards, whatever work remained.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        if let Some(mut task) = self.current.take() {
            task.cancel();
            self.stats.insert(task.graph_id(), task.take_stats());
        }
        if self.run_timer.is_some() {
            self.finalize();
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Out-of-run read of a cached socket value (diagnostics, tests).
    pub fn read(
        &self,
        graph_id: Uuid,
        socket_id: Uuid,
        deep_copy: bool,
    ) -> Result<Value, EngineError> {
        self.cache.get(graph_id, socket_id, deep_copy)
    }

    /// One-line summary of a cached socket value, if any.
    pub fn socket_label(&mut self, graph_id: Uuid, socket_id: Uuid) -> Option<String> {
        self.cache.label(graph_id, socket_id).map(str::to_string)
    }

    /// Render one graph's cache entries as JSON (diagnostics).
    pub fn dump_cache(&self, graph_id: Uuid) -> Result<String, EngineError> {
        self.cache.dump(graph_id)
    }

    /// Invalidation hook: the host detected a data change for this graph.
    pub fn reset_cache(&mut self, graph_id: Uuid) {
        self.cache.reset(graph_id);
    }

    /// Invalidation hook: the host detected a structural change (nodes or
    /// links added/removed) for this graph.
    pub fn reset_index(&mut self, graph_id: Uuid) {
        self.index.reset(Some(graph_id), true, true);
    }

    /// Drop every cache and index for every graph, e.g. when the host
    /// loads a new document.
    pub fn reset_all(&mut self) {
        self.cache.reset_all();
        self.index.reset(None, true, true);
    }

    /// Per-node timings and errors of the graph's most recent run.
    pub fn stats(&self, graph_id: Uuid) -> Option<&RunStats> {
        self.stats.get(&graph_id)
    }

    fn begin_run(&mut self) {
        if self.run_timer.is_none() {
            debug!("evaluation run started");
            self.run_timer = Some(ScopedTimer::info("evaluation run"));
            if let Some(hook) = self.maintenance.as_mut() {
                hook.pause();
            }
        }
    }

    fn finalize(&mut self) {
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.settled();
        }
        if let Some(hook) = self.maintenance.as_mut() {
            hook.resume();
        }
        // dropping the timer logs the total run duration
        self.run_timer = None;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
