//! Minimal host: builds two graphs, submits them and drives the scheduler
//! the way a UI timer would, with a small per-tick budget.
//!
//! Run with `RUST_LOG=debug` to watch the per-node evaluation log.

use std::collections::HashMap;
use std::time::Duration;

use engine::scheduler::{MaintenanceHook, ProgressReporter};
use engine::{EngineError, Graph, Node, Scheduler, SocketValues, Value};
use log::info;
use uuid::Uuid;

struct LogProgress;

impl ProgressReporter for LogProgress {
    fn node_processed(&mut self, graph_id: Uuid, last_node: Option<Uuid>) {
        if let Some(node) = last_node {
            info!("graph {graph_id}: last processed node {node}");
        }
    }

    fn settled(&mut self) {
        info!("evaluation settled, no re-trigger needed");
    }
}

struct GcPause;

impl MaintenanceHook for GcPause {
    fn pause(&mut self) {
        info!("pausing background maintenance for the run");
    }

    fn resume(&mut self) {
        info!("resuming background maintenance");
    }
}

/// Produces the list `[0, 1, .., len - 1]`.
fn range_node(name: &str, len: i64) -> Node {
    Node::new(name, move |node: &Node, _: &SocketValues| {
        let out = node
            .output("out")
            .ok_or_else(|| EngineError::node_failure("missing out socket"))?;
        let items = (0..len).map(Value::Int).collect();
        Ok(SocketValues::from([(out.id, Value::list(items))]))
    })
    .with_output("out")
}

/// Scales every element of the `in` list by the `factor` input.
fn scale_node(name: &str) -> Node {
    Node::new(name, |node: &Node, inputs: &SocketValues| {
        let list = node
            .input("in")
            .and_then(|socket| inputs.get(&socket.id))
            .and_then(Value::as_list)
            .ok_or_else(|| EngineError::node_failure("expected a list input"))?;
        let factor = node
            .input("factor")
            .and_then(|socket| inputs.get(&socket.id))
            .map_or(1.0, |value| value.as_float(1.0));
        let out = node
            .output("out")
            .ok_or_else(|| EngineError::node_failure("missing out socket"))?;
        let scaled = list
            .iter()
            .map(|item| Value::Float(item.as_float(0.0) * factor))
            .collect();
        Ok(SocketValues::from([(out.id, Value::list(scaled))]))
    })
    .with_input("in")
    .with_input_default("factor", Value::Float(2.0))
    .with_output("out")
}

/// Sums the `in` list into a single float.
fn sum_node(name: &str) -> Node {
    Node::new(name, |node: &Node, inputs: &SocketValues| {
        let list = node
            .input("in")
            .and_then(|socket| inputs.get(&socket.id))
            .and_then(Value::as_list)
            .ok_or_else(|| EngineError::node_failure("expected a list input"))?;
        let out = node
            .output("out")
            .ok_or_else(|| EngineError::node_failure("missing out socket"))?;
        let total = list.iter().map(|item| item.as_float(0.0)).sum();
        Ok(SocketValues::from([(out.id, Value::Float(total))]))
    })
    .with_input("in")
    .with_output("out")
}

fn connect(graph: &mut Graph, from_node: Uuid, from: &str, to_node: Uuid, to: &str) {
    let from = graph.socket_ref(from_node, from).expect("from socket");
    let to = graph.socket_ref(to_node, to).expect("to socket");
    graph.connect(from, to);
}

fn main() -> Result<(), EngineError> {
    env_logger::init();

    // range → scale (factor defaults to 2.0) → sum
    let mut chain = Graph::new("sum chain");
    let range = chain.add_node(range_node("range", 10));
    let scale = chain.add_node(scale_node("scale"));
    let sum = chain.add_node(sum_node("sum"));
    connect(&mut chain, range, "out", scale, "in");
    connect(&mut chain, scale, "out", sum, "in");

    let mut lone = Graph::new("constant");
    let answer = lone.add_node(range_node("answer", 42));

    let chain_id = chain.id;
    let lone_id = lone.id;
    let sum_out = chain.socket_ref(sum, "out").expect("sum output");
    let answer_out = lone.socket_ref(answer, "out").expect("answer output");

    let store: HashMap<Uuid, Graph> = [chain, lone].into_iter().map(|g| (g.id, g)).collect();

    let mut scheduler = Scheduler::new();
    scheduler.set_reporter(Box::new(LogProgress));
    scheduler.set_maintenance_hook(Box::new(GcPause));
    scheduler.submit(chain_id);
    scheduler.submit(lone_id);

    let mut ticks = 0u32;
    while scheduler.tick(&store, Duration::from_millis(5)) {
        ticks += 1;
    }
    info!("drained in {ticks} ticks");

    let total = scheduler.read(chain_id, sum_out.socket_id, true)?;
    println!("sum of scaled range: {total:?}");
    println!(
        "sum socket label: {}",
        scheduler
            .socket_label(chain_id, sum_out.socket_id)
            .unwrap_or_else(|| "<no data>".to_string())
    );
    println!(
        "answer socket label: {}",
        scheduler
            .socket_label(lone_id, answer_out.socket_id)
            .unwrap_or_else(|| "<no data>".to_string())
    );
    println!("chain cache:\n{}", scheduler.dump_cache(chain_id)?);
    Ok(())
}
