//! Per-graph, per-socket memoization of computed values.
//!
//! The value cache is how nodes communicate: a node's outputs are written
//! here and its dependents read them back by socket id. Alongside the values
//! it keeps two small derived caches, a lazily built one-line label per
//! socket and an input-socket → feeding-output lookup built from the links,
//! so repeated reads never walk the link list. All three are dropped
//! together on [`ValueCache::reset`].

use std::collections::HashMap;

use log::debug;
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{Graph, SocketRef, Value};

const DUMP_VALUE_LEN: usize = 100;

#[derive(Default)]
pub struct ValueCache {
    values: HashMap<Uuid, HashMap<Uuid, Value>>,
    labels: HashMap<Uuid, HashMap<Uuid, String>>,
    /// input socket id → the output socket feeding it; the inner map is
    /// built from the whole link list in one pass per graph.
    sources: HashMap<Uuid, HashMap<Uuid, SocketRef>>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional overwrite. Invalidates the socket's cached label.
    pub fn set(&mut self, graph_id: Uuid, socket_id: Uuid, value: Value) {
        if let Some(labels) = self.labels.get_mut(&graph_id) {
            labels.remove(&socket_id);
        }
        self.values
            .entry(graph_id)
            .or_default()
            .insert(socket_id, value);
    }

    /// Read a stored value.
    ///
    /// With `deep_copy` the result owns fresh storage and downstream
    /// mutation cannot corrupt the entry; without it the caller gets the
    /// live (storage-sharing) value and promises not to mutate it. Absent
    /// entries fail with [`EngineError::NoData`] — never a default.
    pub fn get(&self, graph_id: Uuid, socket_id: Uuid, deep_copy: bool) -> Result<Value, EngineError> {
        let value = self
            .values
            .get(&graph_id)
            .and_then(|sockets| sockets.get(&socket_id))
            .ok_or(EngineError::NoData {
                graph_id,
                socket_id,
            })?;
        Ok(if deep_copy { value.deep_copy() } else { value.clone() })
    }

    /// Drop one socket's entry, if any.
    pub fn forget(&mut self, graph_id: Uuid, socket_id: Uuid) {
        if let Some(sockets) = self.values.get_mut(&graph_id) {
            sockets.remove(&socket_id);
        }
        if let Some(labels) = self.labels.get_mut(&graph_id) {
            labels.remove(&socket_id);
        }
    }

    /// One-line summary of the socket's current value, derived on first
    /// request and cached until the value changes or the graph is reset.
    pub fn label(&mut self, graph_id: Uuid, socket_id: Uuid) -> Option<&str> {
        let value = self.values.get(&graph_id)?.get(&socket_id)?;
        let labels = self.labels.entry(graph_id).or_default();
        Some(
            labels
                .entry(socket_id)
                .or_insert_with(|| value.summary())
                .as_str(),
        )
    }

    /// The output socket feeding the given input socket, if linked.
    pub fn resolve_source(&mut self, graph: &Graph, input_socket_id: Uuid) -> Option<SocketRef> {
        let sources = self.sources.entry(graph.id).or_insert_with(|| {
            graph
                .links
                .iter()
                .map(|link| (link.to.socket_id, link.from))
                .collect()
        });
        sources.get(&input_socket_id).copied()
    }

    /// Drop all values, labels and link lookups for one graph.
    pub fn reset(&mut self, graph_id: Uuid) {
        self.values.remove(&graph_id);
        self.labels.remove(&graph_id);
        self.sources.remove(&graph_id);
    }

    pub fn reset_all(&mut self) {
        self.values.clear();
        self.labels.clear();
        self.sources.clear();
    }

    pub fn entry_count(&self, graph_id: Uuid) -> usize {
        self.values.get(&graph_id).map_or(0, HashMap::len)
    }

    /// Render one graph's entries as pretty JSON. Diagnostics only.
    pub fn dump(&self, graph_id: Uuid) -> Result<String, EngineError> {
        let rendered: HashMap<String, &Value> = self
            .values
            .get(&graph_id)
            .map(|sockets| {
                sockets
                    .iter()
                    .map(|(id, value)| (id.to_string(), value))
                    .collect()
            })
            .unwrap_or_default();
        Ok(serde_json::to_string_pretty(&rendered)?)
    }

    /// Log every entry of one graph at debug level, values truncated.
    pub fn dump_debug(&self, graph_id: Uuid) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let Some(sockets) = self.values.get(&graph_id) else {
            debug!("value cache: no entries for graph {graph_id}");
            return;
        };
        for (socket_id, value) in sockets {
            let rendered = serde_json::to_string(value)
                .unwrap_or_else(|err| format!("<unprintable: {err}>"));
            debug!(
                "value cache {graph_id}/{socket_id}: {}",
                cut_text(&rendered, DUMP_VALUE_LEN)
            );
        }
    }
}

/// Shorten long renderings keeping both ends, `start...end` style.
fn cut_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let head: String = text.chars().take(max_len / 2 - 2).collect();
    let tail_len = max_len / 2 - 1;
    let tail: String = text
        .chars()
        .skip(text.chars().count() - tail_len)
        .collect();
    format!("{head}...{tail}")
}
