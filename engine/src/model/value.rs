//! Runtime values carried on sockets.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The value produced on an output socket and consumed by downstream nodes.
///
/// List payloads sit behind an `Arc`: a plain `clone()` shares the storage,
/// which is what the cache hands out when the caller opts out of copying.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    List(Arc<Vec<Value>>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    /// Structural copy with fresh storage on every nested list level.
    ///
    /// A flat list (no list elements) is re-allocated in one pass instead of
    /// recursing per element; its scalar elements are cheap to clone. Deep
    /// payloads pay the full recursive copy. Mirrors how nodes exchange
    /// mostly-flat numeric data.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::List(items) => {
                let fresh = if matches!(items.first(), Some(Value::List(_))) {
                    items.iter().map(Value::deep_copy).collect()
                } else {
                    items.as_ref().clone()
                };
                Value::List(Arc::new(fresh))
            }
            other => other.clone(),
        }
    }

    /// True when both values are lists sharing the same backing storage.
    pub fn shares_storage(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// One-line description used for socket labels and cache dumps.
    pub fn summary(&self) -> String {
        match self {
            Value::Float(v) => format!("float {v}"),
            Value::Int(v) => format!("int {v}"),
            Value::Bool(v) => format!("bool {v}"),
            Value::Text(s) => format!("text ({} chars)", s.len()),
            Value::List(items) => format!("{} items", items.len()),
        }
    }

    pub fn as_float(&self, default: f64) -> f64 {
        match self {
            Value::Float(v) => *v,
            Value::Int(v) => *v as f64,
            _ => default,
        }
    }

    pub fn as_int(&self, default: i64) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::Float(v) => *v as i64,
            _ => default,
        }
    }

    pub fn as_bool(&self, default: bool) -> bool {
        match self {
            Value::Bool(v) => *v,
            _ => default,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}
