//! Incremental evaluation engine for node-graph documents.
//!
//! The host keeps the live graphs (nodes, sockets, links) and tells the
//! engine what changed; the engine re-computes only what is necessary, in
//! dependency order, in whole-node time slices driven by periodic
//! [`scheduler::Scheduler::tick`] calls so a large graph never monopolizes
//! the host's thread. Node results are memoized per output socket in a
//! [`cache::ValueCache`] and host objects are resolved by id through an
//! [`index::ElementIndex`] that is rebuilt wholesale after every structural
//! change.

pub mod cache;
pub mod error;
pub mod evaluation;
pub mod index;
pub mod model;
pub mod scheduler;
pub mod util;

pub use error::EngineError;
pub use model::{
    Graph, GraphSource, Link, Node, NodeLogic, Socket, SocketDirection, SocketRef, SocketValues,
    Value,
};
pub use scheduler::{MaintenanceHook, ProgressReporter, Scheduler};
