use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("node {node_id} not found in graph {graph_id}")]
    NodeNotFound { graph_id: Uuid, node_id: Uuid },
    #[error("link {link_id} not found in graph {graph_id}")]
    LinkNotFound { graph_id: Uuid, link_id: Uuid },
    #[error("graph {0} not found")]
    GraphNotFound(Uuid),
    #[error("no data on socket {socket_id} of graph {graph_id}")]
    NoData { graph_id: Uuid, socket_id: Uuid },
    #[error("node logic failed: {0}")]
    NodeFailure(String),
    #[error("evaluation cancelled")]
    Cancelled,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn node_failure(message: impl Into<String>) -> Self {
        EngineError::NodeFailure(message.into())
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, EngineError::NoData { .. })
    }
}
