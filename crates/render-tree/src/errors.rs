use thiserror::Error;

use crate::ports::NodeId;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("unsupported selector `{selector}`: {reason}")]
    UnsupportedSelector { selector: String, reason: String },
    #[error("style unavailable for node {node}: {reason}")]
    StyleUnavailable { node: NodeId, reason: String },
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

impl TreeError {
    pub fn selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
