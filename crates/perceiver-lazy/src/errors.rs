use foldbeacon_render_tree::{NodeId, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LazyError {
    #[error("invalid lazy render config: {0}")]
    Config(String),
    #[error("exclusion pattern for `{attribute}` does not compile: {source}")]
    InvalidPattern {
        attribute: String,
        #[source]
        source: regex::Error,
    },
    #[error("lazy render evaluation failed for node {node}: {source}")]
    Classification {
        node: NodeId,
        #[source]
        source: TreeError,
    },
    #[error("render tree error: {0}")]
    Tree(#[from] TreeError),
}

impl LazyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
