use foldbeacon_render_tree::{NodeId, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaintError {
    #[error("invalid candidate scan config: {0}")]
    Config(String),
    #[error("classification failed for node {node}: {source}")]
    Classification {
        node: NodeId,
        #[source]
        source: TreeError,
    },
    #[error("render tree error: {0}")]
    Tree(#[from] TreeError),
}

impl PaintError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
