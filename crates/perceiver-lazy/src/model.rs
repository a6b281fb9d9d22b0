use std::fmt;

use foldbeacon_render_tree::NodeId;
use serde::{Serialize, Serializer};

/// A marker-carrying node measured against the reference line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LazyElement {
    pub node: NodeId,
    /// Number of ancestors up to the document root.
    pub depth: usize,
    /// Pixels below the reference line, clamped at zero.
    pub distance: f64,
    pub token: String,
}

/// Layout property that breaks when a subtree's rendering is deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictReason {
    NegativeMargin,
    ContentVisibilityAuto,
    ContentVisibilityHidden,
    PositionAbsolute,
    PositionFixed,
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictReason::NegativeMargin => "negative margin",
            ConflictReason::ContentVisibilityAuto => "content-visibility:auto",
            ConflictReason::ContentVisibilityHidden => "content-visibility:hidden",
            ConflictReason::PositionAbsolute => "position:absolute",
            ConflictReason::PositionFixed => "position:fixed",
        }
    }
}

impl Serialize for ConflictReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conflicting node with its reasons, in check order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub node: NodeId,
    pub reasons: Vec<ConflictReason>,
}
