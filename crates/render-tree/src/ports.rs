use std::fmt;

use foldbeacon_core_types::{Rect, ScrollOffset, Size};
use serde::{Deserialize, Serialize};

use crate::errors::TreeError;
use crate::style::ComputedStyle;

/// Handle to a node of the render tree. Ids increase in document order, so
/// sorting by id restores document order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PseudoElement {
    Before,
    After,
}

impl PseudoElement {
    pub fn as_str(&self) -> &'static str {
        match self {
            PseudoElement::Before => "::before",
            PseudoElement::After => "::after",
        }
    }
}

/// Read-only query surface over a rendered page.
///
/// Lookups on a node id the tree does not know return the empty answer
/// (`None`, empty string, empty list); only selector matching and style
/// resolution can fail.
pub trait RenderTree {
    /// All nodes matching `selector`, in document order.
    fn match_all(&self, selector: &str) -> Result<Vec<NodeId>, TreeError>;

    /// Lowercase tag name.
    fn tag_name(&self, node: NodeId) -> String;

    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    fn computed_style(
        &self,
        node: NodeId,
        pseudo: Option<PseudoElement>,
    ) -> Result<ComputedStyle, TreeError>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn viewport_size(&self) -> Size;

    fn scroll_offset(&self) -> ScrollOffset;
}

/// Page-level facts the orchestrator needs besides the tree itself.
pub trait DocumentInfo {
    fn url(&self) -> Option<&str>;

    /// Text of the trailing comment a page cache appends to served documents.
    fn cache_signature(&self) -> Option<&str>;
}
