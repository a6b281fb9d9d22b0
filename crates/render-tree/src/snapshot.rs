//! In-memory render tree.
//!
//! A [`PageSnapshot`] is a frozen copy of a rendered page: geometry, computed
//! styles (including `::before`/`::after`), attributes and structure. It is
//! what the CLI loads from JSON and what tests build with [`NodeSpec`].

use std::collections::BTreeMap;

use foldbeacon_core_types::{Rect, ScrollOffset, Size};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::TreeError;
use crate::ports::{DocumentInfo, NodeId, PseudoElement, RenderTree};
use crate::selector::SelectorList;
use crate::style::ComputedStyle;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PseudoStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<ComputedStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<ComputedStyle>,
}

/// Serialized form of one element and its subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default)]
    pub pseudo: PseudoStyles,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            rect: None,
            attributes: BTreeMap::new(),
            style: ComputedStyle::new(),
            pseudo: PseudoStyles::default(),
            children: Vec::new(),
        }
    }

    pub fn rect(mut self, top: f64, left: f64, width: f64, height: f64) -> Self {
        self.rect = Some(Rect::new(top, left, width, height));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.style.insert(property, value);
        self
    }

    pub fn pseudo_style(mut self, pseudo: PseudoElement, property: &str, value: &str) -> Self {
        let slot = match pseudo {
            PseudoElement::Before => &mut self.pseudo.before,
            PseudoElement::After => &mut self.pseudo.after,
        };
        slot.get_or_insert_with(ComputedStyle::new)
            .insert(property, value);
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    url: Option<String>,
    viewport: Size,
    #[serde(default)]
    scroll: ScrollOffset,
    #[serde(default)]
    cache_signature: Option<String>,
    root: NodeSpec,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) tag: String,
    rect: Option<Rect>,
    pub(crate) attributes: BTreeMap<String, String>,
    style: ComputedStyle,
    before: Option<ComputedStyle>,
    after: Option<ComputedStyle>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Arena-backed, immutable page snapshot. Node ids are pre-order indices.
#[derive(Clone, Debug)]
pub struct PageSnapshot {
    url: Option<String>,
    viewport: Size,
    scroll: ScrollOffset,
    cache_signature: Option<String>,
    nodes: Vec<NodeData>,
}

impl PageSnapshot {
    pub fn builder(viewport: Size) -> PageSnapshotBuilder {
        PageSnapshotBuilder {
            url: None,
            viewport,
            scroll: ScrollOffset::default(),
            cache_signature: None,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, TreeError> {
        let parsed: RawSnapshot = serde_json::from_str(raw)?;
        if !(parsed.viewport.width > 0.0 && parsed.viewport.height > 0.0) {
            return Err(TreeError::Malformed(format!(
                "viewport must be positive, got {}x{}",
                parsed.viewport.width, parsed.viewport.height
            )));
        }
        let builder = PageSnapshotBuilder {
            url: parsed.url,
            viewport: parsed.viewport,
            scroll: parsed.scroll,
            cache_signature: parsed.cache_signature,
        };
        Ok(builder.build(parsed.root))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }
}

pub struct PageSnapshotBuilder {
    url: Option<String>,
    viewport: Size,
    scroll: ScrollOffset,
    cache_signature: Option<String>,
}

impl PageSnapshotBuilder {
    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn scroll(mut self, x: f64, y: f64) -> Self {
        self.scroll = ScrollOffset::new(x, y);
        self
    }

    pub fn cache_signature(mut self, signature: &str) -> Self {
        self.cache_signature = Some(signature.to_string());
        self
    }

    pub fn build(self, root: NodeSpec) -> PageSnapshot {
        PageSnapshot {
            url: self.url,
            viewport: self.viewport,
            scroll: self.scroll,
            cache_signature: self.cache_signature,
            nodes: flatten(root),
        }
    }
}

fn flatten(root: NodeSpec) -> Vec<NodeData> {
    let mut nodes: Vec<NodeData> = Vec::new();
    let mut stack: Vec<(NodeSpec, Option<NodeId>)> = vec![(root, None)];

    while let Some((spec, parent)) = stack.pop() {
        let id = NodeId(nodes.len());
        if let Some(parent) = parent {
            nodes[parent.0].children.push(id);
        }
        let NodeSpec {
            tag,
            rect,
            attributes,
            style,
            pseudo,
            children,
        } = spec;
        nodes.push(NodeData {
            tag: tag.trim().to_ascii_lowercase(),
            rect,
            attributes: attributes
                .into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value))
                .collect(),
            style,
            before: pseudo.before,
            after: pseudo.after,
            parent,
            children: Vec::new(),
        });
        for child in children.into_iter().rev() {
            stack.push((child, Some(id)));
        }
    }

    nodes
}

impl RenderTree for PageSnapshot {
    fn match_all(&self, selector: &str) -> Result<Vec<NodeId>, TreeError> {
        let matched = SelectorList::parse(selector)?.select(self);
        trace!(selector, matched = matched.len(), "snapshot.match_all");
        Ok(matched)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.node(node)
            .map(|data| data.tag.clone())
            .unwrap_or_default()
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        self.node(node).and_then(|data| data.rect)
    }

    fn computed_style(
        &self,
        node: NodeId,
        pseudo: Option<PseudoElement>,
    ) -> Result<ComputedStyle, TreeError> {
        let data = self.node(node).ok_or(TreeError::UnknownNode(node))?;
        let style = match pseudo {
            None => Some(&data.style),
            Some(PseudoElement::Before) => data.before.as_ref(),
            Some(PseudoElement::After) => data.after.as_ref(),
        };
        Ok(style.cloned().unwrap_or_default())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)
            .and_then(|data| data.attributes.get(&name.to_ascii_lowercase()))
            .cloned()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|data| data.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }
}

impl DocumentInfo for PageSnapshot {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn cache_signature(&self) -> Option<&str> {
        self.cache_signature.as_deref()
    }
}
