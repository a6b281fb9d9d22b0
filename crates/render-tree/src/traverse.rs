//! Structural walks built on the [`RenderTree`] port.

use crate::ports::{NodeId, RenderTree};

/// Number of ancestors between `node` and the root.
pub fn depth<T: RenderTree + ?Sized>(tree: &T, node: NodeId) -> usize {
    ancestors(tree, node).count()
}

/// Parent, grandparent, ... up to and including the root.
pub fn ancestors<T: RenderTree + ?Sized>(
    tree: &T,
    node: NodeId,
) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(tree.parent(node), move |current| tree.parent(*current))
}

/// Descendants of `node` with the given lowercase tag, in document order.
pub fn descendants_by_tag<T: RenderTree + ?Sized>(
    tree: &T,
    node: NodeId,
    tag: &str,
) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(node).into_iter().rev().collect();
    while let Some(current) = stack.pop() {
        if tree.tag_name(current) == tag {
            found.push(current);
        }
        stack.extend(tree.children(current).into_iter().rev());
    }
    found
}

/// First descendant of `node` with the given lowercase tag.
pub fn first_descendant_by_tag<T: RenderTree + ?Sized>(
    tree: &T,
    node: NodeId,
    tag: &str,
) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = tree.children(node).into_iter().rev().collect();
    while let Some(current) = stack.pop() {
        if tree.tag_name(current) == tag {
            return Some(current);
        }
        stack.extend(tree.children(current).into_iter().rev());
    }
    None
}
