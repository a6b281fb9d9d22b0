//! Candidate extraction: match, resolve paint rectangle, filter, classify, rank.

use foldbeacon_core_types::Rect;
use foldbeacon_render_tree::traverse::first_descendant_by_tag;
use foldbeacon_render_tree::{NodeId, RenderTree, TreeError};
use tracing::{trace, warn};

use crate::classify::classify;
use crate::errors::PaintError;
use crate::model::Candidate;
use crate::policy::CandidateLimit;

/// Ranked candidates plus the number of nodes skipped on a classification fault.
#[derive(Debug, Default)]
pub struct Extraction {
    pub candidates: Vec<Candidate>,
    pub faults: usize,
}

/// Runs the extractor over every node matching `selector`.
///
/// Only a failing selector match is fatal. Faults on individual nodes are
/// logged and counted.
pub fn extract<T: RenderTree + ?Sized>(
    tree: &T,
    selector: &str,
    limit: CandidateLimit,
) -> Result<Extraction, TreeError> {
    let viewport = tree.viewport_size();
    let mut extraction = Extraction::default();

    for node in tree.match_all(selector)? {
        let Some(rect) = paint_rect(tree, node) else {
            continue;
        };
        if !rect.has_positive_size() || !rect.intersects_viewport(viewport) {
            trace!(%node, "paint.candidate.offscreen");
            continue;
        }
        match classify(tree, node) {
            Ok(Some(info)) => extraction.candidates.push(Candidate {
                node,
                area: rect.visible_area(viewport),
                info,
            }),
            Ok(None) => {}
            Err(source) => {
                let err = PaintError::Classification { node, source };
                warn!(error = %err, "paint.candidate.skipped");
                extraction.faults += 1;
            }
        }
    }

    rank(&mut extraction.candidates);
    limit.apply(&mut extraction.candidates);
    Ok(extraction)
}

/// Sorts by visible area, largest first. Ties keep document order.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.area.total_cmp(&a.area));
}

/// Rectangle used to rank `node`, or `None` when it cannot be a candidate.
fn paint_rect<T: RenderTree + ?Sized>(tree: &T, node: NodeId) -> Option<Rect> {
    match tree.tag_name(node).as_str() {
        "img" => {
            let in_picture = tree
                .parent(node)
                .is_some_and(|parent| tree.tag_name(parent) == "picture");
            if in_picture {
                None
            } else {
                tree.bounding_rect(node)
            }
        }
        "picture" => first_descendant_by_tag(tree, node, "img")
            .and_then(|img| tree.bounding_rect(img)),
        _ => tree.bounding_rect(node),
    }
}
