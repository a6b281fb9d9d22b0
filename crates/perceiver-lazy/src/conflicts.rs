//! Layout conflicts that make a subtree unsafe to defer.

use foldbeacon_render_tree::{parse_css_float, ComputedStyle, NodeId, RenderTree, TreeError};

use crate::model::{ConflictReason, ConflictRecord};

const MARGINS: [&str; 4] = ["margin-top", "margin-right", "margin-bottom", "margin-left"];

/// Checks `node` and its direct children.
///
/// The node conflicts on a negative margin or on `content-visibility` `auto`
/// or `hidden`; a child conflicts on a negative margin or on `absolute` or
/// `fixed` positioning. Each conflicting node yields one record, the node
/// first and then the children in document order.
pub fn check_conflicts<T: RenderTree + ?Sized>(
    tree: &T,
    node: NodeId,
) -> Result<Vec<ConflictRecord>, TreeError> {
    let mut records = Vec::new();

    let style = tree.computed_style(node, None)?;
    let mut reasons = Vec::new();
    if has_negative_margin(&style) {
        reasons.push(ConflictReason::NegativeMargin);
    }
    match style.keyword("content-visibility").as_str() {
        "auto" => reasons.push(ConflictReason::ContentVisibilityAuto),
        "hidden" => reasons.push(ConflictReason::ContentVisibilityHidden),
        _ => {}
    }
    if !reasons.is_empty() {
        records.push(ConflictRecord { node, reasons });
    }

    for child in tree.children(node) {
        let style = tree.computed_style(child, None)?;
        let mut reasons = Vec::new();
        if has_negative_margin(&style) {
            reasons.push(ConflictReason::NegativeMargin);
        }
        match style.keyword("position").as_str() {
            "absolute" => reasons.push(ConflictReason::PositionAbsolute),
            "fixed" => reasons.push(ConflictReason::PositionFixed),
            _ => {}
        }
        if !reasons.is_empty() {
            records.push(ConflictRecord {
                node: child,
                reasons,
            });
        }
    }

    Ok(records)
}

fn has_negative_margin(style: &ComputedStyle) -> bool {
    MARGINS
        .iter()
        .filter_map(|side| style.get(side).and_then(parse_css_float))
        .any(|value| value < 0.0)
}
