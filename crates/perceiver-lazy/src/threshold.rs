//! Distance measurement, skip rules and activation predicates.

use std::collections::HashSet;

use foldbeacon_core_types::ActivationPolicy;
use foldbeacon_render_tree::traverse::ancestors;
use foldbeacon_render_tree::{NodeId, RenderTree};
use regex::{Regex, RegexBuilder};

use crate::errors::LazyError;
use crate::policy::LazyScanConfig;

/// Why a marker node was left out before activation was considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BlockedId,
    IconReference,
    Excluded,
    MissingMarker,
    Conflict,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::BlockedId => "blocked_id",
            SkipReason::IconReference => "icon_reference",
            SkipReason::Excluded => "excluded",
            SkipReason::MissingMarker => "missing_marker",
            SkipReason::Conflict => "conflict",
        }
    }
}

/// Compiled id and attribute exclusions.
#[derive(Debug, Clone)]
pub struct SkipRules {
    blocked_ids: Vec<String>,
    exclusions: Vec<(String, Regex)>,
}

impl SkipRules {
    pub fn compile(config: &LazyScanConfig) -> Result<Self, LazyError> {
        let blocked_ids = config
            .skip_strings
            .iter()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let mut exclusions = Vec::with_capacity(config.exclusions.len());
        for rule in &config.exclusions {
            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| LazyError::InvalidPattern {
                    attribute: rule.attribute.clone(),
                    source,
                })?;
            exclusions.push((rule.attribute.clone(), regex));
        }
        Ok(Self {
            blocked_ids,
            exclusions,
        })
    }

    /// The node's `id` contains a blocked substring, any case.
    pub fn blocks_id<T: RenderTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        let Some(id) = tree.attribute(node, "id").filter(|id| !id.is_empty()) else {
            return false;
        };
        let id = id.to_lowercase();
        self.blocked_ids.iter().any(|blocked| id.contains(blocked))
    }

    /// A configured `(attribute, pattern)` pair matches a non-empty value.
    pub fn excludes<T: RenderTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        self.exclusions.iter().any(|(attribute, pattern)| {
            tree.attribute(node, attribute)
                .filter(|value| !value.is_empty())
                .is_some_and(|value| pattern.is_match(&value))
        })
    }
}

/// Every ancestor of a `use` element strictly below `body`.
pub fn icon_reference_hosts<T: RenderTree + ?Sized>(
    tree: &T,
    uses: &[NodeId],
) -> HashSet<NodeId> {
    let mut hosts = HashSet::new();
    for &node in uses {
        for ancestor in ancestors(tree, node) {
            if tree.tag_name(ancestor) == "body" {
                break;
            }
            hosts.insert(ancestor);
        }
    }
    hosts
}

/// `max(0, top + scroll.y - reference)`; 0 for nodes without a rectangle.
pub fn distance<T: RenderTree + ?Sized>(tree: &T, node: NodeId, reference: f64) -> f64 {
    let scroll_y = tree.scroll_offset().y;
    tree.bounding_rect(node)
        .map(|rect| (rect.top + scroll_y - reference).max(0.0))
        .unwrap_or(0.0)
}

/// Whether a node at `depth` and `distance` activates under `policy`.
/// `parent_distance` is `None` for the root.
pub fn activates(
    policy: ActivationPolicy,
    threshold: f64,
    depth: usize,
    distance: f64,
    parent_distance: Option<f64>,
) -> bool {
    match policy {
        ActivationPolicy::ParentRelative => parent_distance
            .is_some_and(|parent| parent < threshold && threshold <= distance),
        ActivationPolicy::DepthRelative => {
            distance >= threshold && (depth == 2 || parent_distance == Some(0.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldbeacon_core_types::{ReferenceLine, Size};
    use foldbeacon_render_tree::{NodeSpec, PageSnapshot};

    #[test]
    fn parent_relative_crossing() {
        let policy = ActivationPolicy::ParentRelative;
        assert!(activates(policy, 300.0, 3, 400.0, Some(0.0)));
        assert!(!activates(policy, 500.0, 3, 400.0, Some(0.0)));
        assert!(activates(policy, 400.0, 3, 400.0, Some(0.0)));
        assert!(!activates(policy, 300.0, 3, 900.0, Some(300.0)));
        assert!(!activates(policy, 300.0, 0, 900.0, None));
    }

    #[test]
    fn depth_relative_crossing() {
        let policy = ActivationPolicy::DepthRelative;
        assert!(activates(policy, 300.0, 2, 400.0, Some(350.0)));
        assert!(activates(policy, 300.0, 5, 400.0, Some(0.0)));
        assert!(!activates(policy, 300.0, 5, 400.0, Some(10.0)));
        assert!(!activates(policy, 500.0, 2, 400.0, Some(0.0)));
    }

    #[test]
    fn scroll_top_reference_distances() {
        let tops = [0.0, 800.0, 1000.0, -300.0];
        let page = PageSnapshot::builder(Size::new(1280.0, 800.0))
            .scroll(0.0, 100.0)
            .build(NodeSpec::new("body").children(
                tops.iter().map(|top| NodeSpec::new("div").rect(*top, 0.0, 100.0, 100.0)),
            ));
        let reference = ReferenceLine::ScrollTop.resolve(page.viewport_size(), page.scroll_offset());
        let distances: Vec<f64> = (1..=4).map(|idx| distance(&page, NodeId(idx), reference)).collect();
        assert_eq!(distances, vec![0.0, 800.0, 1000.0, 0.0]);
    }

    #[test]
    fn viewport_bottom_reference_and_missing_rect() {
        let page = PageSnapshot::builder(Size::new(1280.0, 800.0))
            .build(NodeSpec::new("body").child(NodeSpec::new("div").rect(2600.0, 0.0, 10.0, 10.0)));
        let reference = ReferenceLine::ViewportBottom.resolve(page.viewport_size(), page.scroll_offset());
        assert_eq!(distance(&page, NodeId(1), reference), 1800.0);
        assert_eq!(distance(&page, NodeId(0), reference), 0.0);
    }

    #[test]
    fn blocked_ids_match_any_case() {
        let config = LazyScanConfig::new("data-location-hash", 1800.0);
        let rules = SkipRules::compile(&config).unwrap();
        let page = PageSnapshot::builder(Size::new(1280.0, 800.0)).build(
            NodeSpec::new("body")
                .child(NodeSpec::new("div").attr("id", "Header-MEMEX-bar"))
                .child(NodeSpec::new("div").attr("id", "content")),
        );
        assert!(rules.blocks_id(&page, NodeId(1)));
        assert!(!rules.blocks_id(&page, NodeId(2)));
        assert!(!rules.blocks_id(&page, NodeId(0)));
    }

    #[test]
    fn custom_skip_strings_replace_the_default() {
        let config = LazyScanConfig::new("data-location-hash", 1800.0).with_skip_strings(["promo", ""]);
        let rules = SkipRules::compile(&config).unwrap();
        let page = PageSnapshot::builder(Size::new(1280.0, 800.0)).build(
            NodeSpec::new("body")
                .child(NodeSpec::new("div").attr("id", "memex-bar"))
                .child(NodeSpec::new("div").attr("id", "PromoStrip")),
        );
        assert!(!rules.blocks_id(&page, NodeId(1)));
        assert!(rules.blocks_id(&page, NodeId(2)));
    }

    #[test]
    fn attribute_exclusions_are_case_insensitive() {
        let config = LazyScanConfig::new("data-location-hash", 1800.0)
            .with_exclusion("class", "^carousel");
        let rules = SkipRules::compile(&config).unwrap();
        let page = PageSnapshot::builder(Size::new(1280.0, 800.0)).build(
            NodeSpec::new("body")
                .child(NodeSpec::new("div").attr("class", "Carousel slide"))
                .child(NodeSpec::new("div").attr("class", "grid carousel")),
        );
        assert!(rules.excludes(&page, NodeId(1)));
        assert!(!rules.excludes(&page, NodeId(2)));
    }

    #[test]
    fn invalid_exclusion_pattern_fails_compilation() {
        let config = LazyScanConfig::new("data-location-hash", 1800.0).with_exclusion("class", "(");
        assert!(matches!(
            SkipRules::compile(&config),
            Err(LazyError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn icon_hosts_stop_below_body() {
        let page = PageSnapshot::builder(Size::new(1280.0, 800.0)).build(
            NodeSpec::new("html").child(
                NodeSpec::new("body").child(
                    NodeSpec::new("div")
                        .child(NodeSpec::new("svg").child(NodeSpec::new("use")))
                        .child(NodeSpec::new("p")),
                ),
            ),
        );
        let uses = page.match_all("use").unwrap();
        let hosts = icon_reference_hosts(&page, &uses);
        let mut hosts: Vec<NodeId> = hosts.into_iter().collect();
        hosts.sort();
        assert_eq!(hosts, vec![NodeId(2), NodeId(3)]);
    }
}
