use std::collections::HashSet;
use std::time::Instant;

use foldbeacon_core_types::ScanOutcome;
use foldbeacon_policy_center::LazyRenderPolicy;
use foldbeacon_render_tree::traverse::depth;
use foldbeacon_render_tree::{NodeId, RenderTree, TreeError};
use tracing::warn;

use crate::conflicts::check_conflicts;
use crate::errors::LazyError;
use crate::events;
use crate::model::{ConflictRecord, LazyElement};
use crate::policy::LazyScanConfig;
use crate::threshold::{activates, distance, icon_reference_hosts, SkipReason, SkipRules};

enum Evaluation {
    Skipped(SkipReason),
    Measured(LazyElement),
}

/// Decides which marker-carrying nodes may have their rendering deferred.
#[derive(Debug, Clone)]
pub struct LazyRenderPerceiver {
    config: LazyScanConfig,
    rules: SkipRules,
}

impl LazyRenderPerceiver {
    pub fn new(config: LazyScanConfig) -> Result<Self, LazyError> {
        let marker = config.marker_attribute.trim();
        if marker.is_empty() {
            return Err(LazyError::config("marker attribute is empty"));
        }
        if marker.contains(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '=' | '"' | '\'')) {
            return Err(LazyError::config(format!(
                "marker attribute `{marker}` is not a plain attribute name"
            )));
        }
        if !config.threshold_px.is_finite() || config.threshold_px < 0.0 {
            return Err(LazyError::config(format!(
                "threshold must be a finite, non-negative pixel count (got {})",
                config.threshold_px
            )));
        }
        let rules = SkipRules::compile(&config)?;
        Ok(Self { config, rules })
    }

    pub fn from_policy(policy: &LazyRenderPolicy) -> Result<Self, LazyError> {
        Self::new(LazyScanConfig::from(policy))
    }

    pub fn config(&self) -> &LazyScanConfig {
        &self.config
    }

    /// Tokens of every activated node, in document order. Duplicate tokens
    /// are kept. A failing selector match yields `ScanStatus::ScriptError`
    /// and no tokens.
    pub fn run_lazy_render_scan<T: RenderTree + ?Sized>(&self, tree: &T) -> ScanOutcome<Vec<String>> {
        let started = Instant::now();
        let selector = self.config.marker_selector();
        let (nodes, hosts) = match self.prepare(tree, &selector) {
            Ok(prepared) => prepared,
            Err(err) => {
                events::emit_failure(&selector, &err);
                return ScanOutcome::failed();
            }
        };
        let reference = self.reference_line(tree);
        let threshold = self.config.threshold_px;

        let mut evaluated = 0;
        let mut tokens = Vec::new();
        for node in nodes {
            let tag = tree.tag_name(node);
            let element = match self.evaluate(tree, node, &hosts, reference) {
                Ok(Evaluation::Measured(element)) => element,
                Ok(Evaluation::Skipped(reason)) => {
                    events::emit_skip(node, &tag, reason);
                    continue;
                }
                Err(source) => {
                    let err = LazyError::Classification { node, source };
                    warn!(error = %err, "lazy.element.faulted");
                    continue;
                }
            };
            evaluated += 1;

            let parent_distance = tree
                .parent(node)
                .map(|parent| distance(tree, parent, reference));
            let activated = activates(
                self.config.activation,
                threshold,
                element.depth,
                element.distance,
                parent_distance,
            );
            events::emit_element(&element, &tag, activated);
            if activated {
                tokens.push(element.token);
            }
        }

        events::emit_scan(evaluated, tokens.len(), started.elapsed());
        ScanOutcome::success(tokens)
    }

    /// Marker nodes that pass every skip rule, measured but not yet judged.
    pub fn elements<T: RenderTree + ?Sized>(&self, tree: &T) -> Result<Vec<LazyElement>, LazyError> {
        let (nodes, hosts) = self.prepare(tree, &self.config.marker_selector())?;
        let reference = self.reference_line(tree);
        let mut elements = Vec::new();
        for node in nodes {
            if let Evaluation::Measured(element) = self.evaluate(tree, node, &hosts, reference)? {
                elements.push(element);
            }
        }
        Ok(elements)
    }

    /// Conflict records of every marker node, in document order.
    pub fn conflicts<T: RenderTree + ?Sized>(
        &self,
        tree: &T,
    ) -> Result<Vec<ConflictRecord>, LazyError> {
        let mut records = Vec::new();
        for node in tree.match_all(&self.config.marker_selector())? {
            records.extend(check_conflicts(tree, node)?);
        }
        Ok(records)
    }

    fn prepare<T: RenderTree + ?Sized>(
        &self,
        tree: &T,
        selector: &str,
    ) -> Result<(Vec<NodeId>, HashSet<NodeId>), TreeError> {
        let nodes = tree.match_all(selector)?;
        let uses = tree.match_all("use")?;
        Ok((nodes, icon_reference_hosts(tree, &uses)))
    }

    fn reference_line<T: RenderTree + ?Sized>(&self, tree: &T) -> f64 {
        self.config
            .reference
            .resolve(tree.viewport_size(), tree.scroll_offset())
    }

    fn evaluate<T: RenderTree + ?Sized>(
        &self,
        tree: &T,
        node: NodeId,
        hosts: &HashSet<NodeId>,
        reference: f64,
    ) -> Result<Evaluation, TreeError> {
        if self.rules.blocks_id(tree, node) {
            return Ok(Evaluation::Skipped(SkipReason::BlockedId));
        }
        if hosts.contains(&node) {
            return Ok(Evaluation::Skipped(SkipReason::IconReference));
        }
        if self.rules.excludes(tree, node) {
            return Ok(Evaluation::Skipped(SkipReason::Excluded));
        }
        let token = match tree.attribute(node, self.config.marker_attribute.trim()) {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(Evaluation::Skipped(SkipReason::MissingMarker)),
        };
        if !check_conflicts(tree, node)?.is_empty() {
            return Ok(Evaluation::Skipped(SkipReason::Conflict));
        }
        Ok(Evaluation::Measured(LazyElement {
            node,
            depth: depth(tree, node),
            distance: distance(tree, node, reference),
            token,
        }))
    }
}
