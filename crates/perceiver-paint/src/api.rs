use std::time::Instant;

use foldbeacon_core_types::ScanOutcome;
use foldbeacon_policy_center::PaintPolicy;
use foldbeacon_render_tree::RenderTree;

use crate::candidates::{extract, Extraction};
use crate::dedupe::assemble;
use crate::errors::PaintError;
use crate::events;
use crate::model::{Candidate, PaintResults};
use crate::policy::{CandidateLimit, CandidateScanConfig};

/// Finds the LCP candidate and the other above-the-fold images of a page.
#[derive(Debug, Clone)]
pub struct PaintPerceiver {
    config: CandidateScanConfig,
}

impl PaintPerceiver {
    pub fn new(config: CandidateScanConfig) -> Result<Self, PaintError> {
        if config.selector.trim().is_empty() {
            return Err(PaintError::config("candidate selector is empty"));
        }
        if config.limit == CandidateLimit::Top(0) {
            return Err(PaintError::config("candidate limit must keep at least one"));
        }
        Ok(Self { config })
    }

    pub fn from_policy(policy: &PaintPolicy) -> Result<Self, PaintError> {
        Self::new(CandidateScanConfig::from(policy))
    }

    pub fn config(&self) -> &CandidateScanConfig {
        &self.config
    }

    /// Ranked candidates before deduplication.
    pub fn candidates<T: RenderTree + ?Sized>(
        &self,
        tree: &T,
    ) -> Result<Vec<Candidate>, PaintError> {
        let Extraction { candidates, .. } =
            extract(tree, &self.config.selector, self.config.limit)?;
        Ok(candidates)
    }

    /// Full candidate scan. A failing selector match yields
    /// `ScanStatus::ScriptError` with empty results; it never panics.
    pub fn run_candidate_scan<T: RenderTree + ?Sized>(
        &self,
        tree: &T,
    ) -> ScanOutcome<PaintResults> {
        let started = Instant::now();
        let extraction = match extract(tree, &self.config.selector, self.config.limit) {
            Ok(extraction) => extraction,
            Err(err) => {
                events::emit_failure(&self.config.selector, &err);
                return ScanOutcome::failed();
            }
        };

        let candidate_count = extraction.candidates.len();
        let results = assemble(extraction.candidates);
        events::emit_scan(candidate_count, &results, extraction.faults, started.elapsed());
        ScanOutcome::success(results)
    }
}
