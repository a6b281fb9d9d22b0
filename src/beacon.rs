//! Beacon run orchestration: preconditions, prior results, and the
//! scan-versus-guard race.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use foldbeacon_core_types::{RunId, ScanOutcome, ScanStatus, Size};
use foldbeacon_policy_center::{BeaconPolicy, ScreenPolicy};
use foldbeacon_render_tree::{DocumentInfo, RenderTree};
use perceiver_lazy::LazyRenderPerceiver;
use perceiver_paint::{PaintPerceiver, PaintResults};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::errors::BeaconError;
use crate::report::{BeaconOutcome, BeaconReport, BeaconResults, BeaconSkip};

const CACHED_MARKER: &str = "Debug: cached";

/// Features that already have stored results for a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneratedBefore {
    pub lcp: bool,
    pub lrc: bool,
}

/// Lookup of results stored by an earlier run. Only consulted for cached
/// pages; `Ok(None)` means nothing was stored.
#[async_trait]
pub trait PriorResults: Send + Sync {
    async fn generated_before(
        &self,
        url: Option<&str>,
        is_mobile: bool,
    ) -> Result<Option<GeneratedBefore>, BeaconError>;
}

pub struct NoPriorResults;

#[async_trait]
impl PriorResults for NoPriorResults {
    async fn generated_before(
        &self,
        _url: Option<&str>,
        _is_mobile: bool,
    ) -> Result<Option<GeneratedBefore>, BeaconError> {
        Ok(None)
    }
}

/// Fixed answer, for callers that know the stored state up front.
pub struct StaticPriorResults(pub GeneratedBefore);

#[async_trait]
impl PriorResults for StaticPriorResults {
    async fn generated_before(
        &self,
        _url: Option<&str>,
        _is_mobile: bool,
    ) -> Result<Option<GeneratedBefore>, BeaconError> {
        Ok(Some(self.0))
    }
}

pub struct Beacon {
    policy: BeaconPolicy,
    paint: PaintPerceiver,
    lazy: LazyRenderPerceiver,
    prior: Arc<dyn PriorResults>,
}

impl Beacon {
    pub fn new(policy: BeaconPolicy) -> Result<Self, BeaconError> {
        let paint = PaintPerceiver::from_policy(&policy.paint)?;
        let lazy = LazyRenderPerceiver::from_policy(&policy.lazy)?;
        Ok(Self {
            policy,
            paint,
            lazy,
            prior: Arc::new(NoPriorResults),
        })
    }

    pub fn with_prior_results(mut self, prior: Arc<dyn PriorResults>) -> Self {
        self.prior = prior;
        self
    }

    pub fn policy(&self) -> &BeaconPolicy {
        &self.policy
    }

    pub async fn run<P>(&self, page: Arc<P>) -> BeaconOutcome
    where
        P: RenderTree + DocumentInfo + Send + Sync + 'static,
    {
        let delay = Duration::from_millis(self.policy.timing.start_delay_ms);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let started = Instant::now();
        let guard = Duration::from_millis(self.policy.timing.guard_ms);
        let deadline = started + guard;
        let screen = &self.policy.screen;

        if !screen_is_valid(screen, page.viewport_size()) {
            info!(viewport = ?page.viewport_size(), is_mobile = screen.is_mobile, "beacon.skipped.screen_size");
            return BeaconOutcome::Skipped(BeaconSkip::ScreenSize);
        }
        if page.scroll_offset().is_scrolled() {
            info!("beacon.skipped.page_scrolled");
            return BeaconOutcome::Skipped(BeaconSkip::PageScrolled);
        }

        let lookup = tokio::time::timeout_at(deadline, self.generated_before(page.as_ref()));
        let Ok(before) = lookup.await else {
            warn!(guard_ms = self.policy.timing.guard_ms, "beacon.guard.fired_during_lookup");
            let (lcp, lrc) = timed_out(self.policy.features.atf, self.policy.features.lrc);
            return self.report(page.as_ref(), ScanStatus::Timeout, lcp, lrc);
        };
        let run_lcp = self.policy.features.atf && !before.lcp;
        let run_lrc = self.policy.features.lrc && !before.lrc;
        if !run_lcp && !run_lrc {
            info!(?before, "beacon.skipped.nothing_to_run");
            return BeaconOutcome::Skipped(BeaconSkip::NothingToRun);
        }

        let paint = self.paint.clone();
        let lazy = self.lazy.clone();
        let scan_page = Arc::clone(&page);
        let scans = tokio::task::spawn_blocking(move || {
            let lcp = run_lcp.then(|| paint.run_candidate_scan(scan_page.as_ref()));
            let lrc = run_lrc.then(|| lazy.run_lazy_render_scan(scan_page.as_ref()));
            (lcp, lrc)
        });

        let (lcp, lrc, guard_fired) = tokio::select! {
            joined = scans => match joined {
                Ok((lcp, lrc)) => (lcp, lrc, false),
                Err(err) => {
                    error!(error = %err, "beacon.scan.panicked");
                    (
                        run_lcp.then(ScanOutcome::<PaintResults>::failed),
                        run_lrc.then(ScanOutcome::<Vec<String>>::failed),
                        false,
                    )
                }
            },
            _ = tokio::time::sleep_until(deadline) => {
                warn!(guard_ms = self.policy.timing.guard_ms, "beacon.guard.fired");
                let (lcp, lrc) = timed_out(run_lcp, run_lrc);
                (lcp, lrc, true)
            }
        };

        let elapsed = started.elapsed();
        let status = final_status(
            [
                lcp.as_ref().map(|o| o.status),
                lrc.as_ref().map(|o| o.status),
            ],
            guard_fired || elapsed >= guard,
        );
        debug!(%status, elapsed_ms = elapsed.as_millis() as u64, "beacon.run.completed");
        self.report(page.as_ref(), status, lcp, lrc)
    }

    fn report<P: DocumentInfo + ?Sized>(
        &self,
        page: &P,
        status: ScanStatus,
        lcp: Option<ScanOutcome<PaintResults>>,
        lrc: Option<ScanOutcome<Vec<String>>>,
    ) -> BeaconOutcome {
        BeaconOutcome::Report(Box::new(BeaconReport {
            url: page.url().map(str::to_string),
            is_mobile: self.policy.screen.is_mobile,
            status,
            results: BeaconResults {
                lcp: lcp.map(|outcome| outcome.value.into_records()),
                lrc: lrc.map(|outcome| outcome.value),
            },
            run_id: RunId::new(),
            generated_at: Utc::now(),
        }))
    }

    async fn generated_before<P: DocumentInfo + ?Sized>(&self, page: &P) -> GeneratedBefore {
        let cached = page
            .cache_signature()
            .is_some_and(|signature| signature.contains(CACHED_MARKER));
        if !cached {
            return GeneratedBefore::default();
        }
        match self
            .prior
            .generated_before(page.url(), self.policy.screen.is_mobile)
            .await
        {
            Ok(found) => found.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "beacon.prior_results.unavailable");
                GeneratedBefore::default()
            }
        }
    }
}

/// Empty `timeout` outcomes for the features that were due to run.
fn timed_out(
    run_lcp: bool,
    run_lrc: bool,
) -> (Option<ScanOutcome<PaintResults>>, Option<ScanOutcome<Vec<String>>>) {
    (
        run_lcp.then(|| ScanOutcome {
            status: ScanStatus::Timeout,
            value: PaintResults::default(),
        }),
        run_lrc.then(|| ScanOutcome {
            status: ScanStatus::Timeout,
            value: Vec::new(),
        }),
    )
}

/// Mobile runs reject viewports larger than the thresholds, desktop runs
/// reject smaller ones.
pub fn screen_is_valid(screen: &ScreenPolicy, viewport: Size) -> bool {
    let width = f64::from(screen.width_threshold);
    let height = f64::from(screen.height_threshold);
    if screen.is_mobile {
        viewport.width <= width && viewport.height <= height
    } else {
        viewport.width >= width && viewport.height >= height
    }
}

/// First failing scan status wins; otherwise `timeout` when the guard
/// elapsed, else `success`.
pub fn final_status(scans: [Option<ScanStatus>; 2], timed_out: bool) -> ScanStatus {
    if let Some(failed) = scans
        .into_iter()
        .flatten()
        .find(|status| *status == ScanStatus::ScriptError)
    {
        return failed;
    }
    if timed_out {
        ScanStatus::Timeout
    } else {
        ScanStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldbeacon_core_types::{Rect, ScrollOffset};
    use foldbeacon_render_tree::{
        ComputedStyle, NodeId, NodeSpec, PageSnapshot, PseudoElement, TreeError,
    };

    fn quick_policy() -> BeaconPolicy {
        let mut policy = BeaconPolicy::default();
        policy.timing.start_delay_ms = 0;
        policy.lazy.threshold_px = 1000.0;
        policy
    }

    fn landing(builder: foldbeacon_render_tree::PageSnapshotBuilder) -> Arc<PageSnapshot> {
        Arc::new(
            builder.url("https://shop.test/").build(
                NodeSpec::new("html").child(
                    NodeSpec::new("body").children([
                        NodeSpec::new("img")
                            .attr("src", "/hero.jpg")
                            .attr("data-location-hash", "hero")
                            .rect(0.0, 0.0, 1280.0, 600.0),
                        NodeSpec::new("section")
                            .attr("data-location-hash", "reviews")
                            .rect(2400.0, 0.0, 1280.0, 900.0),
                    ]),
                ),
            ),
        )
    }

    fn desktop() -> foldbeacon_render_tree::PageSnapshotBuilder {
        PageSnapshot::builder(Size::new(1280.0, 900.0))
    }

    #[tokio::test]
    async fn full_run_reports_both_features() {
        let beacon = Beacon::new(quick_policy()).unwrap();
        let outcome = beacon.run(landing(desktop())).await;
        let report = outcome.report().expect("report");
        assert_eq!(report.status, ScanStatus::Success);
        assert_eq!(report.url.as_deref(), Some("https://shop.test/"));
        let lcp = report.results.lcp.as_ref().unwrap();
        assert_eq!(lcp.len(), 1);
        assert_eq!(lcp[0].info.src, "/hero.jpg");
        assert_eq!(report.results.lrc, Some(vec!["reviews".to_string()]));
    }

    #[tokio::test]
    async fn invalid_screen_and_scrolled_pages_are_skipped() {
        let beacon = Beacon::new(quick_policy()).unwrap();
        let small = landing(PageSnapshot::builder(Size::new(390.0, 844.0)));
        assert_eq!(
            beacon.run(small).await.skipped(),
            Some(BeaconSkip::ScreenSize)
        );
        let scrolled = landing(desktop().scroll(0.0, 50.0));
        assert_eq!(
            beacon.run(scrolled).await.skipped(),
            Some(BeaconSkip::PageScrolled)
        );
    }

    #[test]
    fn mobile_thresholds_cap_the_viewport() {
        let mut screen = BeaconPolicy::default().screen;
        screen.is_mobile = true;
        assert!(screen_is_valid(&screen, Size::new(390.0, 830.0)));
        assert!(!screen_is_valid(&screen, Size::new(1280.0, 800.0)));
        screen.is_mobile = false;
        assert!(screen_is_valid(&screen, Size::new(1280.0, 900.0)));
        assert!(!screen_is_valid(&screen, Size::new(1280.0, 700.0)));
    }

    #[tokio::test]
    async fn cached_pages_skip_features_generated_before() {
        let beacon = Beacon::new(quick_policy()).unwrap().with_prior_results(Arc::new(
            StaticPriorResults(GeneratedBefore {
                lcp: true,
                lrc: false,
            }),
        ));
        let cached = landing(desktop().cache_signature(" Debug: cached @ 1712345678 "));
        let report = beacon.run(cached).await;
        let report = report.report().unwrap();
        assert!(report.results.lcp.is_none());
        assert!(report.results.lrc.is_some());

        let uncached = landing(desktop());
        let report = beacon.run(uncached).await;
        assert!(report.report().unwrap().results.lcp.is_some());
    }

    struct UnreachableStore;

    #[async_trait]
    impl PriorResults for UnreachableStore {
        async fn generated_before(
            &self,
            _url: Option<&str>,
            _is_mobile: bool,
        ) -> Result<Option<GeneratedBefore>, BeaconError> {
            Err(BeaconError::PriorResults("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn failed_lookup_runs_every_enabled_feature() {
        let beacon = Beacon::new(quick_policy())
            .unwrap()
            .with_prior_results(Arc::new(UnreachableStore));
        let cached = landing(desktop().cache_signature("Debug: cached"));
        let outcome = beacon.run(cached).await;
        let report = outcome.report().unwrap();
        assert!(report.results.lcp.is_some());
        assert!(report.results.lrc.is_some());
    }

    #[tokio::test]
    async fn nothing_to_run_when_everything_exists() {
        let beacon = Beacon::new(quick_policy()).unwrap().with_prior_results(Arc::new(
            StaticPriorResults(GeneratedBefore {
                lcp: true,
                lrc: true,
            }),
        ));
        let cached = landing(desktop().cache_signature("Debug: cached"));
        assert_eq!(
            beacon.run(cached).await.skipped(),
            Some(BeaconSkip::NothingToRun)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_delay_elapses_before_the_run() {
        let mut policy = quick_policy();
        policy.timing.start_delay_ms = 500;
        let beacon = Beacon::new(policy).unwrap();
        let small = landing(PageSnapshot::builder(Size::new(100.0, 100.0)));
        let before = Instant::now();
        let outcome = beacon.run(small).await;
        assert_eq!(outcome.skipped(), Some(BeaconSkip::ScreenSize));
        assert!(before.elapsed() >= Duration::from_millis(500));
    }

    /// Store that answers only after `0` has passed.
    struct SlowStore(Duration);

    #[async_trait]
    impl PriorResults for SlowStore {
        async fn generated_before(
            &self,
            _url: Option<&str>,
            _is_mobile: bool,
        ) -> Result<Option<GeneratedBefore>, BeaconError> {
            tokio::time::sleep(self.0).await;
            Ok(Some(GeneratedBefore::default()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn guard_covers_the_prior_results_lookup() {
        let mut policy = quick_policy();
        policy.timing.guard_ms = 100;
        let beacon = Beacon::new(policy)
            .unwrap()
            .with_prior_results(Arc::new(SlowStore(Duration::from_millis(300))));
        let cached = landing(desktop().cache_signature("Debug: cached"));
        let before = Instant::now();
        let outcome = beacon.run(cached).await;
        let report = outcome.report().unwrap();
        assert_eq!(report.status, ScanStatus::Timeout);
        assert_eq!(report.results.lcp, Some(Vec::new()));
        assert_eq!(report.results.lrc, Some(Vec::new()));
        assert!(before.elapsed() < Duration::from_millis(300));
    }

    /// Tree whose selector matching blocks, to let the guard win.
    struct SlowTree(PageSnapshot, Duration);

    impl RenderTree for SlowTree {
        fn match_all(&self, selector: &str) -> Result<Vec<NodeId>, TreeError> {
            std::thread::sleep(self.1);
            self.0.match_all(selector)
        }
        fn tag_name(&self, node: NodeId) -> String {
            self.0.tag_name(node)
        }
        fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
            self.0.bounding_rect(node)
        }
        fn computed_style(
            &self,
            node: NodeId,
            pseudo: Option<PseudoElement>,
        ) -> Result<ComputedStyle, TreeError> {
            self.0.computed_style(node, pseudo)
        }
        fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
            self.0.attribute(node, name)
        }
        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.0.parent(node)
        }
        fn children(&self, node: NodeId) -> Vec<NodeId> {
            self.0.children(node)
        }
        fn viewport_size(&self) -> Size {
            self.0.viewport_size()
        }
        fn scroll_offset(&self) -> ScrollOffset {
            self.0.scroll_offset()
        }
    }

    impl DocumentInfo for SlowTree {
        fn url(&self) -> Option<&str> {
            self.0.url()
        }
        fn cache_signature(&self) -> Option<&str> {
            self.0.cache_signature()
        }
    }

    #[tokio::test]
    async fn guard_win_reports_timeout_with_empty_results() {
        let mut policy = quick_policy();
        policy.timing.guard_ms = 20;
        let beacon = Beacon::new(policy).unwrap();
        let page = landing(desktop());
        let slow = Arc::new(SlowTree(
            Arc::try_unwrap(page).unwrap(),
            Duration::from_millis(300),
        ));
        let outcome = beacon.run(slow).await;
        let report = outcome.report().unwrap();
        assert_eq!(report.status, ScanStatus::Timeout);
        assert_eq!(report.results.lcp, Some(Vec::new()));
        assert_eq!(report.results.lrc, Some(Vec::new()));
    }

    #[tokio::test]
    async fn unsupported_selector_reports_script_error() {
        let mut policy = quick_policy();
        policy.paint.elements = "img:hover".to_string();
        let beacon = Beacon::new(policy).unwrap();
        let report = beacon.run(landing(desktop())).await;
        let report = report.report().unwrap();
        assert_eq!(report.status, ScanStatus::ScriptError);
        assert_eq!(report.results.lcp, Some(Vec::new()));
        assert_eq!(report.results.lrc, Some(vec!["reviews".to_string()]));
    }

    #[test]
    fn script_error_outranks_timeout() {
        assert_eq!(
            final_status([Some(ScanStatus::Success), Some(ScanStatus::ScriptError)], true),
            ScanStatus::ScriptError
        );
        assert_eq!(final_status([Some(ScanStatus::Success), None], true), ScanStatus::Timeout);
        assert_eq!(final_status([None, Some(ScanStatus::Success)], false), ScanStatus::Success);
    }

    #[test]
    fn misconfigured_policy_is_rejected() {
        let mut policy = quick_policy();
        policy.lazy.marker_attribute.clear();
        assert!(matches!(Beacon::new(policy), Err(BeaconError::Lazy(_))));
    }
}
