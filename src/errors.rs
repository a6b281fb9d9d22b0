use perceiver_lazy::LazyError;
use perceiver_paint::PaintError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("candidate scan misconfigured: {0}")]
    Paint(#[from] PaintError),
    #[error("lazy render scan misconfigured: {0}")]
    Lazy(#[from] LazyError),
    #[error("prior results lookup failed: {0}")]
    PriorResults(String),
}
