//! Paint Perceiver - above-the-fold candidate detection for foldbeacon
//!
//! Finds the most visually significant paintable element in the initial
//! viewport (the LCP candidate) plus the other above-the-fold images worth a
//! preload hint:
//! - enumerate candidate nodes and resolve their paint rectangle
//! - classify each into a closed [`ContentKind`]
//! - rank by viewport-clipped area
//! - pick the primary and drop duplicate sources from the rest

pub mod api;
pub mod candidates;
pub mod classify;
pub mod dedupe;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod model;
pub mod policy;

pub use api::PaintPerceiver;
pub use errors::PaintError;
pub use model::{
    BackgroundSource, Candidate, CandidateLabel, ContentKind, ElementInfo, ImageRecord,
    PaintResults, PictureSource,
};
pub use policy::{CandidateLimit, CandidateScanConfig};
