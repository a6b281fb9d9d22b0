//! Lazy render perceiver for foldbeacon
//!
//! Walks the nodes carrying a location marker and decides which of them can
//! be deferred: a node activates where its branch first crosses the
//! configured distance below the reference line. Nodes whose own layout, or
//! their direct children's, would break when rendering is deferred are
//! reported by the conflict analyzer and never activate.

pub mod api;
pub mod conflicts;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod model;
pub mod policy;
pub mod threshold;

pub use api::LazyRenderPerceiver;
pub use conflicts::check_conflicts;
pub use errors::LazyError;
pub use model::{ConflictReason, ConflictRecord, LazyElement};
pub use policy::LazyScanConfig;
