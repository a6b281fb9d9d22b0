//! Render tree access for foldbeacon.
//!
//! Scans never talk to a live page directly. They read through the
//! [`RenderTree`] port, which a browser binding or the in-memory
//! [`PageSnapshot`] implements. Everything behind the port is read-only for the
//! duration of a run.

pub mod errors;
pub mod ports;
pub mod selector;
pub mod snapshot;
pub mod style;
pub mod traverse;

pub use errors::TreeError;
pub use ports::{DocumentInfo, NodeId, PseudoElement, RenderTree};
pub use selector::{SelectorList, SnapshotElement};
pub use snapshot::{NodeSpec, PageSnapshot, PageSnapshotBuilder};
pub use style::{parse_css_float, ComputedStyle};
