#![allow(dead_code)]

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

pub mod geometry;

pub use geometry::{Rect, ScrollOffset, Size};

/// Raised when a textual setting does not name a known variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported for a scan and, aggregated, for a whole beacon run.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ScanStatus {
    #[default]
    Success,
    ScriptError,
    Timeout,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Success => "success",
            ScanStatus::ScriptError => "script_error",
            ScanStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one scan. A failed scan still carries a (default, empty) value so
/// callers can report it without special casing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanOutcome<T> {
    pub status: ScanStatus,
    pub value: T,
}

impl<T> ScanOutcome<T> {
    pub fn success(value: T) -> Self {
        Self {
            status: ScanStatus::Success,
            value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ScanOutcome<U> {
        ScanOutcome {
            status: self.status,
            value: f(self.value),
        }
    }
}

impl<T: Default> ScanOutcome<T> {
    pub fn failed() -> Self {
        Self {
            status: ScanStatus::ScriptError,
            value: T::default(),
        }
    }
}

/// Rule deciding when a deferred-render node becomes active.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ActivationPolicy {
    /// The node is the first on its branch to cross the threshold.
    #[default]
    ParentRelative,
    /// Depth-two nodes, or children of in-viewport parents, past the threshold.
    DepthRelative,
}

impl FromStr for ActivationPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "parent_relative" | "parent" => Ok(ActivationPolicy::ParentRelative),
            "depth_relative" | "depth" => Ok(ActivationPolicy::DepthRelative),
            _ => Err(UnknownVariant {
                kind: "activation policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Line that distances of deferred-render nodes are measured from.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ReferenceLine {
    /// Bottom edge of the initial viewport.
    #[default]
    ViewportBottom,
    /// Current vertical scroll offset.
    ScrollTop,
}

impl ReferenceLine {
    pub fn resolve(&self, viewport: Size, scroll: ScrollOffset) -> f64 {
        match self {
            ReferenceLine::ViewportBottom => viewport.height,
            ReferenceLine::ScrollTop => scroll.y,
        }
    }
}

impl FromStr for ReferenceLine {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "viewport_bottom" | "bottom" => Ok(ReferenceLine::ViewportBottom),
            "scroll_top" | "top" => Ok(ReferenceLine::ScrollTop),
            _ => Err(UnknownVariant {
                kind: "reference line",
                value: s.to_string(),
            }),
        }
    }
}
