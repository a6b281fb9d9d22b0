//! Data models for paint candidate detection

use foldbeacon_render_tree::NodeId;
use serde::{Deserialize, Serialize};

/// What a candidate paints. Resolved once per node from its tag and styles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentKind {
    #[serde(rename = "img")]
    Image,
    #[serde(rename = "img-srcset")]
    ImageSrcset,
    #[serde(rename = "video")]
    Video,
    /// Inline `<svg>` wrapping an `<image>`.
    #[serde(rename = "svg")]
    InlineVector,
    /// `<picture>` with alternate `<source>` elements.
    #[serde(rename = "picture")]
    Picture,
    #[serde(rename = "bg-img")]
    BackgroundImage,
    #[serde(rename = "bg-img-set")]
    BackgroundImageSet,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Image => "img",
            ContentKind::ImageSrcset => "img-srcset",
            ContentKind::Video => "video",
            ContentKind::InlineVector => "svg",
            ContentKind::Picture => "picture",
            ContentKind::BackgroundImage => "bg-img",
            ContentKind::BackgroundImageSet => "bg-img-set",
        }
    }

    /// Image, video, background and picture kinds share one source namespace
    /// and are deduplicated against each other.
    pub fn is_deduplicated(&self) -> bool {
        !matches!(self, ContentKind::InlineVector)
    }
}

/// One `<source>` of a `<picture>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PictureSource {
    pub srcset: String,
    pub media: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub sizes: String,
}

/// One `url(...)` token of a background image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackgroundSource {
    pub src: String,
}

/// Classification of a node with paintable content.
///
/// The field set is fixed for every kind; fields a kind does not use stay
/// empty. `src` is the primary source and the deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElementInfo {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub src: String,
    pub srcset: String,
    pub sizes: String,
    pub sources: Vec<PictureSource>,
    pub bg_set: Vec<BackgroundSource>,
    pub current_src: String,
}

impl ElementInfo {
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            src: String::new(),
            srcset: String::new(),
            sizes: String::new(),
            sources: Vec::new(),
            bg_set: Vec::new(),
            current_src: String::new(),
        }
    }

    pub fn primary_source(&self) -> &str {
        self.src.trim()
    }
}

/// A classified node ranked by visible area.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub node: NodeId,
    pub area: f64,
    pub info: ElementInfo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CandidateLabel {
    #[serde(rename = "lcp")]
    Lcp,
    #[serde(rename = "above-the-fold")]
    AboveTheFold,
}

/// Transport record for one emitted candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRecord {
    #[serde(flatten)]
    pub info: ElementInfo,
    pub label: CandidateLabel,
}

/// Output of a candidate scan: the LCP candidate and the other
/// above-the-fold images, duplicates removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaintResults {
    pub primary: Option<ImageRecord>,
    pub others: Vec<ImageRecord>,
}

impl PaintResults {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.others.is_empty()
    }

    pub fn len(&self) -> usize {
        self.others.len() + usize::from(self.primary.is_some())
    }

    /// Primary first, then the others in rank order.
    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.primary.iter().chain(self.others.iter())
    }

    pub fn into_records(self) -> Vec<ImageRecord> {
        self.primary.into_iter().chain(self.others).collect()
    }
}
