//! Result assembly: primary pick plus duplicate-free secondary list.

use std::collections::HashSet;

use crate::model::{Candidate, CandidateLabel, ImageRecord, PaintResults};

/// Turns ranked candidates into [`PaintResults`].
///
/// The first candidate is the primary, whatever its source. A later candidate
/// of a deduplicated kind is dropped when its trimmed source was already
/// emitted; the first occurrence wins.
pub fn assemble(candidates: Vec<Candidate>) -> PaintResults {
    let mut candidates = candidates.into_iter();
    let Some(first) = candidates.next() else {
        return PaintResults::default();
    };

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(first.info.primary_source().to_string());
    let primary = ImageRecord {
        info: first.info,
        label: CandidateLabel::Lcp,
    };

    let mut others = Vec::new();
    for candidate in candidates {
        let key = candidate.info.primary_source().to_string();
        if candidate.info.kind.is_deduplicated() && seen.contains(&key) {
            continue;
        }
        seen.insert(key);
        others.push(ImageRecord {
            info: candidate.info,
            label: CandidateLabel::AboveTheFold,
        });
    }

    PaintResults {
        primary: Some(primary),
        others,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentKind, ElementInfo};
    use foldbeacon_render_tree::NodeId;

    fn candidate(idx: usize, kind: ContentKind, src: &str, area: f64) -> Candidate {
        let mut info = ElementInfo::new(kind);
        info.src = src.to_string();
        Candidate {
            node: NodeId(idx),
            area,
            info,
        }
    }

    fn reassemble(results: PaintResults) -> PaintResults {
        let candidates = results
            .into_records()
            .into_iter()
            .enumerate()
            .map(|(idx, record)| Candidate {
                node: NodeId(idx),
                area: 0.0,
                info: record.info,
            })
            .collect();
        assemble(candidates)
    }

    #[test]
    fn empty_input_has_no_primary() {
        let results = assemble(Vec::new());
        assert!(results.primary.is_none());
        assert!(results.is_empty());
    }

    #[test]
    fn first_candidate_is_primary_and_later_duplicates_drop() {
        let results = assemble(vec![
            candidate(0, ContentKind::Image, "hero.jpg", 900.0),
            candidate(1, ContentKind::BackgroundImage, " hero.jpg ", 500.0),
            candidate(2, ContentKind::Video, "clip.jpg", 400.0),
            candidate(3, ContentKind::Picture, "clip.jpg", 300.0),
        ]);
        let primary = results.primary.as_ref().unwrap();
        assert_eq!(primary.label, CandidateLabel::Lcp);
        assert_eq!(primary.info.src, "hero.jpg");
        assert_eq!(results.others.len(), 1);
        assert_eq!(results.others[0].info.src, "clip.jpg");
        assert_eq!(results.others[0].label, CandidateLabel::AboveTheFold);
    }

    #[test]
    fn inline_vectors_are_never_duplicates() {
        let results = assemble(vec![
            candidate(0, ContentKind::Image, "logo.png", 900.0),
            candidate(1, ContentKind::InlineVector, "logo.png", 100.0),
            candidate(2, ContentKind::InlineVector, "logo.png", 50.0),
        ]);
        assert_eq!(results.others.len(), 2);
    }

    #[test]
    fn empty_sources_collapse_after_the_first() {
        let results = assemble(vec![
            candidate(0, ContentKind::Image, "a.jpg", 900.0),
            candidate(1, ContentKind::Video, "", 800.0),
            candidate(2, ContentKind::Image, "", 700.0),
        ]);
        assert_eq!(results.others.len(), 1);
        assert_eq!(results.others[0].info.kind, ContentKind::Video);
    }

    #[test]
    fn assembling_twice_removes_nothing_more() {
        let once = assemble(vec![
            candidate(0, ContentKind::BackgroundImageSet, "a.avif", 900.0),
            candidate(1, ContentKind::Image, "b.jpg", 800.0),
            candidate(2, ContentKind::Image, "a.avif", 700.0),
            candidate(3, ContentKind::InlineVector, "b.jpg", 600.0),
            candidate(4, ContentKind::ImageSrcset, "b.jpg", 500.0),
        ]);
        let twice = reassemble(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
