//! Content classification of candidate nodes.

use foldbeacon_render_tree::traverse::{descendants_by_tag, first_descendant_by_tag};
use foldbeacon_render_tree::{NodeId, PseudoElement, RenderTree, TreeError};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{BackgroundSource, ContentKind, ElementInfo, PictureSource};

static CSS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)url\(\s*['"]?\s*(.+?)\s*['"]?\s*\)"#).unwrap()
});

/// Style sources consulted for a background, in priority order.
const BACKGROUND_LAYERS: [Option<PseudoElement>; 3] =
    [None, Some(PseudoElement::After), Some(PseudoElement::Before)];

/// Classifies `node`. `Ok(None)` means the node paints nothing worth
/// reporting; `Err` means the tree could not answer for this node.
pub fn classify<T: RenderTree + ?Sized>(
    tree: &T,
    node: NodeId,
) -> Result<Option<ElementInfo>, TreeError> {
    let tag = tree.tag_name(node);
    let info = match tag.as_str() {
        "img" => Some(image(tree, node)),
        "video" => Some(video(tree, node)),
        "svg" => inline_vector(tree, node),
        "picture" => Some(picture(tree, node)),
        _ => background(tree, node)?,
    };
    Ok(info)
}

fn attr_or_empty<T: RenderTree + ?Sized>(tree: &T, node: NodeId, name: &str) -> String {
    tree.attribute(node, name).unwrap_or_default()
}

fn image<T: RenderTree + ?Sized>(tree: &T, node: NodeId) -> ElementInfo {
    let srcset = attr_or_empty(tree, node, "srcset");
    let mut info = if srcset.trim().is_empty() {
        ElementInfo::new(ContentKind::Image)
    } else {
        let mut info = ElementInfo::new(ContentKind::ImageSrcset);
        info.srcset = srcset;
        info.sizes = attr_or_empty(tree, node, "sizes");
        info
    };
    info.src = attr_or_empty(tree, node, "src");
    info.current_src = tree
        .attribute(node, "currentsrc")
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| info.src.clone());
    info
}

fn video<T: RenderTree + ?Sized>(tree: &T, node: NodeId) -> ElementInfo {
    let mut info = ElementInfo::new(ContentKind::Video);
    info.src = tree
        .attribute(node, "poster")
        .filter(|poster| !poster.is_empty())
        .or_else(|| {
            first_descendant_by_tag(tree, node, "source")
                .and_then(|source| tree.attribute(source, "src"))
        })
        .unwrap_or_default();
    info.current_src = info.src.clone();
    info
}

fn inline_vector<T: RenderTree + ?Sized>(tree: &T, node: NodeId) -> Option<ElementInfo> {
    let image = first_descendant_by_tag(tree, node, "image")?;
    let mut info = ElementInfo::new(ContentKind::InlineVector);
    info.src = tree
        .attribute(image, "href")
        .or_else(|| tree.attribute(image, "xlink:href"))
        .unwrap_or_default();
    info.current_src = info.src.clone();
    Some(info)
}

fn picture<T: RenderTree + ?Sized>(tree: &T, node: NodeId) -> ElementInfo {
    let mut info = ElementInfo::new(ContentKind::Picture);
    info.src = first_descendant_by_tag(tree, node, "img")
        .map(|img| attr_or_empty(tree, img, "src"))
        .unwrap_or_default();
    info.sources = descendants_by_tag(tree, node, "source")
        .into_iter()
        .map(|source| PictureSource {
            srcset: attr_or_empty(tree, source, "srcset"),
            media: attr_or_empty(tree, source, "media"),
            mime_type: attr_or_empty(tree, source, "type"),
            sizes: attr_or_empty(tree, source, "sizes"),
        })
        .collect();
    info
}

fn background<T: RenderTree + ?Sized>(
    tree: &T,
    node: NodeId,
) -> Result<Option<ElementInfo>, TreeError> {
    let mut chosen = None;
    for pseudo in BACKGROUND_LAYERS {
        let style = tree.computed_style(node, pseudo)?;
        let value = style.get("background-image").unwrap_or("").trim();
        if !value.is_empty() && !value.eq_ignore_ascii_case("none") {
            chosen = Some(value.to_string());
            break;
        }
    }
    Ok(chosen.and_then(|value| classify_background(&value)))
}

/// Classifies a resolved `background-image` value.
pub fn classify_background(value: &str) -> Option<ElementInfo> {
    if value.contains("data:image") {
        return None;
    }
    let tokens = extract_urls(value);
    let first = tokens.first()?.clone();

    let is_set = value.to_ascii_lowercase().contains("image-set(");
    let mut info = if is_set {
        let mut info = ElementInfo::new(ContentKind::BackgroundImageSet);
        info.bg_set = tokens
            .into_iter()
            .map(|src| BackgroundSource { src })
            .collect();
        info
    } else {
        let mut info = ElementInfo::new(ContentKind::BackgroundImage);
        info.bg_set = vec![BackgroundSource { src: first.clone() }];
        info
    };
    info.src = first;
    Some(info)
}

/// All `url(...)` arguments of a CSS value, unquoted and trimmed.
pub fn extract_urls(value: &str) -> Vec<String> {
    CSS_URL
        .captures_iter(value)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_matches(['"', '\'']).to_string())
        .filter(|src| !src.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldbeacon_core_types::Size;
    use foldbeacon_render_tree::{NodeSpec, PageSnapshot};

    fn single(node: NodeSpec) -> PageSnapshot {
        PageSnapshot::builder(Size::new(1280.0, 800.0)).build(node)
    }

    #[test]
    fn img_with_srcset_carries_responsive_fields() {
        let tree = single(
            NodeSpec::new("img")
                .attr("src", "https://cdn.test/hero.jpg")
                .attr("srcset", "hero-1x.jpg 1x, hero-2x.jpg 2x")
                .attr("sizes", "100vw"),
        );
        let info = classify(&tree, NodeId(0)).unwrap().unwrap();
        assert_eq!(info.kind, ContentKind::ImageSrcset);
        assert_eq!(info.srcset, "hero-1x.jpg 1x, hero-2x.jpg 2x");
        assert_eq!(info.sizes, "100vw");
        assert_eq!(info.current_src, "https://cdn.test/hero.jpg");
    }

    #[test]
    fn plain_img_prefers_current_src() {
        let tree = single(
            NodeSpec::new("img")
                .attr("src", "a.jpg")
                .attr("currentSrc", "https://cdn.test/a.jpg"),
        );
        let info = classify(&tree, NodeId(0)).unwrap().unwrap();
        assert_eq!(info.kind, ContentKind::Image);
        assert_eq!(info.src, "a.jpg");
        assert_eq!(info.current_src, "https://cdn.test/a.jpg");
    }

    #[test]
    fn video_falls_back_to_first_source() {
        let tree = single(
            NodeSpec::new("video")
                .child(NodeSpec::new("source").attr("src", "clip.mp4"))
                .child(NodeSpec::new("source").attr("src", "clip.webm")),
        );
        let info = classify(&tree, NodeId(0)).unwrap().unwrap();
        assert_eq!(info.kind, ContentKind::Video);
        assert_eq!(info.src, "clip.mp4");

        let with_poster = single(NodeSpec::new("video").attr("poster", "poster.jpg"));
        let info = classify(&with_poster, NodeId(0)).unwrap().unwrap();
        assert_eq!(info.src, "poster.jpg");
    }

    #[test]
    fn svg_needs_nested_image() {
        let empty = single(NodeSpec::new("svg").child(NodeSpec::new("path")));
        assert!(classify(&empty, NodeId(0)).unwrap().is_none());

        let with_image = single(
            NodeSpec::new("svg").child(NodeSpec::new("image").attr("xlink:href", "logo.png")),
        );
        let info = classify(&with_image, NodeId(0)).unwrap().unwrap();
        assert_eq!(info.kind, ContentKind::InlineVector);
        assert_eq!(info.src, "logo.png");
    }

    #[test]
    fn picture_collects_sources() {
        let tree = single(
            NodeSpec::new("picture")
                .child(
                    NodeSpec::new("source")
                        .attr("srcset", "hero.avif")
                        .attr("type", "image/avif")
                        .attr("media", "(min-width: 800px)"),
                )
                .child(NodeSpec::new("source").attr("srcset", "hero.webp"))
                .child(NodeSpec::new("img").attr("src", "hero.jpg")),
        );
        let info = classify(&tree, NodeId(0)).unwrap().unwrap();
        assert_eq!(info.kind, ContentKind::Picture);
        assert_eq!(info.src, "hero.jpg");
        assert_eq!(info.sources.len(), 2);
        assert_eq!(info.sources[0].mime_type, "image/avif");
        assert_eq!(info.sources[0].media, "(min-width: 800px)");
        assert_eq!(info.sources[1].sizes, "");
    }

    #[test]
    fn background_none_everywhere_has_no_content() {
        let tree = single(
            NodeSpec::new("div")
                .style("background-image", "none")
                .pseudo_style(PseudoElement::Before, "background-image", "none")
                .pseudo_style(PseudoElement::After, "background-image", "none"),
        );
        assert!(classify(&tree, NodeId(0)).unwrap().is_none());
    }

    #[test]
    fn background_prefers_after_over_before() {
        let tree = single(
            NodeSpec::new("div")
                .style("background-image", "none")
                .pseudo_style(PseudoElement::Before, "background-image", "url(before.png)")
                .pseudo_style(PseudoElement::After, "background-image", "url('after.png')"),
        );
        let info = classify(&tree, NodeId(0)).unwrap().unwrap();
        assert_eq!(info.kind, ContentKind::BackgroundImage);
        assert_eq!(info.src, "after.png");
        assert_eq!(info.bg_set, vec![BackgroundSource { src: "after.png".into() }]);
    }

    #[test]
    fn image_set_keeps_every_token() {
        let info = classify_background(
            r#"image-set(url("hero.avif") type("image/avif") 1x, url( "hero@2x.jpg" ) 2x)"#,
        )
        .unwrap();
        assert_eq!(info.kind, ContentKind::BackgroundImageSet);
        assert_eq!(info.src, "hero.avif");
        let srcs: Vec<&str> = info.bg_set.iter().map(|b| b.src.as_str()).collect();
        assert_eq!(srcs, vec!["hero.avif", "hero@2x.jpg"]);
    }

    #[test]
    fn padded_quotes_stay_out_of_tokens() {
        for value in [
            r#"url( "hero.jpg" )"#,
            "url( 'hero.jpg' )",
            "url(  hero.jpg  )",
            "URL('hero.jpg')",
        ] {
            assert_eq!(extract_urls(value), vec!["hero.jpg"], "{value}");
        }
    }

    #[test]
    fn plain_background_keeps_first_token_only() {
        let info = classify_background("url(a.png), url(b.png)").unwrap();
        assert_eq!(info.kind, ContentKind::BackgroundImage);
        assert_eq!(info.bg_set.len(), 1);
        assert_eq!(info.src, "a.png");
    }

    #[test]
    fn inline_data_and_gradients_are_rejected() {
        assert!(classify_background("url(data:image/png;base64,AAAA)").is_none());
        assert!(classify_background("linear-gradient(red, blue)").is_none());
    }
}
