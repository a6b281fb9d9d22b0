//! CSS selector matching over a [`PageSnapshot`].
//!
//! Parsing and matching are done by the `selectors` crate. Snapshot nodes are
//! exposed to it through [`SnapshotElement`]. Selectors that need live state
//! (`:hover`, `::before`, any non tree-structural pseudo-class or
//! pseudo-element) fail to parse and surface as
//! [`TreeError::UnsupportedSelector`].

use std::fmt;

use cssparser::{CowRcStr, Parser, ParserInput, SourceLocation, ToCss};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{
    matches_selector, ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext,
    MatchingMode, NeedsSelectorFlags, QuirksMode,
};
use selectors::parser::{ParseRelative, SelectorParseErrorKind};
use selectors::{NthIndexCache, OpaqueElement};

use crate::errors::TreeError;
use crate::ports::NodeId;
use crate::snapshot::{NodeData, PageSnapshot};

/// A parsed, comma separated selector list.
#[derive(Clone)]
pub struct SelectorList {
    list: selectors::parser::SelectorList<SnapshotSelectors>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, TreeError> {
        let mut input = ParserInput::new(selector);
        let mut parser = Parser::new(&mut input);
        let list = selectors::parser::SelectorList::parse(
            &SnapshotSelectorParser,
            &mut parser,
            ParseRelative::No,
        )
        .map_err(|err| {
            TreeError::selector(
                selector,
                format!("{:?} at column {}", err.kind, err.location.column),
            )
        })?;
        Ok(Self { list })
    }

    /// Matching nodes of `snapshot`, in document order.
    pub fn select(&self, snapshot: &PageSnapshot) -> Vec<NodeId> {
        let mut nth_index_cache = NthIndexCache::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut nth_index_cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );

        (0..snapshot.len())
            .map(NodeId)
            .filter(|&node| {
                SnapshotElement::new(snapshot, node).is_some_and(|element| {
                    self.list
                        .0
                        .iter()
                        .any(|selector| matches_selector(selector, 0, None, &element, &mut context))
                })
            })
            .collect()
    }
}

/// One snapshot node seen through the `selectors::Element` trait.
#[derive(Clone, Copy)]
pub struct SnapshotElement<'a> {
    snapshot: &'a PageSnapshot,
    node: NodeId,
    data: &'a NodeData,
}

impl fmt::Debug for SnapshotElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotElement")
            .field("node", &self.node)
            .field("tag", &self.data.tag)
            .finish_non_exhaustive()
    }
}

impl<'a> SnapshotElement<'a> {
    pub fn new(snapshot: &'a PageSnapshot, node: NodeId) -> Option<Self> {
        let data = snapshot.node(node)?;
        Some(Self {
            snapshot,
            node,
            data,
        })
    }

    fn at(&self, node: NodeId) -> Option<Self> {
        Self::new(self.snapshot, node)
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.data.attributes.get(name).map(String::as_str)
    }

    fn siblings(&self) -> &'a [NodeId] {
        self.data
            .parent
            .and_then(|parent| self.snapshot.node(parent))
            .map(|parent| parent.children.as_slice())
            .unwrap_or_default()
    }

    fn sibling_position(&self) -> Option<(usize, &'a [NodeId])> {
        let siblings = self.siblings();
        let position = siblings.iter().position(|&id| id == self.node)?;
        Some((position, siblings))
    }
}

impl selectors::Element for SnapshotElement<'_> {
    type Impl = SnapshotSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.data)
    }

    fn parent_element(&self) -> Option<Self> {
        self.data.parent.and_then(|parent| self.at(parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let (position, siblings) = self.sibling_position()?;
        position
            .checked_sub(1)
            .and_then(|prev| self.at(siblings[prev]))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let (position, siblings) = self.sibling_position()?;
        siblings.get(position + 1).and_then(|&next| self.at(next))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.data.children.first().and_then(|&child| self.at(child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.data.tag == local_name
    }

    fn has_namespace(&self, _ns: &()) -> bool {
        true
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.data.tag == other.data.tag
    }

    fn attr_matches(
        &self,
        _ns: &NamespaceConstraint<&()>,
        local_name: &CssIdent,
        operation: &AttrSelectorOperation<&CssIdent>,
    ) -> bool {
        let Some(value) = self.attr(&local_name.0.to_ascii_lowercase()) else {
            return false;
        };
        match operation {
            AttrSelectorOperation::Exists => true,
            AttrSelectorOperation::WithValue {
                operator,
                case_sensitivity,
                value: expected,
            } => operator.eval_str(value, &expected.0, *case_sensitivity),
        }
    }

    fn match_non_ts_pseudo_class(
        &self,
        pseudo: &NonTsPseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pseudo {}
    }

    fn match_pseudo_element(
        &self,
        pseudo: &SnapshotPseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pseudo {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        matches!(self.data.tag.as_str(), "a" | "area") && self.attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        self.data.tag == "slot"
    }

    fn has_id(&self, id: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("id")
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("class").is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssIdent) -> Option<CssIdent> {
        None
    }

    fn is_part(&self, _name: &CssIdent) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.data.children.is_empty()
    }

    fn is_root(&self) -> bool {
        self.data.parent.is_none()
    }
}

/// Identifier, attribute value and local name storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CssIdent(pub String);

impl From<&str> for CssIdent {
    fn from(value: &str) -> Self {
        CssIdent(value.to_string())
    }
}

impl std::borrow::Borrow<str> for CssIdent {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssIdent {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_string(&self.0, dest)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotSelectors;

impl selectors::SelectorImpl for SnapshotSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssIdent;
    type Identifier = CssIdent;
    type LocalName = CssIdent;
    type NamespacePrefix = CssIdent;
    type NamespaceUrl = ();
    type BorrowedLocalName = str;
    type BorrowedNamespaceUrl = ();
    type NonTSPseudoClass = NonTsPseudoClass;
    type PseudoElement = SnapshotPseudoElement;
}

/// Snapshots carry no interaction state, so no pseudo-class beyond the
/// tree-structural ones can match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NonTsPseudoClass {}

impl selectors::parser::NonTSPseudoClass for NonTsPseudoClass {
    type Impl = SnapshotSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for NonTsPseudoClass {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

/// Pseudo-element styles are read through `RenderTree::computed_style`,
/// never selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotPseudoElement {}

impl selectors::parser::PseudoElement for SnapshotPseudoElement {
    type Impl = SnapshotSelectors;
}

impl ToCss for SnapshotPseudoElement {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

struct SnapshotSelectorParser;

impl<'i> selectors::parser::Parser<'i> for SnapshotSelectorParser {
    type Impl = SnapshotSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<NonTsPseudoClass, cssparser::ParseError<'i, Self::Error>> {
        Err(location.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)))
    }

    fn parse_non_ts_functional_pseudo_class<'t>(
        &self,
        name: CowRcStr<'i>,
        parser: &mut Parser<'i, 't>,
    ) -> Result<NonTsPseudoClass, cssparser::ParseError<'i, Self::Error>> {
        Err(parser.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)))
    }

    fn parse_pseudo_element(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<SnapshotPseudoElement, cssparser::ParseError<'i, Self::Error>> {
        Err(location.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)))
    }

    fn default_namespace(&self) -> Option<()> {
        None
    }

    fn namespace_for_prefix(&self, _prefix: &CssIdent) -> Option<()> {
        None
    }
}
