//! Evaluation of parsed selectors against an HTML document tree.
//!
//! [`DomElement`] exposes a `scraper` element to the `selectors` matching
//! engine. State pseudo-classes hold everywhere except inside a negation,
//! pseudo-elements fall through to their originating element. The document
//! is only read.

use scraper::selector::{CssLocalName, CssString};
use scraper::{ElementRef, Html, Node};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{
    self, ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode,
};
use selectors::{Element, NthIndexCache, OpaqueElement};

use super::selector::{StaticPseudoClass, StaticPseudoElement, StaticSelectorList, StaticSelectors};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Whether any element of `document` matches one of `selectors`.
pub fn query_matches(selectors: &StaticSelectorList, document: &Html) -> bool {
    let mut nth_cache = NthIndexCache::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut nth_cache,
        QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        IgnoreNthChildForInvalidation::No,
    );

    document
        .tree
        .nodes()
        .filter_map(ElementRef::wrap)
        .map(DomElement)
        .any(|element| {
            selectors
                .0
                .iter()
                .any(|selector| matching::matches_selector(selector, 0, None, &element, &mut context))
        })
}

/// Read-only view of a `scraper` element for the matching engine.
#[derive(Debug, Clone, Copy)]
pub struct DomElement<'a>(pub ElementRef<'a>);

impl<'a> DomElement<'a> {
    /// Nearest `lang` attribute on this element or an ancestor.
    fn language(&self) -> Option<&'a str> {
        let mut current = Some(self.0);
        while let Some(element) = current {
            if let Some(lang) = element.value().attr("lang") {
                return Some(lang);
            }
            current = element.parent().and_then(ElementRef::wrap);
        }
        None
    }
}

/// `lang` equals `range` or starts with `range` followed by `-`, ignoring
/// ASCII case.
fn language_matches(lang: &str, range: &str) -> bool {
    if range.is_empty() {
        return false;
    }
    match lang.get(..range.len()) {
        Some(head) if head.eq_ignore_ascii_case(range) => {
            lang.len() == range.len() || lang[range.len()..].starts_with('-')
        }
        _ => false,
    }
}

impl<'a> Element for DomElement<'a> {
    type Impl = StaticSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.0.value())
    }

    fn parent_element(&self) -> Option<Self> {
        self.0.parent().and_then(ElementRef::wrap).map(DomElement)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn pseudo_element_originating_element(&self) -> Option<Self> {
        Some(*self)
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.0.prev_siblings().find_map(ElementRef::wrap).map(DomElement)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.0.next_siblings().find_map(ElementRef::wrap).map(DomElement)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.0.children().find_map(ElementRef::wrap).map(DomElement)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        &*self.0.value().name.ns == HTML_NAMESPACE
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.0.value().name.local == name.0
    }

    fn has_namespace(&self, ns: &CssLocalName) -> bool {
        *self.0.value().name.ns == *ns.0
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.0.value().name == other.0.value().name
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssLocalName>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        self.0.value().attrs.iter().any(|(key, value)| {
            let namespace_ok = match *ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(url) => *key.ns == *url.0,
            };
            namespace_ok && key.local == local_name.0 && operation.eval_str(value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &StaticPseudoClass,
        context: &mut MatchingContext<StaticSelectors>,
    ) -> bool {
        match pc {
            // a negated state may or may not hold, so the negation stays satisfiable
            StaticPseudoClass::State(_) => !context.in_negation(),
            StaticPseudoClass::Lang(range) => self
                .language()
                .is_some_and(|lang| language_matches(lang, range)),
            StaticPseudoClass::Contains(text) => {
                self.0.text().collect::<String>().contains(text.as_str())
            }
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &StaticPseudoElement,
        _context: &mut MatchingContext<StaticSelectors>,
    ) -> bool {
        true
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.0
            .value()
            .id()
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.0.value().has_class(&name.0, case_sensitivity)
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.0.children().all(|child| match child.value() {
            Node::Element(_) => false,
            Node::Text(text) => text.is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        self.0
            .parent()
            .is_some_and(|parent| parent.value().is_document())
    }
}
