//! Selector parsing on top of the `selectors` crate.
//!
//! Type, universal, id, class and attribute selectors, combinators,
//! structural pseudo-classes and `:not()` are handled by the crate itself.
//! Every other pseudo-class or pseudo-element name is routed through
//! [`classify_pseudo`] so static matching decides what it means.

use std::fmt;

use cssparser::{CowRcStr, ParseError, ParseErrorKind, ParserInput, SourceLocation, ToCss};
use scraper::selector::{CssLocalName, CssString};
use selectors::parser::{self, ParseRelative, SelectorList, SelectorParseErrorKind};

use super::pseudo::{classify_pseudo, PseudoKind};
use crate::error::{DeadcssError, DeadcssResult};

/// Selector vocabulary used for static DOM matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSelectors;

impl parser::SelectorImpl for StaticSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssLocalName;
    type LocalName = CssLocalName;
    type NamespacePrefix = CssLocalName;
    type NamespaceUrl = CssLocalName;
    type BorrowedNamespaceUrl = CssLocalName;
    type BorrowedLocalName = CssLocalName;

    type NonTSPseudoClass = StaticPseudoClass;
    type PseudoElement = StaticPseudoElement;
}

/// Pseudo-classes the crate does not evaluate on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticPseudoClass {
    /// Runtime state (`:hover`, `:checked`, ...), satisfied by every element
    State(String),
    /// `:lang(range)`
    Lang(String),
    /// `:contains("text")`
    Contains(String),
}

impl parser::NonTSPseudoClass for StaticPseudoClass {
    type Impl = StaticSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, Self::State(name) if name == "hover" || name == "active")
    }

    fn is_user_action_state(&self) -> bool {
        matches!(self, Self::State(_))
    }
}

impl ToCss for StaticPseudoClass {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match self {
            Self::State(name) => {
                dest.write_char(':')?;
                cssparser::serialize_identifier(name, dest)
            }
            Self::Lang(range) => {
                dest.write_str(":lang(")?;
                cssparser::serialize_identifier(range, dest)?;
                dest.write_char(')')
            }
            Self::Contains(text) => {
                dest.write_str(":contains(")?;
                cssparser::serialize_string(text, dest)?;
                dest.write_char(')')
            }
        }
    }
}

/// Any pseudo-element. It never corresponds to a DOM node, so matching
/// falls through to the element it is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPseudoElement(pub String);

impl parser::PseudoElement for StaticPseudoElement {
    type Impl = StaticSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        true
    }
}

impl ToCss for StaticPseudoElement {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("::")?;
        cssparser::serialize_identifier(&self.0, dest)
    }
}

/// Parse hooks consulting [`classify_pseudo`].
#[derive(Debug, Clone, Copy)]
pub struct StaticParser;

impl<'i> parser::Parser<'i> for StaticParser {
    type Impl = StaticSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<StaticPseudoClass, ParseError<'i, Self::Error>> {
        match classify_pseudo(&name) {
            PseudoKind::AlwaysMatches => Ok(StaticPseudoClass::State(name.to_ascii_lowercase())),
            _ => Err(location.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
            )),
        }
    }

    fn parse_non_ts_functional_pseudo_class<'t>(
        &self,
        name: CowRcStr<'i>,
        arguments: &mut cssparser::Parser<'i, 't>,
    ) -> Result<StaticPseudoClass, ParseError<'i, Self::Error>> {
        match classify_pseudo(&name) {
            PseudoKind::Language => {
                let range = (**arguments.expect_ident_or_string()?).to_owned();
                arguments.expect_exhausted()?;
                Ok(StaticPseudoClass::Lang(range))
            }
            PseudoKind::TextContent => {
                let text = (**arguments.expect_ident_or_string()?).to_owned();
                arguments.expect_exhausted()?;
                Ok(StaticPseudoClass::Contains(text))
            }
            _ => Err(arguments.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
            )),
        }
    }

    fn parse_pseudo_element(
        &self,
        _location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<StaticPseudoElement, ParseError<'i, Self::Error>> {
        Ok(StaticPseudoElement(name.to_ascii_lowercase()))
    }
}

/// Parsed comma separated selector list.
pub type StaticSelectorList = SelectorList<StaticSelectors>;

/// Parse `text` into a selector list.
pub fn parse_selector_list(text: &str) -> DeadcssResult<StaticSelectorList> {
    let mut input = ParserInput::new(text);
    let mut parser = cssparser::Parser::new(&mut input);
    SelectorList::parse(&StaticParser, &mut parser, ParseRelative::No)
        .map_err(|e| selector_error(text, e))
}

fn selector_error(text: &str, error: ParseError<'_, SelectorParseErrorKind<'_>>) -> DeadcssError {
    let message = match &error.kind {
        ParseErrorKind::Basic(kind) => kind.to_string(),
        ParseErrorKind::Custom(kind) => describe(kind),
    };
    DeadcssError::selector_at(text, message, offset_of(text, error.location))
}

fn describe(kind: &SelectorParseErrorKind<'_>) -> String {
    match kind {
        SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name) => {
            format!("unsupported pseudo-class :{}", name)
        }
        SelectorParseErrorKind::ExpectedNamespace(prefix) => {
            format!("unknown namespace prefix \"{}\"", prefix)
        }
        SelectorParseErrorKind::EmptySelector => "empty selector".to_string(),
        SelectorParseErrorKind::DanglingCombinator => "dangling combinator".to_string(),
        other => format!("{:?}", other),
    }
}

/// Byte offset of a parser location (0-based line, 1-based column).
fn offset_of(text: &str, location: SourceLocation) -> usize {
    let line_start: usize = text
        .split('\n')
        .take(location.line as usize)
        .map(|line| line.len() + 1)
        .sum();
    (line_start + (location.column as usize).saturating_sub(1)).min(text.len())
}
