//! XML element extraction for order-insensitive metadata comparison.
//!
//! This crate provides:
//! - a permissive XML detector (`looks_like_xml`)
//! - a strict element tree parser (`parse_document`)
//! - per-element extraction of identity keys, normalized text and child
//!   fields (`parse_elements`)
//! - the `Dialect` extension point for identity rules, with `GenericDialect`,
//!   the table-driven `RuleSet` and `Layered`
//!
//! # Example
//!
//! ```rust
//! use metadiff_xml::{KeyField, RuleSet, XmlCompareOptions, parse_elements};
//!
//! let rules = RuleSet::new().with_rule("labels", KeyField::Single("fullName".into()), None);
//! let input = "<CustomLabels><labels><fullName>Greeting</fullName></labels></CustomLabels>";
//! let parsed = parse_elements(input, &XmlCompareOptions::default(), &rules);
//! assert_eq!(parsed.root_tag, "CustomLabels");
//! assert_eq!(parsed.elements[0].identity_key.as_deref(), Some("Greeting"));
//! ```

mod detect;
mod dialect;
mod error;
mod serialize;
mod tree;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use detect::looks_like_xml;
pub use dialect::{
    COMPOSITE_SEPARATOR, DISPLAY_SEPARATOR, Dialect, GenericDialect, KeyField, Layered, RuleSet,
    SELF_KEY_SENTINEL, derive_human_label, display_key, human_type, resolve_identity_key,
};
pub use error::XmlParseError;
pub use serialize::normalized_xml;
pub use tree::{
    MAX_DEPTH, XmlAttribute, XmlDocument, XmlNode, XmlTreeElement, local_name, parse_document,
};

/// Normalization applied before elements are compared by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlCompareOptions {
    /// Drop comments from normalized serialization.
    pub ignore_comments: bool,
    /// Collapse insignificant whitespace in normalized serialization.
    pub normalize_whitespace: bool,
}

impl Default for XmlCompareOptions {
    fn default() -> Self {
        Self {
            ignore_comments: true,
            normalize_whitespace: true,
        }
    }
}

/// One immediate child of the document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    /// Local name of the element.
    pub type_name: String,
    pub identity_key: Option<String>,
    pub display_key: String,
    pub human_type: String,
    /// Verbatim source text.
    pub raw_xml: String,
    pub normalized_xml: String,
    /// Child element local name to trimmed text content; last duplicate wins.
    pub children: IndexMap<String, String>,
}

/// Output of [`parse_elements`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedElements {
    /// Local name of the root element, empty on failure.
    pub root_tag: String,
    pub elements: Vec<XmlElement>,
    /// Parser diagnostic when the document is not well-formed.
    pub error: Option<String>,
}

impl ParsedElements {
    /// Whether the document parsed.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Extract the top-level elements of `text` under the rules of `dialect`.
///
/// Never fails: a malformed document yields an empty result carrying the
/// parser diagnostic in `error`.
pub fn parse_elements<D: Dialect + ?Sized>(
    text: &str,
    options: &XmlCompareOptions,
    dialect: &D,
) -> ParsedElements {
    let doc = match parse_document(text) {
        Ok(doc) => doc,
        Err(err) => {
            debug!(error = %err, "XML document rejected");
            return ParsedElements {
                root_tag: String::new(),
                elements: Vec::new(),
                error: Some(err.to_string()),
            };
        }
    };

    let elements = doc
        .root
        .child_elements()
        .map(|child| extract_element(&doc, child, options, dialect))
        .collect::<Vec<_>>();

    debug!(
        root = doc.root.local_name(),
        elements = elements.len(),
        dialect = dialect.dialect_name(),
        "parsed XML elements"
    );

    ParsedElements {
        root_tag: doc.root.local_name().to_string(),
        elements,
        error: None,
    }
}

fn extract_element<D: Dialect + ?Sized>(
    doc: &XmlDocument<'_>,
    element: &XmlTreeElement,
    options: &XmlCompareOptions,
    dialect: &D,
) -> XmlElement {
    let type_name = element.local_name().to_string();
    let identity_key = dialect
        .key_field(&type_name)
        .and_then(|rule| resolve_identity_key(element, &type_name, rule));

    let mut children = IndexMap::new();
    for child in element.child_elements() {
        children.insert(
            child.local_name().to_string(),
            child.text_content().trim().to_string(),
        );
    }

    XmlElement {
        display_key: display_key(identity_key.as_deref(), &type_name),
        human_type: human_type(dialect, &type_name),
        raw_xml: doc.raw(element).to_string(),
        normalized_xml: normalized_xml(element, options),
        children,
        identity_key,
        type_name,
    }
}
