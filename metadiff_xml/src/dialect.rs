//! Identity rules: which child field identifies an element of a given type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tree::XmlTreeElement;

/// Joins the parts of a composite identity key.
pub const COMPOSITE_SEPARATOR: &str = "::";
/// Replaces [`COMPOSITE_SEPARATOR`] in keys shown to people.
pub const DISPLAY_SEPARATOR: &str = " / ";
/// Rule-table spelling of [`KeyField::SelfKeyed`].
pub const SELF_KEY_SENTINEL: &str = "_self";

/// How the identity key of an element type is derived.
///
/// In rule tables a string names a single field, an array names the fields of
/// a composite key, and `"_self"` marks a type that occurs at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "KeyFieldRepr", into = "KeyFieldRepr")]
pub enum KeyField {
    /// Text of one child field.
    Single(String),
    /// Several child fields joined with [`COMPOSITE_SEPARATOR`].
    Composite(Vec<String>),
    /// The type name itself is the key.
    SelfKeyed,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum KeyFieldRepr {
    One(String),
    Many(Vec<String>),
}

impl From<KeyFieldRepr> for KeyField {
    fn from(repr: KeyFieldRepr) -> Self {
        match repr {
            KeyFieldRepr::One(field) if field == SELF_KEY_SENTINEL => KeyField::SelfKeyed,
            KeyFieldRepr::One(field) => KeyField::Single(field),
            KeyFieldRepr::Many(fields) => KeyField::Composite(fields),
        }
    }
}

impl From<KeyField> for KeyFieldRepr {
    fn from(field: KeyField) -> Self {
        match field {
            KeyField::Single(field) => KeyFieldRepr::One(field),
            KeyField::Composite(fields) => KeyFieldRepr::Many(fields),
            KeyField::SelfKeyed => KeyFieldRepr::One(SELF_KEY_SENTINEL.to_string()),
        }
    }
}

impl KeyField {
    /// Composite key from a list of field names.
    pub fn composite<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyField::Composite(fields.into_iter().map(Into::into).collect())
    }
}

/// Extension point for identity rules of one XML vocabulary.
pub trait Dialect {
    /// Short name used in logs and reports.
    fn dialect_name(&self) -> &str;
    /// Identity rule for a type, if the type has one.
    fn key_field(&self, type_name: &str) -> Option<&KeyField>;
    /// Human-readable name of a type.
    fn human_label(&self, _type_name: &str) -> Option<&str> {
        None
    }
    /// Whether a document root belongs to this vocabulary.
    fn is_known_root(&self, _root_tag: &str) -> bool {
        false
    }
}

impl<T: Dialect + ?Sized> Dialect for &T {
    fn dialect_name(&self) -> &str {
        (**self).dialect_name()
    }

    fn key_field(&self, type_name: &str) -> Option<&KeyField> {
        (**self).key_field(type_name)
    }

    fn human_label(&self, type_name: &str) -> Option<&str> {
        (**self).human_label(type_name)
    }

    fn is_known_root(&self, root_tag: &str) -> bool {
        (**self).is_known_root(root_tag)
    }
}

impl<T: Dialect + ?Sized> Dialect for Box<T> {
    fn dialect_name(&self) -> &str {
        (**self).dialect_name()
    }

    fn key_field(&self, type_name: &str) -> Option<&KeyField> {
        (**self).key_field(type_name)
    }

    fn human_label(&self, type_name: &str) -> Option<&str> {
        (**self).human_label(type_name)
    }

    fn is_known_root(&self, root_tag: &str) -> bool {
        (**self).is_known_root(root_tag)
    }
}

/// Dialect without rules: every type is matched by content.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn dialect_name(&self) -> &str {
        "generic"
    }

    fn key_field(&self, _type_name: &str) -> Option<&KeyField> {
        None
    }
}

/// Table-driven dialect, usually deserialized from a `[rules]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub roots: Vec<String>,
    pub key_fields: IndexMap<String, KeyField>,
    pub labels: IndexMap<String, String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for `type_name`, optionally with its label.
    pub fn with_rule(mut self, type_name: &str, key: KeyField, label: Option<&str>) -> Self {
        self.key_fields.insert(type_name.to_string(), key);
        if let Some(label) = label {
            self.labels.insert(type_name.to_string(), label.to_string());
        }
        self
    }

    pub fn with_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.key_fields.is_empty() && self.labels.is_empty() && self.roots.is_empty()
    }
}

impl Dialect for RuleSet {
    fn dialect_name(&self) -> &str {
        "rules"
    }

    fn key_field(&self, type_name: &str) -> Option<&KeyField> {
        self.key_fields.get(type_name)
    }

    fn human_label(&self, type_name: &str) -> Option<&str> {
        self.labels.get(type_name).map(String::as_str)
    }

    fn is_known_root(&self, root_tag: &str) -> bool {
        self.roots.iter().any(|root| root == root_tag)
    }
}

/// Consults `primary` first and falls back to `fallback` per lookup.
#[derive(Debug, Clone, Default)]
pub struct Layered<A, B> {
    pub primary: A,
    pub fallback: B,
}

impl<A, B> Layered<A, B> {
    pub fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: Dialect, B: Dialect> Dialect for Layered<A, B> {
    fn dialect_name(&self) -> &str {
        self.fallback.dialect_name()
    }

    fn key_field(&self, type_name: &str) -> Option<&KeyField> {
        self.primary
            .key_field(type_name)
            .or_else(|| self.fallback.key_field(type_name))
    }

    fn human_label(&self, type_name: &str) -> Option<&str> {
        self.primary
            .human_label(type_name)
            .or_else(|| self.fallback.human_label(type_name))
    }

    fn is_known_root(&self, root_tag: &str) -> bool {
        self.primary.is_known_root(root_tag) || self.fallback.is_known_root(root_tag)
    }
}

/// Derive the identity key of `element` (of type `type_name`) under `rule`.
///
/// Key fields are looked up by qualified name among all descendants, first
/// match in document order. A prefixed field such as `<sf:name>` does not
/// match the rule field `name`.
pub fn resolve_identity_key(
    element: &XmlTreeElement,
    type_name: &str,
    rule: &KeyField,
) -> Option<String> {
    match rule {
        KeyField::SelfKeyed => Some(type_name.to_string()),
        KeyField::Single(field) => {
            let value = field_value(element, field);
            (!value.is_empty()).then_some(value)
        }
        KeyField::Composite(fields) => {
            let parts = fields
                .iter()
                .map(|field| field_value(element, field))
                .collect::<Vec<_>>();
            if parts.first().is_none_or(String::is_empty) {
                return None;
            }
            Some(parts.join(COMPOSITE_SEPARATOR))
        }
    }
}

fn field_value(element: &XmlTreeElement, field: &str) -> String {
    element
        .find_descendant(field)
        .map(|found| found.text_content().trim().to_string())
        .unwrap_or_default()
}

/// Render an identity key for people, or fall back to the type name.
///
/// Trailing empty composite parts are dropped and the remaining separators
/// become [`DISPLAY_SEPARATOR`].
pub fn display_key(identity_key: Option<&str>, type_name: &str) -> String {
    let Some(key) = identity_key else {
        return type_name.to_string();
    };
    let stripped = key.trim_end_matches(':');
    let key = if key.len() - stripped.len() >= 2 {
        stripped
    } else {
        key
    };
    key.replace(COMPOSITE_SEPARATOR, DISPLAY_SEPARATOR)
}

/// Label of a type: the dialect's, or one derived from the type name.
pub fn human_type<D: Dialect + ?Sized>(dialect: &D, type_name: &str) -> String {
    dialect
        .human_label(type_name)
        .map(ToString::to_string)
        .unwrap_or_else(|| derive_human_label(type_name))
}

/// `fieldPermissions` becomes `field Permissions`, `ABC` becomes `A B C`.
pub fn derive_human_label(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len() + 4);
    for ch in type_name.chars() {
        if ch.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(ch);
    }
    out.trim().to_string()
}
