use std::str::Utf8Error;

/// Reasons a document is rejected as not well-formed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum XmlParseError {
    /// Syntax error reported by quick-xml.
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// Malformed or duplicated attribute.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Invalid escape sequence in an attribute value.
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Text that cannot be decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Raw bytes that are not UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("document has no root element")]
    MissingRoot,

    #[error("extra content after root element: <{name}>")]
    MultipleRoots { name: String },

    #[error("text outside of the root element")]
    TextOutsideRoot,

    #[error("element <{name}> is never closed")]
    UnclosedElement { name: String },

    #[error("closing tag </{name}> has no matching opening tag")]
    UnexpectedEnd { name: String },

    #[error("expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: String, found: String },

    #[error("unknown entity reference &{0};")]
    UnknownEntity(String),

    #[error("namespace prefix `{0}` is not bound")]
    UnboundPrefix(String),

    #[error("`{0}` is not a valid XML name")]
    InvalidName(String),

    #[error("character reference &{0}; is not a legal XML character")]
    IllegalCharacter(String),

    #[error("elements nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}
