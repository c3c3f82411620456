//! Owned element tree built from quick-xml events.

use std::ops::Range;

use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::error::XmlParseError;

/// Deepest element nesting accepted by [`parse_document`].
pub const MAX_DEPTH: usize = 256;

/// Parsed document borrowing its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument<'a> {
    source: &'a str,
    pub root: XmlTreeElement,
}

impl<'a> XmlDocument<'a> {
    /// Verbatim source text of an element of this document.
    pub fn raw(&self, element: &XmlTreeElement) -> &'a str {
        self.source.get(element.span.clone()).unwrap_or_default()
    }
}

/// One element with its attributes and child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTreeElement {
    /// Qualified name as written, including any prefix.
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
    /// Byte range of the element in the document source.
    pub span: Range<usize>,
}

/// Attribute with its value already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

/// Child node of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlTreeElement),
    /// Character data with entity references resolved.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl XmlTreeElement {
    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Immediate child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlTreeElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text and CDATA of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// First descendant element, in document order, whose qualified name is `name`.
    ///
    /// The element itself is not a candidate.
    pub fn find_descendant(&self, name: &str) -> Option<&XmlTreeElement> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }
}

/// Strip a `prefix:` from a qualified name.
pub fn local_name(qualified: &str) -> &str {
    qualified
        .split_once(':')
        .map_or(qualified, |(_, local)| local)
}

fn collect_text(element: &XmlTreeElement, out: &mut String) {
    for node in &element.children {
        match node {
            XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
            XmlNode::Element(child) => collect_text(child, out),
            XmlNode::Comment(_) | XmlNode::ProcessingInstruction(_) => {}
        }
    }
}

#[derive(Debug, Default)]
struct NamespaceScopes {
    frames: Vec<Vec<String>>,
}

impl NamespaceScopes {
    fn is_bound(&self, prefix: &str) -> bool {
        prefix == "xml"
            || prefix == "xmlns"
            || self
                .frames
                .iter()
                .any(|frame| frame.iter().any(|declared| declared == prefix))
    }
}

/// Parse a complete document into an element tree.
///
/// Rejects anything a namespace-aware DOM parser would reject for the inputs
/// this crate cares about: syntax errors, unbalanced tags, zero or several root
/// elements, stray text around the root, unknown entities and unbound prefixes,
/// invalid names, references to illegal characters and nesting deeper than
/// [`MAX_DEPTH`].
pub fn parse_document(input: &str) -> Result<XmlDocument<'_>, XmlParseError> {
    let source = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlTreeElement> = Vec::new();
    let mut scopes = NamespaceScopes::default();
    let mut root: Option<XmlTreeElement> = None;

    loop {
        let start = offset(&reader);
        let event = reader.read_event()?;
        let end = offset(&reader);

        match event {
            Event::Start(e) => {
                let element =
                    open_element(&reader, &e, start, root.is_some(), &stack, &mut scopes)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let mut element =
                    open_element(&reader, &e, start, root.is_some(), &stack, &mut scopes)?;
                element.span = start..end;
                scopes.frames.pop();
                attach(&mut stack, &mut root, element);
            }
            Event::End(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                let Some(mut element) = stack.pop() else {
                    return Err(XmlParseError::UnexpectedEnd { name });
                };
                if element.name != name {
                    return Err(XmlParseError::MismatchedEnd {
                        expected: element.name,
                        found: name,
                    });
                }
                element.span.end = end;
                scopes.frames.pop();
                attach(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                let text = e.decode()?;
                match stack.last_mut() {
                    Some(parent) => push_text(parent, &text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlParseError::TextOutsideRoot),
                }
            }
            Event::GeneralRef(e) => {
                let text = resolve_reference(&reader, &e)?;
                match stack.last_mut() {
                    Some(parent) => push_text(parent, &text),
                    None => return Err(XmlParseError::TextOutsideRoot),
                }
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?.to_string();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::CData(text)),
                    None => return Err(XmlParseError::TextOutsideRoot),
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = std::str::from_utf8(e.as_ref())?.to_string();
                    parent.children.push(XmlNode::Comment(text));
                }
            }
            Event::PI(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = std::str::from_utf8(e.as_ref())?.to_string();
                    parent.children.push(XmlNode::ProcessingInstruction(text));
                }
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlParseError::UnclosedElement { name: open.name });
    }

    root.map(|root| XmlDocument { source, root })
        .ok_or(XmlParseError::MissingRoot)
}

fn offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn open_element(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
    at: usize,
    has_root: bool,
    stack: &[XmlTreeElement],
    scopes: &mut NamespaceScopes,
) -> Result<XmlTreeElement, XmlParseError> {
    let name = reader.decoder().decode(start.name().as_ref())?.into_owned();
    if stack.is_empty() && has_root {
        return Err(XmlParseError::MultipleRoots { name });
    }
    if stack.len() >= MAX_DEPTH {
        return Err(XmlParseError::TooDeep { limit: MAX_DEPTH });
    }
    if !is_xml_name(&name) {
        return Err(XmlParseError::InvalidName(name));
    }

    let mut attributes = Vec::new();
    let mut declared = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        if !is_xml_name(&key) {
            return Err(XmlParseError::InvalidName(key));
        }
        let value = attr.unescape_value()?.into_owned();
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.push(prefix.to_string());
        }
        attributes.push(XmlAttribute { name: key, value });
    }
    scopes.frames.push(declared);

    if let Some((prefix, _)) = name.split_once(':')
        && !scopes.is_bound(prefix)
    {
        return Err(XmlParseError::UnboundPrefix(prefix.to_string()));
    }
    for attribute in &attributes {
        if let Some((prefix, _)) = attribute.name.split_once(':')
            && !scopes.is_bound(prefix)
        {
            return Err(XmlParseError::UnboundPrefix(prefix.to_string()));
        }
    }

    Ok(XmlTreeElement {
        name,
        attributes,
        children: Vec::new(),
        span: at..at,
    })
}

fn attach(
    stack: &mut [XmlTreeElement],
    root: &mut Option<XmlTreeElement>,
    element: XmlTreeElement,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => *root = Some(element),
    }
}

fn push_text(parent: &mut XmlTreeElement, text: &str) {
    if let Some(XmlNode::Text(existing)) = parent.children.last_mut() {
        existing.push_str(text);
    } else {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
}

fn resolve_reference(
    reader: &Reader<&[u8]>,
    reference: &BytesRef<'_>,
) -> Result<String, XmlParseError> {
    let name = reader.decoder().decode(reference)?;
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        let Some(ch) = parsed.and_then(char::from_u32) else {
            return Err(XmlParseError::UnknownEntity(name.to_string()));
        };
        if !is_xml_char(ch) {
            return Err(XmlParseError::IllegalCharacter(name.to_string()));
        }
        return Ok(ch.to_string());
    }
    resolve_xml_entity(&name)
        .map(ToString::to_string)
        .ok_or_else(|| XmlParseError::UnknownEntity(name.to_string()))
}

/// The `Char` production of XML 1.0.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn is_name_start_char(ch: char) -> bool {
    matches!(
        ch,
        ':' | 'A'..='Z'
            | '_'
            | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch)
        || matches!(
            ch,
            '-' | '.'
                | '0'..='9'
                | '\u{B7}'
                | '\u{300}'..='\u{36F}'
                | '\u{203F}'..='\u{2040}'
        )
}

/// The `Name` production of XML 1.0.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}
