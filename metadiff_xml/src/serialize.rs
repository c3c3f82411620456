use std::sync::LazyLock;

use quick_xml::escape::{escape, partial_escape};
use regex::Regex;

use crate::XmlCompareOptions;
use crate::tree::{XmlNode, XmlTreeElement};

static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Canonical text of an element used for content matching.
pub fn normalized_xml(element: &XmlTreeElement, options: &XmlCompareOptions) -> String {
    let mut out = String::new();
    write_element(element, options, &mut out);

    if options.normalize_whitespace {
        let collapsed = BETWEEN_TAGS.replace_all(&out, "><");
        WHITESPACE_RUN
            .replace_all(&collapsed, " ")
            .trim()
            .to_string()
    } else {
        out
    }
}

fn write_element(element: &XmlTreeElement, options: &XmlCompareOptions, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attribute in &element.attributes {
        if is_namespace_declaration(&attribute.name) {
            continue;
        }
        out.push(' ');
        out.push_str(&attribute.name);
        out.push_str("=\"");
        out.push_str(&escape(attribute.value.as_str()));
        out.push('"');
    }

    let visible = element
        .children
        .iter()
        .filter(|node| !(options.ignore_comments && matches!(node, XmlNode::Comment(_))))
        .collect::<Vec<_>>();

    if visible.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for node in visible {
        match node {
            XmlNode::Element(child) => write_element(child, options, out),
            // CDATA is written as plain escaped text so both encodings compare equal.
            XmlNode::Text(text) | XmlNode::CData(text) => {
                out.push_str(&partial_escape(text.as_str()));
            }
            XmlNode::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            XmlNode::ProcessingInstruction(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}
