use std::sync::LazyLock;

use regex::Regex;

static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<[A-Za-z][A-Za-z0-9_.-]*[\s>/]").expect("valid regex")
});

/// Cheap check for whether `text` should be compared as XML.
///
/// Only the opening of the trimmed text is inspected: an XML declaration or an
/// opening tag is enough. This is not a well-formedness check, so truncated or
/// broken documents still count as XML.
pub fn looks_like_xml(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.starts_with("<?xml") || OPENING_TAG.is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use super::looks_like_xml;

    #[test]
    fn accepts_declarations_and_opening_tags() {
        assert!(looks_like_xml("<?xml version=\"1.0\"?><Profile/>"));
        assert!(looks_like_xml("  \n<Profile xmlns=\"urn:x\">"));
        assert!(looks_like_xml("<a>"));
        assert!(looks_like_xml("<br/>"));
        assert!(looks_like_xml("<ns.x-y_z\n>"));
        assert!(looks_like_xml("<root><unclosed>"));
    }

    #[test]
    fn rejects_plain_text_and_markup_lookalikes() {
        assert!(!looks_like_xml(""));
        assert!(!looks_like_xml("   \n\t"));
        assert!(!looks_like_xml("plain text"));
        assert!(!looks_like_xml("<"));
        assert!(!looks_like_xml("<a"));
        assert!(!looks_like_xml("<1abc>"));
        assert!(!looks_like_xml("<!-- comment -->"));
        assert!(!looks_like_xml("a < b > c"));
    }
}
