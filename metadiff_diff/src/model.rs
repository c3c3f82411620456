use indexmap::IndexMap;
use metadiff_xml::XmlElement;
use serde::{Deserialize, Serialize};

/// Field value recorded for a child that exists on only one side.
pub const NOT_SET: &str = "(not set)";

/// Normalization rules for line-set comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Skip lines that are blank after trimming.
    pub ignore_empty: bool,
    /// Fold case before comparing.
    pub case_insensitive: bool,
    /// Compare and display lines without surrounding whitespace.
    pub trim_whitespace: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_empty: true,
            case_insensitive: false,
            trim_whitespace: true,
        }
    }
}

/// Counts of distinct normalized lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineStats {
    pub total_before: usize,
    pub total_after: usize,
    pub in_both_count: usize,
    pub missing_count: usize,
    pub added_count: usize,
}

/// Result of a line-set comparison.
///
/// Each bucket is deduplicated and keeps first-seen order of its source side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineComparison {
    pub in_both: Vec<String>,
    /// Present in Before only.
    pub missing: Vec<String>,
    /// Present in After only.
    pub added: Vec<String>,
    pub stats: LineStats,
    pub has_changes: bool,
}

/// Which input of a comparison a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Before,
    After,
}

/// Classification of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    Both,
    Missing,
    Added,
}

/// Element present on both sides with no field changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElementMatch {
    pub type_name: String,
    pub identity_key: Option<String>,
    pub display_key: String,
    pub human_type: String,
    /// The Before-side element.
    pub element: XmlElement,
}

/// One child field whose text differs between matched elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlFieldChange {
    pub field: String,
    pub before: String,
    pub after: String,
}

/// Matched pair whose child fields differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElementModification {
    pub type_name: String,
    pub identity_key: Option<String>,
    pub display_key: String,
    pub human_type: String,
    pub before: XmlElement,
    pub after: XmlElement,
    pub changes: Vec<XmlFieldChange>,
}

/// Top-level element counts of a structural comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XmlStats {
    pub total_before: usize,
    pub total_after: usize,
    pub unchanged_count: usize,
    pub modified_count: usize,
    pub removed_count: usize,
    pub added_count: usize,
}

/// Bucket tallies for one element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XmlTypeStats {
    pub unchanged: usize,
    pub modified: usize,
    pub removed: usize,
    pub added: usize,
}

impl XmlTypeStats {
    pub fn total(&self) -> usize {
        self.unchanged + self.modified + self.removed + self.added
    }
}

/// Result of an order-insensitive XML comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XmlComparison {
    /// Either root tag belongs to the dialect in use.
    pub is_known_dialect: bool,
    pub root_tag: String,
    pub unchanged: Vec<XmlElementMatch>,
    pub modified: Vec<XmlElementModification>,
    pub removed: Vec<XmlElement>,
    pub added: Vec<XmlElement>,
    pub stats: XmlStats,
    pub per_type_stats: IndexMap<String, XmlTypeStats>,
    pub has_changes: bool,
}

impl XmlComparison {
    /// All-zero result returned when either side fails to parse.
    ///
    /// Indistinguishable from comparing two documents without child elements.
    pub fn empty(root_tag: impl Into<String>) -> Self {
        Self {
            root_tag: root_tag.into(),
            ..Self::default()
        }
    }
}

/// Comparison strategy actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    Lines,
    Xml,
}

/// Result of [`compare`](crate::compare), tagged with the mode that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Comparison {
    Lines(LineComparison),
    Xml(XmlComparison),
}

impl Comparison {
    pub fn mode(&self) -> CompareMode {
        match self {
            Comparison::Lines(_) => CompareMode::Lines,
            Comparison::Xml(_) => CompareMode::Xml,
        }
    }

    pub fn has_changes(&self) -> bool {
        match self {
            Comparison::Lines(result) => result.has_changes,
            Comparison::Xml(result) => result.has_changes,
        }
    }
}
