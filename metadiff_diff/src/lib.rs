//! Set-based comparison of text and XML metadata.
//!
//! This crate compares a Before and an After version of some content and
//! reports what is preserved, lost or new, ignoring position:
//! - line mode treats each input as a set of normalized lines
//! - XML mode matches the top-level elements of two documents by identity key
//!   (or by normalized content) and diffs the child fields of matched pairs
//!
//! Primary entrypoints:
//! - [`compare_lines`]
//! - [`compare_structural`]
//! - [`compare`] (chooses the mode)
//! - [`format_report`]
//!
//! # Example
//!
//! ```rust
//! use metadiff_diff::{CompareOptions, compare_lines};
//!
//! let result = compare_lines("A\nB\nC", "A\nC", CompareOptions::default());
//! assert_eq!(result.missing, vec!["B"]);
//! assert_eq!(result.in_both, vec!["A", "C"]);
//! assert!(result.has_changes);
//! ```

mod config;
mod filter;
mod lines;
mod mode;
mod model;
mod report;
mod structural;

pub use config::{CompareConfig, ConfigError, DialectChoice, ModeSelection};
pub use filter::filter_lines;
pub use lines::{LineSet, classify_lines, compare_lines, normalize_lines, raw_line_count};
pub use metadiff_xml::{XmlCompareOptions, XmlElement, looks_like_xml};
pub use mode::{compare, detect_mode, resolve_mode};
pub use model::{
    CompareMode, CompareOptions, Comparison, LineClass, LineComparison, LineStats, NOT_SET, Side,
    XmlComparison, XmlElementMatch, XmlElementModification, XmlFieldChange, XmlStats,
    XmlTypeStats,
};
pub use report::{format_line_report, format_report, format_xml_report};
pub use structural::{compare_structural, compare_structural_with_dialect};
