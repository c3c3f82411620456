use metadiff_xml::{Dialect, looks_like_xml};
use tracing::debug;

use crate::config::{CompareConfig, ModeSelection};
use crate::lines::compare_lines;
use crate::model::{CompareMode, Comparison};
use crate::structural::compare_structural_with_dialect;

/// XML when either side looks like XML, lines otherwise.
pub fn detect_mode(before: &str, after: &str) -> CompareMode {
    if looks_like_xml(before) || looks_like_xml(after) {
        CompareMode::Xml
    } else {
        CompareMode::Lines
    }
}

/// Apply a [`ModeSelection`] to a pair of inputs.
pub fn resolve_mode(selection: ModeSelection, before: &str, after: &str) -> CompareMode {
    match selection {
        ModeSelection::Auto => detect_mode(before, after),
        ModeSelection::Lines => CompareMode::Lines,
        ModeSelection::Xml => CompareMode::Xml,
    }
}

/// Compare two inputs with the strategy and options from `config`.
///
/// In auto mode a single XML side is enough to select structural comparison,
/// so pairing XML with plain text reports the parse failure of the plain side
/// as an all-zero result.
pub fn compare<D: Dialect + ?Sized>(
    before: &str,
    after: &str,
    config: &CompareConfig,
    dialect: &D,
) -> Comparison {
    let mode = resolve_mode(config.mode, before, after);
    debug!(?mode, selection = ?config.mode, dialect = dialect.dialect_name(), "comparing");
    match mode {
        CompareMode::Lines => Comparison::Lines(compare_lines(before, after, config.lines)),
        CompareMode::Xml => Comparison::Xml(compare_structural_with_dialect(
            before, after, config.xml, dialect,
        )),
    }
}
