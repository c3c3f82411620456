use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::model::{CompareOptions, LineClass, LineComparison, LineStats, Side};

/// Distinct normalized lines of one input, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSet {
    entries: IndexMap<String, String>,
}

impl LineSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// First-seen display form of a normalized key.
    pub fn display(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// `(key, display)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, display)| (key.as_str(), display.as_str()))
    }
}

/// Split `text` into distinct lines under `options`.
pub fn normalize_lines(text: &str, options: &CompareOptions) -> LineSet {
    let mut set = LineSet::default();
    if text.is_empty() {
        return set;
    }
    for line in text.split('\n') {
        if let Some((key, display)) = line_key(line, options) {
            set.entries.entry(key).or_insert_with(|| display.to_string());
        }
    }
    set
}

/// Normalized key and display form of one line, or `None` when it is skipped.
fn line_key<'a>(line: &'a str, options: &CompareOptions) -> Option<(String, &'a str)> {
    let candidate = if options.trim_whitespace {
        line.trim()
    } else {
        line
    };
    if options.ignore_empty && candidate.trim().is_empty() {
        return None;
    }
    let key = if options.case_insensitive {
        candidate.to_lowercase()
    } else {
        candidate.to_string()
    };
    Some((key, candidate))
}

/// Compare two texts as sets of normalized lines.
pub fn compare_lines(before: &str, after: &str, options: CompareOptions) -> LineComparison {
    let before_set = normalize_lines(before, &options);
    let after_set = normalize_lines(after, &options);

    let mut in_both = Vec::new();
    let mut missing = Vec::new();
    for (key, display) in before_set.iter() {
        if after_set.contains_key(key) {
            in_both.push(display.to_string());
        } else {
            missing.push(display.to_string());
        }
    }

    let added = after_set
        .iter()
        .filter(|(key, _)| !before_set.contains_key(key))
        .map(|(_, display)| display.to_string())
        .collect::<Vec<_>>();

    let stats = LineStats {
        total_before: before_set.len(),
        total_after: after_set.len(),
        in_both_count: in_both.len(),
        missing_count: missing.len(),
        added_count: added.len(),
    };
    debug!(
        total_before = stats.total_before,
        total_after = stats.total_after,
        missing = stats.missing_count,
        added = stats.added_count,
        "compared line sets"
    );

    LineComparison {
        has_changes: !missing.is_empty() || !added.is_empty(),
        in_both,
        missing,
        added,
        stats,
    }
}

/// Classify every line of one side of `result` by its 0-based index.
///
/// `options` must be the ones the comparison ran with. Skipped lines are absent.
pub fn classify_lines(
    text: &str,
    result: &LineComparison,
    side: Side,
    options: &CompareOptions,
) -> BTreeMap<usize, LineClass> {
    let keys_of = |lines: &[String]| -> HashSet<String> {
        lines
            .iter()
            .filter_map(|line| line_key(line, options))
            .map(|(key, _)| key)
            .collect()
    };
    let both = keys_of(&result.in_both);
    let (only, only_class) = match side {
        Side::Before => (keys_of(&result.missing), LineClass::Missing),
        Side::After => (keys_of(&result.added), LineClass::Added),
    };

    let mut out = BTreeMap::new();
    if text.is_empty() {
        return out;
    }
    for (idx, line) in text.split('\n').enumerate() {
        let Some((key, _)) = line_key(line, options) else {
            continue;
        };
        if both.contains(&key) {
            out.insert(idx, LineClass::Both);
        } else if only.contains(&key) {
            out.insert(idx, only_class);
        }
    }
    out
}

/// Number of `'\n'`-separated lines, 0 for empty text.
pub fn raw_line_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.split('\n').count()
    }
}
