use crate::model::{LineComparison, XmlComparison};

/// Lines containing `query`, ignoring case. A blank query keeps everything.
pub fn filter_lines<'a>(lines: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.to_lowercase();
    lines
        .iter()
        .map(String::as_str)
        .filter(|line| query.trim().is_empty() || line.to_lowercase().contains(&needle))
        .collect()
}

fn keep_matching(lines: &[String], query: &str) -> Vec<String> {
    filter_lines(lines, query)
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl LineComparison {
    /// Copy with each bucket narrowed by [`filter_lines`]. Stats are kept.
    pub fn filtered(&self, query: &str) -> LineComparison {
        LineComparison {
            in_both: keep_matching(&self.in_both, query),
            missing: keep_matching(&self.missing, query),
            added: keep_matching(&self.added, query),
            ..self.clone()
        }
    }
}

fn matches(query: &str, display_key: &str, human_type: &str) -> bool {
    display_key.to_lowercase().contains(query) || human_type.to_lowercase().contains(query)
}

impl XmlComparison {
    /// Copy keeping only bucket entries whose display key or type label
    /// contains `query`, ignoring case.
    ///
    /// Stats and per-type stats describe the whole comparison and are kept
    /// as they are.
    pub fn filtered(&self, query: &str) -> XmlComparison {
        if query.trim().is_empty() {
            return self.clone();
        }
        let query = query.to_lowercase();
        XmlComparison {
            unchanged: self
                .unchanged
                .iter()
                .filter(|m| matches(&query, &m.display_key, &m.human_type))
                .cloned()
                .collect(),
            modified: self
                .modified
                .iter()
                .filter(|m| matches(&query, &m.display_key, &m.human_type))
                .cloned()
                .collect(),
            removed: self
                .removed
                .iter()
                .filter(|e| matches(&query, &e.display_key, &e.human_type))
                .cloned()
                .collect(),
            added: self
                .added
                .iter()
                .filter(|e| matches(&query, &e.display_key, &e.human_type))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}
