use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use metadiff_dialect_salesforce::SalesforceDialect;
use metadiff_xml::{Dialect, ParsedElements, XmlCompareOptions, XmlElement, parse_elements};
use tracing::{debug, warn};

use crate::model::{
    NOT_SET, XmlComparison, XmlElementMatch, XmlElementModification, XmlFieldChange, XmlStats,
    XmlTypeStats,
};

/// Compare two XML documents element by element using the Salesforce rules.
pub fn compare_structural(
    before: &str,
    after: &str,
    options: XmlCompareOptions,
) -> XmlComparison {
    compare_structural_with_dialect(before, after, options, &SalesforceDialect)
}

/// Compare two XML documents element by element under `dialect`.
///
/// Top-level children of the roots are grouped by type. Types with an identity
/// rule are matched by key and field-diffed; other types are matched as a
/// multiset of normalized serializations. A parse failure on either side
/// yields [`XmlComparison::empty`].
pub fn compare_structural_with_dialect<D: Dialect + ?Sized>(
    before: &str,
    after: &str,
    options: XmlCompareOptions,
    dialect: &D,
) -> XmlComparison {
    let before = parse_elements(before, &options, dialect);
    let after = parse_elements(after, &options, dialect);

    if !before.is_ok() || !after.is_ok() {
        for (side, parsed) in [("before", &before), ("after", &after)] {
            if let Some(error) = &parsed.error {
                warn!(side, %error, "XML parse failed, skipping structural comparison");
            }
        }
        let root_tag = if before.root_tag.is_empty() {
            &after.root_tag
        } else {
            &before.root_tag
        };
        return XmlComparison::empty(root_tag.as_str());
    }

    let mut buckets = Buckets::default();
    let before_by_type = group_by_type(&before);
    let after_by_type = group_by_type(&after);

    let mut types = before_by_type.keys().copied().collect::<Vec<_>>();
    types.extend(
        after_by_type
            .keys()
            .copied()
            .filter(|type_name| !before_by_type.contains_key(type_name)),
    );

    for type_name in types {
        let left = before_by_type.get(type_name).map_or(&[][..], Vec::as_slice);
        let right = after_by_type.get(type_name).map_or(&[][..], Vec::as_slice);

        let keyed = dialect.key_field(type_name).is_some()
            && left
                .iter()
                .chain(right)
                .any(|element| element.identity_key.is_some());

        let tally = if keyed {
            buckets.match_keyed(type_name, left, right)
        } else {
            buckets.match_by_content(type_name, left, right)
        };
        if tally.total() > 0 {
            buckets.per_type.insert(type_name.to_string(), tally);
        }
    }

    let stats = XmlStats {
        total_before: before.elements.len(),
        total_after: after.elements.len(),
        unchanged_count: buckets.unchanged.len(),
        modified_count: buckets.modified.len(),
        removed_count: buckets.removed.len(),
        added_count: buckets.added.len(),
    };
    debug!(
        root = %before.root_tag,
        unchanged = stats.unchanged_count,
        modified = stats.modified_count,
        removed = stats.removed_count,
        added = stats.added_count,
        "compared XML elements"
    );

    XmlComparison {
        is_known_dialect: dialect.is_known_root(&before.root_tag)
            || dialect.is_known_root(&after.root_tag),
        root_tag: before.root_tag.clone(),
        has_changes: stats.modified_count + stats.removed_count + stats.added_count > 0,
        unchanged: buckets.unchanged,
        modified: buckets.modified,
        removed: buckets.removed,
        added: buckets.added,
        per_type_stats: buckets.per_type,
        stats,
    }
}

fn group_by_type(parsed: &ParsedElements) -> IndexMap<&str, Vec<&XmlElement>> {
    let mut groups: IndexMap<&str, Vec<&XmlElement>> = IndexMap::new();
    for element in &parsed.elements {
        groups
            .entry(element.type_name.as_str())
            .or_default()
            .push(element);
    }
    groups
}

fn match_key(element: &XmlElement) -> &str {
    element
        .identity_key
        .as_deref()
        .unwrap_or(&element.normalized_xml)
}

#[derive(Debug, Default)]
struct Buckets {
    unchanged: Vec<XmlElementMatch>,
    modified: Vec<XmlElementModification>,
    removed: Vec<XmlElement>,
    added: Vec<XmlElement>,
    per_type: IndexMap<String, XmlTypeStats>,
}

impl Buckets {
    /// Match by identity key, falling back to normalized text for keyless elements.
    ///
    /// The After lookup keeps the last element per key; shadowed earlier
    /// duplicates are never candidates and end up added.
    fn match_keyed(
        &mut self,
        type_name: &str,
        before: &[&XmlElement],
        after: &[&XmlElement],
    ) -> XmlTypeStats {
        let mut tally = XmlTypeStats::default();
        let mut lookup: HashMap<&str, usize> = HashMap::new();
        for (idx, element) in after.iter().copied().enumerate() {
            lookup.insert(match_key(element), idx);
        }
        let mut consumed = vec![false; after.len()];

        for element in before.iter().copied() {
            let live = lookup
                .get(match_key(element))
                .copied()
                .filter(|idx| !consumed[*idx]);
            let Some(idx) = live else {
                self.removed.push(element.clone());
                tally.removed += 1;
                continue;
            };
            consumed[idx] = true;

            let changes = field_changes(element, after[idx]);
            if changes.is_empty() {
                self.unchanged.push(matched(type_name, element));
                tally.unchanged += 1;
            } else {
                self.modified.push(XmlElementModification {
                    type_name: type_name.to_string(),
                    identity_key: element.identity_key.clone(),
                    display_key: element.display_key.clone(),
                    human_type: element.human_type.clone(),
                    before: element.clone(),
                    after: after[idx].clone(),
                    changes,
                });
                tally.modified += 1;
            }
        }

        self.push_unconsumed(after, &consumed, &mut tally);
        tally
    }

    /// Multiset match on normalized text: equal content is unchanged, anything
    /// else is removed or added.
    fn match_by_content(
        &mut self,
        type_name: &str,
        before: &[&XmlElement],
        after: &[&XmlElement],
    ) -> XmlTypeStats {
        let mut tally = XmlTypeStats::default();
        let mut supply: HashMap<&str, VecDeque<usize>> = HashMap::new();
        for (idx, element) in after.iter().copied().enumerate() {
            supply
                .entry(element.normalized_xml.as_str())
                .or_default()
                .push_back(idx);
        }
        let mut consumed = vec![false; after.len()];

        for element in before.iter().copied() {
            let next = supply
                .get_mut(element.normalized_xml.as_str())
                .and_then(VecDeque::pop_front);
            match next {
                Some(idx) => {
                    consumed[idx] = true;
                    self.unchanged.push(matched(type_name, element));
                    tally.unchanged += 1;
                }
                None => {
                    self.removed.push(element.clone());
                    tally.removed += 1;
                }
            }
        }

        self.push_unconsumed(after, &consumed, &mut tally);
        tally
    }

    fn push_unconsumed(
        &mut self,
        after: &[&XmlElement],
        consumed: &[bool],
        tally: &mut XmlTypeStats,
    ) {
        for (element, taken) in after.iter().zip(consumed) {
            if !taken {
                self.added.push((*element).clone());
                tally.added += 1;
            }
        }
    }
}

fn matched(type_name: &str, element: &XmlElement) -> XmlElementMatch {
    XmlElementMatch {
        type_name: type_name.to_string(),
        identity_key: element.identity_key.clone(),
        display_key: element.display_key.clone(),
        human_type: element.human_type.clone(),
        element: element.clone(),
    }
}

/// Child fields whose text differs, Before field order first.
pub(crate) fn field_changes(before: &XmlElement, after: &XmlElement) -> Vec<XmlFieldChange> {
    let mut fields = before.children.keys().collect::<Vec<_>>();
    fields.extend(
        after
            .children
            .keys()
            .filter(|field| !before.children.contains_key(*field)),
    );

    fields
        .into_iter()
        .filter_map(|field| {
            let old = before.children.get(field).map_or(NOT_SET, String::as_str);
            let new = after.children.get(field).map_or(NOT_SET, String::as_str);
            (old != new).then(|| XmlFieldChange {
                field: field.clone(),
                before: old.to_string(),
                after: new.to_string(),
            })
        })
        .collect()
}
