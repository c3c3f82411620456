use std::collections::BTreeSet;

use metadiff_diff::{CompareOptions, XmlCompareOptions, compare_lines, compare_structural};
use proptest::prelude::*;

fn line_strategy() -> impl Strategy<Value = Vec<String>> {
    let line = prop::string::string_regex("[ a-cA-C]{0,6}").expect("valid regex");
    prop::collection::vec(line, 0..24)
}

fn text_strategy() -> impl Strategy<Value = String> {
    let line = prop::string::string_regex("[ -~]{0,40}").expect("valid regex");
    prop::collection::vec(line, 0..40).prop_map(|lines| lines.join("\n"))
}

fn options_strategy() -> impl Strategy<Value = CompareOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(trim_whitespace, case_insensitive, ignore_empty)| CompareOptions {
            trim_whitespace,
            case_insensitive,
            ignore_empty,
        },
    )
}

fn element_strategy() -> impl Strategy<Value = String> {
    let kind = prop::sample::select(vec![
        "fieldPermissions",
        "layoutAssignments",
        "loginHours",
        "custom",
    ]);
    let key = prop::sample::select(vec!["A", "B", "C"]);
    (kind, key, any::<bool>()).prop_map(|(kind, key, flag)| match kind {
        "fieldPermissions" => format!(
            "<fieldPermissions><editable>{flag}</editable><field>{key}</field></fieldPermissions>"
        ),
        "layoutAssignments" => format!(
            "<layoutAssignments><layout>{key}</layout><recordType>{flag}</recordType></layoutAssignments>"
        ),
        "loginHours" => format!("<loginHours><mondayStart>{flag}</mondayStart></loginHours>"),
        _ => format!("<custom>{key}{flag}</custom>"),
    })
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(element_strategy(), 0..12)
        .prop_map(|elements| format!("<Profile>\n{}\n</Profile>", elements.join("\n")))
}

fn as_set(lines: &[String]) -> BTreeSet<&str> {
    lines.iter().map(String::as_str).collect()
}

proptest! {
    #[test]
    fn line_buckets_partition_both_sides(
        a in text_strategy(),
        b in text_strategy(),
        options in options_strategy(),
    ) {
        let result = compare_lines(&a, &b, options);
        let stats = &result.stats;

        prop_assert_eq!(stats.in_both_count + stats.missing_count, stats.total_before);
        prop_assert_eq!(stats.in_both_count + stats.added_count, stats.total_after);
        prop_assert_eq!(result.in_both.len(), stats.in_both_count);
        prop_assert_eq!(result.missing.len(), stats.missing_count);
        prop_assert_eq!(result.added.len(), stats.added_count);
        prop_assert_eq!(result.has_changes, stats.missing_count + stats.added_count > 0);
    }

    #[test]
    fn line_order_does_not_matter(
        (lines, shuffled) in line_strategy()
            .prop_flat_map(|lines| (Just(lines.clone()), Just(lines).prop_shuffle())),
        other in line_strategy(),
    ) {
        let other = other.join("\n");
        let one = compare_lines(&lines.join("\n"), &other, CompareOptions::default());
        let two = compare_lines(&shuffled.join("\n"), &other, CompareOptions::default());

        prop_assert_eq!(one.stats, two.stats);
        prop_assert_eq!(as_set(&one.missing), as_set(&two.missing));
        prop_assert_eq!(as_set(&one.in_both), as_set(&two.in_both));
        prop_assert_eq!(one.added, two.added);
    }

    #[test]
    fn comparing_text_with_itself_has_no_changes(a in text_strategy(), options in options_strategy()) {
        let result = compare_lines(&a, &a, options);

        prop_assert!(!result.has_changes);
        prop_assert_eq!(result.stats.in_both_count, result.stats.total_before);
    }

    #[test]
    fn xml_buckets_partition_both_sides(a in document_strategy(), b in document_strategy()) {
        let result = compare_structural(&a, &b, XmlCompareOptions::default());
        let stats = &result.stats;

        prop_assert_eq!(
            stats.unchanged_count + stats.modified_count + stats.removed_count,
            stats.total_before
        );
        prop_assert_eq!(
            stats.unchanged_count + stats.modified_count + stats.added_count,
            stats.total_after
        );
        let per_type_total = result
            .per_type_stats
            .values()
            .map(|tally| tally.total())
            .sum::<usize>();
        prop_assert_eq!(
            per_type_total,
            stats.unchanged_count + stats.modified_count + stats.removed_count + stats.added_count
        );
        for modification in &result.modified {
            prop_assert!(!modification.changes.is_empty());
        }
    }

    #[test]
    fn xml_comparison_is_deterministic(a in document_strategy(), b in document_strategy()) {
        let one = compare_structural(&a, &b, XmlCompareOptions::default());
        let two = compare_structural(&a, &b, XmlCompareOptions::default());

        prop_assert_eq!(one, two);
    }

    #[test]
    fn swapping_sides_swaps_removed_and_added(a in document_strategy(), b in document_strategy()) {
        let forward = compare_structural(&a, &b, XmlCompareOptions::default());
        let backward = compare_structural(&b, &a, XmlCompareOptions::default());

        prop_assert_eq!(forward.stats.total_before, backward.stats.total_after);
        prop_assert_eq!(
            forward.stats.unchanged_count + forward.stats.modified_count,
            backward.stats.unchanged_count + backward.stats.modified_count
        );
    }
}
