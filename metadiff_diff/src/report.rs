use metadiff_xml::XmlElement;

use crate::model::{Comparison, LineComparison, XmlComparison};

/// Format a markdown report for either kind of comparison.
pub fn format_report(comparison: &Comparison, before_label: &str, after_label: &str) -> String {
    match comparison {
        Comparison::Lines(result) => format_line_report(result, before_label, after_label),
        Comparison::Xml(result) => format_xml_report(result, before_label, after_label),
    }
}

/// Format a markdown report from a line-set comparison.
pub fn format_line_report(result: &LineComparison, before_label: &str, after_label: &str) -> String {
    let mut out = String::new();
    out.push_str("# Line Comparison Report\n\n");
    out.push_str(&format!("- Before: `{before_label}`\n"));
    out.push_str(&format!("- After: `{after_label}`\n\n"));

    let stats = &result.stats;
    out.push_str("## Stats\n\n");
    out.push_str(&format!("- Before: {} unique line(s)\n", stats.total_before));
    out.push_str(&format!("- After: {} unique line(s)\n", stats.total_after));
    out.push_str(&format!("- In both: {}\n", stats.in_both_count));
    out.push_str(&format!("- Missing from after: {}\n", stats.missing_count));
    out.push_str(&format!("- Added in after: {}\n\n", stats.added_count));

    if !result.has_changes {
        out.push_str("## Changes\n\nNo changes detected.\n");
        return out;
    }

    push_line_section(&mut out, "Missing", &result.missing);
    push_line_section(&mut out, "Added", &result.added);
    out
}

/// Format a markdown report from a structural XML comparison.
pub fn format_xml_report(result: &XmlComparison, before_label: &str, after_label: &str) -> String {
    let mut out = String::new();
    out.push_str("# XML Comparison Report\n\n");
    out.push_str(&format!("- Before: `{before_label}`\n"));
    out.push_str(&format!("- After: `{after_label}`\n"));
    if !result.root_tag.is_empty() {
        let known = if result.is_known_dialect {
            " (known metadata type)"
        } else {
            ""
        };
        out.push_str(&format!("- Root: `{}`{known}\n", result.root_tag));
    }
    out.push('\n');

    let stats = &result.stats;
    out.push_str("## Stats\n\n");
    out.push_str(&format!("- Before: {} element(s)\n", stats.total_before));
    out.push_str(&format!("- After: {} element(s)\n", stats.total_after));
    out.push_str(&format!("- Unchanged: {}\n", stats.unchanged_count));
    out.push_str(&format!("- Modified: {}\n", stats.modified_count));
    out.push_str(&format!("- Removed: {}\n", stats.removed_count));
    out.push_str(&format!("- Added: {}\n\n", stats.added_count));

    if result.has_changes {
        if !result.modified.is_empty() {
            out.push_str("## Modified\n\n");
            for (idx, modification) in result.modified.iter().enumerate() {
                out.push_str(&format!(
                    "{}. {} `{}`\n",
                    idx + 1,
                    modification.human_type,
                    modification.display_key
                ));
                for change in &modification.changes {
                    out.push_str(&format!(
                        "   - {}: `{}` -> `{}`\n",
                        change.field, change.before, change.after
                    ));
                }
            }
            out.push('\n');
        }
        push_element_section(&mut out, "Removed", &result.removed);
        push_element_section(&mut out, "Added", &result.added);
    } else {
        out.push_str("## Changes\n\nNo changes detected.\n\n");
    }

    if !result.per_type_stats.is_empty() {
        out.push_str("## By Type\n\n");
        out.push_str("| Type | Unchanged | Modified | Removed | Added |\n");
        out.push_str("|------|-----------|----------|---------|-------|\n");
        for (type_name, tally) in &result.per_type_stats {
            out.push_str(&format!(
                "| {type_name} | {} | {} | {} | {} |\n",
                tally.unchanged, tally.modified, tally.removed, tally.added
            ));
        }
    }

    out
}

fn push_line_section(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("## {title}\n\n"));
    for line in lines {
        out.push_str(&format!("- {line}\n"));
    }
    out.push('\n');
}

fn push_element_section(out: &mut String, title: &str, elements: &[XmlElement]) {
    if elements.is_empty() {
        return;
    }
    out.push_str(&format!("## {title}\n\n"));
    for (idx, element) in elements.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} `{}`\n",
            idx + 1,
            element.human_type,
            element.display_key
        ));
    }
    out.push('\n');
}
