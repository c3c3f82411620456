use metadiff_diff::{
    CompareConfig, CompareOptions, XmlCompareOptions, compare, compare_lines, compare_structural,
    format_line_report, format_report, format_xml_report,
};
use metadiff_xml::GenericDialect;

#[test]
fn line_report_lists_missing_and_added() {
    let result = compare_lines("alpha\nbeta\ngamma", "alpha\ngamma\ndelta", CompareOptions::default());
    let report = format_line_report(&result, "before.txt", "after.txt");

    assert!(report.starts_with("# Line Comparison Report\n"));
    assert!(report.contains("- Before: `before.txt`"));
    assert!(report.contains("- Before: 3 unique line(s)"));
    assert!(report.contains("- In both: 2"));
    assert!(report.contains("## Missing\n\n- beta\n"));
    assert!(report.contains("## Added\n\n- delta\n"));
    assert!(!report.contains("No changes detected."));
}

#[test]
fn identical_line_sets_report_no_changes() {
    let result = compare_lines("a\nb", "b\na\na", CompareOptions::default());
    let report = format_line_report(&result, "left", "right");

    assert!(report.contains("## Changes\n\nNo changes detected.\n"));
    assert!(!report.contains("## Missing"));
}

#[test]
fn xml_report_shows_field_changes_and_type_table() {
    let before = "<Profile>\
        <fieldPermissions><editable>true</editable><field>Account.Name</field></fieldPermissions>\
        <tabVisibilities><tab>standard-Account</tab><visibility>DefaultOn</visibility></tabVisibilities>\
        </Profile>";
    let after = "<Profile>\
        <fieldPermissions><editable>false</editable><field>Account.Name</field></fieldPermissions>\
        <userPermissions><enabled>true</enabled><name>ApiEnabled</name></userPermissions>\
        </Profile>";

    let result = compare_structural(before, after, XmlCompareOptions::default());
    let report = format_xml_report(&result, "old.profile", "new.profile");

    assert!(report.starts_with("# XML Comparison Report\n"));
    assert!(report.contains("- Root: `Profile` (known metadata type)"));
    assert!(report.contains("- Modified: 1"));
    assert!(report.contains("1. Field Permissions `Account.Name`\n   - editable: `true` -> `false`\n"));
    assert!(report.contains("## Removed\n\n1. Tab Visibilities `standard-Account`\n"));
    assert!(report.contains("## Added\n\n1. User Permissions `ApiEnabled`\n"));
    assert!(report.contains("| Type | Unchanged | Modified | Removed | Added |"));
    assert!(report.contains("| fieldPermissions | 0 | 1 | 0 | 0 |"));
    assert!(report.contains("| tabVisibilities | 0 | 0 | 1 | 0 |"));
}

#[test]
fn xml_report_for_unknown_root_has_no_dialect_note() {
    let result = compare_structural(
        "<catalog><book>a</book></catalog>",
        "<catalog><book>a</book></catalog>",
        XmlCompareOptions::default(),
    );
    let report = format_xml_report(&result, "a.xml", "b.xml");

    assert!(report.contains("- Root: `catalog`\n"));
    assert!(report.contains("No changes detected."));
    assert!(report.contains("| book | 1 | 0 | 0 | 0 |"));
}

#[test]
fn failed_parse_report_has_no_type_table() {
    let result = compare_structural("<Profile>", "<Profile/>", XmlCompareOptions::default());
    let report = format_xml_report(&result, "a.xml", "b.xml");

    assert!(report.contains("- Before: 0 element(s)"));
    assert!(report.contains("No changes detected."));
    assert!(!report.contains("## By Type"));
}

#[test]
fn report_dispatches_on_mode() {
    let config = CompareConfig::default();
    let lines = compare("x\ny", "y", &config, &GenericDialect);
    let xml = compare("<r><a/></r>", "<r/>", &config, &GenericDialect);

    assert!(format_report(&lines, "a", "b").starts_with("# Line Comparison Report"));
    let report = format_report(&xml, "a", "b");
    assert!(report.starts_with("# XML Comparison Report"));
    assert!(report.contains("## Removed\n\n1. a `a`\n"));
}
