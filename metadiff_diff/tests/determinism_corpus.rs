use std::fs;
use std::path::Path;

use metadiff_diff::{CompareConfig, CompareOptions, compare, compare_lines, compare_structural};
use metadiff_diff::XmlCompareOptions;
use metadiff_dialect_salesforce::SalesforceDialect;

fn corpus() -> Vec<String> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let testdata = repo_root.join("metadiff_xml").join("testdata");

    let mut paths = Vec::new();
    for entry in fs::read_dir(&testdata).expect("read testdata") {
        let path = entry.expect("entry").path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    paths
        .into_iter()
        .map(|path| fs::read_to_string(path).expect("read sample"))
        .collect()
}

#[test]
fn comparison_is_deterministic_for_corpus_pairs() {
    let samples = corpus();
    assert!(!samples.is_empty());

    for (i, a) in samples.iter().enumerate() {
        for (j, b) in samples.iter().enumerate() {
            let one = compare(a, b, &CompareConfig::default(), &SalesforceDialect);
            let two = compare(a, b, &CompareConfig::default(), &SalesforceDialect);

            let one_json = serde_json::to_string_pretty(&one).expect("serialize first");
            let two_json = serde_json::to_string_pretty(&two).expect("serialize second");

            assert_eq!(
                one_json, two_json,
                "flapping output for corpus pair ({i}, {j})"
            );
        }
    }
}

#[test]
fn corpus_samples_match_themselves() {
    for (i, sample) in corpus().iter().enumerate() {
        let xml = compare_structural(sample, sample, XmlCompareOptions::default());
        assert!(!xml.has_changes, "sample {i} differs from itself");
        assert!(xml.stats.total_before > 0, "sample {i} has no elements");
        assert_eq!(xml.stats.unchanged_count, xml.stats.total_before);

        let lines = compare_lines(sample, sample, CompareOptions::default());
        assert!(!lines.has_changes);
    }
}

#[test]
fn corpus_pairs_keep_bucket_invariants() {
    let samples = corpus();
    for a in &samples {
        for b in &samples {
            let result = compare_structural(a, b, XmlCompareOptions::default());
            let stats = &result.stats;
            assert_eq!(
                stats.unchanged_count + stats.modified_count + stats.removed_count,
                stats.total_before
            );
            assert_eq!(
                stats.unchanged_count + stats.modified_count + stats.added_count,
                stats.total_after
            );
        }
    }
}
