use std::fs;
use std::path::Path;

use metadiff_diff::{CompareConfig, CompareMode, Comparison, compare};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    #[serde(default)]
    config: CompareConfig,
    before: String,
    after: String,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    mode: CompareMode,
    has_changes: bool,
    unchanged: usize,
    /// Missing lines, or display keys of removed elements.
    #[serde(default)]
    removed: Vec<String>,
    /// Added lines, or display keys of added elements.
    #[serde(default)]
    added: Vec<String>,
    /// Display keys of modified elements.
    #[serde(default)]
    modified: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    unchanged: usize,
    removed: Vec<String>,
    added: Vec<String>,
    modified: Vec<String>,
}

fn outcome(comparison: &Comparison) -> Outcome {
    match comparison {
        Comparison::Lines(result) => Outcome {
            unchanged: result.stats.in_both_count,
            removed: result.missing.clone(),
            added: result.added.clone(),
            modified: Vec::new(),
        },
        Comparison::Xml(result) => Outcome {
            unchanged: result.stats.unchanged_count,
            removed: result.removed.iter().map(|e| e.display_key.clone()).collect(),
            added: result.added.iter().map(|e| e.display_key.clone()).collect(),
            modified: result
                .modified
                .iter()
                .map(|m| m.display_key.clone())
                .collect(),
        },
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let fixtures_dir = repo_root.join("fixtures");

    let mut entries = fs::read_dir(&fixtures_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.path());

    let mut checked = 0usize;
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let raw = fs::read_to_string(&path)?;
        let fixture: Fixture = serde_json::from_str(&raw)?;
        fixture.config.validate()?;

        let dialect = fixture.config.build_dialect();
        let comparison = compare(
            &fixture.before,
            &fixture.after,
            &fixture.config,
            dialect.as_ref(),
        );

        if comparison.mode() != fixture.expected.mode {
            return Err(format!(
                "fixture {}: mode mismatch: expected {:?}, got {:?}",
                fixture.name,
                fixture.expected.mode,
                comparison.mode()
            )
            .into());
        }

        if comparison.has_changes() != fixture.expected.has_changes {
            return Err(format!(
                "fixture {}: has_changes mismatch: expected {}, got {}",
                fixture.name,
                fixture.expected.has_changes,
                comparison.has_changes()
            )
            .into());
        }

        let actual = outcome(&comparison);
        let expected = Outcome {
            unchanged: fixture.expected.unchanged,
            removed: fixture.expected.removed,
            added: fixture.expected.added,
            modified: fixture.expected.modified,
        };
        if actual != expected {
            return Err(format!(
                "fixture {}: outcome mismatch: expected {:?}, got {:?}",
                fixture.name, expected, actual
            )
            .into());
        }

        checked += 1;
    }

    println!("replayed {checked} fixture(s)");
    Ok(())
}
