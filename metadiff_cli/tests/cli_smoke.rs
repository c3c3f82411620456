use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file_path(prefix: &str, extension: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("metadiff-{prefix}-{nonce}.{extension}"))
}

fn write_pair(prefix: &str, extension: &str, before: &str, after: &str) -> (PathBuf, PathBuf) {
    let left = temp_file_path(&format!("{prefix}-before"), extension);
    let right = temp_file_path(&format!("{prefix}-after"), extension);
    fs::write(&left, before).expect("write before");
    fs::write(&right, after).expect("write after");
    (left, right)
}

const PROFILE_BEFORE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<Profile xmlns=\"http://soap.sforce.com/2006/04/metadata\">\n\
    <fieldPermissions>\n\
        <editable>true</editable>\n\
        <field>Account.Name</field>\n\
    </fieldPermissions>\n\
    <fieldPermissions>\n\
        <editable>true</editable>\n\
        <field>Contact.Email</field>\n\
    </fieldPermissions>\n\
</Profile>\n";

const PROFILE_AFTER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<Profile xmlns=\"http://soap.sforce.com/2006/04/metadata\">\n\
    <fieldPermissions>\n\
        <editable>false</editable>\n\
        <field>Account.Name</field>\n\
    </fieldPermissions>\n\
</Profile>\n";

#[test]
fn meta_diff_cli_prints_line_report() {
    let (left, right) = write_pair("lines", "txt", "alpha\nbeta\ngamma\n", "gamma\nalpha\n");

    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run meta-diff");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Line Comparison Report"));
    assert!(stdout.contains("(4 lines)"));
    assert!(stdout.contains("## Missing\n\n- beta\n"));
}

#[test]
fn meta_diff_cli_detects_xml_and_emits_json() {
    let (left, right) = write_pair("xml-json", "profile", PROFILE_BEFORE, PROFILE_AFTER);

    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .arg("--json")
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run meta-diff --json");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["mode"], "xml");
    assert_eq!(json["is_known_dialect"], true);
    assert_eq!(json["has_changes"], true);
    assert_eq!(json["stats"]["modified_count"], 1);
    assert_eq!(json["stats"]["removed_count"], 1);
    assert_eq!(json["modified"][0]["changes"][0]["field"], "editable");
}

#[test]
fn meta_diff_cli_filter_narrows_listings_only() {
    let (left, right) = write_pair("filter", "xml", PROFILE_BEFORE, PROFILE_AFTER);

    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .args(["--filter", "contact"])
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run meta-diff --filter");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("- Modified: 1"));
    assert!(!stdout.contains("## Modified"));
    assert!(stdout.contains("1. Field Permissions `Contact.Email`"));
}

#[test]
fn meta_diff_cli_forced_line_mode_and_flags() {
    let (left, right) = write_pair("forced", "xml", "<a>\n  <B/>\n</a>\n", "<a>\n<b/>\n</a>\n");

    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .args(["--mode", "lines", "--case-insensitive", "--json"])
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run meta-diff --mode lines");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["mode"], "lines");
    assert_eq!(json["has_changes"], false);
}

#[test]
fn meta_diff_cli_reads_config_rules() {
    let (left, right) = write_pair(
        "config",
        "xml",
        "<catalog><book><isbn>1</isbn><title>Old</title></book></catalog>",
        "<catalog><book><isbn>1</isbn><title>New</title></book></catalog>",
    );
    let config = temp_file_path("config", "toml");
    fs::write(
        &config,
        "dialect = \"generic\"\n\n[rules.key_fields]\nbook = \"isbn\"\n",
    )
    .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .arg("--config")
        .arg(&config)
        .arg("--json")
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run meta-diff --config");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["stats"]["modified_count"], 1);
    assert_eq!(json["modified"][0]["display_key"], "1");
}

#[test]
fn meta_diff_cli_rejects_invalid_config() {
    let (left, right) = write_pair("bad-config", "txt", "a\n", "b\n");
    let config = temp_file_path("bad-config", "toml");
    fs::write(&config, "[rules.key_fields]\nbook = []\n").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .arg("--config")
        .arg(&config)
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run meta-diff --config");

    assert!(!output.status.success());
}

#[test]
fn meta_diff_cli_reports_parse_failure_on_stderr() {
    let (left, right) = write_pair(
        "malformed",
        "xml",
        "<Profile><custom>true</custom></Profile>",
        "<Profile><custom>true</Profile>",
    );

    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run meta-diff");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("No changes detected."));
    assert!(stderr.contains("is not well-formed XML"));
}

#[test]
fn meta_diff_cli_fails_for_missing_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_meta-diff"))
        .arg("/definitely/missing-before.xml")
        .arg("/definitely/missing-after.xml")
        .output()
        .expect("run meta-diff");

    assert!(!output.status.success());
}

#[test]
fn replay_fixtures_cli_runs_successfully() {
    let output = Command::new(env!("CARGO_BIN_EXE_metadiff-replay-fixtures"))
        .output()
        .expect("run replay binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("replayed"));
    assert!(stdout.contains("fixture"));
}
