//! Integration tests for the `sl` binary
//!
//! Drives the compiled CLI against the fixtures in `tests/fixtures` and
//! checks both JSON output and exit codes.

use serde_json::Value;
use std::io::Write;
use std::process::{Command, Stdio};

/// Path to the compiled sl binary
fn sl_bin() -> String {
    env!("CARGO_BIN_EXE_sl").to_string()
}

/// Run an `sl` CLI command and return (stdout, stderr, success).
fn run_sl(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(sl_bin())
        .args(args)
        .env_remove("SQLLINEAGE_CONFIG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute sl with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn parse_json(stdout: &str) -> Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("Invalid JSON ({}): {}", e, stdout))
}

fn rows_where<'a>(rows: &'a Value, field: &str, value: &str) -> Vec<&'a Value> {
    rows.as_array()
        .unwrap()
        .iter()
        .filter(|r| r[field] == value)
        .collect()
}

// ── extract ─────────────────────────────────────────────────────────────

#[test]
fn test_extract_file_json() {
    let (stdout, stderr, ok) = run_sl(&[
        "extract",
        "tests/fixtures/customer_orders.sql",
        "--regulation",
        "gdpr",
        "--metadatakey",
        "retail",
    ]);
    assert!(ok, "stderr: {}", stderr);

    let rows = parse_json(&stdout);
    let email = rows_where(&rows, "columnName", "email");
    assert_eq!(email.len(), 1);
    assert_eq!(email[0]["databaseName"], "crm");
    assert_eq!(email[0]["tableName"], "customers");
    assert_eq!(email[0]["tableAliasName"], "c");
    assert_eq!(email[0]["aliasName"], "customer_email");
    assert_eq!(email[0]["viewName"], "customer_orders");
    assert_eq!(email[0]["regulation"], "gdpr");
    assert_eq!(email[0]["remarks"][0], "column_selected_with_database");

    let join = rows_where(&rows, "columnName", "customer_id");
    assert_eq!(
        join[0]["remarks"],
        serde_json::json!(["join_on_clause_column", "join_type:INNER"])
    );
}

#[test]
fn test_extract_inline_sql_table_output() {
    let (stdout, _, ok) = run_sl(&[
        "extract",
        "--sql",
        "SELECT id FROM db.users",
        "--view-name",
        "vw_users",
        "-o",
        "table",
    ]);
    assert!(ok);
    let mut lines = stdout.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("VIEW"));
    assert!(header.contains("REMARKS"));
    assert!(lines.next().unwrap().starts_with("----"));
    let row = lines.next().unwrap();
    assert!(row.contains("vw_users"));
    assert!(row.contains("users"));
    assert!(row.contains("column_selected_with_database"));
}

#[test]
fn test_extract_from_stdin() {
    let mut child = Command::new(sl_bin())
        .args(["extract", "--view-name", "piped"])
        .env_remove("SQLLINEAGE_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn sl");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"SELECT a FROM db.t WHERE b > 1")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let rows = parse_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["viewName"], "piped");
    assert_eq!(rows[1]["remarks"][0], "where_clause_column");
}

#[test]
fn test_extract_unparseable_file_fails() {
    let (stdout, stderr, ok) = run_sl(&["extract", "tests/fixtures/broken.sql"]);
    assert!(!ok);
    assert!(stderr.contains("could not be parsed"));

    let rows = parse_json(&stdout);
    assert_eq!(rows[0]["remarks"][0], "tech_failure");
    assert_eq!(rows[0]["viewName"], "broken");
}

#[test]
fn test_extract_unknown_dialect() {
    let (_, stderr, ok) = run_sl(&["extract", "--sql", "SELECT 1", "--dialect", "oracle"]);
    assert!(!ok);
    assert!(stderr.contains("oracle"));
}

#[test]
fn test_extract_missing_file() {
    let (_, stderr, ok) = run_sl(&["extract", "tests/fixtures/does_not_exist.sql"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to read"));
}

// ── metadata ────────────────────────────────────────────────────────────

#[test]
fn test_metadata_envelope() {
    let (stdout, stderr, ok) = run_sl(&[
        "metadata",
        "tests/fixtures/metadata.json",
        "--regulation",
        "ccpa",
        "--metadatakey",
        "retail",
    ]);
    assert!(ok, "stderr: {}", stderr);

    let envelope = parse_json(&stdout);
    assert_eq!(envelope["success"], true);
    assert!(envelope["message"]
        .as_str()
        .unwrap()
        .contains("vw_clickstream"));
    let rows = &envelope["lineage_data"];
    assert_eq!(
        envelope["total_records"].as_u64().unwrap() as usize,
        rows.as_array().unwrap().len()
    );

    let phone = rows_where(rows, "columnName", "phone");
    assert_eq!(phone[0]["viewName"], "vw_customer_contacts");
    assert_eq!(phone[0]["regulation"], "ccpa");

    let total = rows_where(rows, "aliasName", "total");
    assert_eq!(total[0]["tableName"], "orders");
    assert_eq!(total[0]["remarks"][0], "derived_expression");
    assert!(rows_where(rows, "viewName", "vw_clickstream").is_empty());
}

#[test]
fn test_metadata_view_filter() {
    let (stdout, _, ok) = run_sl(&[
        "metadata",
        "tests/fixtures/metadata.json",
        "--regulation",
        "ccpa",
        "--view-names",
        "vw_order_totals",
    ]);
    assert!(ok);
    let envelope = parse_json(&stdout);
    let rows = envelope["lineage_data"].as_array().unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r["viewName"] == "vw_order_totals"));
}

#[test]
fn test_metadata_failed_view_exits_non_zero() {
    let (stdout, _, ok) = run_sl(&[
        "metadata",
        "tests/fixtures/metadata_broken_view.json",
        "--regulation",
        "gdpr",
    ]);
    assert!(!ok);
    let envelope = parse_json(&stdout);
    assert_eq!(envelope["success"], false);
    assert!(envelope["message"].as_str().unwrap().contains("vw_bad"));
}

#[test]
fn test_metadata_custom_keys_from_config() {
    // The fixture config reads `query`/`name`, which metadata.json does not use
    let (stdout, _, ok) = run_sl(&[
        "-c",
        "tests/fixtures/sqllineage.yml",
        "metadata",
        "tests/fixtures/metadata.json",
        "--regulation",
        "ccpa",
    ]);
    assert!(ok);
    let envelope = parse_json(&stdout);
    assert_eq!(envelope["total_records"], 0);
}

#[test]
fn test_missing_config_file_errors() {
    let (_, stderr, ok) = run_sl(&["-c", "tests/fixtures/nope.yml", "remarks"]);
    // remarks does not read config
    assert!(ok, "stderr: {}", stderr);

    let (_, stderr, ok) = run_sl(&[
        "--config",
        "tests/fixtures/nope.yml",
        "extract",
        "--sql",
        "SELECT 1",
    ]);
    assert!(!ok);
    assert!(stderr.contains("Config file not found"));
}

// ── remarks ─────────────────────────────────────────────────────────────

#[test]
fn test_remarks_lists_taxonomy() {
    let (stdout, _, ok) = run_sl(&["remarks"]);
    assert!(ok);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 27);
    assert_eq!(lines[0], "all_columns_selected");
    assert!(lines.contains(&"join_type:LEFT"));
    assert_eq!(lines[lines.len() - 1], "tech_failure");
}
