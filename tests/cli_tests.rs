#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("QUOTE_ESTIMATOR_CONFIG")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_starts_with_blank_form() {
    run_cli("quit\n")
        .success()
        .stdout(str_contains("Quote Estimator (CLI)"))
        .stdout(str_contains("Grand total: $4,000.00"));
}

#[test]
fn cli_prices_a_scope_line() {
    run_cli("task 1 Core switch install\nhours 1 10\nsummary\nquit\n")
        .success()
        .stdout(str_contains("Core switch install"))
        .stdout(str_contains("Grand total: $7,148.25"))
        .stdout(str_contains("Margin: 73.4%"));
}

#[test]
fn cli_reports_unknown_scope_id() {
    run_cli("hours 99 4\ndelete 42\nquit\n")
        .success()
        .stdout(str_contains("scope item 99 not found"))
        .stdout(str_contains("scope item 42 not found"));
}

#[test]
fn cli_rejects_out_of_range_discount() {
    run_cli("project discount 150\nproject\nquit\n")
        .success()
        .stdout(str_contains("discount_rate must be between 0 and 100"))
        .stdout(str_contains("Discount:        0%"));
}

#[test]
fn cli_failed_generation_keeps_form_state() {
    run_cli("task 1 Survey\nhours 1 10\ngenerate /definitely/not/a/dir\nshow\nsummary\nquit\n")
        .success()
        .stdout(str_contains("Failed to generate proposal"))
        .stdout(str_contains("Survey"))
        .stdout(str_contains("Grand total: $7,148.25"));
}

#[test]
fn cli_generates_proposal_data() {
    let dir = TempDir::new().expect("temp dir");
    let script = format!(
        "project customer Acme\nproject opportunity OPP-7 - Core Refresh\nproject created 2026-01-05\ntask 1 Survey\nhours 1 10\ngenerate {}\nquit\n",
        dir.path().display()
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("EP - Acme - OPP-7 - 20260105.docx"));

    let written = dir.path().join("EP - Acme - OPP-7 - 20260105.json");
    let text = std::fs::read_to_string(written).expect("proposal data written");
    assert!(text.contains("\"Proposal Title\": \"Core Refresh\""));
    assert!(text.contains("\"Total Cost\": \"7,148.25\""));
}

#[test]
fn cli_imports_scope_csv() {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"id,task,work_role,work_type,hours\n1,Imported task,Engineer II,Proj. Normal,6\n")
        .expect("write csv");
    let script = format!("import csv {}\nquit\n", tmp.path().display());
    run_cli(&script)
        .success()
        .stdout(str_contains("Imported"))
        .stdout(str_contains("Imported task"));
}

#[test]
fn cli_loads_configuration() {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"[defaults]\nfair_market_uplift = 1000.0\n\n[[rates]]\nrole = \"Engineer III\"\nweighted_cost = 150.0\nbase_rate = 300.0\ntravel_cost = 87.5\ntravel_rate = 125.0\n")
        .expect("write config");
    let script = format!("config {}\nrates\nquit\n", tmp.path().display());
    run_cli(&script)
        .success()
        .stdout(str_contains("Configuration loaded."))
        .stdout(str_contains("300.00"));
}
