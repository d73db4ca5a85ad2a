// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! End-to-end tests for the `wire` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;
use wire_dry_tests::CannedDoc;

/// `wire` with its preferences isolated in `dir`.
fn wire(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("wire");
    cmd.arg("--config-dir").arg(dir.join("prefs")).env_remove("RUST_LOG");
    cmd
}

fn write_doc(dir: &TempDir, name: &str, doc: &CannedDoc) -> PathBuf {
    let path = dir.path().join(name);
    let json = doc.to_json().expect("canned doc serializes");
    fs::write(&path, serde_json::to_vec_pretty(&json).expect("json")).expect("write doc");
    path
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is json")
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().expect("tempdir");
    wire(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("normalize").and(predicate::str::contains("nets")));
}

#[test]
fn normalized_document_is_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc = CannedDoc::divider();
    let path = write_doc(&dir, "divider.json", &doc);
    let out = stdout_json(wire(dir.path()).arg("normalize").arg(&path));
    assert_eq!(out, doc.to_json().expect("json"));
}

#[test]
fn normalize_writes_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_doc(&dir, "bus.json", &CannedDoc::messy_bus());
    let target = dir.path().join("bus.normalized.json");
    wire(dir.path())
        .arg("normalize")
        .arg(&path)
        .arg("--output")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: Value =
        serde_json::from_slice(&fs::read(&target).expect("output written")).expect("json");
    let wires = written["wires"].as_array().expect("wires");
    assert_eq!(wires.len(), 1);
    assert_eq!(wires[0]["label"], "BUS");
    assert_eq!(wires[0]["segments"].as_array().map(Vec::len), Some(3));
}

#[test]
fn nets_json_counts_members_and_pins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_doc(&dir, "divider.json", &CannedDoc::divider());
    let rows = stdout_json(wire(dir.path()).arg("nets").arg(&path).arg("--json"));
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 3);
    let mid = rows.iter().find(|r| r["name"] == "MID").expect("MID listed");
    assert_eq!(mid["pins"], 2);
    assert_eq!(mid["edges"], 1);
    let gnd = rows.iter().find(|r| r["name"] == "GND").expect("GND listed");
    assert_eq!(gnd["vertices"], 3);
}

#[test]
fn nets_table_uses_saved_name_prefix() {
    let dir = tempfile::tempdir().expect("tempdir");
    let prefs = dir.path().join("prefs");
    fs::create_dir_all(&prefs).expect("prefs dir");
    fs::write(prefs.join("wire-prefs.json"), r#"{"net_name_prefix": "NET_"}"#).expect("prefs");
    let path = write_doc(&dir, "divider.json", &CannedDoc::divider());
    wire(dir.path())
        .arg("nets")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("GND").and(predicate::str::contains("NET_00000000")));
}

#[test]
fn missing_document_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    wire(dir.path())
        .arg("normalize")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn malformed_document_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ not json").expect("write");
    wire(dir.path())
        .arg("nets")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse"));
}

#[test]
fn config_show_then_reset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let prefs = dir.path().join("prefs");
    fs::create_dir_all(&prefs).expect("prefs dir");
    fs::write(prefs.join("wire-prefs.json"), r#"{"grid_step": 5.0}"#).expect("prefs");

    let shown = stdout_json(wire(dir.path()).args(["config", "show"]));
    assert_eq!(shown["grid_step"], 5.0);
    assert_eq!(shown["net_name_prefix"], "N$");

    let reset = stdout_json(wire(dir.path()).args(["config", "reset"]));
    assert_eq!(reset["grid_step"], 1.0);
    let saved = fs::read(prefs.join("wire-prefs.json")).expect("saved");
    let saved: Value = serde_json::from_slice(&saved).expect("json");
    assert_eq!(saved, reset);
}
