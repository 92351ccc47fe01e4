// SPDX-License-Identifier: Apache-2.0 OR MIT
//! End-to-end tests for the `lithos-tmpl` binary.

#![allow(deprecated)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn lithos_tmpl() -> Command {
    let mut cmd = Command::cargo_bin("lithos-tmpl").unwrap();
    cmd.env_remove("LITHOS_TMPL_DATA")
        .env_remove("LITHOS_TMPL_GOFMT")
        .env_remove("LITHOS_TMPL_LOG");
    cmd
}

#[test]
fn renders_inline_data_with_go_style_flag() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.tmpl"), "hi {{.name}}, you are {{.age}}").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["-data", r#"{"name":"bob","age":12}"#, "a.tmpl"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(
        fs::read_to_string(dir.path().join("a")).unwrap(),
        "hi bob, you are 12"
    );
}

#[test]
fn renders_data_from_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.json"), r#"["apple","pear"]"#).unwrap();
    fs::write(
        dir.path().join("fruit.txt.tmpl"),
        "I like{{range .}} ({{.}}){{end}}",
    )
    .unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["--data=@data.json", "fruit.txt.tmpl"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("fruit.txt")).unwrap(),
        "I like (apple) (pear)"
    );
}

#[test]
fn renders_data_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.tmpl"), "{{.foo}}").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["-d", "@-", "x.tmpl"])
        .write_stdin(r#"{"foo":"bar"}"#)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dir.path().join("x")).unwrap(), "bar");
}

#[test]
fn data_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.tmpl"), "{{.foo}}").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .env("LITHOS_TMPL_DATA", r#"{"foo":"env"}"#)
        .arg("x.tmpl")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dir.path().join("x")).unwrap(), "env");
}

#[test]
fn go_output_gets_banner() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.go.tmpl"), "package {{.}}\n").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["-data", r#""model""#, "model.go.tmpl"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("model.go")).unwrap();
    assert_eq!(
        written,
        "// Generated by lithos-tmpl\n\
         // https://github.com/hans-d/lithos-gotmpl-rs\n\
         //\n\
         // DO NOT EDIT!\n\
         // Source: model.go.tmpl\n\
         \n\
         package model\n"
    );
}

#[test]
fn missing_paths_is_usage_error() {
    lithos_tmpl()
        .args(["-data", "{}"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PATH"));
}

#[test]
fn malformed_data_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.tmpl"), "{{.}}").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["-data", "{nope", "x.tmpl"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: decode data:"));

    assert!(!dir.path().join("x").exists());
}

#[test]
fn failing_template_is_reported_and_stops_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.tmpl"), "ok").unwrap();
    fs::write(dir.path().join("b.tmpl"), "{{ \"d\" }").unwrap();
    fs::write(dir.path().join("c.tmpl"), "ok").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["a.tmpl", "b.tmpl", "c.tmpl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: b.tmpl: parse error"));

    assert!(dir.path().join("a").exists());
    assert!(!dir.path().join("c").exists());
}

#[test]
fn dry_run_leaves_disk_untouched() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.tmpl"), "hello").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["--dry-run", "a.tmpl"])
        .assert()
        .success()
        .stderr(predicate::str::contains("dry run"));

    assert!(!dir.path().join("a").exists());
}

#[test]
fn verbose_logs_written_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.tmpl"), "hello").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["-v", "a.tmpl"])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote rendered template"));
}

#[test]
fn missing_key_fails_unless_zero_mode() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.tmpl"), "hi {{.name}}").unwrap();

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["-data", r#"{"age":12}"#, "a.tmpl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "error: a.tmpl: render error: map has no entry for key \"name\"",
        ));
    assert!(!dir.path().join("a").exists());

    lithos_tmpl()
        .current_dir(dir.path())
        .args(["--missing-key=zero", "-data", r#"{"age":12}"#, "a.tmpl"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(dir.path().join("a")).unwrap(), "hi ");
}
