// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end runs of the `gradewerk` binary.

#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;

const KEY: &str = r#"[
    {"correct_answer": 2},
    {"correct_answer": 1},
    {"correct_answer": 0},
    {"correct_answer": [0, 3], "grading_mode": "partial_credit"},
    {"correct_answer": 1}
]"#;

/// A square-on photo of a 5-question, 4-option sheet on a dark table, marked
/// C, B, -, A+D, -.
fn write_sheet_photo(path: &Path) {
    let mut photo = GrayImage::from_pixel(550, 700, Luma([40u8]));
    for y in 50..650 {
        for x in 55..495 {
            photo.put_pixel(x, y, Luma([230u8]));
        }
    }
    for (question, option) in [(0u32, 2u32), (1, 1), (3, 0), (3, 3)] {
        let x0 = 55 + option * 110 + 10;
        let y0 = 50 + question * 120 + 10;
        for y in y0..y0 + 100 {
            for x in x0..x0 + 90 {
                photo.put_pixel(x, y, Luma([0u8]));
            }
        }
    }
    photo.save(path).unwrap();
}

fn gradewerk() -> Command {
    Command::cargo_bin("gradewerk").unwrap()
}

#[test]
fn help_lists_subcommands() {
    gradewerk()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("scan")
                .and(predicate::str::contains("grade"))
                .and(predicate::str::contains("batch"))
                .and(predicate::str::contains("export")),
        );
}

#[test]
fn grade_from_answers_file() {
    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("key.json");
    let answers = dir.path().join("answers.json");
    std::fs::write(&key, KEY).unwrap();
    std::fs::write(&answers, "[2, 1, null, [0], 3]").unwrap();

    let output = gradewerk()
        .arg("grade")
        .arg("--key")
        .arg(&key)
        .arg("--answers")
        .arg(&answers)
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["score"], 2.5);
    assert_eq!(result["total"], 5);
    assert_eq!(result["percentage"], 50.0);
    assert_eq!(result["details"][3]["points"], 0.5);
    assert_eq!(result["details"][3]["is_correct"], false);
}

#[test]
fn scan_reports_failures_per_image() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("sheet.png");
    write_sheet_photo(&good);
    let missing = dir.path().join("missing.png");

    let output = gradewerk()
        .args(["scan", "--questions", "5", "--options", "4"])
        .arg(&good)
        .arg(&missing)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["success"], true);
    assert_eq!(lines[0]["answers"], serde_json::json!([2, 1, null, [0, 3], null]));
    assert_eq!(lines[1]["success"], false);
    assert!(lines[1]["answers"].is_null());
    assert!(
        lines[1]["error"]
            .as_str()
            .unwrap()
            .starts_with("could not read image file")
    );
}

#[test]
fn batch_then_export() {
    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("key.json");
    let db = dir.path().join("grades.db");
    let good = dir.path().join("sheet.png");
    std::fs::write(&key, KEY).unwrap();
    write_sheet_photo(&good);

    gradewerk()
        .args(["batch", "--options", "4", "--test-id", "quiz-1", "--jobs", "2"])
        .arg("--key")
        .arg(&key)
        .arg("--db")
        .arg(&db)
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"percentage\":60.0"));

    gradewerk()
        .args(["export", "--test-id", "quiz-1"])
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("Rank,Name,Score,Total,Percentage,Grade,Submitted At,Q1,Q2,Q3,Q4,Q5")
                .and(predicate::str::contains("1,sheet.png,3,5,60%,D,"))
                .and(predicate::str::contains(",C,B,-,\"A,D\",-"))
                .and(predicate::str::contains("Pass Rate (>=60%),1/1 (100.0%)")),
        );
}

#[test]
fn batch_requires_test_id_when_storing() {
    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("key.json");
    std::fs::write(&key, KEY).unwrap();

    gradewerk()
        .arg("batch")
        .arg("--key")
        .arg(&key)
        .arg("--db")
        .arg(dir.path().join("grades.db"))
        .arg(dir.path().join("sheet.png"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--test-id"));
}

#[test]
fn bad_answer_key_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("key.json");
    std::fs::write(&key, "42").unwrap();

    gradewerk()
        .arg("grade")
        .arg("--key")
        .arg(&key)
        .arg("--answers")
        .arg(&key)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid answer key"));
}
