//! End-to-end tests driving the `eoos` binary.
//!
//! Tests the full pipeline: readings file → detection → report.

use std::path::Path;
use std::process::{Command, Output};

use chrono::NaiveDate;
use eoos_core::Reading;
use tempfile::TempDir;

fn eoos_binary() -> String {
    env!("CARGO_BIN_EXE_eoos").to_string()
}

/// Run `eoos` with an isolated home so no user config leaks in.
fn eoos(home: &Path, args: &[&str]) -> Output {
    Command::new(eoos_binary())
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run eoos")
}

/// Write a day with one feces ramp (ticks 20..60) and optional flow.
fn write_day(path: &Path, urine: Option<f64>, flow_at: Option<usize>) {
    let origin = NaiveDate::from_ymd_opt(2020, 12, 24)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let mut feces = vec![1.0; 20];
    feces.extend((1..=40).map(|k| 1.0 + (f64::from(k) / 40.0).powi(2)));
    feces.extend([2.0; 100]);

    let lines: Vec<String> = feces
        .iter()
        .enumerate()
        .map(|(t, &f)| {
            let reading = Reading {
                date_time: origin + chrono::Duration::seconds(i64::try_from(t).unwrap()),
                feces: Some(f),
                urine,
                flow: (flow_at == Some(t)).then_some(0.4),
            };
            serde_json::to_string(&reading).unwrap()
        })
        .collect();
    std::fs::write(path, lines.join("\n")).unwrap();
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "eoos should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A single ramp is reported as one event with its table row.
#[test]
fn test_detect_text_report() {
    let temp = TempDir::new().unwrap();
    let day = temp.path().join("20201224.jsonl");
    write_day(&day, Some(0.5), None);

    let output = eoos(temp.path(), &["detect", day.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("EOOS EVENTS: 20201224\n"), "{stdout}");
    assert!(stdout.contains("10:00:19"), "{stdout}");
    assert!(stdout.contains("1 events, feces 1.000, urine 0.000"), "{stdout}");
}

/// Flow before the rise pulls the event start back.
#[test]
fn test_detect_refines_start_from_flow() {
    let temp = TempDir::new().unwrap();
    let day = temp.path().join("20201224.jsonl");
    write_day(&day, Some(0.5), Some(12));

    let value = stdout_json(&eoos(temp.path(), &["detect", day.to_str().unwrap(), "--json"]));
    assert_eq!(value["refined"], 1);
    assert_eq!(value["events"][0]["start"], 12);
    assert_eq!(value["events"][0]["end"], 59);
    assert_eq!(value["events"][0]["flow_total"], 0.4);
}

/// Config file and environment both reach the engine, env last.
#[test]
fn test_config_layering() {
    let temp = TempDir::new().unwrap();
    let config_file = temp.path().join("eoos.toml");
    std::fs::write(
        &config_file,
        "[detection]\nstart_lookahead = 8\nend_lookahead = 4\n",
    )
    .unwrap();

    let output = Command::new(eoos_binary())
        .env("HOME", temp.path())
        .env_remove("XDG_CONFIG_HOME")
        .env("EOOS_DETECTION__END_LOOKAHEAD", "6")
        .args(["-c", config_file.to_str().unwrap(), "config"])
        .output()
        .unwrap();

    let value = stdout_json(&output);
    assert_eq!(value["detection"]["start_lookahead"], 8);
    assert_eq!(value["detection"]["end_lookahead"], 6);
    assert_eq!(value["derivative_periods"], 5);
}

/// A zero lookahead is reported as an error, not a crash.
#[test]
fn test_invalid_config_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let day = temp.path().join("20201224.jsonl");
    write_day(&day, Some(0.5), None);

    let output = Command::new(eoos_binary())
        .env("HOME", temp.path())
        .env_remove("XDG_CONFIG_HOME")
        .env("EOOS_DETECTION__START_LOOKAHEAD", "0")
        .args(["detect", day.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("start_lookahead"), "{stderr}");
}

/// Batch keeps going past a date whose urine scale never reported.
#[test]
fn test_batch_over_directory() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir(&data).unwrap();
    write_day(&data.join("20201224.jsonl"), Some(0.5), None);
    write_day(&data.join("20201225.jsonl"), None, None);
    write_day(&data.join("20201226.jsonl"), Some(0.5), None);
    std::fs::write(data.join("README.txt"), "ignored").unwrap();

    let value = stdout_json(&eoos(temp.path(), &["batch", data.to_str().unwrap(), "--json"]));

    let entries = value["entries"].as_array().unwrap();
    let labels: Vec<&str> = entries
        .iter()
        .map(|e| e["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["20201224", "20201225", "20201226"]);
    assert!(entries[1]["error"].as_str().unwrap().contains("urine"));
    assert_eq!(value["totals"]["dates"], 2);
    assert_eq!(value["totals"]["failed"], 1);
    assert_eq!(value["totals"]["events"], 2);
}

/// No subcommand prints help and exits successfully.
#[test]
fn test_no_command_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = eoos(temp.path(), &[]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}
