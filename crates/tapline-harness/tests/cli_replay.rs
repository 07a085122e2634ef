//! End-to-end runs of the `tapline` CLI against fixture traces.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tapline_core::{ElementId, GestureKind};
use tapline_harness::cli::{Cli, execute};
use tapline_harness::{HarnessError, TaplineConfig, replay_list_session};
use tapline_list::{ListCommand, ReorderEvent};
use tapline_web::SessionTrace;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Result<String, HarnessError> {
    use clap::Parser;
    let mut argv = vec!["tapline"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("argv parses");
    let mut out = Vec::new();
    execute(cli, &mut out)?;
    Ok(String::from_utf8(out).expect("utf8 output"))
}

fn id(s: &str) -> ElementId {
    ElementId::new(s)
}

#[test]
fn fixture_session_with_defaults() {
    let trace = SessionTrace::from_file(fixture("list_session.jsonl")).expect("trace");
    let report = replay_list_session(&trace, &TaplineConfig::default()).expect("replay");

    let kinds: Vec<GestureKind> = report.gestures.iter().map(|g| g.action.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            GestureKind::Tap,
            GestureKind::SwipeStart,
            GestureKind::SwipeMove,
            GestureKind::SwipeMove,
            GestureKind::SwipeEnd,
            GestureKind::DragStart,
            GestureKind::DragMove,
            GestureKind::DragMove,
            GestureKind::DragEnd,
            GestureKind::LongPress,
            GestureKind::Tap,
            GestureKind::DoubleTap,
        ]
    );

    let commands: Vec<(u64, ListCommand)> = report
        .commands
        .iter()
        .map(|c| (c.t_ms, c.value.clone()))
        .collect();
    assert_eq!(
        commands,
        vec![
            (160, ListCommand::BeginEdit { id: id("groceries") }),
            (1120, ListCommand::Remove { id: id("laundry") }),
            (3616, ListCommand::OpenChildren { id: id("laundry") }),
            (4040, ListCommand::CommitEdit { id: id("groceries") }),
            (4140, ListCommand::Append),
        ]
    );

    assert_eq!(
        report.reorders.iter().map(|r| r.value.clone()).collect::<Vec<_>>(),
        vec![
            ReorderEvent::Start {
                id: id("taxes"),
                from: 2,
            },
            ReorderEvent::Move {
                id: id("taxes"),
                from: 2,
                offset: tapline_core::Offset::new(0.0, -110.0),
            },
            ReorderEvent::End {
                id: id("taxes"),
                from: 2,
                to: Some(0),
            },
        ]
    );
    assert_eq!(report.ignored, 0);
}

#[test]
fn config_file_changes_list_limit() {
    let out = run(&[
        "replay",
        fixture("list_session.jsonl").to_str().expect("path"),
        "--config",
        fixture("tapline.toml").to_str().expect("path"),
        "--json",
    ])
    .expect("replay");
    let report: serde_json::Value = serde_json::from_str(&out).expect("json output");
    let commands = report["commands"].as_array().expect("commands");
    assert_eq!(commands.last().expect("last")["command"], "limit_reached");
    assert_eq!(commands.last().expect("last")["max_items"], 2);
}

#[test]
fn text_replay_summarizes() {
    let out = run(&["replay", fixture("list_session.jsonl").to_str().expect("path")])
        .expect("replay");
    assert!(out.starts_with("session list-session\n"));
    assert!(out.contains("GESTURE_LONG_PRESS"));
    assert!(out.trim_end().ends_with("12 gestures, 5 list commands, 3 reorder events, 0 ignored"));
}

#[test]
fn invalid_config_exits_with_config_code() {
    let error = run(&["config", "--check", fixture("invalid.toml").to_str().expect("path")])
        .expect_err("invalid config");
    assert_eq!(error.exit_code(), 2);
    let message = error.to_string();
    assert!(message.contains("gesture.resolve_threshold"), "{message}");
    assert!(message.contains("reorder.activation_delay_ms"), "{message}");
}

#[test]
fn valid_config_checks_ok() {
    let path = fixture("tapline.toml");
    let out = run(&["config", "--check", path.to_str().expect("path")]).expect("check");
    assert_eq!(out, format!("{}: ok\n", path.display()));
}

#[test]
fn missing_trace_is_reported() {
    let error = run(&["replay", "/definitely/not/here.jsonl"]).expect_err("missing");
    assert!(matches!(error, HarnessError::MissingPath { .. }));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn corrupt_trace_exits_with_trace_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.jsonl");
    std::fs::write(&path, "{\"event\":\"tick\",\"t_ms\":0}\n").expect("write");
    let error = run(&["replay", path.to_str().expect("path")]).expect_err("no header");
    assert_eq!(error.exit_code(), 3);
}
