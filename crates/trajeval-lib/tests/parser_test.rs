//! # Trajectory Parser Integration Test
//!
//! Parses a small but realistic execution log from disk and checks the
//! exact action strings the scorer will see.

use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use trajeval_lib::{normalize_path, parser::parse_trajectory_file, ParseError};

fn meeting_log() -> Value {
    json!([
        {"id": 0, "source": "user", "action": "message",
         "args": {"content": "Schedule a meeting with Emily Zhou and Liu Qiang"}},
        {"id": 1, "source": "agent", "action": "run_ipython",
         "args": {"code": "print(file_editor(**{'command': 'view', 'path': '/instruction/task.md'}))"}},
        {"id": 2, "source": "agent", "observation": "run_ipython", "content": "Here's the task"},
        {"id": 3, "source": "agent", "action": "browse_interactive",
         "args": {"browser_actions": "goto(\"http://the-agent-company.com:3000/home\")"}},
        {"id": 4, "source": "agent", "action": "browse_interactive",
         "args": {"browser_actions": "fill('composer', 'Hello Emily Zhou, are you free on Tuesday?')"}},
        {"id": 5, "source": "environment", "observation": "browse", "content": "typed"},
        {"id": 6, "source": "agent", "action": "browse_interactive",
         "args": {"browser_actions": "click('send')"}},
        {"id": 7, "source": "agent", "action": "browse_interactive",
         "args": {"browser_actions": "fill('composer', 'Hello Liu Qiang, are you free on Tuesday?')\npress('composer', 'Enter')"}},
        {"id": 8, "source": "agent", "action": "run",
         "args": {"command": "echo 'Tuesday works' > /workspace/conclusion.txt"}},
        {"id": 9, "source": "agent", "action": "run_ipython",
         "args": {"code": "file_editor(**{'command': 'create', 'path': '/workspace/conclusion.txt', 'file_text': 'Tuesday'})"}},
        {"id": 10, "source": "agent", "action": "think", "args": {"thought": "done"}},
        {"id": 11, "source": "agent", "action": "finish", "args": {"outputs": {}}}
    ])
}

#[test]
fn test_parse_meeting_trajectory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traj_pm-schedule-meeting-1-image.json");
    fs::write(&path, serde_json::to_string(&meeting_log()).unwrap()).unwrap();

    let actions = parse_trajectory_file(&path).unwrap();
    assert_eq!(
        actions,
        vec![
            "read_file(path='/instruction/task.md')",
            "goto_url(url='http://the-agent-company.com:3000/home')",
            "send_message(recipient='Emily Zhou', content='Hello Emily Zhou, are you free on Tuesday?')",
            "send_message(recipient='Liu Qiang', content='Hello Liu Qiang, are you free on Tuesday?')",
            "execute_bash(command='echo 'Tuesday works' > /workspace/conclusion.txt')",
            "write_file(path='/workspace/conclusion.txt')",
            "finish()",
        ]
    );

    assert_eq!(
        normalize_path(&actions),
        vec![
            "read_file(instruction/task.md)",
            "goto_url(home)",
            "send_message(recipient='Emily Zhou')",
            "send_message(recipient='Liu Qiang')",
            "execute_bash",
            "write_file(workspace/conclusion.txt)",
            "finish",
        ]
    );
}

#[test]
fn test_missing_trajectory_file() {
    let dir = TempDir::new().unwrap();
    let err = parse_trajectory_file(dir.path().join("traj_nothing.json")).unwrap_err();
    assert!(matches!(err, ParseError::NotFound(_)));
}

#[test]
fn test_empty_log_has_no_actions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traj_empty.json");
    fs::write(&path, "[]").unwrap();
    assert!(parse_trajectory_file(&path).unwrap().is_empty());
}
