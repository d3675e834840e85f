//! Trajectory log parser.
//!
//! Converts an OpenHands-style execution log (a JSON array of records with
//! `source`, `action` and `args` fields) into canonical action strings.
//! Only agent-initiated, non-observation records produce actions:
//!
//! | record `action`      | emitted action                                   |
//! |----------------------|--------------------------------------------------|
//! | `run`                | `execute_bash(command='...')`                    |
//! | `run_ipython`        | `read_file(path='...')` / `write_file(path='...')` |
//! | `browse_interactive` | `goto_url(url='...')` / `send_message(...)`      |
//! | `finish`             | `finish()`                                       |

use crate::action::{
    format_execute_bash, format_finish, format_goto_url, format_read_file, format_send_message,
    format_write_file,
};
use crate::error::{ParseError, ParseResult};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// How many following records are inspected for a separate "send" click.
const SEND_LOOKAHEAD: usize = 4;

/// Parses a trajectory file into action strings.
pub fn parse_trajectory_file(path: impl AsRef<Path>) -> ParseResult<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ParseError::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    let actions = parse_trajectory_str(&raw)?;
    debug!(path = %path.display(), actions = actions.len(), "Parsed trajectory");
    Ok(actions)
}

/// Parses trajectory JSON text into action strings.
pub fn parse_trajectory_str(raw: &str) -> ParseResult<Vec<String>> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(records) = value else {
        return Err(ParseError::invalid_format(
            "expected a JSON array of trajectory records",
        ));
    };
    parse_records(&records)
}

/// Parses already decoded trajectory records.
pub fn parse_records(records: &[Value]) -> ParseResult<Vec<String>> {
    let mut actions = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let Some(obj) = record.as_object() else {
            return Err(ParseError::invalid_format(format!(
                "record {idx} is not a JSON object"
            )));
        };
        let Some(action_type) = agent_action_type(obj) else {
            continue;
        };
        let args = obj.get("args").and_then(Value::as_object);

        match action_type {
            "run" => {
                if let Some(command) = str_arg(args, "command") {
                    actions.push(format_execute_bash(command));
                }
            }
            "run_ipython" => {
                if let Some(action) = str_arg(args, "code").and_then(parse_file_editor_call) {
                    actions.push(action);
                }
            }
            "browse_interactive" => {
                if let Some(browser_actions) = str_arg(args, "browser_actions") {
                    if let Some(action) = parse_browser_actions(browser_actions, records, idx) {
                        actions.push(action);
                    }
                }
            }
            "finish" => actions.push(format_finish()),
            other => debug!(action = other, "Skipping unsupported agent action"),
        }
    }

    Ok(actions)
}

/// Kind of an agent-initiated action record, `None` for observations,
/// environment/user records and records without an action.
fn agent_action_type(obj: &Map<String, Value>) -> Option<&str> {
    if obj.get("source").and_then(Value::as_str) != Some("agent") {
        return None;
    }
    if obj.contains_key("observation") {
        return None;
    }
    match obj.get("action") {
        Some(Value::String(action)) => Some(action.as_str()),
        Some(other) => {
            warn!(action = %other, "Agent record has a non-string action");
            None
        }
        None => None,
    }
}

fn str_arg<'a>(args: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a str> {
    args.and_then(|a| a.get(key)).and_then(Value::as_str)
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("parser pattern is valid"))
}

/// Reads a `file_editor(**{'command': ..., 'path': ...})` call out of
/// IPython code. `view` is a read; `create`, `insert` and `str_replace`
/// are writes.
pub fn parse_file_editor_call(code: &str) -> Option<String> {
    static PATH: OnceLock<Regex> = OnceLock::new();
    static COMMAND: OnceLock<Regex> = OnceLock::new();

    let path = regex(&PATH, r"'path':\s*'([^']+)'")
        .captures(code)?
        .get(1)?
        .as_str();
    let command = regex(&COMMAND, r"'command':\s*'([^']+)'")
        .captures(code)?
        .get(1)?
        .as_str();

    match command {
        "view" => Some(format_read_file(path)),
        "create" | "insert" | "str_replace" => Some(format_write_file(path)),
        _ => None,
    }
}

/// Extracts the URL of the first `goto('...')` call.
pub fn extract_goto_url(browser_actions: &str) -> Option<&str> {
    static GOTO: OnceLock<Regex> = OnceLock::new();
    regex(&GOTO, r#"goto\(['"]([^'"]+)['"]\)"#)
        .captures(browser_actions)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts the text typed by the first `fill(selector, text)` call.
pub fn extract_fill_message(browser_actions: &str) -> Option<&str> {
    static FILL: OnceLock<Regex> = OnceLock::new();
    let caps = regex(
        &FILL,
        r#"(?s)fill\((?:'.*?'|".*?")\s*,\s*(?:'(.*?)'|"(.*?)")\)"#,
    )
    .captures(browser_actions)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// True when the actions submit what was typed (Enter key or a click).
pub fn has_submit(browser_actions: &str) -> bool {
    static SUBMIT: OnceLock<Regex> = OnceLock::new();
    regex(
        &SUBMIT,
        r#"(press\([^)]*['"]Enter['"]\)|click\([^)]*\))"#,
    )
    .is_match(browser_actions)
}

/// Guesses the addressee of a direct message from a `Hello <Name>` greeting.
///
/// Accepts one or two capitalized words; anything else is treated as a
/// channel message.
pub fn infer_recipient(message: &str) -> Option<&str> {
    static HELLO: OnceLock<Regex> = OnceLock::new();
    regex(&HELLO, r"Hello\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)")
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_browser_actions(browser_actions: &str, records: &[Value], idx: usize) -> Option<String> {
    if let Some(url) = extract_goto_url(browser_actions) {
        return Some(format_goto_url(url));
    }

    let message = extract_fill_message(browser_actions)?;
    if !has_submit(browser_actions) && !submitted_by_next_click(records, idx) {
        debug!(record = idx, "Typed text was never submitted");
        return None;
    }

    Some(format_send_message(infer_recipient(message), message))
}

/// Some agents type a message in one step and click "send" in the next.
/// Looks at the following records until the first agent action that is
/// not a browser action.
fn submitted_by_next_click(records: &[Value], idx: usize) -> bool {
    let end = (idx + 1 + SEND_LOOKAHEAD).min(records.len());
    for record in &records[idx + 1..end] {
        let Some(action_type) = record.as_object().and_then(agent_action_type) else {
            continue;
        };
        if action_type != "browse_interactive" {
            return false;
        }
        let next_actions = record
            .get("args")
            .and_then(|a| a.get("browser_actions"))
            .and_then(Value::as_str)
            .unwrap_or("");
        if next_actions.contains("click") && !next_actions.contains("fill") {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_recipient() {
        assert_eq!(
            infer_recipient("Hello Emily Zhou, are you free?"),
            Some("Emily Zhou")
        );
        assert_eq!(infer_recipient("Hello Mike! Quick question"), Some("Mike"));
        assert_eq!(infer_recipient("hello everyone"), None);
        assert_eq!(infer_recipient("Hi @active_users"), None);
    }

    #[test]
    fn test_extract_fill_message() {
        assert_eq!(
            extract_fill_message("fill('12', 'Hello Li Ming, see you')\npress('12', 'Enter')"),
            Some("Hello Li Ming, see you")
        );
        assert_eq!(
            extract_fill_message(r#"fill("a1", "It's done")"#),
            Some("It's done")
        );
        assert_eq!(
            extract_fill_message("fill('a1', 'it's fine')"),
            Some("it's fine")
        );
        assert_eq!(extract_fill_message("click('a1')"), None);
    }

    #[test]
    fn test_parse_file_editor_call() {
        let view = "print(file_editor(**{'command': 'view', 'path': '/instruction/task.md'}))";
        assert_eq!(
            parse_file_editor_call(view),
            Some("read_file(path='/instruction/task.md')".to_string())
        );

        let edit = "file_editor(**{'command': 'str_replace', 'path': '/workspace/a.py', 'old_str': 'x'})";
        assert_eq!(
            parse_file_editor_call(edit),
            Some("write_file(path='/workspace/a.py')".to_string())
        );

        let undo = "file_editor(**{'command': 'undo_edit', 'path': '/workspace/a.py'})";
        assert_eq!(parse_file_editor_call(undo), None);
        assert_eq!(parse_file_editor_call("print('hi')"), None);
    }

    #[test]
    fn test_observations_and_environment_records_are_skipped() {
        let records = vec![
            json!({"source": "user", "action": "message", "args": {}}),
            json!({"source": "agent", "observation": "run", "content": "ok"}),
            json!({"source": "agent", "message": "thinking"}),
            json!({"source": "agent", "action": "run", "args": {"command": "ls"}}),
        ];
        assert_eq!(
            parse_records(&records).unwrap(),
            vec!["execute_bash(command='ls')".to_string()]
        );
    }

    #[test]
    fn test_unsubmitted_fill_is_not_a_message() {
        let records = vec![
            json!({"source": "agent", "action": "browse_interactive",
                   "args": {"browser_actions": "fill('5', 'Hello Emily')"}}),
            json!({"source": "agent", "action": "run", "args": {"command": "ls"}}),
            json!({"source": "agent", "action": "browse_interactive",
                   "args": {"browser_actions": "click('9')"}}),
        ];
        assert_eq!(
            parse_records(&records).unwrap(),
            vec!["execute_bash(command='ls')".to_string()]
        );
    }

    #[test]
    fn test_non_array_is_rejected() {
        let err = parse_trajectory_str(r#"{"source": "agent"}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));

        let err = parse_trajectory_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));

        let err = parse_trajectory_str("not json").unwrap_err();
        assert!(matches!(err, ParseError::JsonError(_)));
    }
}
