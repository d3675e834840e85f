//! Canonical action strings.
//!
//! Every action observed in a trajectory is rendered as
//! `kind(arg1='v1', arg2='v2', ...)`. The helpers in this module build such
//! strings and pull their parts back out without ever failing: a string
//! that does not follow the grammar simply has no kind and no arguments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The six action kinds emitted by the trajectory parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ExecuteBash,
    GotoUrl,
    SendMessage,
    ReadFile,
    WriteFile,
    Finish,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::ExecuteBash => "execute_bash",
            ActionKind::GotoUrl => "goto_url",
            ActionKind::SendMessage => "send_message",
            ActionKind::ReadFile => "read_file",
            ActionKind::WriteFile => "write_file",
            ActionKind::Finish => "finish",
        }
    }

    /// All known kinds, in grammar order.
    pub fn all() -> [ActionKind; 6] {
        [
            ActionKind::ExecuteBash,
            ActionKind::GotoUrl,
            ActionKind::SendMessage,
            ActionKind::ReadFile,
            ActionKind::WriteFile,
            ActionKind::Finish,
        ]
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "execute_bash" => Ok(ActionKind::ExecuteBash),
            "goto_url" => Ok(ActionKind::GotoUrl),
            "send_message" => Ok(ActionKind::SendMessage),
            "read_file" => Ok(ActionKind::ReadFile),
            "write_file" => Ok(ActionKind::WriteFile),
            "finish" => Ok(ActionKind::Finish),
            _ => Err(format!("Unknown action kind: {s}")),
        }
    }
}

fn kind_regex() -> &'static Regex {
    static KIND: OnceLock<Regex> = OnceLock::new();
    KIND.get_or_init(|| Regex::new(r"^(\w+)\(").expect("action kind pattern is valid"))
}

/// Returns the raw kind token of an action string (`goto_url` for
/// `goto_url(url='...')`), or `None` when the string has no `kind(` prefix.
pub fn raw_kind(action: &str) -> Option<&str> {
    kind_regex()
        .captures(action)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses the kind of an action string into one of the six known kinds.
/// The kind token is matched case-insensitively, so `Finish()` is a finish.
pub fn action_kind(action: &str) -> Option<ActionKind> {
    raw_kind(action).and_then(|kind| kind.to_ascii_lowercase().parse().ok())
}

/// Extracts the value of `name='...'` from an action string.
///
/// The value runs up to the next single quote, so free-text arguments that
/// contain quotes are truncated. Only `recipient`, `url` and `path` are
/// read back by the scorer and none of them carries quotes.
pub fn action_arg<'a>(action: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}='");
    let mut search_from = 0;
    while let Some(pos) = action[search_from..].find(&needle) {
        let start = search_from + pos;
        // Require a boundary so `path` does not match inside `xpath`.
        let boundary_ok = start == 0
            || !action[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
        let value_start = start + needle.len();
        if boundary_ok {
            let rest = &action[value_start..];
            return rest.find('\'').map(|end| &rest[..end]).filter(|v| !v.is_empty());
        }
        search_from = value_start;
    }
    None
}

pub fn format_execute_bash(command: &str) -> String {
    format!("execute_bash(command='{command}')")
}

pub fn format_goto_url(url: &str) -> String {
    format!("goto_url(url='{url}')")
}

pub fn format_send_message(recipient: Option<&str>, content: &str) -> String {
    match recipient {
        Some(recipient) => format!("send_message(recipient='{recipient}', content='{content}')"),
        None => format!("send_message(content='{content}')"),
    }
}

pub fn format_read_file(path: &str) -> String {
    format!("read_file(path='{path}')")
}

pub fn format_write_file(path: &str) -> String {
    format!("write_file(path='{path}')")
}

pub fn format_finish() -> String {
    "finish()".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in ActionKind::all() {
            assert_eq!(kind.as_str().parse::<ActionKind>(), Ok(kind));
        }
        assert!("teleport".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_action_kind_extraction() {
        assert_eq!(
            action_kind("goto_url(url='http://x/home')"),
            Some(ActionKind::GotoUrl)
        );
        assert_eq!(action_kind("finish()"), Some(ActionKind::Finish));
        assert_eq!(action_kind("Finish()"), Some(ActionKind::Finish));
        assert_eq!(
            action_kind("GOTO_URL(url='http://x/home')"),
            Some(ActionKind::GotoUrl)
        );
        assert_eq!(raw_kind("teleport(to='mars')"), Some("teleport"));
        assert_eq!(action_kind("teleport(to='mars')"), None);
        assert_eq!(action_kind("not an action"), None);
    }

    #[test]
    fn test_action_arg() {
        let msg = "send_message(recipient='Emily Zhou', content='Hello Emily')";
        assert_eq!(action_arg(msg, "recipient"), Some("Emily Zhou"));
        assert_eq!(action_arg(msg, "content"), Some("Hello Emily"));
        assert_eq!(action_arg(msg, "url"), None);

        assert_eq!(action_arg("read_file(xpath='/a', path='/b')", "path"), Some("/b"));
        assert_eq!(action_arg("read_file(path='')", "path"), None);
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_finish(), "finish()");
        assert_eq!(
            format_send_message(None, "hi all"),
            "send_message(content='hi all')"
        );
        assert_eq!(
            format_send_message(Some("Li Ming"), "Hello Li Ming"),
            "send_message(recipient='Li Ming', content='Hello Li Ming')"
        );
        assert_eq!(
            format_write_file("/workspace/a.txt"),
            "write_file(path='/workspace/a.txt')"
        );
    }
}
