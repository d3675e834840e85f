//! Action normalization.
//!
//! Reduces an action string to the comparison key used by the similarity
//! function, the aligner and the redundancy detector. Volatile content
//! (message text, shell commands, full paths, query strings) is dropped;
//! the parts that decide whether two actions do the same job (kind,
//! recipient, coarse location) are kept.

use crate::action::{action_arg, action_kind, ActionKind};
use url::Url;

/// Key for any shell command.
pub const BASH_KEY: &str = "execute_bash";
/// Key for the `finish()` action.
pub const FINISH_KEY: &str = "finish";

/// Maps an action string to its normalized comparison key.
///
/// Never fails. Strings whose kind is not one of the six known kinds are
/// returned lower-cased and trimmed. Keys are fixed points: normalizing a
/// key returns the key itself.
pub fn normalize_action(action: &str) -> String {
    let trimmed = action.trim();
    let Some(kind) = action_kind(trimmed) else {
        return trimmed.to_lowercase();
    };

    match kind {
        ActionKind::ExecuteBash => BASH_KEY.to_string(),
        ActionKind::Finish => FINISH_KEY.to_string(),
        ActionKind::SendMessage => normalize_message(trimmed),
        ActionKind::GotoUrl => normalize_goto(trimmed),
        ActionKind::ReadFile | ActionKind::WriteFile => normalize_file(kind, trimmed),
    }
}

/// Normalizes a whole path, preserving order.
pub fn normalize_path(actions: &[String]) -> Vec<String> {
    actions.iter().map(|a| normalize_action(a)).collect()
}

/// Returns the body of `kind(body)` when it is already a bare bucket,
/// i.e. a previously produced key rather than `name='value'` arguments.
fn bare_bucket(action: &str) -> Option<&str> {
    let open = action.find('(')?;
    let close = action.rfind(')')?;
    if close <= open + 1 {
        return None;
    }
    let body = &action[open + 1..close];
    if body.contains("='") {
        None
    } else {
        Some(body)
    }
}

/// A message without a recipient went to a channel, whatever its body.
fn normalize_message(action: &str) -> String {
    let kind = ActionKind::SendMessage;
    match action_arg(action, "recipient") {
        Some(recipient) => format!("{kind}(recipient='{recipient}')"),
        None => format!("{kind}(channel)"),
    }
}

fn normalize_goto(action: &str) -> String {
    let kind = ActionKind::GotoUrl;
    if let Some(url) = action_arg(action, "url") {
        return match url_bucket(url) {
            Some(bucket) => format!("{kind}({bucket})"),
            None => kind.to_string(),
        };
    }
    match bare_bucket(action) {
        Some(bucket) => format!("{kind}({bucket})"),
        None => kind.to_string(),
    }
}

/// Coarse location of a URL: one of the chat buckets, or the host.
fn url_bucket(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let path = parsed.path();

    if path.contains("/channel/") {
        return Some("channel".to_string());
    }
    if path.contains("/direct/") {
        return Some("direct".to_string());
    }
    if path.contains("/directory/") {
        return Some("directory".to_string());
    }
    if path.starts_with("/home") {
        return Some("home".to_string());
    }

    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn normalize_file(kind: ActionKind, action: &str) -> String {
    if let Some(path) = action_arg(action, "path") {
        return format!("{kind}({})", file_bucket(path));
    }
    match bare_bucket(action) {
        Some(bucket) => format!("{kind}({bucket})"),
        None => kind.to_string(),
    }
}

fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

fn file_bucket(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("/workspace/") {
        return format!("workspace/{}", file_name(rest));
    }
    if let Some(rest) = path.strip_prefix("/Documents/") {
        let first = rest.split('/').find(|s| !s.is_empty()).unwrap_or(rest);
        return format!("Documents/{first}");
    }
    if let Some(rest) = path.strip_prefix("/instruction/") {
        return format!("instruction/{}", file_name(rest));
    }
    file_name(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("execute_bash(command='ls -la')", "execute_bash")]
    #[case("execute_bash(command='cd /workspace && make')", "execute_bash")]
    #[case("finish()", "finish")]
    #[case("Finish()", "finish")]
    #[case("GOTO_URL(url='http://h/home')", "goto_url(home)")]
    #[case(
        "send_message(recipient='Emily Zhou', content='Hello Emily, are you free?')",
        "send_message(recipient='Emily Zhou')"
    )]
    #[case("send_message(content='Hi @active_users')", "send_message(channel)")]
    #[case("send_message(hello there)", "send_message(channel)")]
    #[case("send_message(channel)", "send_message(channel)")]
    #[case(
        "goto_url(url='http://the-agent-company.com:3000/home')",
        "goto_url(home)"
    )]
    #[case(
        "goto_url(url='http://the-agent-company.com:3000/channel/general?x=1')",
        "goto_url(channel)"
    )]
    #[case(
        "goto_url(url='http://the-agent-company.com:3000/direct/abc')",
        "goto_url(direct)"
    )]
    #[case(
        "goto_url(url='http://the-agent-company.com:3000/directory/users')",
        "goto_url(directory)"
    )]
    #[case(
        "goto_url(url='http://the-agent-company.com:8092/')",
        "goto_url(the-agent-company.com:8092)"
    )]
    #[case("goto_url(url='not a url')", "goto_url")]
    #[case(
        "write_file(path='/workspace/janusgraph/conclusion.txt')",
        "write_file(workspace/conclusion.txt)"
    )]
    #[case(
        "read_file(path='/Documents/Research/Noise Simulation/paper.pdf')",
        "read_file(Documents/Research)"
    )]
    #[case(
        "write_file(path='/Documents/job_description.md')",
        "write_file(Documents/job_description.md)"
    )]
    #[case("read_file(path='/instruction/task.md')", "read_file(instruction/task.md)")]
    #[case("read_file(path='/tmp/scratch/notes.txt')", "read_file(notes.txt)")]
    #[case("  Teleport(To='Mars')  ", "teleport(to='mars')")]
    fn test_normalize_action(#[case] action: &str, #[case] expected: &str) {
        assert_eq!(normalize_action(action), expected);
    }

    #[test]
    fn test_bash_commands_collapse() {
        assert_eq!(
            normalize_action("execute_bash(command='git clone x')"),
            normalize_action("execute_bash(command='python run.py')")
        );
    }

    #[test]
    fn test_recipients_stay_distinct() {
        assert_ne!(
            normalize_action("send_message(recipient='Zhang Wei', content='...')"),
            normalize_action("send_message(recipient='Li Ming', content='...')")
        );
    }

    #[rstest]
    #[case("execute_bash(command='ls')")]
    #[case("finish()")]
    #[case("send_message(recipient='Liu Qiang', content='...')")]
    #[case("send_message(content='hi all')")]
    #[case("goto_url(url='http://the-agent-company.com:3000/home')")]
    #[case("goto_url(url='http://the-agent-company.com:8092/')")]
    #[case("goto_url(url='garbage')")]
    #[case("read_file(path='/Documents/Financials/receipt.jpg')")]
    #[case("write_file(path='/workspace/link.txt')")]
    #[case("read_file(path='/etc/hosts')")]
    #[case("Mystery Action")]
    #[case("Finish()")]
    #[case("GOTO_URL(url='http://h/home')")]
    #[case("Execute_Bash(command='ls')")]
    #[case("send_message(hello there)")]
    fn test_normalization_is_idempotent(#[case] action: &str) {
        let once = normalize_action(action);
        assert_eq!(normalize_action(&once), once);
    }
}
