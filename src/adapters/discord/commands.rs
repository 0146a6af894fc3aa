//! Prefix command parsing (`?upload some text`, `?instructions`).

/// A recognized bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rest of the message after the command word, if any.
    Upload { text: Option<String> },
    Instructions,
    Unknown(String),
}

/// Parse `content` as a prefixed command. Returns None for ordinary messages.
///
/// The upload text is the remainder of the message as typed (quotes included), matching
/// a keyword-only rest argument.
pub fn parse_command(prefix: &str, content: &str) -> Option<Command> {
    if prefix.is_empty() {
        return None;
    }
    let rest = content.trim_start().strip_prefix(prefix)?;
    let rest = rest.trim_start();
    let (name, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };
    if name.is_empty() {
        return None;
    }

    let command = match name {
        "upload" => Command::Upload {
            text: (!args.is_empty()).then(|| args.to_string()),
        },
        "instructions" => Command::Instructions,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}
