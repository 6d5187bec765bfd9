//! Staff commands issued as text inside a ticket channel.

use thiserror::Error;

/// A parsed staff command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffCommand {
    /// `reply <text>` / `r <text>`: deliver `text` to the ticket's user.
    Reply { text: String },
    /// `close` / `c`: close the ticket and delete its channel.
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("usage: {prefix}reply <message>")]
    MissingReplyText { prefix: String },
}

impl StaffCommand {
    /// Parses `content` as a staff command.
    ///
    /// Returns `None` when the text is not addressed to us: no prefix, or a
    /// verb we don't know. Verbs are case-insensitive; reply text is kept
    /// verbatim apart from the whitespace separating it from the verb.
    pub fn parse(content: &str, prefix: &str) -> Option<Result<Self, CommandParseError>> {
        let rest = content.strip_prefix(prefix)?;
        let (verb, args) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim_start()),
            None => (rest, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "reply" | "r" => {
                if args.trim().is_empty() {
                    Some(Err(CommandParseError::MissingReplyText {
                        prefix: prefix.to_string(),
                    }))
                } else {
                    Some(Ok(StaffCommand::Reply {
                        text: args.to_string(),
                    }))
                }
            }
            "close" | "c" => Some(Ok(StaffCommand::Close)),
            _ => None,
        }
    }

    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            StaffCommand::Reply { .. } => "reply",
            StaffCommand::Close => "close",
        }
    }
}
