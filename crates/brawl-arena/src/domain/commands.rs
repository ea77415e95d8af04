//! Chat command parsing.

use std::sync::LazyLock;

use brawl_core::event::Side;
use regex::Regex;

static NEW_MATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^game\s+(.+?)\s+vs\.?\s+(.+)$").expect("new-match pattern is valid")
});

/// What a single chat line asks the arena to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Store `text` as the sender's latest submission for `side`.
    Submit {
        /// Target side.
        side: Side,
        /// Submission body with the prefix removed.
        text: String,
    },
    /// A side prefix with nothing after it.
    Usage {
        /// Side the sender tried to address.
        side: Side,
    },
    /// Start a new match between the two named fighters.
    NewMatch {
        /// Side 1 name.
        p1: String,
        /// Side 2 name.
        p2: String,
    },
    /// Say `text` aloud through the speech service.
    Speak {
        /// Text to speak.
        text: String,
    },
    /// Turn chat-triggered speech back off.
    StopSpeak,
    /// Plain chat.
    Ignored,
}

impl ChatCommand {
    /// Parses one chat line from `identity`.
    ///
    /// Side submissions use `!p1 <text>` or `P1: <text>` (prefix case
    /// insensitive). `game <a> vs <b>` starts a match, but only when sent by
    /// `admin`. `!speak <text>` asks for speech and `!!speak` turns it off;
    /// whether a speak request is honoured is up to the caller.
    #[must_use]
    pub fn parse(identity: &str, text: &str, admin: &str) -> Self {
        let text = text.trim();

        if is_admin(identity, admin) {
            if let Some(captures) = NEW_MATCH.captures(text) {
                let p1 = captures[1].trim();
                let p2 = captures[2].trim();
                if !p1.is_empty() && !p2.is_empty() {
                    return ChatCommand::NewMatch {
                        p1: p1.to_owned(),
                        p2: p2.to_owned(),
                    };
                }
            }
        }

        if text.eq_ignore_ascii_case("!!speak") {
            return ChatCommand::StopSpeak;
        }
        if let Some(body) = strip_command(text, "!speak") {
            let body = body.trim();
            return if body.is_empty() {
                ChatCommand::Ignored
            } else {
                ChatCommand::Speak {
                    text: body.to_owned(),
                }
            };
        }

        for side in Side::BOTH {
            if let Some(body) = strip_side_prefix(text, side) {
                let body = body.trim();
                return if body.is_empty() {
                    ChatCommand::Usage { side }
                } else {
                    ChatCommand::Submit {
                        side,
                        text: body.to_owned(),
                    }
                };
            }
        }

        ChatCommand::Ignored
    }
}

/// Whether `identity` is the chat admin. Case and surrounding whitespace are
/// ignored.
#[must_use]
pub fn is_admin(identity: &str, admin: &str) -> bool {
    identity.trim().eq_ignore_ascii_case(admin.trim())
}

/// Strips a `!command` that ends at a word boundary.
fn strip_command<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let head = text.get(..command.len())?;
    if !head.eq_ignore_ascii_case(command) {
        return None;
    }
    let rest = &text[command.len()..];
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

fn strip_side_prefix(text: &str, side: Side) -> Option<&str> {
    let tag = side.as_str();

    if let Some(rest) = strip_command(text, &format!("!{tag}")) {
        return Some(rest);
    }

    let colon = format!("{tag}:");
    match text.get(..colon.len()) {
        Some(head) if head.eq_ignore_ascii_case(&colon) => Some(&text[colon.len()..]),
        _ => None,
    }
}
