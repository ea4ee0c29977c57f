//! Parsing of console input lines into commands.
//!
//! Commands mirror the chat bot's: `create 2v2 8 Cup | Arena`, `register`,
//! `invite 42 bob`, `winner Bot3` and so on.

use bracket_engine::tournament::{EntrantId, Format, TournamentMetadata};
use std::fmt;

/// Title used when `create` gets none
pub const DEFAULT_TITLE: &str = "Tournament";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    /// Switch the member issuing the following commands
    Act {
        member: u64,
        name: String,
    },
    Create {
        format: Format,
        metadata: TournamentMetadata,
    },
    Register,
    Unregister,
    Invite {
        invitee: EntrantId,
        name: Option<String>,
    },
    Accept,
    Reject,
    Leave,
    /// Add fillers; `None` tops the roster up to capacity
    Fill(Option<usize>),
    Start,
    Winner(EntrantId),
    Cancel,
    Show,
    Points(Option<u64>),
    Top,
    Decorate {
        member: u64,
        emoji: String,
    },
    Save,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command is missing a required argument.
    MissingArgument { usage: &'static str },
    /// Argument should have been a number.
    InvalidNumber(String),
    /// Argument isn't a member id or a bot name.
    InvalidEntrant(String),
    /// Mode/capacity pair was rejected.
    InvalidFormat(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument { usage } => write!(f, "Missing argument. Usage: '{}'", usage),
            Self::InvalidNumber(value) => write!(f, "Invalid number '{}'", value),
            Self::InvalidEntrant(value) => write!(
                f,
                "Invalid player '{}'. Use a member id (e.g., '42') or a bot name (e.g., 'Bot3')",
                value
            ),
            Self::InvalidFormat(reason) => write!(f, "{}", reason),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into a ConsoleCommand.
///
/// # Arguments
///
/// * `input` - The raw command line
///
/// # Returns
///
/// * `Ok(ConsoleCommand)` - Successfully parsed command
/// * `Err(ParseError)` - Parse error with descriptive message
pub fn parse_command(input: &str) -> Result<ConsoleCommand, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "help" => return Ok(ConsoleCommand::Help),
        "register" => return Ok(ConsoleCommand::Register),
        "unregister" => return Ok(ConsoleCommand::Unregister),
        "accept" => return Ok(ConsoleCommand::Accept),
        "reject" => return Ok(ConsoleCommand::Reject),
        "leave" => return Ok(ConsoleCommand::Leave),
        "start" => return Ok(ConsoleCommand::Start),
        "cancel" => return Ok(ConsoleCommand::Cancel),
        "show" => return Ok(ConsoleCommand::Show),
        "top" => return Ok(ConsoleCommand::Top),
        "save" => return Ok(ConsoleCommand::Save),
        "quit" | "exit" => return Ok(ConsoleCommand::Quit),
        _ => {}
    }

    // Parse multi-word commands
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"as") => parse_act_command(&parts),
        Some(&"create") => parse_create_command(&parts),
        Some(&"invite") => parse_invite_command(&parts),
        Some(&"fill") => match parts.get(1) {
            Some(count) => Ok(ConsoleCommand::Fill(Some(parse_number(count)?))),
            None => Ok(ConsoleCommand::Fill(None)),
        },
        Some(&"winner") => match parts.get(1) {
            Some(entrant) => Ok(ConsoleCommand::Winner(parse_entrant(entrant)?)),
            None => Err(ParseError::MissingArgument {
                usage: "winner <member id | BotN>",
            }),
        },
        Some(&"points") => match parts.get(1) {
            Some(member) => Ok(ConsoleCommand::Points(Some(parse_number(member)?))),
            None => Ok(ConsoleCommand::Points(None)),
        },
        Some(&"decorate") => match (parts.get(1), parts.get(2)) {
            (Some(member), Some(emoji)) => Ok(ConsoleCommand::Decorate {
                member: parse_number(member)?,
                emoji: emoji.to_string(),
            }),
            _ => Err(ParseError::MissingArgument {
                usage: "decorate <member id> <emoji>",
            }),
        },
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse "as <member id> <name...>"
fn parse_act_command(parts: &[&str]) -> Result<ConsoleCommand, ParseError> {
    match (parts.get(1), parts.get(2..)) {
        (Some(member), Some(name)) if !name.is_empty() => Ok(ConsoleCommand::Act {
            member: parse_number(member)?,
            name: name.join(" "),
        }),
        _ => Err(ParseError::MissingArgument {
            usage: "as <member id> <name>",
        }),
    }
}

/// Parse "create <mode> <capacity> [title | map | abilities | prize]"
fn parse_create_command(parts: &[&str]) -> Result<ConsoleCommand, ParseError> {
    let (Some(mode), Some(capacity)) = (parts.get(1), parts.get(2)) else {
        return Err(ParseError::MissingArgument {
            usage: "create <1v1|2v2> <capacity> [title | map | abilities | prize]",
        });
    };

    let format = format!("{mode} {capacity}")
        .parse::<Format>()
        .map_err(|e| ParseError::InvalidFormat(e.to_string()))?;

    let details = parts.get(3..).unwrap_or_default().join(" ");
    let mut fields = details.split('|').map(|field| field.trim().to_string());
    let title = fields
        .next()
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let metadata = TournamentMetadata {
        title,
        map: fields.next().unwrap_or_default(),
        abilities: fields.next().unwrap_or_default(),
        prize: fields.next().unwrap_or_default(),
    };

    Ok(ConsoleCommand::Create { format, metadata })
}

/// Parse "invite <member id> [name...]" or "invite BotN"
fn parse_invite_command(parts: &[&str]) -> Result<ConsoleCommand, ParseError> {
    let Some(invitee) = parts.get(1) else {
        return Err(ParseError::MissingArgument {
            usage: "invite <member id> [name]",
        });
    };

    let name = parts
        .get(2..)
        .filter(|name| !name.is_empty())
        .map(|name| name.join(" "));

    Ok(ConsoleCommand::Invite {
        invitee: parse_entrant(invitee)?,
        name,
    })
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::InvalidNumber(value.to_string()))
}

/// A member id (`"42"`) or a filler name (`"Bot3"`, case-insensitive)
fn parse_entrant(value: &str) -> Result<EntrantId, ParseError> {
    if let Ok(member) = value.parse::<u64>() {
        return Ok(EntrantId::Member(member));
    }

    value
        .to_lowercase()
        .strip_prefix("bot")
        .and_then(|ordinal| ordinal.parse::<u32>().ok())
        .filter(|ordinal| *ordinal > 0)
        .map(EntrantId::Filler)
        .ok_or_else(|| ParseError::InvalidEntrant(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_engine::tournament::Mode;

    // === Single-word command tests ===

    #[test]
    fn test_parse_single_words() {
        assert_eq!(parse_command("register"), Ok(ConsoleCommand::Register));
        assert_eq!(parse_command("  start  "), Ok(ConsoleCommand::Start));
        assert_eq!(parse_command("exit"), Ok(ConsoleCommand::Quit));
        assert_eq!(parse_command("fill"), Ok(ConsoleCommand::Fill(None)));
        assert_eq!(parse_command("points"), Ok(ConsoleCommand::Points(None)));
    }

    // === Multi-word command tests ===

    #[test]
    fn test_parse_act() {
        assert_eq!(
            parse_command("as 42 Big Alice"),
            Ok(ConsoleCommand::Act {
                member: 42,
                name: "Big Alice".to_string()
            })
        );
        assert!(matches!(
            parse_command("as 42"),
            Err(ParseError::MissingArgument { .. })
        ));
        assert_eq!(
            parse_command("as abc alice"),
            Err(ParseError::InvalidNumber("abc".to_string()))
        );
    }

    #[test]
    fn test_parse_create_with_details() {
        let Ok(ConsoleCommand::Create { format, metadata }) =
            parse_command("create 2v2 8 Friday Cup | Arena | No ults | Nitro")
        else {
            panic!("expected create");
        };
        assert_eq!(format.mode, Mode::Duo);
        assert_eq!(format.capacity.get(), 8);
        assert_eq!(metadata.title, "Friday Cup");
        assert_eq!(metadata.map, "Arena");
        assert_eq!(metadata.abilities, "No ults");
        assert_eq!(metadata.prize, "Nitro");
    }

    #[test]
    fn test_parse_create_defaults_title() {
        let Ok(ConsoleCommand::Create { metadata, .. }) = parse_command("create 1v1 4") else {
            panic!("expected create");
        };
        assert_eq!(metadata.title, DEFAULT_TITLE);
        assert!(metadata.map.is_empty());
    }

    #[test]
    fn test_parse_create_rejects_bad_format() {
        assert!(matches!(
            parse_command("create 1v1 6"),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_command("create 2v2 2"),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_command("create"),
            Err(ParseError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_winner() {
        assert_eq!(
            parse_command("winner 7"),
            Ok(ConsoleCommand::Winner(EntrantId::Member(7)))
        );
        assert_eq!(
            parse_command("winner Bot3"),
            Ok(ConsoleCommand::Winner(EntrantId::Filler(3)))
        );
        assert_eq!(
            parse_command("winner bot0"),
            Err(ParseError::InvalidEntrant("bot0".to_string()))
        );
        assert!(matches!(
            parse_command("winner"),
            Err(ParseError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_invite() {
        assert_eq!(
            parse_command("invite 9 Bob"),
            Ok(ConsoleCommand::Invite {
                invitee: EntrantId::Member(9),
                name: Some("Bob".to_string())
            })
        );
        assert_eq!(
            parse_command("invite bot1"),
            Ok(ConsoleCommand::Invite {
                invitee: EntrantId::Filler(1),
                name: None
            })
        );
    }

    #[test]
    fn test_parse_fill_and_decorate() {
        assert_eq!(parse_command("fill 3"), Ok(ConsoleCommand::Fill(Some(3))));
        assert_eq!(
            parse_command("fill many"),
            Err(ParseError::InvalidNumber("many".to_string()))
        );
        assert_eq!(
            parse_command("decorate 5 🔥"),
            Ok(ConsoleCommand::Decorate {
                member: 5,
                emoji: "🔥".to_string()
            })
        );
    }

    #[test]
    fn test_unrecognized_command() {
        let err = parse_command("dance").unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedCommand("dance".to_string()));
        assert!(err.to_string().contains("help"));
    }
}
