//! Parsing of free-form terminal commands.
//!
//! Parsing never fails. Input that is not a keyword, a number, or a
//! `CALL ME <NAME>` is read as a choice id, and the route echoes
//! [`UNKNOWN_COMMAND`] for anything that does not match what is on offer.

/// Shown for input that matches nothing on offer.
pub const UNKNOWN_COMMAND: &str = "Unknown command. Type HELP for commands.";

/// Lines printed by `HELP`.
pub const HELP_LINES: [&str; 7] = [
    "Available commands:",
    "  <number>       take the numbered choice",
    "  <choice id>    take a choice by its id",
    "  LOOK           describe where you are again",
    "  THEMES         show the themes of this moment",
    "  CALL ME <NAME> begin again as another character",
    "  RESTART        begin again from the first page",
];

/// Heading printed above the theme list by `THEMES`.
pub const THEMES_HEADING: &str = "Active themes in your version of Moby Dick:";

/// A parsed terminal command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Take the n-th offered choice, counting from 1.
    Numbered(usize),
    /// Take the choice with this id, if it is on offer.
    Choice(String),
    /// Re-render the current plot point.
    Look,
    /// Print the command list.
    Help,
    /// List the current plot point's themes.
    Themes,
    /// Restart as the current character.
    Restart,
    /// Restart as the named character.
    CallMe(String),
    /// Blank input, or `CALL ME` with no name.
    Unknown,
}

impl GameCommand {
    /// Parses `input`. Anything that is not a keyword or a number is taken as
    /// a choice id; whether it is on offer is decided by the caller.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Unknown;
        }
        if let Some(name) = call_me_name(trimmed) {
            return if name.is_empty() {
                Self::Unknown
            } else {
                Self::CallMe(name.to_owned())
            };
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "LOOK" => Self::Look,
            "HELP" => Self::Help,
            "THEMES" => Self::Themes,
            "RESTART" => Self::Restart,
            _ => match trimmed.parse::<usize>() {
                Ok(n) => Self::Numbered(n),
                Err(_) => Self::Choice(trimmed.to_ascii_lowercase()),
            },
        }
    }
}

// `CALL` and `ME` must be whole words; the name is whatever follows.
fn call_me_name(input: &str) -> Option<&str> {
    let (call, rest) = input.split_once(char::is_whitespace)?;
    if !call.eq_ignore_ascii_case("CALL") {
        return None;
    }
    let rest = rest.trim_start();
    let (me, name) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    me.eq_ignore_ascii_case("ME").then_some(name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_ignore_case_and_padding() {
        assert_eq!(GameCommand::parse(" look "), GameCommand::Look);
        assert_eq!(GameCommand::parse("Help"), GameCommand::Help);
        assert_eq!(GameCommand::parse("themes"), GameCommand::Themes);
        assert_eq!(GameCommand::parse("RESTART"), GameCommand::Restart);
    }

    #[test]
    fn test_numbers_select_by_position() {
        assert_eq!(GameCommand::parse("3"), GameCommand::Numbered(3));
    }

    #[test]
    fn test_call_me_keeps_the_name_as_typed() {
        assert_eq!(
            GameCommand::parse("call   me Queequeg"),
            GameCommand::CallMe("Queequeg".to_owned())
        );
        assert_eq!(
            GameCommand::parse("CALL ME Moby Dick"),
            GameCommand::CallMe("Moby Dick".to_owned())
        );
    }

    #[test]
    fn test_call_me_without_name_is_unknown() {
        assert_eq!(GameCommand::parse("CALL ME  "), GameCommand::Unknown);
        assert_eq!(GameCommand::parse("call me"), GameCommand::Unknown);
    }

    #[test]
    fn test_call_me_needs_whole_words() {
        assert_eq!(
            GameCommand::parse("call meahab"),
            GameCommand::Choice("call meahab".to_owned())
        );
        assert_eq!(
            GameCommand::parse("CALL MEDIC"),
            GameCommand::Choice("call medic".to_owned())
        );
        assert_eq!(
            GameCommand::parse("callme ahab"),
            GameCommand::Choice("callme ahab".to_owned())
        );
    }

    #[test]
    fn test_other_text_is_a_choice_id() {
        assert_eq!(
            GameCommand::parse("Stay-Ashore"),
            GameCommand::Choice("stay-ashore".to_owned())
        );
    }

    #[test]
    fn test_blank_input_is_unknown() {
        assert_eq!(GameCommand::parse("   "), GameCommand::Unknown);
        assert_eq!(GameCommand::parse(""), GameCommand::Unknown);
    }
}
