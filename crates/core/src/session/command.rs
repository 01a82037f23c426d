//! Line-oriented command scripts for the session.
//!
//! One command per line, arguments separated by whitespace:
//! - `draw <name> <offense> <defense>`
//! - `battle <offense> <defense>`
//! - `steal <offense> <defense>`
//! - `count`
//! - `winner`
//!
//! Blank lines and lines starting with `#` are skipped.

use std::error::Error;
use std::fmt;
use std::str::SplitWhitespace;

const VERBS: [&str; 5] = ["draw", "battle", "steal", "count", "winner"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Draw { name: String, offense: i32, defense: i32 },
    Battle { offense: i32, defense: i32 },
    Steal { offense: i32, defense: i32 },
    Count,
    Winner,
}

/// Why a script line could not be turned into a [`Command`]. Lines are 1-indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandParseError {
    UnknownCommand { line: usize, word: String },
    MissingArgument { line: usize, command: &'static str, argument: &'static str },
    InvalidNumber { line: usize, argument: &'static str, token: String },
    UnexpectedToken { line: usize, token: String },
}

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand { line, word } => {
                write!(f, "line {line}: unknown command `{word}`")
            }
            Self::MissingArgument { line, command, argument } => {
                write!(f, "line {line}: `{command}` is missing its {argument}")
            }
            Self::InvalidNumber { line, argument, token } => {
                write!(f, "line {line}: {argument} `{token}` is not an integer")
            }
            Self::UnexpectedToken { line, token } => {
                write!(f, "line {line}: unexpected trailing `{token}`")
            }
        }
    }
}

impl Error for CommandParseError {}

struct Arguments<'a> {
    words: SplitWhitespace<'a>,
    line: usize,
    command: &'static str,
}

impl<'a> Arguments<'a> {
    fn text(&mut self, argument: &'static str) -> Result<&'a str, CommandParseError> {
        self.words.next().ok_or(CommandParseError::MissingArgument {
            line: self.line,
            command: self.command,
            argument,
        })
    }

    fn number(&mut self, argument: &'static str) -> Result<i32, CommandParseError> {
        let token = self.text(argument)?;
        token.parse().map_err(|_| CommandParseError::InvalidNumber {
            line: self.line,
            argument,
            token: token.to_string(),
        })
    }

    fn finish(mut self) -> Result<(), CommandParseError> {
        match self.words.next() {
            Some(token) => Err(CommandParseError::UnexpectedToken {
                line: self.line,
                token: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Command {
    /// Parses one script line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Self>, CommandParseError> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        if word.starts_with('#') {
            return Ok(None);
        }

        let Some(command) = VERBS.into_iter().find(|verb| word.eq_ignore_ascii_case(verb)) else {
            return Err(CommandParseError::UnknownCommand {
                line: line_number,
                word: word.to_string(),
            });
        };
        let mut args = Arguments { words, line: line_number, command };

        let parsed = match command {
            "draw" => Command::Draw {
                name: args.text("name")?.to_string(),
                offense: args.number("offense")?,
                defense: args.number("defense")?,
            },
            "battle" => Command::Battle {
                offense: args.number("offense")?,
                defense: args.number("defense")?,
            },
            "steal" => Command::Steal {
                offense: args.number("offense")?,
                defense: args.number("defense")?,
            },
            "count" => Command::Count,
            _ => Command::Winner,
        };
        args.finish()?;
        Ok(Some(parsed))
    }
}

/// Parses a whole script, stopping at the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<Command>, CommandParseError> {
    let mut commands = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(command) = Command::parse_line(line, index + 1)? {
            commands.push(command);
        }
    }
    Ok(commands)
}
