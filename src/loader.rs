//! This module provides the `TapeLoader` struct, responsible for turning tape source text into
//! a [`Tape`], either from a file or from an in-memory string.
//!
//! The source format is line based. Lines starting with `#` are comments. Every other line is
//! split into tokens and the tokens of all lines are concatenated, in order, after the `$`
//! sentinel.

use crate::tape::Tape;
use crate::types::MachineError;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Marks a comment line in tape source.
const COMMENT_PREFIX: char = '#';

/// How a source line is split into tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Delimiter {
    /// Any run of whitespace separates tokens.
    #[default]
    Whitespace,
    /// A fixed separator. Tokens are trimmed and empty ones dropped.
    Token(String),
}

impl Delimiter {
    fn split<'a>(&'a self, line: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self {
            Delimiter::Whitespace => Box::new(line.split_whitespace()),
            Delimiter::Token(separator) => Box::new(
                line.split(separator.as_str())
                    .map(str::trim)
                    .filter(|token| !token.is_empty()),
            ),
        }
    }
}

impl FromStr for Delimiter {
    type Err = MachineError;

    /// A single space (or any whitespace-only string) selects [`Delimiter::Whitespace`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(MachineError::InvalidConfig(
                "the tape delimiter must not be empty".to_string(),
            ));
        }

        if s.trim().is_empty() {
            Ok(Delimiter::Whitespace)
        } else {
            Ok(Delimiter::Token(s.to_string()))
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Whitespace => write!(f, "whitespace"),
            Delimiter::Token(separator) => write!(f, "{:?}", separator),
        }
    }
}

/// `TapeLoader` is a utility struct for loading tapes.
pub struct TapeLoader;

impl TapeLoader {
    /// Loads a tape from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Tape)` if the file is readable.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    ///
    /// The layout of the tape is not checked here; that happens when the machine initializes.
    pub fn load_tape(path: &Path, delimiter: &Delimiter) -> Result<Tape, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(Self::load_tape_from_string(&content, delimiter))
    }

    /// Builds a tape from source text already in memory, e.g. piped through stdin.
    pub fn load_tape_from_string(content: &str, delimiter: &Delimiter) -> Tape {
        let tokens = content
            .lines()
            .filter(|line| !line.starts_with(COMMENT_PREFIX))
            .flat_map(|line| delimiter.split(line))
            .map(str::to_string)
            .collect::<Vec<_>>();

        Tape::from_tokens(tokens)
    }

    /// Returns the first comment line of the source, without the `#`, as the tape's title.
    pub fn title(content: &str) -> Option<&str> {
        content
            .lines()
            .find_map(|line| line.strip_prefix(COMMENT_PREFIX))
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }
}
