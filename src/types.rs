//! This module defines the core data structures and types shared by the tape, the rule table codec,
//! the execution engine and the runner: symbols, head movement, step outcomes, snapshots and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single tape cell. Symbols are arbitrary tokens without embedded whitespace.
pub type Symbol = String;

/// The delimiter that opens the tape and closes the rule table.
pub const SECTION_DELIMITER: &str = "$";
/// The control state every machine starts in.
pub const INITIAL_STATE: &str = "0";
/// Number of cells occupied by one rule: state, read, action, write, next state.
pub const RULE_WIDTH: usize = 5;
/// Action token that moves the head one cell to the left.
pub const MOVE_LEFT: &str = "L";
/// Action token that moves the head one cell to the right.
pub const MOVE_RIGHT: &str = "R";

/// Process exit status for a machine that ran off the tape.
pub const EXIT_OK: i32 = 0;
/// Process exit status for a fatal machine error or unusable input.
pub const EXIT_ERROR: i32 = 1;

/// Represents the possible directions the head can move after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Interprets the action column of a rule. `L` and `R` move the head, every other token
    /// leaves it where it is.
    pub fn from_action(action: &str) -> Self {
        match action {
            MOVE_LEFT => Direction::Left,
            MOVE_RIGHT => Direction::Right,
            _ => Direction::Stay,
        }
    }

    /// The signed head displacement for this direction.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

/// The `(state, symbol)` pair the engine searches the rule table for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub state: String,
    pub symbol: Symbol,
}

/// The right-hand side of a matched rule, ready to be applied to the tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Where the head moves after writing.
    pub direction: Direction,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The control state after the transition.
    pub next_state: String,
}

/// Represents the outcome of a single engine step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a transition and can keep going.
    Continue,
    /// The machine reached a terminal state.
    Halt(Halt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// The head left the tape. This is the normal way a machine finishes.
    Ok,

    Err(MachineError),
}

impl Halt {
    /// The process exit status a binary should report for this halt.
    pub fn exit_code(&self) -> i32 {
        match self {
            Halt::Ok => EXIT_OK,
            Halt::Err(_) => EXIT_ERROR,
        }
    }
}

/// A read-only view of the machine handed to observers after initialization and after each step.
///
/// The snapshot borrows the whole tape; choosing which cells to show is up to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot<'a> {
    /// Current head index. May be negative or past the end once the machine has halted.
    pub head: isize,
    /// Current control state.
    pub state: &'a str,
    /// Number of transitions performed so far.
    pub step: usize,
    /// The full tape, rule table included.
    pub tape: &'a [Symbol],
}

/// Represents the errors that can occur while loading, initializing or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The tape does not follow the `$ rules $ data` layout.
    #[error("Malformed tape: {0}")]
    MalformedTape(String),
    /// No rule in the table matches the current state and the symbol under the head.
    #[error("Transition rule not found for state {state} and symbol {symbol}")]
    RuleNotFound { state: String, symbol: Symbol },
    /// A tape cell outside `[0, len)` was accessed.
    #[error("Tape index {index} is out of bounds (tape has {len} cells)")]
    OutOfBounds { index: isize, len: usize },
    /// The tape source could not be read.
    #[error("File error: {0}")]
    FileError(String),
    /// A runner or loader option has an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_action() {
        assert_eq!(Direction::from_action("L"), Direction::Left);
        assert_eq!(Direction::from_action("R"), Direction::Right);
        assert_eq!(Direction::from_action("N"), Direction::Stay);
        assert_eq!(Direction::from_action("l"), Direction::Stay);
        assert_eq!(Direction::from_action("-"), Direction::Stay);
    }

    #[test]
    fn test_direction_offset() {
        assert_eq!(Direction::Left.offset(), -1);
        assert_eq!(Direction::Right.offset(), 1);
        assert_eq!(Direction::Stay.offset(), 0);
    }

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(json, "\"Left\"");

        let back: Direction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Direction::Left);
    }

    #[test]
    fn test_halt_exit_codes() {
        assert_eq!(Halt::Ok.exit_code(), 0);

        let err = Halt::Err(MachineError::RuleNotFound {
            state: "0".to_string(),
            symbol: "x".to_string(),
        });
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let error = MachineError::RuleNotFound {
            state: "q1".to_string(),
            symbol: "_".to_string(),
        };

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("state q1"));
        assert!(error_msg.contains("symbol _"));
    }

    #[test]
    fn test_snapshot_serialization() {
        let tape = vec!["$".to_string(), "$".to_string(), "1".to_string()];
        let snapshot = Snapshot {
            head: 2,
            state: "0",
            step: 0,
            tape: &tape,
        };

        let value = serde_json::to_value(snapshot).unwrap();
        assert_eq!(value["head"], 2);
        assert_eq!(value["state"], "0");
        assert_eq!(value["tape"][2], "1");
    }
}
