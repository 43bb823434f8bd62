//! This module knows how a rule table is laid out on the tape.
//!
//! A tape looks like `$ rules... $ data...`. The rule region is a sequence of five-cell entries
//! `state read action write next_state`, searched in table order. The module also provides the
//! inverse direction: building a tape from a rule list and initial data.

use crate::tape::Tape;
use crate::types::{Direction, MachineError, Symbol, Transition, RULE_WIDTH, SECTION_DELIMITER};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// An owned transition rule, used when building tapes or listing a decoded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub state: String,
    pub read: Symbol,
    pub action: Symbol,
    pub write: Symbol,
    pub next_state: String,
}

impl Rule {
    pub fn new(state: &str, read: &str, action: &str, write: &str, next_state: &str) -> Self {
        Self {
            state: state.to_string(),
            read: read.to_string(),
            action: action.to_string(),
            write: write.to_string(),
            next_state: next_state.to_string(),
        }
    }

    fn cells(&self) -> [&str; RULE_WIDTH] {
        [
            &self.state,
            &self.read,
            &self.action,
            &self.write,
            &self.next_state,
        ]
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cells().join(" "))
    }
}

/// A rule as it sits on the tape, borrowed without copying its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    index: usize,
    cells: &'a [Symbol],
}

impl<'a> Entry<'a> {
    /// Tape index of the entry's first cell.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> &'a str {
        &self.cells[0]
    }

    pub fn read(&self) -> &'a str {
        &self.cells[1]
    }

    pub fn action(&self) -> &'a str {
        &self.cells[2]
    }

    pub fn write(&self) -> &'a str {
        &self.cells[3]
    }

    pub fn next_state(&self) -> &'a str {
        &self.cells[4]
    }

    /// The right-hand side of this rule.
    pub fn transition(&self) -> Transition {
        Transition {
            direction: Direction::from_action(self.action()),
            write: self.write().to_string(),
            next_state: self.next_state().to_string(),
        }
    }

    pub fn to_rule(&self) -> Rule {
        Rule::new(
            self.state(),
            self.read(),
            self.action(),
            self.write(),
            self.next_state(),
        )
    }
}

/// Iterator over consecutive rule entries, see [`entries_from`].
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    cells: &'a [Symbol],
    position: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cells = self.cells.get(self.position..self.position + RULE_WIDTH)?;
        // A delimiter anywhere in the next five cells ends the table.
        if cells.iter().any(|cell| cell == SECTION_DELIMITER) {
            return None;
        }

        let entry = Entry {
            index: self.position,
            cells,
        };
        self.position += RULE_WIDTH;
        Some(entry)
    }
}

/// Returns the index right after the opening `$` sentinel, which is always 1.
pub fn find_rule_table_start(tape: &Tape) -> Result<usize, MachineError> {
    match tape.get(0) {
        Ok(SECTION_DELIMITER) => Ok(1),
        Ok(symbol) => Err(MachineError::MalformedTape(format!(
            "expected '{}' at index 0, found '{}'",
            SECTION_DELIMITER, symbol
        ))),
        Err(_) => Err(MachineError::MalformedTape("tape is empty".to_string())),
    }
}

/// Returns the index right after the `$` that closes the rule table.
pub fn find_data_start(tape: &Tape) -> Result<usize, MachineError> {
    let start = find_rule_table_start(tape)?;

    tape.cells()[start..]
        .iter()
        .position(|cell| cell == SECTION_DELIMITER)
        .map(|offset| start + offset + 1)
        .ok_or_else(|| {
            MachineError::MalformedTape(format!(
                "the rule table is not closed by a second '{}'",
                SECTION_DELIMITER
            ))
        })
}

/// Enumerates the entries starting at `start`, stopping at the next `$`.
pub fn entries_from(tape: &Tape, start: usize) -> Entries<'_> {
    Entries {
        cells: tape.cells(),
        position: start,
    }
}

/// The located rule table: the cells strictly between the two delimiters.
///
/// The delimiters never move while a machine runs, so the boundaries are computed once and
/// reused for every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTable {
    start: usize,
    end: usize,
}

impl RuleTable {
    /// Finds the rule table of `tape` and checks that it holds whole entries only.
    pub fn locate(tape: &Tape) -> Result<Self, MachineError> {
        let start = find_rule_table_start(tape)?;
        let end = find_data_start(tape)? - 1;

        let width = end - start;
        if width % RULE_WIDTH != 0 {
            return Err(MachineError::MalformedTape(format!(
                "the rule table holds {} cells, which is not a multiple of {}",
                width, RULE_WIDTH
            )));
        }

        Ok(Self { start, end })
    }

    /// Index of the first cell of the first rule.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Index of the `$` closing the table.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Index of the first data cell. Equal to the tape length when the data region is empty.
    pub fn data_start(&self) -> usize {
        self.end + 1
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        (self.end - self.start) / RULE_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Iterates over the entries between the cached boundaries.
    pub fn entries<'a>(&self, tape: &'a Tape) -> impl Iterator<Item = Entry<'a>> + 'a {
        let start = self.start;
        tape.cells()
            .get(self.start..self.end)
            .unwrap_or_default()
            .chunks_exact(RULE_WIDTH)
            .enumerate()
            .map(move |(i, cells)| Entry {
                index: start + i * RULE_WIDTH,
                cells,
            })
    }

    /// Finds the first entry, in table order, for `state` reading `symbol`.
    ///
    /// Later entries with the same key are shadowed and never returned.
    pub fn lookup<'a>(&self, tape: &'a Tape, state: &str, symbol: &str) -> Option<Entry<'a>> {
        self.entries(tape).find(|entry| {
            if entry.state() != state {
                trace!(index = entry.index(), "state mismatch, skipping rule");
                return false;
            }
            if entry.read() != symbol {
                trace!(index = entry.index(), "symbol mismatch, skipping rule");
                return false;
            }
            true
        })
    }
}

/// Lays out `rules` and `data` as a tape: `$ rules... $ data...`.
pub fn encode<S: AsRef<str>>(rules: &[Rule], data: &[S]) -> Tape {
    let rule_cells = rules.iter().flat_map(Rule::cells);
    let tokens = rule_cells
        .chain(std::iter::once(SECTION_DELIMITER))
        .chain(data.iter().map(|symbol| symbol.as_ref()))
        .map(str::to_string);

    Tape::from_tokens(tokens)
}

/// Splits a tape back into its rule list and its data region.
pub fn decode(tape: &Tape) -> Result<(Vec<Rule>, Vec<Symbol>), MachineError> {
    let table = RuleTable::locate(tape)?;
    let rules = table.entries(tape).map(|entry| entry.to_rule()).collect();
    let data = tape.cells()[table.data_start()..].to_vec();

    Ok((rules, data))
}
