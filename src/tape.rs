//! The flat tape shared by the rule table and the working data.
//!
//! A `Tape` has a fixed length for its whole lifetime. Every access is bounds-checked and reports
//! [`MachineError::OutOfBounds`] instead of panicking.

use crate::types::{MachineError, Symbol, SECTION_DELIMITER};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tape {
    cells: Vec<Symbol>,
}

impl Tape {
    /// Wraps the given cells verbatim. No sentinel is added.
    pub fn new(cells: Vec<Symbol>) -> Self {
        Self { cells }
    }

    /// Builds a tape from source tokens, prefixed with the `$` sentinel at index 0.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let cells = std::iter::once(SECTION_DELIMITER.to_string())
            .chain(tokens.into_iter().map(Into::into))
            .collect();

        Self { cells }
    }

    /// Returns the symbol at `index`.
    pub fn get(&self, index: usize) -> Result<&str, MachineError> {
        self.cells
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.out_of_bounds(index))
    }

    /// Overwrites the symbol at `index`. The tape length never changes.
    pub fn set(&mut self, index: usize, symbol: impl Into<Symbol>) -> Result<(), MachineError> {
        let len = self.cells.len();
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = symbol.into();
                Ok(())
            }
            None => Err(MachineError::OutOfBounds {
                index: index as isize,
                len,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Checks whether a signed head position addresses a cell of this tape.
    pub fn contains(&self, index: isize) -> bool {
        usize::try_from(index).is_ok_and(|i| i < self.cells.len())
    }

    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Returns the `2 * radius + 1` cells centered on `center`.
    /// Positions that fall off either end of the tape are `None`.
    ///
    /// |  $  |  0  |  1  | tape
    ///    0     1     2    index
    ///
    /// window(0, 1) returns [None, Some("$"), Some("0")]
    pub fn window(&self, center: isize, radius: usize) -> Vec<Option<&str>> {
        window(&self.cells, center, radius)
    }

    fn out_of_bounds(&self, index: usize) -> MachineError {
        MachineError::OutOfBounds {
            index: index as isize,
            len: self.cells.len(),
        }
    }
}

/// Window over a borrowed run of cells, shared with observers that only hold a snapshot.
pub fn window(cells: &[Symbol], center: isize, radius: usize) -> Vec<Option<&str>> {
    let radius = radius as isize;
    (center - radius..=center + radius)
        .map(|i| {
            usize::try_from(i)
                .ok()
                .and_then(|i| cells.get(i))
                .map(String::as_str)
        })
        .collect()
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cells.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape() -> Tape {
        Tape::from_tokens(["0", "1", "R", "1", "0", "$", "1"])
    }

    #[test]
    fn test_from_tokens_prefixes_sentinel() {
        let tape = tape();
        assert_eq!(tape.len(), 8);
        assert_eq!(tape.get(0).unwrap(), "$");
        assert_eq!(tape.get(1).unwrap(), "0");
        assert_eq!(tape.get(7).unwrap(), "1");
    }

    #[test]
    fn test_get_out_of_bounds() {
        let tape = tape();
        assert_eq!(
            tape.get(8),
            Err(MachineError::OutOfBounds { index: 8, len: 8 })
        );
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut tape = tape();
        tape.set(7, "_").unwrap();
        assert_eq!(tape.get(7).unwrap(), "_");
        assert_eq!(tape.len(), 8);
    }

    #[test]
    fn test_set_out_of_bounds_leaves_tape_untouched() {
        let mut tape = tape();
        let before = tape.clone();

        let result = tape.set(42, "x");
        assert_eq!(result, Err(MachineError::OutOfBounds { index: 42, len: 8 }));
        assert_eq!(tape, before);
    }

    #[test]
    fn test_contains() {
        let tape = tape();
        assert!(tape.contains(0));
        assert!(tape.contains(7));
        assert!(!tape.contains(-1));
        assert!(!tape.contains(8));
    }

    #[test]
    fn test_window_pads_off_tape_positions() {
        let tape = tape();
        assert_eq!(tape.window(0, 1), vec![None, Some("$"), Some("0")]);
        assert_eq!(
            tape.window(7, 2),
            vec![Some("0"), Some("$"), Some("1"), None, None]
        );
        assert_eq!(tape.window(-3, 1), vec![None, None, None]);
    }

    #[test]
    fn test_display_joins_cells() {
        assert_eq!(tape().to_string(), "$ 0 1 R 1 0 $ 1");
    }
}
