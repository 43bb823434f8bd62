//! Presentation of machine snapshots.
//!
//! [`TapeView`] draws the classic terminal strip: a row of fixed-width cells centered on the head
//! with a pointer underneath. [`TextDisplay`] and [`JsonDisplay`] are [`Observer`]s that write a
//! view of every snapshot to any `io::Write`.

use crate::runner::Observer;
use crate::tape::window;
use crate::types::Snapshot;
use std::fmt::Write as _;
use std::io::Write;
use tracing::warn;

/// Characters of a symbol shown inside a cell.
const CELL_WIDTH: usize = 4;
/// Filler for positions outside the tape.
const OFF_TAPE: &str = "xxxx";
/// Terminal width assumed when the real one cannot be queried.
pub const DEFAULT_WIDTH: usize = 80;

/// Renders a snapshot as a strip of cells sized to a terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeView {
    width: usize,
}

impl Default for TapeView {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl TapeView {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Number of cells shown on each side of the head.
    pub fn radius(&self) -> usize {
        (self.width.saturating_sub(1) / (CELL_WIDTH + 1) / 2).saturating_sub(1)
    }

    pub fn render(&self, snapshot: &Snapshot<'_>) -> String {
        let radius = self.radius();
        let ruler = "=".repeat((radius * 2 + 1) * (CELL_WIDTH + 1) + 1);
        let pointer_column = radius * (CELL_WIDTH + 1);

        let mut out = String::new();
        let _ = writeln!(out, "Current state: {}", snapshot.state);
        let _ = writeln!(out, "Tape head: {}", snapshot.head);
        let _ = writeln!(out, "{ruler}");

        out.push('|');
        for cell in window(snapshot.tape, snapshot.head, radius) {
            let text = match cell {
                Some(symbol) => symbol.chars().take(CELL_WIDTH).collect::<String>(),
                None => OFF_TAPE.to_string(),
            };
            let _ = write!(out, "{:^width$}|", text, width = CELL_WIDTH);
        }
        out.push('\n');

        let _ = writeln!(out, "{ruler}");
        let _ = writeln!(out, "{}Λ", " ".repeat(pointer_column + 2));
        let _ = writeln!(out, "{}/ \\", " ".repeat(pointer_column + 1));
        out
    }
}

/// Writes a [`TapeView`] of every snapshot followed by a blank line.
pub struct TextDisplay<W: Write> {
    out: W,
    view: TapeView,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W, view: TapeView) -> Self {
        Self { out, view }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Observer for TextDisplay<W> {
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        let rendered = self.view.render(snapshot);
        if let Err(e) = writeln!(self.out, "{rendered}").and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write tape view");
        }
    }
}

/// Writes every snapshot as one line of JSON.
pub struct JsonDisplay<W: Write> {
    out: W,
}

impl<W: Write> JsonDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Observer for JsonDisplay<W> {
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        let result = serde_json::to_writer(&mut self.out, snapshot)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out));
        if let Err(e) = result {
            warn!(error = %e, "failed to write snapshot");
        }
    }
}
