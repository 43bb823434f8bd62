use crate::loader::{Delimiter, TapeLoader};
use crate::tape::Tape;
use crate::types::MachineError;

// Default embedded tapes
const TAPE_TEXTS: [&str; 3] = [
    include_str!("../tapes/unary-successor.utm"),
    include_str!("../tapes/bit-flip.utm"),
    include_str!("../tapes/binary-increment.utm"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<TapeProgram> = TAPE_TEXTS
        .iter()
        .enumerate()
        .map(|(index, text)| TapeProgram::from_source(index, text))
        .collect();
}

/// An embedded tape together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct TapeProgram {
    pub name: String,
    pub text: &'static str,
    pub tape: Tape,
}

impl TapeProgram {
    fn from_source(index: usize, text: &'static str) -> Self {
        let name = TapeLoader::title(text)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Tape {}", index + 1));

        Self {
            name,
            text,
            tape: TapeLoader::load_tape_from_string(text, &Delimiter::Whitespace),
        }
    }
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<TapeProgram, MachineError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            MachineError::InvalidConfig(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<TapeProgram, MachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| MachineError::InvalidConfig(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }
}
