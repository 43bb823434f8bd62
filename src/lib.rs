//! This crate provides the core logic of a universal Turing machine emulator.
//! A single tape holds both the transition rules and the working data; the machine looks its
//! rules up on the tape itself at every step. It includes modules for the tape, the rule table
//! layout, the execution engine, the runner, tape loading, analysis and presentation.

pub mod analyzer;
pub mod codec;
pub mod display;
pub mod loader;
pub mod logging;
pub mod machine;
pub mod programs;
pub mod runner;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
/// Re-exports the rule table codec.
pub use codec::{decode, encode, Rule, RuleTable};
/// Re-exports the snapshot presenters from the display module.
pub use display::{JsonDisplay, TapeView, TextDisplay};
/// Re-exports the `TapeLoader` struct and `Delimiter` enum from the loader module.
pub use loader::{Delimiter, TapeLoader};
/// Re-exports the `UniversalMachine` struct from the machine module.
pub use machine::UniversalMachine;
/// Re-exports `TapeProgram`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramManager, TapeProgram, PROGRAMS};
/// Re-exports the runner and its observer seam.
pub use runner::{run_once, Observer, Runner, RunnerConfig};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the shared types.
pub use types::{Direction, Halt, MachineError, Snapshot, Step, Symbol, Transition};
