//! This module defines the `UniversalMachine`, the execution engine of the emulator. The machine
//! reads its own transition rules from the tape it operates on: every step looks the current
//! `(state, symbol)` pair up in the rule table and applies the first matching rule.

use crate::codec::RuleTable;
use crate::tape::Tape;
use crate::types::{Halt, LookupKey, MachineError, Snapshot, Step, Transition, INITIAL_STATE};
use tracing::{debug, info};

/// A single-tape universal Turing machine.
///
/// The tape holds both the rule table and the data. The head starts on the sentinel and is moved
/// into the data region by [`UniversalMachine::initialize`]. Once the machine halts, it stays
/// halted until [`UniversalMachine::reset`] is called.
#[derive(Debug, Clone)]
pub struct UniversalMachine {
    state: String,
    tape: Tape,
    head: isize,
    table: Option<RuleTable>,
    halt: Option<Halt>,
    program: Tape,
    step_count: usize,
}

impl UniversalMachine {
    /// Creates a machine in state `0` with the head on the sentinel.
    pub fn new(tape: Tape) -> Self {
        Self {
            state: INITIAL_STATE.to_string(),
            tape: tape.clone(),
            head: 0,
            table: None,
            halt: None,
            program: tape,
            step_count: 0,
        }
    }

    /// Locates the rule table and moves the head to the first data cell.
    ///
    /// Calling this again on an initialized machine does nothing. A tape without two `$`
    /// delimiters halts the machine with [`MachineError::MalformedTape`].
    pub fn initialize(&mut self) -> Result<RuleTable, MachineError> {
        if let Some(table) = self.table {
            return Ok(table);
        }
        if let Some(Halt::Err(e)) = &self.halt {
            return Err(e.clone());
        }

        match RuleTable::locate(&self.tape) {
            Ok(table) => {
                self.head = table.data_start() as isize;
                self.table = Some(table);
                info!(
                    rules = table.len(),
                    head = self.head,
                    "Tape head initialized"
                );
                Ok(table)
            }
            Err(e) => {
                self.halt = Some(Halt::Err(e.clone()));
                Err(e)
            }
        }
    }

    /// Executes a single step of the machine.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a rule was applied.
    /// * `Step::Halt(Halt::Ok)` if the head is already off the tape.
    /// * `Step::Halt(Halt::Err(_))` if the tape is malformed or no rule matches.
    ///
    /// A halted machine keeps returning the same halt without touching the tape.
    pub fn step(&mut self) -> Step {
        if let Some(halt) = &self.halt {
            return Step::Halt(halt.clone());
        }

        match self.transition() {
            Ok(step) => step,
            Err(e) => self.halt_with(Halt::Err(e)),
        }
    }

    fn transition(&mut self) -> Result<Step, MachineError> {
        let table = self.initialize()?;

        let Some(position) = self.position() else {
            return Ok(self.halt_with(Halt::Ok));
        };

        let key = LookupKey {
            state: self.state.clone(),
            symbol: self.tape.get(position)?.to_string(),
        };

        let transition: Transition = table
            .lookup(&self.tape, &key.state, &key.symbol)
            .map(|entry| {
                debug!(
                    rule = entry.index(),
                    state = %key.state,
                    symbol = %key.symbol,
                    action = entry.action(),
                    write = entry.write(),
                    next = entry.next_state(),
                    "matched rule"
                );
                entry.transition()
            })
            .ok_or_else(|| MachineError::RuleNotFound {
                state: key.state.clone(),
                symbol: key.symbol.clone(),
            })?;

        // The rule scan never moves the head, so `position` still names the cell that was read.
        self.tape.set(position, transition.write)?;
        self.head += transition.direction.offset();
        self.state = transition.next_state;
        self.step_count += 1;

        Ok(Step::Continue)
    }

    /// Moves the machine into a terminal state. Used by the engine itself and by the runner
    /// when the head leaves the tape.
    pub fn halt_with(&mut self, halt: Halt) -> Step {
        self.halt = Some(halt.clone());
        Step::Halt(halt)
    }

    /// Restores the tape as loaded, the head to the sentinel and the state to `0`.
    pub fn reset(&mut self) {
        self.state = INITIAL_STATE.to_string();
        self.tape = self.program.clone();
        self.head = 0;
        self.table = None;
        self.halt = None;
        self.step_count = 0;
    }

    /// Returns the current control state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the current head index. Negative or past the end once the head left the tape.
    pub fn head(&self) -> isize {
        self.head
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// The tape as it was when the machine was created.
    pub fn program(&self) -> &Tape {
        &self.program
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// The located rule table, once the machine has been initialized.
    pub fn rule_table(&self) -> Option<&RuleTable> {
        self.table.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    pub fn halt(&self) -> Option<&Halt> {
        self.halt.as_ref()
    }

    /// Checks whether the head addresses a cell of the tape.
    pub fn in_bounds(&self) -> bool {
        self.tape.contains(self.head)
    }

    /// Returns the symbol under the head, if the head is on the tape.
    pub fn symbol(&self) -> Option<&str> {
        self.position().and_then(|i| self.tape.get(i).ok())
    }

    /// Captures the current machine configuration for observers.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            head: self.head,
            state: &self.state,
            step: self.step_count,
            tape: self.tape.cells(),
        }
    }

    fn position(&self) -> Option<usize> {
        usize::try_from(self.head)
            .ok()
            .filter(|&i| i < self.tape.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, Rule};

    fn successor_machine() -> UniversalMachine {
        let rules = vec![
            Rule::new("0", "1", "R", "1", "0"),
            Rule::new("0", "_", "R", "1", "halt"),
        ];
        UniversalMachine::new(encode(&rules, &["1", "1", "_"]))
    }

    fn data(machine: &UniversalMachine) -> Vec<String> {
        let start = machine.rule_table().unwrap().data_start();
        machine.tape().cells()[start..].to_vec()
    }

    #[test]
    fn test_machine_creation() {
        let machine = successor_machine();

        assert_eq!(machine.state(), "0");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
        assert!(!machine.is_initialized());
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_initialize_moves_head_to_data() {
        let mut machine = successor_machine();
        machine.initialize().unwrap();

        assert_eq!(machine.head(), 12);
        assert_eq!(machine.symbol(), Some("1"));
        assert_eq!(machine.state(), "0");
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut machine = successor_machine();
        machine.initialize().unwrap();
        machine.step();
        let head = machine.head();

        machine.initialize().unwrap();
        assert_eq!(machine.head(), head);
    }

    #[test]
    fn test_initialize_rejects_single_delimiter() {
        let mut machine = UniversalMachine::new(Tape::from_tokens(["0", "1", "R", "1", "0", "1"]));

        let result = machine.initialize();
        assert!(matches!(result, Err(MachineError::MalformedTape(_))));
        assert!(matches!(
            machine.step(),
            Step::Halt(Halt::Err(MachineError::MalformedTape(_)))
        ));
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_single_step() {
        let mut machine = successor_machine();

        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.head(), 13);
        assert_eq!(machine.state(), "0");
        assert_eq!(machine.step_count(), 1);
        assert_eq!(data(&machine), vec!["1", "1", "_"]);
    }

    #[test]
    fn test_rule_table_untouched_by_steps() {
        let mut machine = successor_machine();
        machine.step();
        machine.step();
        machine.step();

        let table = *machine.rule_table().unwrap();
        assert_eq!(
            &machine.tape().cells()[..table.data_start()],
            &machine.program().cells()[..table.data_start()]
        );
    }

    #[test]
    fn test_unary_successor_runs_off_the_tape() {
        let mut machine = successor_machine();

        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.step(), Step::Continue);

        assert_eq!(data(&machine), vec!["1", "1", "1"]);
        assert_eq!(machine.state(), "halt");
        assert_eq!(machine.head(), 15);
        assert!(!machine.in_bounds());

        // The engine itself halts once asked to step from outside the tape.
        assert_eq!(machine.step(), Step::Halt(Halt::Ok));
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_rule_not_found_on_first_step() {
        let rules = vec![Rule::new("0", "1", "R", "1", "0")];
        let mut machine = UniversalMachine::new(encode(&rules, &["x", "1"]));
        machine.initialize().unwrap();
        let tape_before = machine.tape().clone();

        let result = machine.step();
        match result {
            Step::Halt(Halt::Err(MachineError::RuleNotFound { state, symbol })) => {
                assert_eq!(state, "0");
                assert_eq!(symbol, "x");
            }
            _ => panic!("Expected RuleNotFound, but got {:?}", result),
        }

        assert_eq!(machine.head(), 7);
        assert_eq!(machine.tape(), &tape_before);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_halted_machine_is_sticky() {
        let rules = vec![Rule::new("0", "1", "R", "1", "0")];
        let mut machine = UniversalMachine::new(encode(&rules, &["x"]));

        let first = machine.step();
        let second = machine.step();
        assert_eq!(first, second);
        assert!(machine.is_halted());
    }

    #[test]
    fn test_first_matching_rule_is_applied() {
        let rules = vec![
            Rule::new("0", "1", "N", "a", "first"),
            Rule::new("0", "1", "R", "b", "second"),
        ];
        let mut machine = UniversalMachine::new(encode(&rules, &["1"]));

        machine.step();
        assert_eq!(data(&machine), vec!["a"]);
        assert_eq!(machine.state(), "first");
        assert_eq!(machine.head(), 12);
    }

    #[test]
    fn test_left_move_can_enter_rule_region() {
        let rules = vec![
            Rule::new("0", "b", "L", "B", "1"),
            Rule::new("1", "b", "R", "b", "0"),
        ];
        let mut machine = UniversalMachine::new(encode(&rules, &["b"]));

        machine.step();
        assert_eq!(machine.state(), "1");
        assert_eq!(machine.head(), 11);
        assert_eq!(machine.symbol(), Some("$"));

        assert_eq!(
            machine.step(),
            Step::Halt(Halt::Err(MachineError::RuleNotFound {
                state: "1".to_string(),
                symbol: "$".to_string(),
            }))
        );
    }

    #[test]
    fn test_stay_keeps_head() {
        let rules = vec![Rule::new("0", "a", "S", "A", "0"), Rule::new("0", "A", "-", "B", "1")];
        let mut machine = UniversalMachine::new(encode(&rules, &["a"]));

        machine.step();
        machine.step();
        assert_eq!(machine.head(), 12);
        assert_eq!(data(&machine), vec!["B"]);
        assert_eq!(machine.state(), "1");
    }

    #[test]
    fn test_reset() {
        let mut machine = successor_machine();
        machine.step();
        machine.step();
        machine.step();
        machine.step();
        assert!(machine.is_halted());

        machine.reset();
        assert_eq!(machine.state(), "0");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
        assert!(!machine.is_halted());
        assert!(!machine.is_initialized());
        assert_eq!(machine.tape(), machine.program());
    }

    #[test]
    fn test_snapshot() {
        let mut machine = successor_machine();
        machine.step();

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.head, 13);
        assert_eq!(snapshot.state, "0");
        assert_eq!(snapshot.step, 1);
        assert_eq!(snapshot.tape.len(), 15);
    }
}
