//! This module inspects a tape before it runs and reports rule tables that are legal but
//! probably not what the author meant: shadowed rules, a missing start rule, and data symbols no
//! rule can read. None of these stop the machine; first-match lookup stays authoritative.

use crate::codec::{Entry, RuleTable};
use crate::tape::Tape;
use crate::types::{MachineError, Symbol, INITIAL_STATE};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Represents the findings reported by [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// A rule whose key already appears earlier in the table. It can never be selected.
    #[error("rule at index {index} for state {state} reading {read} is shadowed by the rule at index {shadowed_by}")]
    ShadowedRule {
        index: usize,
        shadowed_by: usize,
        state: String,
        read: Symbol,
    },
    /// No rule starts from the initial state, so the first step always fails.
    #[error("no rule handles the initial state {0}")]
    MissingInitialState(String),
    /// The data region holds symbols that no rule reads.
    #[error("data symbols never read by any rule: {0:?}")]
    UnreadSymbols(Vec<Symbol>),
}

type Check = fn(&Tape, &RuleTable) -> Vec<Diagnostic>;

/// Analyzes a tape's rule table and data region.
///
/// # Returns
///
/// * `Ok(diagnostics)`, possibly empty, if the tape has a valid layout.
/// * `Err(MachineError::MalformedTape)` if the rule table cannot be located.
pub fn analyze(tape: &Tape) -> Result<Vec<Diagnostic>, MachineError> {
    let table = RuleTable::locate(tape)?;

    let checks: [Check; 3] = [check_shadowed_rules, check_initial_state, check_data_symbols];

    Ok(checks
        .iter()
        .flat_map(|check| check(tape, &table))
        .collect())
}

fn check_shadowed_rules(tape: &Tape, table: &RuleTable) -> Vec<Diagnostic> {
    let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();

    table
        .entries(tape)
        .filter_map(|entry: Entry<'_>| {
            let key = (entry.state(), entry.read());
            match first_seen.get(&key) {
                Some(&shadowed_by) => Some(Diagnostic::ShadowedRule {
                    index: entry.index(),
                    shadowed_by,
                    state: entry.state().to_string(),
                    read: entry.read().to_string(),
                }),
                None => {
                    first_seen.insert(key, entry.index());
                    None
                }
            }
        })
        .collect()
}

fn check_initial_state(tape: &Tape, table: &RuleTable) -> Vec<Diagnostic> {
    if table.entries(tape).any(|entry| entry.state() == INITIAL_STATE) {
        Vec::new()
    } else {
        vec![Diagnostic::MissingInitialState(INITIAL_STATE.to_string())]
    }
}

fn check_data_symbols(tape: &Tape, table: &RuleTable) -> Vec<Diagnostic> {
    let readable: HashSet<&str> = table.entries(tape).map(|entry| entry.read()).collect();

    let mut unread: Vec<Symbol> = tape.cells()[table.data_start()..]
        .iter()
        .filter(|symbol| !readable.contains(symbol.as_str()))
        .cloned()
        .collect();
    unread.sort();
    unread.dedup();

    if unread.is_empty() {
        Vec::new()
    } else {
        vec![Diagnostic::UnreadSymbols(unread)]
    }
}
