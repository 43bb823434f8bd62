//! Drives a [`UniversalMachine`] to completion.
//!
//! The runner owns the halting policy: after every step it checks whether the head is still on
//! the tape and, if not, halts the machine successfully. Observers receive a snapshot after
//! initialization and after each step that did not halt.

use crate::machine::UniversalMachine;
use crate::types::{Halt, MachineError, Snapshot, Step};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Default pause between two automatic steps, in seconds.
pub const DEFAULT_STEP_INTERVAL: f64 = 1.0;

/// Options recognized by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Run to completion instead of stopping after initialization.
    pub auto: bool,
    /// Pause between automatic steps.
    pub step_interval_seconds: f64,
    /// Trace every transition.
    pub verbose: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            auto: false,
            step_interval_seconds: DEFAULT_STEP_INTERVAL,
            verbose: false,
        }
    }
}

impl RunnerConfig {
    /// Rejects intervals that cannot be slept for.
    pub fn validate(&self) -> Result<(), MachineError> {
        self.step_interval().map(|_| ())
    }

    pub fn step_interval(&self) -> Result<Duration, MachineError> {
        Duration::try_from_secs_f64(self.step_interval_seconds).map_err(|e| {
            MachineError::InvalidConfig(format!(
                "step interval {} is not a valid duration: {}",
                self.step_interval_seconds, e
            ))
        })
    }
}

/// Receives read-only snapshots of a running machine.
pub trait Observer {
    fn observe(&mut self, snapshot: &Snapshot<'_>);
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        (**self).observe(snapshot)
    }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        (**self).observe(snapshot)
    }
}

/// An observer that ignores every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Observer for Silent {
    fn observe(&mut self, _snapshot: &Snapshot<'_>) {}
}

/// Initializes the machine if needed, performs one step and applies the bounds check.
///
/// This is the primitive interactive steppers are built on.
pub fn run_once(machine: &mut UniversalMachine) -> Step {
    if let Err(e) = machine.initialize() {
        return Step::Halt(Halt::Err(e));
    }

    match machine.step() {
        Step::Continue if !machine.in_bounds() => machine.halt_with(Halt::Ok),
        step => step,
    }
}

pub struct Runner<O: Observer> {
    config: RunnerConfig,
    observer: O,
}

impl<O: Observer> Runner<O> {
    pub fn new(config: RunnerConfig, observer: O) -> Self {
        Self { config, observer }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs the machine according to the configuration.
    ///
    /// In auto mode the machine runs until it halts. Otherwise it is only initialized and
    /// shown once, and `Step::Continue` is returned so that an external driver can step it.
    pub fn run(&mut self, machine: &mut UniversalMachine) -> Step {
        if self.config.auto {
            return Step::Halt(self.run_auto(machine));
        }

        match machine.initialize() {
            Ok(_) => {
                self.observer.observe(&machine.snapshot());
                Step::Continue
            }
            Err(e) => Step::Halt(self.report(Halt::Err(e))),
        }
    }

    /// Steps the machine until it halts, pausing `step_interval_seconds` between steps.
    pub fn run_auto(&mut self, machine: &mut UniversalMachine) -> Halt {
        let interval = match self.config.step_interval() {
            Ok(interval) => interval,
            Err(e) => return self.report(Halt::Err(e)),
        };

        if let Err(e) = machine.initialize() {
            return self.report(Halt::Err(e));
        }
        self.observer.observe(&machine.snapshot());

        loop {
            if let Step::Halt(halt) = run_once(machine) {
                return self.report(halt);
            }

            self.observer.observe(&machine.snapshot());

            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
    }

    /// Consumes the runner, returning its observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    fn report(&self, halt: Halt) -> Halt {
        match &halt {
            Halt::Ok => info!("Tape end reached, machine halts"),
            Halt::Err(e) => error!(error = %e, "machine halted with an error"),
        }
        halt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, Rule};
    use crate::tape::Tape;

    /// Records every snapshot it sees.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(isize, String, usize)>,
    }

    impl Observer for Recorder {
        fn observe(&mut self, snapshot: &Snapshot<'_>) {
            self.seen
                .push((snapshot.head, snapshot.state.to_string(), snapshot.step));
        }
    }

    fn auto_config() -> RunnerConfig {
        RunnerConfig {
            auto: true,
            step_interval_seconds: 0.0,
            verbose: false,
        }
    }

    fn successor_tape() -> Tape {
        let rules = vec![
            Rule::new("0", "1", "R", "1", "0"),
            Rule::new("0", "_", "R", "1", "halt"),
        ];
        encode(&rules, &["1", "1", "_"])
    }

    #[test]
    fn test_config_defaults() {
        let config = RunnerConfig::default();
        assert!(!config.auto);
        assert!(!config.verbose);
        assert_eq!(config.step_interval().unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RunnerConfig = serde_json::from_str(r#"{ "auto": true }"#).unwrap();
        assert!(config.auto);
        assert_eq!(config.step_interval_seconds, DEFAULT_STEP_INTERVAL);
    }

    #[test]
    fn test_config_rejects_negative_interval() {
        let config = RunnerConfig {
            step_interval_seconds: -1.0,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MachineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_run_once_initializes_and_steps() {
        let mut machine = UniversalMachine::new(successor_tape());

        assert_eq!(run_once(&mut machine), Step::Continue);
        assert!(machine.is_initialized());
        assert_eq!(machine.head(), 13);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_run_once_is_deterministic() {
        let mut first = UniversalMachine::new(successor_tape());
        let mut second = UniversalMachine::new(successor_tape());

        for _ in 0..2 {
            run_once(&mut first);
            run_once(&mut second);
        }

        assert_eq!(first.tape(), second.tape());
        assert_eq!(first.head(), second.head());
        assert_eq!(first.state(), second.state());
    }

    #[test]
    fn test_run_once_halts_when_head_leaves_tape() {
        let mut machine = UniversalMachine::new(successor_tape());

        assert_eq!(run_once(&mut machine), Step::Continue);
        assert_eq!(run_once(&mut machine), Step::Continue);
        // The third step writes the last cell and moves past the end.
        assert_eq!(run_once(&mut machine), Step::Halt(Halt::Ok));
        assert_eq!(machine.step_count(), 3);
        assert_eq!(machine.head(), 15);
        assert_eq!(machine.state(), "halt");
    }

    #[test]
    fn test_run_once_reports_malformed_tape() {
        let mut machine = UniversalMachine::new(Tape::from_tokens(["1", "1"]));
        assert!(matches!(
            run_once(&mut machine),
            Step::Halt(Halt::Err(MachineError::MalformedTape(_)))
        ));
    }

    #[test]
    fn test_run_auto_unary_successor() {
        let mut machine = UniversalMachine::new(successor_tape());
        let mut runner = Runner::new(auto_config(), Recorder::default());

        let halt = runner.run_auto(&mut machine);
        assert_eq!(halt, Halt::Ok);
        assert_eq!(halt.exit_code(), 0);
        assert_eq!(
            &machine.tape().cells()[12..],
            &["1".to_string(), "1".to_string(), "1".to_string()]
        );
        assert_eq!(machine.state(), "halt");

        // Initial snapshot plus one per non-final step.
        let recorder = runner.into_observer();
        assert_eq!(
            recorder.seen,
            vec![
                (12, "0".to_string(), 0),
                (13, "0".to_string(), 1),
                (14, "0".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_run_auto_rule_not_found() {
        let rules = vec![Rule::new("0", "1", "R", "1", "0")];
        let mut machine = UniversalMachine::new(encode(&rules, &["1", "0"]));
        let mut runner = Runner::new(auto_config(), Silent);

        let halt = runner.run_auto(&mut machine);
        assert_eq!(
            halt,
            Halt::Err(MachineError::RuleNotFound {
                state: "0".to_string(),
                symbol: "0".to_string(),
            })
        );
        assert_eq!(halt.exit_code(), 1);
        assert_eq!(machine.head(), 8);
    }

    #[test]
    fn test_run_auto_malformed_tape_observes_nothing() {
        let mut machine = UniversalMachine::new(Tape::from_tokens(["0", "1", "R", "1", "0"]));
        let mut runner = Runner::new(auto_config(), Recorder::default());

        let halt = runner.run_auto(&mut machine);
        assert!(matches!(halt, Halt::Err(MachineError::MalformedTape(_))));
        assert!(runner.into_observer().seen.is_empty());
    }

    #[test]
    fn test_run_manual_only_initializes() {
        let mut machine = UniversalMachine::new(successor_tape());
        let mut recorder = Recorder::default();
        let mut runner = Runner::new(RunnerConfig::default(), &mut recorder);

        assert_eq!(runner.run(&mut machine), Step::Continue);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.head(), 12);
        assert_eq!(recorder.seen, vec![(12, "0".to_string(), 0)]);
    }

    #[test]
    fn test_run_auto_mode_runs_to_completion() {
        let mut machine = UniversalMachine::new(successor_tape());
        let mut runner = Runner::new(auto_config(), Silent);

        assert_eq!(runner.run(&mut machine), Step::Halt(Halt::Ok));
    }
}
