use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing::{debug, warn};
use unituring::display::DEFAULT_WIDTH;
use unituring::runner::DEFAULT_STEP_INTERVAL;
use unituring::types::{EXIT_ERROR, EXIT_OK};
use unituring::{
    analyze, logging, Delimiter, Halt, JsonDisplay, MachineError, Observer, Runner, RunnerConfig,
    Step, Tape, TapeLoader, TapeView, TextDisplay, UniversalMachine,
};

/// UNITURING - Universal Turing Machine Emulator.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  unituring-cli -a -s 0.2 -t tapes/unary-successor.utm
  cat tapes/bit-flip.utm | unituring-cli -a -s 0")]
struct Cli {
    /// Run the machine until it halts instead of stopping after initialization
    #[clap(short, long)]
    auto: bool,

    /// Delimiter of the tape file, whitespace by default
    #[clap(short, long, default_value = " ")]
    delimiter: Delimiter,

    /// Seconds to wait between two steps in auto mode
    #[clap(short = 's', long = "step", default_value_t = DEFAULT_STEP_INTERVAL)]
    step: f64,

    /// Trace every transition on stderr
    #[clap(short, long)]
    verbose: bool,

    /// The tape file. Read from stdin when omitted and input is piped
    #[clap(short, long)]
    tape: Option<PathBuf>,

    /// How each snapshot is printed
    #[clap(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// A strip of cells around the head, sized to the terminal
    Text,
    /// One JSON object per line
    Json,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let tape = match load_tape(cli) {
        Ok(tape) => tape,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };

    // Layout errors are reported by the runner once it initializes the machine.
    if let Ok(diagnostics) = analyze(&tape) {
        for diagnostic in diagnostics {
            warn!("{}", diagnostic);
        }
    }

    let config = RunnerConfig {
        auto: cli.auto,
        step_interval_seconds: cli.step,
        verbose: cli.verbose,
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return EXIT_ERROR;
    }
    debug!(?config, delimiter = %cli.delimiter, "starting runner");

    let observer: Box<dyn Observer> = match cli.format {
        Format::Text => Box::new(TextDisplay::new(
            io::stdout(),
            TapeView::new(terminal_width()),
        )),
        Format::Json => Box::new(JsonDisplay::new(io::stdout())),
    };

    let mut machine = UniversalMachine::new(tape);
    let mut runner = Runner::new(config, observer);

    match runner.run(&mut machine) {
        Step::Continue => {
            message(
                cli.format,
                "Tape head initialized. Use unituring-tui to step through the machine.",
            );
            EXIT_OK
        }
        Step::Halt(Halt::Ok) => {
            message(cli.format, "Tape end reached, machine halts.");
            EXIT_OK
        }
        Step::Halt(Halt::Err(e)) => {
            eprintln!("Machine error: {}", e);
            EXIT_ERROR
        }
    }
}

/// Loads the tape from the file given with `-t`, or from piped stdin.
fn load_tape(cli: &Cli) -> Result<Tape, MachineError> {
    if let Some(path) = &cli.tape {
        TapeLoader::load_tape(path, &cli.delimiter)
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| MachineError::FileError(format!("Failed to read from stdin: {}", e)))?;
        Ok(TapeLoader::load_tape_from_string(&buffer, &cli.delimiter))
    } else {
        Err(MachineError::InvalidConfig(
            "no tape given; pass -t TAPE or pipe a tape through stdin".to_string(),
        ))
    }
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(width, _)| width as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Status lines share stdout with text snapshots but must not corrupt a JSON stream.
fn message(format: Format, text: &str) {
    match format {
        Format::Text => println!("{}", text),
        Format::Json => eprintln!("{}", text),
    }
}
