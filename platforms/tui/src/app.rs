use action::Action;
use keymap::{Config, KeyMapConfig};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;
use unituring::{
    run_once, Delimiter, Halt, ProgramManager, RuleTable, Step, Tape, TapeLoader,
    UniversalMachine,
};

const BLOCK_PADDING: Padding = Padding::new(1, 1, 0, 0);
/// Characters of a symbol shown inside a tape cell.
const CELL_TEXT_WIDTH: usize = 4;
/// Rendered width of one cell, including its surrounding spaces.
const CELL_WIDTH: usize = CELL_TEXT_WIDTH + 2;
const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);
const MIN_INTERVAL: Duration = Duration::from_millis(50);
const MAX_INTERVAL: Duration = Duration::from_secs(5);

pub struct App {
    machine: UniversalMachine,
    current_program_index: usize,
    auto_play: bool,
    interval: Duration,
    message: String,
    show_help: bool,
    pub(crate) keymap: Config<Action>,
    // Set when the tape came from a file or stdin; program switching is then disabled.
    program_loaded_from_source: bool,
    program_name: String,
    program_content: String,
}

impl App {
    pub fn new_default() -> Result<Self, String> {
        let program = ProgramManager::get_program_by_index(0).map_err(|e| e.to_string())?;
        let machine = ready_machine(program.tape)?;

        Ok(Self {
            machine,
            keymap: Action::keymap_config(),
            current_program_index: 0,
            auto_play: false,
            interval: DEFAULT_INTERVAL,
            message: "Press 'h' for help.".to_string(),
            show_help: false,
            program_loaded_from_source: false,
            program_name: program.name,
            program_content: program.text.to_string(),
        })
    }

    pub fn new_from_source(program_content: String, delimiter: &Delimiter) -> Result<Self, String> {
        let tape = TapeLoader::load_tape_from_string(&program_content, delimiter);
        let machine = ready_machine(tape)?;
        let program_name = TapeLoader::title(&program_content)
            .unwrap_or("Custom tape")
            .to_string();

        Ok(Self {
            machine,
            keymap: Action::keymap_config(),
            current_program_index: 0,
            auto_play: false,
            interval: DEFAULT_INTERVAL,
            message: "Tape loaded from source. Press 'h' for help.".to_string(),
            show_help: false,
            program_loaded_from_source: true,
            program_name,
            program_content,
        })
    }

    pub fn render(&mut self, f: &mut Frame) {
        let inner_area = f.area().inner(Margin::new(1, 0));

        // Program info, source and machine, status.
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner_area);

        self.render_program_info(f, main_chunks[0]);

        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Length(1),
                Constraint::Percentage(60),
            ])
            .split(main_chunks[1]);

        self.render_source_code(f, middle_chunks[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(middle_chunks[2]);

        self.render_machine_state(f, right_chunks[0]);

        if self.show_help {
            self.render_help(f, right_chunks[1]);
        } else {
            self.render_tape(f, right_chunks[1]);
        }

        self.render_status(f, main_chunks[2]);
    }

    fn render_source_code(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .program_content
            .lines()
            .map(|line| {
                if line.starts_with('#') {
                    Line::from(Span::styled(line, Style::default().fg(Color::DarkGray)))
                } else if line.split_whitespace().any(|token| token == "$") {
                    Line::from(Span::styled(line, Style::default().fg(Color::Yellow)))
                } else {
                    Line::from(line)
                }
            })
            .collect();

        let paragraph = section("Tape Source", lines).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_program_info(&self, f: &mut Frame, area: Rect) {
        let tape = self.machine.program();
        let rule_count = RuleTable::locate(tape).map(|t| t.len()).unwrap_or(0);

        let title = if self.program_loaded_from_source {
            format!("{} (Custom)", self.program_name)
        } else {
            format!(
                "{} ({}/{})",
                self.program_name,
                self.current_program_index + 1,
                ProgramManager::count()
            )
        };

        let text = vec![
            Line::from(vec![
                Span::styled("Tape: ", Style::default().fg(Color::Yellow)),
                Span::raw(title),
            ]),
            Line::from(vec![
                Span::styled("Cells: ", Style::default().fg(Color::Yellow)),
                Span::raw(tape.len().to_string()),
                Span::styled(" | Rules: ", Style::default().fg(Color::Yellow)),
                Span::raw(rule_count.to_string()),
            ]),
        ];

        let paragraph = Paragraph::new(text).block(
            block("UNITURING - Universal Turing Machine Emulator")
                .title_alignment(Alignment::Center),
        );

        f.render_widget(paragraph, area);
    }

    fn render_tape(&self, f: &mut Frame, area: Rect) {
        let head = self.machine.head();
        let data_start = self
            .machine
            .rule_table()
            .map(|table| table.data_start() as isize)
            .unwrap_or(0);

        // Leave room for borders and padding.
        let usable = (area.width as usize).saturating_sub(4);
        let radius = (usable / CELL_WIDTH).saturating_sub(1) / 2;
        let first = head - radius as isize;

        let cells: Vec<Span> = self
            .machine
            .tape()
            .window(head, radius)
            .into_iter()
            .enumerate()
            .map(|(offset, cell)| {
                let index = first + offset as isize;
                let text: String = cell
                    .map(|symbol| symbol.chars().take(CELL_TEXT_WIDTH).collect())
                    .unwrap_or_else(|| "····".to_string());
                let content = format!(" {:^width$} ", text, width = CELL_TEXT_WIDTH);

                let style = if index == head {
                    Style::default()
                        .bg(Color::Yellow)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else if cell == Some("$") {
                    Style::default().fg(Color::Yellow)
                } else if cell.is_none() {
                    Style::default().fg(Color::DarkGray)
                } else if index < data_start {
                    Style::default().fg(Color::Magenta)
                } else {
                    Style::default()
                };

                Span::styled(content, style)
            })
            .collect();

        let symbol = self.machine.symbol().unwrap_or("off tape");
        let text_lines = vec![
            Line::from(cells),
            Line::from(""),
            Line::from(Span::styled(
                format!("Head at position: {} (symbol: '{}')", head, symbol),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                "Rule table cells are magenta, delimiters yellow.",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = section("Tape", text_lines).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_machine_state(&self, f: &mut Frame, area: Rect) {
        let step_count = self.machine.step_count();

        let (status_text, status_color) = match self.machine.halt() {
            Some(Halt::Ok) => ("HALTED", Color::Red),
            Some(Halt::Err(_)) => ("ERROR", Color::Red),
            None if step_count == 0 => ("READY", Color::Blue),
            None => ("RUNNING", Color::Green),
        };

        let mut text = vec![Line::from(vec![
            Span::styled("Current State: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                self.machine.state(),
                Style::default()
                    .fg(status_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | Steps: ", Style::default().fg(Color::Yellow)),
            Span::raw(step_count.to_string()),
            Span::styled(" | Status: ", Style::default().fg(Color::Yellow)),
            Span::styled(status_text, Style::default().fg(status_color)),
        ])];

        if let Some(Halt::Err(e)) = self.machine.halt() {
            text.push(Line::from(Span::styled(
                e.to_string(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = section("Machine State", text);
        f.render_widget(paragraph, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from("Controls:"),
            Line::from("  Space - Step forward"),
            Line::from("  r - Reset machine"),
            Line::from("  p - Toggle auto-play"),
            Line::from("  + / - - Faster / slower auto-play"),
            Line::from(if self.program_loaded_from_source {
                "  ← → - Tape switching disabled (loaded from file/stdin)"
            } else {
                "  ← → - Switch tapes"
            }),
            Line::from("  h - Toggle this help"),
            Line::from("  q - Quit"),
            Line::from(""),
            Line::from("Tape layout: $ rules... $ data..."),
            Line::from("  Each rule is five cells: state read action write next"),
            Line::from("  Actions L and R move the head; anything else stays"),
            Line::from("  The machine halts once the head leaves the tape"),
        ];

        let paragraph = section("Help", help_text);
        f.render_widget(paragraph, area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let interval = format!("{} ms", self.interval.as_millis());
        let outer = block("Status");
        let inner = outer.inner(area);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(interval.len() as u16),
            ])
            .split(inner);

        let auto_play_status = if self.auto_play { "ON" } else { "OFF" };
        let status = Line::from(vec![
            Span::raw("Auto-play: "),
            Span::styled(auto_play_status, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" | {}", self.message)),
        ]);

        let speed = Text::from(
            Line::from(Span::styled(interval, Style::default().fg(Color::Yellow))).right_aligned(),
        );

        f.render_widget(outer, area);
        f.render_widget(status, chunks[0]);
        f.render_widget(speed, chunks[1]);
    }

    pub fn step_machine(&mut self) {
        match run_once(&mut self.machine) {
            Step::Continue => {
                self.message = format!("Step {} completed", self.machine.step_count());
            }
            Step::Halt(Halt::Ok) => {
                self.message = "Tape end reached, machine halts. Press 'r' to reset.".to_string();
                self.auto_play = false;
            }
            Step::Halt(Halt::Err(e)) => {
                self.message = format!("{}. Press 'r' to reset.", e);
                self.auto_play = false;
            }
        }
    }

    pub fn reset_machine(&mut self) {
        self.machine.reset();
        // The layout was checked when the tape was loaded.
        let _ = self.machine.initialize();
        self.message = "Machine reset".to_string();
        self.auto_play = false;
    }

    pub fn toggle_auto_play(&mut self) {
        self.auto_play = !self.auto_play;
        self.message = format!(
            "Auto-play {}",
            if self.auto_play {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    pub fn is_auto_playing(&self) -> bool {
        self.auto_play && !self.machine.is_halted()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn faster(&mut self) {
        self.interval = (self.interval / 2).max(MIN_INTERVAL);
        self.message = format!("Auto-play interval {} ms", self.interval.as_millis());
    }

    pub fn slower(&mut self) {
        self.interval = (self.interval * 2).min(MAX_INTERVAL);
        self.message = format!("Auto-play interval {} ms", self.interval.as_millis());
    }

    pub fn next_program(&mut self) {
        if self.program_loaded_from_source {
            self.message = "Cannot switch tapes when loaded from file/stdin.".to_string();
            return;
        }
        let count = ProgramManager::count();
        self.current_program_index = (self.current_program_index + 1) % count;
        self.load_current_program();
    }

    pub fn previous_program(&mut self) {
        if self.program_loaded_from_source {
            self.message = "Cannot switch tapes when loaded from file/stdin.".to_string();
            return;
        }
        let count = ProgramManager::count();
        self.current_program_index = if self.current_program_index == 0 {
            count - 1
        } else {
            self.current_program_index - 1
        };
        self.load_current_program();
    }

    fn load_current_program(&mut self) {
        let loaded = ProgramManager::get_program_by_index(self.current_program_index)
            .map_err(|e| e.to_string())
            .and_then(|program| Ok((ready_machine(program.tape.clone())?, program)));

        match loaded {
            Ok((machine, program)) => {
                self.machine = machine;
                self.message = format!("Loaded tape: {}", program.name);
                self.program_name = program.name;
                self.program_content = program.text.to_string();
            }
            Err(e) => self.message = format!("Failed to load tape: {}", e),
        }
        self.auto_play = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

/// Creates a machine and moves its head into the data region, rejecting malformed tapes.
fn ready_machine(tape: Tape) -> Result<UniversalMachine, String> {
    let mut machine = UniversalMachine::new(tape);
    machine
        .initialize()
        .map_err(|e| format!("Failed to load tape: {}", e))?;
    Ok(machine)
}

fn section<'a>(title: &'a str, content: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(content).block(block(title))
}

fn block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .padding(BLOCK_PADDING)
}
