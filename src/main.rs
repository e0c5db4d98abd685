mod input;
mod ui;

use std::io::{self, stdout, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

use homemade_tetris::config::{ANIM_TIME_INTERVAL, FAST_ANIM_TIME_INTERVAL, FPS};
use homemade_tetris::game::RandomPieceProvider;
use homemade_tetris::{
    Command, FileStore, Game, GameState, HighScoreStore, MemoryStore, Timers,
};
use input::{key_to_action, Action, AutoRepeat};

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(name = "homemade-tetris", version, about)]
struct Args {
    /// File holding the high score. Defaults to the user config directory.
    #[arg(long, value_name = "FILE")]
    high_score_file: Option<PathBuf>,

    /// Keep the high score in memory only.
    #[arg(long, conflicts_with = "high_score_file")]
    no_save: bool,

    /// Seed for the piece generator, for a repeatable sequence.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Hide the landing preview under the falling piece.
    #[arg(long)]
    no_ghost: bool,
}

/// A repeating timer polled once per frame.
struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    /// True if the timer fired since the last poll. Missed periods collapse
    /// into one.
    fn fired(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        while self.next <= now {
            self.next += self.period;
        }
        true
    }
}

type Term = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<()> {
    let args = Args::parse();

    let store: Box<dyn HighScoreStore> = if args.no_save {
        Box::new(MemoryStore::default())
    } else {
        Box::new(
            args.high_score_file
                .clone()
                .map(FileStore::new)
                .unwrap_or_else(FileStore::in_config_dir),
        )
    };
    let provider = match args.seed {
        Some(seed) => RandomPieceProvider::seeded(seed),
        None => RandomPieceProvider::new(),
    };
    let mut game = Game::with_provider(Box::new(provider), store);

    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    let mut terminal = setup_terminal(enhanced).context("failed to set up terminal")?;
    let result = run(&mut terminal, &mut game, &args, enhanced);
    restore_terminal(enhanced).context("failed to restore terminal")?;
    result
}

fn setup_terminal(enhanced: bool) -> io::Result<Term> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    if enhanced {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    Terminal::new(CrosstermBackend::new(out))
}

fn restore_terminal(enhanced: bool) -> io::Result<()> {
    let mut out = stdout();
    if enhanced {
        execute!(out, PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(out, LeaveAlternateScreen)
}

// ============================================================================
// Main Loop
// ============================================================================

/// Input, then simulation, then drawing, once per frame.
fn run(terminal: &mut Term, game: &mut Game, args: &Args, enhanced: bool) -> Result<()> {
    let frame_budget = Duration::from_secs(1) / FPS;
    let start = Instant::now();
    let mut normal = Interval::new(ANIM_TIME_INTERVAL, start);
    let mut fast = Interval::new(FAST_ANIM_TIME_INTERVAL, start);
    let mut repeat = AutoRepeat::default();
    let mut status = String::new();

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                let now = Instant::now();
                let action = key_to_action(key);
                match action {
                    Action::Quit => return Ok(()),
                    Action::StopLeft => repeat.release(Command::MoveLeft),
                    Action::StopRight => repeat.release(Command::MoveRight),
                    Action::MoveLeft | Action::MoveRight => {
                        if let Some(command) = action.command() {
                            game.control(command, now);
                            // Without release events the terminal's own key
                            // repeat stands in for ours.
                            if enhanced {
                                repeat.press(command, now);
                            }
                        }
                    }
                    _ => {
                        if let Some(command) = action.command() {
                            game.control(command, now);
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        let timers = Timers {
            normal: normal.fired(now),
            fast: fast.fired(now),
        };
        game.update(timers, now);
        if game.state() == GameState::Playing {
            if let Some(command) = repeat.poll(now) {
                game.control(command, now);
            }
        }

        for event in game.take_events() {
            if let Some(text) = ui::describe(&event) {
                status = text;
            }
        }

        let snapshot = game.snapshot(now);
        terminal.draw(|frame| ui::render(frame, &snapshot, &status, !args.no_ghost))?;

        let remaining = frame_budget.saturating_sub(frame_start.elapsed());
        if !remaining.is_zero() {
            // Wakes early on input; the event is read next frame.
            event::poll(remaining)?;
        }
    }
}
