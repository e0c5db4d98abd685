//! Key bindings and held-key auto-repeat.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use homemade_tetris::config::{MOVE_DELAY, MOVE_INTERVAL};
use homemade_tetris::Command;

/// Action from a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    StopLeft,
    StopRight,
    Rotate,
    SpeedUp(bool),
    HardDrop,
    Pause,
    Forfeit,
    Confirm(bool),
    Restart,
    Quit,
    None,
}

impl Action {
    /// The engine command this action sends, if any.
    pub fn command(self) -> Option<Command> {
        match self {
            Action::MoveLeft => Some(Command::MoveLeft),
            Action::MoveRight => Some(Command::MoveRight),
            Action::Rotate => Some(Command::Rotate),
            Action::SpeedUp(on) => Some(Command::SpeedUp(on)),
            Action::HardDrop => Some(Command::HardDrop),
            Action::Pause => Some(Command::TogglePause),
            Action::Forfeit => Some(Command::Forfeit),
            Action::Confirm(yes) => Some(Command::ConfirmForfeit(yes)),
            Action::Restart => Some(Command::Restart),
            Action::StopLeft | Action::StopRight | Action::Quit | Action::None => None,
        }
    }
}

/// Map a key event to an action. Release events only matter for the keys
/// that are held: left, right and down. Terminal-generated repeats are
/// ignored; [`AutoRepeat`] paces held moves instead.
pub fn key_to_action(key: KeyEvent) -> Action {
    match key.kind {
        KeyEventKind::Press => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
            KeyCode::Left | KeyCode::Char('a') => Action::MoveLeft,
            KeyCode::Right | KeyCode::Char('d') => Action::MoveRight,
            KeyCode::Up | KeyCode::Char('w') => Action::Rotate,
            KeyCode::Down | KeyCode::Char('s') => Action::SpeedUp(true),
            KeyCode::Char(' ') => Action::HardDrop,
            KeyCode::Char('p') => Action::Pause,
            KeyCode::Char('f') => Action::Forfeit,
            KeyCode::Char('y') => Action::Confirm(true),
            KeyCode::Char('n') => Action::Confirm(false),
            KeyCode::Char('r') => Action::Restart,
            _ => Action::None,
        },
        KeyEventKind::Release => match key.code {
            KeyCode::Left | KeyCode::Char('a') => Action::StopLeft,
            KeyCode::Right | KeyCode::Char('d') => Action::StopRight,
            KeyCode::Down | KeyCode::Char('s') => Action::SpeedUp(false),
            _ => Action::None,
        },
        KeyEventKind::Repeat => Action::None,
    }
}

#[derive(Debug, Clone, Copy)]
struct Held {
    command: Command,
    last_fire: Instant,
    initial: bool,
}

/// Repeats a held left/right move: first after [`MOVE_DELAY`], then every
/// [`MOVE_INTERVAL`].
#[derive(Debug, Default)]
pub struct AutoRepeat {
    held: Option<Held>,
}

impl AutoRepeat {
    /// The key went down and its immediate move has already been sent.
    pub fn press(&mut self, command: Command, now: Instant) {
        self.held = Some(Held {
            command,
            last_fire: now,
            initial: true,
        });
    }

    pub fn release(&mut self, command: Command) {
        if self.held.is_some_and(|held| held.command == command) {
            self.held = None;
        }
    }

    /// The command to repeat at `now`, if one is due.
    pub fn poll(&mut self, now: Instant) -> Option<Command> {
        let held = self.held.as_mut()?;
        let delay = if held.initial { MOVE_DELAY } else { MOVE_INTERVAL };
        if now.saturating_duration_since(held.last_fire) < delay {
            return None;
        }
        held.last_fire = now;
        held.initial = false;
        Some(held.command)
    }
}
