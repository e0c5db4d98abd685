use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{FIELD_H, FIELD_W, INIT_POS_OFFSET, POINTS_PER_LINES, RESTART_DELAY};
use crate::field::Field;
use crate::high_score::{load_or_default, HighScoreStore};
use crate::shapes::{Direction, Position, Skin, TetrominoType};
use crate::tetromino::Tetromino;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    Paused,
    ForfeitConfirm,
    GameOver,
}

/// Discrete player commands accepted by [`Game::control`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    /// Key-down engages the fast timer, key-up releases it.
    SpeedUp(bool),
    HardDrop,
    TogglePause,
    Forfeit,
    ConfirmForfeit(bool),
    Restart,
}

/// Which timers fired since the previous frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Timers {
    pub normal: bool,
    pub fast: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    HardDropped(u32),
    PieceLanded,
    LinesCleared(u32),
    ScoreAwarded(u32),
    Paused,
    Unpaused,
    ForfeitPrompted,
    ForfeitCancelled,
    GameOver { score: u32, new_high_score: bool },
    HighScoreSaveFailed(String),
    GameRestarted,
}

/// Points for `lines` cleared in a single tick. Counts past four score as four.
pub fn points_for_lines(lines: u32) -> u32 {
    let index = (lines as usize).min(POINTS_PER_LINES.len() - 1);
    POINTS_PER_LINES[index]
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> (TetrominoType, Skin);
}

pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> (TetrominoType, Skin) {
        (
            TetrominoType::random(&mut self.rng),
            Skin::random(&mut self.rng),
        )
    }
}

/// Replays a fixed list of pieces, cycling when it runs out.
pub struct SequencePieceProvider {
    pieces: Vec<(TetrominoType, Skin)>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        Self::with_skins(pieces.into_iter().map(|shape| (shape, Skin::default())).collect())
    }

    pub fn with_skins(pieces: Vec<(TetrominoType, Skin)>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> (TetrominoType, Skin) {
        if self.pieces.is_empty() {
            return (TetrominoType::O, Skin::default());
        }
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Round
// ============================================================================

/// Everything that restarts with a new game.
struct Round {
    field: Field,
    active: Tetromino,
    next: Tetromino,
    score: u32,
    high_score: u32,
    full_lines: u32,
    speed_up: bool,
    state: GameState,
    game_over_at: Option<Instant>,
}

impl Round {
    fn start(provider: &mut dyn PieceProvider, store: &dyn HighScoreStore) -> Self {
        let (shape, skin) = provider.next_piece();
        let active = Tetromino::new(shape, skin, true);
        Self::with_field(Field::new(), active, provider, store)
    }

    fn with_field(
        field: Field,
        active: Tetromino,
        provider: &mut dyn PieceProvider,
        store: &dyn HighScoreStore,
    ) -> Self {
        let (shape, skin) = provider.next_piece();
        Self {
            field,
            active,
            next: Tetromino::new(shape, skin, false),
            score: 0,
            high_score: load_or_default(store),
            full_lines: 0,
            speed_up: false,
            state: GameState::Playing,
            game_over_at: None,
        }
    }
}

// ============================================================================
// Render snapshot
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellState {
    Empty,
    Filled(Skin),
    Ghost(Skin),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PieceView {
    pub shape: TetrominoType,
    pub skin: Skin,
    pub positions: [Position; 4],
}

/// Read-only view of the engine for the render layer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Snapshot {
    pub field: Vec<Vec<Option<Skin>>>,
    pub active: PieceView,
    /// Positions are at the preview origin, outside the field.
    pub next: PieceView,
    pub ghost: [Position; 4],
    pub score: u32,
    pub high_score: u32,
    pub state: GameState,
    pub speed_up: bool,
    pub game_over_elapsed: Option<Duration>,
    pub can_restart: bool,
}

impl Snapshot {
    pub fn is_paused(&self) -> bool {
        matches!(self.state, GameState::Paused | GameState::ForfeitConfirm)
    }

    pub fn is_forfeit_prompt(&self) -> bool {
        self.state == GameState::ForfeitConfirm
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// The field with the ghost (optionally) and then the active piece drawn
    /// over it.
    pub fn render_grid(&self, with_ghost: bool) -> Vec<Vec<CellState>> {
        let mut visual: Vec<Vec<CellState>> = self
            .field
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(CellState::Empty, CellState::Filled))
                    .collect()
            })
            .collect();

        let skin = self.active.skin;
        let mut paint = |positions: &[Position; 4], cell: CellState| {
            for pos in positions {
                let in_grid = pos.x >= 0
                    && pos.y >= 0
                    && (pos.x as usize) < FIELD_W
                    && (pos.y as usize) < FIELD_H;
                if in_grid {
                    visual[pos.y as usize][pos.x as usize] = cell;
                }
            }
        };
        if with_ghost {
            paint(&self.ghost, CellState::Ghost(skin));
        }
        paint(&self.active.positions, CellState::Filled(skin));

        visual
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    round: Round,
    piece_provider: Box<dyn PieceProvider>,
    store: Box<dyn HighScoreStore>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(store: Box<dyn HighScoreStore>) -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::new()), store)
    }

    pub fn with_provider(
        mut provider: Box<dyn PieceProvider>,
        store: Box<dyn HighScoreStore>,
    ) -> Self {
        let round = Round::start(provider.as_mut(), store.as_ref());
        Self {
            round,
            piece_provider: provider,
            store,
            events: Vec::new(),
        }
    }

    /// Starts from a prepared field and active piece. The next piece comes
    /// from `provider`.
    pub fn with_field(
        field: Field,
        active: Tetromino,
        mut provider: Box<dyn PieceProvider>,
        store: Box<dyn HighScoreStore>,
    ) -> Self {
        let round = Round::with_field(field, active, provider.as_mut(), store.as_ref());
        Self {
            round,
            piece_provider: provider,
            store,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> GameState {
        self.round.state
    }

    pub fn is_game_over(&self) -> bool {
        self.round.state == GameState::GameOver
    }

    pub fn score(&self) -> u32 {
        self.round.score
    }

    pub fn high_score(&self) -> u32 {
        self.round.high_score
    }

    pub fn is_speed_up(&self) -> bool {
        self.round.speed_up
    }

    pub fn field(&self) -> &Field {
        &self.round.field
    }

    /// Direct access to the grid, for fixtures and tools.
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.round.field
    }

    pub fn active(&self) -> &Tetromino {
        &self.round.active
    }

    pub fn next(&self) -> &Tetromino {
        &self.round.next
    }

    pub fn ghost_positions(&self) -> [Position; 4] {
        self.round.active.ghost_positions(&self.round.field)
    }

    pub fn game_over_elapsed(&self, now: Instant) -> Option<Duration> {
        self.round
            .game_over_at
            .map(|at| now.saturating_duration_since(at))
    }

    pub fn can_restart(&self, now: Instant) -> bool {
        self.is_game_over()
            && self
                .game_over_elapsed(now)
                .is_some_and(|elapsed| elapsed >= RESTART_DELAY)
    }

    // ------------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------------

    /// Runs one frame. At most one simulation step happens: the fast timer
    /// drives it while speed-up is engaged, the normal timer otherwise.
    pub fn update(&mut self, timers: Timers, now: Instant) {
        if self.round.state == GameState::Playing {
            let trigger = if self.round.speed_up {
                timers.fast
            } else {
                timers.normal
            };
            if trigger {
                self.step(now);
            }
        }
        self.round.field.sweep();
    }

    /// A frame where only one of the two timers fired.
    pub fn tick(&mut self, fast: bool, now: Instant) {
        self.update(
            Timers {
                normal: !fast,
                fast,
            },
            now,
        );
    }

    fn step(&mut self, now: Instant) {
        let round = &mut self.round;
        let cleared = round.field.clear_full_lines_and_compact();
        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared(cleared));
        }
        round.full_lines += cleared;

        round.active.update(&round.field);
        if round.active.is_landing() {
            self.land(now);
        }
        self.award_score();
    }

    fn award_score(&mut self) {
        let points = points_for_lines(self.round.full_lines);
        self.round.score += points;
        self.round.full_lines = 0;
        if points > 0 {
            self.events.push(GameEvent::ScoreAwarded(points));
        }
    }

    /// A piece that lands with its lead block still on the spawn row ends the
    /// game before anything is written to the field.
    fn land(&mut self, now: Instant) {
        if self.round.active.lead().y == INIT_POS_OFFSET.1 {
            self.enter_game_over(now);
            return;
        }

        let (shape, skin) = self.piece_provider.next_piece();
        let round = &mut self.round;
        let mut promoted = std::mem::replace(&mut round.next, Tetromino::new(shape, skin, false));
        promoted.make_current();
        let landed = std::mem::replace(&mut round.active, promoted);
        round.field.place_landed_blocks(landed.into_blocks());
        round.speed_up = false;
        self.events.push(GameEvent::PieceLanded);
    }

    fn enter_game_over(&mut self, now: Instant) {
        let round = &mut self.round;
        round.state = GameState::GameOver;
        round.game_over_at = Some(now);

        let score = round.score;
        let new_high_score = score > round.high_score;
        if new_high_score {
            round.high_score = score;
            if let Err(err) = self.store.save(score) {
                self.events.push(GameEvent::HighScoreSaveFailed(err.to_string()));
            }
        }
        self.events.push(GameEvent::GameOver {
            score,
            new_high_score,
        });
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn control(&mut self, command: Command, now: Instant) {
        match (self.round.state, command) {
            (GameState::GameOver, Command::Restart) => {
                if self.can_restart(now) {
                    self.reset();
                }
            }
            (GameState::GameOver, _) => {}

            (GameState::ForfeitConfirm, Command::ConfirmForfeit(true)) => {
                self.enter_game_over(now);
            }
            (GameState::ForfeitConfirm, Command::ConfirmForfeit(false)) => {
                self.round.state = GameState::Playing;
                self.events.push(GameEvent::ForfeitCancelled);
            }
            (GameState::ForfeitConfirm, _) => {}

            (GameState::Playing | GameState::Paused, Command::Forfeit) => {
                self.round.state = GameState::ForfeitConfirm;
                self.events.push(GameEvent::ForfeitPrompted);
            }
            (GameState::Playing, Command::TogglePause) => {
                self.round.state = GameState::Paused;
                self.events.push(GameEvent::Paused);
            }
            (GameState::Paused, Command::TogglePause) => {
                self.round.state = GameState::Playing;
                self.events.push(GameEvent::Unpaused);
            }
            (GameState::Paused, _) => {}

            (GameState::Playing, command) => self.dispatch(command),
        }
    }

    /// Applies a piece command while playing. A piece that has already landed
    /// (after a hard drop, before the next tick) no longer moves.
    fn dispatch(&mut self, command: Command) {
        let round = &mut self.round;
        if let Command::SpeedUp(on) = command {
            round.speed_up = on;
            return;
        }
        if round.active.is_landing() {
            return;
        }

        match command {
            Command::MoveLeft => {
                if round.active.move_in(Direction::Left, &round.field) {
                    self.events.push(GameEvent::PieceMoved);
                }
            }
            Command::MoveRight => {
                if round.active.move_in(Direction::Right, &round.field) {
                    self.events.push(GameEvent::PieceMoved);
                }
            }
            Command::Rotate => {
                if round.active.rotate(&round.field) {
                    self.events.push(GameEvent::PieceRotated);
                }
            }
            Command::HardDrop => {
                let rows = round.active.hard_drop(&round.field);
                self.events.push(GameEvent::HardDropped(rows));
            }
            _ => {}
        }
    }

    /// Starts a new game. The high score is reloaded from the store, not
    /// carried over from memory.
    pub fn reset(&mut self) {
        self.round = Round::start(self.piece_provider.as_mut(), self.store.as_ref());
        self.events.push(GameEvent::GameRestarted);
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn snapshot(&self, now: Instant) -> Snapshot {
        let round = &self.round;
        Snapshot {
            field: round.field.occupancy(),
            active: PieceView {
                shape: round.active.shape(),
                skin: round.active.skin(),
                positions: round.active.positions(),
            },
            next: PieceView {
                shape: round.next.shape(),
                skin: round.next.skin(),
                positions: round.next.preview_positions(),
            },
            ghost: self.ghost_positions(),
            score: round.score,
            high_score: round.high_score,
            state: round.state,
            speed_up: round.speed_up,
            game_over_elapsed: self.game_over_elapsed(now),
            can_restart: self.can_restart(now),
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::field::Block;
    use crate::high_score::MemoryStore;

    pub fn empty_field() -> Field {
        Field::new()
    }

    pub fn fill_cell(field: &mut Field, x: usize, y: usize) {
        field.place_block(Block::new(Position::new(x as i16, y as i16), Skin(1)));
    }

    pub fn fill_row(field: &mut Field, y: usize) {
        for x in 0..FIELD_W {
            fill_cell(field, x, y);
        }
    }

    pub fn fill_row_with_gap(field: &mut Field, y: usize, gap_x: usize) {
        for x in 0..FIELD_W {
            if x != gap_x {
                fill_cell(field, x, y);
            }
        }
    }

    /// A game over `field` with `active` falling, pieces from `next`, and an
    /// in-memory store seeded with `high_score`. The store handle is shared.
    pub fn game_with(
        field: Field,
        active: Tetromino,
        next: Vec<TetrominoType>,
        high_score: u32,
    ) -> (Game, MemoryStore) {
        let store = MemoryStore::new(high_score);
        let game = Game::with_field(
            field,
            active,
            Box::new(SequencePieceProvider::new(next)),
            Box::new(store.clone()),
        );
        (game, store)
    }
}
