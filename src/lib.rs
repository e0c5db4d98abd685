//! Falling-block puzzle engine.
//!
//! The engine is pure game logic: the only I/O it performs goes through the
//! injected [`high_score::HighScoreStore`]. Rendering, input and timing live in
//! the binary.

pub mod config;
pub mod field;
pub mod game;
pub mod high_score;
pub mod shapes;
pub mod tetromino;

pub use field::{Block, BlockId, Field};
pub use game::{CellState, Command, Game, GameEvent, GameState, Snapshot, Timers};
pub use high_score::{FileStore, HighScoreStore, MemoryStore, StoreError};
pub use shapes::{Direction, Position, Skin, TetrominoType};
pub use tetromino::Tetromino;
