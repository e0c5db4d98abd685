//! High score persistence.
//!
//! The store holds one integer. Loading never fails from the game's point of
//! view: [`load_or_default`] turns a missing or corrupt store into 0.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

const APP_DIR: &str = "homemade-tetris";
const FILENAME: &str = "high_score.txt";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("high score file {path} does not hold a number: {content:?}")]
    Parse { path: PathBuf, content: String },
}

pub trait HighScoreStore {
    fn load(&self) -> Result<u32, StoreError>;

    /// Overwrites the stored value.
    fn save(&self, score: u32) -> Result<(), StoreError>;
}

pub fn load_or_default(store: &dyn HighScoreStore) -> u32 {
    store.load().unwrap_or(0)
}

// ============================================================================
// File store
// ============================================================================

/// A plain text file holding the score as a decimal number.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/homemade-tetris/high_score.txt`, falling back to
    /// `$HOME/.config` and then the working directory.
    pub fn in_config_dir() -> Self {
        let base = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
            _ => std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from(".")),
        };
        Self::new(base.join(APP_DIR).join(FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> Result<u32, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        content.trim().parse().map_err(|_| StoreError::Parse {
            path: self.path.clone(),
            content,
        })
    }

    fn save(&self, score: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, score.to_string()).map_err(|e| self.io_error(e))
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn new(initial: u32) -> Self {
        Self {
            value: Rc::new(Cell::new(initial)),
        }
    }

    pub fn get(&self) -> u32 {
        self.value.get()
    }

    pub fn set(&self, score: u32) {
        self.value.set(score);
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(self.value.get())
    }

    fn save(&self, score: u32) -> Result<(), StoreError> {
        self.value.set(score);
        Ok(())
    }
}
