use std::ops::{Add, Sub};

use rand::Rng;

use crate::config::SKIN_COUNT;

// ============================================================================
// Geometry
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// 90° turn of this offset: (dx, dy) -> (-dy, dx).
    pub const fn rotated(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }
}

impl From<(i16, i16)> for Position {
    fn from((x, y): (i16, i16)) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    pub const fn vector(self) -> Position {
        match self {
            Direction::Left => Position::new(-1, 0),
            Direction::Right => Position::new(1, 0),
            Direction::Down => Position::new(0, 1),
        }
    }
}

// ============================================================================
// Shape table
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoType {
    pub const ALL: [Self; 7] = [
        TetrominoType::I,
        TetrominoType::O,
        TetrominoType::T,
        TetrominoType::S,
        TetrominoType::Z,
        TetrominoType::J,
        TetrominoType::L,
    ];

    /// Offsets of the four cells relative to the piece origin.
    /// The first entry is always (0, 0) and serves as the rotation pivot.
    pub const fn offsets(self) -> [(i16, i16); 4] {
        match self {
            TetrominoType::T => [(0, 0), (-1, 0), (1, 0), (0, -1)],
            TetrominoType::O => [(0, 0), (0, -1), (1, 0), (1, -1)],
            TetrominoType::J => [(0, 0), (-1, 0), (0, -1), (0, -2)],
            TetrominoType::L => [(0, 0), (1, 0), (0, -1), (0, -2)],
            TetrominoType::I => [(0, 0), (0, 1), (0, -1), (0, -2)],
            TetrominoType::S => [(0, 0), (-1, 0), (0, -1), (1, -1)],
            TetrominoType::Z => [(0, 0), (1, 0), (0, -1), (-1, -1)],
        }
    }

    /// Cell positions of this shape placed at `origin`.
    pub fn cells_at(self, origin: Position) -> [Position; 4] {
        self.offsets().map(|offset| origin + Position::from(offset))
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Visual skin index; the render layer maps it to a color or sprite.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Skin(pub u8);

impl Skin {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Skin(rng.gen_range(0..SKIN_COUNT))
    }
}
