use crate::config::{INIT_POS_OFFSET, NEXT_POS_OFFSET};
use crate::field::{Block, Field};
use crate::shapes::{Direction, Position, Skin, TetrominoType};

/// Wall kicks tried, in order, when a rotation collides.
const KICKS: [Position; 2] = [Position::new(-1, 0), Position::new(1, 0)];

/// A falling piece of four blocks.
///
/// The piece owns its blocks until it lands; [`Tetromino::into_blocks`] hands
/// them to the field.
#[derive(Clone, Debug)]
pub struct Tetromino {
    shape: TetrominoType,
    skin: Skin,
    blocks: [Block; 4],
    landing: bool,
    current: bool,
}

impl Tetromino {
    /// A piece at the spawn origin. `current` selects whether it is the active
    /// piece or the next-piece preview.
    pub fn new(shape: TetrominoType, skin: Skin, current: bool) -> Self {
        let mut piece = Self::at(shape, skin, INIT_POS_OFFSET.into());
        piece.current = current;
        piece
    }

    /// An active piece whose pivot block sits at `origin`.
    pub fn at(shape: TetrominoType, skin: Skin, origin: Position) -> Self {
        Self {
            shape,
            skin,
            blocks: shape.cells_at(origin).map(|pos| Block::new(pos, skin)),
            landing: false,
            current: true,
        }
    }

    pub fn shape(&self) -> TetrominoType {
        self.shape
    }

    pub fn skin(&self) -> Skin {
        self.skin
    }

    pub fn is_landing(&self) -> bool {
        self.landing
    }

    pub fn is_current(&self) -> bool {
        self.current
    }

    pub fn make_current(&mut self) {
        self.current = true;
    }

    pub fn positions(&self) -> [Position; 4] {
        self.blocks.map(|block| block.position)
    }

    /// Position of block 0, the rotation pivot.
    pub fn lead(&self) -> Position {
        self.blocks[0].position
    }

    /// Where the piece is drawn while it waits as the next piece.
    pub fn preview_positions(&self) -> [Position; 4] {
        self.shape.cells_at(NEXT_POS_OFFSET.into())
    }

    pub fn is_collide(&self, candidates: &[Position; 4], field: &Field) -> bool {
        candidates.iter().any(|&pos| field.collides(pos))
    }

    fn commit(&mut self, positions: [Position; 4]) {
        for (block, pos) in self.blocks.iter_mut().zip(positions) {
            block.position = pos;
        }
    }

    /// Moves every block one step in `direction`, or none of them.
    /// A blocked downward move marks the piece as landing.
    pub fn move_in(&mut self, direction: Direction, field: &Field) -> bool {
        let step = direction.vector();
        let candidates = self.positions().map(|pos| pos + step);

        if !self.is_collide(&candidates, field) {
            self.commit(candidates);
            return true;
        }
        if direction == Direction::Down {
            self.landing = true;
        }
        false
    }

    /// Turns the piece 90° around block 0, kicking one cell left or right if
    /// needed. Either every block turns or none does.
    pub fn rotate(&mut self, field: &Field) -> bool {
        let pivot = self.lead();
        let rotated = self.positions().map(|pos| (pos - pivot).rotated() + pivot);

        if !self.is_collide(&rotated, field) {
            self.commit(rotated);
            return true;
        }

        for kick in KICKS {
            let kicked = rotated.map(|pos| pos + kick);
            if !self.is_collide(&kicked, field) {
                self.commit(kicked);
                return true;
            }
        }
        false
    }

    /// Drops the piece until it lands. Returns the number of rows fallen.
    pub fn hard_drop(&mut self, field: &Field) -> u32 {
        let mut rows = 0;
        while !self.landing {
            if self.move_in(Direction::Down, field) {
                rows += 1;
            }
        }
        rows
    }

    /// Where the piece would come to rest if dropped now. Does not move it.
    pub fn ghost_positions(&self, field: &Field) -> [Position; 4] {
        let step = Direction::Down.vector();
        let mut ghost = self.positions();
        loop {
            let below = ghost.map(|pos| pos + step);
            if self.is_collide(&below, field) {
                return ghost;
            }
            ghost = below;
        }
    }

    /// One gravity step.
    pub fn update(&mut self, field: &Field) -> bool {
        self.move_in(Direction::Down, field)
    }

    pub fn into_blocks(self) -> [Block; 4] {
        self.blocks
    }
}
