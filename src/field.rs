//! Field module - the grid of landed blocks
//!
//! Landed blocks live in an arena owned by the field; grid cells hold a
//! [`BlockId`] into that arena. A block killed by a line clear is unlinked from
//! the grid immediately and its arena slot is released by the next
//! [`Field::sweep`].
//!
//! Coordinates: x grows to the right in `0..FIELD_W`, y grows downward in
//! `0..FIELD_H`. Rows with negative y sit above the visible grid and never
//! collide.

use crate::config::{FIELD_H, FIELD_W};
use crate::shapes::{Position, Skin};

// ============================================================================
// Block
// ============================================================================

/// A single cell of a tetromino.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Block {
    pub position: Position,
    pub skin: Skin,
    alive: bool,
}

impl Block {
    pub fn new(position: Position, skin: Skin) -> Self {
        Self {
            position,
            skin,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Key of a landed block in the field arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlockId(usize);

// ============================================================================
// Field
// ============================================================================

#[derive(Clone, Debug)]
pub struct Field {
    grid: [[Option<BlockId>; FIELD_W]; FIELD_H],
    slots: Vec<Option<Block>>,
    free: Vec<usize>,
}

impl Field {
    pub fn new() -> Self {
        Self {
            grid: [[None; FIELD_W]; FIELD_H],
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Grid index of `pos`, or None when it lies outside the visible grid.
    fn index(pos: Position) -> Option<(usize, usize)> {
        if pos.x < 0 || pos.y < 0 || pos.x >= FIELD_W as i16 || pos.y >= FIELD_H as i16 {
            return None;
        }
        Some((pos.x as usize, pos.y as usize))
    }

    pub fn is_out_of_bounds(&self, pos: Position) -> bool {
        pos.x < 0 || pos.x >= FIELD_W as i16 || pos.y >= FIELD_H as i16
    }

    /// True if a landed block sits at `pos`. Rows above the grid are never occupied.
    pub fn is_occupied(&self, pos: Position) -> bool {
        Self::index(pos).is_some_and(|(x, y)| self.grid[y][x].is_some())
    }

    pub fn collides(&self, pos: Position) -> bool {
        self.is_out_of_bounds(pos) || self.is_occupied(pos)
    }

    /// Hands the blocks of a landed piece over to the field.
    pub fn place_landed_blocks(&mut self, blocks: [Block; 4]) {
        for block in blocks {
            self.place_block(block);
        }
    }

    /// Stores `block` in the cell matching its position.
    ///
    /// Returns None, dropping the block, when the position is outside the grid
    /// or the cell is already taken.
    pub fn place_block(&mut self, block: Block) -> Option<BlockId> {
        let (x, y) = Self::index(block.position)?;
        if self.grid[y][x].is_some() {
            return None;
        }
        let id = self.alloc(block);
        self.grid[y][x] = Some(id);
        Some(id)
    }

    fn alloc(&mut self, block: Block) -> BlockId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(block);
                BlockId(slot)
            }
            None => {
                self.slots.push(Some(block));
                BlockId(self.slots.len() - 1)
            }
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Block in cell (x, y), if any.
    pub fn cell(&self, x: usize, y: usize) -> Option<&Block> {
        let id = (*self.grid.get(y)?.get(x)?)?;
        self.block(id)
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.grid
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.grid
            .get(y)
            .map_or(0, |row| row.iter().filter(|cell| cell.is_some()).count())
    }

    pub fn total_filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.total_filled_cells() == 0
    }

    /// Number of arena slots holding a block, dead blocks awaiting sweep included.
    pub fn stored_blocks(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Removes full rows and compacts the remaining rows toward the floor.
    ///
    /// Rows are scanned bottom-up while a write row, starting at the floor,
    /// receives each non-full row. Blocks in full rows are killed. Every row
    /// above the final write row is reset, so no stale id outlives the pass.
    /// Returns the number of full rows found.
    pub fn clear_full_lines_and_compact(&mut self) -> u32 {
        let mut cleared = 0;
        let mut write = FIELD_H;

        for y in (0..FIELD_H).rev() {
            if self.is_row_full(y) {
                for x in 0..FIELD_W {
                    if let Some(id) = self.grid[y][x].take() {
                        if let Some(block) = self.block_mut(id) {
                            block.alive = false;
                        }
                    }
                }
                cleared += 1;
                continue;
            }

            write -= 1;
            for x in 0..FIELD_W {
                let cell = self.grid[y][x].take();
                if let Some(id) = cell {
                    if let Some(block) = self.block_mut(id) {
                        block.position = Position::new(x as i16, write as i16);
                    }
                }
                self.grid[write][x] = cell;
            }
        }

        for row in &mut self.grid[..write] {
            row.fill(None);
        }

        cleared
    }

    /// Releases the arena slots of dead blocks. Returns how many were released.
    pub fn sweep(&mut self) -> usize {
        let mut released = 0;
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if entry.is_some_and(|block| !block.alive) {
                *entry = None;
                self.free.push(slot);
                released += 1;
            }
        }
        released
    }

    /// Skin of every cell, row-major, for rendering.
    pub fn occupancy(&self) -> Vec<Vec<Option<Skin>>> {
        (0..FIELD_H)
            .map(|y| {
                (0..FIELD_W)
                    .map(|x| self.cell(x, y).map(|block| block.skin))
                    .collect()
            })
            .collect()
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}
