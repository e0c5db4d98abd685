use std::time::Duration;

// ============================================================================
// Field
// ============================================================================

pub const FIELD_W: usize = 10;
pub const FIELD_H: usize = 20;
/// Edge of one cell in pixels, for graphical front ends.
pub const TILE_SIZE: u16 = 50;

// ============================================================================
// Timing
// ============================================================================

pub const ANIM_TIME_INTERVAL: Duration = Duration::from_millis(150);
pub const FAST_ANIM_TIME_INTERVAL: Duration = Duration::from_millis(15);
pub const FPS: u32 = 60;

/// Minimum time between game over and an accepted restart.
pub const RESTART_DELAY: Duration = Duration::from_millis(500);

// Held left/right auto-repeat
pub const MOVE_DELAY: Duration = Duration::from_millis(150);
pub const MOVE_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Pieces
// ============================================================================

/// Spawn origin of the active piece: top row, horizontally centered.
pub const INIT_POS_OFFSET: (i16, i16) = (FIELD_W as i16 / 2 - 1, 0);

/// Origin of the next-piece preview, to the right of the field.
pub const NEXT_POS_OFFSET: (i16, i16) = (FIELD_W as i16 * 13 / 10, FIELD_H as i16 * 45 / 100);

/// Number of distinct visual skins a piece can be drawn with.
pub const SKIN_COUNT: u8 = 7;

// ============================================================================
// Scoring
// ============================================================================

/// Points awarded by the number of lines cleared in one tick.
pub const POINTS_PER_LINES: [u32; 5] = [0, 100, 250, 500, 1000];
