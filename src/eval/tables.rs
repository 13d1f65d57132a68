//! Positional tables, indexed by raw 12x12 board offset. Border entries
//! are zero so no translation is needed.
//!
//! Asymmetric tables are stored once and "rotated" for the other color by
//! indexing with `143 - offset` (the board's point reflection).

use crate::score::Score;

pub(crate) const TABLE_SIZE: usize = 144;

/// Rotated index for the other color's view of an asymmetric table.
#[inline]
#[must_use]
pub(crate) const fn rotated(ofs: i32) -> usize {
    (143 - ofs) as usize
}

// Opening/midgame king tables: cautious (used while the opponent retains
// serious attacking material) for each side.
pub(crate) const WHITE_KING_CAUTIOUS: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0,   10,  12,  13, -17, -16, -18,  13,  10,   0, 0,
    0, 0,   -5,  -7, -10, -20, -20, -10,  -7,  -5,   0, 0,
    0, 0,  -30, -40, -40, -45, -45, -40, -40, -30,   0, 0,
    0, 0,  -50, -55, -60, -65, -65, -60, -55, -50,   0, 0,
    0, 0,  -55, -60, -65, -75, -75, -65, -60, -55,   0, 0,
    0, 0,  -70, -80, -90, -100, -100, -90, -80, -70, 0, 0,
    0, 0, -250, -240, -230, -220, -220, -230, -240, -250, 0, 0,
    0, 0, -350, -340, -330, -320, -320, -330, -340, -350, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

pub(crate) const BLACK_KING_CAUTIOUS: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0, -350, -340, -330, -320, -320, -330, -340, -350, 0, 0,
    0, 0, -250, -240, -230, -220, -220, -230, -240, -250, 0, 0,
    0, 0,  -70, -80, -90, -100, -100, -90, -80, -70,   0, 0,
    0, 0,  -55, -60, -65, -75, -75, -65, -60, -55,   0, 0,
    0, 0,  -50, -55, -60, -65, -65, -60, -55, -50,   0, 0,
    0, 0,  -30, -40, -40, -45, -45, -40, -40, -30,   0, 0,
    0, 0,   -5,  -7, -10, -20, -20, -10,  -7,  -5,   0, 0,
    0, 0,   10,  12,  13, -17, -16, -18,  13,  10,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

// Aggressive king tables for when the opponent's attackers are gone.
pub(crate) const WHITE_KING_AGGRESSIVE: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0, -30, -20, -15, -10, -10, -15, -20, -30,   0, 0,
    0, 0, -25, -10,  -5,   0,   0,  -5, -10, -25,   0, 0,
    0, 0, -30,   5,  10,  15,  15,  10,   5, -30,   0, 0,
    0, 0, -20,  10,  20,  20,  20,  20,  10, -20,   0, 0,
    0, 0, -10,  10,  15,  20,  20,  15,  10, -10,   0, 0,
    0, 0, -10,   0,   5,  15,  15,   5,   0, -10,   0, 0,
    0, 0, -20, -12,   0,   0,   0,   0, -12, -20,   0, 0,
    0, 0, -35, -25, -20, -15, -15, -20, -25, -35,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

pub(crate) const BLACK_KING_AGGRESSIVE: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0, -35, -25, -20, -15, -15, -20, -25, -35,   0, 0,
    0, 0, -20, -12,   0,   0,   0,   0, -12, -20,   0, 0,
    0, 0, -10,  10,  15,  20,  20,  15,  10, -10,   0, 0,
    0, 0, -10,   0,   5,  15,  15,   5,   0, -10,   0, 0,
    0, 0, -20,  10,  20,  20,  20,  20,  10, -20,   0, 0,
    0, 0, -30,   5,  10,  15,  15,  10,   5, -30,   0, 0,
    0, 0, -25, -10,  -5,   0,   0,  -5, -10, -25,   0, 0,
    0, 0, -30, -20, -15, -10, -10, -15, -20, -30,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Knight placement (stored for Black; White indexes rotated).
pub(crate) const KNIGHT_POSITION: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0,  -9,  -7,  -5,  -4,  -4,  -5,  -7,  -9,   0, 0,
    0, 0,  -6,   2,   1,   0,   0,   1,   2,  -6,   0, 0,
    0, 0,  -4,   3,   6,   8,   8,   6,   3,  -4,   0, 0,
    0, 0,  -4,   6,   8,  10,  10,   8,   6,  -4,   0, 0,
    0, 0,  -5,   2,   6,   7,   7,   6,   2,  -5,   0, 0,
    0, 0,  -7,   1,   5,   3,   3,   5,   1,  -7,   0, 0,
    0, 0,  -8,  -3,  -1,  -1,  -1,  -1,  -3,  -8,   0, 0,
    0, 0, -10,  -9,  -8,  -7,  -7,  -8,  -9, -10,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Bishop placement (stored for White; Black indexes rotated).
pub(crate) const BISHOP_POSITION: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0,  -7,  -6,  -6,  -3,  -3,  -6,  -6,  -7,   0, 0,
    0, 0,  -3,   5,   0,   2,   2,   0,   5,  -3,   0, 0,
    0, 0,  -1,   1,   3,   0,   0,   3,   1,  -1,   0, 0,
    0, 0,  -1,   3,   4,   3,   3,   4,   3,  -1,   0, 0,
    0, 0,  -1,   4,   2,   3,   3,   2,   4,  -1,   0, 0,
    0, 0,  -2,   2,   3,   3,   3,   3,   2,  -2,   0, 0,
    0, 0,  -5,   1,   0,   0,   0,   0,   1,  -5,   0, 0,
    0, 0,  -7,  -5,  -4,  -3,  -3,  -4,  -5,  -7,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Queen placement (stored for White; Black indexes rotated).
pub(crate) const QUEEN_POSITION: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0, -14, -10,  -8,  -2,  -2,  -8, -10, -14,   0, 0,
    0, 0, -10,  -5,  -2,   0,   0,  -2,  -5, -10,   0, 0,
    0, 0,  -8,  -2,  -1,   0,   0,  -1,  -2,  -8,   0, 0,
    0, 0,  -7,  -1,   0,   1,   1,   0,  -1,  -7,   0, 0,
    0, 0,  -7,  -1,   0,   1,   1,   0,  -1,  -7,   0, 0,
    0, 0,  -8,  -2,  -1,   0,   0,  -1,  -2,  -8,   0, 0,
    0, 0, -11,  -8,  -5,  -3,  -3,  -5,  -8, -11,   0, 0,
    0, 0, -15, -12,  -8,  -5,  -5,  -8, -12, -15,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Pawn center pressure (stored for Black; White indexes rotated). Exists
/// alongside the structural pawn heuristics, which cover advancement.
pub(crate) const PAWN_CENTER: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0,   0,   0,   0,   0,   0,   0,   0,   0,   0, 0,
    0, 0,   0,   0,   0,   0,   0,   0,   0,   0,   0, 0,
    0, 0,   0,   0,   0,   0,   0,   0,   0,   0,   0, 0,
    0, 0,   0,   0,   1,   3,   3,   1,   0,   0,   0, 0,
    0, 0,   0,   0,   4,   7,   7,   4,   0,   0,   0, 0,
    0, 0,   1,   0,  -1,   1,   1,  -1,   0,   1,   0, 0,
    0, 0,   0,   0,   1,  -1,  -1,   1,   0,   0,   0, 0,
    0, 0,   0,   0,   0,   0,   0,   0,   0,   0,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Pawn-imbalance bonus, indexed `[fewer pawns][more pawns]`; scaled by
/// the poorer side's non-pawn material before use.
pub(crate) const PAWN_BALANCE: [[Score; 9]; 9] = [
    //   0     1     2     3     4     5     6     7     8
    [0, 120, 140, 150, 157, 162, 167, 170, 172],
    [0, 0, 55, 70, 80, 90, 97, 105, 110],
    [0, 0, 0, 10, 20, 30, 40, 50, 60],
    [0, 0, 0, 0, 6, 15, 20, 25, 30],
    [0, 0, 0, 0, 0, 4, 10, 12, 15],
    [0, 0, 0, 0, 0, 0, 3, 5, 10],
    [0, 0, 0, 0, 0, 0, 0, 2, 3],
    [0, 0, 0, 0, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

// Lone-king endgame drive tables: the penalty grows toward the corners
// the winning side can actually mate in.

/// Queen or rook can mate in any corner.
pub(crate) const KING_POS_TABLE_QR: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0, 100,  90,  70,  50,  50,  70,  90, 100,   0, 0,
    0, 0,  90,  70,  35,  20,  20,  35,  70,  90,   0, 0,
    0, 0,  70,  35,  15,  10,  10,  15,  35,  70,   0, 0,
    0, 0,  50,  20,  10,   0,   0,  10,  20,  50,   0, 0,
    0, 0,  50,  20,  10,   0,   0,  10,  20,  50,   0, 0,
    0, 0,  70,  35,  15,  10,  10,  15,  35,  70,   0, 0,
    0, 0,  90,  70,  35,  20,  20,  35,  70,  90,   0, 0,
    0, 0, 100,  90,  70,  50,  50,  70,  90, 100,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Mating bishop runs on light squares: drive toward a light corner.
pub(crate) const KING_POS_TABLE_BISHOP_LIGHT: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0, -100, -90, -70, -50,  50,  70,  90, 100,   0, 0,
    0, 0,  -90, -70, -35, -20,  20,  35,  70,  90,   0, 0,
    0, 0,  -70, -35, -15, -10,  10,  15,  35,  70,   0, 0,
    0, 0,  -50, -20, -10,  -5,   0,  10,  20,  50,   0, 0,
    0, 0,   50,  20,  10,   0,  -5, -10, -20, -50,   0, 0,
    0, 0,   70,  35,  15,  10, -10, -15, -35, -70,   0, 0,
    0, 0,   90,  70,  35,  20, -20, -35, -70, -90,   0, 0,
    0, 0,  100,  90,  70,  50, -50, -70, -90, -100,  0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Mating bishop runs on dark squares: drive toward a dark corner.
pub(crate) const KING_POS_TABLE_BISHOP_DARK: [Score; TABLE_SIZE] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,

    0, 0,  100,  90,  70,  50, -50, -70, -90, -100,  0, 0,
    0, 0,   90,  70,  35,  20, -20, -35, -70, -90,   0, 0,
    0, 0,   70,  35,  15,  10, -10, -15, -35, -70,   0, 0,
    0, 0,   50,  20,  10,   0,  -5, -10, -20, -50,   0, 0,
    0, 0,  -50, -20, -10,  -5,   0,  10,  20,  50,   0, 0,
    0, 0,  -70, -35, -15, -10,  10,  15,  35,  70,   0, 0,
    0, 0,  -90, -70, -35, -20,  20,  35,  70,  90,   0, 0,
    0, 0, -100, -90, -70, -50,  50,  70,  90, 100,   0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];
