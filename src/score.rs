//! The engine-wide score scale.
//!
//! Scores are integers from White's perspective: positive favors White.
//! Forced wins live near the `WHITE_WINS`/`BLACK_WINS` sentinels, backed
//! off by `win_postponement` so the search prefers the fastest mate.

pub type Score = i32;

pub const DRAW: Score = 0;

pub const WHITE_WINS: Score = 29000;
pub const BLACK_WINS: Score = -29000;

/// Scores at or beyond these bounds are forced wins.
pub const WON_FOR_WHITE: Score = 28000;
pub const WON_FOR_BLACK: Score = -28000;

/// Each ply of delay shaves this much off a mate score.
pub const WIN_DELAY_PENALTY: Score = 20;

#[inline]
#[must_use]
pub const fn win_postponement(depth: i32) -> Score {
    depth * WIN_DELAY_PENALTY
}

/// Sentinels returned from aborted subtrees; outside every legal window.
pub const NEGINF: Score = -31000;
pub const POSINF: Score = 31000;

/// The widest alpha-beta window handed to a root search.
pub const MIN_WINDOW: Score = -30000;
pub const MAX_WINDOW: Score = 30000;

/// Material balance in centipawn-like units from raw material totals
/// (see `Piece::raw_value`; kings are included so totals are never zero).
/// The second term grows as material leaves the board, so the side that
/// is ahead prefers trading pieces down.
#[inline]
#[must_use]
pub fn material_eval(wmaterial: i32, bmaterial: i32) -> Score {
    let diff = wmaterial - bmaterial;
    10 * diff + 1200 * diff / (wmaterial + bmaterial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{KING_VAL, PAWN_VAL, QUEEN_VAL, ROOK_VAL};

    #[test]
    fn material_eval_is_antisymmetric() {
        let a = KING_VAL + QUEEN_VAL;
        let b = KING_VAL + ROOK_VAL;
        assert_eq!(material_eval(a, b), -material_eval(b, a));
        assert_eq!(material_eval(a, a), 0);
    }

    #[test]
    fn trading_down_helps_the_stronger_side() {
        let ahead = KING_VAL + ROOK_VAL + PAWN_VAL;
        let behind = KING_VAL + ROOK_VAL;
        let before = material_eval(ahead + QUEEN_VAL, behind + QUEEN_VAL);
        let after = material_eval(ahead, behind);
        assert!(after > before);
    }

    #[test]
    fn postponement_orders_mates() {
        assert!(WHITE_WINS - win_postponement(2) > WHITE_WINS - win_postponement(4));
        assert!(WHITE_WINS - win_postponement(4) > WON_FOR_WHITE);
    }
}
