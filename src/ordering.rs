//! Move-ordering heuristics for the alpha-beta search.
//!
//! Scores are assigned while the legality filter has each move made on
//! the board, so the annotation sees the post-move position. White
//! prefers high scores, Black low ones; every term below is applied with
//! the mover's sign.
//!
//! Precedence: the previous iteration's best path overrides everything,
//! then the transposition-table move, then the heuristic sum (killer,
//! check, recapture, material, pawn-risk penalties, forward progress,
//! castling, history).

use crate::board::state::{SF_BCHECK, SF_WCHECK};
use crate::board::types::{BP_MASK, WP_MASK};
use crate::board::{
    Board, Color, Move, OrderMoves, UnmoveInfo, NORTHEAST, NORTHWEST, SOUTHEAST, SOUTHWEST,
};
use crate::eval::{slot, Gene};
use crate::score::{material_eval, Score};
use crate::search::bestpath::{BestPath, MAX_BESTPATH_DEPTH};

/// Best-path and transposition hints dominate all heuristic scores.
const BEST_PATH_SCORE: Score = 20000;
const XPOS_SCORE: Score = 10000;

/// Per-side history table: 4096 slots indexed by a 12-bit (source, dest)
/// hash, decayed by half at the start of each top-level search.
pub(crate) type HistoryTable = [Score; 4096];

/// One ordering pass, borrowed from the searching player for the
/// duration of a single move-generation call.
pub(crate) struct OrderingPass<'a> {
    pub white: bool,
    pub depth: i32,
    pub best_path_flag: bool,
    pub current_best_path: &'a BestPath,
    /// Sibling best path one level up; its move at this depth is the
    /// killer move.
    pub killer_path: Option<&'a BestPath>,
    pub xpos_move: Move,
    pub hist: &'a HistoryTable,
    pub gene: &'a Gene,
}

impl OrderMoves for OrderingPass<'_> {
    fn annotate(&mut self, board: &Board, mv: &mut Move, unmove: &UnmoveInfo) {
        let sgn: Score = if self.white { 1 } else { -1 };
        let v = &self.gene.v;

        // Best path from the previous iteration overrides everything.
        if self.best_path_flag
            && self.depth <= self.current_best_path.depth
            && (self.depth as usize) < MAX_BESTPATH_DEPTH
            && self.current_best_path.moves[self.depth as usize] == *mv
        {
            mv.score = sgn * BEST_PATH_SCORE;
            return;
        }

        if *mv == self.xpos_move {
            mv.score = sgn * XPOS_SCORE;
            return;
        }

        let mut score = material_eval(
            board.material(Color::White),
            board.material(Color::Black),
        );

        let source = mv.source_offset();

        // Killer: the best move found at the same depth in a sibling.
        if let Some(killer) = self.killer_path {
            if self.depth > 0
                && (self.depth as usize) < MAX_BESTPATH_DEPTH
                && self.depth <= killer.depth
                && killer.moves[self.depth as usize] == *mv
            {
                score += sgn * v[slot::KILLER_MOVE_BONUS];
            }
        }

        // The move was made when we are called, so the enemy check flag
        // is current.
        let enemy_check = if self.white { SF_BCHECK } else { SF_WCHECK };
        if board.flags() & enemy_check != 0 {
            score += sgn * v[slot::ORDER_CHECK_BONUS];
        }

        // Recapture on the square the opponent just moved to.
        if mv.dest == unmove.previous_move().dest {
            score += sgn * v[slot::PREV_SQUARE_BONUS];
        }

        if !mv.is_special() {
            let dest = mv.dest as crate::board::Offset;
            let piece = board.at(dest);

            // Prefer moving cheap pieces, all else being equal.
            score -= sgn * piece.upiece_index();

            let (own_pawn, enemy_pawn) = if self.white {
                (WP_MASK, BP_MASK)
            } else {
                (BP_MASK, WP_MASK)
            };
            let (cap_east, cap_west) = if self.white {
                (NORTHEAST, NORTHWEST)
            } else {
                (SOUTHEAST, SOUTHWEST)
            };

            if piece.any(own_pawn) {
                // A pawn that just captured often stands badly.
                let delta = dest - source;
                if delta == cap_east || delta == cap_west {
                    score -= sgn * v[slot::PAWN_CAPTURE_PENALTY];
                }
            } else if board.at(dest + cap_east).any(enemy_pawn)
                || board.at(dest + cap_west).any(enemy_pawn)
            {
                // Non-pawn parked where an enemy pawn can take it.
                score -= sgn * v[slot::PAWN_DANGER_PENALTY];
            }

            // Forward motion out of our own half.
            if self.white {
                if source <= crate::board::offset(9, 4) && dest >= source + 10 {
                    score += v[slot::FORWARD_BONUS];
                }
            } else if source >= crate::board::offset(2, 7) && dest <= source - 10 {
                score -= v[slot::FORWARD_BONUS];
            }
        } else if mv.is_castle() {
            score += sgn * v[slot::CASTLE_BONUS];
        }

        score += sgn * (self.hist[mv.history_hash()] >> v[slot::HASH_HIST_SHIFT]);

        mv.score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MoveList;

    fn pass<'a>(
        white: bool,
        best: &'a BestPath,
        hist: &'a HistoryTable,
        gene: &'a Gene,
    ) -> OrderingPass<'a> {
        OrderingPass {
            white,
            depth: 0,
            best_path_flag: false,
            current_best_path: best,
            killer_path: None,
            xpos_move: Move::null(),
            hist,
            gene,
        }
    }

    #[test]
    fn tt_move_sorts_first_for_white() {
        let mut board = Board::new();
        let gene = Gene::new();
        let hist: HistoryTable = [0; 4096];
        let best = BestPath::new();

        let target = board.scan_move("a2a3").expect("a3");
        let mut ordering = pass(true, &best, &hist, &gene);
        ordering.xpos_move = target;

        let mut ml = MoveList::new();
        board.generate_moves_ordered(&mut ml, &mut ordering, None);
        assert_eq!(ml.as_slice()[0], target);
        assert_eq!(ml.as_slice()[0].score, XPOS_SCORE);
    }

    #[test]
    fn best_path_outranks_tt_move() {
        let mut board = Board::new();
        let gene = Gene::new();
        let hist: HistoryTable = [0; 4096];

        let path_move = board.scan_move("h2h3").expect("h3");
        let tt_move = board.scan_move("a2a3").expect("a3");

        let mut best = BestPath::new();
        best.depth = 0;
        best.moves[0] = path_move;

        let mut ordering = pass(true, &best, &hist, &gene);
        ordering.best_path_flag = true;
        ordering.xpos_move = tt_move;

        let mut ml = MoveList::new();
        board.generate_moves_ordered(&mut ml, &mut ordering, None);
        assert_eq!(ml.as_slice()[0], path_move);
        assert_eq!(ml.as_slice()[1], tt_move);
    }

    #[test]
    fn history_biases_quiet_moves() {
        let mut board = Board::new();
        let gene = Gene::new();
        let mut hist: HistoryTable = [0; 4096];
        let favored = board.scan_move("b1c3").expect("Nc3");
        hist[favored.history_hash()] = 4000;

        let best = BestPath::new();
        let mut ordering = pass(true, &best, &hist, &gene);
        let mut ml = MoveList::new();
        board.generate_moves_ordered(&mut ml, &mut ordering, None);
        assert_eq!(ml.as_slice()[0], favored);
    }

    #[test]
    fn black_prefers_low_scores() {
        let mut board = Board::new();
        let mut mv = board.scan_move("e4").expect("e4");
        board.make_move(&mut mv, true, true);

        let gene = Gene::new();
        let hist: HistoryTable = [0; 4096];
        let best = BestPath::new();

        let target = board.scan_move("g8f6").expect("Nf6");
        let mut ordering = pass(false, &best, &hist, &gene);
        ordering.xpos_move = target;

        let mut ml = MoveList::new();
        board.generate_moves_ordered(&mut ml, &mut ordering, None);
        assert_eq!(ml.as_slice()[0], target);
        assert_eq!(ml.as_slice()[0].score, -XPOS_SCORE);
    }
}
