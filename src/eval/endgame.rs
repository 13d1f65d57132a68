//! The lone-king endgame evaluator.
//!
//! Selected when one side has only its king and the other side retains
//! mating material. Instead of special endgame move logic, the normal
//! search runs with an evaluation that drives the losing king toward a
//! cornerable square and pulls the winner's pieces close.

use crate::board::{distance2, offset, Board, Color, Offset, NORTH};
use crate::board::types::{
    BB_MASK, BN_MASK, BQ_MASK, BR_MASK, WB_MASK, WN_MASK, WQ_MASK, WR_MASK,
};
use crate::score::{material_eval, win_postponement, Score, BLACK_WINS, DRAW, WHITE_WINS};

use super::Evaluator;

impl Evaluator {
    /// Endgame evaluation; used for both sides to move.
    pub(crate) fn endgame_eval(&mut self, board: &mut Board, depth: i32) -> Score {
        self.evaluated += 1;

        if board.is_definite_draw() {
            return DRAW;
        }

        // Checkmates and stalemates first.
        let mover = board.to_move();
        if !board.current_player_can_move() {
            if board.in_check(mover) {
                return match mover {
                    Color::White => BLACK_WINS + win_postponement(depth),
                    Color::Black => WHITE_WINS - win_postponement(depth),
                };
            }
            return DRAW;
        }

        // Exactly one side had a lone king at the search root; the
        // material balance tells us which.
        let mut score =
            material_eval(board.material(Color::White), board.material(Color::Black));
        let wk = board.king_offset(Color::White);
        let bk = board.king_offset(Color::Black);
        let kdist = distance2(wk, bk);

        if score < 0 {
            // Black is winning; measure how cornered White's king is.
            score += kdist - 10000 - self.king_pos_table[wk as usize];
            score -= proximity_bonus(board, wk, BR_MASK | BQ_MASK | BN_MASK | BB_MASK);
        } else {
            score -= kdist - 10000 - self.king_pos_table[bk as usize];
            score += proximity_bonus(board, bk, WR_MASK | WQ_MASK | WN_MASK | WB_MASK);
        }

        score
    }
}

/// Squared-distance penalty for the winner's pieces straying from the
/// losing king; knights and bishops count at one twelfth of rooks and
/// queens.
fn proximity_bonus(board: &Board, target: Offset, mask: u16) -> Score {
    let mut bonus: Score = 0;
    let mut ybase = offset(2, 2);
    while ybase <= offset(2, 9) {
        for x in 0..8 {
            let ofs = ybase + x;
            if board.at(ofs).any(mask) {
                let mut delta = distance2(ofs, target);
                if !board.at(ofs).any(BR_MASK | WR_MASK | BQ_MASK | WQ_MASK) {
                    delta /= 12;
                }
                bonus -= delta;
            }
        }
        ybase += NORTH;
    }
    bonus / 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{EvalMode, Evaluator};

    #[test]
    fn winning_side_prefers_cornered_defender() {
        let mut eval = Evaluator::new();

        // Black king in the corner vs near the center; White (K+Q) must
        // prefer the cornered version.
        let mut cornered =
            Board::from_fen("7k/8/8/8/8/8/8/Q3K3 b - - 0 1").expect("FEN");
        let mut central =
            Board::from_fen("8/8/8/4k3/8/8/8/Q3K3 b - - 0 1").expect("FEN");

        eval.choose_mode(&cornered);
        assert_eq!(eval.mode(), EvalMode::Endgame);

        let cornered_score = eval.endgame_eval(&mut cornered, 0);
        let central_score = eval.endgame_eval(&mut central, 0);
        assert!(
            cornered_score > central_score,
            "cornered {cornered_score} should beat central {central_score}"
        );
    }

    #[test]
    fn winner_likes_pieces_near_the_lone_king() {
        let mut eval = Evaluator::new();
        let mut far = Board::from_fen("7k/8/8/8/8/8/8/Q3K3 b - - 0 1").expect("FEN");
        let mut near = Board::from_fen("7k/8/5Q2/8/8/8/8/4K3 b - - 0 1").expect("FEN");
        eval.choose_mode(&far);
        let far_score = eval.endgame_eval(&mut far, 0);
        let near_score = eval.endgame_eval(&mut near, 0);
        assert!(near_score > far_score);
    }
}
