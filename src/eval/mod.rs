//! Position evaluation.
//!
//! An `Evaluator` owns a gene (the tunable constants), an evaluation mode
//! chosen once per search from the material inventory, and the node
//! counter the host statistics report. Scores are always from White's
//! perspective.

mod endgame;
pub(crate) mod gene;
mod midgame;
mod tables;

use crate::board::{Board, Color, Piece};
use crate::score::Score;

pub use gene::{Gene, GENE_COUNT};

pub(crate) use gene::slot;
pub(crate) use tables::{
    KING_POS_TABLE_BISHOP_DARK, KING_POS_TABLE_BISHOP_LIGHT, KING_POS_TABLE_QR, TABLE_SIZE,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalMode {
    Midgame,
    /// One side has a lone king, the other has mating material.
    Endgame,
}

pub struct Evaluator {
    pub gene: Gene,
    mode: EvalMode,
    /// Endgame drive table matching the winner's mating pieces.
    pub(crate) king_pos_table: &'static [Score; TABLE_SIZE],
    /// Positions evaluated since the last reset; reported to the host.
    pub evaluated: u64,
}

impl Evaluator {
    #[must_use]
    pub fn new() -> Evaluator {
        Evaluator {
            gene: Gene::new(),
            mode: EvalMode::Midgame,
            king_pos_table: &KING_POS_TABLE_QR,
            evaluated: 0,
        }
    }

    #[must_use]
    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    /// Pick the evaluation mode for a whole search from the inventory.
    ///
    /// The endgame evaluator applies when one side has a bare king and
    /// the other has at least a rook or queen, or two minor pieces; the
    /// drive table depends on what the winner will mate with (a lone
    /// bishop can only mate in its own corner color).
    pub fn choose_mode(&mut self, board: &Board) {
        self.mode = EvalMode::Midgame;
        self.king_pos_table = &KING_POS_TABLE_QR;

        for (loser, winner) in [(Color::White, Color::Black), (Color::Black, Color::White)] {
            let bare_king = board.inventory(loser, Piece::Pawn) == 0
                && board.inventory(loser, Piece::Knight) == 0
                && board.inventory(loser, Piece::Bishop) == 0
                && board.inventory(loser, Piece::Rook) == 0
                && board.inventory(loser, Piece::Queen) == 0;
            if !bare_king {
                continue;
            }
            let heavy =
                board.inventory(winner, Piece::Rook) + board.inventory(winner, Piece::Queen);
            let minors =
                board.inventory(winner, Piece::Bishop) + board.inventory(winner, Piece::Knight);
            if heavy > 0 || minors >= 2 {
                self.mode = EvalMode::Endgame;
                if heavy == 0 && board.inventory(winner, Piece::Bishop) > 0 {
                    let mask = crate::board::types::piece_mask(winner, Piece::Bishop);
                    if board.count_on_shade(mask, false) == 0 {
                        // All bishops on light squares.
                        self.king_pos_table = &KING_POS_TABLE_BISHOP_LIGHT;
                    } else if board.count_on_shade(mask, true) == 0 {
                        self.king_pos_table = &KING_POS_TABLE_BISHOP_DARK;
                    }
                }
                return;
            }
        }
    }

    /// Evaluate the position for the side to move, with the active
    /// alpha-beta window for lazy pruning.
    pub fn evaluate(
        &mut self,
        board: &mut Board,
        depth: i32,
        alpha: Score,
        beta: Score,
    ) -> Score {
        match (self.mode, board.white_to_move()) {
            (EvalMode::Endgame, _) => self.endgame_eval(board, depth),
            (EvalMode::Midgame, true) => self.white_midgame_eval(board, depth, alpha, beta),
            (EvalMode::Midgame, false) => self.black_midgame_eval(board, depth, alpha, beta),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{MAX_WINDOW, MIN_WINDOW};

    #[test]
    fn initial_position_is_roughly_balanced() {
        let mut eval = Evaluator::new();
        let mut board = Board::new();
        eval.choose_mode(&board);
        assert_eq!(eval.mode(), EvalMode::Midgame);
        let score = eval.evaluate(&mut board, 0, MIN_WINDOW, MAX_WINDOW);
        assert!(score.abs() < 100, "startpos score {score} too lopsided");
    }

    #[test]
    fn material_advantage_shows_up() {
        let mut eval = Evaluator::new();
        // White is up a queen (with enough material for midgame mode).
        let mut board = Board::from_fen(
            "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        )
        .expect("FEN");
        eval.choose_mode(&board);
        let score = eval.evaluate(&mut board, 0, MIN_WINDOW, MAX_WINDOW);
        assert!(score > 500, "queen-up score was only {score}");
    }

    #[test]
    fn mode_selection_prefers_midgame_with_pawns() {
        let mut eval = Evaluator::new();
        let board = Board::from_fen("4k3/8/8/8/8/8/4P3/Q3K3 w - - 0 1").expect("FEN");
        eval.choose_mode(&board);
        // Black has a lone king and White has a queen: endgame.
        assert_eq!(eval.mode(), EvalMode::Endgame);

        let board = Board::from_fen("4k3/7p/8/8/8/8/4P3/Q3K3 w - - 0 1").expect("FEN");
        eval.choose_mode(&board);
        assert_eq!(eval.mode(), EvalMode::Midgame);
    }

    #[test]
    fn bishop_endgames_pick_the_matching_corner_table() {
        let mut eval = Evaluator::new();
        // Two bishops, one light-squared one dark: any-corner table.
        let board = Board::from_fen("4k3/8/8/8/8/8/8/2BBK3 w - - 0 1").expect("FEN");
        eval.choose_mode(&board);
        assert_eq!(eval.mode(), EvalMode::Endgame);
        assert!(std::ptr::eq(eval.king_pos_table, &KING_POS_TABLE_QR));

        // Bishop + knight: the single bishop on c1 runs on dark squares,
        // so the drive table targets a dark corner.
        let board = Board::from_fen("4k3/8/8/8/8/8/8/1NB1K3 w - - 0 1").expect("FEN");
        eval.choose_mode(&board);
        assert_eq!(eval.mode(), EvalMode::Endgame);
        assert!(std::ptr::eq(
            eval.king_pos_table,
            &KING_POS_TABLE_BISHOP_DARK
        ));
    }

    #[test]
    fn stalemate_is_draw_and_mate_is_win() {
        use crate::score::{BLACK_WINS, DRAW};

        let mut eval = Evaluator::new();
        // Stalemate: black to move, no moves, not in check.
        let mut stalemate = Board::from_fen("k7/2Q5/2K5/8/8/8/8/8 b - - 0 1").expect("FEN");
        eval.choose_mode(&stalemate);
        assert_eq!(eval.evaluate(&mut stalemate, 0, MIN_WINDOW, MAX_WINDOW), DRAW);

        // Checkmate: white mated in the corner.
        let mut mate = Board::from_fen("8/8/8/8/8/5k2/6q1/7K w - - 0 1").expect("FEN");
        eval.choose_mode(&mate);
        let score = eval.evaluate(&mut mate, 2, MIN_WINDOW, MAX_WINDOW);
        assert_eq!(score, BLACK_WINS + crate::score::win_postponement(2));
    }
}
