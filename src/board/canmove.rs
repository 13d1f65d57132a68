//! "Does the side to move have any legal move at all?"
//!
//! Used by mate/stalemate detection inside the evaluators, where a full
//! generated-and-filtered move list would be wasted work. The scan stops
//! at the first legal move. When the mover is in check, king moves are
//! tried first since they resolve most checks immediately.

use super::moves::MoveList;
use super::state::Board;
use super::types::{offset, side_mask, Piece, NORTH};

impl Board {
    /// True iff the side to move has at least one legal move.
    #[must_use]
    pub fn current_player_can_move(&mut self) -> bool {
        let mover = self.to_move();
        let own = side_mask(mover);
        let mut ml = MoveList::new();

        if self.in_check(mover) {
            ml.clear();
            let king_ofs = self.king_offset(mover);
            self.gen_one_piece(&mut ml, king_ofs, mover, Piece::King);
            if self.any_legal(&mut ml) {
                return true;
            }
        }

        let mut ybase = offset(2, 2);
        while ybase <= offset(2, 9) {
            for x in 0..8 {
                let ofs = ybase + x;
                let sq = self.at(ofs);
                if !sq.any(own) {
                    continue;
                }
                if let Some(kind) = sq.kind() {
                    ml.clear();
                    self.gen_one_piece(&mut ml, ofs, mover, kind);
                    if self.any_legal(&mut ml) {
                        return true;
                    }
                }
            }
            ybase += NORTH;
        }
        false
    }

    fn any_legal(&mut self, ml: &mut MoveList) -> bool {
        let mover = self.to_move();
        let n = ml.len();
        for i in 0..n {
            let mut mv = ml.moves[i];
            let unmove = self.make_move(&mut mv, true, false);
            let legal = !self.in_check(mover);
            self.unmake_move(mv, &unmove);
            if legal {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::{square_at, Color, Square};

    #[test]
    fn initial_position_can_move() {
        let mut board = Board::new();
        assert!(board.current_player_can_move());
    }

    #[test]
    fn stalemate_has_no_moves() {
        // Classic stalemate: black king a8, white queen c7, white king c6.
        let mut board = Board::empty();
        board.put_piece(square_at(0, 7), Square::piece(Color::Black, Piece::King));
        board.put_piece(square_at(2, 6), Square::piece(Color::White, Piece::Queen));
        board.put_piece(square_at(2, 5), Square::piece(Color::White, Piece::King));
        board.set_side_to_move(Color::Black);
        board.finish_setup(true);
        assert!(!board.in_check(Color::Black));
        assert!(!board.current_player_can_move());
    }

    #[test]
    fn checkmate_has_no_moves() {
        // Back-rank mate: black king h8, white rook a8, white king g6.
        let mut board = Board::empty();
        board.put_piece(square_at(7, 7), Square::piece(Color::Black, Piece::King));
        board.put_piece(square_at(0, 7), Square::piece(Color::White, Piece::Rook));
        board.put_piece(square_at(6, 5), Square::piece(Color::White, Piece::King));
        board.set_side_to_move(Color::Black);
        board.finish_setup(true);
        assert!(board.in_check(Color::Black));
        assert!(!board.current_player_can_move());
    }
}
