//! Attack detection: is a given square attacked by a given side?
//!
//! The scan is pattern-based rather than move-generation-based: knight
//! jumps first, then one step in each of the eight directions looking for
//! adjacent pawns/kings/sliders, then a slide continuation for queens,
//! rooks and bishops. Inventory counts let whole scan classes be skipped
//! when the attacker has no piece of that class.

use super::state::Board;
use super::types::{
    piece_mask, Color, Offset, Piece, EAST, KNIGHT_DELTAS, NORTH, NORTHEAST, NORTHWEST, SOUTH,
    SOUTHEAST, SOUTHWEST, WEST,
};

impl Board {
    /// True iff `attacker` attacks the square at `target`.
    #[must_use]
    pub fn is_attacked_by(&self, attacker: Color, target: Offset) -> bool {
        let knight = piece_mask(attacker, Piece::Knight);
        if self.inventory(attacker, Piece::Knight) > 0 {
            for delta in KNIGHT_DELTAS {
                if self.at(target + delta).any(knight) {
                    return true;
                }
            }
        }

        let pawn = piece_mask(attacker, Piece::Pawn);
        let bishop = piece_mask(attacker, Piece::Bishop);
        let rook = piece_mask(attacker, Piece::Rook);
        let queen = piece_mask(attacker, Piece::Queen);
        let king = piece_mask(attacker, Piece::King);

        let diag_sliders = self.inventory(attacker, Piece::Queen)
            + self.inventory(attacker, Piece::Bishop)
            > 0;
        let ortho_sliders = self.inventory(attacker, Piece::Queen)
            + self.inventory(attacker, Piece::Rook)
            > 0;

        // A pawn attacks the target from the rank "behind" it relative to
        // the pawn's advance: white pawns attack from the south diagonals.
        let (pawn_dir_east, pawn_dir_west) = match attacker {
            Color::White => (SOUTHEAST, SOUTHWEST),
            Color::Black => (NORTHEAST, NORTHWEST),
        };

        for dir in [SOUTHEAST, SOUTHWEST, NORTHEAST, NORTHWEST] {
            let first = self.at(target + dir);
            if first.is_empty() {
                if diag_sliders {
                    let mut z = target + 2 * dir;
                    while self.at(z).is_empty() {
                        z += dir;
                    }
                    if self.at(z).any(queen | bishop) {
                        return true;
                    }
                }
            } else {
                let mut adjacent = bishop | queen | king;
                if dir == pawn_dir_east || dir == pawn_dir_west {
                    adjacent |= pawn;
                }
                if first.any(adjacent) {
                    return true;
                }
            }
        }

        for dir in [NORTH, SOUTH, EAST, WEST] {
            let first = self.at(target + dir);
            if first.is_empty() {
                if ortho_sliders {
                    let mut z = target + 2 * dir;
                    while self.at(z).is_empty() {
                        z += dir;
                    }
                    if self.at(z).any(queen | rook) {
                        return true;
                    }
                }
            } else if first.any(queen | rook | king) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::{square_at, Square};

    fn bare_board(pieces: &[(i32, i32, Color, Piece)]) -> Board {
        let mut board = Board::empty();
        for (file, rank, color, piece) in pieces {
            board.put_piece(square_at(*file, *rank), Square::piece(*color, *piece));
        }
        board.finish_setup(true);
        board
    }

    #[test]
    fn rook_attacks_along_open_lines_only() {
        let board = bare_board(&[
            (0, 0, Color::White, Piece::Rook),
            (4, 0, Color::White, Piece::King),
            (4, 7, Color::Black, Piece::King),
        ]);
        assert!(board.is_attacked_by(Color::White, square_at(0, 7)));
        assert!(board.is_attacked_by(Color::White, square_at(3, 0)));
        assert!(!board.is_attacked_by(Color::White, square_at(1, 1)));
    }

    #[test]
    fn blockers_cut_slides() {
        let board = bare_board(&[
            (0, 0, Color::White, Piece::Rook),
            (0, 3, Color::White, Piece::Pawn),
            (4, 0, Color::White, Piece::King),
            (4, 7, Color::Black, Piece::King),
        ]);
        assert!(board.is_attacked_by(Color::White, square_at(0, 3)));
        assert!(!board.is_attacked_by(Color::White, square_at(0, 5)));
    }

    #[test]
    fn pawns_attack_diagonally_forward() {
        let board = bare_board(&[
            (4, 3, Color::White, Piece::Pawn),
            (0, 0, Color::White, Piece::King),
            (7, 7, Color::Black, Piece::King),
        ]);
        assert!(board.is_attacked_by(Color::White, square_at(3, 4)));
        assert!(board.is_attacked_by(Color::White, square_at(5, 4)));
        assert!(!board.is_attacked_by(Color::White, square_at(4, 4)));
        assert!(!board.is_attacked_by(Color::White, square_at(3, 2)));
    }

    #[test]
    fn knight_pattern() {
        let board = bare_board(&[
            (3, 3, Color::Black, Piece::Knight),
            (0, 0, Color::White, Piece::King),
            (7, 7, Color::Black, Piece::King),
        ]);
        assert!(board.is_attacked_by(Color::Black, square_at(4, 5)));
        assert!(board.is_attacked_by(Color::Black, square_at(5, 2)));
        assert!(!board.is_attacked_by(Color::Black, square_at(4, 4)));
    }

    #[test]
    fn kings_attack_adjacent_squares() {
        let board = bare_board(&[
            (4, 4, Color::White, Piece::King),
            (0, 7, Color::Black, Piece::King),
        ]);
        assert!(board.is_attacked_by(Color::White, square_at(5, 5)));
        assert!(!board.is_attacked_by(Color::White, square_at(6, 6)));
    }
}
