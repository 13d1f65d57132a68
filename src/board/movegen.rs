//! Pseudo-legal move generation and the legality filter.
//!
//! Generation walks the 64 playable squares in row-major order and
//! dispatches on piece kind. Every pseudo-legal move is then proven legal
//! by making it, testing the mover's own check flag, and unmaking; moves
//! that leave the king attacked are overwrite-removed. Surviving moves
//! are annotated by the caller-supplied ordering pass, optionally
//! shuffled (randomized play), and sorted by the mover's polarity.

use rand::rngs::StdRng;

use super::moves::{
    Move, MoveList, SPECIAL_EP_EAST, SPECIAL_EP_WEST, SPECIAL_KCASTLE, SPECIAL_PROMOTE_CAP_EAST,
    SPECIAL_PROMOTE_CAP_WEST, SPECIAL_PROMOTE_NORM, SPECIAL_QCASTLE,
};
use super::state::{Board, UnmoveInfo};
use super::types::{
    offset, piece_mask, side_mask, Color, Offset, Piece, EAST, KING_DIRS, KNIGHT_DELTAS, NORTH,
    NORTHEAST, NORTHWEST, OFFBOARD_BIT, SOUTH, SOUTHEAST, SOUTHWEST, WEST,
};

/// Annotates surviving legal moves with ordering scores. The board is
/// observed in its post-move state (the move has just been made).
pub(crate) trait OrderMoves {
    fn annotate(&mut self, board: &Board, mv: &mut Move, unmove: &UnmoveInfo);
}

/// Promotion pieces in the order they are emitted.
const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

impl Board {
    /// Generate all legal moves for the side to move, unordered.
    pub fn generate_moves(&mut self, ml: &mut MoveList) {
        self.pseudo_moves(ml);
        self.filter_illegal(ml, None);
    }

    /// Generate legal moves annotated by `ordering`, optionally shuffled
    /// (randomized play at the root), sorted by the mover's polarity.
    pub(crate) fn generate_moves_ordered(
        &mut self,
        ml: &mut MoveList,
        ordering: &mut dyn OrderMoves,
        shuffle: Option<&mut StdRng>,
    ) {
        self.pseudo_moves(ml);
        self.filter_illegal(ml, Some(ordering));
        if let Some(rng) = shuffle {
            ml.shuffle(rng);
        }
        if self.white_to_move {
            ml.white_sort();
        } else {
            ml.black_sort();
        }
    }

    /// Generate legal captures and promotions (every promotion counts as
    /// capture-like for quiescence purposes), unordered.
    pub fn generate_captures(&mut self, ml: &mut MoveList) {
        self.pseudo_captures(ml);
        self.filter_illegal(ml, None);
    }

    /// Ordered variant of `generate_captures`.
    pub(crate) fn generate_captures_ordered(
        &mut self,
        ml: &mut MoveList,
        ordering: &mut dyn OrderMoves,
    ) {
        self.pseudo_captures(ml);
        self.filter_illegal(ml, Some(ordering));
        if self.white_to_move {
            ml.white_sort();
        } else {
            ml.black_sort();
        }
    }

    // -- pseudo-legal generation --------------------------------------------

    pub(crate) fn pseudo_moves(&self, ml: &mut MoveList) {
        ml.clear();
        let mover = self.to_move();
        let own = side_mask(mover);
        let mut ybase = offset(2, 2);
        while ybase <= offset(2, 9) {
            for x in 0..8 {
                let ofs = ybase + x;
                let sq = self.at(ofs);
                if !sq.any(own) {
                    continue;
                }
                match sq.kind() {
                    Some(Piece::Pawn) => self.pawn_moves(ml, ofs, mover),
                    Some(Piece::Knight) => self.knight_moves(ml, ofs, mover),
                    Some(Piece::Bishop) => self.slider_moves(ml, ofs, mover, &DIAGONALS),
                    Some(Piece::Rook) => self.slider_moves(ml, ofs, mover, &ORTHOGONALS),
                    Some(Piece::Queen) => {
                        self.slider_moves(ml, ofs, mover, &ORTHOGONALS);
                        self.slider_moves(ml, ofs, mover, &DIAGONALS);
                    }
                    Some(Piece::King) => self.king_moves(ml, ofs, mover),
                    None => crate::fatal::chess_fatal("pseudo_moves: unknown piece kind"),
                }
            }
            ybase += NORTH;
        }
    }

    pub(crate) fn pseudo_captures(&self, ml: &mut MoveList) {
        ml.clear();
        let mover = self.to_move();
        let own = side_mask(mover);
        let mut ybase = offset(2, 2);
        while ybase <= offset(2, 9) {
            for x in 0..8 {
                let ofs = ybase + x;
                let sq = self.at(ofs);
                if !sq.any(own) {
                    continue;
                }
                match sq.kind() {
                    Some(Piece::Pawn) => self.pawn_captures(ml, ofs, mover),
                    Some(Piece::Knight) => self.knight_captures(ml, ofs, mover),
                    Some(Piece::Bishop) => self.slider_captures(ml, ofs, mover, &DIAGONALS),
                    Some(Piece::Rook) => self.slider_captures(ml, ofs, mover, &ORTHOGONALS),
                    Some(Piece::Queen) => {
                        self.slider_captures(ml, ofs, mover, &ORTHOGONALS);
                        self.slider_captures(ml, ofs, mover, &DIAGONALS);
                    }
                    Some(Piece::King) => self.king_captures(ml, ofs, mover),
                    None => crate::fatal::chess_fatal("pseudo_captures: unknown piece kind"),
                }
            }
            ybase += NORTH;
        }
    }

    /// Pseudo-legal moves of the single piece standing on `ofs`. The
    /// can-move scan uses this to stop at the first legal move.
    pub(crate) fn gen_one_piece(&self, ml: &mut MoveList, ofs: Offset, mover: Color, kind: Piece) {
        match kind {
            Piece::Pawn => self.pawn_moves(ml, ofs, mover),
            Piece::Knight => self.knight_moves(ml, ofs, mover),
            Piece::Bishop => self.slider_moves(ml, ofs, mover, &DIAGONALS),
            Piece::Rook => self.slider_moves(ml, ofs, mover, &ORTHOGONALS),
            Piece::Queen => {
                self.slider_moves(ml, ofs, mover, &ORTHOGONALS);
                self.slider_moves(ml, ofs, mover, &DIAGONALS);
            }
            Piece::King => self.king_moves(ml, ofs, mover),
        }
    }

    /// Pawn rank relative to the mover: 1 = home rank, 4 = the rank from
    /// which en passant is possible, 6 = one step from promotion.
    #[inline]
    fn rel_rank(ofs: Offset, mover: Color) -> i32 {
        let r = super::types::rank_of(ofs);
        match mover {
            Color::White => r,
            Color::Black => 7 - r,
        }
    }

    fn pawn_moves(&self, ml: &mut MoveList, ofs: Offset, mover: Color) {
        let fwd = mover.forward();
        let enemy = side_mask(mover.opponent());
        match Self::rel_rank(ofs, mover) {
            1 => {
                if self.at(ofs + fwd).is_empty() {
                    ml.add_normal(ofs, ofs + fwd);
                    if self.at(ofs + 2 * fwd).is_empty() {
                        ml.add_normal(ofs, ofs + 2 * fwd);
                    }
                }
                if self.at(ofs + fwd + EAST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + EAST);
                }
                if self.at(ofs + fwd + WEST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + WEST);
                }
            }
            4 => {
                // The only rank where en passant can appear.
                if self.at(ofs + fwd).is_empty() {
                    ml.add_normal(ofs, ofs + fwd);
                }
                if self.at(ofs + fwd + EAST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + EAST);
                } else if self.en_passant_available(ofs, mover, EAST) {
                    ml.add(ofs, SPECIAL_EP_EAST);
                }
                if self.at(ofs + fwd + WEST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + WEST);
                } else if self.en_passant_available(ofs, mover, WEST) {
                    ml.add(ofs, SPECIAL_EP_WEST);
                }
            }
            6 => {
                if self.at(ofs + fwd).is_empty() {
                    for p in PROMOTION_PIECES {
                        ml.add(ofs, SPECIAL_PROMOTE_NORM | p.index() as u8);
                    }
                }
                if self.at(ofs + fwd + EAST).any(enemy) {
                    for p in PROMOTION_PIECES {
                        ml.add(ofs, SPECIAL_PROMOTE_CAP_EAST | p.index() as u8);
                    }
                }
                if self.at(ofs + fwd + WEST).any(enemy) {
                    for p in PROMOTION_PIECES {
                        ml.add(ofs, SPECIAL_PROMOTE_CAP_WEST | p.index() as u8);
                    }
                }
            }
            _ => {
                if self.at(ofs + fwd).is_empty() {
                    ml.add_normal(ofs, ofs + fwd);
                }
                if self.at(ofs + fwd + EAST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + EAST);
                }
                if self.at(ofs + fwd + WEST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + WEST);
                }
            }
        }
    }

    /// En-passant is recognized from the previous move: the opposing pawn
    /// must have just double-stepped onto the square beside this pawn.
    fn en_passant_available(&self, ofs: Offset, mover: Color, side: Offset) -> bool {
        let fwd = mover.forward();
        let prev = self.prev_move;
        !prev.is_null()
            && prev.source_offset() == ofs + side + 2 * fwd
            && !prev.is_special()
            && prev.dest as Offset == ofs + side
            && self
                .at(ofs + side)
                .any(piece_mask(mover.opponent(), Piece::Pawn))
    }

    fn pawn_captures(&self, ml: &mut MoveList, ofs: Offset, mover: Color) {
        let fwd = mover.forward();
        let enemy = side_mask(mover.opponent());
        match Self::rel_rank(ofs, mover) {
            6 => {
                // All promotions are capture-like for quiescence.
                self.pawn_moves(ml, ofs, mover);
            }
            4 => {
                if self.at(ofs + fwd + EAST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + EAST);
                } else if self.en_passant_available(ofs, mover, EAST) {
                    ml.add(ofs, SPECIAL_EP_EAST);
                }
                if self.at(ofs + fwd + WEST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + WEST);
                } else if self.en_passant_available(ofs, mover, WEST) {
                    ml.add(ofs, SPECIAL_EP_WEST);
                }
            }
            _ => {
                if self.at(ofs + fwd + EAST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + EAST);
                }
                if self.at(ofs + fwd + WEST).any(enemy) {
                    ml.add_normal(ofs, ofs + fwd + WEST);
                }
            }
        }
    }

    fn knight_moves(&self, ml: &mut MoveList, ofs: Offset, mover: Color) {
        let blocked = side_mask(mover) | OFFBOARD_BIT;
        for delta in KNIGHT_DELTAS {
            if !self.at(ofs + delta).any(blocked) {
                ml.add_normal(ofs, ofs + delta);
            }
        }
    }

    fn knight_captures(&self, ml: &mut MoveList, ofs: Offset, mover: Color) {
        let enemy = side_mask(mover.opponent());
        for delta in KNIGHT_DELTAS {
            if self.at(ofs + delta).any(enemy) {
                ml.add_normal(ofs, ofs + delta);
            }
        }
    }

    fn slider_moves(&self, ml: &mut MoveList, ofs: Offset, mover: Color, dirs: &[Offset; 4]) {
        let enemy = side_mask(mover.opponent());
        for &dir in dirs {
            let mut z = ofs + dir;
            while self.at(z).is_empty() {
                ml.add_normal(ofs, z);
                z += dir;
            }
            if self.at(z).any(enemy) {
                ml.add_normal(ofs, z);
            }
        }
    }

    fn slider_captures(&self, ml: &mut MoveList, ofs: Offset, mover: Color, dirs: &[Offset; 4]) {
        let enemy = side_mask(mover.opponent());
        for &dir in dirs {
            let mut z = ofs + dir;
            while self.at(z).is_empty() {
                z += dir;
            }
            if self.at(z).any(enemy) {
                ml.add_normal(ofs, z);
            }
        }
    }

    fn king_moves(&self, ml: &mut MoveList, ofs: Offset, mover: Color) {
        let blocked = side_mask(mover) | OFFBOARD_BIT;
        for dir in KING_DIRS {
            if !self.at(ofs + dir).any(blocked) {
                ml.add_normal(ofs, ofs + dir);
            }
        }

        // Castling: king and rook unmoved, rook still home, path empty,
        // not currently in check, transit square unattacked. The
        // destination square is covered by the legality filter.
        let home_y = 2 + mover.home_rank();
        let king_moved = self.flags
            & match mover {
                Color::White => super::state::SF_WKMOVED | super::state::SF_WCHECK,
                Color::Black => super::state::SF_BKMOVED | super::state::SF_BCHECK,
            };
        if king_moved != 0 {
            return;
        }
        let rook = piece_mask(mover, Piece::Rook);
        let enemy = mover.opponent();

        let kr_unmoved = (self.flags
            & match mover {
                Color::White => super::state::SF_WKRMOVED,
                Color::Black => super::state::SF_BKRMOVED,
            })
            == 0;
        if kr_unmoved
            && self.at(offset(9, home_y)).any(rook)
            && self.at(offset(8, home_y)).is_empty()
            && self.at(offset(7, home_y)).is_empty()
            && !self.is_attacked_by(enemy, offset(7, home_y))
        {
            ml.add(ofs, SPECIAL_KCASTLE);
        }

        let qr_unmoved = (self.flags
            & match mover {
                Color::White => super::state::SF_WQRMOVED,
                Color::Black => super::state::SF_BQRMOVED,
            })
            == 0;
        if qr_unmoved
            && self.at(offset(2, home_y)).any(rook)
            && self.at(offset(3, home_y)).is_empty()
            && self.at(offset(4, home_y)).is_empty()
            && self.at(offset(5, home_y)).is_empty()
            && !self.is_attacked_by(enemy, offset(5, home_y))
        {
            ml.add(ofs, SPECIAL_QCASTLE);
        }
    }

    fn king_captures(&self, ml: &mut MoveList, ofs: Offset, mover: Color) {
        let enemy = side_mask(mover.opponent());
        for dir in KING_DIRS {
            if self.at(ofs + dir).any(enemy) {
                ml.add_normal(ofs, ofs + dir);
            }
        }
    }

    // -- legality filter -----------------------------------------------------

    /// Make each pseudo-legal move with full check detection; moves that
    /// leave the mover's king attacked are swap-removed, survivors get
    /// the recorded check bit and an ordering score.
    fn filter_illegal(&mut self, ml: &mut MoveList, mut ordering: Option<&mut dyn OrderMoves>) {
        let mover = self.to_move();
        let mut i = 0;
        while i < ml.num {
            let mut mv = ml.moves[i];
            let unmove = self.make_move(&mut mv, true, true);
            let illegal = self.in_check(mover);
            if !illegal {
                if let Some(ord) = ordering.as_deref_mut() {
                    ord.annotate(self, &mut mv, &unmove);
                }
            }
            self.unmake_move(mv, &unmove);
            if illegal {
                ml.swap_remove(i);
            } else {
                ml.moves[i] = mv;
                i += 1;
            }
        }
    }

    /// Leaf-count regression for the move generator.
    #[must_use]
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut ml = MoveList::new();
        self.generate_moves(&mut ml);
        if depth == 1 {
            return ml.len() as u64;
        }
        let mut nodes = 0;
        let n = ml.len();
        for i in 0..n {
            let mut mv = ml.moves[i];
            let unmove = self.make_move(&mut mv, true, true);
            nodes += self.perft(depth - 1);
            self.unmake_move(mv, &unmove);
        }
        nodes
    }
}

const ORTHOGONALS: [Offset; 4] = [NORTH, SOUTH, EAST, WEST];
const DIAGONALS: [Offset; 4] = [NORTHEAST, NORTHWEST, SOUTHEAST, SOUTHWEST];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position_has_twenty_moves() {
        let mut board = Board::new();
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        assert_eq!(ml.len(), 20);
    }

    #[test]
    fn initial_position_has_no_captures() {
        let mut board = Board::new();
        let mut ml = MoveList::new();
        board.generate_captures(&mut ml);
        assert!(ml.is_empty());
    }

    #[test]
    fn generated_moves_never_leave_own_king_in_check() {
        let mut board = Board::new();
        for text in ["e2e4", "e7e5", "d1h5", "b8c6", "h5f7"] {
            let mut mv = board.scan_move(text).expect(text);
            board.make_move(&mut mv, true, true);
        }
        // Black is in check from the queen on f7; every reply must resolve it.
        assert!(board.in_check(Color::Black));
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        let n = ml.len();
        assert!(n > 0);
        for i in 0..n {
            let mut mv = ml.moves[i];
            let unmove = board.make_move(&mut mv, true, true);
            assert!(!board.in_check(Color::Black), "{mv:?} leaves king in check");
            board.unmake_move(mv, &unmove);
        }
    }

    #[test]
    fn promotions_are_emitted_four_ways() {
        let mut board = Board::empty();
        use crate::board::types::{square_at, Square};
        board.put_piece(square_at(0, 6), Square::piece(Color::White, Piece::Pawn));
        board.put_piece(square_at(4, 0), Square::piece(Color::White, Piece::King));
        board.put_piece(square_at(4, 7), Square::piece(Color::Black, Piece::King));
        board.finish_setup(true);
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        let promotions = ml.iter().filter(|m| m.is_promotion()).count();
        assert_eq!(promotions, 4);

        // Promotions are capture-like: the capture generator emits them too.
        let mut caps = MoveList::new();
        board.generate_captures(&mut caps);
        assert_eq!(caps.iter().filter(|m| m.is_promotion()).count(), 4);
    }
}
