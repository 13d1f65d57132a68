//! Applying and retracting moves with in-place mutation.
//!
//! `make_move` updates the squares plus every cached field (flags, king
//! offsets, material, inventory, hash, previous move, 50-move ply,
//! repetition counters, history) and flips the side to move.
//! `unmake_move` is its exact inverse: after the pair runs, the board is
//! bit-identical to what it was, cached hash included.

use crate::fatal::chess_fatal;

use super::hash::{normalize_hash, piece_hash};
use super::moves::{Move, SpecialMove};
use super::state::{
    Board, UnmoveInfo, SF_BCHECK, SF_BKMOVED, SF_BKRMOVED, SF_BQRMOVED, SF_WCHECK, SF_WKMOVED,
    SF_WKRMOVED, SF_WQRMOVED,
};
use super::types::{
    offset, piece_mask, side_mask, Color, Offset, Piece, Square, EAST, OFFBOARD_BIT, WEST,
};

impl Board {
    #[inline]
    fn lift(&mut self, sq: Square, ofs: Offset) {
        if let (Some(color), Some(kind)) = (sq.color(), sq.kind()) {
            self.cached_hash = self.cached_hash.wrapping_sub(piece_hash(color, kind, ofs));
        }
    }

    #[inline]
    fn drop(&mut self, sq: Square, ofs: Offset) {
        if let (Some(color), Some(kind)) = (sq.color(), sq.kind()) {
            self.cached_hash = self.cached_hash.wrapping_add(piece_hash(color, kind, ofs));
        }
    }

    #[inline]
    fn bump_inventory(&mut self, sq: Square, delta: i16) {
        if let (Some(color), Some(kind)) = (sq.color(), sq.kind()) {
            self.inventory[color.index() * 6 + kind.index()] += delta;
        }
    }

    #[inline]
    fn set_king_offset(&mut self, color: Color, ofs: Offset) {
        match color {
            Color::White => self.wk_offset = ofs,
            Color::Black => self.bk_offset = ofs,
        }
    }

    const fn king_moved_flag(color: Color) -> u8 {
        match color {
            Color::White => SF_WKMOVED,
            Color::Black => SF_BKMOVED,
        }
    }

    const fn kingside_rook_flag(color: Color) -> u8 {
        match color {
            Color::White => SF_WKRMOVED,
            Color::Black => SF_BKRMOVED,
        }
    }

    const fn queenside_rook_flag(color: Color) -> u8 {
        match color {
            Color::White => SF_WQRMOVED,
            Color::Black => SF_BQRMOVED,
        }
    }

    const fn check_flag(color: Color) -> u8 {
        match color {
            Color::White => SF_WCHECK,
            Color::Black => SF_BCHECK,
        }
    }

    /// Apply `mv` for the side to move.
    ///
    /// When `check_self` is set, the mover's in-check flag is recomputed
    /// by an attack scan (the legality filter needs this). When
    /// `check_enemy` is also set, the opponent's flag is recomputed and
    /// the result recorded in the move's causes-check bit. When neither
    /// is requested the move must already carry a valid causes-check bit
    /// from a prior annotated make.
    pub fn make_move(&mut self, mv: &mut Move, check_self: bool, check_enemy: bool) -> UnmoveInfo {
        let mover = self.to_move();
        let enemy = mover.opponent();
        let fwd = mover.forward();
        let home_y = 2 + mover.home_rank();
        let source = mv.source_offset();

        let mut unmove = UnmoveInfo {
            capture: Square::EMPTY,
            flags: self.flags,
            wmaterial: self.wmaterial,
            bmaterial: self.bmaterial,
            prev_move: self.prev_move,
            last_cap_or_pawn: self.last_cap_or_pawn,
            cached_hash: self.cached_hash,
        };

        let mut piece = self.at(source);
        if !mv.is_null() && (piece.is_offboard() || !piece.any(side_mask(mover))) {
            chess_fatal("make_move: source square does not hold a mover piece");
        }

        let mut capture = Square::EMPTY;

        match mv.special() {
            Some(SpecialMove::PromoteNorm(promoted))
            | Some(SpecialMove::PromoteCapEast(promoted))
            | Some(SpecialMove::PromoteCapWest(promoted)) => {
                let dest = match mv.special() {
                    Some(SpecialMove::PromoteCapEast(_)) => source + fwd + EAST,
                    Some(SpecialMove::PromoteCapWest(_)) => source + fwd + WEST,
                    _ => source + fwd,
                };
                if dest != source + fwd {
                    capture = self.at(dest);
                    self.lift(capture, dest);
                }
                let new_piece = Square::piece(mover, promoted);
                self.bump_inventory(piece, -1);
                self.bump_inventory(new_piece, 1);
                let gain = promoted.raw_value() - Piece::Pawn.raw_value();
                match mover {
                    Color::White => self.wmaterial += gain,
                    Color::Black => self.bmaterial += gain,
                }
                self.lift(piece, source);
                self.squares[source as usize] = Square::EMPTY;
                self.squares[dest as usize] = new_piece;
                self.drop(new_piece, dest);
                piece = new_piece;
                self.last_cap_or_pawn = self.ply_number;
            }
            Some(SpecialMove::CastleKingside) => {
                let king = Square::piece(mover, Piece::King);
                let rook = Square::piece(mover, Piece::Rook);
                self.lift(king, offset(6, home_y));
                self.drop(king, offset(8, home_y));
                self.squares[offset(6, home_y) as usize] = Square::EMPTY;
                self.squares[offset(8, home_y) as usize] = king;
                self.lift(rook, offset(9, home_y));
                self.drop(rook, offset(7, home_y));
                self.squares[offset(9, home_y) as usize] = Square::EMPTY;
                self.squares[offset(7, home_y) as usize] = rook;
                self.set_king_offset(mover, offset(8, home_y));
                self.flags |= Self::king_moved_flag(mover) | Self::kingside_rook_flag(mover);
            }
            Some(SpecialMove::CastleQueenside) => {
                let king = Square::piece(mover, Piece::King);
                let rook = Square::piece(mover, Piece::Rook);
                self.lift(king, offset(6, home_y));
                self.drop(king, offset(4, home_y));
                self.squares[offset(6, home_y) as usize] = Square::EMPTY;
                self.squares[offset(4, home_y) as usize] = king;
                self.lift(rook, offset(2, home_y));
                self.drop(rook, offset(5, home_y));
                self.squares[offset(2, home_y) as usize] = Square::EMPTY;
                self.squares[offset(5, home_y) as usize] = rook;
                self.set_king_offset(mover, offset(4, home_y));
                self.flags |= Self::king_moved_flag(mover) | Self::queenside_rook_flag(mover);
            }
            Some(SpecialMove::EnPassantEast) | Some(SpecialMove::EnPassantWest) => {
                let side = match mv.special() {
                    Some(SpecialMove::EnPassantEast) => EAST,
                    _ => WEST,
                };
                let dest = source + fwd + side;
                self.lift(piece, source);
                self.squares[source as usize] = Square::EMPTY;
                self.squares[dest as usize] = piece;
                self.drop(piece, dest);
                capture = self.at(source + side);
                self.lift(capture, source + side);
                self.squares[(source + side) as usize] = Square::EMPTY;
            }
            Some(SpecialMove::Null) => {
                // Pass move: nothing on the board changes.
            }
            Some(SpecialMove::Edit) => {
                chess_fatal("make_move: board-edit pseudo-moves are applied by edit_square");
            }
            None => {
                let dest = mv.dest as Offset;
                capture = self.at(dest);
                if !capture.is_empty() {
                    if capture.any(piece_mask(enemy, Piece::King)) {
                        chess_fatal("make_move: attempt to capture a king");
                    }
                    if capture.any(OFFBOARD_BIT) {
                        chess_fatal("make_move: attempt to move off the board");
                    }
                    if capture.any(side_mask(mover)) {
                        chess_fatal("make_move: attempt to capture own piece");
                    }
                    self.lift(capture, dest);
                }

                self.lift(piece, source);
                self.drop(piece, dest);
                self.squares[dest as usize] = piece;
                self.squares[source as usize] = Square::EMPTY;

                if piece.any(piece_mask(mover, Piece::King)) {
                    self.flags |= Self::king_moved_flag(mover);
                    self.set_king_offset(mover, dest);
                } else if piece.any(piece_mask(mover, Piece::Rook)) {
                    if source == offset(9, home_y) {
                        self.flags |= Self::kingside_rook_flag(mover);
                    } else if source == offset(2, home_y) {
                        self.flags |= Self::queenside_rook_flag(mover);
                    }
                }
            }
        }

        unmove.capture = capture;

        if !capture.is_empty() {
            self.bump_inventory(capture, -1);
            match enemy {
                Color::White => self.wmaterial -= capture.raw_value(),
                Color::Black => self.bmaterial -= capture.raw_value(),
            }
            self.last_cap_or_pawn = self.ply_number;

            // Capturing a rook on its home square forfeits that castling
            // for the opponent, so a later rook shuffled onto the square
            // cannot fool the castle generator.
            let enemy_home_y = 2 + enemy.home_rank();
            let dest = mv.actual_dest(mover);
            if capture.any(piece_mask(enemy, Piece::Rook)) {
                if dest == offset(9, enemy_home_y) {
                    self.flags |= Self::kingside_rook_flag(enemy);
                } else if dest == offset(2, enemy_home_y) {
                    self.flags |= Self::queenside_rook_flag(enemy);
                }
            }
        } else if piece.any(piece_mask(mover, Piece::Pawn)) {
            self.last_cap_or_pawn = self.ply_number;
        }

        if check_self {
            if self.is_attacked_by(enemy, self.king_offset(mover)) {
                self.flags |= Self::check_flag(mover);
            } else {
                self.flags &= !Self::check_flag(mover);
            }
            if check_enemy {
                let gives_check = self.is_attacked_by(mover, self.king_offset(enemy));
                if gives_check {
                    self.flags |= Self::check_flag(enemy);
                } else {
                    self.flags &= !Self::check_flag(enemy);
                }
                mv.set_causes_check(gives_check);
            }
        } else {
            // Re-making a known-legal move: trust the recorded check bit.
            self.flags &= !(SF_WCHECK | SF_BCHECK);
            if mv.causes_check() {
                self.flags |= Self::check_flag(enemy);
            }
        }

        let hist_index = (self.ply_number - self.base_ply) as usize;
        if hist_index < self.game_history.len() {
            self.game_history[hist_index] = *mv;
        } else {
            self.game_history.push(*mv);
        }

        self.ply_number += 1;
        self.prev_move = *mv;
        self.white_to_move = !self.white_to_move;
        self.cached_hash = normalize_hash(self.cached_hash);

        if hist_index + 1 < self.hash_history.len() {
            self.hash_history[hist_index + 1] = self.cached_hash;
        } else {
            self.hash_history.push(self.cached_hash);
        }

        self.repeat_slot(self.to_move(), self.cached_hash, 1);

        #[cfg(debug_assertions)]
        self.debug_validate("make_move");

        unmove
    }

    /// Exact inverse of `make_move`.
    pub fn unmake_move(&mut self, mv: Move, unmove: &UnmoveInfo) {
        self.repeat_slot(self.to_move(), self.cached_hash, -1);

        self.white_to_move = !self.white_to_move;
        self.ply_number -= 1;
        self.flags = unmove.flags;
        self.wmaterial = unmove.wmaterial;
        self.bmaterial = unmove.bmaterial;
        self.prev_move = unmove.prev_move;
        self.last_cap_or_pawn = unmove.last_cap_or_pawn;
        self.cached_hash = unmove.cached_hash;

        let mover = self.to_move();
        let fwd = mover.forward();
        let home_y = 2 + mover.home_rank();
        let source = mv.source_offset();

        match mv.special() {
            Some(SpecialMove::PromoteNorm(_))
            | Some(SpecialMove::PromoteCapEast(_))
            | Some(SpecialMove::PromoteCapWest(_)) => {
                let dest = mv.actual_dest(mover);
                let promoted = self.at(dest);
                self.bump_inventory(promoted, -1);
                let pawn = Square::piece(mover, Piece::Pawn);
                self.bump_inventory(pawn, 1);
                self.squares[dest as usize] =
                    if matches!(mv.special(), Some(SpecialMove::PromoteNorm(_))) {
                        Square::EMPTY
                    } else {
                        self.bump_inventory(unmove.capture, 1);
                        unmove.capture
                    };
                self.squares[source as usize] = pawn;
            }
            Some(SpecialMove::CastleKingside) => {
                let king = Square::piece(mover, Piece::King);
                let rook = Square::piece(mover, Piece::Rook);
                self.squares[offset(8, home_y) as usize] = Square::EMPTY;
                self.squares[offset(6, home_y) as usize] = king;
                self.squares[offset(7, home_y) as usize] = Square::EMPTY;
                self.squares[offset(9, home_y) as usize] = rook;
                self.set_king_offset(mover, offset(6, home_y));
            }
            Some(SpecialMove::CastleQueenside) => {
                let king = Square::piece(mover, Piece::King);
                let rook = Square::piece(mover, Piece::Rook);
                self.squares[offset(4, home_y) as usize] = Square::EMPTY;
                self.squares[offset(6, home_y) as usize] = king;
                self.squares[offset(5, home_y) as usize] = Square::EMPTY;
                self.squares[offset(2, home_y) as usize] = rook;
                self.set_king_offset(mover, offset(6, home_y));
            }
            Some(SpecialMove::EnPassantEast) | Some(SpecialMove::EnPassantWest) => {
                let side = match mv.special() {
                    Some(SpecialMove::EnPassantEast) => EAST,
                    _ => WEST,
                };
                let dest = source + fwd + side;
                let pawn = self.at(dest);
                self.squares[dest as usize] = Square::EMPTY;
                self.squares[source as usize] = pawn;
                self.squares[(source + side) as usize] = unmove.capture;
                self.bump_inventory(unmove.capture, 1);
            }
            Some(SpecialMove::Null) | Some(SpecialMove::Edit) => {}
            None => {
                let dest = mv.dest as Offset;
                let piece = self.at(dest);
                self.squares[source as usize] = piece;
                self.squares[dest as usize] = unmove.capture;
                if !unmove.capture.is_empty() {
                    self.bump_inventory(unmove.capture, 1);
                }
                if piece.any(piece_mask(mover, Piece::King)) {
                    self.set_king_offset(mover, source);
                }
            }
        }

        #[cfg(debug_assertions)]
        self.debug_validate("unmake_move");
    }
}
