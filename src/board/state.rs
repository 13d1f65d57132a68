//! Board state: the 12x12 square array plus every cached quantity the
//! search relies on (king offsets, material, inventory, hash, repetition
//! counts, game history).
//!
//! Cached fields are maintained incrementally by make/unmake and must
//! always agree with a from-scratch recomputation; `debug.rs` checks this
//! in debug builds.

use super::hash::{normalize_hash, piece_hash};
use super::moves::Move;
use super::types::{
    offset, on_board, square_at, Color, Offset, Piece, Square, BOARD_SIZE, FIRST_SQUARE,
    LAST_SQUARE, NORTH,
};

// Status flags: castling forfeits and check state.
pub(crate) const SF_WKMOVED: u8 = 0x01;
pub(crate) const SF_WKRMOVED: u8 = 0x02;
pub(crate) const SF_WQRMOVED: u8 = 0x04;
pub(crate) const SF_BKMOVED: u8 = 0x08;
pub(crate) const SF_BKRMOVED: u8 = 0x10;
pub(crate) const SF_BQRMOVED: u8 = 0x20;
pub(crate) const SF_WCHECK: u8 = 0x40;
pub(crate) const SF_BCHECK: u8 = 0x80;

/// Repetition counters are indexed by `hash % REPEAT_HASH_SIZE`; prime so
/// the low hash bits spread.
pub(crate) const REPEAT_HASH_SIZE: usize = 4093;

/// Everything `unmake` needs to restore the pre-move state that is not
/// derivable from the move itself.
#[derive(Clone, Copy, Debug)]
pub struct UnmoveInfo {
    pub(crate) capture: Square,
    pub(crate) flags: u8,
    pub(crate) wmaterial: i32,
    pub(crate) bmaterial: i32,
    pub(crate) prev_move: Move,
    pub(crate) last_cap_or_pawn: i32,
    pub(crate) cached_hash: u32,
}

impl UnmoveInfo {
    /// The move made just before the move this record belongs to, i.e.
    /// the opponent's previous move. Move ordering uses its destination
    /// for the recapture bonus.
    #[inline]
    #[must_use]
    pub fn previous_move(&self) -> Move {
        self.prev_move
    }
}

#[derive(Clone)]
pub struct Board {
    pub(crate) squares: [Square; BOARD_SIZE],
    pub(crate) white_to_move: bool,
    pub(crate) flags: u8,
    pub(crate) wk_offset: Offset,
    pub(crate) bk_offset: Offset,
    pub(crate) wmaterial: i32,
    pub(crate) bmaterial: i32,
    /// Piece counts indexed `color * 6 + kind`.
    pub(crate) inventory: [i16; 12],
    /// Plies played since the start of the game (not of the history).
    pub(crate) ply_number: i32,
    /// Ply number at which the recorded history begins (nonzero after a
    /// position was set up by FEN or editing).
    pub(crate) base_ply: i32,
    pub(crate) prev_move: Move,
    pub(crate) last_cap_or_pawn: i32,
    pub(crate) cached_hash: u32,
    /// Repetition counters for positions with White (resp. Black) to move.
    pub(crate) white_repeats: Box<[u16; REPEAT_HASH_SIZE]>,
    pub(crate) black_repeats: Box<[u16; REPEAT_HASH_SIZE]>,
    /// Moves since the history base, for undo, replay and notation.
    pub(crate) game_history: Vec<Move>,
    /// Hash after each history entry; `hash_history[0]` is the base
    /// position. Used to confirm threefold repetitions.
    pub(crate) hash_history: Vec<u32>,
    pub(crate) edited: bool,
}

impl Board {
    /// The standard initial position.
    #[must_use]
    pub fn new() -> Board {
        let mut board = Board::empty();
        let back = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back.iter().enumerate() {
            let file = file as i32;
            board.put_piece(square_at(file, 0), Square::piece(Color::White, *piece));
            board.put_piece(square_at(file, 1), Square::piece(Color::White, Piece::Pawn));
            board.put_piece(square_at(file, 6), Square::piece(Color::Black, Piece::Pawn));
            board.put_piece(square_at(file, 7), Square::piece(Color::Black, *piece));
        }
        board.finish_setup(false);
        board
    }

    /// An empty playable region inside the sentinel border. Not a legal
    /// position until pieces are placed and `finish_setup` runs.
    pub(crate) fn empty() -> Board {
        let mut squares = [Square::OFFBOARD; BOARD_SIZE];
        for ofs in FIRST_SQUARE..=LAST_SQUARE {
            if on_board(ofs) {
                squares[ofs as usize] = Square::EMPTY;
            }
        }
        Board {
            squares,
            white_to_move: true,
            flags: 0,
            wk_offset: 0,
            bk_offset: 0,
            wmaterial: 0,
            bmaterial: 0,
            inventory: [0; 12],
            ply_number: 0,
            base_ply: 0,
            prev_move: Move::null(),
            last_cap_or_pawn: 0,
            cached_hash: 0,
            white_repeats: Box::new([0; REPEAT_HASH_SIZE]),
            black_repeats: Box::new([0; REPEAT_HASH_SIZE]),
            game_history: Vec::new(),
            hash_history: Vec::new(),
            edited: false,
        }
    }

    /// Rebuild every cached quantity from the square array and start a
    /// fresh history at the current position.
    pub(crate) fn finish_setup(&mut self, edited: bool) {
        self.rebuild_census();
        self.cached_hash = self.calc_hash();
        self.refresh_check_flags();
        self.base_ply = self.ply_number;
        self.game_history.clear();
        self.hash_history.clear();
        self.hash_history.push(self.cached_hash);
        *self.white_repeats = [0; REPEAT_HASH_SIZE];
        *self.black_repeats = [0; REPEAT_HASH_SIZE];
        let side = self.to_move();
        self.repeat_slot(side, self.cached_hash, 1);
        self.edited = edited;
    }

    // -- simple accessors ---------------------------------------------------

    #[inline]
    #[must_use]
    pub(crate) fn at(&self, ofs: Offset) -> Square {
        self.squares[ofs as usize]
    }

    /// Contents of a zero-based (file, rank) square.
    #[must_use]
    pub fn square(&self, file: i32, rank: i32) -> Square {
        self.at(square_at(file, rank))
    }

    #[inline]
    #[must_use]
    pub fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    #[inline]
    #[must_use]
    pub fn to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u32 {
        self.cached_hash
    }

    #[inline]
    #[must_use]
    pub fn ply_number(&self) -> i32 {
        self.ply_number
    }

    #[inline]
    #[must_use]
    pub fn has_been_edited(&self) -> bool {
        self.edited
    }

    #[inline]
    #[must_use]
    pub fn king_offset(&self, color: Color) -> Offset {
        match color {
            Color::White => self.wk_offset,
            Color::Black => self.bk_offset,
        }
    }

    #[inline]
    #[must_use]
    pub fn material(&self, color: Color) -> i32 {
        match color {
            Color::White => self.wmaterial,
            Color::Black => self.bmaterial,
        }
    }

    #[inline]
    #[must_use]
    pub fn inventory(&self, color: Color, piece: Piece) -> i32 {
        self.inventory[color.index() * 6 + piece.index()] as i32
    }

    #[inline]
    #[must_use]
    pub fn in_check(&self, color: Color) -> bool {
        match color {
            Color::White => self.flags & SF_WCHECK != 0,
            Color::Black => self.flags & SF_BCHECK != 0,
        }
    }

    /// The move that produced this position, if any.
    #[inline]
    #[must_use]
    pub fn previous_move(&self) -> Move {
        self.prev_move
    }

    /// Raw status flags (castling forfeits and check bits).
    #[inline]
    #[must_use]
    pub(crate) fn flags(&self) -> u8 {
        self.flags
    }

    /// Moves recorded since the history base (game start or last edit).
    #[must_use]
    pub fn history(&self) -> &[Move] {
        &self.game_history
    }

    #[must_use]
    pub fn past_move(&self, history_index: usize) -> Option<Move> {
        self.game_history.get(history_index).copied()
    }

    // -- placement (setup paths only; play goes through make/unmake) --------

    /// Place `square` at `ofs`, maintaining inventory, material and king
    /// caches but not hash or history. Setup helper.
    pub(crate) fn put_piece(&mut self, ofs: Offset, square: Square) {
        debug_assert!(on_board(ofs));
        self.squares[ofs as usize] = square;
        if let (Some(color), Some(kind)) = (square.color(), square.kind()) {
            self.inventory[color.index() * 6 + kind.index()] += 1;
            match color {
                Color::White => self.wmaterial += kind.raw_value(),
                Color::Black => self.bmaterial += kind.raw_value(),
            }
            if kind == Piece::King {
                match color {
                    Color::White => self.wk_offset = ofs,
                    Color::Black => self.bk_offset = ofs,
                }
            }
        }
    }

    /// Overwrite one square as a board edit: history restarts here and
    /// the edited flag is raised.
    pub fn edit_square(&mut self, file: i32, rank: i32, square: Square) {
        let ofs = square_at(file, rank);
        self.squares[ofs as usize] = square;
        self.prev_move = Move::null();
        self.finish_setup(true);
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        if self.to_move() != color {
            self.white_to_move = color.is_white();
            self.finish_setup(true);
        }
    }

    // -- recomputation ------------------------------------------------------

    /// Census pass: recompute inventory, material and king offsets from
    /// the squares.
    pub(crate) fn rebuild_census(&mut self) {
        self.inventory = [0; 12];
        self.wmaterial = 0;
        self.bmaterial = 0;
        for ofs in FIRST_SQUARE..=LAST_SQUARE {
            if !on_board(ofs) {
                continue;
            }
            let sq = self.at(ofs);
            if let (Some(color), Some(kind)) = (sq.color(), sq.kind()) {
                self.inventory[color.index() * 6 + kind.index()] += 1;
                match color {
                    Color::White => self.wmaterial += kind.raw_value(),
                    Color::Black => self.bmaterial += kind.raw_value(),
                }
                if kind == Piece::King {
                    match color {
                        Color::White => self.wk_offset = ofs,
                        Color::Black => self.bk_offset = ofs,
                    }
                }
            }
        }
    }

    /// Hash recomputed from scratch; must equal `cached_hash` at all times.
    #[must_use]
    pub fn calc_hash(&self) -> u32 {
        let mut h: u32 = 0;
        for ofs in FIRST_SQUARE..=LAST_SQUARE {
            if !on_board(ofs) {
                continue;
            }
            let sq = self.at(ofs);
            if let (Some(color), Some(kind)) = (sq.color(), sq.kind()) {
                h = h.wrapping_add(piece_hash(color, kind, ofs));
            }
        }
        normalize_hash(h)
    }

    /// Recompute both in-check flags from attack scans.
    pub(crate) fn refresh_check_flags(&mut self) {
        self.flags &= !(SF_WCHECK | SF_BCHECK);
        if self.inventory(Color::White, Piece::King) == 1
            && self.is_attacked_by(Color::Black, self.wk_offset)
        {
            self.flags |= SF_WCHECK;
        }
        if self.inventory(Color::Black, Piece::King) == 1
            && self.is_attacked_by(Color::White, self.bk_offset)
        {
            self.flags |= SF_BCHECK;
        }
    }

    // -- repetition bookkeeping ---------------------------------------------

    #[inline]
    pub(crate) fn repeat_slot(&mut self, to_move: Color, hash: u32, delta: i32) {
        let idx = hash as usize % REPEAT_HASH_SIZE;
        let table = match to_move {
            Color::White => &mut self.white_repeats,
            Color::Black => &mut self.black_repeats,
        };
        table[idx] = (table[idx] as i32 + delta).max(0) as u16;
    }

    /// How many times the current position (by hash, same side to move)
    /// has occurred, the current occurrence included. Hash collisions can
    /// overcount; `is_definite_draw` confirms with a history walk.
    #[inline]
    #[must_use]
    pub fn number_of_repetitions(&self) -> u32 {
        let idx = self.cached_hash as usize % REPEAT_HASH_SIZE;
        let table = match self.to_move() {
            Color::White => &self.white_repeats,
            Color::Black => &self.black_repeats,
        };
        table[idx] as u32
    }

    /// Exact occurrence count of the current position in recorded history
    /// (same hash, same side to move), current occurrence included.
    #[must_use]
    pub(crate) fn repetition_walk_count(&self) -> u32 {
        let cur_index = (self.ply_number - self.base_ply) as usize;
        if cur_index >= self.hash_history.len() {
            return 1;
        }
        let cur = self.hash_history[cur_index];
        let mut count = 1u32;
        let mut i = cur_index;
        while i >= 2 {
            i -= 2;
            if self.hash_history[i] == cur {
                count += 1;
            }
        }
        count
    }

    // -- draw detection -----------------------------------------------------

    /// True when the position is drawn regardless of play: insufficient
    /// material, the 50-move rule, or threefold repetition.
    #[must_use]
    pub fn is_definite_draw(&self) -> bool {
        if self.is_insufficient_material() {
            return true;
        }
        if self.ply_number - self.last_cap_or_pawn >= 100 {
            return true;
        }
        self.number_of_repetitions() >= 3 && self.repetition_walk_count() >= 3
    }

    /// Plies since the last capture or pawn advance.
    #[must_use]
    pub fn halfmove_clock(&self) -> i32 {
        self.ply_number - self.last_cap_or_pawn
    }

    fn is_insufficient_material(&self) -> bool {
        for color in [Color::White, Color::Black] {
            for piece in [Piece::Pawn, Piece::Rook, Piece::Queen] {
                if self.inventory(color, piece) != 0 {
                    return false;
                }
            }
        }
        let minors: i32 = [Color::White, Color::Black]
            .iter()
            .map(|c| self.inventory(*c, Piece::Knight) + self.inventory(*c, Piece::Bishop))
            .sum();
        if minors <= 1 {
            return true;
        }
        let knights =
            self.inventory(Color::White, Piece::Knight) + self.inventory(Color::Black, Piece::Knight);
        let bishops =
            self.inventory(Color::White, Piece::Bishop) + self.inventory(Color::Black, Piece::Bishop);
        if knights == 0 && bishops == 2 {
            return self.bishops_on_same_color();
        }
        false
    }

    fn bishops_on_same_color(&self) -> bool {
        let mut seen_shade: Option<i32> = None;
        for ofs in FIRST_SQUARE..=LAST_SQUARE {
            if !on_board(ofs) {
                continue;
            }
            if self.at(ofs).any(super::types::WB_MASK | super::types::BB_MASK) {
                let shade = (ofs % 2) as i32;
                match seen_shade {
                    None => seen_shade = Some(shade),
                    Some(s) if s != shade => return false,
                    _ => {}
                }
            }
        }
        true
    }

    // -- misc queries used by search and hosts ------------------------------

    /// Count pieces matching `mask` standing on light squares (from
    /// White's view). The board parity trick: a playable offset is light
    /// exactly when it is odd.
    #[must_use]
    pub(crate) fn count_on_shade(&self, mask: u16, light: bool) -> i32 {
        let want = i32::from(light);
        let mut count = 0;
        let mut ybase = offset(2, 2);
        while ybase <= offset(2, 9) {
            for x in 0..8 {
                let ofs = ybase + x;
                if (ofs & 1) == want && self.at(ofs).any(mask) {
                    count += 1;
                }
            }
            ybase += NORTH;
        }
        count
    }

    /// True when `mv` is legal in this position.
    #[must_use]
    pub fn is_legal(&mut self, mv: Move) -> bool {
        if mv.is_null() {
            return false;
        }
        let mut ml = super::moves::MoveList::new();
        self.generate_moves(&mut ml);
        ml.contains(mv)
    }

}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

/// Position equality: same placement, side to move, castling state and
/// en-passant opportunity. History and clocks are deliberately excluded,
/// so a position reached by different move orders compares equal.
impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.white_to_move == other.white_to_move
            && (self.flags & 0x3f) == (other.flags & 0x3f)
            && self.en_passant_target() == other.en_passant_target()
            && self
                .squares
                .iter()
                .zip(other.squares.iter())
                .all(|(a, b)| a == b)
    }
}

impl Eq for Board {}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Board {{")?;
        for rank in (0..8).rev() {
            write!(f, "  ")?;
            for file in 0..8 {
                let sq = self.square(file, rank);
                let c = sq.to_fen_char().unwrap_or('.');
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "  {} to move, ply {}, hash {:08x}",
            if self.white_to_move { "White" } else { "Black" },
            self.ply_number,
            self.cached_hash
        )?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position_census() {
        let board = Board::new();
        assert_eq!(board.inventory(Color::White, Piece::Pawn), 8);
        assert_eq!(board.inventory(Color::Black, Piece::Pawn), 8);
        assert_eq!(board.inventory(Color::White, Piece::King), 1);
        assert_eq!(board.wk_offset, square_at(4, 0));
        assert_eq!(board.bk_offset, square_at(4, 7));
        assert_eq!(board.wmaterial, board.bmaterial);
        assert_eq!(board.hash(), board.calc_hash());
        assert!(!board.in_check(Color::White));
        assert!(!board.in_check(Color::Black));
    }

    #[test]
    fn sentinel_border_is_offboard() {
        let board = Board::new();
        for ofs in 0..BOARD_SIZE as Offset {
            if !on_board(ofs) {
                assert!(board.at(ofs).is_offboard(), "offset {ofs} must be border");
            }
        }
    }

    #[test]
    fn fresh_board_counts_itself_once() {
        let board = Board::new();
        assert_eq!(board.number_of_repetitions(), 1);
        assert_eq!(board.repetition_walk_count(), 1);
        assert!(!board.is_definite_draw());
    }

    #[test]
    fn bare_kings_are_a_draw() {
        let mut board = Board::empty();
        board.put_piece(square_at(4, 0), Square::piece(Color::White, Piece::King));
        board.put_piece(square_at(4, 7), Square::piece(Color::Black, Piece::King));
        board.finish_setup(true);
        assert!(board.is_definite_draw());
    }
}
