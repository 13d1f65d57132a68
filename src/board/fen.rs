//! Forsyth-Edwards Notation parsing and generation.

use super::error::FenError;
use super::moves::Move;
use super::state::{
    Board, SF_BKMOVED, SF_BKRMOVED, SF_BQRMOVED, SF_WKMOVED, SF_WKRMOVED, SF_WQRMOVED,
};
use super::types::{algebraic, file_of, piece_mask, rank_of, square_at, Color, Piece, Square};

impl Board {
    /// Build a board from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let mut board = Board::empty();
        board.set_fen(fen)?;
        Ok(board)
    }

    /// Replace the entire position from a FEN string. On error the board
    /// is left unchanged.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        let mut board = Board::empty();

        // Field 1: piece placement, rank 8 first.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadRankCount { ranks: ranks.len() });
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as i32;
            let mut file = 0i32;
            for ch in rank_text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as i32;
                } else {
                    let sq = Square::from_fen_char(ch).ok_or(FenError::InvalidPiece { ch })?;
                    if file > 7 {
                        return Err(FenError::BadRankWidth {
                            rank: rank as usize + 1,
                            files: file as usize + 1,
                        });
                    }
                    board.put_piece(square_at(file, rank), sq);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankWidth {
                    rank: rank as usize + 1,
                    files: file as usize,
                });
            }
        }

        // Field 2: side to move.
        board.white_to_move = match fields[1] {
            "w" => true,
            "b" => false,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        // Field 3: castling availability. A claimed right is honored only
        // when king and rook actually stand on their home squares.
        let mut wk = false;
        let mut wq = false;
        let mut bk = false;
        let mut bq = false;
        if fields[2] != "-" {
            for ch in fields[2].chars() {
                match ch {
                    'K' => wk = true,
                    'Q' => wq = true,
                    'k' => bk = true,
                    'q' => bq = true,
                    _ => return Err(FenError::InvalidCastling { ch }),
                }
            }
        }
        let white_king_home = board.square(4, 0).is(Color::White, Piece::King);
        let black_king_home = board.square(4, 7).is(Color::Black, Piece::King);
        let wk = wk && white_king_home && board.square(7, 0).is(Color::White, Piece::Rook);
        let wq = wq && white_king_home && board.square(0, 0).is(Color::White, Piece::Rook);
        let bk = bk && black_king_home && board.square(7, 7).is(Color::Black, Piece::Rook);
        let bq = bq && black_king_home && board.square(0, 7).is(Color::Black, Piece::Rook);

        board.flags = 0;
        if !wk {
            board.flags |= SF_WKRMOVED;
        }
        if !wq {
            board.flags |= SF_WQRMOVED;
        }
        if !wk && !wq {
            board.flags |= SF_WKMOVED;
        }
        if !bk {
            board.flags |= SF_BKRMOVED;
        }
        if !bq {
            board.flags |= SF_BQRMOVED;
        }
        if !bk && !bq {
            board.flags |= SF_BKMOVED;
        }

        // Field 4: en passant target. Recorded by synthesizing the
        // double-step pawn move that must have just happened; the move
        // generator recognizes en passant from the previous move.
        board.prev_move = Move::null();
        if fields[3] != "-" {
            let target = parse_square(fields[3]).ok_or_else(|| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?;
            let (file, rank) = target;
            let expected_rank = if board.white_to_move { 5 } else { 2 };
            if rank != expected_rank {
                return Err(FenError::InvalidEnPassant {
                    found: fields[3].to_string(),
                });
            }
            let pusher = board.to_move().opponent();
            let pawn_rank = if pusher.is_white() { 3 } else { 4 };
            let source_rank = pusher.home_rank() + if pusher.is_white() { 1 } else { -1 };
            if board
                .square(file, pawn_rank)
                .any(piece_mask(pusher, Piece::Pawn))
            {
                board.prev_move =
                    Move::normal(square_at(file, source_rank), square_at(file, pawn_rank));
            }
        }

        // Fields 5 and 6: halfmove clock and fullmove number.
        let halfmove: i32 = match fields.get(4) {
            Some(text) => text.parse().map_err(|_| FenError::InvalidCounter {
                found: (*text).to_string(),
            })?,
            None => 0,
        };
        let fullmove: i32 = match fields.get(5) {
            Some(text) => text.parse().map_err(|_| FenError::InvalidCounter {
                found: (*text).to_string(),
            })?,
            None => 1,
        };
        board.ply_number =
            2 * (fullmove.max(1) - 1) + i32::from(!board.white_to_move);
        board.last_cap_or_pawn = board.ply_number - halfmove;

        census_check(&board)?;

        board.finish_setup(true);
        *self = board;
        Ok(())
    }

    /// The position in Forsyth-Edwards Notation.
    #[must_use]
    pub fn get_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut run = 0;
            for file in 0..8 {
                match self.square(file, rank).to_fen_char() {
                    Some(c) => {
                        if run > 0 {
                            fen.push((b'0' + run) as char);
                            run = 0;
                        }
                        fen.push(c);
                    }
                    None => run += 1,
                }
            }
            if run > 0 {
                fen.push((b'0' + run) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.white_to_move { 'w' } else { 'b' });

        fen.push(' ');
        let mut any_castle = false;
        if self.flags & (SF_WKMOVED | SF_WKRMOVED) == 0 {
            fen.push('K');
            any_castle = true;
        }
        if self.flags & (SF_WKMOVED | SF_WQRMOVED) == 0 {
            fen.push('Q');
            any_castle = true;
        }
        if self.flags & (SF_BKMOVED | SF_BKRMOVED) == 0 {
            fen.push('k');
            any_castle = true;
        }
        if self.flags & (SF_BKMOVED | SF_BQRMOVED) == 0 {
            fen.push('q');
            any_castle = true;
        }
        if !any_castle {
            fen.push('-');
        }

        fen.push(' ');
        match self.en_passant_target() {
            Some(target) => fen.push_str(&algebraic(target)),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock().to_string());
        fen.push(' ');
        fen.push_str(&(self.ply_number / 2 + 1).to_string());

        fen
    }

    /// The square a pawn just double-stepped over, if the previous move
    /// was a double step.
    #[must_use]
    pub fn en_passant_target(&self) -> Option<super::types::Offset> {
        let prev = self.prev_move;
        if prev.is_null() || prev.is_special() {
            return None;
        }
        let dest = prev.dest as super::types::Offset;
        let source = prev.source_offset();
        let pusher = self.to_move().opponent();
        if !self.at(dest).any(piece_mask(pusher, Piece::Pawn)) {
            return None;
        }
        if (rank_of(source) - rank_of(dest)).abs() != 2 || file_of(source) != file_of(dest) {
            return None;
        }
        Some(square_at(file_of(dest), (rank_of(source) + rank_of(dest)) / 2))
    }
}

fn parse_square(text: &str) -> Option<(i32, i32)> {
    let mut chars = text.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some((file as i32 - 'a' as i32, rank as i32 - '1' as i32))
}

fn census_check(board: &Board) -> Result<(), FenError> {
    for color in [Color::White, Color::Black] {
        if board.inventory(color, Piece::King) != 1 {
            return Err(FenError::InvalidCensus {
                reason: "each side needs exactly one king",
            });
        }
        if board.inventory(color, Piece::Pawn) > 8 {
            return Err(FenError::InvalidCensus {
                reason: "too many pawns",
            });
        }
    }
    for file in 0..8 {
        for rank in [0, 7] {
            if matches!(board.square(file, rank).kind(), Some(Piece::Pawn)) {
                return Err(FenError::InvalidCensus {
                    reason: "pawn on a back rank",
                });
            }
        }
    }
    Ok(())
}

impl std::str::FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn initial_position_round_trips() {
        let board = Board::new();
        assert_eq!(board.get_fen(), START_FEN);
        let parsed = Board::from_fen(START_FEN).expect("start FEN");
        assert_eq!(parsed.hash(), board.hash());
        assert_eq!(parsed.get_fen(), START_FEN);
    }

    #[test]
    fn en_passant_field_round_trips() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let board = Board::from_fen(fen).expect("ep FEN");
        assert_eq!(board.en_passant_target(), Some(square_at(5, 5)));
        assert_eq!(board.get_fen(), fen);
    }

    #[test]
    fn castling_rights_parse_and_print() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w Kk - 0 1";
        let board = Board::from_fen(fen).expect("castle FEN");
        assert_eq!(board.get_fen(), fen);
    }

    #[test]
    fn rejects_missing_king() {
        let fen = "8/8/8/8/8/8/8/4K3 w - - 0 1";
        assert!(matches!(
            Board::from_fen(fen),
            Err(FenError::InvalidCensus { .. })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Board::from_fen("hello world").is_err());
        assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8 w KQkq -").is_err());
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(FenError::InvalidSideToMove { .. })
        ));
    }

    #[test]
    fn halfmove_clock_survives_round_trip() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 7 21";
        let board = Board::from_fen(fen).expect("FEN");
        assert_eq!(board.halfmove_clock(), 7);
        assert_eq!(board.get_fen(), fen);
    }
}
