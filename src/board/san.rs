//! Move notation: parsing (`scan_move`) and formatting (`format_san`).
//!
//! `scan_move` accepts standard PGN short algebraic notation, long-form
//! coordinate notation ("e2e4", "e7e8q") and castling as O-O / 0-0.
//! Trailing check/mate/annotation marks are tolerated whether or not they
//! are accurate. Over-disambiguated forms ("N1c3", "Nbc3") are accepted;
//! genuinely ambiguous text is reported as such.

use super::error::MoveParseError;
use super::moves::{Move, MoveList};
use super::state::Board;
use super::types::{algebraic, file_of, rank_of, Piece};

impl Board {
    /// Parse one move in PGN or long algebraic notation and resolve it
    /// against the legal moves of the current position.
    pub fn scan_move(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let original = text;
        let trimmed: String = text
            .trim()
            .trim_end_matches(['+', '#', '!', '?'])
            .to_string();
        if trimmed.is_empty() {
            return Err(MoveParseError::BadSyntax {
                text: original.to_string(),
            });
        }

        let mut legal = MoveList::new();
        self.generate_moves(&mut legal);
        let mover = self.to_move();

        // Castling first: O-O / O-O-O with O, 0 or o.
        let castle_text: String = trimmed
            .chars()
            .map(|c| if c == '0' || c == 'o' { 'O' } else { c })
            .collect();
        if castle_text == "O-O" || castle_text == "O-O-O" {
            let queenside = castle_text == "O-O-O";
            for mv in legal.iter() {
                if mv.is_castle()
                    && (matches!(
                        mv.special(),
                        Some(super::moves::SpecialMove::CastleQueenside)
                    ) == queenside)
                {
                    return Ok(*mv);
                }
            }
            return Err(MoveParseError::IllegalMove {
                text: original.to_string(),
            });
        }

        let chars: Vec<char> = trimmed.chars().collect();

        // Long algebraic: e2e4, e7e8q.
        if let Some(mv) = Self::match_long_algebraic(&chars, &legal, mover)? {
            return Ok(mv);
        }

        // Short algebraic. Work from the right: optional promotion
        // suffix, then the destination square, then whatever
        // disambiguation is left on the front.
        let mut rest = &chars[..];
        let mut promotion: Option<Piece> = None;
        if let Some(&last) = rest.last() {
            if last.is_ascii_uppercase() && rest.len() > 2 {
                promotion =
                    Some(
                        Piece::from_san_char(last).ok_or(MoveParseError::InvalidPromotion {
                            ch: last,
                        })?,
                    );
                rest = &rest[..rest.len() - 1];
                if rest.last() == Some(&'=') {
                    rest = &rest[..rest.len() - 1];
                }
            }
        }

        if rest.len() < 2 {
            return Err(MoveParseError::BadSyntax {
                text: original.to_string(),
            });
        }
        let dest_file = rest[rest.len() - 2];
        let dest_rank = rest[rest.len() - 1];
        if !('a'..='h').contains(&dest_file) || !('1'..='8').contains(&dest_rank) {
            return Err(MoveParseError::BadSyntax {
                text: original.to_string(),
            });
        }
        let dest = super::types::square_at(
            dest_file as i32 - 'a' as i32,
            dest_rank as i32 - '1' as i32,
        );
        rest = &rest[..rest.len() - 2];

        let mut piece = Piece::Pawn;
        if let Some(&first) = rest.first() {
            if let Some(p) = Piece::from_san_char(first) {
                piece = p;
                rest = &rest[1..];
            }
        }

        let mut from_file: Option<i32> = None;
        let mut from_rank: Option<i32> = None;
        for &c in rest {
            match c {
                'a'..='h' => from_file = Some(c as i32 - 'a' as i32),
                '1'..='8' => from_rank = Some(c as i32 - '1' as i32),
                'x' => {}
                _ => {
                    return Err(MoveParseError::BadSyntax {
                        text: original.to_string(),
                    })
                }
            }
        }

        let mut found: Option<Move> = None;
        for mv in legal.iter() {
            let src = mv.source_offset();
            if self.at(src).kind() != Some(piece) {
                continue;
            }
            if mv.actual_dest(mover) != dest {
                continue;
            }
            if mv.promotion_piece() != promotion {
                continue;
            }
            if let Some(f) = from_file {
                if file_of(src) != f {
                    continue;
                }
            }
            if let Some(r) = from_rank {
                if rank_of(src) != r {
                    continue;
                }
            }
            if found.is_some() {
                return Err(MoveParseError::AmbiguousMove {
                    text: original.to_string(),
                });
            }
            found = Some(*mv);
        }

        found.ok_or(MoveParseError::IllegalMove {
            text: original.to_string(),
        })
    }

    fn match_long_algebraic(
        chars: &[char],
        legal: &MoveList,
        mover: super::types::Color,
    ) -> Result<Option<Move>, MoveParseError> {
        if chars.len() != 4 && chars.len() != 5 {
            return Ok(None);
        }
        let coords_ok = ('a'..='h').contains(&chars[0])
            && ('1'..='8').contains(&chars[1])
            && ('a'..='h').contains(&chars[2])
            && ('1'..='8').contains(&chars[3]);
        if !coords_ok {
            return Ok(None);
        }
        let source = super::types::square_at(
            chars[0] as i32 - 'a' as i32,
            chars[1] as i32 - '1' as i32,
        );
        let dest = super::types::square_at(
            chars[2] as i32 - 'a' as i32,
            chars[3] as i32 - '1' as i32,
        );
        let promotion = match chars.get(4) {
            Some(&c) => Some(
                Piece::from_san_char(c.to_ascii_uppercase()).ok_or(
                    MoveParseError::InvalidPromotion { ch: c },
                )?,
            ),
            None => None,
        };
        for mv in legal.iter() {
            if mv.source_offset() == source
                && mv.actual_dest(mover) == dest
                && mv.promotion_piece() == promotion
            {
                return Ok(Some(*mv));
            }
        }
        // Syntactically long algebraic but not a legal move; "e4e5" can
        // also never be valid SAN, so fail here rather than fall through.
        Err(MoveParseError::IllegalMove {
            text: chars.iter().collect(),
        })
    }

    /// Format a legal move in short algebraic notation, with check and
    /// mate suffixes.
    pub fn format_san(&mut self, mv: Move) -> String {
        let mover = self.to_move();
        let mut out = String::new();

        if mv.is_castle() {
            out.push_str(
                if matches!(
                    mv.special(),
                    Some(super::moves::SpecialMove::CastleQueenside)
                ) {
                    "O-O-O"
                } else {
                    "O-O"
                },
            );
        } else {
            let src = mv.source_offset();
            let dest = mv.actual_dest(mover);
            let piece = self.at(src).kind().unwrap_or(Piece::Pawn);
            let is_capture = !self.at(dest).is_empty() || mv.is_en_passant();

            if piece == Piece::Pawn {
                if is_capture {
                    out.push((b'a' + file_of(src) as u8) as char);
                }
            } else {
                out.push(piece.to_char().to_ascii_uppercase());

                // Disambiguate among same-kind pieces reaching the same
                // destination: file first, then rank, then both.
                let mut legal = MoveList::new();
                self.generate_moves(&mut legal);
                let twins: Vec<_> = legal
                    .iter()
                    .filter(|m| {
                        m.actual_dest(mover) == dest
                            && m.source_offset() != src
                            && self.at(m.source_offset()).kind() == Some(piece)
                    })
                    .collect();
                if !twins.is_empty() {
                    let file_clash = twins
                        .iter()
                        .any(|m| file_of(m.source_offset()) == file_of(src));
                    let rank_clash = twins
                        .iter()
                        .any(|m| rank_of(m.source_offset()) == rank_of(src));
                    if !file_clash {
                        out.push((b'a' + file_of(src) as u8) as char);
                    } else if !rank_clash {
                        out.push((b'1' + rank_of(src) as u8) as char);
                    } else {
                        out.push((b'a' + file_of(src) as u8) as char);
                        out.push((b'1' + rank_of(src) as u8) as char);
                    }
                }
            }

            if is_capture {
                out.push('x');
            }
            out.push_str(&algebraic(dest));
            if let Some(p) = mv.promotion_piece() {
                out.push('=');
                out.push(p.to_char().to_ascii_uppercase());
            }
        }

        // Check or mate suffix from the position after the move.
        let mut probe = mv;
        let unmove = self.make_move(&mut probe, true, true);
        let enemy = mover.opponent();
        if self.in_check(enemy) {
            if self.current_player_can_move() {
                out.push('+');
            } else {
                out.push('#');
            }
        }
        self.unmake_move(probe, &unmove);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_san_and_long_form() {
        let mut board = Board::new();
        let a = board.scan_move("Nf3").expect("Nf3");
        let b = board.scan_move("g1f3").expect("g1f3");
        assert_eq!(a, b);
        let pawn = board.scan_move("e4").expect("e4");
        assert_eq!(pawn, board.scan_move("e2e4").expect("e2e4"));
    }

    #[test]
    fn tolerates_check_marks() {
        let mut board = Board::new();
        assert!(board.scan_move("Nf3+").is_ok());
        assert!(board.scan_move("Nf3#").is_ok());
    }

    #[test]
    fn over_disambiguated_forms_accepted() {
        let mut board =
            Board::from_fen("4k3/8/8/8/8/8/8/RN2K1N1 w - - 0 1").expect("FEN");
        let a = board.scan_move("Nbc3").expect("Nbc3");
        let b = board.scan_move("N1c3").expect("N1c3");
        assert_eq!(a, b);
        // "Nc3" is fine too: only the b1 knight reaches c3.
        assert_eq!(a, board.scan_move("Nc3").expect("Nc3"));
    }

    #[test]
    fn ambiguity_is_reported() {
        // Two knights can both reach d2.
        let mut board =
            Board::from_fen("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1").expect("FEN");
        assert!(matches!(
            board.scan_move("Nd2"),
            Err(MoveParseError::AmbiguousMove { .. })
        ));
        assert!(board.scan_move("Nbd2").is_ok());
        assert!(board.scan_move("Nfd2").is_ok());
    }

    #[test]
    fn illegal_moves_are_rejected() {
        let mut board = Board::new();
        assert!(matches!(
            board.scan_move("Qd4"),
            Err(MoveParseError::IllegalMove { .. })
        ));
        assert!(matches!(
            board.scan_move("O-O"),
            Err(MoveParseError::IllegalMove { .. })
        ));
        assert!(board.scan_move("???").is_err());
    }

    #[test]
    fn en_passant_parses_as_pawn_capture() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .expect("FEN");
        let mv = board.scan_move("exf6").expect("exf6");
        assert!(mv.is_en_passant());
    }

    #[test]
    fn format_round_trips_through_parse() {
        let mut board = Board::new();
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        let n = ml.len();
        for i in 0..n {
            let mv = ml.as_slice()[i];
            let san = board.format_san(mv);
            let parsed = board.scan_move(&san).expect(&san);
            assert_eq!(parsed, mv, "SAN {san} did not round trip");
        }
    }

    #[test]
    fn promotion_formats_with_equals() {
        let mut board = Board::from_fen("8/P3k3/8/8/8/8/4K3/8 w - - 0 1").expect("FEN");
        let mv = board.scan_move("a8=Q").expect("a8=Q");
        let san = board.format_san(mv);
        assert!(san.starts_with("a8=Q"), "got {san}");
        assert_eq!(board.scan_move("a8Q").expect("a8Q"), mv);
        assert_eq!(board.scan_move("a7a8q").expect("long"), mv);
    }
}
