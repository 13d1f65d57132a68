//! Board invariant checking.
//!
//! `debug_validate` runs after every make/unmake in debug builds and is
//! deliberately O(1): king caches and hash sanity. `validate_full` is the
//! complete audit (census, material, hash recompute, sentinel border) and
//! is called from property tests and anywhere corruption is suspected.

use super::state::Board;
use super::types::{on_board, Color, Piece, BOARD_SIZE};

impl Board {
    #[cfg(debug_assertions)]
    pub(crate) fn debug_validate(&self, context: &str) {
        if !self.at(self.wk_offset).is(Color::White, Piece::King)
            || !self.at(self.bk_offset).is(Color::Black, Piece::King)
        {
            crate::fatal::chess_fatal(&format!("{context}: king offset cache is stale"));
        }
        if self.cached_hash == 0 {
            crate::fatal::chess_fatal(&format!("{context}: zero board hash"));
        }
    }

    /// Full invariant audit. Returns a description of the first violation
    /// found, if any.
    pub fn validate_full(&self) -> Result<(), String> {
        // Sentinel border intact.
        for ofs in 0..BOARD_SIZE as i32 {
            let sq = self.at(ofs);
            if on_board(ofs) {
                if sq.is_offboard() {
                    return Err(format!("playable square {ofs} marked off-board"));
                }
            } else if !sq.is_offboard() {
                return Err(format!("border square {ofs} overwritten"));
            }
        }

        // Census: inventory and material agree with the squares.
        let mut inventory = [0i16; 12];
        let mut wmaterial = 0;
        let mut bmaterial = 0;
        let mut wk = None;
        let mut bk = None;
        for ofs in 0..BOARD_SIZE as i32 {
            if !on_board(ofs) {
                continue;
            }
            let sq = self.at(ofs);
            if let (Some(color), Some(kind)) = (sq.color(), sq.kind()) {
                inventory[color.index() * 6 + kind.index()] += 1;
                match color {
                    Color::White => wmaterial += kind.raw_value(),
                    Color::Black => bmaterial += kind.raw_value(),
                }
                if kind == Piece::King {
                    match color {
                        Color::White => wk = Some(ofs),
                        Color::Black => bk = Some(ofs),
                    }
                }
            }
        }

        if inventory != self.inventory {
            return Err("inventory disagrees with board census".to_string());
        }
        if wmaterial != self.wmaterial || bmaterial != self.bmaterial {
            return Err("material totals disagree with board census".to_string());
        }
        match (wk, bk) {
            (Some(w), Some(b)) => {
                if w != self.wk_offset || b != self.bk_offset {
                    return Err("king offset caches are stale".to_string());
                }
            }
            _ => return Err("a king is missing from the board".to_string()),
        }
        if self.inventory(Color::White, Piece::King) != 1
            || self.inventory(Color::Black, Piece::King) != 1
        {
            return Err("each side must have exactly one king".to_string());
        }

        let recomputed = self.calc_hash();
        if recomputed != self.cached_hash {
            return Err(format!(
                "cached hash {:08x} != recomputed {:08x}",
                self.cached_hash, recomputed
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::moves::MoveList;

    #[test]
    fn initial_board_is_valid() {
        Board::new().validate_full().expect("valid");
    }

    #[test]
    fn boards_stay_valid_through_a_game_fragment() {
        let mut board = Board::new();
        for text in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Bxc6", "dxc6", "O-O"] {
            let mut mv = board.scan_move(text).expect(text);
            board.make_move(&mut mv, true, true);
            board.validate_full().expect(text);
        }
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        assert!(!ml.is_empty());
    }
}
