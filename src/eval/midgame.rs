//! The midgame evaluator.
//!
//! Score = material + king-position table (cautious or aggressive per the
//! opponent's remaining attackers) + the shared positional terms. The
//! material+king partial score supports lazy pruning: when it already
//! sits outside the search window by more than the safe margin, the rest
//! of the evaluation cannot change the outcome and is skipped.
//!
//! All heuristic constants are stored positive in the gene; bonus or
//! penalty is expressed at the use site.

use crate::board::{
    distance, offset, Board, Color, Offset, Piece, EAST, NORTH, NORTHEAST, NORTHWEST, SOUTH,
    SOUTHEAST, SOUTHWEST, WEST,
};
use crate::board::state::{
    SF_BKMOVED, SF_BKRMOVED, SF_BQRMOVED, SF_WKMOVED, SF_WKRMOVED, SF_WQRMOVED,
};
use crate::board::types::{
    BB_MASK, BK_MASK, BLACK_MASK, BN_MASK, BP_MASK, BQ_MASK, BR_MASK, EMPTY_BIT, KING_VAL,
    KNIGHT_DELTAS, KNIGHT_VAL, OFFBOARD_BIT, PAWN_VAL, QUEEN_VAL, ROOK_VAL, WB_MASK, WHITE_MASK,
    WK_MASK, WN_MASK, WP_MASK, WQ_MASK, WR_MASK,
};
use crate::score::{material_eval, win_postponement, Score, BLACK_WINS, DRAW, WHITE_WINS};

use super::gene::slot;
use super::tables::{
    rotated, BISHOP_POSITION, BLACK_KING_AGGRESSIVE, BLACK_KING_CAUTIOUS, KNIGHT_POSITION,
    PAWN_BALANCE, PAWN_CENTER, QUEEN_POSITION, WHITE_KING_AGGRESSIVE, WHITE_KING_CAUTIOUS,
};
use super::Evaluator;

/// Enemy pieces a white bishop can pin against something bigger.
const WB_PIN_MASK: u16 = BN_MASK | BR_MASK | BQ_MASK;
const BB_PIN_MASK: u16 = WN_MASK | WR_MASK | WQ_MASK;

impl Evaluator {
    /// Evaluate with White to move. `alpha`/`beta` enable lazy pruning.
    pub(crate) fn white_midgame_eval(
        &mut self,
        board: &mut Board,
        depth: i32,
        alpha: Score,
        beta: Score,
    ) -> Score {
        self.evaluated += 1;
        let v = &self.gene.v;

        if !board.current_player_can_move() {
            if board.in_check(Color::White) {
                return BLACK_WINS + win_postponement(depth);
            }
            return DRAW;
        }
        if board.is_definite_draw() {
            return DRAW;
        }

        let mut score = material_eval(board.material(Color::White), board.material(Color::Black));

        // The white king hides while Black retains a queen, or a rook
        // pair with minor-piece support.
        let timid_king = (board.inventory(Color::Black, Piece::Queen) > 0
            || board.inventory(Color::Black, Piece::Rook) > 1)
            && (board.inventory(Color::Black, Piece::Bishop) > 0
                || board.inventory(Color::Black, Piece::Knight) > 0);
        if timid_king {
            score += WHITE_KING_CAUTIOUS[board.king_offset(Color::White) as usize];
        } else {
            score += WHITE_KING_AGGRESSIVE[board.king_offset(Color::White) as usize];
        }

        // Lazy pruning: outside the window by more than the safe margin,
        // the positional terms cannot bring the score back.
        if score > beta + v[slot::SAFE_EVAL_PRUNE_MARGIN] {
            return score;
        }
        if score < alpha - v[slot::SAFE_EVAL_PRUNE_MARGIN] {
            return score;
        }

        score += self.common_midgame_eval(board);

        if board.in_check(Color::White) {
            score -= v[slot::CHECK_BONUS];
        }

        // Tempo nudge: quiescence reaches positions at varying depth, so
        // reward ending up with the move.
        score += v[slot::TEMPO_BONUS];

        // Postpone bad outcomes, expedite good ones.
        if score < 0 {
            score += depth;
        } else if score > 0 {
            score -= depth;
        }

        score
    }

    /// Evaluate with Black to move.
    pub(crate) fn black_midgame_eval(
        &mut self,
        board: &mut Board,
        depth: i32,
        alpha: Score,
        beta: Score,
    ) -> Score {
        self.evaluated += 1;
        let v = &self.gene.v;

        if !board.current_player_can_move() {
            if board.in_check(Color::Black) {
                return WHITE_WINS - win_postponement(depth);
            }
            return DRAW;
        }
        if board.is_definite_draw() {
            return DRAW;
        }

        let mut score = material_eval(board.material(Color::White), board.material(Color::Black));

        let timid_king = (board.inventory(Color::White, Piece::Queen) > 0
            || board.inventory(Color::White, Piece::Rook) > 1)
            && (board.inventory(Color::White, Piece::Bishop) > 0
                || board.inventory(Color::White, Piece::Knight) > 0);
        if timid_king {
            score -= BLACK_KING_CAUTIOUS[board.king_offset(Color::Black) as usize];
        } else {
            score -= BLACK_KING_AGGRESSIVE[board.king_offset(Color::Black) as usize];
        }

        if score < alpha - v[slot::SAFE_EVAL_PRUNE_MARGIN] {
            return score;
        }
        if score > beta + v[slot::SAFE_EVAL_PRUNE_MARGIN] {
            return score;
        }

        score += self.common_midgame_eval(board);

        if board.in_check(Color::Black) {
            score += v[slot::CHECK_BONUS];
        }

        score -= v[slot::TEMPO_BONUS];

        if score < 0 {
            score += depth;
        } else if score > 0 {
            score -= depth;
        }

        score
    }

    /// The side-to-move-independent positional terms.
    fn common_midgame_eval(&self, board: &Board) -> Score {
        let v = &self.gene.v;
        let mut score: Score = 0;
        let wk = board.king_offset(Color::White);
        let bk = board.king_offset(Color::Black);

        score += self.white_king_terms(board, wk, bk);
        score += self.black_king_terms(board, wk, bk);

        // Positional sweep over every piece.
        let mut ybase = offset(2, 2);
        while ybase <= offset(2, 9) {
            for x in 0..8 {
                let ofs = ybase + x;
                let sq = board.at(ofs);
                if sq.is_empty() {
                    continue;
                }
                if sq.any(WHITE_MASK) {
                    if sq.any(WP_MASK) {
                        score += self.white_pawn_bonus(board, ofs, x, ybase);
                    } else if sq.any(WN_MASK) {
                        score += self.white_knight_bonus(board, ofs, bk);
                    } else if sq.any(WB_MASK) {
                        score += self.white_bishop_bonus(board, ofs, bk);
                    } else if sq.any(WR_MASK) {
                        score += self.white_rook_bonus(board, ofs, bk);
                    } else if sq.any(WQ_MASK) {
                        score += self.white_queen_bonus(board, ofs, bk);
                    }
                } else if sq.any(BP_MASK) {
                    score -= self.black_pawn_bonus(board, ofs, x, ybase);
                } else if sq.any(BN_MASK) {
                    score -= self.black_knight_bonus(board, ofs, wk);
                } else if sq.any(BB_MASK) {
                    score -= self.black_bishop_bonus(board, ofs, wk);
                } else if sq.any(BR_MASK) {
                    score -= self.black_rook_bonus(board, ofs, wk);
                } else if sq.any(BQ_MASK) {
                    score -= self.black_queen_bonus(board, ofs, wk);
                }
            }
            ybase += NORTH;
        }

        // Pawn imbalance, scaled by the poorer side's piece material:
        // extra pawns matter more as the pieces that could stop them
        // disappear.
        let nwp = board.inventory(Color::White, Piece::Pawn);
        let nbp = board.inventory(Color::Black, Piece::Pawn);
        if nwp > nbp {
            let denom = board.material(Color::Black) - PAWN_VAL * nbp;
            score += KING_VAL * PAWN_BALANCE[nbp as usize][nwp as usize] / denom;
        } else if nbp > nwp {
            let denom = board.material(Color::White) - PAWN_VAL * nwp;
            score -= KING_VAL * PAWN_BALANCE[nwp as usize][nbp as usize] / denom;
        }

        if board.inventory(Color::White, Piece::Bishop) == 2 {
            score += v[slot::TWO_BISHOP_SYNERGY];
        }
        if board.inventory(Color::Black, Piece::Bishop) == 2 {
            score -= v[slot::TWO_BISHOP_SYNERGY];
        }

        score
    }

    // -- king safety and castling readiness ---------------------------------

    #[allow(clippy::too_many_lines)]
    fn white_king_terms(&self, board: &Board, wk: Offset, bk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score: Score = 0;
        let at = |d: Offset| board.at(d);

        let timid = (board.inventory(Color::Black, Piece::Queen) > 0
            || board.inventory(Color::Black, Piece::Rook) > 1)
            && (board.inventory(Color::Black, Piece::Bishop) > 0
                || board.inventory(Color::Black, Piece::Knight) > 0);

        if board.flags() & SF_WKMOVED != 0 {
            if timid {
                // Rooks shut in beside a castled king, and the knight
                // that guards the castled position.
                if wk == offset(8, 2) {
                    if at(offset(9, 2)).any(WR_MASK) {
                        score -= v[slot::ROOK_TRAPPED_BY_KING];
                    }
                    if at(offset(9, 3)).any(WR_MASK) {
                        score -= v[slot::ROOK_TRAPPED_BY_KING];
                    }
                    if at(offset(7, 4)).any(WN_MASK) {
                        score += v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if wk == offset(7, 2) {
                    for trap in [offset(8, 2), offset(9, 2), offset(8, 3), offset(9, 3)] {
                        if at(trap).any(WR_MASK) {
                            score -= v[slot::ROOK_TRAPPED_BY_KING];
                        }
                    }
                    if at(offset(7, 4)).any(WN_MASK) {
                        score += v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if wk == offset(4, 2) {
                    for trap in [offset(3, 2), offset(2, 2), offset(2, 3), offset(3, 3)] {
                        if at(trap).any(WR_MASK) {
                            score -= v[slot::ROOK_TRAPPED_BY_KING];
                        }
                    }
                    if at(offset(4, 4)).any(WN_MASK) {
                        score += v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if wk == offset(3, 2) {
                    for trap in [offset(2, 2), offset(3, 3)] {
                        if at(trap).any(WR_MASK) {
                            score -= v[slot::ROOK_TRAPPED_BY_KING];
                        }
                    }
                    if at(offset(4, 4)).any(WN_MASK) {
                        score += v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if wk == offset(2, 2) {
                    if at(offset(4, 4)).any(WN_MASK) {
                        score += v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if wk == offset(9, 2) {
                    if at(offset(7, 4)).any(WN_MASK) {
                        score += v[slot::CASTLE_KNIGHT_GUARD];
                    }
                }

                if wk != offset(6, 2) && wk != offset(5, 2) {
                    // Pawn shield in front of the king, with hole
                    // penalties where the shield is gone for good.
                    if at(wk + offset(-1, 1)).any(WP_MASK) {
                        score += v[slot::PAWN_PROTECTS_KING2];
                    } else if wk < offset(2, 6)
                        && !at(wk + offset(-1, 2)).any(WP_MASK | OFFBOARD_BIT)
                        && !at(wk + offset(-1, 3)).any(WP_MASK | OFFBOARD_BIT)
                    {
                        score -= v[slot::CASTLE_HOLE1];
                        score -= self.castle_hole_danger(
                            board,
                            wk + offset(-1, 0),
                            NORTH,
                            BR_MASK | BQ_MASK,
                        );
                    }

                    if at(wk + offset(0, 1)).any(WP_MASK) {
                        score += v[slot::PAWN_PROTECTS_KING1];
                    } else if wk < offset(2, 6)
                        && !at(wk + offset(0, 2)).any(WP_MASK)
                        && !at(wk + offset(0, 3)).any(WP_MASK)
                    {
                        score -= v[slot::CASTLE_HOLE2];
                        score -= self.castle_hole_danger(board, wk, NORTH, BR_MASK | BQ_MASK);
                    }

                    if at(wk + offset(1, 1)).any(WP_MASK) {
                        score += v[slot::PAWN_PROTECTS_KING2];
                    } else if wk < offset(2, 6)
                        && !at(wk + offset(0, 2)).any(WP_MASK)
                        && !at(wk + offset(0, 3)).any(WP_MASK)
                    {
                        score -= v[slot::CASTLE_HOLE3];
                        score -= self.castle_hole_danger(
                            board,
                            wk + offset(1, 0),
                            NORTH,
                            BR_MASK | BQ_MASK,
                        );
                    }

                    if at(wk + offset(-1, 2)).any(WP_MASK) {
                        score += v[slot::PAWN_PROTECTS_KING3];
                    }
                    if at(wk + offset(0, 2)).any(WP_MASK) {
                        score += v[slot::PAWN_PROTECTS_KING2];
                    }
                    if at(wk + offset(1, 2)).any(WP_MASK) {
                        score += v[slot::PAWN_PROTECTS_KING3];
                    }
                }
            } else if board.white_to_move() {
                // Endgame-style king: claim the opposition.
                let kk = wk - bk;
                if kk == offset(2, 0)
                    || kk == offset(0, 2)
                    || kk == offset(-2, 0)
                    || kk == offset(0, -2)
                {
                    score += v[slot::KING_OPPOSITION];
                }
            }
        } else {
            // King not yet moved: reward keeping castling alive and
            // clearing the paths.
            if board.flags() & SF_WKRMOVED == 0 {
                if at(offset(7, 2)).raw() == EMPTY_BIT {
                    score += v[slot::KCASTLE_PATH_EMPTY];
                }
                if at(offset(8, 2)).raw() == EMPTY_BIT {
                    score += v[slot::KCASTLE_PATH_EMPTY];
                }
                if board.flags() & SF_WQRMOVED == 0 {
                    score += v[slot::CAN_KQCASTLE_BONUS];
                    for sq in [offset(3, 2), offset(4, 2), offset(5, 2)] {
                        if at(sq).raw() == EMPTY_BIT {
                            score += v[slot::QCASTLE_PATH_EMPTY];
                        }
                    }
                } else {
                    score += v[slot::CAN_KCASTLE_BONUS];
                }
            } else if board.flags() & SF_WQRMOVED == 0 {
                score += v[slot::CAN_QCASTLE_BONUS];
                for sq in [offset(3, 2), offset(4, 2), offset(5, 2)] {
                    if at(sq).raw() == EMPTY_BIT {
                        score += v[slot::QCASTLE_PATH_EMPTY];
                    }
                }
            }
        }

        score
    }

    #[allow(clippy::too_many_lines)]
    fn black_king_terms(&self, board: &Board, wk: Offset, bk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score: Score = 0;
        let at = |d: Offset| board.at(d);

        let timid = (board.inventory(Color::White, Piece::Queen) > 0
            || board.inventory(Color::White, Piece::Rook) > 1)
            && (board.inventory(Color::White, Piece::Bishop) > 0
                || board.inventory(Color::White, Piece::Knight) > 0);

        if board.flags() & SF_BKMOVED != 0 {
            if timid {
                if bk == offset(8, 9) {
                    if at(offset(9, 9)).any(BR_MASK) {
                        score += v[slot::ROOK_TRAPPED_BY_KING];
                    }
                    if at(offset(9, 8)).any(BR_MASK) {
                        score += v[slot::ROOK_TRAPPED_BY_KING];
                    }
                } else if bk == offset(7, 9) {
                    for trap in [offset(8, 9), offset(8, 8), offset(9, 8), offset(9, 9)] {
                        if at(trap).any(BR_MASK) {
                            score += v[slot::ROOK_TRAPPED_BY_KING];
                        }
                    }
                } else if bk == offset(9, 9) {
                    if at(offset(7, 7)).any(BN_MASK) {
                        score -= v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if bk == offset(4, 9) {
                    for trap in [offset(3, 9), offset(3, 8), offset(2, 9), offset(2, 8)] {
                        if at(trap).any(BR_MASK) {
                            score += v[slot::ROOK_TRAPPED_BY_KING];
                        }
                    }
                    if at(offset(4, 7)).any(BN_MASK) {
                        score -= v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if bk == offset(3, 9) {
                    for trap in [offset(2, 9), offset(2, 8)] {
                        if at(trap).any(BR_MASK) {
                            score += v[slot::ROOK_TRAPPED_BY_KING];
                        }
                    }
                    if at(offset(4, 7)).any(BN_MASK) {
                        score -= v[slot::CASTLE_KNIGHT_GUARD];
                    }
                } else if bk == offset(2, 9) && at(offset(4, 7)).any(BN_MASK) {
                    score -= v[slot::CASTLE_KNIGHT_GUARD];
                }

                if bk != offset(6, 9) && bk != offset(5, 9) {
                    if at(bk + offset(-1, -1)).any(BP_MASK) {
                        score -= v[slot::PAWN_PROTECTS_KING2];
                    } else if bk > offset(9, 5)
                        && !at(bk + offset(-1, -2)).any(BP_MASK | OFFBOARD_BIT)
                        && !at(bk + offset(-1, -3)).any(BP_MASK | OFFBOARD_BIT)
                    {
                        score += v[slot::CASTLE_HOLE1];
                        score += self.castle_hole_danger(
                            board,
                            bk + offset(-1, 0),
                            SOUTH,
                            WR_MASK | WQ_MASK,
                        );
                    }

                    if at(bk + offset(0, -1)).any(BP_MASK) {
                        score -= v[slot::PAWN_PROTECTS_KING1];
                    } else if bk > offset(9, 5)
                        && !at(bk + offset(0, -2)).any(BP_MASK)
                        && !at(bk + offset(0, -3)).any(BP_MASK)
                    {
                        score += v[slot::CASTLE_HOLE2];
                        score += self.castle_hole_danger(board, bk, SOUTH, WR_MASK | WQ_MASK);
                    }

                    if at(bk + offset(1, -1)).any(BP_MASK) {
                        score -= v[slot::PAWN_PROTECTS_KING2];
                    } else if bk > offset(9, 5)
                        && !at(bk + offset(1, -2)).any(BP_MASK)
                        && !at(bk + offset(1, -3)).any(BP_MASK)
                    {
                        score += v[slot::CASTLE_HOLE3];
                        score += self.castle_hole_danger(
                            board,
                            bk + offset(1, 0),
                            SOUTH,
                            WR_MASK | WQ_MASK,
                        );
                    }

                    if at(bk + offset(-1, -2)).any(BP_MASK) {
                        score -= v[slot::PAWN_PROTECTS_KING3];
                    }
                    if at(bk + offset(0, -2)).any(BP_MASK) {
                        score -= v[slot::PAWN_PROTECTS_KING2];
                    }
                    if at(bk + offset(1, -2)).any(BP_MASK) {
                        score -= v[slot::PAWN_PROTECTS_KING3];
                    }
                }
            } else if !board.white_to_move() {
                let kk = wk - bk;
                if kk == offset(2, 0)
                    || kk == offset(0, 2)
                    || kk == offset(-2, 0)
                    || kk == offset(0, -2)
                {
                    score -= v[slot::KING_OPPOSITION];
                }
            }
        } else {
            if board.flags() & SF_BKRMOVED == 0 {
                if at(offset(7, 9)).raw() == EMPTY_BIT {
                    score -= v[slot::KCASTLE_PATH_EMPTY];
                }
                if at(offset(8, 9)).raw() == EMPTY_BIT {
                    score -= v[slot::KCASTLE_PATH_EMPTY];
                }
                if board.flags() & SF_BQRMOVED == 0 {
                    score -= v[slot::CAN_KQCASTLE_BONUS];
                    for sq in [offset(3, 9), offset(4, 9), offset(5, 9)] {
                        if at(sq).raw() == EMPTY_BIT {
                            score -= v[slot::QCASTLE_PATH_EMPTY];
                        }
                    }
                } else {
                    score -= v[slot::CAN_KCASTLE_BONUS];
                }
            } else if board.flags() & SF_BQRMOVED == 0 {
                score -= v[slot::CAN_QCASTLE_BONUS];
                for sq in [offset(3, 9), offset(4, 9), offset(5, 9)] {
                    if at(sq).raw() == EMPTY_BIT {
                        score -= v[slot::QCASTLE_PATH_EMPTY];
                    }
                }
            }
        }

        score
    }

    /// Walk away from a shield hole counting enemy heavy pieces bearing
    /// down the open file.
    fn castle_hole_danger(&self, board: &Board, start: Offset, dir: Offset, mask: u16) -> Score {
        let v = &self.gene.v;
        let mut score: Score = 0;
        let mut ofs = start;
        loop {
            let sq = board.at(ofs);
            if sq.any(mask) {
                score += v[slot::CASTLE_HOLE_DANGER];
            } else if !sq.is_empty() {
                break;
            }
            ofs += dir;
        }
        score
    }

    // -- rooks ---------------------------------------------------------------

    fn white_rook_bonus(&self, board: &Board, ofs: Offset, bk: Offset) -> Score {
        let v = &self.gene.v;
        let mut bonus: Score = 0;

        if ofs >= offset(2, 8) {
            if ofs <= offset(9, 8) {
                bonus += v[slot::ROOK_ON_7TH_RANK];
            } else {
                bonus += v[slot::ROOK_CAN_REACH_7TH_RANK] + v[slot::ROOK_OPEN_FILE];
            }
        } else {
            // How far up the file the rook sees; open files and seventh
            // rank access come from where the scan stops.
            let mut z = ofs + NORTH;
            while board.at(z).is_empty() && z < offset(2, 8) {
                z += NORTH;
            }
            bonus += (crate::board::types::ypart(z) - 2) / 2;
            if z < offset(2, 8) {
                if !board.at(z).any(WP_MASK) {
                    bonus += v[slot::ROOK_OPEN_FILE];
                }
            } else if z > offset(9, 8) {
                bonus += v[slot::ROOK_CAN_REACH_7TH_RANK];
            }

            let mut z = ofs + SOUTH;
            while board.at(z).is_empty() {
                z += SOUTH;
            }
            if board.at(z).any(WR_MASK | WQ_MASK) {
                bonus += v[slot::ROOK_CONNECT_VERT];
            }

            let mut z = ofs + WEST;
            while board.at(z).is_empty() {
                z += WEST;
            }
            if board.at(z).any(WR_MASK) {
                bonus += v[slot::ROOK_CONNECT_HOR];
            }
        }

        if board.at(ofs + EAST).any(WHITE_MASK | OFFBOARD_BIT)
            && board.at(ofs + WEST).any(WHITE_MASK | OFFBOARD_BIT)
        {
            if board.at(ofs + NORTH).any(WHITE_MASK | OFFBOARD_BIT)
                && board.at(ofs + SOUTH).any(WHITE_MASK | OFFBOARD_BIT)
            {
                bonus -= v[slot::ROOK_IMMOBILE];
            } else {
                bonus -= v[slot::ROOK_IMMOBILE_HORIZ];
            }
        }

        if distance(ofs, bk) < 3 {
            bonus += v[slot::CTEK_ROOK];
        }

        for dir in [NORTH, EAST, WEST, SOUTH] {
            bonus += self.rook_line_terms(
                board,
                ofs,
                dir,
                BB_MASK | BN_MASK,
                BQ_MASK,
                BK_MASK,
                WR_MASK | WQ_MASK,
                true,
            );
        }

        bonus
    }

    fn black_rook_bonus(&self, board: &Board, ofs: Offset, wk: Offset) -> Score {
        let v = &self.gene.v;
        let mut bonus: Score = 0;

        if ofs <= offset(9, 3) {
            if ofs >= offset(2, 3) {
                bonus += v[slot::ROOK_ON_7TH_RANK];
            } else {
                bonus += v[slot::ROOK_CAN_REACH_7TH_RANK] + v[slot::ROOK_OPEN_FILE];
            }
        } else {
            let mut z = ofs + SOUTH;
            while board.at(z).is_empty() && z > offset(9, 3) {
                z += SOUTH;
            }
            bonus += (9 - crate::board::types::ypart(z)) / 2;
            if z > offset(9, 3) {
                if !board.at(z).any(BP_MASK) {
                    bonus += v[slot::ROOK_OPEN_FILE];
                }
            } else if z < offset(3, 3) {
                bonus += v[slot::ROOK_CAN_REACH_7TH_RANK];
            }

            let mut z = ofs + NORTH;
            while board.at(z).is_empty() {
                z += NORTH;
            }
            if board.at(z).any(BR_MASK | BQ_MASK) {
                bonus += v[slot::ROOK_CONNECT_VERT];
            }

            let mut z = ofs + WEST;
            while board.at(z).is_empty() {
                z += WEST;
            }
            if board.at(z).any(BR_MASK) {
                bonus += v[slot::ROOK_CONNECT_HOR];
            }
        }

        if board.at(ofs + EAST).any(BLACK_MASK | OFFBOARD_BIT)
            && board.at(ofs + WEST).any(BLACK_MASK | OFFBOARD_BIT)
        {
            if board.at(ofs + NORTH).any(BLACK_MASK | OFFBOARD_BIT)
                && board.at(ofs + SOUTH).any(BLACK_MASK | OFFBOARD_BIT)
            {
                bonus -= v[slot::ROOK_IMMOBILE];
            } else {
                bonus -= v[slot::ROOK_IMMOBILE_HORIZ];
            }
        }

        if distance(ofs, wk) < 3 {
            bonus += v[slot::CTEK_ROOK];
        }

        for dir in [NORTH, EAST, WEST, SOUTH] {
            bonus += self.rook_line_terms(
                board,
                ofs,
                dir,
                WB_MASK | WN_MASK,
                WQ_MASK,
                WK_MASK,
                BR_MASK | BQ_MASK,
                false,
            );
        }

        bonus
    }

    /// One rook ray: pin detection at the first blocker, then an x-ray
    /// continuation through own rooks/queens to the square where the ray
    /// truly stops, scored for enemy-king pressure and own-king cover.
    #[allow(clippy::too_many_arguments)]
    fn rook_line_terms(
        &self,
        board: &Board,
        ofs: Offset,
        dir: Offset,
        pinnable: u16,
        enemy_queen: u16,
        enemy_king: u16,
        xray: u16,
        white: bool,
    ) -> Score {
        let v = &self.gene.v;
        let mut bonus: Score = 0;

        let mut z = ofs + dir;
        while board.at(z).is_empty() {
            z += dir;
        }
        let hold = z;
        if board.at(z).any(pinnable) {
            z += dir;
            while board.at(z).is_empty() {
                z += dir;
            }
            if board.at(z).any(enemy_queen) {
                bonus += v[slot::ROOK_PIN_Q];
            } else if board.at(z).any(enemy_king) {
                bonus += v[slot::ROOK_PIN_K];
            }
        }

        let mut z = hold;
        while board.at(z).is_empty() || board.at(z).any(xray) {
            z += dir;
        }
        if white {
            if attack_black_king_pos(board, z) {
                bonus += v[slot::ROOK_ATTACK_KPOS];
            }
            if attack_white_king_pos(board, z) {
                bonus += v[slot::ROOK_PROTECT_KPOS];
            }
        } else {
            if attack_white_king_pos(board, z) {
                bonus += v[slot::ROOK_ATTACK_KPOS];
            }
            if attack_black_king_pos(board, z) {
                bonus += v[slot::ROOK_PROTECT_KPOS];
            }
        }

        bonus
    }

    // -- bishops -------------------------------------------------------------

    fn white_bishop_bonus(&self, board: &Board, ofs: Offset, bk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = BISHOP_POSITION[ofs as usize];

        let blocked = |d: Offset| board.at(ofs + d).any(WHITE_MASK | OFFBOARD_BIT);
        if blocked(NORTHEAST) && blocked(NORTHWEST) && blocked(SOUTHEAST) && blocked(SOUTHWEST) {
            score -= v[slot::BISHOP_IMMOBILE];
        } else {
            let mut count: Score = 0;
            for dir in [NORTHEAST, NORTHWEST, SOUTHEAST, SOUTHWEST] {
                // Mobility: empty squares along the ray not covered by an
                // enemy pawn.
                let mut z = ofs + dir;
                while board.at(z).is_empty() {
                    if !board.at(z + NORTHEAST).any(BP_MASK)
                        && !board.at(z + NORTHWEST).any(BP_MASK)
                    {
                        count += 1;
                    }
                    z += dir;
                }

                // Forward rays also pressure the enemy king position,
                // seen through own bishop/queen x-rays.
                if dir == NORTHEAST || dir == NORTHWEST {
                    let mut k = z;
                    while board.at(k).is_empty() || board.at(k).any(WB_MASK | WQ_MASK) {
                        k += dir;
                    }
                    if attack_black_king_pos(board, k) {
                        score += v[slot::BISHOP_ATTACK_KPOS];
                    }
                    if attack_white_king_pos(board, k) {
                        score += v[slot::BISHOP_PROTECT_KPOS];
                    }
                }

                if board.at(z).any(WB_PIN_MASK) {
                    let mut p = z + dir;
                    while board.at(p).is_empty() {
                        p += dir;
                    }
                    if board.at(p).any(BQ_MASK | BK_MASK | BR_MASK) {
                        if board.at(p).any(BR_MASK) {
                            count += v[slot::BISHOP_PIN_R];
                        } else if board.at(p).any(BQ_MASK) {
                            count += v[slot::BISHOP_PIN_Q];
                        } else {
                            count += v[slot::BISHOP_PIN_K];
                        }
                    }
                }
            }
            score += count;
        }

        if distance(ofs, bk) < 4 {
            score += v[slot::CTEK_BISHOP];
        }

        // Keep the home bishops from being buried behind a center pawn
        // pushed one square and a blocked developing square.
        if ofs == offset(7, 2) {
            if !board.at(offset(6, 4)).is_empty() && board.at(offset(6, 3)).any(WP_MASK) {
                score -= v[slot::CENTER_BLOCK_BISHOP1];
            }
            if !board.at(offset(5, 4)).is_empty() {
                score -= v[slot::CENTER_BLOCK_BISHOP2];
            }
        } else if ofs == offset(4, 2) {
            if !board.at(offset(5, 4)).is_empty() && board.at(offset(5, 3)).any(WP_MASK) {
                score -= v[slot::CENTER_BLOCK_BISHOP1];
            }
            if !board.at(offset(6, 4)).is_empty() {
                score -= v[slot::CENTER_BLOCK_BISHOP2];
            }
        }

        score
    }

    fn black_bishop_bonus(&self, board: &Board, ofs: Offset, wk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = BISHOP_POSITION[rotated(ofs)];

        let blocked = |d: Offset| board.at(ofs + d).any(BLACK_MASK | OFFBOARD_BIT);
        if blocked(NORTHEAST) && blocked(NORTHWEST) && blocked(SOUTHEAST) && blocked(SOUTHWEST) {
            score -= v[slot::BISHOP_IMMOBILE];
        } else {
            let mut count: Score = 0;
            for dir in [SOUTHEAST, SOUTHWEST, NORTHEAST, NORTHWEST] {
                let mut z = ofs + dir;
                while board.at(z).is_empty() {
                    if !board.at(z + SOUTHEAST).any(WP_MASK)
                        && !board.at(z + SOUTHWEST).any(WP_MASK)
                    {
                        count += 1;
                    }
                    z += dir;
                }

                if dir == SOUTHEAST || dir == SOUTHWEST {
                    let mut k = z;
                    while board.at(k).is_empty() || board.at(k).any(BB_MASK | BQ_MASK) {
                        k += dir;
                    }
                    if attack_white_king_pos(board, k) {
                        score += v[slot::BISHOP_ATTACK_KPOS];
                    }
                    if attack_black_king_pos(board, k) {
                        score += v[slot::BISHOP_PROTECT_KPOS];
                    }
                }

                if board.at(z).any(BB_PIN_MASK) {
                    let mut p = z + dir;
                    while board.at(p).is_empty() {
                        p += dir;
                    }
                    if board.at(p).any(WQ_MASK | WK_MASK | WR_MASK) {
                        if board.at(p).any(WR_MASK) {
                            count += v[slot::BISHOP_PIN_R];
                        } else if board.at(p).any(WQ_MASK) {
                            count += v[slot::BISHOP_PIN_Q];
                        } else {
                            count += v[slot::BISHOP_PIN_K];
                        }
                    }
                }
            }
            score += count;
        }

        if distance(ofs, wk) < 4 {
            score += v[slot::CTEK_BISHOP];
        }

        if ofs == offset(7, 9) {
            if !board.at(offset(6, 7)).is_empty() && board.at(offset(6, 8)).any(BP_MASK) {
                score -= v[slot::CENTER_BLOCK_BISHOP1];
            }
            if !board.at(offset(5, 7)).is_empty() {
                score -= v[slot::CENTER_BLOCK_BISHOP2];
            }
        } else if ofs == offset(4, 9) {
            if !board.at(offset(5, 7)).is_empty() && board.at(offset(5, 8)).any(BP_MASK) {
                score -= v[slot::CENTER_BLOCK_BISHOP1];
            }
            if !board.at(offset(6, 7)).is_empty() {
                score -= v[slot::CENTER_BLOCK_BISHOP2];
            }
        }

        score
    }

    // -- knights -------------------------------------------------------------

    fn white_knight_bonus(&self, board: &Board, ofs: Offset, bk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = KNIGHT_POSITION[rotated(ofs)];

        if distance(ofs, bk) < 4 {
            score += v[slot::CTEK_KNIGHT];
        }

        score += self.knight_fork(board, ofs, BR_MASK, BQ_MASK, BK_MASK);

        for delta in KNIGHT_DELTAS {
            if attack_black_king_pos(board, ofs + delta) {
                score += v[slot::KNIGHT_ATTACK_KPOS];
            }
            if attack_white_king_pos(board, ofs + delta) {
                score += v[slot::KNIGHT_PROTECT_KPOS];
            }
        }

        score
    }

    fn black_knight_bonus(&self, board: &Board, ofs: Offset, wk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = KNIGHT_POSITION[ofs as usize];

        if distance(ofs, wk) < 4 {
            score += v[slot::CTEK_KNIGHT];
        }

        score += self.knight_fork(board, ofs, WR_MASK, WQ_MASK, WK_MASK);

        for delta in KNIGHT_DELTAS {
            if attack_white_king_pos(board, ofs + delta) {
                score += v[slot::KNIGHT_ATTACK_KPOS];
            }
            if attack_black_king_pos(board, ofs + delta) {
                score += v[slot::KNIGHT_PROTECT_KPOS];
            }
        }

        score
    }

    /// Forks are scored pessimistically: the gain is the cheapest piece
    /// the forked side must surrender, discounted by the uncertainty
    /// factor since the fork may be illusory (knight pinned, pieces can
    /// defend each other).
    fn knight_fork(
        &self,
        board: &Board,
        ofs: Offset,
        enemy_rook: u16,
        enemy_queen: u16,
        enemy_king: u16,
    ) -> Score {
        let v = &self.gene.v;
        let mut count = 0;
        let mut queens = 0;
        let mut kings = 0;
        for delta in KNIGHT_DELTAS {
            let sq = board.at(ofs + delta);
            if sq.any(enemy_rook | enemy_queen | enemy_king) {
                count += 1;
                if sq.any(enemy_king) {
                    kings += 1;
                } else if sq.any(enemy_queen) {
                    queens += 1;
                }
            }
        }

        if count > 1 {
            if kings > 0 {
                if queens > 0 {
                    return v[slot::KNIGHT_FORK_UNCERTAINTY] * (QUEEN_VAL - KNIGHT_VAL);
                }
                return v[slot::KNIGHT_FORK_UNCERTAINTY] * (ROOK_VAL - KNIGHT_VAL);
            }
            if queens > 1 {
                return v[slot::KNIGHT_FORK_UNCERTAINTY] * (QUEEN_VAL - KNIGHT_VAL);
            }
            return v[slot::KNIGHT_FORK_UNCERTAINTY] * (ROOK_VAL - KNIGHT_VAL);
        }
        0
    }

    // -- queens --------------------------------------------------------------

    fn white_queen_bonus(&self, board: &Board, ofs: Offset, bk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = QUEEN_POSITION[ofs as usize];

        let dist = distance(ofs, bk);
        if dist < 2 {
            score += v[slot::CTEK_QUEEN2];
        } else if dist < 3 {
            score += v[slot::CTEK_QUEEN3];
        }

        for (dir, xray) in [
            (NORTH, WQ_MASK | WR_MASK),
            (NORTHEAST, WQ_MASK | WB_MASK),
            (NORTHWEST, WQ_MASK | WB_MASK),
            (EAST, WQ_MASK | WR_MASK),
            (WEST, WQ_MASK | WR_MASK),
        ] {
            let mut z = ofs + dir;
            while board.at(z).is_empty() || board.at(z).any(xray) {
                z += dir;
            }
            if attack_black_king_pos(board, z) {
                score += v[slot::QUEEN_ATTACK_KPOS];
            }
            if attack_white_king_pos(board, z) {
                score += v[slot::QUEEN_PROTECT_KPOS];
            }
        }

        score
    }

    fn black_queen_bonus(&self, board: &Board, ofs: Offset, wk: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = QUEEN_POSITION[rotated(ofs)];

        let dist = distance(ofs, wk);
        if dist < 2 {
            score += v[slot::CTEK_QUEEN2];
        } else if dist < 3 {
            score += v[slot::CTEK_QUEEN3];
        }

        for (dir, xray) in [
            (SOUTH, BQ_MASK | BR_MASK),
            (SOUTHEAST, BQ_MASK | BB_MASK),
            (SOUTHWEST, BQ_MASK | BB_MASK),
            (EAST, BQ_MASK | BR_MASK),
            (WEST, BQ_MASK | BR_MASK),
        ] {
            let mut z = ofs + dir;
            while board.at(z).is_empty() || board.at(z).any(xray) {
                z += dir;
            }
            if attack_white_king_pos(board, z) {
                score += v[slot::QUEEN_ATTACK_KPOS];
            }
            if attack_black_king_pos(board, z) {
                score += v[slot::QUEEN_PROTECT_KPOS];
            }
        }

        score
    }

    // -- pawns ---------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn white_pawn_bonus(&self, board: &Board, ofs: Offset, x: i32, ybase: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = PAWN_CENTER[rotated(ofs)];

        if x == 0 || x == 7 {
            score -= v[slot::PAWN_SIDE_FILE];
        }

        // Look ahead on the file: the first friendly pawn found counts a
        // doubling exactly once (its own call covers anything beyond it);
        // enemy pawns ahead or beside kill the passed status.
        let mut is_passed = true;
        let mut z = ofs + NORTH;
        while z < offset(2, 9) {
            let sq = board.at(z);
            if sq.any(WP_MASK) {
                is_passed = false;
                score -= v[slot::PAWN_DOUBLED];
                break;
            }
            if sq.any(BP_MASK)
                || board.at(z + EAST).any(BP_MASK)
                || board.at(z + WEST).any(BP_MASK)
            {
                is_passed = false;
            }
            z += NORTH;
        }

        let mut is_split = true;
        let mut z = offset(crate::board::types::xpart(ofs), 3);
        while z < offset(2, 9) {
            if board.at(z + EAST).any(WP_MASK) || board.at(z + WEST).any(WP_MASK) {
                is_split = false;
                break;
            }
            z += NORTH;
        }
        if is_split {
            score -= v[slot::PAWN_SPLIT];
        }

        let mut protect_possible = false;
        if board.at(ofs + SOUTHWEST).any(WP_MASK) {
            protect_possible = true;
            if board.at(ofs + SOUTHEAST).any(WP_MASK) {
                score += if is_passed {
                    v[slot::PASSED_PAWN_PROTECT2]
                } else {
                    v[slot::PAWN_PROTECT2]
                };
            } else {
                score += if is_passed {
                    v[slot::PASSED_PAWN_PROTECT1]
                } else {
                    v[slot::PAWN_PROTECT1]
                };
            }
        } else if board.at(ofs + SOUTHEAST).any(WP_MASK) {
            protect_possible = true;
            score += if is_passed {
                v[slot::PASSED_PAWN_PROTECT1]
            } else {
                v[slot::PAWN_PROTECT1]
            };
        } else if is_passed {
            score += v[slot::PASSED_PAWN_ALONE];
            let left_protect = board.at(ofs + SOUTHWEST).is_empty()
                && board.at(ofs + 2 * SOUTH + WEST).any(WP_MASK);
            let right_protect = board.at(ofs + SOUTHEAST).is_empty()
                && board.at(ofs + 2 * SOUTH + EAST).any(WP_MASK);
            let advance_possible =
                board.at(ofs + EAST).any(WP_MASK) || board.at(ofs + WEST).any(WP_MASK);
            if left_protect || right_protect || advance_possible {
                protect_possible = true;
            } else {
                score -= v[slot::PASSED_PAWN_VULNERABLE];
            }
        }

        if board.at(ofs + NORTHEAST).any(WB_MASK) || board.at(ofs + NORTHWEST).any(WB_MASK) {
            score += v[slot::BISHOP_PROTECT_PAWN];
        }

        let forkable = BN_MASK | BB_MASK | BR_MASK | BQ_MASK | BK_MASK;
        if board.at(ofs + NORTHEAST).any(forkable) && board.at(ofs + NORTHWEST).any(forkable) {
            score += v[slot::PAWN_FORK];
        }

        if is_passed {
            let mut passed_bonus: Score = 0;
            if ybase == offset(2, 6) {
                passed_bonus = v[slot::PASSED_3_FROM_PROM];
            } else if ybase == offset(2, 7) {
                passed_bonus = v[slot::PASSED_2_FROM_PROM];
            } else if ybase == offset(2, 8) {
                passed_bonus = v[slot::PASSED_1_FROM_PROM];
            }
            if !protect_possible {
                passed_bonus /= 2;
            }

            // Heavy pieces lined up behind the passer push it home.
            let mut rooks_behind = 0;
            let mut b = ofs + SOUTH;
            loop {
                let sq = board.at(b);
                if sq.any(WR_MASK | WQ_MASK) {
                    rooks_behind += 1;
                    if rooks_behind > 1 {
                        break;
                    }
                } else if !sq.is_empty() {
                    break;
                }
                b += SOUTH;
            }
            if rooks_behind > 1 {
                passed_bonus += v[slot::ROOK_BACKS_PASSED_PAWN2];
            } else if rooks_behind > 0 {
                passed_bonus += v[slot::ROOK_BACKS_PASSED_PAWN1];
            }

            let mut b = ofs + NORTH;
            while !board.at(b).is_offboard() {
                if !board.at(b).is_empty() {
                    passed_bonus -= v[slot::PASSED_PIECE_BLOCK];
                }
                b += NORTH;
            }

            score += passed_bonus;
        } else if ybase == offset(2, 7) {
            score += v[slot::BLOCKED_2_FROM_PROM];
        }

        // A pawn lodged on the sixth rank clawing at the castled king.
        if ybase == offset(2, 7) {
            if board.at(ofs + 2 * NORTH + EAST).any(BK_MASK) {
                score += v[slot::CTEK_PAWN1];
                if board.inventory(Color::White, Piece::Queen)
                    + board.inventory(Color::White, Piece::Rook)
                    > 0
                    && !board.at(ofs + NORTHEAST).any(BP_MASK)
                {
                    score += v[slot::CTEK_HOLE];
                    if board.at(ofs + 2 * EAST).is_offboard() {
                        score += v[slot::CTEK_HOLE] - 2;
                    } else if !board.at(ofs + 3 * EAST + NORTH).any(BP_MASK) {
                        score += v[slot::CTEK_HOLE];
                        if board.at(ofs + 2 * EAST).any(WQ_MASK) {
                            score += v[slot::CTEK_HOLE_Q];
                        }
                    }
                }
            } else if board.at(ofs + 2 * NORTH + WEST).any(BK_MASK) {
                if board.inventory(Color::White, Piece::Queen)
                    + board.inventory(Color::White, Piece::Rook)
                    > 0
                    && !board.at(ofs + NORTHWEST).any(BP_MASK)
                {
                    score += v[slot::CTEK_HOLE];
                    if board.at(ofs + 2 * WEST).is_offboard() {
                        score += v[slot::CTEK_HOLE] - 2;
                    } else if !board.at(ofs + 3 * WEST + NORTH).any(BP_MASK) {
                        score += v[slot::CTEK_HOLE];
                        if board.at(ofs + 2 * WEST).any(WQ_MASK) {
                            score += v[slot::CTEK_HOLE_Q];
                        }
                    }
                }
            } else if board.at(ofs + 2 * NORTHEAST).any(BK_MASK)
                || board.at(ofs + 2 * NORTHWEST).any(BK_MASK)
            {
                score += v[slot::CTEK_PAWN2];
            }
        }

        score
    }

    #[allow(clippy::too_many_lines)]
    fn black_pawn_bonus(&self, board: &Board, ofs: Offset, x: i32, ybase: Offset) -> Score {
        let v = &self.gene.v;
        let mut score = PAWN_CENTER[ofs as usize];

        if x == 0 || x == 7 {
            score -= v[slot::PAWN_SIDE_FILE];
        }

        let mut is_passed = true;
        let mut z = ofs + SOUTH;
        while z > offset(9, 2) {
            let sq = board.at(z);
            if sq.any(BP_MASK) {
                is_passed = false;
                score -= v[slot::PAWN_DOUBLED];
                break;
            }
            if sq.any(WP_MASK)
                || board.at(z + EAST).any(WP_MASK)
                || board.at(z + WEST).any(WP_MASK)
            {
                is_passed = false;
            }
            z += SOUTH;
        }

        let mut is_split = true;
        let mut z = offset(crate::board::types::xpart(ofs), 3);
        while z < offset(2, 9) {
            if board.at(z + EAST).any(BP_MASK) || board.at(z + WEST).any(BP_MASK) {
                is_split = false;
                break;
            }
            z += NORTH;
        }
        if is_split {
            score -= v[slot::PAWN_SPLIT];
        }

        let mut protect_possible = false;
        if board.at(ofs + NORTHWEST).any(BP_MASK) {
            protect_possible = true;
            if board.at(ofs + NORTHEAST).any(BP_MASK) {
                score += if is_passed {
                    v[slot::PASSED_PAWN_PROTECT2]
                } else {
                    v[slot::PAWN_PROTECT2]
                };
            } else {
                score += if is_passed {
                    v[slot::PASSED_PAWN_PROTECT1]
                } else {
                    v[slot::PAWN_PROTECT1]
                };
            }
        } else if board.at(ofs + NORTHEAST).any(BP_MASK) {
            protect_possible = true;
            score += if is_passed {
                v[slot::PASSED_PAWN_PROTECT1]
            } else {
                v[slot::PAWN_PROTECT1]
            };
        } else if is_passed {
            score += v[slot::PASSED_PAWN_ALONE];
            let left_protect = board.at(ofs + NORTHWEST).is_empty()
                && board.at(ofs + 2 * NORTH + WEST).any(BP_MASK);
            let right_protect = board.at(ofs + NORTHEAST).is_empty()
                && board.at(ofs + 2 * NORTH + EAST).any(BP_MASK);
            let advance_possible =
                board.at(ofs + EAST).any(BP_MASK) || board.at(ofs + WEST).any(BP_MASK);
            if left_protect || right_protect || advance_possible {
                protect_possible = true;
            } else {
                score -= v[slot::PASSED_PAWN_VULNERABLE];
            }
        }

        if board.at(ofs + SOUTHEAST).any(BB_MASK) || board.at(ofs + SOUTHWEST).any(BB_MASK) {
            score += v[slot::BISHOP_PROTECT_PAWN];
        }

        let forkable = WN_MASK | WB_MASK | WR_MASK | WQ_MASK | WK_MASK;
        if board.at(ofs + SOUTHEAST).any(forkable) && board.at(ofs + SOUTHWEST).any(forkable) {
            score += v[slot::PAWN_FORK];
        }

        if is_passed {
            let mut passed_bonus: Score = 0;
            if ybase == offset(2, 5) {
                passed_bonus = v[slot::PASSED_3_FROM_PROM];
            } else if ybase == offset(2, 4) {
                passed_bonus = v[slot::PASSED_2_FROM_PROM];
            } else if ybase == offset(2, 3) {
                passed_bonus = v[slot::PASSED_1_FROM_PROM];
            }
            if !protect_possible {
                passed_bonus /= 2;
            }

            let mut rooks_behind = 0;
            let mut b = ofs + NORTH;
            loop {
                let sq = board.at(b);
                if sq.any(BR_MASK | BQ_MASK) {
                    rooks_behind += 1;
                    if rooks_behind > 1 {
                        break;
                    }
                } else if !sq.is_empty() {
                    break;
                }
                b += NORTH;
            }
            if rooks_behind > 1 {
                passed_bonus += v[slot::ROOK_BACKS_PASSED_PAWN2];
            } else if rooks_behind > 0 {
                passed_bonus += v[slot::ROOK_BACKS_PASSED_PAWN1];
            }

            let mut b = ofs + SOUTH;
            while !board.at(b).is_offboard() {
                if !board.at(b).is_empty() {
                    passed_bonus -= v[slot::PASSED_PIECE_BLOCK];
                }
                b += SOUTH;
            }

            score += passed_bonus;
        } else if ybase == offset(2, 4) {
            score += v[slot::BLOCKED_2_FROM_PROM];
        }

        if ybase == offset(2, 4) {
            if board.at(ofs + 2 * SOUTH + EAST).any(WK_MASK) {
                score += v[slot::CTEK_PAWN1];
                if board.inventory(Color::Black, Piece::Queen)
                    + board.inventory(Color::Black, Piece::Rook)
                    > 0
                    && !board.at(ofs + SOUTHEAST).any(WP_MASK)
                {
                    score += v[slot::CTEK_HOLE];
                    if board.at(ofs + 2 * EAST).is_offboard() {
                        score += v[slot::CTEK_HOLE] - 2;
                    } else if !board.at(ofs + 3 * EAST + SOUTH).any(WP_MASK) {
                        score += v[slot::CTEK_HOLE];
                        if board.at(ofs + 2 * EAST).any(BQ_MASK) {
                            score += v[slot::CTEK_HOLE_Q];
                        }
                    }
                }
            } else if board.at(ofs + 2 * SOUTH + WEST).any(WK_MASK) {
                if board.inventory(Color::Black, Piece::Queen)
                    + board.inventory(Color::Black, Piece::Rook)
                    > 0
                    && !board.at(ofs + SOUTHWEST).any(WP_MASK)
                {
                    score += v[slot::CTEK_HOLE];
                    if board.at(ofs + 2 * WEST).is_offboard() {
                        score += v[slot::CTEK_HOLE] - 2;
                    } else if !board.at(ofs + 3 * WEST + SOUTH).any(WP_MASK) {
                        score += v[slot::CTEK_HOLE];
                        if board.at(ofs + 2 * WEST).any(BQ_MASK) {
                            score += v[slot::CTEK_HOLE_Q];
                        }
                    }
                }
            } else if board.at(ofs + 2 * SOUTHEAST).any(WK_MASK)
                || board.at(ofs + 2 * SOUTHWEST).any(WK_MASK)
            {
                score += v[slot::CTEK_PAWN2];
            }
        }

        score
    }
}

/// Is this square adjacent to the black king from below/beside, and not
/// safely held by a pawn-protected black piece? Used to score rays that
/// terminate near the enemy king.
fn attack_black_king_pos(board: &Board, ofs: Offset) -> bool {
    let sq = board.at(ofs);
    if sq.is_offboard() {
        return false;
    }
    let near_king = board.at(ofs + NORTH).any(BK_MASK)
        || board.at(ofs + NORTHEAST).any(BK_MASK)
        || board.at(ofs + NORTHWEST).any(BK_MASK)
        || board.at(ofs + EAST).any(BK_MASK)
        || board.at(ofs + WEST).any(BK_MASK);
    if !near_king {
        return false;
    }
    if sq.any(BLACK_MASK)
        && (board.at(ofs + NORTHEAST).any(BP_MASK) || board.at(ofs + NORTHWEST).any(BP_MASK))
    {
        return false;
    }
    true
}

fn attack_white_king_pos(board: &Board, ofs: Offset) -> bool {
    let sq = board.at(ofs);
    if sq.is_offboard() {
        return false;
    }
    let near_king = board.at(ofs + SOUTH).any(WK_MASK)
        || board.at(ofs + SOUTHEAST).any(WK_MASK)
        || board.at(ofs + SOUTHWEST).any(WK_MASK)
        || board.at(ofs + EAST).any(WK_MASK)
        || board.at(ofs + WEST).any(WK_MASK);
    if !near_king {
        return false;
    }
    if sq.any(WHITE_MASK)
        && (board.at(ofs + SOUTHEAST).any(WP_MASK) || board.at(ofs + SOUTHWEST).any(WP_MASK))
    {
        return false;
    }
    true
}
