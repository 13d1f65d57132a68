//! The alpha-beta recursion and quiescence search.
//!
//! White maximizes and Black minimizes against absolute bounds, so the
//! two sides are written as explicit mirror-image functions; the board's
//! side to move alternates them. Full-width search runs to the current
//! iteration level, then quiescence considers captures, promotions and
//! (near the horizon) checking moves until positions are quiet, with a
//! full-width extension while escaping check.

use crate::board::{Board, Color, Move, MoveList, Offset};
use crate::eval::slot;
use crate::ordering::OrderingPass;
use crate::score::{
    win_postponement, Score, BLACK_WINS, DRAW, MAX_WINDOW, MIN_WINDOW, NEGINF, POSINF,
    WHITE_WINS, WON_FOR_BLACK, WON_FOR_WHITE,
};
use crate::tt::TransEntry;

use super::bestpath::MAX_BESTPATH_DEPTH;
use super::{ComputerPlayer, HASH_PATH_SIZE, NODES_ARRAY_SIZE};

/// A transposition score for a mate found at a different distance from
/// the root must be re-postponed relative to this node's depth.
fn adjust_checkmate_score(entry: &TransEntry, depth: i32) -> Score {
    let mut score = entry.best_reply.score;
    if score > WON_FOR_WHITE {
        score -= win_postponement(depth - entry.future());
    } else if score < WON_FOR_BLACK {
        score += win_postponement(depth - entry.future());
    }
    score
}

impl ComputerPlayer {
    // -- root ----------------------------------------------------------------

    pub(crate) fn white_search_root(&mut self, board: &mut Board, bestmove: &mut Move) -> Score {
        let mut alpha = MIN_WINDOW;
        let beta = MAX_WINDOW;
        let mut bestscore = NEGINF;

        self.hash_path[0] = board.hash();

        let n = self.root_ml.len();
        let mut i = 0;
        while !self.search_aborted && i < n {
            let mut mv = self.root_ml.as_slice()[i];

            // A known lost move (other than the first) is not worth
            // re-searching at this level.
            if i > 0 && mv.score <= WON_FOR_BLACK {
                i += 1;
                continue;
            }

            self.visited += 1;
            self.visnodes[0] += 1;
            if self.level > 1 && !self.quiet_instance {
                self.ui.display_current_move(board, mv, self.level);
            }
            self.find_prev_best_path(mv);
            if !self.quiet_instance {
                self.ui.debug_ply(0, board, mv);
            }

            let unmove = board.make_move(&mut mv, false, false);
            let score = if self.level > 0 {
                self.black_search(board, 1, alpha, beta, true)
            } else {
                self.black_qsearch(board, 1, alpha, beta, true)
            };
            if !self.search_aborted {
                mv.score = score;
            }
            board.unmake_move(mv, &unmove);
            self.root_ml.moves[i] = mv;

            if self.search_aborted {
                // Keep the randomized pick from choosing unsearched
                // moves: everything from here on is marked lost.
                if i > 0 {
                    for j in i..n {
                        self.root_ml.moves[j].score = NEGINF;
                    }
                }
            } else {
                let path_index = self.save_tlm_best_path(mv);
                if score > bestscore {
                    *bestmove = mv;
                    self.expected_score_now = score;
                    bestscore = score;
                    if self.level > 1 && !self.quiet_instance {
                        self.ui.display_best_move_so_far(board, mv, self.level);
                        self.ui
                            .display_best_path(board, &self.each_best_path[path_index]);
                    }
                }
            }

            if score > alpha {
                alpha = score;
            }
            i += 1;
        }

        self.root_ml.white_sort();
        if !self.quiet_instance {
            self.ui.debug_exit(0, board, bestscore);
        }
        bestscore
    }

    pub(crate) fn black_search_root(&mut self, board: &mut Board, bestmove: &mut Move) -> Score {
        let alpha = MIN_WINDOW;
        let mut beta = MAX_WINDOW;
        let mut bestscore = POSINF;

        self.hash_path[0] = board.hash();

        let n = self.root_ml.len();
        let mut i = 0;
        while !self.search_aborted && i < n {
            let mut mv = self.root_ml.as_slice()[i];

            if i > 0 && mv.score >= WON_FOR_WHITE {
                i += 1;
                continue;
            }

            self.visited += 1;
            self.visnodes[0] += 1;
            if self.level > 1 && !self.quiet_instance {
                self.ui.display_current_move(board, mv, self.level);
            }
            self.find_prev_best_path(mv);
            if !self.quiet_instance {
                self.ui.debug_ply(0, board, mv);
            }

            let unmove = board.make_move(&mut mv, false, false);
            let score = if self.level > 0 {
                self.white_search(board, 1, alpha, beta, true)
            } else {
                self.white_qsearch(board, 1, alpha, beta, true)
            };
            if !self.search_aborted {
                mv.score = score;
            }
            board.unmake_move(mv, &unmove);
            self.root_ml.moves[i] = mv;

            if self.search_aborted {
                if i > 0 {
                    for j in i..n {
                        self.root_ml.moves[j].score = POSINF;
                    }
                }
            } else {
                let path_index = self.save_tlm_best_path(mv);
                if score < bestscore {
                    *bestmove = mv;
                    self.expected_score_now = score;
                    bestscore = score;
                    if self.level > 1 && !self.quiet_instance {
                        self.ui.display_best_move_so_far(board, mv, self.level);
                        self.ui
                            .display_best_path(board, &self.each_best_path[path_index]);
                    }
                }
            }

            if score < beta {
                beta = score;
            }
            i += 1;
        }

        self.root_ml.black_sort();
        if !self.quiet_instance {
            self.ui.debug_exit(0, board, bestscore);
        }
        bestscore
    }

    // -- full-width recursion ------------------------------------------------

    /// Is this position a same-parity repeat of one already on the
    /// current search path? Pruned as a draw when the on-board
    /// repetition count confirms the position really recurred.
    fn path_repetition(&mut self, board: &Board, depth: i32) -> bool {
        if depth >= self.level || depth as usize >= HASH_PATH_SIZE {
            return false;
        }
        self.hash_path[depth as usize] = board.hash();
        let limit = depth - 2;
        let mut rd = depth & 1;
        while rd < limit {
            if self.hash_path[rd as usize] == self.hash_path[depth as usize] {
                return board.number_of_repetitions() != 1;
            }
            rd += 2;
        }
        false
    }

    pub(crate) fn white_search(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: Score,
        beta: Score,
        best_path_flag: bool,
    ) -> Score {
        if (depth as usize) < MAX_BESTPATH_DEPTH {
            self.next_best_path[depth as usize].depth = depth - 1;
        }
        if self.check_time_limit() {
            return NEGINF;
        }
        if self.path_repetition(board, depth) {
            return DRAW;
        }

        let xpos = self.tt.locate(true, board.hash()).copied();
        let xpos_move = xpos.map_or(Move::null(), |x| x.best_reply);

        let mut ml = MoveList::new();
        {
            let killer_path = if depth >= 1 && (depth as usize) <= MAX_BESTPATH_DEPTH {
                Some(&self.next_best_path[(depth - 1) as usize])
            } else {
                None
            };
            let mut pass = OrderingPass {
                white: true,
                depth,
                best_path_flag,
                current_best_path: &self.current_best_path,
                killer_path,
                xpos_move,
                hist: &self.white_hist,
                gene: &self.eval.gene,
            };
            board.generate_moves_ordered(&mut ml, &mut pass, None);
        }
        self.generated += ml.len() as u64;
        if (depth as usize) < NODES_ARRAY_SIZE {
            self.gennodes[depth as usize] += ml.len() as u64;
        }

        if ml.is_empty() {
            let score = if board.in_check(Color::White) {
                BLACK_WINS + win_postponement(depth)
            } else {
                DRAW
            };
            self.debug_exit(depth, board, score);
            return score;
        }

        let num_reps = board.number_of_repetitions();
        if board.is_definite_draw() {
            self.debug_exit(depth, board, DRAW);
            return DRAW;
        }

        // Transposition cutoff; only after the draw checks, since the
        // stored result knows nothing about repetition along this path.
        if let Some(x) = &xpos {
            if x.searched_depth() >= self.level - depth
                && num_reps < 2
                && ml.contains(x.best_reply)
                && x.score_is_inside_window()
                && x.compatible_window(alpha, beta)
            {
                if (depth as usize) < MAX_BESTPATH_DEPTH {
                    self.next_best_path[depth as usize].moves[depth as usize] = x.best_reply;
                }
                let score = adjust_checkmate_score(x, depth);
                self.debug_exit(depth, board, score);
                return score;
            }
        }

        let mut bestscore = NEGINF;
        let mut best: Option<Move> = None;
        let n = ml.len();
        for i in 0..n {
            let mut mv = ml.moves[i];
            self.visited += 1;
            if (depth as usize) < NODES_ARRAY_SIZE {
                self.visnodes[depth as usize] += 1;
            }

            let next_flag = best_path_flag
                && depth <= self.current_best_path.depth
                && mv == self.current_best_path.moves[depth as usize];

            self.debug_ply(depth, board, mv);
            let unmove = board.make_move(&mut mv, false, false);
            let score = if depth < self.level {
                self.black_search(board, depth + 1, alpha, beta, next_flag)
            } else {
                self.black_qsearch(board, depth + 1, alpha, beta, next_flag)
            };
            board.unmake_move(mv, &unmove);

            if score > bestscore {
                mv.score = score;
                bestscore = score;
                best = Some(mv);
                self.found_best_move(mv, depth);
            }
            if score >= beta {
                break; // Black has at least as good elsewhere
            }
            if score > alpha {
                alpha = score;
            }
        }

        if let Some(best_move) = best {
            self.bump_history(true, best_move);
            self.tt
                .remember(true, board.hash(), self.level, depth, best_move, alpha, beta);
        }

        self.debug_exit(depth, board, bestscore);
        bestscore
    }

    pub(crate) fn black_search(
        &mut self,
        board: &mut Board,
        depth: i32,
        alpha: Score,
        mut beta: Score,
        best_path_flag: bool,
    ) -> Score {
        if (depth as usize) < MAX_BESTPATH_DEPTH {
            self.next_best_path[depth as usize].depth = depth - 1;
        }
        if self.check_time_limit() {
            return POSINF;
        }
        if self.path_repetition(board, depth) {
            return DRAW;
        }

        let xpos = self.tt.locate(false, board.hash()).copied();
        let xpos_move = xpos.map_or(Move::null(), |x| x.best_reply);

        let mut ml = MoveList::new();
        {
            let killer_path = if depth >= 1 && (depth as usize) <= MAX_BESTPATH_DEPTH {
                Some(&self.next_best_path[(depth - 1) as usize])
            } else {
                None
            };
            let mut pass = OrderingPass {
                white: false,
                depth,
                best_path_flag,
                current_best_path: &self.current_best_path,
                killer_path,
                xpos_move,
                hist: &self.black_hist,
                gene: &self.eval.gene,
            };
            board.generate_moves_ordered(&mut ml, &mut pass, None);
        }
        self.generated += ml.len() as u64;
        if (depth as usize) < NODES_ARRAY_SIZE {
            self.gennodes[depth as usize] += ml.len() as u64;
        }

        if ml.is_empty() {
            let score = if board.in_check(Color::Black) {
                WHITE_WINS - win_postponement(depth)
            } else {
                DRAW
            };
            self.debug_exit(depth, board, score);
            return score;
        }

        let num_reps = board.number_of_repetitions();
        if board.is_definite_draw() {
            self.debug_exit(depth, board, DRAW);
            return DRAW;
        }

        if let Some(x) = &xpos {
            if x.searched_depth() >= self.level - depth
                && num_reps < 2
                && ml.contains(x.best_reply)
                && x.score_is_inside_window()
                && x.compatible_window(alpha, beta)
            {
                if (depth as usize) < MAX_BESTPATH_DEPTH {
                    self.next_best_path[depth as usize].moves[depth as usize] = x.best_reply;
                }
                let score = adjust_checkmate_score(x, depth);
                self.debug_exit(depth, board, score);
                return score;
            }
        }

        let mut bestscore = POSINF;
        let mut best: Option<Move> = None;
        let n = ml.len();
        for i in 0..n {
            let mut mv = ml.moves[i];
            self.visited += 1;
            if (depth as usize) < NODES_ARRAY_SIZE {
                self.visnodes[depth as usize] += 1;
            }

            let next_flag = best_path_flag
                && depth <= self.current_best_path.depth
                && mv == self.current_best_path.moves[depth as usize];

            self.debug_ply(depth, board, mv);
            let unmove = board.make_move(&mut mv, false, false);
            let score = if depth < self.level {
                self.white_search(board, depth + 1, alpha, beta, next_flag)
            } else {
                self.white_qsearch(board, depth + 1, alpha, beta, next_flag)
            };
            board.unmake_move(mv, &unmove);

            if score < bestscore {
                mv.score = score;
                bestscore = score;
                best = Some(mv);
                self.found_best_move(mv, depth);
            }
            if score <= alpha {
                break; // White has at least as good elsewhere
            }
            if score < beta {
                beta = score;
            }
        }

        if let Some(best_move) = best {
            self.bump_history(false, best_move);
            self.tt
                .remember(false, board.hash(), self.level, depth, best_move, alpha, beta);
        }

        self.debug_exit(depth, board, bestscore);
        bestscore
    }

    // -- quiescence ----------------------------------------------------------

    pub(crate) fn white_qsearch(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: Score,
        beta: Score,
        best_path_flag: bool,
    ) -> Score {
        if (depth as usize) < MAX_BESTPATH_DEPTH {
            self.next_best_path[depth as usize].depth = depth - 1;
        }
        if self.check_time_limit() {
            return NEGINF;
        }

        // Evaluate before generating anything; the stand-pat score often
        // suffices.
        let mut bestscore = self.eval.evaluate(board, depth, alpha, beta);

        let escape_check = board.in_check(Color::White)
            && depth <= self.level + self.eval.gene.v[slot::ESCAPE_CHECK_DEPTH];

        if bestscore < beta || escape_check {
            let mut ml = MoveList::new();
            self.gen_quiescence_moves(board, &mut ml, depth, best_path_flag, escape_check);
            self.generated += ml.len() as u64;
            if (depth as usize) < NODES_ARRAY_SIZE {
                self.gennodes[depth as usize] += ml.len() as u64;
            }

            let n = ml.len();
            for i in 0..n {
                let mut mv = ml.moves[i];
                self.visited += 1;
                if (depth as usize) < NODES_ARRAY_SIZE {
                    self.visnodes[depth as usize] += 1;
                }

                let next_flag = best_path_flag
                    && depth <= self.current_best_path.depth
                    && mv == self.current_best_path.moves[depth as usize];

                self.debug_ply(depth, board, mv);
                let unmove = board.make_move(&mut mv, false, false);
                let score = if board.in_check(Color::Black) || escape_check {
                    self.black_search(board, depth + 1, alpha, beta, next_flag)
                } else {
                    self.black_qsearch(board, depth + 1, alpha, beta, next_flag)
                };
                board.unmake_move(mv, &unmove);

                if score > bestscore {
                    mv.score = score;
                    bestscore = score;
                    self.found_best_move(mv, depth);
                }
                if score >= beta {
                    break;
                }
                if score > alpha {
                    alpha = score;
                }
            }
        }

        self.debug_exit(depth, board, bestscore);
        bestscore
    }

    pub(crate) fn black_qsearch(
        &mut self,
        board: &mut Board,
        depth: i32,
        alpha: Score,
        mut beta: Score,
        best_path_flag: bool,
    ) -> Score {
        if (depth as usize) < MAX_BESTPATH_DEPTH {
            self.next_best_path[depth as usize].depth = depth - 1;
        }
        if self.check_time_limit() {
            return POSINF;
        }

        let mut bestscore = self.eval.evaluate(board, depth, alpha, beta);

        let escape_check = board.in_check(Color::Black)
            && depth <= self.level + self.eval.gene.v[slot::ESCAPE_CHECK_DEPTH];

        if bestscore > alpha || escape_check {
            let mut ml = MoveList::new();
            self.gen_quiescence_moves(board, &mut ml, depth, best_path_flag, escape_check);
            self.generated += ml.len() as u64;
            if (depth as usize) < NODES_ARRAY_SIZE {
                self.gennodes[depth as usize] += ml.len() as u64;
            }

            let n = ml.len();
            for i in 0..n {
                let mut mv = ml.moves[i];
                self.visited += 1;
                if (depth as usize) < NODES_ARRAY_SIZE {
                    self.visnodes[depth as usize] += 1;
                }

                let next_flag = best_path_flag
                    && depth <= self.current_best_path.depth
                    && mv == self.current_best_path.moves[depth as usize];

                self.debug_ply(depth, board, mv);
                let unmove = board.make_move(&mut mv, false, false);
                let score = if board.in_check(Color::White) || escape_check {
                    self.white_search(board, depth + 1, alpha, beta, next_flag)
                } else {
                    self.white_qsearch(board, depth + 1, alpha, beta, next_flag)
                };
                board.unmake_move(mv, &unmove);

                if score < bestscore {
                    mv.score = score;
                    bestscore = score;
                    self.found_best_move(mv, depth);
                }
                if score <= alpha {
                    break;
                }
                if score < beta {
                    beta = score;
                }
            }
        }

        self.debug_exit(depth, board, bestscore);
        bestscore
    }

    /// Moves considered by quiescence: all moves while escaping check;
    /// captures, promotions and checking moves near the horizon;
    /// captures and promotions beyond that.
    fn gen_quiescence_moves(
        &mut self,
        board: &mut Board,
        ml: &mut MoveList,
        depth: i32,
        best_path_flag: bool,
        escape_check: bool,
    ) {
        let white = board.white_to_move();
        let with_checks =
            !escape_check && depth <= self.level + self.eval.gene.v[slot::MAX_CHECK_DEPTH];

        let killer_path = if depth >= 1 && (depth as usize) <= MAX_BESTPATH_DEPTH {
            Some(&self.next_best_path[(depth - 1) as usize])
        } else {
            None
        };
        let mut pass = OrderingPass {
            white,
            depth,
            best_path_flag,
            current_best_path: &self.current_best_path,
            killer_path,
            xpos_move: Move::null(),
            hist: if white {
                &self.white_hist
            } else {
                &self.black_hist
            },
            gene: &self.eval.gene,
        };

        if escape_check {
            board.generate_moves_ordered(ml, &mut pass, None);
        } else if with_checks {
            // Generate everything, then keep captures, promotions and
            // checking moves (castling excluded).
            let mut all = MoveList::new();
            board.generate_moves_ordered(&mut all, &mut pass, None);
            for mv in all.iter() {
                let keep = if mv.causes_check() {
                    true
                } else if mv.is_special() {
                    !mv.is_castle()
                } else {
                    !board.at(mv.dest as Offset).is_empty()
                };
                if keep {
                    ml.push(*mv);
                }
            }
        } else {
            board.generate_captures_ordered(ml, &mut pass);
        }
    }

    // -- small helpers -------------------------------------------------------

    /// Credit the move that proved best at a node; capped so one killer
    /// cannot saturate the table.
    fn bump_history(&mut self, white: bool, mv: Move) {
        let max = self.eval.gene.v[slot::HASH_HIST_MAX];
        let increment = self.eval.gene.v[slot::HASH_HIST_INCREMENT];
        let table = if white {
            &mut self.white_hist
        } else {
            &mut self.black_hist
        };
        let entry = &mut table[mv.history_hash()];
        if *entry < max {
            *entry += increment;
        } else {
            self.hit_max_history = true;
        }
    }

    #[inline]
    fn debug_ply(&self, depth: i32, board: &Board, mv: Move) {
        if !self.quiet_instance {
            self.ui.debug_ply(depth, board, mv);
        }
    }

    #[inline]
    fn debug_exit(&self, depth: i32, board: &Board, score: Score) {
        if !self.quiet_instance {
            self.ui.debug_exit(depth, board, score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_player(depth: i32) -> ComputerPlayer {
        let mut player = ComputerPlayer::detached(1);
        player.set_search_depth(depth);
        player.set_opening_book_enabled(false);
        player.set_training_enabled(false);
        player.set_search_bias(false);
        player
    }

    #[test]
    fn finds_mate_in_one_for_white() {
        // Scholar's mate is available: Qxf7#.
        let mut board = Board::from_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/8/PPPP1PPP/RNBQK1NR w KQkq - 0 1",
        )
        .expect("FEN");
        let mut mv = board.scan_move("Qh5").expect("Qh5");
        board.make_move(&mut mv, true, true);
        let mut mv = board.scan_move("Nf6").expect("Nf6");
        board.make_move(&mut mv, true, true);

        let mut player = depth_player(2);
        let report = player.find_move(&mut board);
        let best = report.best_move.expect("move");
        assert_eq!(best, board.scan_move("Qxf7").expect("mate move"));
        assert!(best.score >= WON_FOR_WHITE);
    }

    #[test]
    fn prefers_the_faster_mate() {
        // Queen + rook vs lone king: Rh8 mates at once; the
        // postponement term must prefer it over slower wins.
        let mut board =
            Board::from_fen("k7/8/1Q6/7R/8/8/8/4K3 w - - 0 1").expect("FEN");
        let mut player = depth_player(4);
        let report = player.find_move(&mut board);
        let best = report.best_move.expect("move");
        let mut probe = best;
        let unmove = board.make_move(&mut probe, true, true);
        let mated =
            !board.current_player_can_move() && board.in_check(Color::Black);
        board.unmake_move(probe, &unmove);
        assert!(mated, "{best:?} does not mate immediately");
    }

    #[test]
    fn transposition_table_reduces_second_search() {
        let mut board = Board::from_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1",
        )
        .expect("FEN");
        let mut player = depth_player(5);

        player.find_move(&mut board);
        let first_nodes = player.visited;

        // Second identical search keeps the table (find_move only marks
        // it stale) and must revisit far fewer nodes.
        player.find_move(&mut board);
        let second_nodes = player.visited;
        assert!(
            second_nodes * 5 < first_nodes,
            "TT did not help: {first_nodes} then {second_nodes}"
        );
    }

    #[test]
    fn repetition_is_scored_as_draw_at_the_root() {
        let mut board = Board::new();
        for text in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"] {
            let mut mv = board.scan_move(text).expect(text);
            board.make_move(&mut mv, true, true);
        }
        assert!(board.is_definite_draw());

        let mut player = depth_player(2);
        let report = player.find_move(&mut board);
        // Search still proposes a move; the draw is a result, not an
        // absence of moves.
        assert!(report.best_move.is_some());
    }
}
