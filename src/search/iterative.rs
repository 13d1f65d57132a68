//! Iterative deepening and top-level move management.
//!
//! The root move list is generated once per turn. Each deepening level
//! re-searches every root move with the previous level's best paths
//! seeding the ordering, then re-sorts the list so the next level visits
//! the strongest candidates first. Completed searches leave enough state
//! behind to recycle their principal variation into the next turn when
//! the opponent answers as predicted.

use std::time::Instant;

use crate::board::{Board, Move, MoveList};
use crate::fatal::chess_fatal;
use crate::ordering::OrderingPass;
use crate::score::{
    NEGINF, POSINF, WHITE_WINS, BLACK_WINS, WIN_DELAY_PENALTY, WON_FOR_BLACK, WON_FOR_WHITE,
};

use super::bestpath::{BestPath, MAX_BESTPATH_DEPTH};
use super::timing::centis_since;
use super::{ComputerPlayer, SearchType};

impl ComputerPlayer {
    pub(crate) fn get_white_move(&mut self, board: &mut Board) -> Option<Move> {
        self.computer_playing_white = true;
        self.begin_turn(board);
        if self.root_ml.is_empty() {
            return None;
        }
        let mut bestmove = self.root_ml.as_slice()[0];

        if let Some(shortcut) = self.pre_search_move(board, bestmove) {
            return Some(shortcut);
        }

        // Recycle the previous turn's line when the opponent played into
        // the prediction: seed ordering with the stripped path and skip
        // the already-proven shallow iterations.
        let mut start_level = self.min_level;
        if board.hash() == self.expected_next_board_hash
            && self.current_best_path.depth >= 2
            && self.prev_completed_level > 1
        {
            self.current_best_path.strip_played_plies();
            self.each_best_path.clear();
            let recycled = self.current_best_path;
            self.each_best_path.push(recycled);
            start_level = self.prev_completed_level - 1;
            self.root_ml.send_to_front(recycled.moves[0]);
            bestmove = self.root_ml.as_slice()[0];
            log::debug!("recycling best path; starting at level {start_level}");
        } else {
            self.each_best_path.clear();
            self.current_best_path = BestPath::new();
        }

        self.next_best_path[0].depth = 0;
        self.prev_completed_level = 0;
        self.expected_score_prev = NEGINF;
        self.expected_score_now = NEGINF;
        self.revert_time_limit_cs = 0;

        let think_start = Instant::now();
        let mut level = start_level;
        while !self.search_aborted && level <= self.max_level {
            self.level = level;
            self.white_search_root(board, &mut bestmove);
            if !self.search_aborted {
                self.prev_completed_level = level;
            }
            if bestmove.score >= WON_FOR_WHITE {
                break; // forced win found
            }
            if bestmove.score <= WON_FOR_BLACK {
                break; // no deeper search will save this
            }
            self.expected_score_prev = self.expected_score_now;
            level += 1;
        }
        let think_time = centis_since(think_start);

        if bestmove.score >= WON_FOR_WHITE
            && bestmove.score < WHITE_WINS - WIN_DELAY_PENALTY
            && !self.is_background_thinker()
        {
            let plies = (WHITE_WINS - bestmove.score) / WIN_DELAY_PENALTY;
            self.ui.predict_mate(1 + plies / 2);
        }

        self.finish_turn(board, bestmove, think_time);
        Some(bestmove)
    }

    pub(crate) fn get_black_move(&mut self, board: &mut Board) -> Option<Move> {
        self.computer_playing_white = false;
        self.begin_turn(board);
        if self.root_ml.is_empty() {
            return None;
        }
        let mut bestmove = self.root_ml.as_slice()[0];

        if let Some(shortcut) = self.pre_search_move(board, bestmove) {
            return Some(shortcut);
        }

        let mut start_level = self.min_level;
        if board.hash() == self.expected_next_board_hash
            && self.current_best_path.depth >= 2
            && self.prev_completed_level > 1
        {
            self.current_best_path.strip_played_plies();
            self.each_best_path.clear();
            let recycled = self.current_best_path;
            self.each_best_path.push(recycled);
            start_level = self.prev_completed_level - 1;
            self.root_ml.send_to_front(recycled.moves[0]);
            bestmove = self.root_ml.as_slice()[0];
            log::debug!("recycling best path; starting at level {start_level}");
        } else {
            self.each_best_path.clear();
            self.current_best_path = BestPath::new();
        }

        self.next_best_path[0].depth = 0;
        self.prev_completed_level = 0;
        self.expected_score_prev = POSINF;
        self.expected_score_now = POSINF;
        self.revert_time_limit_cs = 0;

        let think_start = Instant::now();
        let mut level = start_level;
        while !self.search_aborted && level <= self.max_level {
            self.level = level;
            self.black_search_root(board, &mut bestmove);
            if !self.search_aborted {
                self.prev_completed_level = level;
            }
            if bestmove.score <= WON_FOR_BLACK {
                break;
            }
            if bestmove.score >= WON_FOR_WHITE {
                break;
            }
            self.expected_score_prev = self.expected_score_now;
            level += 1;
        }
        let think_time = centis_since(think_start);

        if bestmove.score <= WON_FOR_BLACK
            && bestmove.score > BLACK_WINS + WIN_DELAY_PENALTY
            && !self.is_background_thinker()
        {
            let plies = (bestmove.score - BLACK_WINS) / WIN_DELAY_PENALTY;
            self.ui.predict_mate(1 + plies / 2);
        }

        self.finish_turn(board, bestmove, think_time);
        Some(bestmove)
    }

    // -- shared turn scaffolding --------------------------------------------

    /// Generate and order the root list, reset counters, decay history.
    fn begin_turn(&mut self, board: &mut Board) {
        let mut ml = MoveList::new();
        {
            let mut pass = OrderingPass {
                white: board.white_to_move(),
                depth: 0,
                best_path_flag: false,
                current_best_path: &self.current_best_path,
                killer_path: None,
                xpos_move: Move::null(),
                hist: if board.white_to_move() {
                    &self.white_hist
                } else {
                    &self.black_hist
                },
                gene: &self.eval.gene,
            };
            let shuffle = if self.search_bias {
                Some(&mut self.rng)
            } else {
                None
            };
            board.generate_moves_ordered(&mut ml, &mut pass, shuffle);
        }
        self.root_ml = ml;

        self.visited = 0;
        self.generated = self.root_ml.len() as u64;
        self.visnodes = [0; super::NODES_ARRAY_SIZE];
        self.gennodes = [0; super::NODES_ARRAY_SIZE];
        self.gennodes[0] = self.root_ml.len() as u64;

        for entry in self.white_hist.iter_mut() {
            *entry /= 2;
        }
        for entry in self.black_hist.iter_mut() {
            *entry /= 2;
        }
    }

    /// Outcomes that skip the search entirely: a forced move, a book
    /// move, or a position the experience tree already knows.
    fn pre_search_move(&mut self, board: &mut Board, first: Move) -> Option<Move> {
        if self.root_ml.len() == 1 {
            let mut only = first;
            only.score = 0;
            self.current_best_path = BestPath::new();
            self.current_best_path.depth = 0;
            self.current_best_path.moves[0] = only;
            self.level = 0;
            return Some(only);
        }

        if self.opening_book_enabled {
            if let Some(book) = self.opening_book.as_mut() {
                if let Some(mv) = book.lookup(board) {
                    if board.is_legal(mv) {
                        if !self.quiet_instance {
                            self.ui.report_special("opening");
                        }
                        self.current_best_path = BestPath::new();
                        self.current_best_path.depth = 0;
                        self.current_best_path.moves[0] = mv;
                        self.level = 0;
                        return Some(mv);
                    }
                }
            }
        }

        if self.search_type == SearchType::Timed && self.training_enabled {
            if let Some(tree) = self.experience.as_mut() {
                if let Some(mv) = tree.familiar_position(board, self.time_limit_cs, &self.root_ml)
                {
                    if self.root_ml.contains(mv) {
                        if !self.quiet_instance {
                            self.ui.report_special(&format!("experience ({})", mv.score));
                        }
                        self.current_best_path = BestPath::new();
                        self.current_best_path.depth = 0;
                        self.current_best_path.moves[0] = mv;
                        self.level = 0;
                        return Some(mv);
                    }
                }
            }
        }

        None
    }

    fn finish_turn(&mut self, board: &mut Board, bestmove: Move, think_time_cs: i64) {
        if self.revert_time_limit_cs > 0 {
            let limit = self.revert_time_limit_cs;
            self.set_time_limit(limit);
            self.revert_time_limit_cs = 0;
        }

        if self.search_type == SearchType::Timed && self.training_enabled {
            let evaluated = self.eval.evaluated;
            if let Some(tree) = self.experience.as_mut() {
                tree.remember_position(board, bestmove, think_time_cs, evaluated);
            }
        }
    }

    // -- best-path plumbing --------------------------------------------------

    /// Copy the stored path of top-level move `mv` into
    /// `current_best_path`, or clear it when none is on file.
    pub(crate) fn find_prev_best_path(&mut self, mv: Move) {
        for path in &self.each_best_path {
            if path.depth > 0 && path.moves[0] == mv {
                self.current_best_path = *path;
                return;
            }
        }
        self.current_best_path = BestPath::new();
    }

    /// Store the line just computed under top-level move `mv`; returns
    /// its slot in `each_best_path`.
    pub(crate) fn save_tlm_best_path(&mut self, mv: Move) -> usize {
        let mut path = self.next_best_path[1];
        path.moves[0] = mv;

        for (i, existing) in self.each_best_path.iter_mut().enumerate() {
            if existing.moves[0] == mv {
                *existing = path;
                return i;
            }
        }

        if self.each_best_path.len() >= crate::board::MAX_MOVES {
            chess_fatal("top-level best path overflow");
        }
        self.each_best_path.push(path);
        self.each_best_path.len() - 1
    }

    /// A new best move at `depth`: record it and splice the line found
    /// below it up into this layer.
    pub(crate) fn found_best_move(&mut self, mv: Move, depth: i32) {
        let d = depth as usize;
        if d < MAX_BESTPATH_DEPTH - 1 {
            let below = self.next_best_path[d + 1];
            let this = &mut self.next_best_path[d];
            this.moves[d] = mv;
            this.depth = below.depth;
            let copy_to = (below.depth as usize).min(MAX_BESTPATH_DEPTH - 1);
            for i in d + 1..=copy_to {
                this.moves[i] = below.moves[i];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_best_move_splices_lines_upward() {
        let mut player = ComputerPlayer::detached(1);
        let m1 = Move::normal(crate::board::square_at(0, 1), crate::board::square_at(0, 2));
        let m2 = Move::normal(crate::board::square_at(1, 1), crate::board::square_at(1, 2));

        // The depth-2 layer holds a one-move line.
        player.next_best_path[2].moves[2] = m2;
        player.next_best_path[2].depth = 2;

        player.next_best_path[1].depth = 0;
        player.found_best_move(m1, 1);
        assert_eq!(player.next_best_path[1].depth, 2);
        assert_eq!(player.next_best_path[1].moves[1], m1);
        assert_eq!(player.next_best_path[1].moves[2], m2);
    }

    #[test]
    fn save_and_find_top_level_paths() {
        let mut player = ComputerPlayer::detached(1);
        let root = Move::normal(crate::board::square_at(4, 1), crate::board::square_at(4, 3));
        let reply = Move::normal(crate::board::square_at(4, 6), crate::board::square_at(4, 4));

        player.next_best_path[1].depth = 1;
        player.next_best_path[1].moves[1] = reply;

        let idx = player.save_tlm_best_path(root);
        assert_eq!(player.each_best_path[idx].moves[0], root);
        assert_eq!(player.each_best_path[idx].moves[1], reply);

        player.find_prev_best_path(root);
        assert_eq!(player.current_best_path.moves[1], reply);

        // Unknown move clears the path.
        player.find_prev_best_path(reply);
        assert!(player.current_best_path.depth < 0);
    }
}
