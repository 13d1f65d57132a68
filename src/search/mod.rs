//! The searching player: iterative-deepening alpha-beta with quiescence,
//! transposition memoization, heuristic move ordering and cooperative
//! time control.
//!
//! One `ComputerPlayer` owns everything a single search needs (apart
//! from the board it is handed), so two players, the foreground engine
//! and a ponder worker, never share mutable state.

pub mod bestpath;

mod alphabeta;
mod iterative;
mod timing;

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::{Board, Move, MoveList};
use crate::book::{ExperienceTree, OpeningBook};
use crate::eval::Evaluator;
use crate::ordering::HistoryTable;
use crate::score::Score;
use crate::sync::SearchControl;
use crate::tt::TranspositionTable;
use crate::ui::{NullUi, UiHandle};

use bestpath::{BestPath, MAX_BESTPATH_DEPTH};

/// Per-depth node counter arrays; also bounds the deepest timed search
/// (`NODES_ARRAY_SIZE / 4 - 1`).
pub const NODES_ARRAY_SIZE: usize = 64;

/// Depth of the in-search repetition hash stack.
pub(crate) const HASH_PATH_SIZE: usize = 64;

/// How a search decides it is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchType {
    /// Fixed depth in plies.
    Depth,
    /// Wall-clock limited.
    Timed,
    /// Bounded number of evaluated positions.
    MaxEval,
}

/// End-of-search numbers reported to the host.
#[derive(Clone, Debug)]
pub struct SearchStatistics {
    pub time_spent_cs: i64,
    pub nodes_visited: u64,
    pub nodes_evaluated: u64,
    pub nodes_generated: u64,
    /// Deepest completed iteration plus one (a human-friendly "depth").
    pub depth: i32,
    pub visited_by_depth: [u64; NODES_ARRAY_SIZE],
    pub generated_by_depth: [u64; NODES_ARRAY_SIZE],
}

/// What a completed (or aborted) search hands back.
#[derive(Clone, Copy, Debug)]
pub struct SearchReport {
    /// Best move found; `None` only when the position had no legal moves.
    pub best_move: Option<Move>,
    /// The reply the engine expects; feeds pondering.
    pub predicted_reply: Option<Move>,
    pub time_spent_cs: i64,
}

pub struct ComputerPlayer {
    pub(crate) ui: UiHandle,
    pub(crate) eval: Evaluator,
    pub(crate) tt: TranspositionTable,

    // Search configuration.
    pub(crate) min_level: i32,
    pub(crate) max_level: i32,
    pub(crate) search_type: SearchType,
    pub(crate) time_limit_cs: i64,
    pub(crate) max_nodes_evaluated: u64,
    pub(crate) search_bias: bool,
    pub(crate) extend_search_flag: bool,
    pub(crate) opening_book_enabled: bool,
    pub(crate) training_enabled: bool,
    /// Suppresses UI callbacks; set on ponder and analysis instances.
    pub(crate) quiet_instance: bool,
    /// Marks the single background ponder player.
    pub(crate) is_ponder_instance: bool,

    pub(crate) opening_book: Option<Box<dyn OpeningBook>>,
    pub(crate) experience: Option<Box<dyn ExperienceTree>>,

    // Live search state.
    pub(crate) control: SearchControl,
    pub(crate) search_aborted: bool,
    pub(crate) level: i32,
    pub(crate) prev_completed_level: i32,
    pub(crate) computer_playing_white: bool,
    pub(crate) time_check_counter: u32,
    pub(crate) time_check_limit: u32,
    pub(crate) prev_check_time: Instant,
    pub(crate) expected_score_prev: Score,
    pub(crate) expected_score_now: Score,
    pub(crate) revert_time_limit_cs: i64,

    // Statistics.
    pub(crate) visited: u64,
    pub(crate) generated: u64,
    pub(crate) visnodes: [u64; NODES_ARRAY_SIZE],
    pub(crate) gennodes: [u64; NODES_ARRAY_SIZE],
    pub(crate) hit_max_history: bool,

    // Ordering state.
    pub(crate) white_hist: Box<HistoryTable>,
    pub(crate) black_hist: Box<HistoryTable>,

    // Principal-variation machinery.
    pub(crate) current_best_path: BestPath,
    pub(crate) next_best_path: Box<[BestPath; MAX_BESTPATH_DEPTH]>,
    pub(crate) each_best_path: Vec<BestPath>,
    pub(crate) hash_path: [u32; HASH_PATH_SIZE],
    pub(crate) root_ml: MoveList,

    // Cross-turn continuation state.
    pub(crate) expected_next_board_hash: u32,
    pub(crate) predicted_opp_move: Option<Move>,

    pub(crate) rng: StdRng,
    gene_loaded: bool,
    pub(crate) gene_file: Option<std::path::PathBuf>,
}

impl ComputerPlayer {
    #[must_use]
    pub fn new(ui: UiHandle, tt_megabytes: usize) -> ComputerPlayer {
        let now = Instant::now();
        ComputerPlayer {
            ui,
            eval: Evaluator::new(),
            tt: TranspositionTable::new(tt_megabytes),
            min_level: 0,
            max_level: 3,
            search_type: SearchType::Depth,
            time_limit_cs: 0,
            max_nodes_evaluated: 0,
            search_bias: true,
            extend_search_flag: false,
            opening_book_enabled: true,
            training_enabled: true,
            quiet_instance: false,
            is_ponder_instance: false,
            opening_book: None,
            experience: None,
            control: SearchControl::new(),
            search_aborted: false,
            level: 0,
            prev_completed_level: 0,
            computer_playing_white: false,
            time_check_counter: 0,
            time_check_limit: 100,
            prev_check_time: now,
            expected_score_prev: 0,
            expected_score_now: 0,
            revert_time_limit_cs: 0,
            visited: 0,
            generated: 0,
            visnodes: [0; NODES_ARRAY_SIZE],
            gennodes: [0; NODES_ARRAY_SIZE],
            hit_max_history: false,
            white_hist: Box::new([0; 4096]),
            black_hist: Box::new([0; 4096]),
            current_best_path: BestPath::new(),
            next_best_path: Box::new([BestPath::new(); MAX_BESTPATH_DEPTH]),
            each_best_path: Vec::new(),
            hash_path: [0; HASH_PATH_SIZE],
            root_ml: MoveList::new(),
            expected_next_board_hash: 0,
            predicted_opp_move: None,
            rng: StdRng::seed_from_u64(0x5eed_cafe_f00d),
            gene_loaded: false,
            gene_file: None,
        }
    }

    /// A player with no host UI at all (tests, benches, workers).
    #[must_use]
    pub fn detached(tt_megabytes: usize) -> ComputerPlayer {
        ComputerPlayer::new(Arc::new(NullUi), tt_megabytes)
    }

    // -- configuration -------------------------------------------------------

    /// Fixed-depth search of `plies`.
    pub fn set_search_depth(&mut self, plies: i32) {
        self.max_level = plies;
        self.search_type = SearchType::Depth;
        self.search_aborted = false;
    }

    /// Start iterative deepening at this level (used when a recycled
    /// best path makes shallow iterations redundant).
    pub fn set_min_search_depth(&mut self, plies: i32) {
        self.expected_next_board_hash = 0;
        self.min_level = plies;
    }

    /// Timed search; at least a tenth of a second.
    pub fn set_time_limit(&mut self, centiseconds: i64) {
        self.max_level = (NODES_ARRAY_SIZE / 4 - 1) as i32;
        self.search_type = SearchType::Timed;
        self.search_aborted = false;
        self.time_limit_cs = centiseconds.max(10);
        self.control.set_deadline(Some(
            Instant::now() + timing::centis(self.time_limit_cs),
        ));
    }

    /// Evaluation-count-limited search.
    pub fn set_max_nodes_evaluated(&mut self, max_nodes: u64) {
        if max_nodes < 100 {
            crate::fatal::chess_fatal("max nodes evaluated is too small");
        }
        self.max_level = (NODES_ARRAY_SIZE / 4 - 1) as i32;
        self.search_type = SearchType::MaxEval;
        self.search_aborted = false;
        self.max_nodes_evaluated = max_nodes;
    }

    /// Shuffle root moves before sorting, randomizing play among equals.
    pub fn set_search_bias(&mut self, randomized: bool) {
        self.search_bias = randomized;
    }

    /// Enable the late-drop re-plan: a timed search whose score falls
    /// sharply at the deadline converts to fixed depth to finish the
    /// iteration.
    pub fn set_extend_search(&mut self, enabled: bool) {
        self.extend_search_flag = enabled;
    }

    pub fn set_opening_book(&mut self, book: Option<Box<dyn OpeningBook>>) {
        self.opening_book = book;
    }

    pub fn set_opening_book_enabled(&mut self, enabled: bool) {
        self.opening_book_enabled = enabled;
    }

    pub fn set_experience_tree(&mut self, tree: Option<Box<dyn ExperienceTree>>) {
        self.experience = tree;
    }

    pub fn set_training_enabled(&mut self, enabled: bool) {
        self.training_enabled = enabled;
    }

    /// Gene file consulted once, on the first search.
    pub fn set_gene_file(&mut self, path: Option<std::path::PathBuf>) {
        self.gene_file = path;
        self.gene_loaded = false;
    }

    /// Silence UI callbacks; background workers use this.
    pub fn set_quiet_instance(&mut self, quiet: bool) {
        self.quiet_instance = quiet;
    }

    pub(crate) fn mark_ponder_instance(&mut self) {
        self.is_ponder_instance = true;
        self.quiet_instance = true;
    }

    /// True for workers whose results are speculative: they never
    /// announce mates or drive displays.
    pub(crate) fn is_background_thinker(&self) -> bool {
        self.is_ponder_instance || self.quiet_instance
    }

    /// Resize (and clear) the transposition table.
    pub fn set_tt_megabytes(&mut self, megabytes: usize) {
        self.tt = TranspositionTable::new(megabytes.clamp(1, 1024));
    }

    /// Shared handle for aborting this player's search from outside.
    #[must_use]
    pub fn search_control(&self) -> SearchControl {
        self.control.clone()
    }

    /// Forget everything learned during this game.
    pub fn reset_history_buffers(&mut self) {
        *self.white_hist = [0; 4096];
        *self.black_hist = [0; 4096];
        self.tt.reset();
        self.expected_next_board_hash = 0;
        self.predicted_opp_move = None;
        self.current_best_path = BestPath::new();
        self.prev_completed_level = 0;
    }

    #[must_use]
    pub fn predicted_opponent_move(&self) -> Option<Move> {
        self.predicted_opp_move
    }

    /// Nodes visited by the most recent search.
    #[must_use]
    pub fn visited_nodes(&self) -> u64 {
        self.visited
    }

    /// Did the last search saturate a history-table entry? Diagnostic
    /// for tuning `HASH_HIST_MAX`.
    #[must_use]
    pub fn hit_max_history(&self) -> bool {
        self.hit_max_history
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.eval
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.eval
    }

    // -- the search entry point ----------------------------------------------

    /// Run a full search on `board` and return the chosen move, the
    /// predicted reply and the time spent. The board is returned in its
    /// original state.
    pub fn find_move(&mut self, board: &mut Board) -> SearchReport {
        let started = Instant::now();
        self.search_aborted = false;
        self.control.clear_abort();
        if self.search_type == SearchType::Timed {
            self.prev_check_time = started;
            self.time_check_counter = 0;
            self.control
                .set_deadline(Some(started + timing::centis(self.time_limit_cs)));
        } else {
            self.control.set_deadline(None);
        }
        self.hit_max_history = false;

        if !self.quiet_instance {
            self.ui.computer_is_thinking(true);
        }

        self.load_gene_once(board);
        self.eval.choose_mode(board);
        self.eval.evaluated = 0;
        self.tt.start_new_search();

        let best_move = if board.white_to_move() {
            self.get_white_move(board)
        } else {
            self.get_black_move(board)
        };

        let time_spent_cs = timing::centis_since(started);
        if !self.quiet_instance {
            self.ui.computer_is_thinking(false);
            self.ui.report_computer_stats(&SearchStatistics {
                time_spent_cs,
                nodes_visited: self.visited,
                nodes_evaluated: self.eval.evaluated,
                nodes_generated: self.generated,
                depth: self.level + 1,
                visited_by_depth: self.visnodes,
                generated_by_depth: self.gennodes,
            });
        }

        // Prepare for a possible continuation: remember the expected
        // board if the opponent answers as predicted, so the next search
        // can recycle this one's best path.
        self.predicted_opp_move = None;
        self.expected_next_board_hash = 0;
        if let Some(best) = best_move {
            self.find_prev_best_path(best);
            if self.current_best_path.depth > 1 && board.is_legal(best) {
                let mut my_move = best;
                let unmove_mine = board.make_move(&mut my_move, true, true);
                let predicted = self.current_best_path.moves[1];
                if board.is_legal(predicted) {
                    let mut reply = predicted;
                    let unmove_reply = board.make_move(&mut reply, true, true);
                    self.expected_next_board_hash = board.hash();
                    self.predicted_opp_move = Some(reply);
                    board.unmake_move(reply, &unmove_reply);
                }
                board.unmake_move(my_move, &unmove_mine);
            }
        }

        log::debug!(
            "search done: move={:?} level={} visited={} evaluated={} time={}cs",
            best_move,
            self.level,
            self.visited,
            self.eval.evaluated,
            time_spent_cs
        );

        SearchReport {
            best_move,
            predicted_reply: self.predicted_opp_move,
            time_spent_cs,
        }
    }

    fn load_gene_once(&mut self, board: &Board) {
        if self.gene_loaded {
            return;
        }
        self.gene_loaded = true;
        let path = match &self.gene_file {
            Some(path) => path.clone(),
            None => {
                let name = if board.white_to_move() {
                    "white.gen"
                } else {
                    "black.gen"
                };
                std::path::PathBuf::from(name)
            }
        };
        match self.eval.gene.load(&path) {
            Ok(true) => {
                if !self.quiet_instance {
                    self.ui
                        .notify_user(&format!("{} has been loaded.", path.display()));
                }
                // A hand-trained gene should not be diluted by play.
                self.training_enabled = false;
            }
            Ok(false) => {}
            Err(err) => {
                log::warn!("gene file {} ignored: {err}", path.display());
                self.eval.gene.reset();
            }
        }
    }
}
