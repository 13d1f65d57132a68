//! The engine facade: the player interface a host drives.
//!
//! An `Engine` owns the searching player, the optional ponder worker and
//! the host callback set. It implements the three-call player protocol:
//! produce a move (or resign), learn that the opponent resigned, learn
//! that the game is over.

mod options;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::board::{Board, Move};
use crate::ponder::Ponderer;
use crate::score::Score;
use crate::search::ComputerPlayer;
use crate::ui::{ChessUi, UiHandle};

pub use options::EngineOptions;

/// Result of asking the engine for a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GetMove {
    /// The chosen move and the wall-clock centiseconds spent.
    Move { mv: Move, time_spent_cs: i64 },
    /// The engine resigns rather than play on.
    Resign,
}

#[derive(Debug)]
pub enum EngineError {
    /// The position offers no legal move; the game is already over.
    NoLegalMoves,
    /// An internal invariant was violated; the engine must be discarded.
    Fatal(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NoLegalMoves => write!(f, "no legal moves in this position"),
            EngineError::Fatal(message) => write!(f, "fatal engine error: {message}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// The player interface of the core. Hosts can also drive human or
/// remote players through the same trait.
pub trait Player {
    /// Produce a move for the current position, or resign.
    fn get_move(&mut self, board: &mut Board) -> Result<GetMove, EngineError>;

    /// The opponent resigned; stop any background thinking.
    fn inform_resignation(&mut self);

    /// The game ended with this final position.
    fn inform_game_over(&mut self, board: &Board);
}

pub struct Engine {
    ui: UiHandle,
    player: ComputerPlayer,
    ponderer: Option<Ponderer>,
    options: EngineOptions,
}

impl Engine {
    #[must_use]
    pub fn new(ui: Arc<dyn ChessUi>, options: EngineOptions) -> Engine {
        let tt_megabytes = options.tt_megabytes.clamp(1, 1024);
        let mut player = ComputerPlayer::new(Arc::clone(&ui), tt_megabytes);
        options.apply_to(&mut player);

        let ponderer = if options.ponder {
            Some(Ponderer::new(Arc::clone(&ui), tt_megabytes))
        } else {
            None
        };

        Engine {
            ui,
            player,
            ponderer,
            options,
        }
    }

    /// A quiet engine for tests and analysis tooling.
    #[must_use]
    pub fn detached(options: EngineOptions) -> Engine {
        Engine::new(Arc::new(crate::ui::NullUi), options)
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn player_mut(&mut self) -> &mut ComputerPlayer {
        &mut self.player
    }

    /// Begin a fresh game: clear the transposition table, history
    /// heuristics and any speculative state.
    pub fn new_game(&mut self) {
        if let Some(ponderer) = self.ponderer.as_mut() {
            ponderer.abort_search();
        }
        self.player.reset_history_buffers();
    }

    fn should_resign(&self, board: &Board, best_score: Score) -> bool {
        if !self.options.allow_resign {
            return false;
        }
        let against_mover = if board.white_to_move() {
            -best_score
        } else {
            best_score
        };
        against_mover >= self.options.clamped_resign_threshold()
    }

    fn run_search(&mut self, board: &mut Board) -> Result<GetMove, EngineError> {
        let report = self.player.find_move(board);
        let best = report.best_move.ok_or(EngineError::NoLegalMoves)?;

        if self.should_resign(board, best.score) {
            return Ok(GetMove::Resign);
        }

        // Hand the continuation to the ponder worker before returning.
        if let (Some(ponderer), Some(predicted)) =
            (self.ponderer.as_mut(), report.predicted_reply)
        {
            if report.time_spent_cs >= 100 {
                ponderer.start_thinking(board, best, predicted);
            }
        }

        self.ui.display_move(board, best);
        Ok(GetMove::Move {
            mv: best,
            time_spent_cs: report.time_spent_cs,
        })
    }
}

impl Player for Engine {
    fn get_move(&mut self, board: &mut Board) -> Result<GetMove, EngineError> {
        // First see whether the opponent walked into the pondered line.
        if let Some(ponderer) = self.ponderer.as_mut() {
            let budget = self.options.time_limit_cs.unwrap_or(0);
            if budget > 0 {
                if let Some((mv, _prediction, time_spent_cs)) =
                    ponderer.finish_thinking(board, budget)
                {
                    self.ui.display_move(board, mv);
                    return Ok(GetMove::Move { mv, time_spent_cs });
                }
            } else {
                ponderer.abort_search();
            }
        }

        let result = catch_unwind(AssertUnwindSafe(|| self.run_search(board)));
        match result {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(EngineError::Fatal(message))
            }
        }
    }

    fn inform_resignation(&mut self) {
        if let Some(ponderer) = self.ponderer.as_mut() {
            ponderer.abort_search();
        }
    }

    fn inform_game_over(&mut self, board: &Board) {
        if let Some(ponderer) = self.ponderer.as_mut() {
            ponderer.abort_search();
        }
        let result = if !board.white_to_move() && board.in_check(crate::board::Color::Black) {
            "1-0"
        } else if board.white_to_move() && board.in_check(crate::board::Color::White) {
            "0-1"
        } else {
            "1/2-1/2"
        };
        log::info!("game over ({result})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_options() -> EngineOptions {
        EngineOptions {
            search_depth: Some(2),
            time_limit_cs: None,
            opening_book: false,
            training: false,
            search_bias: false,
            ponder: false,
            ..EngineOptions::default()
        }
    }

    #[test]
    fn engine_plays_a_legal_move() {
        let mut engine = Engine::detached(quick_options());
        let mut board = Board::new();
        match engine.get_move(&mut board).expect("move") {
            GetMove::Move { mv, .. } => assert!(board.is_legal(mv)),
            GetMove::Resign => panic!("engine resigned the initial position"),
        }
    }

    #[test]
    fn hopeless_position_triggers_resignation() {
        let mut options = quick_options();
        options.allow_resign = true;
        options.resign_threshold = 400;
        let mut engine = Engine::detached(options);

        // Black to move with king vs king + two queens: hopeless.
        let mut board =
            Board::from_fen("4k3/8/8/8/8/8/Q7/QK6 b - - 0 1").expect("FEN");
        match engine.get_move(&mut board).expect("result") {
            GetMove::Resign => {}
            GetMove::Move { mv, .. } => panic!("played {mv:?} instead of resigning"),
        }
    }

    #[test]
    fn game_over_with_no_moves_is_reported() {
        let mut engine = Engine::detached(quick_options());
        // Stalemate: no legal moves.
        let mut board = Board::from_fen("k7/2Q5/2K5/8/8/8/8/8 b - - 0 1").expect("FEN");
        assert!(matches!(
            engine.get_move(&mut board),
            Err(EngineError::NoLegalMoves)
        ));
    }

    #[test]
    fn resignation_respects_the_allow_flag() {
        let mut engine = Engine::detached(quick_options());
        let mut board =
            Board::from_fen("4k3/8/8/8/8/8/Q7/QK6 b - - 0 1").expect("FEN");
        match engine.get_move(&mut board).expect("move") {
            GetMove::Move { mv, .. } => assert!(board.is_legal(mv)),
            GetMove::Resign => panic!("resigned with allow_resign off"),
        }
    }
}
