//! The host-callback surface.
//!
//! The engine never talks to a screen, a pipe or a dialog itself; it
//! calls these methods and the host renders them however it likes. Every
//! method has a no-op default so hosts implement only what they show.

use std::sync::Arc;

use crate::board::{Board, Move};
use crate::score::Score;
use crate::search::bestpath::BestPath;
use crate::search::SearchStatistics;

pub trait ChessUi: Send + Sync {
    /// A player has committed to `mv` in `board` (not yet applied).
    fn display_move(&self, _board: &Board, _mv: Move) {}

    /// A move was applied; `san` is its short algebraic form.
    fn record_move(&self, _board: &Board, _mv: Move, _san: &str) {}

    /// The engine started or stopped thinking.
    fn computer_is_thinking(&self, _thinking: bool) {}

    /// Principal variation for the move currently considered best.
    fn display_best_path(&self, _board: &Board, _path: &BestPath) {}

    /// The root move currently being searched at iteration `level`.
    fn display_current_move(&self, _board: &Board, _mv: Move, _level: i32) {}

    /// A new best root move at iteration `level`.
    fn display_best_move_so_far(&self, _board: &Board, _mv: Move, _level: i32) {}

    /// End-of-search statistics.
    fn report_computer_stats(&self, _stats: &SearchStatistics) {}

    /// Short status strings such as "opening" or "experience".
    fn report_special(&self, _tag: &str) {}

    /// Free-form notification ("white.gen has been loaded.").
    fn notify_user(&self, _message: &str) {}

    /// The engine sees a forced mate in `moves` full moves.
    fn predict_mate(&self, _moves: i32) {}

    /// Instrumentation: entering a ply during search.
    fn debug_ply(&self, _depth: i32, _board: &Board, _mv: Move) {}

    /// Instrumentation: leaving a ply with its final score.
    fn debug_exit(&self, _depth: i32, _board: &Board, _score: Score) {}

    /// Ask the human player for a move. `None` means no input source.
    fn read_move(&self, _board: &Board) -> Option<String> {
        None
    }

    /// Ask which piece a pawn should become when the host left the
    /// choice open. The search itself always encodes the piece in the
    /// move.
    fn prompt_pawn_promotion(&self, _board: &Board) -> crate::board::Piece {
        crate::board::Piece::Queen
    }
}

/// A host that renders nothing. Useful for tests, benchmarks and
/// background analysis instances.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullUi;

impl ChessUi for NullUi {}

/// Shared handle hosts pass around.
pub type UiHandle = Arc<dyn ChessUi>;
