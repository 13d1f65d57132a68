//! Interfaces to knowledge sources outside the core: the opening book
//! and the experience ("training") tree. The core only consults them;
//! their storage and contents live with the host.

use crate::board::{Board, Move, MoveList};

/// An opening library consulted before searching, while the game is
/// young enough for it to apply.
pub trait OpeningBook: Send {
    /// A book move for this position, or `None` to fall through to the
    /// search.
    fn lookup(&mut self, board: &mut Board) -> Option<Move>;
}

/// Accumulated results of earlier games/searches.
pub trait ExperienceTree: Send {
    /// A move known best from a previous, at-least-as-long think.
    fn familiar_position(
        &mut self,
        board: &mut Board,
        time_limit_cs: i64,
        legal_moves: &MoveList,
    ) -> Option<Move>;

    /// Record the move chosen by a completed timed search.
    fn remember_position(
        &mut self,
        board: &mut Board,
        best_move: Move,
        think_time_cs: i64,
        positions_evaluated: u64,
    );
}
