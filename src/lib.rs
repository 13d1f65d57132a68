//! caissa: a mailbox chess engine core.
//!
//! The crate provides the thinking half of a chess program: a 12x12
//! mailbox board with incremental make/unmake, legal move generation,
//! a tunable evaluator, iterative-deepening alpha-beta with quiescence
//! and transposition tables, and an opponent-time ponder worker. Hosts
//! supply the outside world (display, input, books, clocks) through the
//! [`ui::ChessUi`] trait and the interfaces in [`book`].
//!
//! # Example
//! ```
//! use caissa::board::Board;
//! use caissa::engine::{Engine, EngineOptions, GetMove, Player};
//!
//! let mut engine = Engine::detached(EngineOptions {
//!     search_depth: Some(2),
//!     opening_book: false,
//!     training: false,
//!     ..EngineOptions::default()
//! });
//! let mut board = Board::new();
//! match engine.get_move(&mut board).unwrap() {
//!     GetMove::Move { mv, .. } => assert!(board.is_legal(mv)),
//!     GetMove::Resign => unreachable!(),
//! }
//! ```

pub mod board;
pub mod book;
pub mod engine;
pub mod eval;
pub mod fatal;
pub(crate) mod ordering;
pub mod ponder;
pub mod score;
pub mod search;
pub mod sync;
pub mod tt;
pub mod ui;

pub use board::{Board, Color, Move, MoveList, Piece, Square};
pub use engine::{Engine, EngineOptions, GetMove, Player};
pub use score::Score;
