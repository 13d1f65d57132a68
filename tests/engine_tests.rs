//! Engine-facade tests: the player protocol, options, pondering
//! lifecycle and host callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use caissa::board::{Board, Move};
use caissa::engine::{Engine, EngineOptions, GetMove, Player};
use caissa::search::SearchStatistics;
use caissa::ui::ChessUi;

fn quick_options() -> EngineOptions {
    EngineOptions {
        search_depth: Some(2),
        opening_book: false,
        training: false,
        search_bias: false,
        ponder: false,
        ..EngineOptions::default()
    }
}

#[derive(Default)]
struct CountingUi {
    moves_displayed: AtomicUsize,
    stats_reported: AtomicUsize,
    thinking_toggles: AtomicUsize,
}

impl ChessUi for CountingUi {
    fn display_move(&self, _board: &Board, _mv: Move) {
        self.moves_displayed.fetch_add(1, Ordering::Relaxed);
    }

    fn computer_is_thinking(&self, _thinking: bool) {
        self.thinking_toggles.fetch_add(1, Ordering::Relaxed);
    }

    fn report_computer_stats(&self, stats: &SearchStatistics) {
        assert!(stats.nodes_visited > 0);
        assert!(stats.nodes_evaluated > 0);
        self.stats_reported.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn host_callbacks_fire_during_a_search() {
    let ui = Arc::new(CountingUi::default());
    let mut engine = Engine::new(ui.clone(), quick_options());
    let mut board = Board::new();

    let result = engine.get_move(&mut board).expect("move");
    assert!(matches!(result, GetMove::Move { .. }));
    assert_eq!(ui.moves_displayed.load(Ordering::Relaxed), 1);
    assert_eq!(ui.stats_reported.load(Ordering::Relaxed), 1);
    assert_eq!(ui.thinking_toggles.load(Ordering::Relaxed), 2);
}

#[test]
fn engine_plays_a_short_game_against_itself() {
    let mut white = Engine::detached(quick_options());
    let mut black = Engine::detached(quick_options());
    let mut board = Board::new();

    for ply in 0..12 {
        let engine = if board.white_to_move() {
            &mut white
        } else {
            &mut black
        };
        match engine.get_move(&mut board) {
            Ok(GetMove::Move { mv, .. }) => {
                assert!(board.is_legal(mv), "illegal move at ply {ply}");
                let mut mv = mv;
                board.make_move(&mut mv, true, true);
                board.validate_full().expect("board stays consistent");
            }
            Ok(GetMove::Resign) => break,
            Err(err) => panic!("engine error at ply {ply}: {err}"),
        }
    }
}

#[test]
fn pondering_engine_survives_a_game_fragment() {
    let options = EngineOptions {
        time_limit_cs: Some(10),
        ponder: true,
        ..quick_options()
    };
    let mut engine = Engine::new(Arc::new(caissa::ui::NullUi), options);
    let mut board = Board::new();

    for _ in 0..3 {
        match engine.get_move(&mut board) {
            Ok(GetMove::Move { mv, .. }) => {
                let mut mv = mv;
                board.make_move(&mut mv, true, true);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        // The "opponent" replies with the first legal move found.
        let mut ml = caissa::board::MoveList::new();
        board.generate_moves(&mut ml);
        let Some(reply) = ml.as_slice().first().copied() else {
            break;
        };
        let mut reply = reply;
        board.make_move(&mut reply, true, true);
    }

    engine.inform_resignation();
    engine.inform_game_over(&board);
}

#[test]
fn new_game_clears_speculative_state() {
    let mut engine = Engine::detached(quick_options());
    let mut board = Board::new();
    let _ = engine.get_move(&mut board).expect("move");
    engine.new_game();
    // A fresh game must search cleanly again.
    let result = engine.get_move(&mut board).expect("move after reset");
    assert!(matches!(result, GetMove::Move { .. }));
}

#[test]
fn max_nodes_option_limits_the_search() {
    let options = EngineOptions {
        search_depth: None,
        time_limit_cs: None,
        max_nodes: 1500,
        ..quick_options()
    };
    let mut engine = Engine::detached(options);
    let mut board = Board::new();
    let result = engine.get_move(&mut board).expect("move");
    assert!(matches!(result, GetMove::Move { .. }));
}
