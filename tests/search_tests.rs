//! Search scenario tests: mate detection, repetition, transposition
//! reuse and the lone-king endgame drive.

use caissa::board::{rank_of, file_of, Board, Color, MoveList};
use caissa::score::{BLACK_WINS, WON_FOR_BLACK};
use caissa::search::ComputerPlayer;

fn depth_player(depth: i32) -> ComputerPlayer {
    let mut player = ComputerPlayer::detached(4);
    player.set_search_depth(depth);
    player.set_opening_book_enabled(false);
    player.set_training_enabled(false);
    player.set_search_bias(false);
    player
}

fn play(board: &mut Board, moves: &[&str]) {
    for text in moves {
        let mut mv = board.scan_move(text).expect(text);
        board.make_move(&mut mv, true, true);
    }
}

#[test]
fn fools_mate_is_found_and_ends_the_game() {
    let mut board = Board::new();
    play(&mut board, &["f2f3", "e7e5", "g2g4"]);

    // The mating move must be generated for Black.
    let qh4 = board.scan_move("d8h4").expect("Qh4 generated");
    let mut ml = MoveList::new();
    board.generate_moves(&mut ml);
    assert!(ml.contains(qh4));

    // A depth-2 search must find it and score it as a forced win.
    let mut player = depth_player(2);
    let report = player.find_move(&mut board);
    let best = report.best_move.expect("move");
    assert_eq!(best, qh4);
    assert!(best.score <= WON_FOR_BLACK, "score {}", best.score);
    assert!(best.score > BLACK_WINS, "mate score must carry postponement");

    // After the move: White is checkmated.
    let mut mv = best;
    board.make_move(&mut mv, true, true);
    assert!(board.in_check(Color::White));
    assert!(!board.current_player_can_move());
}

#[test]
fn threefold_shuffle_is_a_definite_draw() {
    let mut board = Board::new();
    play(
        &mut board,
        &["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"],
    );
    assert!(board.is_definite_draw());
    assert_eq!(board.number_of_repetitions(), 3);

    // The search still returns a move for the (already drawn) position.
    let mut player = depth_player(2);
    assert!(player.find_move(&mut board).best_move.is_some());
}

#[test]
fn transposition_table_cuts_the_repeat_search() {
    let mut board = Board::from_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1",
    )
    .expect("FEN");

    let mut player = depth_player(5);
    player.find_move(&mut board);
    let first = player.visited_nodes();

    player.find_move(&mut board);
    let second = player.visited_nodes();

    assert!(
        second * 5 < first,
        "expected a >5x node reduction, got {first} then {second}"
    );
}

#[test]
fn lone_king_is_driven_to_the_edge() {
    // White king g1, white queen a1, black king e5.
    let mut board = Board::from_fen("8/8/8/4k3/8/8/8/Q5K1 w - - 0 1").expect("FEN");
    let mut player = depth_player(4);

    let mut reached_edge = false;
    for _ply in 0..24 {
        let report = player.find_move(&mut board);
        let Some(best) = report.best_move else {
            break; // mate or stalemate
        };
        assert!(board.is_legal(best), "search proposed an illegal move");
        let mut mv = best;
        board.make_move(&mut mv, true, true);

        let bk = board.king_offset(Color::Black);
        let on_edge =
            rank_of(bk) == 0 || rank_of(bk) == 7 || file_of(bk) == 0 || file_of(bk) == 7;
        if on_edge {
            reached_edge = true;
        }
        if board.is_definite_draw() {
            break;
        }
        if !board.current_player_can_move() {
            assert!(
                board.in_check(board.to_move()),
                "stalemated the lone king instead of mating"
            );
            break;
        }
    }

    assert!(reached_edge, "black king never reached the board edge");
}

#[test]
fn aborted_search_still_reports_its_best_so_far() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let mut board = Board::new();
    let mut player = depth_player(10);
    let control = player.search_control();

    // Keep re-asserting the abort: the search clears the flag when a
    // new top-level call begins, so one shot can be lost to the race.
    let done = Arc::new(AtomicBool::new(false));
    let done_for_thread = Arc::clone(&done);
    let canceller = std::thread::spawn(move || {
        while !done_for_thread.load(Ordering::Relaxed) {
            control.abort();
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    });

    let report = player.find_move(&mut board);
    done.store(true, Ordering::Relaxed);
    canceller.join().expect("canceller thread");

    assert!(report.best_move.is_some());
}

#[test]
fn node_limited_search_respects_its_budget() {
    let mut board = Board::new();
    let mut player = ComputerPlayer::detached(1);
    player.set_opening_book_enabled(false);
    player.set_search_bias(false);
    player.set_max_nodes_evaluated(2000);

    let report = player.find_move(&mut board);
    assert!(report.best_move.is_some());
    assert!(
        player.evaluator().evaluated <= 4000,
        "evaluated {} nodes against a 2000 budget",
        player.evaluator().evaluated
    );
}
