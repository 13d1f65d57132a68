//! Draw detection: repetition, 50-move rule, insufficient material.

use crate::board::Board;

fn play(board: &mut Board, moves: &[&str]) {
    for text in moves {
        let mut mv = board.scan_move(text).expect(text);
        board.make_move(&mut mv, true, true);
    }
}

#[test]
fn threefold_by_knight_shuffle() {
    let mut board = Board::new();
    // Start position occurs the third time after the eighth ply.
    play(
        &mut board,
        &["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"],
    );
    assert_eq!(board.number_of_repetitions(), 3);
    assert!(board.is_definite_draw());
}

#[test]
fn two_occurrences_are_not_a_draw() {
    let mut board = Board::new();
    play(&mut board, &["Nf3", "Nf6", "Ng1", "Ng8"]);
    assert_eq!(board.number_of_repetitions(), 2);
    assert!(!board.is_definite_draw());
}

#[test]
fn repetition_counter_unwinds_with_unmake() {
    let mut board = Board::new();
    play(&mut board, &["Nf3", "Nf6", "Ng1"]);
    let mut mv = board.scan_move("Ng8").expect("Ng8");
    let unmove = board.make_move(&mut mv, true, true);
    assert_eq!(board.number_of_repetitions(), 2);
    board.unmake_move(mv, &unmove);
    let mut mv2 = board.scan_move("Ng8").expect("Ng8 again");
    board.make_move(&mut mv2, true, true);
    assert_eq!(board.number_of_repetitions(), 2);
}

#[test]
fn fifty_move_rule_at_one_hundred_plies() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").expect("FEN");
    assert!(!board.is_definite_draw());
    let mut mv = board.scan_move("Ra2").expect("rook waiting move");
    board.make_move(&mut mv, true, true);
    assert_eq!(board.halfmove_clock(), 100);
    assert!(board.is_definite_draw());
}

#[test]
fn insufficient_material_cases() {
    // King vs king.
    assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
        .expect("kk")
        .is_definite_draw());
    // King and bishop vs king.
    assert!(Board::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1")
        .expect("kbk")
        .is_definite_draw());
    // King and knight vs king.
    assert!(Board::from_fen("4k3/8/8/8/8/8/8/1N2K3 w - - 0 1")
        .expect("knk")
        .is_definite_draw());
    // Same-colored bishops cannot mate.
    assert!(Board::from_fen("2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1")
        .expect("same shade")
        .is_definite_draw());
    // A rook can mate.
    assert!(!Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1")
        .expect("krk")
        .is_definite_draw());
    // Opposite-colored bishops: not a definite draw here.
    assert!(!Board::from_fen("1b2k3/8/8/8/8/8/8/2B1K3 w - - 0 1")
        .expect("opposite shades")
        .is_definite_draw());
}
