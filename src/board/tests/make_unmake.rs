//! Deep make/unmake regressions beyond the unit tests in `make_unmake.rs`.

use crate::board::moves::MoveList;
use crate::board::{Board, Color, Piece};

fn play(board: &mut Board, moves: &[&str]) {
    for text in moves {
        let mut mv = board.scan_move(text).expect(text);
        board.make_move(&mut mv, true, true);
    }
}

#[test]
fn en_passant_removes_the_passed_pawn() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
            .expect("FEN");
    let before_pawns = board.inventory(Color::Black, Piece::Pawn);
    let mut mv = board.scan_move("exf6").expect("exf6");
    assert!(mv.is_en_passant());
    let unmove = board.make_move(&mut mv, true, true);

    assert!(board.square(5, 4).is_empty(), "captured pawn removed from f5");
    assert!(board.square(5, 5).is(Color::White, Piece::Pawn));
    assert_eq!(board.inventory(Color::Black, Piece::Pawn), before_pawns - 1);
    board.validate_full().expect("consistent after en passant");

    board.unmake_move(mv, &unmove);
    assert!(board.square(5, 4).is(Color::Black, Piece::Pawn));
    assert_eq!(board.inventory(Color::Black, Piece::Pawn), before_pawns);
    board.validate_full().expect("consistent after unmake");
}

#[test]
fn en_passant_hash_differs_by_exactly_the_removed_pawn() {
    use crate::board::hash::piece_hash;
    use crate::board::square_at;

    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
            .expect("FEN");
    let mut ep = board.scan_move("exf6").expect("exf6");
    let unmove = board.make_move(&mut ep, true, true);
    let hash_after_ep = board.hash();
    board.unmake_move(ep, &unmove);

    // The same pawn walking e5-f6 without the en-passant victim present:
    // the difference must be exactly the f5 pawn's hash contribution.
    let naive = board
        .hash()
        .wrapping_sub(piece_hash(Color::White, Piece::Pawn, square_at(4, 4)))
        .wrapping_add(piece_hash(Color::White, Piece::Pawn, square_at(5, 5)));
    assert_eq!(
        hash_after_ep,
        naive.wrapping_sub(piece_hash(Color::Black, Piece::Pawn, square_at(5, 4)))
    );
}

#[test]
fn promotion_inventory_and_material_round_trip() {
    let mut board = Board::from_fen("8/P3k3/8/8/8/8/4K3/8 w - - 0 1").expect("FEN");
    let hash_before = board.hash();
    let mut mv = board.scan_move("a8=N").expect("a8=N");
    let unmove = board.make_move(&mut mv, true, true);
    assert_eq!(board.inventory(Color::White, Piece::Pawn), 0);
    assert_eq!(board.inventory(Color::White, Piece::Knight), 1);
    board.validate_full().expect("promotion state");
    board.unmake_move(mv, &unmove);
    assert_eq!(board.inventory(Color::White, Piece::Pawn), 1);
    assert_eq!(board.inventory(Color::White, Piece::Knight), 0);
    assert_eq!(board.hash(), hash_before);
}

#[test]
fn rook_capture_forfeits_castling() {
    // White bishop takes the h8 rook; black must lose kingside castling.
    let mut board =
        Board::from_fen("r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1").expect("FEN");
    play(&mut board, &["Bxh8"]);
    let fen = board.get_fen();
    let castling = fen.split_whitespace().nth(2).expect("castling field");
    assert_eq!(castling, "KQq");
}

#[test]
fn check_bit_is_recorded_on_checking_moves() {
    let mut board = Board::new();
    play(&mut board, &["e4", "e5", "Qh5", "Nc6"]);
    let mut ml = MoveList::new();
    board.generate_moves(&mut ml);
    let qxf7 = board.scan_move("Qxf7").expect("Qxf7");
    let generated = ml.iter().find(|m| **m == qxf7).expect("generated");
    assert!(generated.causes_check(), "Qxf7+ must carry the check bit");
}

#[test]
fn remake_with_recorded_check_bit_matches_full_make() {
    let mut board = Board::new();
    play(&mut board, &["e4", "e5", "Qh5", "Nc6"]);
    let mut annotated = board.scan_move("Qxf7").expect("Qxf7");

    // First make computes the check bit.
    let unmove = board.make_move(&mut annotated, true, true);
    let flags_full = board.flags;
    board.unmake_move(annotated, &unmove);

    // Re-make trusting the bit, as the search replay paths do.
    let unmove = board.make_move(&mut annotated, false, false);
    assert_eq!(board.flags, flags_full);
    board.unmake_move(annotated, &unmove);
}
