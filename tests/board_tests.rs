//! Board-level scenario tests: en passant recognition, castling
//! legality, FEN handling.

use caissa::board::{Board, Color, MoveList, Piece, Square};

fn legal_moves(board: &mut Board) -> MoveList {
    let mut ml = MoveList::new();
    board.generate_moves(&mut ml);
    ml
}

fn has_move(board: &mut Board, text: &str) -> bool {
    board.scan_move(text).is_ok()
}

#[test]
fn en_passant_is_recognized_from_fen() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
            .expect("FEN");

    let ml = legal_moves(&mut board);
    let ep = board.scan_move("e5f6").expect("e5xf6 en passant");
    assert!(ep.is_en_passant());
    assert!(ml.contains(ep));

    let mut mv = ep;
    board.make_move(&mut mv, true, true);
    assert!(board.square(5, 4).is_empty(), "the f5 pawn must be gone");
    assert!(board.square(5, 5).is(Color::White, Piece::Pawn));
}

#[test]
fn all_four_castles_from_the_bare_rook_position() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN");
    assert!(has_move(&mut board, "O-O"));
    assert!(has_move(&mut board, "O-O-O"));

    let mut mv = board.scan_move("a1a2").expect("tempo move");
    board.make_move(&mut mv, true, true);
    assert!(has_move(&mut board, "O-O"));
    assert!(has_move(&mut board, "O-O-O"));
}

#[test]
fn castling_field_restricts_both_sides() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kk - 0 1").expect("FEN");
    assert!(has_move(&mut board, "O-O"));
    assert!(!has_move(&mut board, "O-O-O"));

    let mut mv = board.scan_move("Kf1").expect("waiting move");
    board.make_move(&mut mv, true, true);
    assert!(has_move(&mut board, "O-O"));
    assert!(!has_move(&mut board, "O-O-O"));
}

#[test]
fn attacked_transit_square_blocks_the_adjacent_castle() {
    // Black rook on f2 attacks f1, the kingside transit square.
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1").expect("FEN");
    assert!(!has_move(&mut board, "O-O"));
    assert!(has_move(&mut board, "O-O-O"));

    // Rook on d2 attacks d1, the queenside transit square.
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/3r4/R3K2R w KQkq - 0 1").expect("FEN");
    assert!(has_move(&mut board, "O-O"));
    assert!(!has_move(&mut board, "O-O-O"));
}

#[test]
fn check_blocks_both_castles() {
    // Black rook on e2 gives check; no castling while in check.
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1").expect("FEN");
    assert!(board.in_check(Color::White));
    assert!(!has_move(&mut board, "O-O"));
    assert!(!has_move(&mut board, "O-O-O"));
}

#[test]
fn fen_round_trips_through_a_tactical_sequence() {
    let mut board = Board::new();
    for text in ["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3", "a6"] {
        let mut mv = board.scan_move(text).expect(text);
        board.make_move(&mut mv, true, true);
    }
    let fen = board.get_fen();
    let reparsed = Board::from_fen(&fen).expect("own FEN");
    assert_eq!(reparsed, board);
    assert_eq!(reparsed.get_fen(), fen);
    assert_eq!(reparsed.hash(), board.hash());
}

#[test]
fn board_edits_reset_history_and_census() {
    let mut board = Board::new();
    board.edit_square(4, 4, Square::piece(Color::White, Piece::Queen));
    assert!(board.has_been_edited());
    assert_eq!(board.inventory(Color::White, Piece::Queen), 2);
    assert!(board.history().is_empty());
    board.validate_full().expect("census after edit");
}
