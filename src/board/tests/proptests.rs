//! Property-based tests over random legal move sequences.

use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

use crate::board::moves::MoveList;
use crate::board::{Board, Move, UnmoveInfo};

fn random_walk(board: &mut Board, rng: &mut StdRng, plies: usize) -> Vec<(Move, UnmoveInfo)> {
    let mut trail = Vec::new();
    for _ in 0..plies {
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        if ml.is_empty() {
            break;
        }
        let idx = rng.gen_range(0..ml.len());
        let mut mv = ml.as_slice()[idx];
        let unmove = board.make_move(&mut mv, true, true);
        trail.push((mv, unmove));
    }
    trail
}

proptest! {
    /// make followed by unmake restores the board bit-exactly, cached
    /// hash and repetition counters included.
    #[test]
    fn prop_make_unmake_is_identity(seed in any::<u64>(), plies in 1..24usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);

        let initial_fen = board.get_fen();
        let initial_hash = board.hash();
        let initial_reps = board.number_of_repetitions();

        let mut trail = random_walk(&mut board, &mut rng, plies);
        while let Some((mv, unmove)) = trail.pop() {
            board.unmake_move(mv, &unmove);
        }

        prop_assert_eq!(board.get_fen(), initial_fen);
        prop_assert_eq!(board.hash(), initial_hash);
        prop_assert_eq!(board.number_of_repetitions(), initial_reps);
    }

    /// The cached hash always equals a from-scratch recomputation.
    #[test]
    fn prop_cached_hash_matches_recompute(seed in any::<u64>(), plies in 1..24usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..plies {
            let mut ml = MoveList::new();
            board.generate_moves(&mut ml);
            if ml.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..ml.len());
            let mut mv = ml.as_slice()[idx];
            board.make_move(&mut mv, true, true);
            prop_assert_eq!(board.hash(), board.calc_hash());
        }
    }

    /// Census invariants hold along any line of play.
    #[test]
    fn prop_census_invariants(seed in any::<u64>(), plies in 1..30usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        random_walk(&mut board, &mut rng, plies);
        prop_assert!(board.validate_full().is_ok(), "{:?}", board.validate_full());
    }

    /// The generator is a pure filter: no generated move leaves the
    /// mover's own king in check.
    #[test]
    fn prop_generated_moves_are_legal(seed in any::<u64>(), plies in 0..20usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        random_walk(&mut board, &mut rng, plies);

        let mover = board.to_move();
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        for i in 0..ml.len() {
            let mut mv = ml.as_slice()[i];
            let unmove = board.make_move(&mut mv, true, true);
            let in_check = board.in_check(mover);
            board.unmake_move(mv, &unmove);
            prop_assert!(!in_check, "{:?} leaves own king in check", mv);
        }
    }

    /// FEN round-trip: parsing the printed position reproduces it.
    #[test]
    fn prop_fen_round_trip(seed in any::<u64>(), plies in 0..30usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        random_walk(&mut board, &mut rng, plies);

        let fen = board.get_fen();
        let restored = Board::from_fen(&fen).expect("own FEN must parse");
        prop_assert_eq!(&restored, &board);
        prop_assert_eq!(restored.hash(), board.hash());
        prop_assert_eq!(restored.get_fen(), fen);
    }

    /// SAN formatting of any legal move parses back to the same move.
    #[test]
    fn prop_san_round_trip(seed in any::<u64>(), plies in 0..16usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        random_walk(&mut board, &mut rng, plies);

        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        for i in 0..ml.len() {
            let mv = ml.as_slice()[i];
            let san = board.format_san(mv);
            let parsed = board.scan_move(&san);
            prop_assert_eq!(parsed.ok(), Some(mv), "SAN '{}' did not round trip", san);
        }
    }
}
