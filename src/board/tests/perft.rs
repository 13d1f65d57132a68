//! Perft: the move-generator regression. Node counts at fixed depths are
//! compared against the standard published values.

use crate::board::Board;

struct PerftPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(u32, u64)],
}

const POSITIONS: &[PerftPosition] = &[
    PerftPosition {
        name: "initial",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197_281)],
    },
    PerftPosition {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2039), (3, 97_862)],
    },
    PerftPosition {
        name: "endgame pins",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depths: &[(1, 14), (2, 191), (3, 2812), (4, 43_238)],
    },
    PerftPosition {
        name: "promotion storm",
        fen: "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        depths: &[(1, 24), (2, 496), (3, 9483)],
    },
    PerftPosition {
        name: "en passant",
        fen: "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        depths: &[(1, 31), (2, 707), (3, 21_637)],
    },
    PerftPosition {
        name: "castling",
        fen: "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        depths: &[(1, 26), (2, 568), (3, 13_744)],
    },
];

#[test]
fn perft_known_positions() {
    for position in POSITIONS {
        let mut board = Board::from_fen(position.fen).expect(position.name);
        for &(depth, expected) in position.depths {
            let nodes = board.perft(depth);
            assert_eq!(
                nodes, expected,
                "perft({depth}) mismatch for '{}'",
                position.name
            );
        }
    }
}

/// The deep initial-position counts. Slow; run with `--ignored` when
/// touching the generator or make/unmake.
#[test]
#[ignore]
fn perft_initial_deep() {
    let mut board = Board::new();
    assert_eq!(board.perft(5), 4_865_609);
    assert_eq!(board.perft(6), 119_060_324);
}
