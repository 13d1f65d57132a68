//! Criterion benchmarks: raw move generation throughput (perft), the
//! make/unmake cycle and a fixed-depth search.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use caissa::board::{Board, MoveList};
use caissa::search::ComputerPlayer;

fn bench_perft(c: &mut Criterion) {
    c.bench_function("perft_3_startpos", |b| {
        let mut board = Board::new();
        b.iter(|| black_box(board.perft(3)));
    });

    c.bench_function("perft_2_kiwipete", |b| {
        let mut board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("FEN");
        b.iter(|| black_box(board.perft(2)));
    });
}

fn bench_make_unmake(c: &mut Criterion) {
    c.bench_function("make_unmake_20_moves", |b| {
        let mut board = Board::new();
        let mut ml = MoveList::new();
        board.generate_moves(&mut ml);
        b.iter(|| {
            for i in 0..ml.len() {
                let mut mv = ml.as_slice()[i];
                let unmove = board.make_move(&mut mv, true, true);
                board.unmake_move(mv, &unmove);
            }
            black_box(board.hash())
        });
    });
}

fn bench_search(c: &mut Criterion) {
    c.bench_function("search_depth_3_startpos", |b| {
        let mut player = ComputerPlayer::detached(8);
        player.set_search_depth(3);
        player.set_opening_book_enabled(false);
        player.set_training_enabled(false);
        player.set_search_bias(false);
        b.iter(|| {
            let mut board = Board::new();
            black_box(player.find_move(&mut board))
        });
    });
}

criterion_group!(benches, bench_perft, bench_make_unmake, bench_search);
criterion_main!(benches);
