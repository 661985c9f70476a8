use criterion::{criterion_group, criterion_main, Criterion};
use voice_chess::board::Board;
use voice_chess::move_generator::perft;
use voice_chess::notation::{parse, to_notation};

fn perft_bench(c: &mut Criterion) {
    // The positions are taken from the chess programming wiki
    // https://www.chessprogramming.org/Perft_Results
    for (name, fen) in [
        ("initial", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("kiwipete", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"),
        ("alternative", "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10"),
    ] {
        let mut board = match Board::new(fen) {
            Ok(b) => b,
            Err(e) => panic!("{}: {}", fen, e),
        };
        c.bench_function(&format!("perft {} 3", name), |b| b.iter(|| perft(&mut board, 3)));
    }
}

// Every turn renders and parses notation, on top of move generation
fn notation_bench(c: &mut Criterion) {
    let board = Board::new("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
        .unwrap_or_default();
    c.bench_function("kiwipete notation round trip", |b| {
        b.iter(|| {
            for mv in &board.legal_moves() {
                let san = to_notation(*mv, &board);
                let _ = parse(&san, &board);
            }
        })
    });
}

criterion_group!(benches, perft_bench, notation_bench);
criterion_main!(benches);
