use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use spell_chess::game_state::chess_types::{squares_in, Color};
use spell_chess::game_state::game_state::GameState;
use spell_chess::move_generation::legal_moves::legal_destinations;
use spell_chess::move_generation::perft::perft;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
    expected_nodes: &'static [u64],
}

const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "position_1",
        fen: STARTPOS_FEN,
        expected_nodes: &[20, 400, 8902],
    },
    BenchCase {
        name: "position_2",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        expected_nodes: &[48, 2039],
    },
    BenchCase {
        name: "position_3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        expected_nodes: &[14, 191, 2812],
    },
];

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("benchmark FEN should parse");

        for (depth_idx, expected_nodes) in case.expected_nodes.iter().enumerate() {
            let depth = (depth_idx + 1) as u8;

            // Correctness guard before benchmarking.
            assert_eq!(
                perft(&game, depth),
                *expected_nodes,
                "node mismatch in warmup for {} depth {}",
                case.name,
                depth
            );

            group.throughput(Throughput::Elements(*expected_nodes));
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{}_d{}", case.name, depth)),
                expected_nodes,
                |b, expected| {
                    b.iter(|| {
                        let nodes = perft(black_box(&game), black_box(depth));
                        assert_eq!(nodes, *expected);
                        nodes
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_legal_destinations(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_destinations");
    group.sample_size(50);

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("benchmark FEN should parse");
        let side: Color = game.side_to_move;
        group.bench_function(case.name, |b| {
            b.iter(|| {
                squares_in(game.pieces_of(side))
                    .map(|from| legal_destinations(black_box(&game), from, side).count_ones())
                    .sum::<u32>()
            });
        });
    }

    group.finish();
}

criterion_group!(legal_moves_benches, bench_perft, bench_legal_destinations);
criterion_main!(legal_moves_benches);
