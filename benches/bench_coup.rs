use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_pcg::Pcg64;

use coup_engine::{Coup, DecisionMaker, RandomDecider, TurnOutcome};

fn complete_game(num_players: u8) {
    let mut rng = Pcg64::seed_from_u64(num_players as u64);

    let participants: Vec<(String, Box<dyn DecisionMaker>)> = (0..num_players)
        .map(|seat| {
            (format!("p{seat}"), Box::new(RandomDecider::new(seat as u64)) as Box<dyn DecisionMaker>)
        })
        .collect();

    let mut game = black_box(Coup::new(participants, &mut rng).unwrap());
    for _ in 0..1000 {
        if let TurnOutcome::GameOver { .. } = game.handle_turn(&mut rng).unwrap() {
            break;
        }
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_game");
    for num_players in 3..=6u8 {
        group.bench_with_input(BenchmarkId::from_parameter(num_players), &num_players, |b, &num_players| {
            b.iter(|| complete_game(num_players))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
