//! Tick throughput benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use kingdoms_core::config::GameConfig;
use kingdoms_core::game::Game;

fn populated_game(players: usize) -> Game {
    let mut game = Game::new(GameConfig::small().with_seed(42));
    for i in 0..players {
        game.add_player(Uuid::new_v4(), format!("player-{i}"), Some("bench"));
    }
    game
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for players in [1, 8, 32] {
        group.bench_function(format!("{players}_players"), |b| {
            let mut game = populated_game(players);
            b.iter(|| game.update(0.05));
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut game = populated_game(8);
    game.update(0.05);

    c.bench_function("state_snapshot", |b| {
        b.iter(|| game.state());
    });
}

criterion_group!(benches, bench_tick, bench_snapshot);
criterion_main!(benches);
