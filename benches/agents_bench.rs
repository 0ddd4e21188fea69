//! Benchmarks for the search engines and the evaluation cache.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_game_agents::games::connect4::Connect4;
use rust_game_agents::policy::cache::{CacheKey, EvaluationCache};
use rust_game_agents::policy::cards::Card;
use rust_game_agents::policy::{
    CacheConfig, EvictionPolicy, MctsConfig, MctsSearch, MinimaxConfig, MinimaxSearch,
    TranspositionMode,
};

fn minimax_depth4_benchmark(c: &mut Criterion) {
    let game = Connect4::new();
    let state = game.from_moves(&[3, 3, 2, 4]).unwrap();

    for (label, mode) in [
        ("connect4_minimax_d4_bounded", TranspositionMode::Bounded),
        ("connect4_minimax_d4_no_tt", TranspositionMode::Disabled),
    ] {
        let config = MinimaxConfig::default().with_depth(4).with_transposition(mode);
        let mut engine = MinimaxSearch::new(config).unwrap();
        c.bench_function(label, |b| {
            b.iter(|| black_box(engine.search(&game, black_box(&state)).unwrap().score))
        });
    }
}

fn mcts_200_iterations_benchmark(c: &mut Criterion) {
    let game = Connect4::new();
    let state = game.initial_state();
    let config = MctsConfig::default().with_iterations(200).with_seed(42);
    let mut engine = MctsSearch::new(config).unwrap();

    c.bench_function("connect4_mcts_200", |b| {
        b.iter(|| black_box(engine.search(&game, black_box(&state)).unwrap()))
    });
}

fn cache_churn_benchmark(c: &mut Criterion) {
    let deck = Card::deck();
    let keys: Vec<CacheKey> = deck
        .windows(2)
        .flat_map(|pair| {
            deck.iter()
                .filter(move |card| !pair.contains(*card))
                .take(5)
                .map(move |board| CacheKey::from_cards(pair, &[*board]))
        })
        .collect::<Result<_, _>>()
        .unwrap();

    for (label, eviction) in [
        ("cache_churn_lfu", EvictionPolicy::LeastFrequentlyUsed),
        ("cache_churn_smallest", EvictionPolicy::SmallestValue),
    ] {
        c.bench_function(label, |b| {
            b.iter(|| {
                let config = CacheConfig::default().with_capacity(64).with_eviction(eviction);
                let mut cache = EvaluationCache::new(config).unwrap();
                for (i, key) in keys.iter().enumerate() {
                    if cache.get(key).is_none() {
                        cache.insert(*key, i as f64);
                    }
                }
                black_box(cache.len())
            })
        });
    }
}

criterion_group!(
    benches,
    minimax_depth4_benchmark,
    mcts_200_iterations_benchmark,
    cache_churn_benchmark
);
criterion_main!(benches);
