use criterion::{criterion_group, criterion_main, Criterion};
use forge_core::{constants::GENESIS_PROOF, CancelToken, ProofOfWork, SearchStrategy};

fn bench_pow(c: &mut Criterion) {
    let cancel = CancelToken::new();

    c.bench_function("solve_difficulty_4_sequential", |b| {
        let pow = ProofOfWork::new(4);
        b.iter(|| pow.solve(GENESIS_PROOF, &cancel));
    });

    c.bench_function("solve_difficulty_4_parallel", |b| {
        let pow = ProofOfWork::new(4).with_strategy(SearchStrategy::Parallel);
        b.iter(|| pow.solve(GENESIS_PROOF, &cancel));
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
