use criterion::{Criterion, criterion_group, criterion_main};
use gauntlet_core::*;
use std::hint::black_box;

fn bench_sequence(c: &mut Criterion) {
    let mut rng = seeded_rng(0x5eed);
    c.bench_function("sequence_generate_14", |b| {
        b.iter(|| Sequence::generate(&mut rng, black_box(SEQUENCE_LEN)))
    });
}

fn bench_arrangement(c: &mut Criterion) {
    let mut rng = seeded_rng(0x5eed);
    let target = Arrangement::ordered(7);
    c.bench_function("arrangement_shuffle_distance_4", |b| {
        b.iter(|| Arrangement::shuffled(&mut rng, black_box(&target), 4))
    });
    c.bench_function("arrangement_shuffle_derangement", |b| {
        b.iter(|| Arrangement::shuffled(&mut rng, black_box(&target), 7))
    });
}

criterion_group!(benches, bench_sequence, bench_arrangement);
criterion_main!(benches);
