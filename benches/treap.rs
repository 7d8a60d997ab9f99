use criterion::{black_box, criterion_group, criterion_main, Criterion};
use persistent_treap::treap::TreapSet;
use rand::{Rng, SeedableRng, XorShiftRng};
use std::collections::BTreeSet;

const SET_SIZE: u32 = 5_000;

fn overlapping_sets() -> (TreapSet<u32>, TreapSet<u32>) {
    let n = (0..2 * SET_SIZE).collect();
    let m = (SET_SIZE..3 * SET_SIZE).collect();
    (n, m)
}

fn bench_treap_insert_version(c: &mut Criterion) {
    let mut rng: XorShiftRng = SeedableRng::from_seed([1, 1, 1, 1]);
    let set: TreapSet<u32> = (0..SET_SIZE).map(|_| rng.next_u32()).collect();

    c.bench_function("bench treap insert into version", move |b| {
        b.iter(|| {
            let mut next = set.clone();
            next.insert(rng.next_u32());
            black_box(next);
        })
    });
}

fn bench_btreeset_insert_copy(c: &mut Criterion) {
    let mut rng: XorShiftRng = SeedableRng::from_seed([1, 1, 1, 1]);
    let set: BTreeSet<u32> = (0..SET_SIZE).map(|_| rng.next_u32()).collect();

    c.bench_function("bench btreeset insert into copy", move |b| {
        b.iter(|| {
            let mut next = set.clone();
            next.insert(rng.next_u32());
            black_box(next);
        })
    });
}

fn bench_treap_union(c: &mut Criterion) {
    let (n, m) = overlapping_sets();
    c.bench_function("bench treap union", move |b| {
        b.iter(|| black_box(n.union(&m)))
    });
}

fn bench_treap_intersection(c: &mut Criterion) {
    let (n, m) = overlapping_sets();
    c.bench_function("bench treap intersection", move |b| {
        b.iter(|| black_box(n.intersection(&m)))
    });
}

fn bench_treap_difference(c: &mut Criterion) {
    let (n, m) = overlapping_sets();
    c.bench_function("bench treap difference", move |b| {
        b.iter(|| black_box(n.difference(&m)))
    });
}

fn bench_btreeset_intersection(c: &mut Criterion) {
    let n: BTreeSet<u32> = (0..2 * SET_SIZE).collect();
    let m: BTreeSet<u32> = (SET_SIZE..3 * SET_SIZE).collect();
    c.bench_function("bench btreeset intersection", move |b| {
        b.iter(|| black_box(n.intersection(&m).cloned().collect::<BTreeSet<u32>>()))
    });
}

criterion_group!(
    benches,
    bench_treap_insert_version,
    bench_btreeset_insert_copy,
    bench_treap_union,
    bench_treap_intersection,
    bench_treap_difference,
    bench_btreeset_intersection,
);
criterion_main!(benches);
