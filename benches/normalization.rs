//! Benchmarks for argument-list normalization.
//!
//! These benchmarks measure sequence canonicalization under associative
//! properties and the full operator-application path (flattening, identity
//! removal, parameter padding and binding).

use acterm::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn plus() -> Atom {
    let props = AlgProp::builder()
        .associative(true)
        .commutative(true)
        .identity(0)
        .build()
        .unwrap();
    Atom::operator(
        Operator::builder("+")
            .props(props)
            .params([Atom::var("x"), Atom::var("y")])
            .build()
            .unwrap(),
    )
}

/// Benchmarks canonicalization of a 1k-element list with interleaved
/// identities and nested sequences.
fn bench_seq_normalization_1k(c: &mut Criterion) {
    let props = AlgProp::builder()
        .associative(true)
        .identity(0)
        .build()
        .unwrap();
    let atoms: Vec<Atom> = (0..1000)
        .map(|i| match i % 10 {
            0 => Atom::integer(0),
            5 => Atom::seq(AtomSeq::new(
                props.clone(),
                vec![Atom::integer(i), Atom::integer(i + 1)],
            )),
            _ => Atom::integer(i),
        })
        .collect();

    c.bench_function("seq_normalization_1k", |b| {
        b.iter(|| AtomSeq::new(props.clone(), black_box(atoms.clone())));
    });
}

/// Benchmarks idempotent deduplication of a 1k-element list with many repeats.
fn bench_idempotent_dedup_1k(c: &mut Criterion) {
    let props = AlgProp::builder()
        .associative(true)
        .idempotent(true)
        .build()
        .unwrap();
    let atoms: Vec<Atom> = (0..1000).map(|i| Atom::integer(i % 37)).collect();

    c.bench_function("idempotent_dedup_1k", |b| {
        b.iter(|| AtomSeq::new(props.clone(), black_box(atoms.clone())));
    });
}

/// Benchmarks applying an AC operator to 100 arguments, including a nested
/// application that must be flattened.
fn bench_operator_apply_100(c: &mut Criterion) {
    let op = plus();
    let inner = Atom::apply(
        &op,
        &Atom::seq(AtomSeq::plain((100..110).map(Atom::integer))),
    )
    .unwrap();
    let mut args: Vec<Atom> = (0..100).map(Atom::integer).collect();
    args.push(inner);
    let arg = Atom::seq(AtomSeq::plain(args));

    c.bench_function("operator_apply_100", |b| {
        b.iter(|| Atom::apply(black_box(&op), black_box(&arg)).unwrap());
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_seq_normalization_1k,
              bench_idempotent_dedup_1k,
              bench_operator_apply_100
);
criterion_main!(benches);
