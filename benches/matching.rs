//! Benchmarks for the lazy matchers.
//!
//! Measures the cost of the first match and of exhausting the match stream
//! under commutativity and associativity.

use acterm::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn props(associative: bool, commutative: bool) -> AlgProp {
    AlgProp::builder()
        .associative(associative)
        .commutative(commutative)
        .build()
        .unwrap()
}

/// Benchmarks the first AC match of a two-variable pattern plus a constant
/// against a 12-element subject.
fn bench_ac_first_match(c: &mut Criterion) {
    let ac = props(true, true);
    let pattern = Atom::seq(AtomSeq::new(
        ac.clone(),
        vec![Atom::var("x"), Atom::integer(7), Atom::var("y")],
    ));
    let subject = Atom::seq(AtomSeq::new(ac, (0..12).map(Atom::integer)));

    c.bench_function("ac_first_match_12", |b| {
        b.iter(|| {
            black_box(&pattern)
                .try_match(black_box(&subject), &Bindings::new())
                .into_result()
                .unwrap()
        });
    });
}

/// Benchmarks exhausting all groupings of an arity-3 associative pattern
/// against a 10-element subject (36 groupings).
fn bench_associative_exhaust(c: &mut Criterion) {
    let a = props(true, false);
    let pattern = Atom::seq(AtomSeq::new(
        a.clone(),
        vec![Atom::var("x"), Atom::var("y"), Atom::var("z")],
    ));
    let subject = Atom::seq(AtomSeq::new(a, (0..10).map(Atom::integer)));

    c.bench_function("associative_exhaust_10", |b| {
        b.iter(|| {
            let count = black_box(&pattern)
                .try_match(black_box(&subject), &Bindings::new())
                .into_iter()
                .count();
            assert_eq!(count, 36);
        });
    });
}

/// Benchmarks exhausting a 6-element commutative match (720 permutations).
fn bench_commutative_exhaust(c: &mut Criterion) {
    let comm = props(false, true);
    let pattern = AtomSeq::new(comm.clone(), (0..6).map(|i| Atom::var(format!("v{}", i))));
    let subject = AtomSeq::new(comm, (0..6).map(Atom::integer));

    c.bench_function("commutative_exhaust_6", |b| {
        b.iter(|| {
            let count = CMatcher::try_match(
                black_box(&pattern),
                black_box(&subject),
                &Bindings::new(),
                &MatchContext::default(),
            )
            .into_iter()
            .count();
            assert_eq!(count, 720);
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_ac_first_match,
              bench_associative_exhaust,
              bench_commutative_exhaust
);
criterion_main!(benches);
