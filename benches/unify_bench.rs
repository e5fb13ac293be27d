#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use microprolog::{Bindings, Term, Unifier};

/// `f(X0, f(X1, ... f(X{n-1}, end)))` with either variables or atoms
fn nested(depth: usize, variables: bool) -> Term {
    (0..depth).rev().fold(Term::atom("end"), |inner, i| {
        let arg = if variables {
            Term::var(format!("X{i}"))
        } else {
            Term::atom(format!("a{i}"))
        };
        Term::compound("f", vec![arg, inner])
    })
}

/// Benchmark for unifying a deep pattern against a ground term
fn bench_unify_deep_terms(c: &mut Criterion) {
    let pattern = nested(50, true);
    let ground = nested(50, false);
    let unifier = Unifier::default();

    c.bench_function("unify_deep_terms", |b| {
        b.iter(|| black_box(unifier.unify(&pattern, &ground, &Bindings::new())));
    });
}

/// Benchmark for the occurs check cost on the same terms
fn bench_unify_without_occurs_check(c: &mut Criterion) {
    let pattern = nested(50, true);
    let ground = nested(50, false);
    let unifier = Unifier::new(false);

    c.bench_function("unify_without_occurs_check", |b| {
        b.iter(|| black_box(unifier.unify(&pattern, &ground, &Bindings::new())));
    });
}

/// Benchmark for dereferencing a long variable chain through substitution
fn bench_substitute_chain(c: &mut Criterion) {
    let bindings: Bindings = (0..200)
        .map(|i| (format!("V{i}"), Term::var(format!("V{}", i + 1))))
        .chain(std::iter::once(("V200".to_string(), Term::atom("done"))))
        .collect();
    let term = Term::compound("g", vec![Term::var("V0"), Term::var("V100")]);

    c.bench_function("substitute_chain", |b| {
        b.iter(|| black_box(term.substitute(&bindings)));
    });
}

criterion_group!(
    benches,
    bench_unify_deep_terms,
    bench_unify_without_occurs_check,
    bench_substitute_chain
);
criterion_main!(benches);
