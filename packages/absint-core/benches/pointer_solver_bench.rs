//! Benchmarks the pointer-constraint solver on synthetic Andersen-style
//! constraint sets of increasing size: a chain of address-of/copy/store/load
//! constraints that forces several worklist passes to converge.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use absint_core::features::pointer_analysis::domain::constraint::PointerConstraint;
use absint_core::features::pointer_analysis::infrastructure::solver::PointerSolver;

/// `n` variables, each pointing at the previous one's target
/// (`pN = &locN`, `pN = *p(N-1)`, `*p(N-1) = p(N-2)`, ...), which keeps the
/// worklist busy propagating points-to sets through several indirections.
fn chain_constraints(n: u32) -> Vec<PointerConstraint> {
    let mut constraints = Vec::new();
    for i in 0..n {
        constraints.push(PointerConstraint::address_of(i, i));
        if i > 0 {
            constraints.push(PointerConstraint::copy(i, i - 1));
        }
        if i > 1 {
            constraints.push(PointerConstraint::store(i, i - 1));
            constraints.push(PointerConstraint::load(i - 1, i));
        }
    }
    constraints
}

fn bench_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer_solver_solve");
    for &n in &[16u32, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let constraints = chain_constraints(n);
            b.iter(|| {
                let mut solver = PointerSolver::new();
                solver.solve(black_box(&constraints));
                black_box(solver.into_result())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solver);
criterion_main!(benches);
