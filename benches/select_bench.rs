//! Criterion benchmarks for the scenario-select decision rules.
//!
//! Uses synthetic initiative sets to measure rule overhead including
//! the per-scenario benchmark solves and the master solve.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scenario_select::milp::BranchBoundSolver;
use scenario_select::rules::{Bayesian, DecisionRule, Initiative, MinimaxRegret, SolveConfig};
use scenario_select::scenario::ScenarioSet;

/// Deterministic synthetic portfolio: costs cycle through 2..=5 and
/// returns spread across the three scenarios so roughly half the set
/// fits the budget.
fn synthetic_initiatives(n: usize) -> Vec<Initiative> {
    (0..n)
        .map(|i| {
            let cost = 2.0 + (i % 4) as f64;
            let base = 3.0 + (i % 7) as f64;
            Initiative::new(format!("init_{i}"), cost, 0.5 + 0.05 * (i % 10) as f64)
                .with_return("best", base * 2.5)
                .with_return("med", base * 1.5)
                .with_return("worst", base * 0.4)
        })
        .collect()
}

fn bench_minimax_regret(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimax_regret");
    group.sample_size(10);

    let scenarios = ScenarioSet::default();
    let solver = BranchBoundSolver::new();
    for &n in &[8, 12, 16] {
        let initiatives = synthetic_initiatives(n);
        let budget = n as f64;
        let config = SolveConfig::default().with_min_confidence(0.5);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &initiatives,
            |b, initiatives| {
                b.iter(|| {
                    let result = MinimaxRegret::new().solve(
                        black_box(initiatives),
                        black_box(budget),
                        &scenarios,
                        &config,
                        &solver,
                    );
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_bayesian(c: &mut Criterion) {
    let mut group = c.benchmark_group("bayesian");
    group.sample_size(10);

    let scenarios = ScenarioSet::default();
    let solver = BranchBoundSolver::new();
    let rule = Bayesian::new([("best", 0.25), ("med", 0.5), ("worst", 0.25)])
        .expect("valid weights");
    for &n in &[8, 12, 16, 20] {
        let initiatives = synthetic_initiatives(n);
        let budget = n as f64;
        let config = SolveConfig::default().with_min_confidence(0.5);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &initiatives,
            |b, initiatives| {
                b.iter(|| {
                    let result = rule.solve(
                        black_box(initiatives),
                        black_box(budget),
                        &scenarios,
                        &config,
                        &solver,
                    );
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_minimax_regret, bench_bayesian);
criterion_main!(benches);
