//! Tests for the search session driver.

use super::*;
use crate::sampler::{GridSampler, RandomSampler};
use solverbench_config::{Bound, RandomParam};
use std::sync::atomic::{AtomicUsize, Ordering};

fn instances() -> Vec<ProblemInstance> {
    vec![
        ProblemInstance::new("berlin52", "maps/berlin52.tsp", 52),
        ProblemInstance::new("eil51", "maps/eil51.tsp", 51),
        ProblemInstance::new("st70", "maps/st70.tsp", 70),
    ]
}

/// Distance grows with the distance of -pop from 3 x size.
fn population_solver(
    _: &SolverSpec,
    instance: &ProblemInstance,
    config: &Configuration,
) -> Result<f64, TrialFailure> {
    let pop = config.get("-pop").map_or(0.0, |v| v.as_f64());
    Ok(1000.0 + (pop - 3.0 * instance.size() as f64).abs())
}

fn random_population(trials: usize) -> RandomSampler {
    RandomSampler::new(
        trials,
        vec![
            RandomParam::UniformInt {
                flag: "-pop".to_string(),
                low: Bound::InstanceSize { size: 2.0 },
                high: Bound::InstanceSize { size: 6.0 },
            },
            RandomParam::UniformReal {
                flag: "-mut".to_string(),
                low: Bound::Fixed(0.0),
                high: Bound::Fixed(1.0),
            },
        ],
    )
}

#[test]
fn test_best_per_pair() {
    let session = SearchSession::new(population_solver)
        .with_solver(
            SolverSpec::new("genetic", "./genetic"),
            GridSampler::new(Vec::new()).with_param("-pop", [100, 150, 210]),
        )
        .with_solver(
            SolverSpec::new("aco", "./aco"),
            GridSampler::new(Vec::new()).with_param("-pop", [50, 160]),
        );

    let outcome = session.run(&instances());
    assert_eq!(outcome.table.len(), 6);
    assert_eq!(outcome.trials.len(), 15);
    assert_eq!(outcome.table.score("berlin52", "genetic"), Some(1006.0));
    assert_eq!(outcome.table.score("st70", "aco"), Some(1050.0));
    assert_eq!(
        outcome.table.get("st70", "genetic").unwrap().configuration,
        Configuration::new().with("-pop", 210)
    );
}

#[test]
fn test_trials_are_in_instance_then_solver_order() {
    let session = SearchSession::new(population_solver)
        .with_solver(
            SolverSpec::new("b", "./b"),
            GridSampler::new(Vec::new()).with_param("-pop", [1]),
        )
        .with_solver(
            SolverSpec::new("a", "./a"),
            GridSampler::new(Vec::new()).with_param("-pop", [1]),
        );

    let outcome = session.run(&instances()[..2]);
    let order: Vec<_> = outcome
        .trials
        .iter()
        .map(|t| (t.instance.as_str(), t.solver.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![("berlin52", "b"), ("berlin52", "a"), ("eil51", "b"), ("eil51", "a")]
    );
}

#[test]
fn test_failed_trials_are_skipped() {
    let invoker = |_: &SolverSpec, _: &ProblemInstance, c: &Configuration| {
        match c.get("-pop").map(|v| v.as_f64()) {
            Some(p) if p < 150.0 => Err(TrialFailure::Parse {
                output_tail: String::new(),
            }),
            Some(p) => Ok(p),
            None => Err(TrialFailure::Process {
                code: Some(1),
                detail: "no population".to_string(),
            }),
        }
    };
    let session = SearchSession::new(invoker).with_solver(
        SolverSpec::new("genetic", "./genetic"),
        GridSampler::new(Vec::new()).with_param("-pop", [100, 300, 200]),
    );

    let outcome = session.run(&instances()[..1]);
    assert_eq!(outcome.failed_trials(), 1);
    assert_eq!(outcome.table.score("berlin52", "genetic"), Some(200.0));
    assert_eq!(outcome.trials[0].score(), None);
}

#[test]
fn test_pair_without_scores_is_absent() {
    let invoker = |_: &SolverSpec, _: &ProblemInstance, _: &Configuration| {
        Err::<f64, _>(TrialFailure::Timeout {
            limit: std::time::Duration::from_secs(1),
        })
    };
    let session = SearchSession::new(invoker).with_solver(
        SolverSpec::new("annealing", "./annealing"),
        GridSampler::new(Vec::new()).with_param("-temp", [10000, 50000]),
    );

    let outcome = session.run(&instances());
    assert!(outcome.table.is_empty());
    assert_eq!(outcome.failed_trials(), 6);
}

#[test]
fn test_unsampleable_pair_is_skipped() {
    let calls = AtomicUsize::new(0);
    let invoker = |_: &SolverSpec, _: &ProblemInstance, _: &Configuration| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, TrialFailure>(1.0)
    };
    // Empty range on every instance with fewer than 60 points.
    let sampler = RandomSampler::new(
        2,
        vec![RandomParam::UniformInt {
            flag: "-ants".to_string(),
            low: Bound::Fixed(60.0),
            high: Bound::InstanceSize { size: 1.0 },
        }],
    );
    let session = SearchSession::new(invoker)
        .with_seed(3)
        .with_solver(SolverSpec::new("aco", "./aco"), sampler);

    let outcome = session.run(&instances());
    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.skipped[0].instance, "berlin52");
    assert!(matches!(
        outcome.skipped[0].reason,
        SamplerError::EmptyRange { .. }
    ));
    assert_eq!(outcome.table.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let build = |parallel| {
        SearchSession::new(population_solver)
            .with_seed(42)
            .with_parallel(parallel)
            .with_solver(SolverSpec::new("genetic", "./genetic"), random_population(20))
            .with_solver(SolverSpec::new("aco", "./aco"), random_population(40))
    };

    let first = build(false).run(&instances());
    let second = build(false).run(&instances());
    let parallel = build(true).run(&instances());

    assert_eq!(first.seed, 42);
    assert_eq!(first.table, second.table);
    assert_eq!(first.trials, second.trials);
    assert_eq!(first.table, parallel.table);
    assert_eq!(first.trials, parallel.trials);
}

#[test]
fn test_pairs_draw_from_distinct_streams() {
    let session = SearchSession::new(population_solver)
        .with_seed(9)
        .with_solver(SolverSpec::new("a", "./a"), random_population(5))
        .with_solver(SolverSpec::new("b", "./b"), random_population(5));

    let outcome = session.run(&instances()[..1]);
    let configs = |solver: &str| -> Vec<Configuration> {
        outcome
            .trials
            .iter()
            .filter(|t| t.solver == solver)
            .map(|t| t.configuration.clone())
            .collect()
    };
    assert_ne!(configs("a"), configs("b"));
}

#[test]
fn test_from_config_and_run_search_without_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExperimentConfig {
        instances_dir: dir.path().to_path_buf(),
        ..ExperimentConfig::default()
    };
    let err = run_search(&config).unwrap_err();
    assert!(matches!(err, BenchError::NoInstances { .. }));
}
