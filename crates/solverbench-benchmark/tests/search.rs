//! End-to-end search, ranking and timing over scripted solvers.

use std::fs;

use solverbench_benchmark::{
    rank_results, BestResultTracker, CsvExporter, MarkdownReport, SearchSession, TimingCollector,
    TrialFailure,
};
use solverbench_config::ExperimentConfig;
use solverbench_core::{Configuration, ProblemInstance, ResultStore};
use solverbench_test::{ScriptedInvoker, TableBuilder};

const CONFIG: &str = include_str!("../../../configs/tsp.toml");

fn instances() -> Vec<ProblemInstance> {
    ["berlin52", "eil51", "eil76", "kroA100", "st70"]
        .iter()
        .map(|name| ProblemInstance::from_path(format!("tsp_maps/{}.tsp", name)).unwrap())
        .collect()
}

#[test]
fn test_search_over_sample_config() {
    let config = ExperimentConfig::from_toml_str(CONFIG).unwrap();
    config.validate().unwrap();

    let invoker = ScriptedInvoker::target("-pop", 3.0).failing(
        "annealing",
        TrialFailure::Process {
            code: Some(1),
            detail: "segfault".to_string(),
        },
    );
    let session = SearchSession::from_config(invoker, &config);
    let outcome = session.run(&instances());

    // genetic: 20, annealing: 20, aco: 40 per instance.
    assert_eq!(outcome.trials.len(), 5 * 80);
    assert_eq!(outcome.failed_trials(), 5 * 20);
    assert_eq!(outcome.seed, 42);
    assert!(outcome.skipped.is_empty());

    // Annealing never scored, so it is absent everywhere.
    assert_eq!(outcome.table.len(), 10);
    assert!(outcome.table.get("eil51", "annealing").is_none());

    // Each best is the minimum over the pair's trials.
    for (instance, solver, best) in outcome.table.iter() {
        let mut tracker = BestResultTracker::new();
        for trial in outcome
            .trials
            .iter()
            .filter(|t| t.instance == instance && t.solver == solver)
        {
            tracker.observe(&trial.configuration, trial.score());
        }
        assert_eq!(tracker.finish().as_ref(), Some(best));
    }

    // Elite count never exceeds a tenth of the population drawn with it.
    for trial in outcome.trials.iter().filter(|t| t.solver == "genetic") {
        let pop = trial.configuration.get("-pop").unwrap().as_f64();
        let elite = trial.configuration.get("-elite").unwrap().as_f64();
        assert!(elite >= 2.0 && elite <= (pop / 10.0).floor());
    }
}

#[test]
fn test_session_calls_invoker_in_trial_order() {
    let config = ExperimentConfig::from_yaml_str(include_str!("../../../configs/tsp-grid.yaml"))
        .unwrap()
        .with_random_seed(5);
    let invoker = ScriptedInvoker::constant(100.0);
    let session = SearchSession::from_config(invoker, &config).with_parallel(false);

    let instances = &instances()[..1];
    let outcome = session.run(instances);

    // First-wins: every configuration ties, so the first grid point is kept.
    let best = outcome.table.get("berlin52", "genetic").unwrap();
    assert_eq!(
        best.configuration,
        Configuration::new()
            .with("-pop", 100)
            .with("-mut", 0.01)
            .with("-elite", 5)
    );
    assert_eq!(outcome.trials.len(), 8 + 4 + 8);
}

#[test]
fn test_search_persist_rank_and_report() {
    let config = ExperimentConfig::from_toml_str(CONFIG).unwrap();
    let session = SearchSession::from_config(ScriptedInvoker::target("-pop", 3.0), &config)
        .with_parallel(true);
    let outcome = session.run(&instances());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("best_hyperparameters.json");
    ResultStore::save(&outcome.table, &path).unwrap();
    let reloaded = ResultStore::load(&path).unwrap();
    assert_eq!(reloaded, outcome.table);

    let result = rank_results(&reloaded, &config.ranking).unwrap();
    assert_eq!(result.solver_count, 3);
    assert_eq!(result.instance_count, 5);
    let rank_sum: f64 = result.mean_ranks.values().sum();
    assert!((rank_sum - 6.0).abs() < 1e-9);

    let csv = CsvExporter::trials(&outcome.trials);
    assert_eq!(csv.lines().count(), outcome.trials.len() + 1);
    let csv_path = dir.path().join("trials.csv");
    CsvExporter::trials_to_file(&outcome.trials, &csv_path).unwrap();
    assert_eq!(fs::read_to_string(&csv_path).unwrap(), csv);

    let md = MarkdownReport::ranking(&result);
    assert!(md.contains("## Verdicts"));
}

#[test]
fn test_timing_replays_stored_configurations() {
    let table = TableBuilder::new(["aco", "genetic"])
        .row("berlin52", [7600.0, 7700.0])
        .row("eil51", [430.0, 441.0])
        .build();
    let config = ExperimentConfig::from_toml_str(CONFIG).unwrap();
    let solvers: Vec<_> = config.solvers.iter().map(|s| s.spec()).collect();

    let collector = TimingCollector::new(ScriptedInvoker::constant(1.0)).with_repetitions(2);
    let report = collector.collect(&table, &solvers, &instances());
    let invoker = collector.invoker();

    assert_eq!(invoker.calls_for("aco").len(), 4);
    assert_eq!(invoker.calls_for("genetic").len(), 4);
    assert!(invoker.calls_for("annealing").is_empty());
    assert_eq!(report.solver("annealing").unwrap().mean(), None);
    assert!(report.comparison.is_some());
}
