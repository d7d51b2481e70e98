//! Tests for the ranking engine.

use super::*;
use solverbench_core::{BestResult, Configuration};

fn table_from(rows: &[(&str, &[(&str, f64)])]) -> ResultTable {
    let mut table = ResultTable::new();
    for (instance, scores) in rows {
        for (solver, score) in scores.iter() {
            table.record(*instance, *solver, BestResult::new(*score, Configuration::new()));
        }
    }
    table
}

fn strictly_ordered_suite(instances: usize) -> ResultTable {
    let mut table = ResultTable::new();
    for i in 0..instances {
        let base = 100.0 * (i + 1) as f64;
        let name = format!("inst{:02}", i);
        table.record(&name, "aco", BestResult::new(base, Configuration::new()));
        table.record(&name, "genetic", BestResult::new(base + 5.0, Configuration::new()));
        table.record(&name, "annealing", BestResult::new(base + 9.0, Configuration::new()));
    }
    table
}

#[test]
fn test_tied_instance_ranks() {
    let table = table_from(&[("p", &[("A", 10.0), ("B", 10.0), ("C", 20.0)])]);
    let result = RankingEngine::default().compare(&table).unwrap();

    let ranks = &result.rank_assignments["p"];
    assert_eq!(ranks.rank("A"), Some(1.5));
    assert_eq!(ranks.rank("B"), Some(1.5));
    assert_eq!(ranks.rank("C"), Some(3.0));
    assert_eq!(ranks.rank_sum(), 6.0);
}

#[test]
fn test_critical_difference_value() {
    let cd = critical_difference(2.343, 3, 10);
    assert!((cd - 2.343 * (12.0f64 / 60.0).sqrt()).abs() < 1e-12);
    assert!((cd - 1.048).abs() < 1e-3);
}

#[test]
fn test_judge_against_critical_difference() {
    let cd = critical_difference(2.343, 3, 10);
    let mean_ranks: BTreeMap<String, f64> = [("A", 1.0), ("B", 1.5), ("C", 2.5)]
        .into_iter()
        .map(|(s, r)| (s.to_string(), r))
        .collect();

    let (reference, verdicts) = judge(&mean_ranks, cd);
    assert_eq!(reference, "A");
    assert_eq!(verdicts.len(), 2);
    assert_eq!(verdicts[0].solver, "B");
    assert!(!verdicts[0].significant);
    assert_eq!(verdicts[1].solver, "C");
    assert!(verdicts[1].significant);
    assert!((verdicts[1].difference - 1.5).abs() < 1e-12);
}

#[test]
fn test_reference_tie_breaks_by_name() {
    let mean_ranks: BTreeMap<String, f64> = [("zeta", 1.5), ("alpha", 1.5)]
        .into_iter()
        .map(|(s, r)| (s.to_string(), r))
        .collect();
    let (reference, verdicts) = judge(&mean_ranks, 1.0);
    assert_eq!(reference, "alpha");
    assert_eq!(verdicts[0].difference, 0.0);
    assert!(!verdicts[0].significant);
}

#[test]
fn test_full_comparison() {
    let table = strictly_ordered_suite(10);
    let result = RankingEngine::new(Significance::Alpha05)
        .compare(&table)
        .unwrap();

    assert_eq!(result.solver_count, 3);
    assert_eq!(result.instance_count, 10);
    assert_eq!(result.q_alpha, 2.343);
    assert_eq!(result.reference, "aco");
    assert_eq!(result.mean_rank("aco"), Some(1.0));
    assert_eq!(result.mean_rank("genetic"), Some(2.0));
    assert_eq!(result.mean_rank("annealing"), Some(3.0));
    assert_eq!(result.ordering(), vec!["aco", "genetic", "annealing"]);

    assert!(!result.verdict("genetic").unwrap().significant);
    assert!(result.verdict("annealing").unwrap().significant);
    assert_eq!(result.is_significant("genetic", "annealing"), Some(false));
    assert_eq!(result.is_significant("annealing", "aco"), Some(true));

    assert!((result.friedman.chi_square - 20.0).abs() < 1e-9);
    assert_eq!(result.friedman.iman_davenport, None);
}

#[test]
fn test_incomplete_instances_are_excluded() {
    let mut table = strictly_ordered_suite(4);
    // Only two solvers on this one; it must not contribute ranks.
    table.record("partial", "annealing", BestResult::new(1.0, Configuration::new()));
    table.record("partial", "genetic", BestResult::new(2.0, Configuration::new()));

    let result = RankingEngine::default().compare(&table).unwrap();
    assert_eq!(result.instance_count, 4);
    assert!(!result.instances.contains(&"partial".to_string()));
    assert_eq!(result.mean_rank("annealing"), Some(3.0));
}

#[test]
fn test_no_common_instances() {
    let table = table_from(&[
        ("p", &[("A", 1.0)]),
        ("q", &[("A", 2.0)]),
        ("r", &[("B", 3.0)]),
    ]);

    let err = RankingEngine::default().compare(&table).unwrap_err();
    assert_eq!(
        err,
        RankingError::NoCommonInstances {
            solvers: vec!["A".to_string(), "B".to_string()],
        }
    );
    assert!(err.to_string().contains("no comparison possible"));
}

#[test]
fn test_unknown_solver_has_no_common_instances() {
    let table = strictly_ordered_suite(3);
    let err = RankingEngine::default()
        .compare_solvers(&table, &["aco", "tabu"])
        .unwrap_err();
    assert!(matches!(err, RankingError::NoCommonInstances { .. }));
}

#[test]
fn test_too_few_solvers() {
    let table = strictly_ordered_suite(3);
    let err = RankingEngine::default()
        .compare_solvers(&table, &["aco", "aco"])
        .unwrap_err();
    assert_eq!(err, RankingError::TooFewSolvers(1));
}

#[test]
fn test_subset_comparison_uses_k_of_subset() {
    let table = strictly_ordered_suite(6);
    let result = RankingEngine::new(Significance::Alpha10)
        .compare_solvers(&table, &["genetic", "annealing"])
        .unwrap();

    assert_eq!(result.solver_count, 2);
    assert_eq!(result.q_alpha, 1.645);
    assert_eq!(result.reference, "genetic");
    assert_eq!(result.mean_rank("genetic"), Some(1.0));
    assert!(result.mean_rank("aco").is_none());
}

#[test]
fn test_tie_tolerance_changes_ranks() {
    let table = table_from(&[("p", &[("A", 100.0), ("B", 100.001), ("C", 120.0)])]);

    let exact = RankingEngine::default().compare(&table).unwrap();
    assert_eq!(exact.rank_assignments["p"].rank("B"), Some(2.0));

    let tolerant = RankingEngine::default()
        .with_tie_tolerance(0.01)
        .compare(&table)
        .unwrap();
    assert_eq!(tolerant.rank_assignments["p"].rank("A"), Some(1.5));
    assert_eq!(tolerant.rank_assignments["p"].rank("B"), Some(1.5));
}

#[test]
fn test_identical_tables_rank_identically() {
    let a = strictly_ordered_suite(7);
    let b = strictly_ordered_suite(7);
    let engine = RankingEngine::default();
    assert_eq!(engine.compare(&a).unwrap(), engine.compare(&b).unwrap());
}

#[test]
fn test_verdict_display() {
    let verdict = Verdict {
        reference: "aco".to_string(),
        solver: "annealing".to_string(),
        difference: 2.0,
        significant: true,
    };
    assert_eq!(
        verdict.to_string(),
        "aco is significantly better than annealing (difference 2.000)"
    );
}
