//! Ranking pass over a persisted result table.

use solverbench_config::{ConfigError, RankingConfig};
use solverbench_core::ResultTable;
use solverbench_stats::{CriticalDifferenceResult, RankingEngine, Significance};
use tracing::info;

use crate::error::BenchError;

/// Ranks the solvers of `table` as configured.
///
/// Compares `config.solvers` when set, every solver in the table otherwise.
pub fn rank_results(
    table: &ResultTable,
    config: &RankingConfig,
) -> Result<CriticalDifferenceResult, BenchError> {
    let significance = Significance::from_alpha(config.alpha).ok_or_else(|| {
        ConfigError::Invalid(format!("no critical values tabulated for alpha {}", config.alpha))
    })?;
    let engine = RankingEngine::new(significance).with_tie_tolerance(config.tie_tolerance);

    let result = match &config.solvers {
        Some(solvers) => {
            let solvers: Vec<&str> = solvers.iter().map(String::as_str).collect();
            engine.compare_solvers(table, &solvers)?
        }
        None => engine.compare(table)?,
    };

    info!(
        event = "ranking_end",
        solvers = result.solver_count,
        instances = result.instance_count,
        critical_difference = result.critical_difference,
        reference = %result.reference,
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solverbench_core::{BestResult, Configuration};
    use solverbench_stats::RankingError;

    fn table() -> ResultTable {
        let mut table = ResultTable::new();
        for (instance, scores) in [("p", [10.0, 10.0, 20.0]), ("q", [5.0, 6.0, 7.0])] {
            for (solver, score) in ["A", "B", "C"].iter().zip(scores) {
                table.record(instance, *solver, BestResult::new(score, Configuration::new()));
            }
        }
        table
    }

    #[test]
    fn test_rank_all_solvers() {
        let result = rank_results(&table(), &RankingConfig::default()).unwrap();
        assert_eq!(result.reference, "A");
        assert_eq!(result.mean_rank("A"), Some(1.25));
        assert_eq!(result.mean_rank("C"), Some(3.0));
    }

    #[test]
    fn test_rank_subset() {
        let config = RankingConfig {
            solvers: Some(vec!["B".to_string(), "C".to_string()]),
            ..RankingConfig::default()
        };
        let result = rank_results(&table(), &config).unwrap();
        assert_eq!(result.solver_count, 2);
        assert_eq!(result.reference, "B");
    }

    #[test]
    fn test_unsupported_alpha() {
        let config = RankingConfig {
            alpha: 0.01,
            ..RankingConfig::default()
        };
        assert!(matches!(
            rank_results(&table(), &config),
            Err(BenchError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_no_common_instances() {
        let mut table = ResultTable::new();
        table.record("p", "A", BestResult::new(1.0, Configuration::new()));
        table.record("q", "A", BestResult::new(1.0, Configuration::new()));
        table.record("r", "B", BestResult::new(1.0, Configuration::new()));
        assert!(matches!(
            rank_results(&table, &RankingConfig::default()),
            Err(BenchError::Ranking(RankingError::NoCommonInstances { .. }))
        ));
    }
}
