//! Markdown and CSV reports.

use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::Path;

use solverbench_core::ResultTable;
use solverbench_stats::CriticalDifferenceResult;

use crate::session::TrialRecord;
use crate::timing::TimingReport;

/// CSV exporter for trial logs.
///
/// One row per trial with the columns `instance,solver,trial,score,failure`
/// followed by one column per hyperparameter flag, in first-seen order.
/// Cells of flags a solver does not use are empty.
///
/// # Example
///
/// ```
/// use solverbench_benchmark::{CsvExporter, TrialRecord};
/// use solverbench_core::Configuration;
///
/// let trials = vec![TrialRecord {
///     instance: "eil51".into(),
///     solver: "aco".into(),
///     configuration: Configuration::new().with("-ants", 120),
///     outcome: Ok(431.5),
/// }];
///
/// let csv = CsvExporter::trials(&trials);
/// assert_eq!(csv, "instance,solver,trial,score,failure,-ants\neil51,aco,0,431.5,,120\n");
/// ```
pub struct CsvExporter;

impl CsvExporter {
    /// Exports trials to a CSV string.
    pub fn trials(trials: &[TrialRecord]) -> String {
        let mut output = String::new();
        // Writing to a String cannot fail.
        let _ = write_trials(&mut output, trials);
        output
    }

    /// Exports trials to a CSV file.
    pub fn trials_to_file(trials: &[TrialRecord], path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, Self::trials(trials))
    }
}

fn write_trials(output: &mut String, trials: &[TrialRecord]) -> fmt::Result {
    let mut flags: Vec<&str> = Vec::new();
    for trial in trials {
        for (flag, _) in trial.configuration.iter() {
            if !flags.contains(&flag) {
                flags.push(flag);
            }
        }
    }

    write!(output, "instance,solver,trial,score,failure")?;
    for flag in &flags {
        write!(output, ",{}", csv_field(flag))?;
    }
    writeln!(output)?;

    let mut index = 0;
    for (i, trial) in trials.iter().enumerate() {
        let same_pair = i > 0
            && trials[i - 1].instance == trial.instance
            && trials[i - 1].solver == trial.solver;
        index = if same_pair { index + 1 } else { 0 };

        let (score, failure) = match &trial.outcome {
            Ok(score) => (score.to_string(), String::new()),
            Err(failure) => (String::new(), failure.to_string()),
        };
        write!(
            output,
            "{},{},{},{},{}",
            csv_field(&trial.instance),
            csv_field(&trial.solver),
            index,
            score,
            csv_field(&failure)
        )?;
        for flag in &flags {
            match trial.configuration.get(flag) {
                Some(value) => write!(output, ",{}", value)?,
                None => write!(output, ",")?,
            }
        }
        writeln!(output)?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Markdown report generator.
///
/// # Example
///
/// ```
/// use solverbench_benchmark::MarkdownReport;
/// use solverbench_core::{BestResult, Configuration, ResultTable};
///
/// let mut table = ResultTable::new();
/// table.record("eil51", "aco", BestResult::new(430.25, Configuration::new().with("-ants", 120)));
///
/// let md = MarkdownReport::results(&table);
/// assert!(md.contains("| Instance | aco |"));
/// assert!(md.contains("| eil51 | 430.25 |"));
/// ```
pub struct MarkdownReport;

impl MarkdownReport {
    /// Instance by solver table of best scores, followed by the best
    /// configurations.
    pub fn results(table: &ResultTable) -> String {
        let mut output = String::new();
        let _ = write_results(&mut output, table);
        output
    }

    /// Mean ranks, critical difference and verdicts of a ranking pass.
    pub fn ranking(result: &CriticalDifferenceResult) -> String {
        let mut output = String::new();
        let _ = write_ranking(&mut output, result);
        output
    }

    /// Per-solver mean durations and the fastest/slowest comparison.
    pub fn timing(report: &TimingReport) -> String {
        let mut output = String::new();
        let _ = write_timing(&mut output, report);
        output
    }

    /// Writes a Markdown document to a file.
    pub fn to_file(markdown: &str, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, markdown)
    }
}

fn write_results(output: &mut String, table: &ResultTable) -> fmt::Result {
    writeln!(output, "# Best Results")?;
    writeln!(output)?;

    if table.is_empty() {
        writeln!(output, "*No results recorded.*")?;
        return Ok(());
    }

    let solvers: Vec<&str> = table.solvers().into_iter().collect();
    write!(output, "| Instance |")?;
    for solver in &solvers {
        write!(output, " {} |", solver)?;
    }
    writeln!(output)?;
    write!(output, "|----------|")?;
    for _ in &solvers {
        write!(output, "------|")?;
    }
    writeln!(output)?;

    for instance in table.instances() {
        write!(output, "| {} |", instance)?;
        for solver in &solvers {
            match table.score(instance, solver) {
                Some(score) => write!(output, " {} |", score)?,
                None => write!(output, " N/A |")?,
            }
        }
        writeln!(output)?;
    }
    writeln!(output)?;

    writeln!(output, "## Best Configurations")?;
    writeln!(output)?;
    writeln!(output, "| Instance | Solver | Configuration |")?;
    writeln!(output, "|----------|--------|---------------|")?;
    for (instance, solver, best) in table.iter() {
        writeln!(output, "| {} | {} | `{}` |", instance, solver, best.configuration)?;
    }
    Ok(())
}

fn write_ranking(output: &mut String, result: &CriticalDifferenceResult) -> fmt::Result {
    writeln!(output, "# Solver Ranking")?;
    writeln!(output)?;
    writeln!(output, "- **Solvers (k)**: {}", result.solver_count)?;
    writeln!(output, "- **Common instances (N)**: {}", result.instance_count)?;
    writeln!(output, "- **alpha**: {}", result.alpha)?;
    writeln!(output, "- **q_alpha**: {:.3}", result.q_alpha)?;
    writeln!(output, "- **Critical difference**: {:.4}", result.critical_difference)?;
    writeln!(output, "- **Friedman chi-square**: {:.4}", result.friedman.chi_square)?;
    match result.friedman.iman_davenport {
        Some(f) => writeln!(output, "- **Iman-Davenport F**: {:.4}", f)?,
        None => writeln!(output, "- **Iman-Davenport F**: undefined")?,
    }
    writeln!(output)?;

    writeln!(output, "## Mean Ranks")?;
    writeln!(output)?;
    writeln!(output, "| Solver | Mean Rank |")?;
    writeln!(output, "|--------|-----------|")?;
    for solver in result.ordering() {
        if let Some(rank) = result.mean_rank(solver) {
            writeln!(output, "| {} | {:.3} |", solver, rank)?;
        }
    }
    writeln!(output)?;

    writeln!(output, "## Verdicts")?;
    writeln!(output)?;
    for verdict in &result.verdicts {
        writeln!(output, "- {}", verdict)?;
    }
    Ok(())
}

fn write_timing(output: &mut String, report: &TimingReport) -> fmt::Result {
    writeln!(output, "# Solver Timing")?;
    writeln!(output)?;
    writeln!(output, "| Solver | Mean (s) | Samples | Failures |")?;
    writeln!(output, "|--------|----------|---------|----------|")?;
    for timing in &report.solvers {
        let mean = timing
            .mean()
            .map(|m| format!("{:.3}", m))
            .unwrap_or_else(|| "N/A".to_string());
        writeln!(
            output,
            "| {} | {} | {} | {} |",
            timing.solver,
            mean,
            timing.samples(),
            timing.failures
        )?;
    }
    writeln!(output)?;

    match &report.comparison {
        Some(c) => {
            writeln!(output, "- **Fastest**: {} ({:.3} s)", c.fastest, c.fastest_mean)?;
            writeln!(output, "- **Slowest**: {} ({:.3} s)", c.slowest, c.slowest_mean)?;
            match c.percent_difference {
                Some(p) => writeln!(output, "- **Difference**: {:.2}%", p)?,
                None => writeln!(output, "- **Difference**: undefined")?,
            }
        }
        None => writeln!(output, "*No valid timings.*")?,
    }
    Ok(())
}
