//! `solverbench` command-line driver.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use solverbench_benchmark::{
    rank_results, run_search, run_timing, BenchError, CsvExporter, MarkdownReport,
};
use solverbench_config::{ExperimentConfig, ExperimentConfigOverride, RankingConfig};
use solverbench_core::ResultStore;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "solverbench")]
#[command(about = "Tune, rank and time black-box solvers over a benchmark suite")]
#[command(version)]
struct Cli {
    /// Suppress console progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search hyperparameters for every solver on every instance
    Search {
        /// Experiment configuration (TOML or YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Where to write the best results (overrides the configuration)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Export every trial as CSV
        #[arg(long)]
        trials_csv: Option<PathBuf>,
    },

    /// Rank solvers with the Friedman/Nemenyi critical difference test
    Rank {
        /// Best-results JSON document
        #[arg(short, long)]
        results: PathBuf,

        /// Significance level (0.05 or 0.10)
        #[arg(long, default_value_t = 0.05)]
        alpha: f64,

        /// Solvers to compare; all solvers in the results when omitted
        #[arg(long, value_delimiter = ',')]
        solvers: Option<Vec<String>>,

        /// Absolute score distance under which two scores tie
        #[arg(long, default_value_t = 0.0)]
        tie_tolerance: f64,

        /// Also write the report as Markdown
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// Time each solver at its best configuration
    Timing {
        /// Experiment configuration (TOML or YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Best-results JSON document
        #[arg(short, long)]
        results: PathBuf,

        /// Also write the report as Markdown
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if !cli.quiet {
        solverbench_console::init();
    }

    let result = match cli.command {
        Commands::Search {
            config,
            out,
            trials_csv,
        } => cmd_search(&config, out, trials_csv.as_deref()),
        Commands::Rank {
            results,
            alpha,
            solvers,
            tie_tolerance,
            markdown,
        } => {
            let ranking = RankingConfig {
                alpha,
                tie_tolerance,
                solvers,
            };
            cmd_rank(&results, &ranking, markdown.as_deref())
        }
        Commands::Timing {
            config,
            results,
            markdown,
        } => cmd_timing(&config, &results, markdown.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_search(
    config_path: &Path,
    out: Option<PathBuf>,
    trials_csv: Option<&Path>,
) -> Result<(), BenchError> {
    let mut config = ExperimentConfig::load(config_path)?;
    ExperimentConfigOverride {
        results_path: out,
        ..ExperimentConfigOverride::default()
    }
    .apply(&mut config);

    let outcome = run_search(&config)?;
    if let Some(path) = trials_csv {
        CsvExporter::trials_to_file(&outcome.trials, path)?;
        info!(event = "trials_exported", path = %path.display(), trials = outcome.trials.len());
    }

    print!("{}", MarkdownReport::results(&outcome.table));
    Ok(())
}

fn cmd_rank(
    results: &Path,
    ranking: &RankingConfig,
    markdown: Option<&Path>,
) -> Result<(), BenchError> {
    let table = ResultStore::load(results)?;
    let result = rank_results(&table, ranking)?;

    let report = MarkdownReport::ranking(&result);
    print!("{}", report);
    if let Some(path) = markdown {
        MarkdownReport::to_file(&report, path)?;
    }
    Ok(())
}

fn cmd_timing(
    config_path: &Path,
    results: &Path,
    markdown: Option<&Path>,
) -> Result<(), BenchError> {
    let config = ExperimentConfig::load(config_path)?;
    let table = ResultStore::load(results)?;
    let report = run_timing(&config, &table)?;

    let rendered = MarkdownReport::timing(&report);
    print!("{}", rendered);
    if let Some(path) = markdown {
        MarkdownReport::to_file(&rendered, path)?;
    }
    Ok(())
}
