//! Colorful console output for benchmark runs.
//!
//! Provides a custom `tracing` layer that formats search, ranking and timing
//! events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (search/pair start and end, ranking, timing)
//! - **WARN**: Failed trials and skipped pairs
//! - **DEBUG**: Individual trial results

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_DIRECTIVE: &str = "solverbench_benchmark=info";

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and sets up tracing with `RUST_LOG` overriding the
/// default `solverbench_benchmark=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(
                DEFAULT_DIRECTIVE
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            )
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ConsoleLayer)
            .try_init();
    });
}

// Returns elapsed time since init.
fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

fn print_banner() {
    let title = format!("SolverBench v{}", VERSION);
    let subtitle = "black-box solver tuning and ranking";

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout);
    let _ = writeln!(stdout, "  {}", title.bright_cyan().bold());
    let _ = writeln!(stdout, "  {}", subtitle.bright_white());
    let _ = writeln!(stdout);
    let _ = stdout.flush();
}

/// A tracing layer that formats benchmark events with colors.
pub struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("solverbench") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    solver: Option<String>,
    instance: Option<String>,
    strategy: Option<String>,
    kind: Option<String>,
    reason: Option<String>,
    reference: Option<String>,
    fastest: Option<String>,
    slowest: Option<String>,
    path: Option<String>,
    configuration: Option<String>,
    solvers: Option<u64>,
    instances: Option<u64>,
    pairs: Option<u64>,
    size: Option<u64>,
    trial: Option<u64>,
    trials: Option<u64>,
    failures: Option<u64>,
    skipped: Option<u64>,
    seed: Option<u64>,
    duration_ms: Option<u64>,
    score: Option<f64>,
    percent: Option<f64>,
    critical_difference: Option<f64>,
    improved: Option<bool>,
    parallel: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.record_str(field, s.trim_matches('"'));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "solvers" => self.solvers = Some(value),
            "instances" => self.instances = Some(value),
            "pairs" => self.pairs = Some(value),
            "size" => self.size = Some(value),
            "trial" => self.trial = Some(value),
            "trials" => self.trials = Some(value),
            "failures" => self.failures = Some(value),
            "skipped" => self.skipped = Some(value),
            "seed" => self.seed = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "score" => self.score = Some(value),
            "percent" => self.percent = Some(value),
            "critical_difference" => self.critical_difference = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "improved" => self.improved = Some(value),
            "parallel" => self.parallel = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let slot = match field.name() {
            "event" => &mut self.event,
            "solver" => &mut self.solver,
            "instance" => &mut self.instance,
            "strategy" => &mut self.strategy,
            "kind" => &mut self.kind,
            "reason" => &mut self.reason,
            "reference" => &mut self.reference,
            "fastest" => &mut self.fastest,
            "slowest" => &mut self.slowest,
            "path" => &mut self.path,
            "configuration" => &mut self.configuration,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "search_start" => format_search_start(v),
        "pair_start" => format_pair_start(v),
        "trial_end" => format_trial_end(v, level),
        "trial_failed" => format_trial_failed(v),
        "pair_skipped" => format_pair_skipped(v),
        "pair_end" => format_pair_end(v),
        "search_end" => format_search_end(v),
        "results_saved" => format_results_saved(v),
        "ranking_end" => format_ranking_end(v),
        "timing_end" => format_timing_end(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>8.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(n: Option<u64>) -> String {
    n.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn name(s: &Option<String>) -> &str {
    s.as_deref().unwrap_or("?")
}

fn format_search_start(v: &EventVisitor) -> String {
    let mode = if v.parallel.unwrap_or(false) {
        "parallel"
    } else {
        "sequential"
    };
    format!(
        "{} {} Search │ {} solvers │ {} instances │ seed {} │ {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v.solvers).bright_yellow(),
        count(v.instances).bright_yellow(),
        v.seed.unwrap_or(0).bright_magenta(),
        mode.white()
    )
}

fn format_pair_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} on {} (n={}) │ {} × {}",
        format_elapsed(),
        "▶".bright_blue(),
        name(&v.solver).white().bold(),
        name(&v.instance).bright_cyan(),
        count(v.size),
        count(v.trials).bright_yellow(),
        name(&v.strategy)
    )
}

fn format_trial_end(v: &EventVisitor, level: Level) -> String {
    if level != Level::DEBUG {
        return String::new();
    }
    let icon = if v.improved.unwrap_or(false) {
        "★".bright_green().to_string()
    } else {
        "·".bright_black().to_string()
    };
    format!(
        "{} {} #{:<4} {} │ {} │ {}",
        format_elapsed(),
        icon,
        v.trial.unwrap_or(0),
        format_score(v.score),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        name(&v.configuration).bright_black()
    )
}

fn format_trial_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} {} on {} │ {} │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        name(&v.solver).white(),
        name(&v.instance).bright_cyan(),
        name(&v.kind).bright_red(),
        name(&v.reason)
    )
}

fn format_pair_skipped(v: &EventVisitor) -> String {
    format!(
        "{} {} {} on {} skipped │ {}",
        format_elapsed(),
        "⚠".bright_yellow().bold(),
        name(&v.solver).white(),
        name(&v.instance).bright_cyan(),
        name(&v.reason).yellow()
    )
}

fn format_pair_end(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {} on {} │ {} │ best {}",
        format_elapsed(),
        "◀".bright_blue(),
        name(&v.solver).white().bold(),
        name(&v.instance).bright_cyan(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        format_score(v.score)
    );
    let failures = v.failures.unwrap_or(0);
    if failures > 0 {
        output.push_str(&format!(
            " │ {}/{} failed",
            failures.to_formatted_string(&Locale::en).bright_red(),
            count(v.trials)
        ));
    }
    output
}

fn format_search_end(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Search complete │ {} │ {} pairs │ {} trials",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.pairs).bright_yellow(),
        count(v.trials).bright_yellow()
    );
    let failures = v.failures.unwrap_or(0);
    if failures > 0 {
        output.push_str(&format!(
            " │ {} failed",
            failures.to_formatted_string(&Locale::en).bright_red()
        ));
    }
    let skipped = v.skipped.unwrap_or(0);
    if skipped > 0 {
        output.push_str(&format!(
            " │ {} pairs skipped",
            skipped.to_formatted_string(&Locale::en).bright_yellow()
        ));
    }
    output
}

fn format_results_saved(v: &EventVisitor) -> String {
    format!(
        "{} {} {} pairs saved to {}",
        format_elapsed(),
        "✓".bright_green(),
        count(v.pairs),
        name(&v.path).white().bold()
    )
}

fn format_ranking_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Ranking │ {} solvers │ {} instances │ CD {:.4} │ best {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v.solvers).bright_yellow(),
        count(v.instances).bright_yellow(),
        v.critical_difference.unwrap_or(0.0).bright_magenta(),
        name(&v.reference).bright_green().bold()
    )
}

fn format_timing_end(v: &EventVisitor) -> String {
    let (Some(fastest), Some(slowest)) = (&v.fastest, &v.slowest) else {
        return format!(
            "{} {} Timing │ {}",
            format_elapsed(),
            "⚠".bright_yellow().bold(),
            name(&v.reason).yellow()
        );
    };
    let percent = v
        .percent
        .map(|p| format!("{:.2}%", p))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "{} {} Timing │ fastest {} │ slowest {} │ {} slower",
        format_elapsed(),
        "■".bright_cyan().bold(),
        fastest.bright_green().bold(),
        slowest.bright_red(),
        percent.bright_magenta()
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.4}", s).bright_green().to_string(),
        None => "N/A".bright_black().to_string(),
    }
}
