//! Invocation of external solver processes.

use std::ffi::OsString;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use regex::Regex;
use solverbench_config::InvocationConfig;
use solverbench_core::{Configuration, ProblemInstance, SolverSpec};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const OUTPUT_TAIL_CHARS: usize = 200;

static BEST_DISTANCE: OnceLock<Regex> = OnceLock::new();

fn best_distance_pattern() -> &'static Regex {
    BEST_DISTANCE.get_or_init(|| {
        Regex::new(r"Best route distance:\s*(\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)")
            .expect("best distance pattern is valid")
    })
}

/// Why a single trial produced no score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrialFailure {
    /// The process could not be started or exited unsuccessfully.
    #[error("solver process failed (exit code {code:?}): {detail}")]
    Process { code: Option<i32>, detail: String },

    /// The process succeeded but printed no score line.
    #[error("no best route distance in solver output: {output_tail:?}")]
    Parse { output_tail: String },

    /// The process was killed after exceeding its time limit.
    #[error("solver exceeded time limit of {limit:?}")]
    Timeout { limit: Duration },
}

impl TrialFailure {
    /// Short name of the failure kind, for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            TrialFailure::Process { .. } => "process",
            TrialFailure::Parse { .. } => "parse",
            TrialFailure::Timeout { .. } => "timeout",
        }
    }
}

/// Runs one solver configuration against one instance and returns its score.
///
/// Implemented by [`ProcessInvoker`] for local executables and by any
/// `Fn(&SolverSpec, &ProblemInstance, &Configuration) -> Result<f64, TrialFailure>`,
/// which lets the search and timing drivers run against in-memory solvers.
pub trait SolverInvoker {
    fn invoke(
        &self,
        solver: &SolverSpec,
        instance: &ProblemInstance,
        configuration: &Configuration,
    ) -> Result<f64, TrialFailure>;
}

impl<F> SolverInvoker for F
where
    F: Fn(&SolverSpec, &ProblemInstance, &Configuration) -> Result<f64, TrialFailure>,
{
    fn invoke(
        &self,
        solver: &SolverSpec,
        instance: &ProblemInstance,
        configuration: &Configuration,
    ) -> Result<f64, TrialFailure> {
        self(solver, instance, configuration)
    }
}

/// Extracts the score from solver output.
///
/// Returns the first `Best route distance: <number>` found. A number that
/// overflows to infinity is not a score.
///
/// # Example
///
/// ```
/// use solverbench_benchmark::parse_best_distance;
///
/// let output = "generation 500\nBest route distance: 7544.3659\nBest route: 0 48 31";
/// assert_eq!(parse_best_distance(output), Some(7544.3659));
/// assert_eq!(parse_best_distance("done"), None);
/// ```
pub fn parse_best_distance(output: &str) -> Option<f64> {
    best_distance_pattern()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|distance: &f64| distance.is_finite())
}

/// Runs solvers as local child processes.
///
/// The command line is `exec [args...] <input_flag> <instance path> [flag value]...`.
/// Standard output is captured and scanned with [`parse_best_distance`].
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    input_flag: String,
    timeout: Option<Duration>,
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInvoker {
    /// Creates an invoker using `-input` and no time limit.
    pub fn new() -> Self {
        Self {
            input_flag: "-input".to_string(),
            timeout: None,
        }
    }

    /// Creates an invoker from configuration.
    pub fn from_config(config: &InvocationConfig) -> Self {
        Self {
            input_flag: config.input_flag.clone(),
            timeout: config.timeout(),
        }
    }

    /// Sets the flag preceding the instance path.
    pub fn with_input_flag(mut self, flag: impl Into<String>) -> Self {
        self.input_flag = flag.into();
        self
    }

    /// Kills solvers that run longer than `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Returns the per-invocation time limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Builds the argument list passed after the executable.
    pub fn command_args(
        &self,
        solver: &SolverSpec,
        instance: &ProblemInstance,
        configuration: &Configuration,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = solver.args.iter().map(OsString::from).collect();
        args.push(OsString::from(&self.input_flag));
        args.push(instance.path().as_os_str().to_owned());
        args.extend(configuration.to_args().into_iter().map(OsString::from));
        args
    }

    fn wait(&self, child: &mut Child) -> Result<std::process::ExitStatus, TrialFailure> {
        let Some(limit) = self.timeout else {
            return child.wait().map_err(process_error);
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait().map_err(process_error)? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TrialFailure::Timeout { limit });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl SolverInvoker for ProcessInvoker {
    fn invoke(
        &self,
        solver: &SolverSpec,
        instance: &ProblemInstance,
        configuration: &Configuration,
    ) -> Result<f64, TrialFailure> {
        let mut child = Command::new(&solver.exec)
            .args(self.command_args(solver, instance, configuration))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TrialFailure::Process {
                code: None,
                detail: format!("failed to start {}: {}", solver.exec.display(), e),
            })?;

        // Drain both pipes concurrently so a chatty solver cannot block on a
        // full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // Readers are left detached on timeout; grandchildren may keep the
        // pipes open.
        let status = self.wait(&mut child)?;
        let stdout = collect(stdout);
        let stderr = collect(stderr);

        if !status.success() {
            return Err(TrialFailure::Process {
                code: status.code(),
                detail: tail(stderr.trim(), OUTPUT_TAIL_CHARS).to_string(),
            });
        }

        parse_best_distance(&stdout).ok_or_else(|| TrialFailure::Parse {
            output_tail: tail(stdout.trim(), OUTPUT_TAIL_CHARS).to_string(),
        })
    }
}

fn process_error(err: std::io::Error) -> TrialFailure {
    TrialFailure::Process {
        code: None,
        detail: err.to_string(),
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn tail(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    let skip = count - max_chars;
    let start = s.char_indices().nth(skip).map(|(i, _)| i).unwrap_or(0);
    &s[start..]
}
