//! Configuration system for SolverBench.
//!
//! Load experiment configuration from TOML or YAML files to declare the
//! solvers under test, their hyperparameter spaces and the sampling policy,
//! without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use solverbench_config::{ExperimentConfig, SamplingConfig};
//! use std::time::Duration;
//!
//! let config = ExperimentConfig::from_toml_str(r#"
//!     random_seed = 7
//!
//!     [invocation]
//!     timeout_secs = 120
//!
//!     [[solvers]]
//!     name = "genetic"
//!     exec = "./genetic"
//!     [solvers.sampling]
//!     type = "grid"
//!     params = [
//!         { flag = "-pop", values = [100, 200] },
//!         { flag = "-mut", values = [0.01, 0.05] },
//!     ]
//! "#).unwrap();
//!
//! assert_eq!(config.invocation.timeout(), Some(Duration::from_secs(120)));
//! assert!(matches!(config.solvers[0].sampling, SamplingConfig::Grid { .. }));
//! config.validate().unwrap();
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solverbench_core::{Configuration, ParamValue, SolverSpec};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Significance levels with tabulated Nemenyi critical values.
pub const SUPPORTED_ALPHAS: [f64; 2] = [0.05, 0.10];

/// Main experiment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExperimentConfig {
    /// Directory holding the problem instances.
    #[serde(default = "default_instances_dir")]
    pub instances_dir: PathBuf,

    /// File extension of instance files.
    #[serde(default = "default_instance_extension")]
    pub instance_extension: String,

    /// Where the best-result table is persisted.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Random seed for reproducible sampling.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Search (solver, instance) pairs in parallel.
    #[serde(default)]
    pub parallel: bool,

    /// Process invocation settings.
    #[serde(default)]
    pub invocation: InvocationConfig,

    /// Ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Timing replay settings.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Solvers under test.
    #[serde(default)]
    pub solvers: Vec<SolverConfig>,
}

fn default_instances_dir() -> PathBuf {
    PathBuf::from("tsp_maps")
}

fn default_instance_extension() -> String {
    "tsp".to_string()
}

fn default_results_path() -> PathBuf {
    PathBuf::from("best_hyperparameters.json")
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            instances_dir: default_instances_dir(),
            instance_extension: default_instance_extension(),
            results_path: default_results_path(),
            random_seed: None,
            parallel: false,
            invocation: InvocationConfig::default(),
            ranking: RankingConfig::default(),
            timing: TimingConfig::default(),
            solvers: Vec::new(),
        }
    }
}

impl ExperimentConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, anything else as
    /// TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, fails to parse, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "yaml" | "yml"));
        let config = if is_yaml {
            Self::from_yaml_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Adds a solver.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solvers.push(solver);
        self
    }

    /// Looks up a solver by name.
    pub fn solver(&self, name: &str) -> Option<&SolverConfig> {
        self.solvers.iter().find(|s| s.name == name)
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solvers.is_empty() {
            return Err(ConfigError::Invalid("no solvers configured".to_string()));
        }

        let mut names = HashSet::new();
        for solver in &self.solvers {
            if !names.insert(solver.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate solver name: {}",
                    solver.name
                )));
            }
            solver.sampling.validate(&solver.name)?;
        }

        self.ranking.validate()?;

        if self.timing.repetitions == 0 {
            return Err(ConfigError::Invalid(
                "timing.repetitions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Process invocation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvocationConfig {
    /// Flag preceding the instance path.
    #[serde(default = "default_input_flag")]
    pub input_flag: String,

    /// Per-invocation wall-clock limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_input_flag() -> String {
    "-input".to_string()
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            input_flag: default_input_flag(),
            timeout_secs: None,
        }
    }
}

impl InvocationConfig {
    /// Returns the per-invocation time limit, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|&s| s > 0).map(Duration::from_secs)
    }
}

/// Ranking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RankingConfig {
    /// Significance level of the critical difference test.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Absolute score distance under which two scores tie. Zero means exact
    /// equality.
    #[serde(default)]
    pub tie_tolerance: f64,

    /// Solvers to compare; all solvers in the table when absent.
    #[serde(default)]
    pub solvers: Option<Vec<String>>,
}

fn default_alpha() -> f64 {
    0.05
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            tie_tolerance: 0.0,
            solvers: None,
        }
    }
}

impl RankingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_ALPHAS
            .iter()
            .any(|a| (a - self.alpha).abs() < 1e-9)
        {
            return Err(ConfigError::Invalid(format!(
                "ranking.alpha must be one of {:?}, got {}",
                SUPPORTED_ALPHAS, self.alpha
            )));
        }
        if !self.tie_tolerance.is_finite() || self.tie_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "ranking.tie_tolerance must be a non-negative number, got {}",
                self.tie_tolerance
            )));
        }
        Ok(())
    }
}

/// Timing replay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingConfig {
    /// Replays per (solver, instance) pair.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
}

fn default_repetitions() -> usize {
    1
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            repetitions: default_repetitions(),
        }
    }
}

/// One solver under test.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Name used as the key in result tables.
    pub name: String,

    /// Program to execute.
    pub exec: PathBuf,

    /// Leading arguments passed before the input flag.
    #[serde(default)]
    pub args: Vec<String>,

    /// How configurations are generated.
    pub sampling: SamplingConfig,
}

impl SolverConfig {
    /// Creates a solver configuration.
    pub fn new(name: impl Into<String>, exec: impl Into<PathBuf>, sampling: SamplingConfig) -> Self {
        Self {
            name: name.into(),
            exec: exec.into(),
            args: Vec::new(),
            sampling,
        }
    }

    /// Returns the invocation descriptor for this solver.
    pub fn spec(&self) -> SolverSpec {
        SolverSpec {
            name: self.name.clone(),
            exec: self.exec.clone(),
            args: self.args.clone(),
        }
    }
}

/// Sampling policy for one solver.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SamplingConfig {
    /// Every element of the Cartesian product of candidate values.
    Grid {
        /// Candidate values per flag, in declared order.
        params: Vec<GridParam>,
    },

    /// A fixed number of independent random draws.
    Random {
        /// Number of configurations to draw.
        trials: usize,
        /// Parameter distributions, sampled in declared order.
        params: Vec<RandomParam>,
    },
}

impl SamplingConfig {
    fn validate(&self, solver: &str) -> Result<(), ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        match self {
            SamplingConfig::Grid { params } => {
                for param in params {
                    if !seen.insert(&param.flag) {
                        return Err(duplicate_flag(solver, &param.flag));
                    }
                    if param.values.is_empty() {
                        return Err(ConfigError::Invalid(format!(
                            "{}: grid flag {} has no candidate values",
                            solver, param.flag
                        )));
                    }
                }
            }
            SamplingConfig::Random { trials, params } => {
                if *trials == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "{}: random sampling needs at least one trial",
                        solver
                    )));
                }
                for param in params {
                    for bound in param.bounds() {
                        if let Bound::Param { param: dep, .. } = bound {
                            if !seen.contains(dep.as_str()) {
                                return Err(ConfigError::Invalid(format!(
                                    "{}: bound of {} refers to {} which is not declared before it",
                                    solver,
                                    param.flag(),
                                    dep
                                )));
                            }
                        }
                    }
                    if !seen.insert(param.flag()) {
                        return Err(duplicate_flag(solver, param.flag()));
                    }
                }
            }
        }
        Ok(())
    }
}

fn duplicate_flag(solver: &str, flag: &str) -> ConfigError {
    ConfigError::Invalid(format!("{}: flag {} declared twice", solver, flag))
}

/// Candidate values for one grid flag.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GridParam {
    pub flag: String,
    pub values: Vec<ParamValue>,
}

/// Distribution of one randomly sampled flag.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RandomParam {
    /// Integer drawn uniformly from `[ceil(low), floor(high)]`.
    UniformInt { flag: String, low: Bound, high: Bound },

    /// Real drawn uniformly from `[low, high]`.
    UniformReal { flag: String, low: Bound, high: Bound },

    /// Fixed value passed on every draw.
    Constant { flag: String, value: ParamValue },
}

impl RandomParam {
    /// Returns the flag this distribution produces.
    pub fn flag(&self) -> &str {
        match self {
            RandomParam::UniformInt { flag, .. }
            | RandomParam::UniformReal { flag, .. }
            | RandomParam::Constant { flag, .. } => flag,
        }
    }

    /// Returns the range bounds, empty for constants.
    pub fn bounds(&self) -> Vec<&Bound> {
        match self {
            RandomParam::UniformInt { low, high, .. }
            | RandomParam::UniformReal { low, high, .. } => vec![low, high],
            RandomParam::Constant { .. } => Vec::new(),
        }
    }
}

/// One end of a sampling range.
///
/// ```toml
/// low = 2                                  # fixed
/// high = { size = 6 }                      # 6 x instance size
/// high = { param = "-pop", divisor = 10 }  # value drawn for -pop / 10
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Bound {
    /// A fixed number.
    Fixed(f64),

    /// A multiple of the instance size.
    InstanceSize { size: f64 },

    /// A scaled value of a flag drawn earlier in the same configuration.
    Param {
        param: String,
        #[serde(default = "one")]
        multiplier: f64,
        #[serde(default = "one")]
        divisor: f64,
    },
}

fn one() -> f64 {
    1.0
}

impl Bound {
    /// Resolves the bound for an instance of `size`, given the values drawn
    /// so far in the current configuration.
    ///
    /// Returns `None` if the bound refers to a flag not yet drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use solverbench_config::Bound;
    /// use solverbench_core::Configuration;
    ///
    /// let drawn = Configuration::new().with("-pop", 150);
    ///
    /// assert_eq!(Bound::Fixed(2.0).resolve(52, &drawn), Some(2.0));
    /// assert_eq!(Bound::InstanceSize { size: 6.0 }.resolve(52, &drawn), Some(312.0));
    ///
    /// let elite = Bound::Param { param: "-pop".into(), multiplier: 1.0, divisor: 10.0 };
    /// assert_eq!(elite.resolve(52, &drawn), Some(15.0));
    /// ```
    pub fn resolve(&self, size: usize, drawn: &Configuration) -> Option<f64> {
        match self {
            Bound::Fixed(v) => Some(*v),
            Bound::InstanceSize { size: factor } => Some(factor * size as f64),
            Bound::Param {
                param,
                multiplier,
                divisor,
            } => drawn
                .get(param)
                .map(|v| v.as_f64() * multiplier / divisor),
        }
    }
}

/// Runtime configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct ExperimentConfigOverride {
    /// Override where results are persisted.
    pub results_path: Option<PathBuf>,
    /// Override the ranking significance level.
    pub alpha: Option<f64>,
    /// Override the ranking tie tolerance.
    pub tie_tolerance: Option<f64>,
}

impl ExperimentConfigOverride {
    /// Applies the overrides to a configuration.
    pub fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(path) = &self.results_path {
            config.results_path = path.clone();
        }
        if let Some(alpha) = self.alpha {
            config.ranking.alpha = alpha;
        }
        if let Some(tolerance) = self.tie_tolerance {
            config.ranking.tie_tolerance = tolerance;
        }
    }
}
