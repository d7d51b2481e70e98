//! Hyperparameter space sampling.
//!
//! Two strategies produce the configurations tried for one (solver, instance)
//! pair:
//!
//! - [`GridSampler`] walks the full Cartesian product of candidate values.
//! - [`RandomSampler`] draws a fixed number of independent configurations,
//!   resolving size-dependent and parameter-dependent bounds per draw.

use rand::Rng;
use solverbench_config::{Bound, GridParam, RandomParam, SamplingConfig};
use solverbench_core::{Configuration, ParamValue, ProblemInstance};
use thiserror::Error;

/// Attempts per configuration before an empty dependent range is reported.
const MAX_DRAW_ATTEMPTS: usize = 100;

/// A parameter range that cannot be sampled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    /// A bound refers to a flag that has not been drawn yet.
    #[error("bound of {flag} refers to {param}, which is not drawn before it")]
    UnresolvedBound { flag: String, param: String },

    /// The resolved range contains no value.
    #[error("empty range for {flag}: [{low}, {high}] on an instance of size {size}")]
    EmptyRange {
        flag: String,
        low: f64,
        high: f64,
        size: usize,
    },
}

/// Produces the configurations to try on one instance.
pub trait ParameterSampler {
    /// Returns every configuration for `instance`, in trial order.
    fn sample<R: Rng>(
        &self,
        instance: &ProblemInstance,
        rng: &mut R,
    ) -> Result<Vec<Configuration>, SamplerError>;
}

/// Exhaustive sampling over explicit candidate lists.
///
/// Configurations are produced in lexicographic order over the declared flag
/// order: the last flag varies fastest.
///
/// # Example
///
/// ```
/// use solverbench_benchmark::GridSampler;
/// use solverbench_config::GridParam;
///
/// let grid = GridSampler::new(vec![
///     GridParam { flag: "-pop".into(), values: vec![100.into(), 200.into()] },
///     GridParam { flag: "-mut".into(), values: vec![0.01.into(), 0.05.into()] },
/// ]);
///
/// let configs: Vec<String> = grid.iter().map(|c| c.to_string()).collect();
/// assert_eq!(configs, vec![
///     "{-pop: 100, -mut: 0.01}",
///     "{-pop: 100, -mut: 0.05}",
///     "{-pop: 200, -mut: 0.01}",
///     "{-pop: 200, -mut: 0.05}",
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridSampler {
    params: Vec<GridParam>,
}

impl GridSampler {
    pub fn new(params: Vec<GridParam>) -> Self {
        Self { params }
    }

    /// Adds a flag with its candidate values, builder style.
    pub fn with_param<V: Into<ParamValue>>(
        mut self,
        flag: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.params.push(GridParam {
            flag: flag.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Number of configurations in the grid.
    pub fn len(&self) -> usize {
        self.params.iter().map(|p| p.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily walks the grid. The iterator can be recreated at will and
    /// always yields the same sequence.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            params: &self.params,
            indices: vec![0; self.params.len()],
            done: self.params.iter().any(|p| p.values.is_empty()),
        }
    }
}

impl ParameterSampler for GridSampler {
    fn sample<R: Rng>(
        &self,
        _instance: &ProblemInstance,
        _rng: &mut R,
    ) -> Result<Vec<Configuration>, SamplerError> {
        Ok(self.iter().collect())
    }
}

/// Iterator over the configurations of a [`GridSampler`].
#[derive(Debug, Clone)]
pub struct GridIter<'a> {
    params: &'a [GridParam],
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for GridIter<'_> {
    type Item = Configuration;

    fn next(&mut self) -> Option<Configuration> {
        if self.done {
            return None;
        }

        let config = self
            .params
            .iter()
            .zip(&self.indices)
            .map(|(param, &i)| (param.flag.as_str(), param.values[i]))
            .collect();

        // Odometer step, rightmost digit first.
        let mut position = self.indices.len();
        loop {
            if position == 0 {
                self.done = true;
                break;
            }
            position -= 1;
            self.indices[position] += 1;
            if self.indices[position] < self.params[position].values.len() {
                break;
            }
            self.indices[position] = 0;
        }

        Some(config)
    }
}

/// Random sampling with a fixed trial budget.
///
/// Parameters are drawn in declared order, so a bound may use the value
/// drawn for an earlier flag of the same configuration. Draws are
/// independent and duplicates are kept.
///
/// A draw whose dependent range comes out empty is redrawn, up to
/// `MAX_DRAW_ATTEMPTS` times, so every valid budget yields exactly
/// `trials` configurations.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSampler {
    trials: usize,
    params: Vec<RandomParam>,
}

impl RandomSampler {
    pub fn new(trials: usize, params: Vec<RandomParam>) -> Self {
        Self { trials, params }
    }

    /// Number of configurations drawn per instance.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Draws one configuration.
    pub fn draw<R: Rng>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> Result<Configuration, SamplerError> {
        let mut config = Configuration::new();
        for param in &self.params {
            match param {
                RandomParam::UniformInt { flag, low, high } => {
                    let (low, high) = resolve_range(flag, low, high, size, &config)?;
                    let (low, high) = (low.ceil(), high.floor());
                    if low > high {
                        return Err(empty_range(flag, low, high, size));
                    }
                    let value = rng.random_range(low as i64..=high as i64);
                    config.insert(flag.as_str(), value);
                }
                RandomParam::UniformReal { flag, low, high } => {
                    let (low, high) = resolve_range(flag, low, high, size, &config)?;
                    if low > high {
                        return Err(empty_range(flag, low, high, size));
                    }
                    let value = rng.random_range(low..=high);
                    config.insert(flag.as_str(), value);
                }
                RandomParam::Constant { flag, value } => {
                    config.insert(flag.as_str(), *value);
                }
            }
        }
        Ok(config)
    }

    fn draw_valid<R: Rng>(&self, size: usize, rng: &mut R) -> Result<Configuration, SamplerError> {
        let mut attempt = 1;
        loop {
            match self.draw(size, rng) {
                Err(SamplerError::EmptyRange { .. }) if attempt < MAX_DRAW_ATTEMPTS => attempt += 1,
                result => return result,
            }
        }
    }
}

impl ParameterSampler for RandomSampler {
    fn sample<R: Rng>(
        &self,
        instance: &ProblemInstance,
        rng: &mut R,
    ) -> Result<Vec<Configuration>, SamplerError> {
        (0..self.trials)
            .map(|_| self.draw_valid(instance.size(), rng))
            .collect()
    }
}

fn resolve_range(
    flag: &str,
    low: &Bound,
    high: &Bound,
    size: usize,
    drawn: &Configuration,
) -> Result<(f64, f64), SamplerError> {
    let low = resolve(flag, low, size, drawn)?;
    let high = resolve(flag, high, size, drawn)?;
    if !low.is_finite() || !high.is_finite() {
        return Err(empty_range(flag, low, high, size));
    }
    Ok((low, high))
}

fn resolve(
    flag: &str,
    bound: &Bound,
    size: usize,
    drawn: &Configuration,
) -> Result<f64, SamplerError> {
    bound.resolve(size, drawn).ok_or_else(|| {
        let param = match bound {
            Bound::Param { param, .. } => param.clone(),
            _ => String::new(),
        };
        SamplerError::UnresolvedBound {
            flag: flag.to_string(),
            param,
        }
    })
}

fn empty_range(flag: &str, low: f64, high: f64, size: usize) -> SamplerError {
    SamplerError::EmptyRange {
        flag: flag.to_string(),
        low,
        high,
        size,
    }
}

/// A sampling strategy selected per solver.
#[derive(Debug, Clone, PartialEq)]
pub enum Sampler {
    Grid(GridSampler),
    Random(RandomSampler),
}

impl Sampler {
    /// Number of configurations produced per instance.
    pub fn budget(&self) -> usize {
        match self {
            Sampler::Grid(grid) => grid.len(),
            Sampler::Random(random) => random.trials(),
        }
    }

    /// Short strategy name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Sampler::Grid(_) => "grid",
            Sampler::Random(_) => "random",
        }
    }
}

impl From<&SamplingConfig> for Sampler {
    fn from(config: &SamplingConfig) -> Self {
        match config {
            SamplingConfig::Grid { params } => Sampler::Grid(GridSampler::new(params.clone())),
            SamplingConfig::Random { trials, params } => {
                Sampler::Random(RandomSampler::new(*trials, params.clone()))
            }
        }
    }
}

impl From<GridSampler> for Sampler {
    fn from(grid: GridSampler) -> Self {
        Sampler::Grid(grid)
    }
}

impl From<RandomSampler> for Sampler {
    fn from(random: RandomSampler) -> Self {
        Sampler::Random(random)
    }
}

impl ParameterSampler for Sampler {
    fn sample<R: Rng>(
        &self,
        instance: &ProblemInstance,
        rng: &mut R,
    ) -> Result<Vec<Configuration>, SamplerError> {
        match self {
            Sampler::Grid(grid) => grid.sample(instance, rng),
            Sampler::Random(random) => random.sample(instance, rng),
        }
    }
}
