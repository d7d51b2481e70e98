//! Hyperparameter values and configurations.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single hyperparameter value.
///
/// Integer counts (population size, iterations) and real-valued rates
/// (mutation rate, cooling factor) can be mixed in one [`Configuration`].
///
/// # Example
///
/// ```
/// use solverbench_core::ParamValue;
///
/// assert_eq!(ParamValue::Int(100).to_arg(), "100");
/// assert_eq!(ParamValue::Real(0.9999).to_arg(), "0.9999");
/// assert_eq!(ParamValue::Int(3).as_f64(), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer-valued parameter.
    Int(i64),
    /// Real-valued parameter.
    Real(f64),
}

impl ParamValue {
    /// Returns the value as a float, for bound arithmetic.
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Real(v) => v,
        }
    }

    /// Formats the value as a command-line argument.
    ///
    /// Reals use the shortest representation that parses back to the same
    /// `f64`, so no precision is lost on the way to the solver.
    pub fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Real(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

/// One concrete assignment of hyperparameter values for a solver trial.
///
/// Flags keep their insertion order, which is the order they are passed on
/// the command line. Equality ignores that order.
///
/// # Example
///
/// ```
/// use solverbench_core::Configuration;
///
/// let a = Configuration::new().with("-pop", 100).with("-mut", 0.01);
/// let b = Configuration::new().with("-mut", 0.01).with("-pop", 100);
///
/// assert_eq!(a, b);
/// assert_eq!(a.to_args(), vec!["-pop", "100", "-mut", "0.01"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    values: IndexMap<String, ParamValue>,
}

impl Configuration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag/value pair, builder style.
    pub fn with(mut self, flag: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(flag, value);
        self
    }

    /// Sets a flag, returning the previous value if any.
    pub fn insert(
        &mut self,
        flag: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.values.insert(flag.into(), value.into())
    }

    /// Returns the value of a flag.
    pub fn get(&self, flag: &str) -> Option<ParamValue> {
        self.values.get(flag).copied()
    }

    /// Returns the number of flags.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no flag is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over flag/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Flattens the configuration into `flag value` argument pairs.
    pub fn to_args(&self) -> Vec<String> {
        self.values
            .iter()
            .flat_map(|(flag, value)| [flag.clone(), value.to_arg()])
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Configuration::new();
        for (flag, value) in iter {
            config.insert(flag, value);
        }
        config
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (flag, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", flag, value)?;
        }
        write!(f, "}}")
    }
}
