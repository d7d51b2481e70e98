//! Critical values of the Nemenyi test.

use crate::error::RankingError;

/// Largest solver count with a tabulated critical value.
pub const MAX_TABULATED_SOLVERS: usize = 10;

// Studentized range statistic divided by sqrt(2), for k = 2..=10
// (Demšar 2006, Table 5a).
const Q_ALPHA_05: [f64; 9] = [1.960, 2.343, 2.569, 2.728, 2.850, 2.949, 3.031, 3.102, 3.164];
const Q_ALPHA_10: [f64; 9] = [1.645, 2.052, 2.291, 2.459, 2.589, 2.693, 2.780, 2.855, 2.920];

/// Significance level of the critical difference test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Significance {
    /// alpha = 0.05
    #[default]
    Alpha05,
    /// alpha = 0.10
    Alpha10,
}

impl Significance {
    /// Maps a numeric alpha to a tabulated level.
    pub fn from_alpha(alpha: f64) -> Option<Self> {
        if (alpha - 0.05).abs() < 1e-9 {
            Some(Significance::Alpha05)
        } else if (alpha - 0.10).abs() < 1e-9 {
            Some(Significance::Alpha10)
        } else {
            None
        }
    }

    /// Returns the numeric alpha.
    pub fn alpha(self) -> f64 {
        match self {
            Significance::Alpha05 => 0.05,
            Significance::Alpha10 => 0.10,
        }
    }
}

/// Returns `q_alpha` for comparing `k` solvers.
///
/// # Example
///
/// ```
/// use solverbench_stats::{critical_value, Significance};
///
/// assert_eq!(critical_value(3, Significance::Alpha05).unwrap(), 2.343);
/// assert!(critical_value(11, Significance::Alpha05).is_err());
/// ```
pub fn critical_value(k: usize, significance: Significance) -> Result<f64, RankingError> {
    let table = match significance {
        Significance::Alpha05 => &Q_ALPHA_05,
        Significance::Alpha10 => &Q_ALPHA_10,
    };
    k.checked_sub(2)
        .and_then(|i| table.get(i))
        .copied()
        .ok_or(RankingError::UnsupportedSolverCount {
            k,
            alpha: significance.alpha(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_bounds() {
        assert_eq!(critical_value(2, Significance::Alpha05).unwrap(), 1.960);
        assert_eq!(critical_value(10, Significance::Alpha10).unwrap(), 2.920);
        assert!(critical_value(1, Significance::Alpha05).is_err());
        assert!(critical_value(MAX_TABULATED_SOLVERS + 1, Significance::Alpha10).is_err());
    }

    #[test]
    fn test_values_grow_with_k() {
        for table in [Q_ALPHA_05, Q_ALPHA_10] {
            assert!(table.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_from_alpha() {
        assert_eq!(Significance::from_alpha(0.05), Some(Significance::Alpha05));
        assert_eq!(Significance::from_alpha(0.1), Some(Significance::Alpha10));
        assert_eq!(Significance::from_alpha(0.01), None);
    }
}
