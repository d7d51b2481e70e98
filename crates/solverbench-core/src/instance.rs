//! Problem instances.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::InstanceError;

static DIGITS: OnceLock<Regex> = OnceLock::new();

fn digits() -> &'static Regex {
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"))
}

/// A problem instance on disk.
///
/// The instance's size (its point count) is the first run of digits in the
/// file name, e.g. `kroA100.tsp` has size 100.
///
/// # Example
///
/// ```
/// use solverbench_core::ProblemInstance;
///
/// let instance = ProblemInstance::from_path("tsp_maps/berlin52.tsp").unwrap();
/// assert_eq!(instance.name(), "berlin52");
/// assert_eq!(instance.size(), 52);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInstance {
    name: String,
    path: PathBuf,
    size: usize,
}

impl ProblemInstance {
    /// Creates an instance with an explicit size.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: usize) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
        }
    }

    /// Resolves an instance from its file path.
    ///
    /// The name is the file stem; the size comes from the file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InstanceError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InstanceError::InvalidPath(path.to_path_buf()))?;
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or(file_name);
        let size = size_from_file_name(file_name)?;

        Ok(Self::new(stem, path, size))
    }

    /// Lists every instance in `dir` with the given extension, sorted by name.
    pub fn discover(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<Self>, InstanceError> {
        let mut instances = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension));
            if matches {
                instances.push(Self::from_path(&path)?);
            }
        }
        instances.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(instances)
    }

    /// Returns the instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the path to the instance file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the point count.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Extracts the point count embedded in an instance file name.
pub fn size_from_file_name(file_name: &str) -> Result<usize, InstanceError> {
    digits()
        .find(file_name)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| InstanceError::MissingSize(file_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_digit_run_wins() {
        assert_eq!(size_from_file_name("pr76-v2.tsp").unwrap(), 76);
        assert_eq!(size_from_file_name("a280.tsp").unwrap(), 280);
    }

    #[test]
    fn test_missing_size() {
        let err = size_from_file_name("random.tsp").unwrap_err();
        assert!(matches!(err, InstanceError::MissingSize(_)));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["st70.tsp", "eil51.tsp", "notes.txt", "kroA100.TSP"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested5.tsp")).unwrap();

        let instances = ProblemInstance::discover(dir.path(), "tsp").unwrap();
        let names: Vec<_> = instances.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["eil51", "kroA100", "st70"]);
        assert_eq!(instances[1].size(), 100);
    }
}
