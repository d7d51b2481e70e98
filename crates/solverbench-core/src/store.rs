//! JSON persistence for result tables.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::StoreError;
use crate::result::ResultTable;

/// Reads and writes [`ResultTable`] documents.
///
/// The document maps instance name to solver name to
/// `{"shortest_distance": <score>, "params": {<flag>: <value>}}`.
/// Documents written with the older `shortestDistance` key load into the
/// same table; writes always use `shortest_distance`.
///
/// # Example
///
/// ```
/// use solverbench_core::ResultStore;
///
/// let table = ResultStore::deserialize(r#"{
///     "berlin52": {
///         "genetic": {"shortestDistance": 7600.5, "params": {"-pop": 150, "-mut": 0.02}}
///     }
/// }"#).unwrap();
///
/// assert_eq!(table.score("berlin52", "genetic"), Some(7600.5));
/// assert!(ResultStore::serialize(&table).unwrap().contains("shortest_distance"));
/// ```
pub struct ResultStore;

impl ResultStore {
    /// Serializes a table to a pretty-printed JSON document.
    pub fn serialize(table: &ResultTable) -> Result<String, StoreError> {
        validate(table)?;
        Ok(serde_json::to_string_pretty(table)?)
    }

    /// Parses a JSON document into a table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] when a result lacks its score or
    /// configuration, or when a score is negative or not finite.
    pub fn deserialize(document: &str) -> Result<ResultTable, StoreError> {
        let table: ResultTable = serde_json::from_str(document)?;
        validate(&table)?;
        Ok(table)
    }

    /// Writes a table to `path`, replacing the file atomically.
    pub fn save(table: &ResultTable, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let document = Self::serialize(table)?;
        let tmp_path = path.with_extension("json.tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(document.as_bytes())?;
        file.sync_all()?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads a table from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<ResultTable, StoreError> {
        let document = fs::read_to_string(path)?;
        Self::deserialize(&document)
    }
}

fn validate(table: &ResultTable) -> Result<(), StoreError> {
    for (instance, solver, best) in table.iter() {
        if !best.score.is_finite() || best.score < 0.0 {
            return Err(StoreError::Malformed(format!(
                "{}/{}: invalid score {}",
                instance, solver, best.score
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
