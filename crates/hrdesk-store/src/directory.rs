// ABOUTME: Read-only employee directory keyed by employee identifier.
// ABOUTME: Loads from the built-in seed data or from a JSON file and never changes afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hrdesk_core::EmployeeRecord;
use thiserror::Error;

const SEED_JSON: &str = include_str!("../data/employees.json");

/// Errors that can occur while loading the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read employee directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid employee directory json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Employee records keyed by normalized identifier (trimmed, upper-case).
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    records: BTreeMap<String, EmployeeRecord>,
}

impl EmployeeDirectory {
    /// The ten built-in records EMP001 through EMP010.
    pub fn seeded() -> Result<Self, DirectoryError> {
        Self::from_json(SEED_JSON)
    }

    /// Parse a JSON object of `{ "<id>": <record>, ... }`.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let raw: BTreeMap<String, EmployeeRecord> = serde_json::from_str(json)?;
        let records = raw
            .into_iter()
            .map(|(id, record)| (normalize_id(&id), record))
            .collect();
        Ok(Self { records })
    }

    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), employees = directory.len(), "employee directory loaded");
        Ok(directory)
    }

    /// Look up a record. `None` is the explicit not-found result.
    pub fn get(&self, employee_id: &str) -> Option<&EmployeeRecord> {
        self.records.get(&normalize_id(employee_id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}
