//! Named snapshots of per-company multiple/write-off settings.
//!
//! The store is a small keyed record file: insertion-ordered entries,
//! capacity-bounded, persisted as pretty JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::types::{CompanyPosition, Multiple};
use crate::ValuationResult;

/// Most-recent snapshots kept; saving beyond this evicts the oldest by
/// insertion order.
pub const MAX_SCENARIOS: usize = 5;

/// Stored settings for one company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSetting {
    pub exit_multiple: Multiple,
    pub write_off: bool,
}

/// One named snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub name: String,
    pub companies: BTreeMap<String, ScenarioSetting>,
}

impl ScenarioEntry {
    /// Capture the current multiple/write-off settings of `positions`.
    pub fn snapshot(name: impl Into<String>, positions: &[CompanyPosition]) -> Self {
        let companies = positions
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    ScenarioSetting {
                        exit_multiple: p.exit_multiple,
                        write_off: p.is_writeoff(),
                    },
                )
            })
            .collect();
        ScenarioEntry {
            name: name.into(),
            companies,
        }
    }
}

/// Insertion-ordered scenario store backed by a JSON file.
#[derive(Debug)]
pub struct ScenarioStore {
    path: PathBuf,
    entries: Vec<ScenarioEntry>,
}

impl ScenarioStore {
    /// Load the store from `path`. A missing file is an empty store; an
    /// unreadable or corrupt file is an error.
    pub fn load(path: impl Into<PathBuf>) -> ValuationResult<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(ScenarioStore {
                path,
                entries: Vec::new(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            ValuationError::DataUnavailable(format!(
                "Failed to read scenario store '{}': {}",
                path.display(),
                e
            ))
        })?;
        let entries: Vec<ScenarioEntry> = serde_json::from_str(&contents)?;
        Ok(ScenarioStore { path, entries })
    }

    pub fn entries(&self) -> &[ScenarioEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Insert or replace an entry. A replacement keeps its insertion slot;
    /// a new entry appends, evicting the oldest past `MAX_SCENARIOS`.
    pub fn save_entry(&mut self, entry: ScenarioEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == entry.name) {
            *existing = entry;
        } else {
            self.entries.push(entry);
            while self.entries.len() > MAX_SCENARIOS {
                self.entries.remove(0);
            }
        }
    }

    /// Remove an entry by name; returns whether it existed.
    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    /// Write the store back to its file.
    pub fn persist(&self) -> ValuationResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    ValuationError::DataUnavailable(format!(
                        "Failed to create '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, contents).map_err(|e| {
            ValuationError::DataUnavailable(format!(
                "Failed to write scenario store '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}
