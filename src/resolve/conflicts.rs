//! Conflict registry
//!
//! First-write-wins record of resolved dependencies. A dependency name is
//! bound to the first (location, revision) pair accepted for it; requesting
//! the same pair again is a no-op and requesting a different pair is fatal.

use std::collections::HashMap;

use crate::error::{Error, Result};

use super::DependencyRecord;

/// Outcome of offering a dependency to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// First time this name is seen; the caller must fetch it.
    Accepted,
    /// Already accepted with the same location and revision.
    AlreadyPresent,
}

/// Append-only set of accepted dependency records, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ConflictRegistry {
    records: Vec<DependencyRecord>,
    by_name: HashMap<String, usize>,
}

impl ConflictRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers `record` to the registry.
    ///
    /// Returns [`Error::DependencyConflict`] when the name is already bound
    /// to a different location or revision.
    pub fn accept(&mut self, record: &DependencyRecord) -> Result<Acceptance> {
        if let Some(&index) = self.by_name.get(&record.name) {
            let existing = &self.records[index];
            if existing.location == record.location && existing.revision == record.revision {
                return Ok(Acceptance::AlreadyPresent);
            }
            return Err(Error::DependencyConflict {
                existing: existing.clone(),
                requested: record.clone(),
            });
        }

        self.by_name.insert(record.name.clone(), self.records.len());
        self.records.push(record.clone());
        Ok(Acceptance::Accepted)
    }

    pub fn get(&self, name: &str) -> Option<&DependencyRecord> {
        self.by_name.get(name).map(|&index| &self.records[index])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Accepted records in acceptance order.
    pub fn iter(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.records.iter()
    }
}
