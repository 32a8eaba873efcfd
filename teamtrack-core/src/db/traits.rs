//! Storage backend abstraction.
//!
//! This module defines the trait all persistence backends implement. The
//! repository mutates its in-memory collections and writes the affected
//! collection through after every mutation; the backend is never the source
//! of truth while a session is live, only at cold start.

use std::path::Path;

use crate::error::Result;
use crate::models::User;
use crate::store::{Collection, DataSet};

/// Types of storage backends available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// One JSON file per collection in a data directory
    Json,
    /// SQLite database storage
    Sqlite,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Json => write!(f, "JSON"),
            BackendType::Sqlite => write!(f, "SQLite"),
        }
    }
}

/// Core trait for storage backends.
///
/// `load()` rehydrates the full data set, seeding any collection that has
/// never been written. `save()` re-serializes one collection after a
/// mutation; `save_all()` is used for bulk operations like migration into a
/// fresh backend.
pub trait StoreBackend: Send + Sync {
    /// Returns the backend type
    fn backend_type(&self) -> BackendType;

    /// Returns the path to the data directory or database file
    fn path(&self) -> &Path;

    /// Loads the entire data set, seeding absent collections
    fn load(&self) -> Result<DataSet>;

    /// Persists a single collection from the given data set
    fn save(&self, data: &DataSet, collection: Collection) -> Result<()>;

    /// Persists every collection
    fn save_all(&self, data: &DataSet) -> Result<()> {
        for collection in Collection::ALL {
            self.save(data, collection)?;
        }
        Ok(())
    }

    /// Loads the current-user session snapshot, if any
    fn load_session(&self) -> Result<Option<User>>;

    /// Persists the current-user session snapshot
    fn save_session(&self, user: &User) -> Result<()>;

    /// Removes the current-user session snapshot
    fn clear_session(&self) -> Result<()>;

    /// Drops every stored key including the session; the next `load()`
    /// rehydrates from seed defaults
    fn reset(&self) -> Result<()>;
}
