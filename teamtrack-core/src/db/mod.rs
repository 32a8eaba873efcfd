//! Storage backend layer.
//!
//! Provides a trait-based abstraction over persistence so the repository can
//! run against a JSON data directory or a SQLite database file through one
//! interface.

mod json_backend;
mod sqlite_backend;
mod traits;

pub use json_backend::JsonBackend;
pub use sqlite_backend::SqliteBackend;
pub use traits::{BackendType, StoreBackend};

use std::path::Path;

use crate::error::Result;

/// Creates a storage backend based on the path's extension or an explicit
/// type: `.db`/`.sqlite`/`.sqlite3` selects SQLite, anything else is treated
/// as a JSON data directory.
pub fn open_backend(path: &Path, backend_type: Option<BackendType>) -> Result<Box<dyn StoreBackend>> {
    let bt = backend_type.unwrap_or_else(|| {
        match path.extension().and_then(|e| e.to_str()) {
            Some("db") | Some("sqlite") | Some("sqlite3") => BackendType::Sqlite,
            _ => BackendType::Json,
        }
    });

    match bt {
        BackendType::Json => Ok(Box::new(JsonBackend::new(path))),
        BackendType::Sqlite => Ok(Box::new(SqliteBackend::new(path)?)),
    }
}
