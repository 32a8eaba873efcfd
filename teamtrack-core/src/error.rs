use thiserror::Error;

/// Error type shared across the data layer.
///
/// Missing-id and malformed-snapshot conditions are explicit variants so
/// callers can tell a no-op apart from success and a corrupt store apart
/// from an IO failure.
#[derive(Debug, Error)]
pub enum Error {
    /// An update/delete/lookup named an id that is not in the collection
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A persisted snapshot could not be deserialized; the only recovery is
    /// a full reset
    #[error("stored data under key '{key}' is malformed: {detail}")]
    Malformed { key: String, detail: String },

    /// A foreign key named an entity that does not exist (only raised under
    /// `ReferencePolicy::Enforced`)
    #[error("unknown {entity} reference: {id}")]
    UnknownReference { entity: &'static str, id: String },

    /// Login credentials did not match an active account
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The storage lock could not be acquired within the timeout
    #[error("storage is locked by another process: {path}")]
    Locked { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn malformed(key: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Error::Malformed {
            key: key.into(),
            detail: detail.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
