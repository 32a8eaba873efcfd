//! JSON key-value storage.
//!
//! The persisted layout is one JSON file per collection key inside a data
//! directory, plus one file for the current-session user snapshot. There is
//! no schema version field; format changes require a full reset.

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::User;

/// Storage key for the current-user session snapshot
pub const KEY_SESSION: &str = "session";

/// Handles reading and writing collection snapshots with file locking
/// for rudimentary multi-process safety.
pub struct Storage {
    dir: PathBuf,
    lock_file_path: PathBuf,
}

impl Storage {
    /// Creates a new Storage rooted at the given data directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let lock_file_path = dir.join(".lock");
        Self {
            dir,
            lock_file_path,
        }
    }

    /// Returns the data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Acquire an exclusive lock for writing.
    /// Returns the lock file handle which must be held during the operation.
    fn acquire_write_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.dir)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.lock_file_path)?;

        let start = std::time::Instant::now();
        let timeout = Duration::from_secs(5);

        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => return Ok(lock_file),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > timeout {
                        return Err(Error::Locked {
                            path: self.dir.display().to_string(),
                        });
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// True if a snapshot exists under the given key
    pub fn has_key(&self, key: &str) -> bool {
        self.file_for(key).exists()
    }

    /// Loads the collection stored under `key`, or seeds it.
    ///
    /// If no snapshot exists the seed is written and returned. A snapshot
    /// that fails to parse is an explicit malformed-state error; it is never
    /// silently replaced.
    pub fn load_collection<T>(&self, key: &str, seed: Vec<T>) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = self.file_for(key);
        if !path.exists() {
            self.save_collection(key, &seed)?;
            return Ok(seed);
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| Error::malformed(key, e))
    }

    /// Serializes the full collection under `key`
    pub fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let _lock = self.acquire_write_lock()?;
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| Error::malformed(key, e))?;
        fs::write(self.file_for(key), json)?;
        debug!(key, count = items.len(), "collection persisted");
        Ok(())
    }

    /// Loads the current-user snapshot, if any
    pub fn load_session(&self) -> Result<Option<User>> {
        let path = self.file_for(KEY_SESSION);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::malformed(KEY_SESSION, e))
    }

    /// Persists the current-user snapshot
    pub fn save_session(&self, user: &User) -> Result<()> {
        let _lock = self.acquire_write_lock()?;
        let json =
            serde_json::to_string_pretty(user).map_err(|e| Error::malformed(KEY_SESSION, e))?;
        fs::write(self.file_for(KEY_SESSION), json)?;
        Ok(())
    }

    /// Removes the current-user snapshot
    pub fn clear_session(&self) -> Result<()> {
        let path = self.file_for(KEY_SESSION);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Removes every stored key. The next load reseeds from defaults.
    pub fn reset(&self, keys: &[&str]) -> Result<()> {
        let _lock = self.acquire_write_lock()?;
        for key in keys {
            let path = self.file_for(key);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        self.clear_session()?;
        debug!(dir = %self.dir.display(), "storage reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserRole};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_user() -> User {
        User {
            id: "user-00000001".into(),
            name: "A".into(),
            email: "a@example.com".into(),
            password: "pw".into(),
            role: UserRole::Admin,
            avatar: "A".into(),
            department: "Ops".into(),
            phone: String::new(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_load_seeds_missing_key() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        let seed = vec![sample_user()];

        assert!(!storage.has_key("users"));
        let loaded = storage.load_collection("users", seed.clone()).unwrap();
        assert_eq!(loaded, seed);
        // The seed was written through
        assert!(storage.has_key("users"));
        let reloaded: Vec<User> = storage.load_collection("users", Vec::new()).unwrap();
        assert_eq!(reloaded, seed);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        let users = vec![sample_user()];
        storage.save_collection("users", &users).unwrap();
        let loaded: Vec<User> = storage.load_collection("users", Vec::new()).unwrap();
        assert_eq!(loaded, users);
    }

    #[test]
    fn test_malformed_snapshot_is_explicit_error() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("users.json"), "{not json").unwrap();

        let result: Result<Vec<User>> = storage.load_collection("users", Vec::new());
        match result {
            Err(Error::Malformed { key, .. }) => assert_eq!(key, "users"),
            other => panic!("expected Malformed error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_session_round_trip_and_clear() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        assert!(storage.load_session().unwrap().is_none());

        let user = sample_user();
        storage.save_session(&user).unwrap();
        assert_eq!(storage.load_session().unwrap(), Some(user));

        storage.clear_session().unwrap();
        assert!(storage.load_session().unwrap().is_none());
    }

    #[test]
    fn test_reset_removes_all_keys() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        storage.save_collection("users", &[sample_user()]).unwrap();
        storage.save_session(&sample_user()).unwrap();

        storage.reset(&["users"]).unwrap();
        assert!(!storage.has_key("users"));
        assert!(storage.load_session().unwrap().is_none());
    }
}
