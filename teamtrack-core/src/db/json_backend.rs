//! JSON directory storage backend.
//!
//! The canonical persisted layout: one JSON array per collection key, plus a
//! session snapshot, inside a data directory. Wraps [`Storage`] to implement
//! the [`StoreBackend`] trait.

use std::path::{Path, PathBuf};

use super::traits::{BackendType, StoreBackend};
use crate::error::Result;
use crate::models::User;
use crate::seed::seed_dataset;
use crate::storage::Storage;
use crate::store::{Collection, DataSet};

/// JSON directory backend implementation
pub struct JsonBackend {
    storage: Storage,
    dir: PathBuf,
    seed: DataSet,
}

impl JsonBackend {
    /// Creates a backend over the given data directory, seeding from the
    /// default data set
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_seed(dir, seed_dataset())
    }

    /// Creates a backend with an explicit seed (tests, imports)
    pub fn with_seed<P: AsRef<Path>>(dir: P, seed: DataSet) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            storage: Storage::new(&dir),
            dir,
            seed,
        }
    }

    /// Gets a reference to the underlying Storage
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl StoreBackend for JsonBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Json
    }

    fn path(&self) -> &Path {
        &self.dir
    }

    fn load(&self) -> Result<DataSet> {
        Ok(DataSet {
            users: self
                .storage
                .load_collection(Collection::Users.key(), self.seed.users.clone())?,
            projects: self
                .storage
                .load_collection(Collection::Projects.key(), self.seed.projects.clone())?,
            tasks: self
                .storage
                .load_collection(Collection::Tasks.key(), self.seed.tasks.clone())?,
            notifications: self.storage.load_collection(
                Collection::Notifications.key(),
                self.seed.notifications.clone(),
            )?,
            activity_logs: self.storage.load_collection(
                Collection::ActivityLogs.key(),
                self.seed.activity_logs.clone(),
            )?,
        })
    }

    fn save(&self, data: &DataSet, collection: Collection) -> Result<()> {
        match collection {
            Collection::Users => self.storage.save_collection(collection.key(), &data.users),
            Collection::Projects => self
                .storage
                .save_collection(collection.key(), &data.projects),
            Collection::Tasks => self.storage.save_collection(collection.key(), &data.tasks),
            Collection::Notifications => self
                .storage
                .save_collection(collection.key(), &data.notifications),
            Collection::ActivityLogs => self
                .storage
                .save_collection(collection.key(), &data.activity_logs),
        }
    }

    fn load_session(&self) -> Result<Option<User>> {
        self.storage.load_session()
    }

    fn save_session(&self, user: &User) -> Result<()> {
        self.storage.save_session(user)
    }

    fn clear_session(&self) -> Result<()> {
        self.storage.clear_session()
    }

    fn reset(&self) -> Result<()> {
        let keys: Vec<&str> = Collection::ALL.iter().map(|c| c.key()).collect();
        self.storage.reset(&keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewProject, Priority, Project, ProjectStatus};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_first_load_seeds_defaults() {
        let dir = TempDir::new().unwrap();
        let backend = JsonBackend::new(dir.path());

        let data = backend.load().unwrap();
        assert_eq!(data, seed_dataset());
        // Every collection key was written through
        for collection in Collection::ALL {
            assert!(backend.storage().has_key(collection.key()));
        }
    }

    #[test]
    fn test_save_one_collection_leaves_others() {
        let dir = TempDir::new().unwrap();
        let backend = JsonBackend::new(dir.path());
        let mut data = backend.load().unwrap();

        data.projects.push(Project::from_new(
            NewProject {
                name: "Extra".into(),
                description: String::new(),
                status: ProjectStatus::NotStarted,
                priority: Priority::Low,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                manager_id: "user-a1b2c3d4".into(),
                team_member_ids: Vec::new(),
                budget: 0.0,
                progress: 0,
                tags: Vec::new(),
            },
            Utc::now(),
        ));
        backend.save(&data, Collection::Projects).unwrap();

        let reloaded = backend.load().unwrap();
        assert_eq!(reloaded.projects, data.projects);
        assert_eq!(reloaded.tasks, data.tasks);
    }

    #[test]
    fn test_reset_then_load_reseeds() {
        let dir = TempDir::new().unwrap();
        let backend = JsonBackend::new(dir.path());
        let mut data = backend.load().unwrap();
        data.users.clear();
        backend.save(&data, Collection::Users).unwrap();

        backend.reset().unwrap();
        let reloaded = backend.load().unwrap();
        assert_eq!(reloaded, seed_dataset());
    }
}
