pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod repo;
pub mod scope;
pub mod seed;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use db::{open_backend, BackendType, JsonBackend, SqliteBackend, StoreBackend};
pub use error::{Error, Result};
pub use models::{
    new_entity_id,
    ActivityLog,
    Attachment,
    Comment,
    EntityKind,
    NewActivity,
    NewNotification,
    NewProject,
    NewTask,
    NewUser,
    Notification,
    NotificationKind,
    Priority,
    Project,
    ProjectPatch,
    ProjectStatus,
    SubTask,
    Task,
    TaskPatch,
    TaskStatus,
    User,
    UserPatch,
    UserRole,
};
pub use registry::{default_data_dir, get_registry_path, resolve_data_path, Registry, Workspace};
pub use repo::{ReferencePolicy, Repository};
pub use seed::seed_dataset;
pub use session::Session;
pub use stats::{
    DashboardStats, DeadlineAdherence, HoursSummary, MemberProductivity, UPCOMING_WINDOW_DAYS,
};
pub use storage::Storage;
pub use store::{Collection, DataSet};
