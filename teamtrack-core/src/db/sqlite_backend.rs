//! SQLite database storage backend.
//!
//! Stores each collection in its own table, with nested lists serialized as
//! JSON columns. Rows are rewritten wholesale on save, matching the
//! write-through contract of the JSON backend.

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{BackendType, StoreBackend};
use crate::error::{Error, Result};
use crate::models::{
    ActivityLog, Attachment, Comment, EntityKind, Notification, NotificationKind, Priority,
    Project, ProjectStatus, SubTask, Task, TaskStatus, User, UserRole,
};
use crate::seed::seed_dataset;
use crate::store::{Collection, DataSet};

/// Current schema version
const SCHEMA_VERSION: i64 = 1;

/// SQLite backend implementation
pub struct SqliteBackend {
    path: PathBuf,
    conn: Mutex<Connection>,
    seed: DataSet,
}

impl SqliteBackend {
    /// Creates a new SQLite backend, seeding from the default data set
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_seed(path, seed_dataset())
    }

    /// Creates a backend with an explicit seed (tests, imports)
    pub fn with_seed<P: AsRef<Path>>(path: P, seed: DataSet) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let backend = Self {
            path,
            conn: Mutex::new(conn),
            seed,
        };

        backend.init_schema()?;
        Ok(backend)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(include_str!("schema.sql"))?;

        let version: i64 = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .map(|v| v.parse().unwrap_or(0))
            .unwrap_or(0);

        if version != SCHEMA_VERSION {
            return Err(Error::malformed(
                "schema_version",
                format!("database schema version {} is not {}", version, SCHEMA_VERSION),
            ));
        }

        Ok(())
    }

    fn is_seeded(conn: &Connection) -> Result<bool> {
        let seeded: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'seeded'", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(seeded.as_deref() == Some("1"))
    }

    /// Serializes nested lists to JSON for storage
    fn to_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
    }

    /// Deserializes nested lists from JSON storage
    fn from_json<T: serde::de::DeserializeOwned + Default>(json: &str) -> T {
        serde_json::from_str(json).unwrap_or_default()
    }

    fn role_to_str(role: UserRole) -> &'static str {
        match role {
            UserRole::Admin => "admin",
            UserRole::ProjectManager => "project_manager",
            UserRole::TeamMember => "team_member",
        }
    }

    fn str_to_role(s: &str) -> UserRole {
        UserRole::parse(s).unwrap_or(UserRole::TeamMember)
    }

    fn project_status_to_str(status: ProjectStatus) -> &'static str {
        match status {
            ProjectStatus::NotStarted => "not_started",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    fn str_to_project_status(s: &str) -> ProjectStatus {
        ProjectStatus::parse(s).unwrap_or(ProjectStatus::NotStarted)
    }

    fn task_status_to_str(status: TaskStatus) -> &'static str {
        match status {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::InReview => "in_review",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
        }
    }

    fn str_to_task_status(s: &str) -> TaskStatus {
        TaskStatus::parse(s).unwrap_or(TaskStatus::Todo)
    }

    fn priority_to_str(priority: Priority) -> &'static str {
        match priority {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    fn str_to_priority(s: &str) -> Priority {
        Priority::parse(s).unwrap_or(Priority::Medium)
    }

    fn kind_to_str(kind: NotificationKind) -> &'static str {
        match kind {
            NotificationKind::TaskAssigned => "task_assigned",
            NotificationKind::TaskUpdated => "task_updated",
            NotificationKind::DeadlineReminder => "deadline_reminder",
            NotificationKind::CommentAdded => "comment_added",
            NotificationKind::ProjectUpdated => "project_updated",
            NotificationKind::StatusChanged => "status_changed",
        }
    }

    fn str_to_kind(s: &str) -> NotificationKind {
        match s {
            "task_assigned" => NotificationKind::TaskAssigned,
            "task_updated" => NotificationKind::TaskUpdated,
            "deadline_reminder" => NotificationKind::DeadlineReminder,
            "comment_added" => NotificationKind::CommentAdded,
            "project_updated" => NotificationKind::ProjectUpdated,
            _ => NotificationKind::StatusChanged,
        }
    }

    fn entity_kind_to_str(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Project => "project",
            EntityKind::Task => "task",
            EntityKind::User => "user",
        }
    }

    fn str_to_entity_kind(s: &str) -> EntityKind {
        match s {
            "project" => EntityKind::Project,
            "user" => EntityKind::User,
            _ => EntityKind::Task,
        }
    }

    fn parse_date(s: &str) -> chrono::NaiveDate {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .unwrap_or_else(|_| chrono::Utc::now().date_naive())
    }

    fn parse_stamp(s: &str) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now())
    }

    fn load_users(conn: &Connection) -> Result<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, email, password, role, avatar, department, phone,
                    join_date, is_active
             FROM users ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                role: Self::str_to_role(&row.get::<_, String>(4)?),
                avatar: row.get(5)?,
                department: row.get(6)?,
                phone: row.get(7)?,
                join_date: Self::parse_date(&row.get::<_, String>(8)?),
                is_active: row.get(9)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn load_projects(conn: &Connection) -> Result<Vec<Project>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, status, priority, start_date, end_date,
                    manager_id, team_member_ids, budget, progress, tags,
                    created_at, updated_at
             FROM projects ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Project {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                status: Self::str_to_project_status(&row.get::<_, String>(3)?),
                priority: Self::str_to_priority(&row.get::<_, String>(4)?),
                start_date: Self::parse_date(&row.get::<_, String>(5)?),
                end_date: Self::parse_date(&row.get::<_, String>(6)?),
                manager_id: row.get(7)?,
                team_member_ids: Self::from_json(&row.get::<_, String>(8)?),
                budget: row.get(9)?,
                progress: row.get::<_, i64>(10)? as u32,
                tags: Self::from_json(&row.get::<_, String>(11)?),
                created_at: Self::parse_stamp(&row.get::<_, String>(12)?),
                updated_at: Self::parse_stamp(&row.get::<_, String>(13)?),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn load_tasks(conn: &Connection) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, description, status, priority, project_id, assignee_id,
                    reporter_id, start_date, due_date, completed_date, estimated_hours,
                    logged_hours, progress, subtasks, comments, attachments, tags,
                    created_at, updated_at
             FROM tasks ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            let subtasks: Vec<SubTask> = Self::from_json(&row.get::<_, String>(14)?);
            let comments: Vec<Comment> = Self::from_json(&row.get::<_, String>(15)?);
            let attachments: Vec<Attachment> = Self::from_json(&row.get::<_, String>(16)?);
            Ok(Task {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                status: Self::str_to_task_status(&row.get::<_, String>(3)?),
                priority: Self::str_to_priority(&row.get::<_, String>(4)?),
                project_id: row.get(5)?,
                assignee_id: row.get(6)?,
                reporter_id: row.get(7)?,
                start_date: Self::parse_date(&row.get::<_, String>(8)?),
                due_date: Self::parse_date(&row.get::<_, String>(9)?),
                completed_date: row
                    .get::<_, Option<String>>(10)?
                    .map(|s| Self::parse_date(&s)),
                estimated_hours: row.get(11)?,
                logged_hours: row.get(12)?,
                progress: row.get::<_, i64>(13)? as u32,
                subtasks,
                comments,
                attachments,
                tags: Self::from_json(&row.get::<_, String>(17)?),
                created_at: Self::parse_stamp(&row.get::<_, String>(18)?),
                updated_at: Self::parse_stamp(&row.get::<_, String>(19)?),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn load_notifications(conn: &Connection) -> Result<Vec<Notification>> {
        let mut stmt = conn.prepare(
            "SELECT id, kind, title, message, user_id, related_id, read, created_at
             FROM notifications ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Notification {
                id: row.get(0)?,
                kind: Self::str_to_kind(&row.get::<_, String>(1)?),
                title: row.get(2)?,
                message: row.get(3)?,
                user_id: row.get(4)?,
                related_id: row.get(5)?,
                read: row.get(6)?,
                created_at: Self::parse_stamp(&row.get::<_, String>(7)?),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn load_activity_logs(conn: &Connection) -> Result<Vec<ActivityLog>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, action, entity_kind, entity_id, details, created_at
             FROM activity_logs ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ActivityLog {
                id: row.get(0)?,
                user_id: row.get(1)?,
                action: row.get(2)?,
                entity_kind: Self::str_to_entity_kind(&row.get::<_, String>(3)?),
                entity_id: row.get(4)?,
                details: row.get(5)?,
                created_at: Self::parse_stamp(&row.get::<_, String>(6)?),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn write_users(tx: &Transaction<'_>, users: &[User]) -> Result<()> {
        tx.execute("DELETE FROM users", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO users (id, name, email, password, role, avatar, department,
                                phone, join_date, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for u in users {
            stmt.execute(params![
                u.id,
                u.name,
                u.email,
                u.password,
                Self::role_to_str(u.role),
                u.avatar,
                u.department,
                u.phone,
                u.join_date.to_string(),
                u.is_active,
            ])?;
        }
        Ok(())
    }

    fn write_projects(tx: &Transaction<'_>, projects: &[Project]) -> Result<()> {
        tx.execute("DELETE FROM projects", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO projects (id, name, description, status, priority, start_date,
                                   end_date, manager_id, team_member_ids, budget,
                                   progress, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;
        for p in projects {
            stmt.execute(params![
                p.id,
                p.name,
                p.description,
                Self::project_status_to_str(p.status),
                Self::priority_to_str(p.priority),
                p.start_date.to_string(),
                p.end_date.to_string(),
                p.manager_id,
                Self::to_json(&p.team_member_ids),
                p.budget,
                p.progress as i64,
                Self::to_json(&p.tags),
                p.created_at.to_rfc3339(),
                p.updated_at.to_rfc3339(),
            ])?;
        }
        Ok(())
    }

    fn write_tasks(tx: &Transaction<'_>, tasks: &[Task]) -> Result<()> {
        tx.execute("DELETE FROM tasks", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO tasks (id, title, description, status, priority, project_id,
                                assignee_id, reporter_id, start_date, due_date,
                                completed_date, estimated_hours, logged_hours, progress,
                                subtasks, comments, attachments, tags, created_at,
                                updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20)",
        )?;
        for t in tasks {
            stmt.execute(params![
                t.id,
                t.title,
                t.description,
                Self::task_status_to_str(t.status),
                Self::priority_to_str(t.priority),
                t.project_id,
                t.assignee_id,
                t.reporter_id,
                t.start_date.to_string(),
                t.due_date.to_string(),
                t.completed_date.map(|d| d.to_string()),
                t.estimated_hours,
                t.logged_hours,
                t.progress as i64,
                Self::to_json(&t.subtasks),
                Self::to_json(&t.comments),
                Self::to_json(&t.attachments),
                Self::to_json(&t.tags),
                t.created_at.to_rfc3339(),
                t.updated_at.to_rfc3339(),
            ])?;
        }
        Ok(())
    }

    fn write_notifications(tx: &Transaction<'_>, notifications: &[Notification]) -> Result<()> {
        tx.execute("DELETE FROM notifications", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO notifications (id, kind, title, message, user_id, related_id,
                                        read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for n in notifications {
            stmt.execute(params![
                n.id,
                Self::kind_to_str(n.kind),
                n.title,
                n.message,
                n.user_id,
                n.related_id,
                n.read,
                n.created_at.to_rfc3339(),
            ])?;
        }
        Ok(())
    }

    fn write_activity_logs(tx: &Transaction<'_>, logs: &[ActivityLog]) -> Result<()> {
        tx.execute("DELETE FROM activity_logs", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO activity_logs (id, user_id, action, entity_kind, entity_id,
                                        details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for l in logs {
            stmt.execute(params![
                l.id,
                l.user_id,
                l.action,
                Self::entity_kind_to_str(l.entity_kind),
                l.entity_id,
                l.details,
                l.created_at.to_rfc3339(),
            ])?;
        }
        Ok(())
    }

    fn write_collection(
        tx: &Transaction<'_>,
        data: &DataSet,
        collection: Collection,
    ) -> Result<()> {
        match collection {
            Collection::Users => Self::write_users(tx, &data.users),
            Collection::Projects => Self::write_projects(tx, &data.projects),
            Collection::Tasks => Self::write_tasks(tx, &data.tasks),
            Collection::Notifications => Self::write_notifications(tx, &data.notifications),
            Collection::ActivityLogs => Self::write_activity_logs(tx, &data.activity_logs),
        }
    }
}

impl StoreBackend for SqliteBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Sqlite
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<DataSet> {
        let mut conn = self.conn.lock().unwrap();

        if !Self::is_seeded(&conn)? {
            let tx = conn.transaction()?;
            for collection in Collection::ALL {
                Self::write_collection(&tx, &self.seed, collection)?;
            }
            tx.execute("UPDATE meta SET value = '1' WHERE key = 'seeded'", [])?;
            tx.commit()?;
            return Ok(self.seed.clone());
        }

        Ok(DataSet {
            users: Self::load_users(&conn)?,
            projects: Self::load_projects(&conn)?,
            tasks: Self::load_tasks(&conn)?,
            notifications: Self::load_notifications(&conn)?,
            activity_logs: Self::load_activity_logs(&conn)?,
        })
    }

    fn save(&self, data: &DataSet, collection: Collection) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        Self::write_collection(&tx, data, collection)?;
        tx.commit()?;
        Ok(())
    }

    fn save_all(&self, data: &DataSet) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for collection in Collection::ALL {
            Self::write_collection(&tx, data, collection)?;
        }
        tx.execute("UPDATE meta SET value = '1' WHERE key = 'seeded'", [])?;
        tx.commit()?;
        Ok(())
    }

    fn load_session(&self) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let json: Option<String> = conn
            .query_row("SELECT user_json FROM session WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        match json {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| Error::malformed("session", e)),
            None => Ok(None),
        }
    }

    fn save_session(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(user).map_err(|e| Error::malformed("session", e))?;
        conn.execute(
            "INSERT INTO session (id, user_json) VALUES (1, ?1)
             ON CONFLICT (id) DO UPDATE SET user_json = excluded.user_json",
            params![json],
        )?;
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM session", [])?;
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for table in [
            "users",
            "projects",
            "tasks",
            "notifications",
            "activity_logs",
            "session",
        ] {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }
        tx.execute("UPDATE meta SET value = '0' WHERE key = 'seeded'", [])?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_seeds_defaults() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteBackend::new(dir.path().join("test.db")).unwrap();
        let data = backend.load().unwrap();
        assert_eq!(data, seed_dataset());
        // A second load reads the tables, not the seed path
        let again = backend.load().unwrap();
        assert_eq!(again, data);
    }

    #[test]
    fn test_dataset_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteBackend::new(dir.path().join("test.db")).unwrap();
        let mut data = backend.load().unwrap();

        data.tasks[0].comments.push(Comment::new(
            "user-a1b2c3d4",
            "Round trip me",
        ));
        data.notifications.retain(|n| n.read);
        backend.save(&data, Collection::Tasks).unwrap();
        backend.save(&data, Collection::Notifications).unwrap();

        let reloaded = backend.load().unwrap();
        assert_eq!(reloaded.tasks, data.tasks);
        assert_eq!(reloaded.notifications, data.notifications);
    }

    #[test]
    fn test_session_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteBackend::new(dir.path().join("test.db")).unwrap();
        assert!(backend.load_session().unwrap().is_none());

        let data = backend.load().unwrap();
        backend.save_session(&data.users[0]).unwrap();
        assert_eq!(backend.load_session().unwrap(), Some(data.users[0].clone()));

        backend.clear_session().unwrap();
        assert!(backend.load_session().unwrap().is_none());
    }

    #[test]
    fn test_reset_then_load_reseeds() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteBackend::new(dir.path().join("test.db")).unwrap();
        let mut data = backend.load().unwrap();
        data.projects.clear();
        backend.save(&data, Collection::Projects).unwrap();

        backend.reset().unwrap();
        let reloaded = backend.load().unwrap();
        assert_eq!(reloaded, seed_dataset());
    }

    #[test]
    fn test_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteBackend::new(dir.path().join("test.db")).unwrap();
        let data = backend.load().unwrap();
        let ids: Vec<&str> = data.notifications.iter().map(|n| n.id.as_str()).collect();
        let reloaded = backend.load().unwrap();
        let reloaded_ids: Vec<&str> = reloaded
            .notifications
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, reloaded_ids);
    }
}
