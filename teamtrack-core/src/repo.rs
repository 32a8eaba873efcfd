//! Repository operations.
//!
//! One mutable [`DataSet`] owned for the lifetime of the session, with
//! write-through persistence of the affected collection after every
//! mutation. The backend is constructor-injected; nothing here is a global.

use chrono::Utc;
use tracing::debug;

use crate::db::StoreBackend;
use crate::error::{Error, Result};
use crate::models::{
    ActivityLog, Comment, NewActivity, NewNotification, NewProject, NewTask, NewUser,
    Notification, Project, ProjectPatch, Task, TaskPatch, TaskStatus, User, UserPatch,
};
use crate::session::Session;
use crate::store::{Collection, DataSet};

/// Whether foreign keys are validated on add/update.
///
/// Permissive trusts the caller's pick lists to keep ids valid; Enforced is
/// the opt-in hook for stricter deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    #[default]
    Permissive,
    Enforced,
}

/// The data layer: entity collections, repository operations, and the
/// current session.
pub struct Repository {
    backend: Box<dyn StoreBackend>,
    data: DataSet,
    session: Session,
    policy: ReferencePolicy,
}

impl Repository {
    /// Opens a repository over the given backend, rehydrating collections
    /// and the session snapshot
    pub fn open(backend: Box<dyn StoreBackend>) -> Result<Self> {
        Self::open_with_policy(backend, ReferencePolicy::default())
    }

    /// Opens a repository with an explicit reference-validation policy
    pub fn open_with_policy(
        backend: Box<dyn StoreBackend>,
        policy: ReferencePolicy,
    ) -> Result<Self> {
        let data = backend.load()?;
        let session = Session::restore(backend.load_session()?);
        Ok(Self {
            backend,
            data,
            session,
            policy,
        })
    }

    /// Read access to all collections
    pub fn data(&self) -> &DataSet {
        &self.data
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn persist(&self, collection: Collection) -> Result<()> {
        self.backend.save(&self.data, collection)
    }

    fn check_user_ref(&self, id: &str) -> Result<()> {
        if self.policy == ReferencePolicy::Enforced && self.data.user_by_id(id).is_none() {
            return Err(Error::UnknownReference {
                entity: "user",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn check_project_ref(&self, id: &str) -> Result<()> {
        if self.policy == ReferencePolicy::Enforced && self.data.project_by_id(id).is_none() {
            return Err(Error::UnknownReference {
                entity: "project",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Authenticates against the user collection: exact email and password
    /// match plus an active account. The matched user becomes the session
    /// user and is snapshotted to storage.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self
            .data
            .users
            .iter()
            .find(|u| u.email == email && u.password == password && u.is_active)
            .cloned()
            .ok_or(Error::InvalidCredentials)?;
        self.backend.save_session(&user)?;
        self.session.set(user.clone());
        debug!(user = %user.id, "logged in");
        Ok(user)
    }

    /// Clears the session user and its stored snapshot
    pub fn logout(&mut self) -> Result<()> {
        self.backend.clear_session()?;
        self.session.clear();
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn users(&self) -> &[User] {
        &self.data.users
    }

    pub fn user_by_id(&self, id: &str) -> Option<&User> {
        self.data.user_by_id(id)
    }

    pub fn add_user(&mut self, new: NewUser) -> Result<User> {
        let user = User::from_new(new);
        self.data.users.push(user.clone());
        self.persist(Collection::Users)?;
        debug!(user = %user.id, "user added");
        Ok(user)
    }

    pub fn update_user(&mut self, id: &str, patch: UserPatch) -> Result<()> {
        let user = self
            .data
            .user_by_id_mut(id)
            .ok_or_else(|| Error::not_found("user", id))?;
        patch.apply(user);
        self.persist(Collection::Users)?;
        Ok(())
    }

    pub fn delete_user(&mut self, id: &str) -> Result<()> {
        if !self.data.remove_user(id) {
            return Err(Error::not_found("user", id));
        }
        self.persist(Collection::Users)?;
        debug!(user = %id, "user deleted");
        Ok(())
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub fn projects(&self) -> &[Project] {
        &self.data.projects
    }

    pub fn project_by_id(&self, id: &str) -> Option<&Project> {
        self.data.project_by_id(id)
    }

    pub fn add_project(&mut self, new: NewProject) -> Result<Project> {
        self.check_user_ref(&new.manager_id)?;
        for member in &new.team_member_ids {
            self.check_user_ref(member)?;
        }
        let project = Project::from_new(new, Utc::now());
        self.data.projects.push(project.clone());
        self.persist(Collection::Projects)?;
        debug!(project = %project.id, "project added");
        Ok(project)
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> Result<()> {
        if let Some(manager_id) = &patch.manager_id {
            self.check_user_ref(manager_id)?;
        }
        if let Some(members) = &patch.team_member_ids {
            for member in members {
                self.check_user_ref(member)?;
            }
        }
        let project = self
            .data
            .project_by_id_mut(id)
            .ok_or_else(|| Error::not_found("project", id))?;
        patch.apply(project);
        project.updated_at = Utc::now();
        self.persist(Collection::Projects)?;
        Ok(())
    }

    /// Deletes a project and cascades to every task belonging to it.
    ///
    /// The two steps are not atomic; a crash between them can leave orphaned
    /// tasks. Accepted because both writes are synchronous and
    /// near-instantaneous at this scale.
    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        let (removed, cascaded) = self.data.remove_project(id);
        if !removed {
            return Err(Error::not_found("project", id));
        }
        self.persist(Collection::Projects)?;
        self.persist(Collection::Tasks)?;
        debug!(project = %id, cascaded, "project deleted");
        Ok(())
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.data.task_by_id(id)
    }

    pub fn tasks_by_project(&self, project_id: &str) -> Vec<&Task> {
        self.data.tasks_by_project(project_id)
    }

    pub fn tasks_by_assignee(&self, user_id: &str) -> Vec<&Task> {
        self.data.tasks_by_assignee(user_id)
    }

    pub fn add_task(&mut self, new: NewTask) -> Result<Task> {
        self.check_project_ref(&new.project_id)?;
        self.check_user_ref(&new.assignee_id)?;
        self.check_user_ref(&new.reporter_id)?;
        let mut task = Task::from_new(new, Utc::now());
        // A task created directly in Completed still follows the transition
        // rules
        if task.status == TaskStatus::Completed {
            task.progress = 100;
            task.completed_date = Some(Utc::now().date_naive());
        }
        self.data.tasks.push(task.clone());
        self.persist(Collection::Tasks)?;
        debug!(task = %task.id, "task added");
        Ok(task)
    }

    /// Merges the patch into the task, applying the status transition rules:
    /// entering `Completed` forces progress to 100 and stamps the completion
    /// date; leaving `Completed` clears it. Any status may be set from any
    /// other.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        if let Some(project_id) = &patch.project_id {
            self.check_project_ref(project_id)?;
        }
        if let Some(assignee_id) = &patch.assignee_id {
            self.check_user_ref(assignee_id)?;
        }
        let task = self
            .data
            .task_by_id_mut(id)
            .ok_or_else(|| Error::not_found("task", id))?;

        let was_completed = task.status == TaskStatus::Completed;
        patch.apply(task);
        let is_completed = task.status == TaskStatus::Completed;

        if is_completed && !was_completed {
            task.progress = 100;
            task.completed_date = Some(Utc::now().date_naive());
        } else if was_completed && !is_completed {
            task.completed_date = None;
        }
        task.updated_at = Utc::now();
        self.persist(Collection::Tasks)?;
        Ok(())
    }

    /// Convenience wrapper for a bare status change
    pub fn set_task_status(&mut self, id: &str, status: TaskStatus) -> Result<()> {
        self.update_task(
            id,
            TaskPatch {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    /// Appends a comment to a task and returns it
    pub fn add_task_comment(
        &mut self,
        task_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<Comment> {
        self.check_user_ref(user_id)?;
        let task = self
            .data
            .task_by_id_mut(task_id)
            .ok_or_else(|| Error::not_found("task", task_id))?;
        let comment = Comment::new(user_id, content);
        task.comments.push(comment.clone());
        task.updated_at = Utc::now();
        self.persist(Collection::Tasks)?;
        Ok(comment)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        if !self.data.remove_task(id) {
            return Err(Error::not_found("task", id));
        }
        self.persist(Collection::Tasks)?;
        debug!(task = %id, "task deleted");
        Ok(())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn notifications(&self) -> &[Notification] {
        &self.data.notifications
    }

    /// Notifications addressed to the given user, newest first
    pub fn notifications_for(&self, user_id: &str) -> Vec<&Notification> {
        self.data
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .collect()
    }

    /// Prepends a notification (the feed is newest first)
    pub fn add_notification(&mut self, new: NewNotification) -> Result<Notification> {
        let notification = Notification::from_new(new, Utc::now());
        self.data.notifications.insert(0, notification.clone());
        self.persist(Collection::Notifications)?;
        Ok(notification)
    }

    pub fn mark_notification_read(&mut self, id: &str) -> Result<()> {
        let notification = self
            .data
            .notification_by_id_mut(id)
            .ok_or_else(|| Error::not_found("notification", id))?;
        notification.read = true;
        self.persist(Collection::Notifications)?;
        Ok(())
    }

    /// Marks every notification addressed to the user as read
    pub fn mark_all_notifications_read(&mut self, user_id: &str) -> Result<()> {
        for notification in self
            .data
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id)
        {
            notification.read = true;
        }
        self.persist(Collection::Notifications)?;
        Ok(())
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.data.unread_count(user_id)
    }

    // =========================================================================
    // Activity log
    // =========================================================================

    pub fn activity_logs(&self) -> &[ActivityLog] {
        &self.data.activity_logs
    }

    /// Prepends an audit record (the feed is newest first, append-only)
    pub fn log_activity(&mut self, new: NewActivity) -> Result<ActivityLog> {
        let entry = ActivityLog::from_new(new, Utc::now());
        self.data.activity_logs.insert(0, entry.clone());
        self.persist(Collection::ActivityLogs)?;
        Ok(entry)
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Replaces every collection with seed defaults and clears the session
    pub fn reset_to_seed(&mut self) -> Result<()> {
        self.backend.reset()?;
        self.data = self.backend.load()?;
        self.session.clear();
        debug!("repository reset to seed data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::JsonBackend;
    use crate::models::{EntityKind, NotificationKind, Priority, ProjectStatus, UserRole};
    use crate::seed::seed_dataset;
    use chrono::{Duration, NaiveDate, Utc};
    use tempfile::TempDir;

    fn open_repo(dir: &TempDir) -> Repository {
        Repository::open(Box::new(JsonBackend::new(dir.path()))).unwrap()
    }

    fn open_empty_repo(dir: &TempDir) -> Repository {
        Repository::open(Box::new(JsonBackend::with_seed(
            dir.path(),
            DataSet::new(),
        )))
        .unwrap()
    }

    fn new_user(name: &str, role: UserRole) -> NewUser {
        NewUser {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            password: "pw".into(),
            role,
            avatar: String::new(),
            department: "Eng".into(),
            phone: String::new(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
        }
    }

    fn new_project(name: &str, manager_id: &str) -> NewProject {
        NewProject {
            name: name.into(),
            description: String::new(),
            status: ProjectStatus::InProgress,
            priority: Priority::Medium,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            manager_id: manager_id.into(),
            team_member_ids: Vec::new(),
            budget: 0.0,
            progress: 0,
            tags: Vec::new(),
        }
    }

    fn new_task(title: &str, project_id: &str, assignee_id: &str, due: NaiveDate) -> NewTask {
        NewTask {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            project_id: project_id.into(),
            assignee_id: assignee_id.into(),
            reporter_id: assignee_id.into(),
            start_date: due - Duration::days(7),
            due_date: due,
            estimated_hours: 4.0,
            logged_hours: 0.0,
            progress: 0,
            subtasks: Vec::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_add_then_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);

        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        assert_eq!(repo.user_by_id(&user.id), Some(&user));

        let project = repo.add_project(new_project("P", &user.id)).unwrap();
        assert_eq!(repo.project_by_id(&project.id), Some(&project));
        assert!(project.id.starts_with("proj-"));

        let due = Utc::now().date_naive() + Duration::days(3);
        let task = repo
            .add_task(new_task("T", &project.id, &user.id, due))
            .unwrap();
        assert_eq!(repo.task_by_id(&task.id), Some(&task));
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let err = repo
            .update_project("proj-ffffffff", ProjectPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "project", .. }));

        let err = repo.delete_task("task-ffffffff").unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "task", .. }));
    }

    #[test]
    fn test_delete_project_cascades_to_its_tasks_only() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        let p1 = repo.add_project(new_project("P1", &user.id)).unwrap();
        let p2 = repo.add_project(new_project("P2", &user.id)).unwrap();
        let due = Utc::now().date_naive() + Duration::days(1);
        for i in 0..3 {
            repo.add_task(new_task(&format!("T{}", i), &p1.id, &user.id, due))
                .unwrap();
        }
        let keeper = repo.add_task(new_task("K", &p2.id, &user.id, due)).unwrap();

        repo.delete_project(&p1.id).unwrap();
        assert!(repo.project_by_id(&p1.id).is_none());
        assert!(repo.tasks_by_project(&p1.id).is_empty());
        assert_eq!(repo.task_by_id(&keeper.id), Some(&keeper));

        // The cascade survives a reload
        drop(repo);
        let repo = open_empty_repo(&dir);
        assert!(repo.tasks_by_project(&p1.id).is_empty());
        assert!(repo.task_by_id(&keeper.id).is_some());
    }

    #[test]
    fn test_completed_transition_stamps_and_clears() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        let project = repo.add_project(new_project("P", &user.id)).unwrap();
        let due = Utc::now().date_naive() + Duration::days(5);
        let task = repo
            .add_task(new_task("T", &project.id, &user.id, due))
            .unwrap();

        repo.set_task_status(&task.id, TaskStatus::Completed).unwrap();
        let task_now = repo.task_by_id(&task.id).unwrap();
        assert_eq!(task_now.progress, 100);
        assert_eq!(task_now.completed_date, Some(Utc::now().date_naive()));

        repo.set_task_status(&task.id, TaskStatus::InProgress)
            .unwrap();
        let task_now = repo.task_by_id(&task.id).unwrap();
        assert_eq!(task_now.completed_date, None);
        // Progress is left where the completion put it
        assert_eq!(task_now.progress, 100);
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        let project = repo.add_project(new_project("P", &user.id)).unwrap();

        repo.update_project(
            &project.id,
            ProjectPatch {
                progress: Some(60),
                ..Default::default()
            },
        )
        .unwrap();
        let updated = repo.project_by_id(&project.id).unwrap();
        assert_eq!(updated.progress, 60);
        assert!(updated.updated_at >= project.updated_at);
        assert_eq!(updated.created_at, project.created_at);
    }

    #[test]
    fn test_permissive_policy_accepts_dangling_refs() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        let project = repo.add_project(new_project("P", &user.id)).unwrap();
        let due = Utc::now().date_naive();
        // Nonexistent assignee is accepted by default
        let mut new = new_task("T", &project.id, "user-ffffffff", due);
        new.reporter_id = "user-ffffffff".into();
        assert!(repo.add_task(new).is_ok());
    }

    #[test]
    fn test_enforced_policy_rejects_unknown_refs() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::open_with_policy(
            Box::new(JsonBackend::with_seed(dir.path(), DataSet::new())),
            ReferencePolicy::Enforced,
        )
        .unwrap();
        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        let project = repo.add_project(new_project("P", &user.id)).unwrap();

        let due = Utc::now().date_naive();
        let err = repo
            .add_task(new_task("T", &project.id, "user-ffffffff", due))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownReference { entity: "user", .. }));

        let err = repo
            .add_project(new_project("P2", "user-ffffffff"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownReference { entity: "user", .. }));
    }

    #[test]
    fn test_login_requires_active_exact_match() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_repo(&dir);

        assert!(matches!(
            repo.login("sarah.chen@example.com", "wrong"),
            Err(Error::InvalidCredentials)
        ));
        // Inactive account, correct credentials
        assert!(matches!(
            repo.login("lena.fischer@example.com", "member123"),
            Err(Error::InvalidCredentials)
        ));

        let user = repo.login("sarah.chen@example.com", "admin123").unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(repo.session().is_authenticated());

        // Session survives a reopen
        drop(repo);
        let repo = open_repo(&dir);
        assert_eq!(
            repo.session().current_user().map(|u| u.id.as_str()),
            Some("user-a1b2c3d4")
        );
    }

    #[test]
    fn test_logout_clears_session() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_repo(&dir);
        repo.login("sarah.chen@example.com", "admin123").unwrap();
        repo.logout().unwrap();
        assert!(!repo.session().is_authenticated());

        drop(repo);
        let repo = open_repo(&dir);
        assert!(!repo.session().is_authenticated());
    }

    #[test]
    fn test_notifications_prepend_and_mark_read() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let user = repo.add_user(new_user("Ada", UserRole::TeamMember)).unwrap();

        let first = repo
            .add_notification(NewNotification {
                kind: NotificationKind::TaskAssigned,
                title: "First".into(),
                message: String::new(),
                user_id: user.id.clone(),
                related_id: None,
            })
            .unwrap();
        let second = repo
            .add_notification(NewNotification {
                kind: NotificationKind::CommentAdded,
                title: "Second".into(),
                message: String::new(),
                user_id: user.id.clone(),
                related_id: None,
            })
            .unwrap();

        // Newest first
        let feed = repo.notifications_for(&user.id);
        assert_eq!(feed[0].id, second.id);
        assert_eq!(feed[1].id, first.id);
        assert_eq!(repo.unread_count(&user.id), 2);

        repo.mark_notification_read(&second.id).unwrap();
        assert_eq!(repo.unread_count(&user.id), 1);

        repo.mark_all_notifications_read(&user.id).unwrap();
        assert_eq!(repo.unread_count(&user.id), 0);

        assert!(matches!(
            repo.mark_notification_read("notif-ffffffff"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_activity_log_prepends() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        repo.log_activity(NewActivity {
            user_id: user.id.clone(),
            action: "created".into(),
            entity_kind: EntityKind::Project,
            entity_id: "proj-00000001".into(),
            details: "Created project".into(),
        })
        .unwrap();
        repo.log_activity(NewActivity {
            user_id: user.id.clone(),
            action: "deleted".into(),
            entity_kind: EntityKind::Project,
            entity_id: "proj-00000001".into(),
            details: "Deleted project".into(),
        })
        .unwrap();
        assert_eq!(repo.activity_logs()[0].action, "deleted");
        assert_eq!(repo.activity_logs()[1].action, "created");
    }

    #[test]
    fn test_add_comment_to_task() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_empty_repo(&dir);
        let user = repo.add_user(new_user("Ada", UserRole::Admin)).unwrap();
        let project = repo.add_project(new_project("P", &user.id)).unwrap();
        let due = Utc::now().date_naive();
        let task = repo
            .add_task(new_task("T", &project.id, &user.id, due))
            .unwrap();

        let comment = repo
            .add_task_comment(&task.id, &user.id, "Looks good")
            .unwrap();
        assert!(comment.id.starts_with("c-"));
        let task_now = repo.task_by_id(&task.id).unwrap();
        assert_eq!(task_now.comments.len(), 1);
        assert_eq!(task_now.comments[0].content, "Looks good");
    }

    #[test]
    fn test_reset_restores_seed_and_clears_session() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_repo(&dir);
        repo.login("sarah.chen@example.com", "admin123").unwrap();
        let user = repo.add_user(new_user("Extra", UserRole::TeamMember)).unwrap();
        assert!(repo.user_by_id(&user.id).is_some());

        repo.reset_to_seed().unwrap();
        assert!(repo.user_by_id(&user.id).is_none());
        assert_eq!(repo.data(), &seed_dataset());
        assert!(!repo.session().is_authenticated());
    }
}
