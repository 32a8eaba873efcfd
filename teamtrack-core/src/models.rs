use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Id prefix for users
pub const ID_PREFIX_USER: &str = "user";
/// Id prefix for projects
pub const ID_PREFIX_PROJECT: &str = "proj";
/// Id prefix for tasks
pub const ID_PREFIX_TASK: &str = "task";
/// Id prefix for notifications
pub const ID_PREFIX_NOTIFICATION: &str = "notif";
/// Id prefix for activity log entries
pub const ID_PREFIX_ACTIVITY: &str = "log";
/// Id prefix for subtasks
pub const ID_PREFIX_SUBTASK: &str = "st";
/// Id prefix for comments
pub const ID_PREFIX_COMMENT: &str = "c";
/// Id prefix for attachments
pub const ID_PREFIX_ATTACHMENT: &str = "att";

/// Generates a new entity id: a human-readable prefix followed by the first
/// eight hex characters of a v4 UUID. Collision resistance is best-effort,
/// not guaranteed.
pub fn new_entity_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &hex[..8])
}

/// Role of a user account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    ProjectManager,
    TeamMember,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "Admin"),
            UserRole::ProjectManager => write!(f, "Project Manager"),
            UserRole::TeamMember => write!(f, "Team Member"),
        }
    }
}

impl UserRole {
    /// Parse a role from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "project_manager" | "pm" | "manager" => Some(UserRole::ProjectManager),
            "team_member" | "member" => Some(UserRole::TeamMember),
            _ => None,
        }
    }
}

/// Status of a project
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::NotStarted,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    /// Parse a project status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "not_started" | "notstarted" => Some(ProjectStatus::NotStarted),
            "in_progress" | "inprogress" => Some(ProjectStatus::InProgress),
            "on_hold" | "onhold" => Some(ProjectStatus::OnHold),
            "completed" => Some(ProjectStatus::Completed),
            "cancelled" | "canceled" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::NotStarted => write!(f, "Not Started"),
            ProjectStatus::InProgress => write!(f, "In Progress"),
            ProjectStatus::OnHold => write!(f, "On Hold"),
            ProjectStatus::Completed => write!(f, "Completed"),
            ProjectStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    InReview,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Completed,
        TaskStatus::Blocked,
    ];

    /// Parse a task status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "todo" | "to_do" => Some(TaskStatus::Todo),
            "in_progress" | "inprogress" => Some(TaskStatus::InProgress),
            "in_review" | "inreview" | "review" => Some(TaskStatus::InReview),
            "completed" | "done" => Some(TaskStatus::Completed),
            "blocked" => Some(TaskStatus::Blocked),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "Todo"),
            TaskStatus::InProgress => write!(f, "In Progress"),
            TaskStatus::InReview => write!(f, "In Review"),
            TaskStatus::Completed => write!(f, "Completed"),
            TaskStatus::Blocked => write!(f, "Blocked"),
        }
    }
}

/// Priority shared by projects and tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Parse a priority from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
            Priority::Critical => write!(f, "Critical"),
        }
    }
}

/// Category of a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    TaskUpdated,
    DeadlineReminder,
    CommentAdded,
    ProjectUpdated,
    StatusChanged,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::TaskAssigned => write!(f, "Task Assigned"),
            NotificationKind::TaskUpdated => write!(f, "Task Updated"),
            NotificationKind::DeadlineReminder => write!(f, "Deadline Reminder"),
            NotificationKind::CommentAdded => write!(f, "Comment Added"),
            NotificationKind::ProjectUpdated => write!(f, "Project Updated"),
            NotificationKind::StatusChanged => write!(f, "Status Changed"),
        }
    }
}

/// Kind of entity an activity log entry refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Task,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Task => write!(f, "task"),
            EntityKind::User => write!(f, "user"),
        }
    }
}

/// A user account
///
/// Credentials are a plaintext email/password pair matched against this
/// record at login; there is no hashing or token issuance. This mirrors a
/// single-user local tool and is not a security boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub avatar: String,
    pub department: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub is_active: bool,
}

/// Fields needed to create a user; the id is assigned by the repository
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub avatar: String,
    pub department: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub is_active: bool,
}

impl User {
    pub(crate) fn from_new(new: NewUser) -> Self {
        Self {
            id: new_entity_id(ID_PREFIX_USER),
            name: new.name,
            email: new.email,
            password: new.password,
            role: new.role,
            avatar: new.avatar,
            department: new.department,
            phone: new.phone,
            join_date: new.join_date,
            is_active: new.is_active,
        }
    }
}

/// Partial update for a user; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl UserPatch {
    pub(crate) fn apply(self, user: &mut User) {
        if let Some(v) = self.name {
            user.name = v;
        }
        if let Some(v) = self.email {
            user.email = v;
        }
        if let Some(v) = self.password {
            user.password = v;
        }
        if let Some(v) = self.role {
            user.role = v;
        }
        if let Some(v) = self.avatar {
            user.avatar = v;
        }
        if let Some(v) = self.department {
            user.department = v;
        }
        if let Some(v) = self.phone {
            user.phone = v;
        }
        if let Some(v) = self.is_active {
            user.is_active = v;
        }
    }
}

/// A managed unit of work owning zero or more tasks by foreign key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Owning manager (user id)
    pub manager_id: String,
    /// Assigned team members (user ids)
    pub team_member_ids: Vec<String>,
    pub budget: f64,
    /// Manually tracked progress, 0-100
    pub progress: u32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a project; id and timestamps are stamped by the
/// repository
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub manager_id: String,
    pub team_member_ids: Vec<String>,
    pub budget: f64,
    pub progress: u32,
    pub tags: Vec<String>,
}

impl Project {
    pub(crate) fn from_new(new: NewProject, now: DateTime<Utc>) -> Self {
        Self {
            id: new_entity_id(ID_PREFIX_PROJECT),
            name: new.name,
            description: new.description,
            status: new.status,
            priority: new.priority,
            start_date: new.start_date,
            end_date: new.end_date,
            manager_id: new.manager_id,
            team_member_ids: new.team_member_ids,
            budget: new.budget,
            progress: new.progress.min(100),
            tags: new.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a project
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<String>,
    pub team_member_ids: Option<Vec<String>>,
    pub budget: Option<f64>,
    pub progress: Option<u32>,
    pub tags: Option<Vec<String>>,
}

impl ProjectPatch {
    pub(crate) fn apply(self, project: &mut Project) {
        if let Some(v) = self.name {
            project.name = v;
        }
        if let Some(v) = self.description {
            project.description = v;
        }
        if let Some(v) = self.status {
            project.status = v;
        }
        if let Some(v) = self.priority {
            project.priority = v;
        }
        if let Some(v) = self.start_date {
            project.start_date = v;
        }
        if let Some(v) = self.end_date {
            project.end_date = v;
        }
        if let Some(v) = self.manager_id {
            project.manager_id = v;
        }
        if let Some(v) = self.team_member_ids {
            project.team_member_ids = v;
        }
        if let Some(v) = self.budget {
            project.budget = v;
        }
        if let Some(v) = self.progress {
            project.progress = v.min(100);
        }
        if let Some(v) = self.tags {
            project.tags = v;
        }
    }
}

/// An ordered checklist item embedded in a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubTask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl SubTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(ID_PREFIX_SUBTASK),
            title: title.into(),
            completed: false,
        }
    }
}

/// A comment on a task, attributed to a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(ID_PREFIX_COMMENT),
            user_id: user_id.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Metadata for a file attached to a task; the file itself lives elsewhere
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub url: String,
}

/// A unit of work belonging to exactly one project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub project_id: String,
    pub assignee_id: String,
    pub reporter_id: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Set when the task enters `Completed`, cleared when it leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    pub estimated_hours: f64,
    pub logged_hours: f64,
    /// 0-100
    pub progress: u32,
    pub subtasks: Vec<SubTask>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a task; id and timestamps are stamped by the
/// repository
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub project_id: String,
    pub assignee_id: String,
    pub reporter_id: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub estimated_hours: f64,
    pub logged_hours: f64,
    pub progress: u32,
    pub subtasks: Vec<SubTask>,
    pub tags: Vec<String>,
}

impl Task {
    pub(crate) fn from_new(new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id: new_entity_id(ID_PREFIX_TASK),
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            project_id: new.project_id,
            assignee_id: new.assignee_id,
            reporter_id: new.reporter_id,
            start_date: new.start_date,
            due_date: new.due_date,
            completed_date: None,
            estimated_hours: new.estimated_hours,
            logged_hours: new.logged_hours,
            progress: new.progress.min(100),
            subtasks: new.subtasks,
            comments: Vec::new(),
            attachments: Vec::new(),
            tags: new.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the task is past due and not yet completed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date < today
    }
}

/// Partial update for a task
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub logged_hours: Option<f64>,
    pub progress: Option<u32>,
    pub subtasks: Option<Vec<SubTask>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(v) = self.title {
            task.title = v;
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.status {
            task.status = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.project_id {
            task.project_id = v;
        }
        if let Some(v) = self.assignee_id {
            task.assignee_id = v;
        }
        if let Some(v) = self.start_date {
            task.start_date = v;
        }
        if let Some(v) = self.due_date {
            task.due_date = v;
        }
        if let Some(v) = self.estimated_hours {
            task.estimated_hours = v;
        }
        if let Some(v) = self.logged_hours {
            task.logged_hours = v;
        }
        if let Some(v) = self.progress {
            task.progress = v.min(100);
        }
        if let Some(v) = self.subtasks {
            task.subtasks = v;
        }
        if let Some(v) = self.tags {
            task.tags = v;
        }
    }
}

/// A message addressed to one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub user_id: String,
    /// Id of the entity this notification refers to, if any. The target may
    /// have been deleted since; lookups must tolerate a missing entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub user_id: String,
    pub related_id: Option<String>,
}

impl Notification {
    pub(crate) fn from_new(new: NewNotification, now: DateTime<Utc>) -> Self {
        Self {
            id: new_entity_id(ID_PREFIX_NOTIFICATION),
            kind: new.kind,
            title: new.title,
            message: new.message,
            user_id: new.user_id,
            related_id: new.related_id,
            read: false,
            created_at: now,
        }
    }
}

/// An append-only audit record of a mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to record an activity log entry
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: String,
    pub action: String,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub details: String,
}

impl ActivityLog {
    pub(crate) fn from_new(new: NewActivity, now: DateTime<Utc>) -> Self {
        Self {
            id: new_entity_id(ID_PREFIX_ACTIVITY),
            user_id: new.user_id,
            action: new.action,
            entity_kind: new.entity_kind,
            entity_id: new.entity_id,
            details: new.details,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_id_format() {
        let id = new_entity_id(ID_PREFIX_TASK);
        assert!(id.starts_with("task-"));
        let suffix = &id["task-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_new_entity_ids_differ() {
        let a = new_entity_id(ID_PREFIX_PROJECT);
        let b = new_entity_id(ID_PREFIX_PROJECT);
        assert_ne!(a, b);
    }

    #[test]
    fn test_status_parse_round_trip() {
        assert_eq!(TaskStatus::parse("in_review"), Some(TaskStatus::InReview));
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("nonsense"), None);
        assert_eq!(
            ProjectStatus::parse("on_hold"),
            Some(ProjectStatus::OnHold)
        );
        assert_eq!(Priority::parse("critical"), Some(Priority::Critical));
        assert_eq!(UserRole::parse("pm"), Some(UserRole::ProjectManager));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let json = serde_json::to_string(&ProjectStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
        let json = serde_json::to_string(&NotificationKind::TaskAssigned).unwrap();
        assert_eq!(json, "\"task_assigned\"");
    }

    #[test]
    fn test_is_overdue_excludes_completed() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let mut task = Task::from_new(
            NewTask {
                title: "T".into(),
                description: String::new(),
                status: TaskStatus::Todo,
                priority: Priority::Medium,
                project_id: "proj-00000000".into(),
                assignee_id: "user-00000000".into(),
                reporter_id: "user-00000000".into(),
                start_date: today,
                due_date: today.pred_opt().unwrap(),
                estimated_hours: 1.0,
                logged_hours: 0.0,
                progress: 0,
                subtasks: Vec::new(),
                tags: Vec::new(),
            },
            Utc::now(),
        );
        assert!(task.is_overdue(today));
        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn test_project_patch_merges_only_set_fields() {
        let now = Utc::now();
        let mut project = Project::from_new(
            NewProject {
                name: "Alpha".into(),
                description: "d".into(),
                status: ProjectStatus::NotStarted,
                priority: Priority::Low,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                manager_id: "user-00000001".into(),
                team_member_ids: vec!["user-00000002".into()],
                budget: 1000.0,
                progress: 0,
                tags: Vec::new(),
            },
            now,
        );
        ProjectPatch {
            status: Some(ProjectStatus::InProgress),
            progress: Some(250),
            ..Default::default()
        }
        .apply(&mut project);
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.progress, 100); // clamped
        assert_eq!(project.name, "Alpha");
        assert_eq!(project.team_member_ids, vec!["user-00000002".to_string()]);
    }
}
