//! Fixed seed data used on first run and after a full reset.
//!
//! Ids and dates are deterministic so a fresh install always starts from the
//! same state.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::{
    ActivityLog, Comment, EntityKind, Notification, NotificationKind, Priority, Project,
    ProjectStatus, SubTask, Task, TaskStatus, User, UserRole,
};
use crate::store::DataSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("seed date is valid")
}

fn stamp(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

/// Builds the default data set
pub fn seed_dataset() -> DataSet {
    let users = seed_users();
    let projects = seed_projects();
    let tasks = seed_tasks();
    let notifications = seed_notifications();
    let activity_logs = seed_activity_logs();
    DataSet {
        users,
        projects,
        tasks,
        notifications,
        activity_logs,
    }
}

fn seed_users() -> Vec<User> {
    vec![
        User {
            id: "user-a1b2c3d4".into(),
            name: "Sarah Chen".into(),
            email: "sarah.chen@example.com".into(),
            password: "admin123".into(),
            role: UserRole::Admin,
            avatar: "SC".into(),
            department: "Operations".into(),
            phone: "+1-555-0101".into(),
            join_date: date(2022, 3, 14),
            is_active: true,
        },
        User {
            id: "user-b2c3d4e5".into(),
            name: "Marcus Webb".into(),
            email: "marcus.webb@example.com".into(),
            password: "manager123".into(),
            role: UserRole::ProjectManager,
            avatar: "MW".into(),
            department: "Engineering".into(),
            phone: "+1-555-0102".into(),
            join_date: date(2022, 7, 1),
            is_active: true,
        },
        User {
            id: "user-c3d4e5f6".into(),
            name: "Priya Nair".into(),
            email: "priya.nair@example.com".into(),
            password: "member123".into(),
            role: UserRole::TeamMember,
            avatar: "PN".into(),
            department: "Engineering".into(),
            phone: "+1-555-0103".into(),
            join_date: date(2023, 1, 9),
            is_active: true,
        },
        User {
            id: "user-d4e5f6a7".into(),
            name: "Tom Okafor".into(),
            email: "tom.okafor@example.com".into(),
            password: "member123".into(),
            role: UserRole::TeamMember,
            avatar: "TO".into(),
            department: "Design".into(),
            phone: "+1-555-0104".into(),
            join_date: date(2023, 5, 22),
            is_active: true,
        },
        User {
            id: "user-e5f6a7b8".into(),
            name: "Lena Fischer".into(),
            email: "lena.fischer@example.com".into(),
            password: "member123".into(),
            role: UserRole::TeamMember,
            avatar: "LF".into(),
            department: "QA".into(),
            phone: "+1-555-0105".into(),
            join_date: date(2021, 11, 2),
            is_active: false,
        },
    ]
}

fn seed_projects() -> Vec<Project> {
    vec![
        Project {
            id: "proj-11aa22bb".into(),
            name: "Website Redesign".into(),
            description: "Refresh the marketing site and unify the design system.".into(),
            status: ProjectStatus::InProgress,
            priority: Priority::High,
            start_date: date(2025, 4, 1),
            end_date: date(2025, 9, 30),
            manager_id: "user-b2c3d4e5".into(),
            team_member_ids: vec!["user-c3d4e5f6".into(), "user-d4e5f6a7".into()],
            budget: 45_000.0,
            progress: 40,
            tags: vec!["web".into(), "design".into()],
            created_at: stamp(2025, 3, 20),
            updated_at: stamp(2025, 6, 2),
        },
        Project {
            id: "proj-33cc44dd".into(),
            name: "Mobile App v2".into(),
            description: "Second major release of the companion app.".into(),
            status: ProjectStatus::InProgress,
            priority: Priority::Critical,
            start_date: date(2025, 5, 15),
            end_date: date(2025, 12, 15),
            manager_id: "user-b2c3d4e5".into(),
            team_member_ids: vec!["user-c3d4e5f6".into()],
            budget: 120_000.0,
            progress: 15,
            tags: vec!["mobile".into()],
            created_at: stamp(2025, 5, 1),
            updated_at: stamp(2025, 6, 10),
        },
        Project {
            id: "proj-55ee66ff".into(),
            name: "Internal Tooling Audit".into(),
            description: "Inventory and retire unused internal tools.".into(),
            status: ProjectStatus::NotStarted,
            priority: Priority::Low,
            start_date: date(2025, 8, 1),
            end_date: date(2025, 10, 31),
            manager_id: "user-a1b2c3d4".into(),
            team_member_ids: vec!["user-d4e5f6a7".into()],
            budget: 8_000.0,
            progress: 0,
            tags: Vec::new(),
            created_at: stamp(2025, 6, 15),
            updated_at: stamp(2025, 6, 15),
        },
    ]
}

fn seed_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "task-aa11bb22".into(),
            title: "Design homepage hero".into(),
            description: "New hero section with responsive layout.".into(),
            status: TaskStatus::InProgress,
            priority: Priority::High,
            project_id: "proj-11aa22bb".into(),
            assignee_id: "user-d4e5f6a7".into(),
            reporter_id: "user-b2c3d4e5".into(),
            start_date: date(2025, 5, 1),
            due_date: date(2025, 7, 15),
            completed_date: None,
            estimated_hours: 24.0,
            logged_hours: 10.5,
            progress: 45,
            subtasks: vec![
                SubTask {
                    id: "st-00000001".into(),
                    title: "Wireframe".into(),
                    completed: true,
                },
                SubTask {
                    id: "st-00000002".into(),
                    title: "High-fidelity mockup".into(),
                    completed: false,
                },
            ],
            comments: vec![Comment {
                id: "c-00000001".into(),
                user_id: "user-b2c3d4e5".into(),
                content: "Please keep the old nav until the menu work lands.".into(),
                created_at: stamp(2025, 5, 12),
            }],
            attachments: Vec::new(),
            tags: vec!["design".into()],
            created_at: stamp(2025, 4, 28),
            updated_at: stamp(2025, 6, 1),
        },
        Task {
            id: "task-cc33dd44".into(),
            title: "Migrate CMS content".into(),
            description: "Move articles to the new content model.".into(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            project_id: "proj-11aa22bb".into(),
            assignee_id: "user-c3d4e5f6".into(),
            reporter_id: "user-b2c3d4e5".into(),
            start_date: date(2025, 6, 1),
            due_date: date(2025, 8, 1),
            completed_date: None,
            estimated_hours: 40.0,
            logged_hours: 0.0,
            progress: 0,
            subtasks: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            tags: vec!["content".into()],
            created_at: stamp(2025, 5, 20),
            updated_at: stamp(2025, 5, 20),
        },
        Task {
            id: "task-ee55ff66".into(),
            title: "Set up CI for app builds".into(),
            description: "Signed builds on every merge to main.".into(),
            status: TaskStatus::Completed,
            priority: Priority::High,
            project_id: "proj-33cc44dd".into(),
            assignee_id: "user-c3d4e5f6".into(),
            reporter_id: "user-b2c3d4e5".into(),
            start_date: date(2025, 5, 15),
            due_date: date(2025, 6, 1),
            completed_date: Some(date(2025, 5, 30)),
            estimated_hours: 16.0,
            logged_hours: 14.0,
            progress: 100,
            subtasks: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            tags: vec!["infra".into()],
            created_at: stamp(2025, 5, 15),
            updated_at: stamp(2025, 5, 30),
        },
        Task {
            id: "task-0077aa88".into(),
            title: "Crash on offline launch".into(),
            description: "App crashes when launched without connectivity.".into(),
            status: TaskStatus::Blocked,
            priority: Priority::Critical,
            project_id: "proj-33cc44dd".into(),
            assignee_id: "user-c3d4e5f6".into(),
            reporter_id: "user-a1b2c3d4".into(),
            start_date: date(2025, 6, 5),
            due_date: date(2025, 6, 20),
            completed_date: None,
            estimated_hours: 8.0,
            logged_hours: 3.0,
            progress: 20,
            subtasks: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            tags: vec!["bug".into()],
            created_at: stamp(2025, 6, 5),
            updated_at: stamp(2025, 6, 12),
        },
    ]
}

fn seed_notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: "notif-12345678".into(),
            kind: NotificationKind::TaskAssigned,
            title: "New Task Assigned".into(),
            message: "You have been assigned to \"Migrate CMS content\" in Website Redesign."
                .into(),
            user_id: "user-c3d4e5f6".into(),
            related_id: Some("task-cc33dd44".into()),
            read: false,
            created_at: stamp(2025, 5, 20),
        },
        Notification {
            id: "notif-9abcdef0".into(),
            kind: NotificationKind::DeadlineReminder,
            title: "Deadline Approaching".into(),
            message: "\"Crash on offline launch\" is due soon.".into(),
            user_id: "user-c3d4e5f6".into(),
            related_id: Some("task-0077aa88".into()),
            read: true,
            created_at: stamp(2025, 6, 14),
        },
    ]
}

fn seed_activity_logs() -> Vec<ActivityLog> {
    vec![
        ActivityLog {
            id: "log-0f0f0f0f".into(),
            user_id: "user-b2c3d4e5".into(),
            action: "status_changed".into(),
            entity_kind: EntityKind::Task,
            entity_id: "task-ee55ff66".into(),
            details: "Changed \"Set up CI for app builds\" status to \"Completed\"".into(),
            created_at: stamp(2025, 5, 30),
        },
        ActivityLog {
            id: "log-1e1e1e1e".into(),
            user_id: "user-a1b2c3d4".into(),
            action: "created".into(),
            entity_kind: EntityKind::Project,
            entity_id: "proj-55ee66ff".into(),
            details: "Created project \"Internal Tooling Audit\"".into(),
            created_at: stamp(2025, 6, 15),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(seed_dataset(), seed_dataset());
    }

    #[test]
    fn test_seed_references_resolve() {
        let data = seed_dataset();
        for project in &data.projects {
            assert!(data.user_by_id(&project.manager_id).is_some());
            for member in &project.team_member_ids {
                assert!(data.user_by_id(member).is_some());
            }
        }
        for task in &data.tasks {
            assert!(data.project_by_id(&task.project_id).is_some());
            assert!(data.user_by_id(&task.assignee_id).is_some());
            assert!(data.user_by_id(&task.reporter_id).is_some());
        }
        for notification in &data.notifications {
            assert!(data.user_by_id(&notification.user_id).is_some());
        }
    }

    #[test]
    fn test_seed_has_every_role() {
        let data = seed_dataset();
        for role in [
            crate::models::UserRole::Admin,
            crate::models::UserRole::ProjectManager,
            crate::models::UserRole::TeamMember,
        ] {
            assert!(data.users.iter().any(|u| u.role == role));
        }
    }
}
