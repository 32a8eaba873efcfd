use serde::{Deserialize, Serialize};

use crate::models::{ActivityLog, Notification, Project, Task, User};

/// The five entity collections persisted by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Projects,
    Tasks,
    Notifications,
    ActivityLogs,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Projects,
        Collection::Tasks,
        Collection::Notifications,
        Collection::ActivityLogs,
    ];

    /// Storage key for this collection
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Projects => "projects",
            Collection::Tasks => "tasks",
            Collection::Notifications => "notifications",
            Collection::ActivityLogs => "activity_logs",
        }
    }
}

/// The authoritative in-memory holder of all collections for the session.
///
/// Owned exclusively by the repository; storage is a passive mirror that is
/// only read at cold start.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataSet {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub notifications: Vec<Notification>,
    pub activity_logs: Vec<ActivityLog>,
}

impl DataSet {
    /// Creates an empty data set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_id_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn project_by_id(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_by_id_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_by_id_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn notification_by_id_mut(&mut self, id: &str) -> Option<&mut Notification> {
        self.notifications.iter_mut().find(|n| n.id == id)
    }

    /// Tasks belonging to the given project
    pub fn tasks_by_project(&self, project_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .collect()
    }

    /// Tasks assigned to the given user
    pub fn tasks_by_assignee(&self, user_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.assignee_id == user_id)
            .collect()
    }

    /// Removes a user by id; returns true if one was removed
    pub fn remove_user(&mut self, id: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        self.users.len() != before
    }

    /// Removes a project by id and cascades to its tasks.
    /// Returns (project removed, number of tasks removed).
    pub fn remove_project(&mut self, id: &str) -> (bool, usize) {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return (false, 0);
        }
        let tasks_before = self.tasks.len();
        self.tasks.retain(|t| t.project_id != id);
        (true, tasks_before - self.tasks.len())
    }

    /// Removes a task by id; returns true if one was removed
    pub fn remove_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Unread notifications addressed to the given user
    pub fn unread_count(&self, user_id: &str) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        NewProject, NewTask, Priority, Project, ProjectStatus, Task, TaskStatus,
    };
    use chrono::{NaiveDate, Utc};

    fn sample_project(name: &str) -> Project {
        Project::from_new(
            NewProject {
                name: name.into(),
                description: String::new(),
                status: ProjectStatus::InProgress,
                priority: Priority::Medium,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                manager_id: "user-00000001".into(),
                team_member_ids: Vec::new(),
                budget: 0.0,
                progress: 0,
                tags: Vec::new(),
            },
            Utc::now(),
        )
    }

    fn sample_task(project_id: &str) -> Task {
        Task::from_new(
            NewTask {
                title: "T".into(),
                description: String::new(),
                status: TaskStatus::Todo,
                priority: Priority::Medium,
                project_id: project_id.into(),
                assignee_id: "user-00000002".into(),
                reporter_id: "user-00000001".into(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                due_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                estimated_hours: 4.0,
                logged_hours: 0.0,
                progress: 0,
                subtasks: Vec::new(),
                tags: Vec::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_remove_project_cascades_tasks() {
        let mut data = DataSet::new();
        let p1 = sample_project("P1");
        let p2 = sample_project("P2");
        let p1_id = p1.id.clone();
        let p2_id = p2.id.clone();
        data.projects.push(p1);
        data.projects.push(p2);
        for _ in 0..3 {
            data.tasks.push(sample_task(&p1_id));
        }
        data.tasks.push(sample_task(&p2_id));

        let (removed, cascaded) = data.remove_project(&p1_id);
        assert!(removed);
        assert_eq!(cascaded, 3);
        assert!(data.project_by_id(&p1_id).is_none());
        assert!(data.tasks_by_project(&p1_id).is_empty());
        // Other project's tasks untouched
        assert_eq!(data.tasks_by_project(&p2_id).len(), 1);
    }

    #[test]
    fn test_remove_project_missing_id() {
        let mut data = DataSet::new();
        data.projects.push(sample_project("P1"));
        let (removed, cascaded) = data.remove_project("proj-ffffffff");
        assert!(!removed);
        assert_eq!(cascaded, 0);
        assert_eq!(data.projects.len(), 1);
    }

    #[test]
    fn test_tasks_by_assignee() {
        let mut data = DataSet::new();
        let p = sample_project("P");
        let pid = p.id.clone();
        data.projects.push(p);
        let mut t = sample_task(&pid);
        t.assignee_id = "user-aaaaaaaa".into();
        data.tasks.push(t);
        data.tasks.push(sample_task(&pid));

        assert_eq!(data.tasks_by_assignee("user-aaaaaaaa").len(), 1);
        assert_eq!(data.tasks_by_assignee("user-00000002").len(), 1);
        assert!(data.tasks_by_assignee("user-bbbbbbbb").is_empty());
    }
}
