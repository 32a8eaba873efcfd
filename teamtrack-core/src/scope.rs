//! Role-based visibility.
//!
//! One canonical predicate pair, applied wherever lists are surfaced, so
//! every view agrees on what a user can see:
//!
//! - admin: everything
//! - project_manager: projects they manage or belong to as a team member,
//!   and the tasks inside those projects
//! - team_member: projects they belong to, and tasks assigned to them

use crate::models::{Project, Task, User, UserRole};

/// True when the given user can see the project
pub fn project_visible(user: &User, project: &Project) -> bool {
    match user.role {
        UserRole::Admin => true,
        UserRole::ProjectManager => {
            project.manager_id == user.id || project.team_member_ids.contains(&user.id)
        }
        UserRole::TeamMember => project.team_member_ids.contains(&user.id),
    }
}

/// True when the given user can see the task
pub fn task_visible(user: &User, task: &Task, projects: &[Project]) -> bool {
    match user.role {
        UserRole::Admin => true,
        UserRole::ProjectManager => projects
            .iter()
            .find(|p| p.id == task.project_id)
            .map(|p| project_visible(user, p))
            .unwrap_or(false),
        UserRole::TeamMember => task.assignee_id == user.id,
    }
}

/// Projects visible to the user
pub fn visible_projects(user: &User, projects: &[Project]) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| project_visible(user, p))
        .cloned()
        .collect()
}

/// Tasks visible to the user
pub fn visible_tasks(user: &User, projects: &[Project], tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| task_visible(user, t, projects))
        .cloned()
        .collect()
}
