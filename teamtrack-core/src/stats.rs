//! Aggregation functions.
//!
//! Pure, side-effect-free derived views over the entity collections. Time
//! enters only through an explicit `today` argument so results are
//! reproducible.

use chrono::NaiveDate;

use crate::models::{Priority, Project, ProjectStatus, Task, TaskStatus, User};

/// Window, in days, for the "upcoming deadlines" count (inclusive of today)
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub team_members: usize,
    pub upcoming_deadlines: usize,
    /// Mean of project progress values, rounded; 0 when there are none
    pub project_progress: u32,
}

/// Estimated/logged hour roll-up for a task set
#[derive(Debug, Clone, PartialEq)]
pub struct HoursSummary {
    pub estimated: f64,
    pub logged: f64,
    /// logged/estimated as a rounded percentage; 0 when nothing is estimated
    pub efficiency_pct: u32,
}

/// Completed-to-assigned ratio for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProductivity {
    pub user_id: String,
    pub name: String,
    pub completed: usize,
    pub total: usize,
    /// completed/total as a rounded percentage; 0 when nothing is assigned
    pub rate_pct: u32,
}

/// On-time vs late split of completed tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineAdherence {
    pub on_time: usize,
    pub late: usize,
    /// on_time over completed count; 100 when nothing is completed yet
    pub adherence_pct: u32,
}

fn pct(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        0
    } else {
        (numerator as f64 * 100.0 / denominator as f64).round() as u32
    }
}

/// Overdue: past due and not completed. A completed task is never overdue
/// no matter its due date.
pub fn overdue_count(tasks: &[Task], today: NaiveDate) -> usize {
    tasks.iter().filter(|t| t.is_overdue(today)).count()
}

/// Due within the next [`UPCOMING_WINDOW_DAYS`] days inclusive of today and
/// not completed
pub fn upcoming_deadline_count(tasks: &[Task], today: NaiveDate) -> usize {
    tasks
        .iter()
        .filter(|t| {
            let days = (t.due_date - today).num_days();
            t.status != TaskStatus::Completed && (0..=UPCOMING_WINDOW_DAYS).contains(&days)
        })
        .count()
}

/// Headline dashboard numbers over an already role-scoped project/task set.
/// `users` is the full user collection (the team-member count is global).
pub fn dashboard_stats(
    projects: &[Project],
    tasks: &[Task],
    users: &[User],
    today: NaiveDate,
) -> DashboardStats {
    let total_progress: u32 = projects.iter().map(|p| p.progress).sum();
    DashboardStats {
        total_projects: projects.len(),
        active_projects: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::InProgress)
            .count(),
        total_tasks: tasks.len(),
        completed_tasks: tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count(),
        overdue_tasks: overdue_count(tasks, today),
        team_members: users.iter().filter(|u| u.is_active).count(),
        upcoming_deadlines: upcoming_deadline_count(tasks, today),
        project_progress: if projects.is_empty() {
            0
        } else {
            (total_progress as f64 / projects.len() as f64).round() as u32
        },
    }
}

/// Task counts bucketed by status, in declaration order
pub fn task_status_breakdown(tasks: &[Task]) -> Vec<(TaskStatus, usize)> {
    TaskStatus::ALL
        .iter()
        .map(|&status| {
            (
                status,
                tasks.iter().filter(|t| t.status == status).count(),
            )
        })
        .collect()
}

/// Task counts bucketed by priority, highest first
pub fn task_priority_breakdown(tasks: &[Task]) -> Vec<(Priority, usize)> {
    Priority::ALL
        .iter()
        .map(|&priority| {
            (
                priority,
                tasks.iter().filter(|t| t.priority == priority).count(),
            )
        })
        .collect()
}

/// Sums estimated and logged hours; efficiency defaults to 0 when nothing
/// is estimated
pub fn hours_summary(tasks: &[Task]) -> HoursSummary {
    let estimated: f64 = tasks.iter().map(|t| t.estimated_hours).sum();
    let logged: f64 = tasks.iter().map(|t| t.logged_hours).sum();
    let efficiency_pct = if estimated > 0.0 {
        (logged * 100.0 / estimated).round() as u32
    } else {
        0
    };
    HoursSummary {
        estimated,
        logged,
        efficiency_pct,
    }
}

/// Completed tasks over total, as a rounded percentage; 0 when empty
pub fn completion_rate(tasks: &[Task]) -> u32 {
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    pct(completed, tasks.len())
}

/// Mean of task progress values, rounded; 0 when empty
pub fn average_progress(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let total: u32 = tasks.iter().map(|t| t.progress).sum();
    (total as f64 / tasks.len() as f64).round() as u32
}

/// Progress of one project derived from its task completion ratio, falling
/// back to the manually tracked value when it has no tasks
pub fn project_task_progress(project: &Project, project_tasks: &[Task]) -> u32 {
    if project_tasks.is_empty() {
        return project.progress;
    }
    let completed = project_tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    pct(completed, project_tasks.len())
}

/// Per-assignee completion ratios over the given task set, sorted by rate
/// descending. Assignees missing from `users` are reported as "Unknown".
pub fn member_productivity(tasks: &[Task], users: &[User]) -> Vec<MemberProductivity> {
    let mut assignee_ids: Vec<&str> = Vec::new();
    for task in tasks {
        if !assignee_ids.contains(&task.assignee_id.as_str()) {
            assignee_ids.push(&task.assignee_id);
        }
    }

    let mut rows: Vec<MemberProductivity> = assignee_ids
        .into_iter()
        .map(|id| {
            let user_tasks: Vec<&Task> = tasks.iter().filter(|t| t.assignee_id == id).collect();
            let completed = user_tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count();
            let name = users
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            MemberProductivity {
                user_id: id.to_string(),
                name,
                completed,
                total: user_tasks.len(),
                rate_pct: pct(completed, user_tasks.len()),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.rate_pct.cmp(&a.rate_pct));
    rows
}

/// On-time vs late among completed tasks that carry a completion date.
/// No completed tasks means nothing was late: adherence defaults to 100.
pub fn deadline_adherence(tasks: &[Task]) -> DeadlineAdherence {
    let completed: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed && t.completed_date.is_some())
        .collect();
    let on_time = completed
        .iter()
        .filter(|t| t.completed_date.map(|d| d <= t.due_date).unwrap_or(false))
        .count();
    let late = completed.len() - on_time;
    let adherence_pct = if completed.is_empty() {
        100
    } else {
        pct(on_time, completed.len())
    };
    DeadlineAdherence {
        on_time,
        late,
        adherence_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewProject, NewTask, UserRole};
    use crate::scope;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.into(),
            name: id.into(),
            email: format!("{}@example.com", id),
            password: "pw".into(),
            role,
            avatar: String::new(),
            department: String::new(),
            phone: String::new(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
        }
    }

    fn project(manager_id: &str, members: &[&str]) -> Project {
        Project::from_new(
            NewProject {
                name: "P".into(),
                description: String::new(),
                status: ProjectStatus::InProgress,
                priority: Priority::Medium,
                start_date: today() - Duration::days(30),
                end_date: today() + Duration::days(30),
                manager_id: manager_id.into(),
                team_member_ids: members.iter().map(|m| m.to_string()).collect(),
                budget: 0.0,
                progress: 50,
                tags: Vec::new(),
            },
            Utc::now(),
        )
    }

    fn task(project_id: &str, assignee: &str, status: TaskStatus, due: NaiveDate) -> Task {
        let mut t = Task::from_new(
            NewTask {
                title: "T".into(),
                description: String::new(),
                status,
                priority: Priority::Medium,
                project_id: project_id.into(),
                assignee_id: assignee.into(),
                reporter_id: assignee.into(),
                start_date: due - Duration::days(7),
                due_date: due,
                estimated_hours: 0.0,
                logged_hours: 0.0,
                progress: 0,
                subtasks: Vec::new(),
                tags: Vec::new(),
            },
            Utc::now(),
        );
        if status == TaskStatus::Completed {
            t.completed_date = Some(due);
            t.progress = 100;
        }
        t
    }

    #[test]
    fn test_overdue_excludes_completed() {
        let yesterday = today() - Duration::days(1);
        let tasks = vec![
            task("p", "u", TaskStatus::Todo, yesterday),
            task("p", "u", TaskStatus::Completed, yesterday),
            task("p", "u", TaskStatus::InProgress, today() + Duration::days(1)),
        ];
        assert_eq!(overdue_count(&tasks, today()), 1);
    }

    #[test]
    fn test_upcoming_window_is_inclusive() {
        let tasks = vec![
            task("p", "u", TaskStatus::Todo, today()),
            task("p", "u", TaskStatus::Todo, today() + Duration::days(7)),
            task("p", "u", TaskStatus::Todo, today() + Duration::days(8)),
            task("p", "u", TaskStatus::Todo, today() - Duration::days(1)),
            task("p", "u", TaskStatus::Completed, today() + Duration::days(2)),
        ];
        assert_eq!(upcoming_deadline_count(&tasks, today()), 2);
    }

    #[test]
    fn test_efficiency_zero_estimate_is_zero() {
        let tasks = vec![task("p", "u", TaskStatus::Todo, today())];
        let summary = hours_summary(&tasks);
        assert_eq!(summary.estimated, 0.0);
        assert_eq!(summary.efficiency_pct, 0);
    }

    #[test]
    fn test_efficiency_rounds() {
        let mut t = task("p", "u", TaskStatus::Todo, today());
        t.estimated_hours = 16.0;
        t.logged_hours = 14.0;
        let summary = hours_summary(&[t]);
        assert_eq!(summary.efficiency_pct, 88); // 87.5 rounds up
    }

    #[test]
    fn test_adherence_defaults_to_100() {
        let tasks = vec![task("p", "u", TaskStatus::Todo, today())];
        let adherence = deadline_adherence(&tasks);
        assert_eq!(adherence.on_time, 0);
        assert_eq!(adherence.late, 0);
        assert_eq!(adherence.adherence_pct, 100);
    }

    #[test]
    fn test_adherence_counts_on_time_and_late() {
        let mut on_time = task("p", "u", TaskStatus::Completed, today());
        on_time.completed_date = Some(today() - Duration::days(1));
        let mut late = task("p", "u", TaskStatus::Completed, today());
        late.completed_date = Some(today() + Duration::days(2));
        let adherence = deadline_adherence(&[on_time, late]);
        assert_eq!(adherence.on_time, 1);
        assert_eq!(adherence.late, 1);
        assert_eq!(adherence.adherence_pct, 50);
    }

    #[test]
    fn test_completion_rate_empty_is_zero() {
        assert_eq!(completion_rate(&[]), 0);
        assert_eq!(average_progress(&[]), 0);
    }

    #[test]
    fn test_member_productivity_sorted_by_rate() {
        let users = vec![user("user-a", UserRole::TeamMember), user("user-b", UserRole::TeamMember)];
        let tasks = vec![
            task("p", "user-a", TaskStatus::Completed, today()),
            task("p", "user-a", TaskStatus::Todo, today()),
            task("p", "user-b", TaskStatus::Completed, today()),
        ];
        let rows = member_productivity(&tasks, &users);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "user-b");
        assert_eq!(rows[0].rate_pct, 100);
        assert_eq!(rows[1].user_id, "user-a");
        assert_eq!(rows[1].rate_pct, 50);
        assert_eq!(rows[1].total, 2);
    }

    #[test]
    fn test_productivity_rate_zero_when_unassigned() {
        let rows = member_productivity(&[], &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_project_task_progress_falls_back_to_manual() {
        let p = project("user-pm", &[]);
        assert_eq!(project_task_progress(&p, &[]), 50);
        let tasks = vec![
            task(&p.id, "u", TaskStatus::Completed, today()),
            task(&p.id, "u", TaskStatus::Todo, today()),
            task(&p.id, "u", TaskStatus::Todo, today()),
        ];
        assert_eq!(project_task_progress(&p, &tasks), 33);
    }

    #[test]
    fn test_overdue_same_for_admin_and_assignee_scope() {
        // Admin A; project P1 managed by PM1; two tasks under P1 assigned to
        // T1: one overdue todo, one completed due tomorrow.
        let admin = user("user-admin", UserRole::Admin);
        let pm = user("user-pm1", UserRole::ProjectManager);
        let member = user("user-t1", UserRole::TeamMember);
        let p1 = project(&pm.id, &[member.id.as_str()]);
        let tasks = vec![
            task(&p1.id, &member.id, TaskStatus::Todo, today() - Duration::days(1)),
            task(
                &p1.id,
                &member.id,
                TaskStatus::Completed,
                today() + Duration::days(1),
            ),
        ];
        let projects = vec![p1];

        let admin_tasks = scope::visible_tasks(&admin, &projects, &tasks);
        assert_eq!(admin_tasks.len(), 2);
        assert_eq!(overdue_count(&admin_tasks, today()), 1);

        let member_tasks = scope::visible_tasks(&member, &projects, &tasks);
        assert_eq!(member_tasks.len(), 2);
        assert_eq!(overdue_count(&member_tasks, today()), 1);
    }

    #[test]
    fn test_dashboard_stats() {
        let users = vec![
            user("user-a", UserRole::Admin),
            {
                let mut u = user("user-b", UserRole::TeamMember);
                u.is_active = false;
                u
            },
        ];
        let mut p1 = project("user-a", &[]);
        p1.progress = 40;
        let mut p2 = project("user-a", &[]);
        p2.status = ProjectStatus::Completed;
        p2.progress = 100;
        let tasks = vec![
            task(&p1.id, "user-a", TaskStatus::Todo, today() - Duration::days(2)),
            task(&p1.id, "user-a", TaskStatus::Completed, today()),
            task(&p1.id, "user-a", TaskStatus::InProgress, today() + Duration::days(3)),
        ];
        let projects = vec![p1, p2];

        let stats = dashboard_stats(&projects, &tasks, &users, today());
        assert_eq!(stats.total_projects, 2);
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
        assert_eq!(stats.team_members, 1);
        assert_eq!(stats.upcoming_deadlines, 1);
        assert_eq!(stats.project_progress, 70);
    }

    #[test]
    fn test_breakdowns_cover_every_variant() {
        let tasks = vec![
            task("p", "u", TaskStatus::Todo, today()),
            task("p", "u", TaskStatus::Blocked, today()),
        ];
        let by_status = task_status_breakdown(&tasks);
        assert_eq!(by_status.len(), TaskStatus::ALL.len());
        assert_eq!(
            by_status
                .iter()
                .find(|(s, _)| *s == TaskStatus::Todo)
                .map(|(_, n)| *n),
            Some(1)
        );
        assert_eq!(
            by_status
                .iter()
                .find(|(s, _)| *s == TaskStatus::InReview)
                .map(|(_, n)| *n),
            Some(0)
        );

        let by_priority = task_priority_breakdown(&tasks);
        assert_eq!(by_priority.len(), Priority::ALL.len());
        let total: usize = by_priority.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 2);
    }
}
