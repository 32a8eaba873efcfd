mod cli;
mod prompts;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use colored::Colorize;

use teamtrack_core::{
    open_backend, resolve_data_path, scope, stats, EntityKind, NewActivity, NewNotification,
    NewProject, NewTask, NewUser, NotificationKind, Priority, ProjectPatch, ProjectStatus,
    Registry, Repository, StoreBackend, TaskPatch, TaskStatus, User, UserPatch, UserRole,
};

use crate::cli::{
    Cli, Command, DbCommand, NotificationCommand, ProjectCommand, TaskCommand, UserCommand,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Registry commands work without opening a repository
    if let Command::Db(db_cmd) = &cli.command {
        return handle_db_command(db_cmd, cli.workspace.as_deref());
    }

    let data_path = match &cli.data {
        Some(path) => path.clone(),
        None => resolve_data_path(cli.workspace.as_deref())?,
    };
    let backend = open_backend(&data_path, None)?;

    // Reset goes straight to the backend so it stays usable as the recovery
    // path for a malformed store
    if let Command::Reset { yes } = &cli.command {
        if !*yes && !prompts::confirm("Reset ALL data to seed defaults?")? {
            println!("Aborted.");
            return Ok(());
        }
        backend.reset()?;
        println!("{}", "All data reset to seed defaults.".green());
        return Ok(());
    }

    let mut repo = Repository::open(backend)?;

    match &cli.command {
        Command::Login { email } => {
            let (email, password) = prompts::prompt_login(email.clone())?;
            let user = repo.login(&email, &password)?;
            println!(
                "{} Welcome back, {} ({})",
                "Logged in.".green(),
                user.name,
                user.role
            );
        }
        Command::Logout => {
            repo.logout()?;
            println!("{}", "Logged out.".green());
        }
        Command::Whoami => match repo.session().current_user() {
            Some(user) => {
                println!("{} <{}>", user.name.bold(), user.email);
                println!("{}: {}", "Role".blue(), user.role);
                println!("{}: {}", "Department".blue(), user.department);
            }
            None => println!("{}", "Not logged in.".yellow()),
        },
        Command::Dashboard => {
            let user = require_login(&repo)?;
            show_dashboard(&repo, &user);
        }
        Command::Project(project_cmd) => {
            handle_project_command(project_cmd, &mut repo)?;
        }
        Command::Task(task_cmd) => {
            handle_task_command(task_cmd, &mut repo)?;
        }
        Command::User(user_cmd) => {
            handle_user_command(user_cmd, &mut repo)?;
        }
        Command::Notifications(notif_cmd) => {
            handle_notification_command(notif_cmd, &mut repo)?;
        }
        Command::Activity { limit } => {
            let _ = require_login(&repo)?;
            show_activity(&repo, *limit);
        }
        Command::Progress => {
            let user = require_login(&repo)?;
            show_progress(&repo, &user);
        }
        Command::Db(_) | Command::Reset { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// The session user, required for everything that is role-scoped
fn require_login(repo: &Repository) -> Result<User> {
    repo.session()
        .current_user()
        .cloned()
        .context("Not logged in. Run `teamtrack login` first")
}

fn require_role(user: &User, roles: &[UserRole]) -> Result<()> {
    if !roles.contains(&user.role) {
        bail!("This command requires one of: {:?}", roles);
    }
    Ok(())
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", input))
}

fn parse_project_status(input: &str) -> Result<ProjectStatus> {
    ProjectStatus::parse(input)
        .with_context(|| format!("Unknown project status '{}'", input))
}

fn parse_task_status(input: &str) -> Result<TaskStatus> {
    TaskStatus::parse(input).with_context(|| format!("Unknown task status '{}'", input))
}

fn parse_priority(input: &str) -> Result<Priority> {
    Priority::parse(input).with_context(|| format!("Unknown priority '{}'", input))
}

fn log_activity(
    repo: &mut Repository,
    user: &User,
    action: &str,
    entity_kind: EntityKind,
    entity_id: &str,
    details: String,
) -> Result<()> {
    repo.log_activity(NewActivity {
        user_id: user.id.clone(),
        action: action.to_string(),
        entity_kind,
        entity_id: entity_id.to_string(),
        details,
    })?;
    Ok(())
}

// =============================================================================
// Dashboard / progress views
// =============================================================================

fn show_dashboard(repo: &Repository, user: &User) {
    let today = Utc::now().date_naive();
    let projects = scope::visible_projects(user, repo.projects());
    let tasks = scope::visible_tasks(user, repo.projects(), repo.tasks());
    let stats = stats::dashboard_stats(&projects, &tasks, repo.users(), today);

    println!("{}", format!("Welcome back, {}", user.name).bold());
    println!();
    println!("{}: {}", "Projects".blue(), stats.total_projects);
    println!("{}: {}", "Active projects".blue(), stats.active_projects);
    println!(
        "{}: {}/{}",
        "Completed tasks".blue(),
        stats.completed_tasks,
        stats.total_tasks
    );
    println!(
        "{}: {}",
        "Overdue tasks".blue(),
        if stats.overdue_tasks > 0 {
            stats.overdue_tasks.to_string().red().to_string()
        } else {
            stats.overdue_tasks.to_string()
        }
    );
    println!(
        "{}: {}",
        "Upcoming deadlines (7d)".blue(),
        stats.upcoming_deadlines
    );
    println!("{}: {}", "Active team members".blue(), stats.team_members);
    println!(
        "{}: {}%",
        "Average project progress".blue(),
        stats.project_progress
    );

    println!();
    println!("{}", "Tasks by status".bold());
    for (status, count) in stats::task_status_breakdown(&tasks) {
        println!("  {:<12} {}", status.to_string(), count);
    }

    let mut upcoming: Vec<_> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .collect();
    upcoming.sort_by_key(|t| t.due_date);
    if !upcoming.is_empty() {
        println!();
        println!("{}", "Next due".bold());
        for task in upcoming.iter().take(5) {
            let due = if task.is_overdue(today) {
                task.due_date.to_string().red().to_string()
            } else {
                task.due_date.to_string()
            };
            println!("  {}  {:<30} {}", task.id, truncate(&task.title, 30), due);
        }
    }
}

fn show_progress(repo: &Repository, user: &User) {
    let projects = scope::visible_projects(user, repo.projects());
    let tasks = scope::visible_tasks(user, repo.projects(), repo.tasks());

    println!("{}", "Progress Tracking".bold());
    println!();
    println!(
        "{}: {}%",
        "Overall completion".blue(),
        stats::completion_rate(&tasks)
    );

    let hours = stats::hours_summary(&tasks);
    println!(
        "{}: {:.1}h estimated, {:.1}h logged, {}% efficiency",
        "Hours".blue(),
        hours.estimated,
        hours.logged,
        hours.efficiency_pct
    );

    let adherence = stats::deadline_adherence(&tasks);
    println!(
        "{}: {} on time, {} late ({}%)",
        "Deadline adherence".blue(),
        adherence.on_time,
        adherence.late,
        adherence.adherence_pct
    );

    println!();
    println!("{}", "Project progress".bold());
    for project in projects.iter().filter(|p| p.status != ProjectStatus::Cancelled) {
        let project_tasks: Vec<_> = tasks
            .iter()
            .filter(|t| t.project_id == project.id)
            .cloned()
            .collect();
        println!(
            "  {:<30} {:>3}%  ({} tasks)",
            truncate(&project.name, 30),
            stats::project_task_progress(project, &project_tasks),
            project_tasks.len()
        );
    }

    let productivity = stats::member_productivity(&tasks, repo.users());
    if !productivity.is_empty() {
        println!();
        println!("{}", "Member productivity".bold());
        for row in productivity.iter().take(8) {
            println!(
                "  {:<24} {}/{} completed ({}%)",
                truncate(&row.name, 24),
                row.completed,
                row.total,
                row.rate_pct
            );
        }
    }
}

fn show_activity(repo: &Repository, limit: usize) {
    let logs = repo.activity_logs();
    if logs.is_empty() {
        println!("{}", "No activity yet.".yellow());
        return;
    }
    for entry in logs.iter().take(limit) {
        let actor = repo
            .user_by_id(&entry.user_id)
            .map(|u| u.name.as_str())
            .unwrap_or("Unknown");
        println!(
            "{}  {:<18} {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            actor,
            entry.details
        );
    }
}

// =============================================================================
// Projects
// =============================================================================

fn handle_project_command(cmd: &ProjectCommand, repo: &mut Repository) -> Result<()> {
    let user = require_login(repo)?;
    match cmd {
        ProjectCommand::Add {
            name,
            description,
            status,
            priority,
            start,
            end,
            manager,
            members,
            budget,
            tags,
            interactive,
        } => {
            require_role(&user, &[UserRole::Admin, UserRole::ProjectManager])?;
            let should_be_interactive = *interactive || name.is_none();
            let new = if should_be_interactive {
                prompts::prompt_new_project(repo)?
            } else {
                let today = Utc::now().date_naive();
                NewProject {
                    name: name.clone().context("--name is required")?,
                    description: description.clone().unwrap_or_default(),
                    status: status
                        .as_deref()
                        .map(parse_project_status)
                        .transpose()?
                        .unwrap_or(ProjectStatus::NotStarted),
                    priority: priority
                        .as_deref()
                        .map(parse_priority)
                        .transpose()?
                        .unwrap_or(Priority::Medium),
                    start_date: start.as_deref().map(parse_date).transpose()?.unwrap_or(today),
                    end_date: end
                        .as_deref()
                        .map(parse_date)
                        .transpose()?
                        .unwrap_or(today + chrono::Duration::days(90)),
                    manager_id: manager.clone().unwrap_or_else(|| user.id.clone()),
                    team_member_ids: members
                        .as_deref()
                        .map(prompts::split_list)
                        .unwrap_or_default(),
                    budget: budget.unwrap_or(0.0),
                    progress: 0,
                    tags: tags.as_deref().map(prompts::split_list).unwrap_or_default(),
                }
            };
            let project = repo.add_project(new)?;
            log_activity(
                repo,
                &user,
                "created",
                EntityKind::Project,
                &project.id,
                format!("Created project \"{}\"", project.name),
            )?;
            println!("{}", "Project added successfully!".green());
            println!("ID: {}", project.id.green());
        }
        ProjectCommand::List => {
            let projects = scope::visible_projects(&user, repo.projects());
            if projects.is_empty() {
                println!("{}", "No projects found.".yellow());
                return Ok(());
            }
            println!(
                "{:<14} {:<30} {:<12} {:<10} {:>5}",
                "ID", "NAME", "STATUS", "PRIORITY", "PROG"
            );
            println!("{}", "-".repeat(76));
            for project in &projects {
                println!(
                    "{:<14} {:<30} {:<12} {:<10} {:>4}%",
                    project.id,
                    truncate(&project.name, 30),
                    project.status.to_string(),
                    project.priority.to_string(),
                    project.progress
                );
            }
        }
        ProjectCommand::Show { id } => {
            let project = repo
                .project_by_id(id)
                .with_context(|| format!("Project not found: {}", id))?
                .clone();
            let manager = repo
                .user_by_id(&project.manager_id)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "Unknown".into());
            println!("{}: {}", "ID".blue(), project.id);
            println!("{}: {}", "Name".blue(), project.name);
            println!("{}: {}", "Description".blue(), project.description);
            println!("{}: {}", "Status".blue(), project.status);
            println!("{}: {}", "Priority".blue(), project.priority);
            println!(
                "{}: {} to {}",
                "Schedule".blue(),
                project.start_date,
                project.end_date
            );
            println!("{}: {}", "Manager".blue(), manager);
            println!("{}: {}%", "Progress".blue(), project.progress);
            println!("{}: ${:.0}", "Budget".blue(), project.budget);
            if !project.tags.is_empty() {
                println!("{}: {}", "Tags".blue(), project.tags.join(", "));
            }
            let project_tasks = repo.tasks_by_project(&project.id);
            println!("{}: {}", "Tasks".blue(), project_tasks.len());
            for task in project_tasks {
                println!("  {}  [{}] {}", task.id, task.status, truncate(&task.title, 40));
            }
        }
        ProjectCommand::Edit {
            id,
            name,
            description,
            status,
            priority,
            progress,
            manager,
            members,
            budget,
        } => {
            require_role(&user, &[UserRole::Admin, UserRole::ProjectManager])?;
            let patch = ProjectPatch {
                name: name.clone(),
                description: description.clone(),
                status: status.as_deref().map(parse_project_status).transpose()?,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                progress: *progress,
                manager_id: manager.clone(),
                team_member_ids: members.as_deref().map(prompts::split_list),
                budget: *budget,
                ..Default::default()
            };
            repo.update_project(id, patch)?;
            let name = repo
                .project_by_id(id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            log_activity(
                repo,
                &user,
                "updated",
                EntityKind::Project,
                id,
                format!("Updated project \"{}\"", name),
            )?;
            println!("{}", "Project updated.".green());
        }
        ProjectCommand::Del { id, yes } => {
            require_role(&user, &[UserRole::Admin, UserRole::ProjectManager])?;
            let project = repo
                .project_by_id(id)
                .with_context(|| format!("Project not found: {}", id))?
                .clone();
            let task_count = repo.tasks_by_project(id).len();
            if !*yes {
                let message = format!(
                    "Delete \"{}\" and its {} task(s)?",
                    project.name, task_count
                );
                if !prompts::confirm(&message)? {
                    println!("Aborted.");
                    return Ok(());
                }
            }
            repo.delete_project(id)?;
            log_activity(
                repo,
                &user,
                "deleted",
                EntityKind::Project,
                id,
                format!("Deleted project \"{}\"", project.name),
            )?;
            println!(
                "{} ({} task(s) removed with it)",
                "Project deleted.".green(),
                task_count
            );
        }
    }
    Ok(())
}

// =============================================================================
// Tasks
// =============================================================================

fn notify_assignment(repo: &mut Repository, task_id: &str) -> Result<()> {
    let Some(task) = repo.task_by_id(task_id).cloned() else {
        return Ok(());
    };
    let project_name = repo
        .project_by_id(&task.project_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "a project".into());
    repo.add_notification(NewNotification {
        kind: NotificationKind::TaskAssigned,
        title: "New Task Assigned".into(),
        message: format!(
            "You have been assigned to \"{}\" in {}.",
            task.title, project_name
        ),
        user_id: task.assignee_id.clone(),
        related_id: Some(task.id.clone()),
    })?;
    Ok(())
}

fn handle_task_command(cmd: &TaskCommand, repo: &mut Repository) -> Result<()> {
    let user = require_login(repo)?;
    match cmd {
        TaskCommand::Add {
            title,
            description,
            project,
            assignee,
            status,
            priority,
            start,
            due,
            estimate,
            tags,
            interactive,
        } => {
            let should_be_interactive = *interactive || title.is_none();
            let new = if should_be_interactive {
                prompts::prompt_new_task(repo, &user.id)?
            } else {
                let today = Utc::now().date_naive();
                NewTask {
                    title: title.clone().context("--title is required")?,
                    description: description.clone().unwrap_or_default(),
                    status: status
                        .as_deref()
                        .map(parse_task_status)
                        .transpose()?
                        .unwrap_or(TaskStatus::Todo),
                    priority: priority
                        .as_deref()
                        .map(parse_priority)
                        .transpose()?
                        .unwrap_or(Priority::Medium),
                    project_id: project.clone().context("--project is required")?,
                    assignee_id: assignee.clone().unwrap_or_else(|| user.id.clone()),
                    reporter_id: user.id.clone(),
                    start_date: start.as_deref().map(parse_date).transpose()?.unwrap_or(today),
                    due_date: due
                        .as_deref()
                        .map(parse_date)
                        .transpose()?
                        .unwrap_or(today + chrono::Duration::days(14)),
                    estimated_hours: estimate.unwrap_or(0.0),
                    logged_hours: 0.0,
                    progress: 0,
                    subtasks: Vec::new(),
                    tags: tags.as_deref().map(prompts::split_list).unwrap_or_default(),
                }
            };
            let task = repo.add_task(new)?;
            log_activity(
                repo,
                &user,
                "created",
                EntityKind::Task,
                &task.id,
                format!("Created task \"{}\"", task.title),
            )?;
            if task.assignee_id != user.id {
                notify_assignment(repo, &task.id)?;
            }
            println!("{}", "Task added successfully!".green());
            println!("ID: {}", task.id.green());
        }
        TaskCommand::List {
            project,
            assignee,
            status,
        } => {
            let status = status.as_deref().map(parse_task_status).transpose()?;
            let today = Utc::now().date_naive();
            let tasks = scope::visible_tasks(&user, repo.projects(), repo.tasks());
            let tasks: Vec<_> = tasks
                .into_iter()
                .filter(|t| project.as_deref().map_or(true, |p| t.project_id == p))
                .filter(|t| assignee.as_deref().map_or(true, |a| t.assignee_id == a))
                .filter(|t| status.map_or(true, |s| t.status == s))
                .collect();
            if tasks.is_empty() {
                println!("{}", "No tasks found.".yellow());
                return Ok(());
            }
            println!(
                "{:<14} {:<32} {:<12} {:<10} {:<11}",
                "ID", "TITLE", "STATUS", "PRIORITY", "DUE"
            );
            println!("{}", "-".repeat(84));
            for task in &tasks {
                let due = if task.is_overdue(today) {
                    task.due_date.to_string().red().to_string()
                } else {
                    task.due_date.to_string()
                };
                println!(
                    "{:<14} {:<32} {:<12} {:<10} {}",
                    task.id,
                    truncate(&task.title, 32),
                    task.status.to_string(),
                    task.priority.to_string(),
                    due
                );
            }
        }
        TaskCommand::Show { id } => {
            let task = repo
                .task_by_id(id)
                .with_context(|| format!("Task not found: {}", id))?
                .clone();
            let project_name = repo
                .project_by_id(&task.project_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unknown".into());
            let assignee = repo
                .user_by_id(&task.assignee_id)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "Unknown".into());
            println!("{}: {}", "ID".blue(), task.id);
            println!("{}: {}", "Title".blue(), task.title);
            println!("{}: {}", "Description".blue(), task.description);
            println!("{}: {}", "Project".blue(), project_name);
            println!("{}: {}", "Assignee".blue(), assignee);
            println!("{}: {}", "Status".blue(), task.status);
            println!("{}: {}", "Priority".blue(), task.priority);
            println!("{}: {}", "Due".blue(), task.due_date);
            if let Some(completed) = task.completed_date {
                println!("{}: {}", "Completed".blue(), completed);
            }
            println!(
                "{}: {:.1}h estimated, {:.1}h logged",
                "Hours".blue(),
                task.estimated_hours,
                task.logged_hours
            );
            println!("{}: {}%", "Progress".blue(), task.progress);
            if !task.subtasks.is_empty() {
                println!("{}:", "Subtasks".blue());
                for subtask in &task.subtasks {
                    let mark = if subtask.completed { "x" } else { " " };
                    println!("  [{}] {}", mark, subtask.title);
                }
            }
            if !task.comments.is_empty() {
                println!("{}:", "Comments".blue());
                for comment in &task.comments {
                    let author = repo
                        .user_by_id(&comment.user_id)
                        .map(|u| u.name.as_str())
                        .unwrap_or("Unknown");
                    println!(
                        "  {} ({}): {}",
                        author,
                        comment.created_at.format("%Y-%m-%d %H:%M"),
                        comment.content
                    );
                }
            }
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            priority,
            assignee,
            due,
            estimate,
            logged,
            progress,
        } => {
            let previous_assignee = repo
                .task_by_id(id)
                .map(|t| t.assignee_id.clone())
                .with_context(|| format!("Task not found: {}", id))?;
            let patch = TaskPatch {
                title: title.clone(),
                description: description.clone(),
                priority: priority.as_deref().map(parse_priority).transpose()?,
                assignee_id: assignee.clone(),
                due_date: due.as_deref().map(parse_date).transpose()?,
                estimated_hours: *estimate,
                logged_hours: *logged,
                progress: *progress,
                ..Default::default()
            };
            repo.update_task(id, patch)?;
            let task_title = repo
                .task_by_id(id)
                .map(|t| t.title.clone())
                .unwrap_or_default();
            log_activity(
                repo,
                &user,
                "updated",
                EntityKind::Task,
                id,
                format!("Updated task \"{}\"", task_title),
            )?;
            if let Some(new_assignee) = assignee {
                if *new_assignee != previous_assignee && *new_assignee != user.id {
                    notify_assignment(repo, id)?;
                }
            }
            println!("{}", "Task updated.".green());
        }
        TaskCommand::Status { id, status } => {
            let status = parse_task_status(status)?;
            repo.set_task_status(id, status)?;
            let task_title = repo
                .task_by_id(id)
                .map(|t| t.title.clone())
                .unwrap_or_default();
            log_activity(
                repo,
                &user,
                "status_changed",
                EntityKind::Task,
                id,
                format!("Changed \"{}\" status to \"{}\"", task_title, status),
            )?;
            println!("{} {}", "Status set to".green(), status);
        }
        TaskCommand::Comment { id, message } => {
            repo.add_task_comment(id, &user.id, message)?;
            let task = repo
                .task_by_id(id)
                .cloned()
                .with_context(|| format!("Task not found: {}", id))?;
            log_activity(
                repo,
                &user,
                "comment",
                EntityKind::Task,
                id,
                format!("Commented on \"{}\"", task.title),
            )?;
            if task.assignee_id != user.id {
                repo.add_notification(NewNotification {
                    kind: NotificationKind::CommentAdded,
                    title: "New Comment".into(),
                    message: format!("{} commented on \"{}\".", user.name, task.title),
                    user_id: task.assignee_id.clone(),
                    related_id: Some(task.id.clone()),
                })?;
            }
            println!("{}", "Comment added.".green());
        }
        TaskCommand::Del { id, yes } => {
            let task = repo
                .task_by_id(id)
                .with_context(|| format!("Task not found: {}", id))?
                .clone();
            if !*yes && !prompts::confirm(&format!("Delete task \"{}\"?", task.title))? {
                println!("Aborted.");
                return Ok(());
            }
            repo.delete_task(id)?;
            log_activity(
                repo,
                &user,
                "deleted",
                EntityKind::Task,
                id,
                format!("Deleted task \"{}\"", task.title),
            )?;
            println!("{}", "Task deleted.".green());
        }
    }
    Ok(())
}

// =============================================================================
// Users
// =============================================================================

fn handle_user_command(cmd: &UserCommand, repo: &mut Repository) -> Result<()> {
    let user = require_login(repo)?;
    match cmd {
        UserCommand::Add {
            name,
            email,
            password,
            role,
            department,
            phone,
            interactive,
        } => {
            require_role(&user, &[UserRole::Admin])?;
            let should_be_interactive = *interactive || name.is_none();
            let new = if should_be_interactive {
                prompts::prompt_new_user()?
            } else {
                let name = name.clone().context("--name is required")?;
                let avatar = name
                    .split_whitespace()
                    .filter_map(|w| w.chars().next())
                    .collect::<String>()
                    .to_uppercase();
                NewUser {
                    name,
                    email: email.clone().context("--email is required")?,
                    password: password.clone().context("--password is required")?,
                    role: role
                        .as_deref()
                        .map(|r| {
                            UserRole::parse(r)
                                .with_context(|| format!("Unknown role '{}'", r))
                        })
                        .transpose()?
                        .unwrap_or(UserRole::TeamMember),
                    avatar,
                    department: department.clone().unwrap_or_default(),
                    phone: phone.clone().unwrap_or_default(),
                    join_date: Utc::now().date_naive(),
                    is_active: true,
                }
            };
            let created = repo.add_user(new)?;
            log_activity(
                repo,
                &user,
                "created",
                EntityKind::User,
                &created.id,
                format!("Added user \"{}\"", created.name),
            )?;
            println!("{}", "User added successfully!".green());
            println!("ID: {}", created.id.green());
        }
        UserCommand::List => {
            println!(
                "{:<14} {:<24} {:<16} {:<14} {}",
                "ID", "NAME", "ROLE", "DEPARTMENT", "ACTIVE"
            );
            println!("{}", "-".repeat(78));
            for u in repo.users() {
                let active = if u.is_active {
                    "yes".to_string()
                } else {
                    "no".yellow().to_string()
                };
                println!(
                    "{:<14} {:<24} {:<16} {:<14} {}",
                    u.id,
                    truncate(&u.name, 24),
                    u.role.to_string(),
                    truncate(&u.department, 14),
                    active
                );
            }
        }
        UserCommand::Show { id } => {
            let u = repo
                .user_by_id(id)
                .with_context(|| format!("User not found: {}", id))?;
            println!("{}: {}", "ID".blue(), u.id);
            println!("{}: {}", "Name".blue(), u.name);
            println!("{}: {}", "Email".blue(), u.email);
            println!("{}: {}", "Role".blue(), u.role);
            println!("{}: {}", "Department".blue(), u.department);
            println!("{}: {}", "Phone".blue(), u.phone);
            println!("{}: {}", "Joined".blue(), u.join_date);
            println!("{}: {}", "Active".blue(), u.is_active);
            let assigned = repo.tasks_by_assignee(id);
            println!("{}: {}", "Assigned tasks".blue(), assigned.len());
        }
        UserCommand::Edit {
            id,
            name,
            email,
            role,
            department,
            active,
        } => {
            require_role(&user, &[UserRole::Admin])?;
            let patch = UserPatch {
                name: name.clone(),
                email: email.clone(),
                role: role
                    .as_deref()
                    .map(|r| {
                        UserRole::parse(r).with_context(|| format!("Unknown role '{}'", r))
                    })
                    .transpose()?,
                department: department.clone(),
                is_active: *active,
                ..Default::default()
            };
            repo.update_user(id, patch)?;
            let name = repo.user_by_id(id).map(|u| u.name.clone()).unwrap_or_default();
            log_activity(
                repo,
                &user,
                "updated",
                EntityKind::User,
                id,
                format!("Updated user \"{}\"", name),
            )?;
            println!("{}", "User updated.".green());
        }
        UserCommand::Del { id, yes } => {
            require_role(&user, &[UserRole::Admin])?;
            let target = repo
                .user_by_id(id)
                .with_context(|| format!("User not found: {}", id))?
                .clone();
            if !*yes && !prompts::confirm(&format!("Delete user \"{}\"?", target.name))? {
                println!("Aborted.");
                return Ok(());
            }
            repo.delete_user(id)?;
            log_activity(
                repo,
                &user,
                "deleted",
                EntityKind::User,
                id,
                format!("Deleted user \"{}\"", target.name),
            )?;
            println!("{}", "User deleted.".green());
        }
    }
    Ok(())
}

// =============================================================================
// Notifications
// =============================================================================

fn handle_notification_command(cmd: &NotificationCommand, repo: &mut Repository) -> Result<()> {
    let user = require_login(repo)?;
    match cmd {
        NotificationCommand::List { unread } => {
            let feed: Vec<_> = repo
                .notifications_for(&user.id)
                .into_iter()
                .filter(|n| !*unread || !n.read)
                .cloned()
                .collect();
            if feed.is_empty() {
                println!("{}", "No notifications.".yellow());
                return Ok(());
            }
            for n in &feed {
                let marker = if n.read { " " } else { "*" };
                println!(
                    "{} {}  {}  [{}] {}",
                    marker,
                    n.id,
                    n.created_at.format("%Y-%m-%d %H:%M"),
                    n.kind,
                    n.message
                );
            }
            println!();
            println!("{} unread", repo.unread_count(&user.id));
        }
        NotificationCommand::Read { id } => {
            repo.mark_notification_read(id)?;
            println!("{}", "Marked as read.".green());
        }
        NotificationCommand::ReadAll => {
            repo.mark_all_notifications_read(&user.id)?;
            println!("{}", "All notifications marked as read.".green());
        }
    }
    Ok(())
}

// =============================================================================
// Registry
// =============================================================================

fn handle_db_command(cmd: &DbCommand, workspace: Option<&str>) -> Result<()> {
    match cmd {
        DbCommand::Register {
            name,
            path,
            description,
            default,
        } => {
            let registry_path = teamtrack_core::get_registry_path()?;
            let mut registry = if registry_path.exists() {
                Registry::load(&registry_path)?
            } else {
                Registry::default()
            };
            registry.register_workspace(
                name.clone(),
                path.display().to_string(),
                description.clone().unwrap_or_default(),
            );
            if *default {
                registry.set_default_workspace(name)?;
            }
            registry.save(&registry_path)?;
            println!("{} '{}'", "Registered workspace".green(), name);
        }
        DbCommand::Path => {
            let path = resolve_data_path(workspace)?;
            println!("{}", path.display());
        }
        DbCommand::List => {
            let registry_path = teamtrack_core::get_registry_path()?;
            if !registry_path.exists() {
                println!("{}", "No workspaces registered.".yellow());
                return Ok(());
            }
            let registry = Registry::load(&registry_path)?;
            let default = registry.default_workspace.clone();
            let mut names = registry.list_workspaces();
            names.sort();
            for name in names {
                if let Some(ws) = registry.get_workspace(name) {
                    let marker = if default.as_deref() == Some(name) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {:<20} {}", marker, name, ws.path);
                }
            }
        }
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
