use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use inquire::{Confirm, Password, Select, Text};

use teamtrack_core::{
    NewProject, NewTask, NewUser, Priority, ProjectStatus, Repository, TaskStatus, User, UserRole,
};

/// Prompts for login credentials
pub fn prompt_login(email: Option<String>) -> Result<(String, String)> {
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:").prompt()?,
    };
    let password = Password::new("Password:")
        .without_confirmation()
        .prompt()?;
    Ok((email, password))
}

/// Yes/no confirmation with a default of no
pub fn confirm(message: &str) -> Result<bool> {
    Ok(Confirm::new(message).with_default(false).prompt()?)
}

fn prompt_date(label: &str, default: NaiveDate) -> Result<NaiveDate> {
    let input = Text::new(label)
        .with_default(&default.to_string())
        .prompt()?;
    NaiveDate::parse_from_str(&input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", input))
}

/// Select one user from the collection, returning their id
fn prompt_user_id(label: &str, users: &[User]) -> Result<String> {
    let options: Vec<String> = users
        .iter()
        .map(|u| format!("{} ({})", u.name, u.id))
        .collect();
    let chosen = Select::new(label, options.clone()).prompt()?;
    let index = options
        .iter()
        .position(|o| *o == chosen)
        .context("No user selected")?;
    Ok(users[index].id.clone())
}

/// Prompts the user for a new project
pub fn prompt_new_project(repo: &Repository) -> Result<NewProject> {
    let name = Text::new("Name:").prompt()?;
    let description = Text::new("Description:").prompt()?;

    let status_options = ProjectStatus::ALL.to_vec();
    let status = Select::new("Status:", status_options).prompt()?;

    let priority_options = Priority::ALL.to_vec();
    let priority = Select::new("Priority:", priority_options).prompt()?;

    let today = Utc::now().date_naive();
    let start_date = prompt_date("Start date:", today)?;
    let end_date = prompt_date("End date:", today + chrono::Duration::days(90))?;

    let manager_id = prompt_user_id("Manager:", repo.users())?;

    let budget_input = Text::new("Budget:").with_default("0").prompt()?;
    let budget: f64 = budget_input
        .parse()
        .with_context(|| format!("Invalid budget '{}'", budget_input))?;

    let tags_input = Text::new("Tags (comma separated):").prompt()?;
    let tags = split_list(&tags_input);

    Ok(NewProject {
        name,
        description,
        status,
        priority,
        start_date,
        end_date,
        manager_id,
        team_member_ids: Vec::new(),
        budget,
        progress: 0,
        tags,
    })
}

/// Prompts the user for a new task; the reporter is the session user
pub fn prompt_new_task(repo: &Repository, reporter_id: &str) -> Result<NewTask> {
    let title = Text::new("Title:").prompt()?;
    let description = Text::new("Description:").prompt()?;

    let projects = repo.projects();
    let options: Vec<String> = projects
        .iter()
        .map(|p| format!("{} ({})", p.name, p.id))
        .collect();
    let chosen = Select::new("Project:", options.clone()).prompt()?;
    let index = options
        .iter()
        .position(|o| *o == chosen)
        .context("No project selected")?;
    let project_id = projects[index].id.clone();

    let assignee_id = prompt_user_id("Assignee:", repo.users())?;

    let status = Select::new("Status:", TaskStatus::ALL.to_vec()).prompt()?;
    let priority = Select::new("Priority:", Priority::ALL.to_vec()).prompt()?;

    let today = Utc::now().date_naive();
    let start_date = prompt_date("Start date:", today)?;
    let due_date = prompt_date("Due date:", today + chrono::Duration::days(14))?;

    let estimate_input = Text::new("Estimated hours:").with_default("0").prompt()?;
    let estimated_hours: f64 = estimate_input
        .parse()
        .with_context(|| format!("Invalid hours '{}'", estimate_input))?;

    Ok(NewTask {
        title,
        description,
        status,
        priority,
        project_id,
        assignee_id,
        reporter_id: reporter_id.to_string(),
        start_date,
        due_date,
        estimated_hours,
        logged_hours: 0.0,
        progress: 0,
        subtasks: Vec::new(),
        tags: Vec::new(),
    })
}

/// Prompts the user for a new user account
pub fn prompt_new_user() -> Result<NewUser> {
    let name = Text::new("Name:").prompt()?;
    let email = Text::new("Email:").prompt()?;
    let password = Password::new("Password:").prompt()?;

    let roles = vec![
        UserRole::Admin,
        UserRole::ProjectManager,
        UserRole::TeamMember,
    ];
    let role = Select::new("Role:", roles).prompt()?;

    let department = Text::new("Department:").prompt()?;
    let phone = Text::new("Phone:").prompt()?;

    let avatar = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .collect::<String>()
        .to_uppercase();

    Ok(NewUser {
        name,
        email,
        password,
        role,
        avatar,
        department,
        phone,
        join_date: Utc::now().date_naive(),
        is_active: true,
    })
}

/// Splits a comma-separated flag value into trimmed, non-empty items
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
