use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "A local project and task tracker")]
pub struct Cli {
    /// Workspace name to use from the central registry
    #[clap(long, short = 'w')]
    pub workspace: Option<String>,

    /// Explicit data path (JSON directory or .db/.sqlite file), overriding
    /// the registry
    #[clap(long)]
    pub data: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Add a new project
    Add {
        /// Project name
        #[clap(long)]
        name: Option<String>,

        /// Description of the project
        #[clap(long)]
        description: Option<String>,

        /// Status (not_started, in_progress, on_hold, completed, cancelled)
        #[clap(long)]
        status: Option<String>,

        /// Priority (low, medium, high, critical)
        #[clap(long)]
        priority: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[clap(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[clap(long)]
        end: Option<String>,

        /// Manager user id
        #[clap(long)]
        manager: Option<String>,

        /// Comma-separated team member user ids
        #[clap(long)]
        members: Option<String>,

        /// Budget
        #[clap(long)]
        budget: Option<f64>,

        /// Comma-separated tags
        #[clap(long)]
        tags: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// List visible projects
    List,

    /// Show details for a project
    Show {
        /// Project id
        id: String,
    },

    /// Edit an existing project
    Edit {
        /// Project id
        id: String,

        #[clap(long)]
        name: Option<String>,

        #[clap(long)]
        description: Option<String>,

        /// Status (not_started, in_progress, on_hold, completed, cancelled)
        #[clap(long)]
        status: Option<String>,

        /// Priority (low, medium, high, critical)
        #[clap(long)]
        priority: Option<String>,

        /// Progress percentage, 0-100
        #[clap(long)]
        progress: Option<u32>,

        /// Manager user id
        #[clap(long)]
        manager: Option<String>,

        /// Comma-separated team member user ids (replaces the list)
        #[clap(long)]
        members: Option<String>,

        #[clap(long)]
        budget: Option<f64>,
    },

    /// Delete a project and every task belonging to it
    Del {
        /// Project id
        id: String,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a new task
    Add {
        /// Task title
        #[clap(long)]
        title: Option<String>,

        #[clap(long)]
        description: Option<String>,

        /// Project id the task belongs to
        #[clap(long)]
        project: Option<String>,

        /// Assignee user id
        #[clap(long)]
        assignee: Option<String>,

        /// Status (todo, in_progress, in_review, completed, blocked)
        #[clap(long)]
        status: Option<String>,

        /// Priority (low, medium, high, critical)
        #[clap(long)]
        priority: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[clap(long)]
        start: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[clap(long)]
        due: Option<String>,

        /// Estimated hours
        #[clap(long)]
        estimate: Option<f64>,

        /// Comma-separated tags
        #[clap(long)]
        tags: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// List visible tasks
    List {
        /// Only tasks in this project
        #[clap(long)]
        project: Option<String>,

        /// Only tasks assigned to this user id
        #[clap(long)]
        assignee: Option<String>,

        /// Only tasks with this status
        #[clap(long)]
        status: Option<String>,
    },

    /// Show details for a task
    Show {
        /// Task id
        id: String,
    },

    /// Edit an existing task
    Edit {
        /// Task id
        id: String,

        #[clap(long)]
        title: Option<String>,

        #[clap(long)]
        description: Option<String>,

        /// Priority (low, medium, high, critical)
        #[clap(long)]
        priority: Option<String>,

        /// Assignee user id
        #[clap(long)]
        assignee: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[clap(long)]
        due: Option<String>,

        /// Estimated hours
        #[clap(long)]
        estimate: Option<f64>,

        /// Logged hours
        #[clap(long)]
        logged: Option<f64>,

        /// Progress percentage, 0-100
        #[clap(long)]
        progress: Option<u32>,
    },

    /// Change a task's status
    Status {
        /// Task id
        id: String,

        /// New status (todo, in_progress, in_review, completed, blocked)
        status: String,
    },

    /// Add a comment to a task
    Comment {
        /// Task id
        id: String,

        /// Comment text
        message: String,
    },

    /// Delete a task
    Del {
        /// Task id
        id: String,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Add a new user (admin only)
    Add {
        #[clap(long)]
        name: Option<String>,

        #[clap(long)]
        email: Option<String>,

        #[clap(long)]
        password: Option<String>,

        /// Role (admin, project_manager, team_member)
        #[clap(long)]
        role: Option<String>,

        #[clap(long)]
        department: Option<String>,

        #[clap(long)]
        phone: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// List all users
    List,

    /// Show details for a user
    Show {
        /// User id
        id: String,
    },

    /// Edit an existing user (admin only)
    Edit {
        /// User id
        id: String,

        #[clap(long)]
        name: Option<String>,

        #[clap(long)]
        email: Option<String>,

        /// Role (admin, project_manager, team_member)
        #[clap(long)]
        role: Option<String>,

        #[clap(long)]
        department: Option<String>,

        /// Activate or deactivate the account
        #[clap(long)]
        active: Option<bool>,
    },

    /// Delete a user (admin only)
    Del {
        /// User id
        id: String,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    /// List your notifications, newest first
    List {
        /// Only unread notifications
        #[clap(long)]
        unread: bool,
    },

    /// Mark one notification as read
    Read {
        /// Notification id
        id: String,
    },

    /// Mark all of your notifications as read
    ReadAll,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Register a workspace in the registry
    Register {
        /// Name of the workspace
        #[clap(long)]
        name: String,

        /// Path to the workspace data
        #[clap(long)]
        path: PathBuf,

        /// Description of the workspace
        #[clap(long)]
        description: Option<String>,

        /// Set this workspace as the default
        #[clap(long)]
        default: bool,
    },

    /// Print the resolved data path
    Path,

    /// List registered workspaces
    List,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with email and password
    Login {
        /// Email address (prompted if omitted)
        #[clap(long)]
        email: Option<String>,
    },

    /// Log out
    Logout,

    /// Show the current session user
    Whoami,

    /// Overview: headline stats, status breakdown, upcoming tasks
    Dashboard,

    /// Manage projects
    #[clap(subcommand)]
    Project(ProjectCommand),

    /// Manage tasks
    #[clap(subcommand)]
    Task(TaskCommand),

    /// Manage users
    #[clap(subcommand)]
    User(UserCommand),

    /// Notifications
    #[clap(subcommand)]
    Notifications(NotificationCommand),

    /// Recent activity feed
    Activity {
        /// Number of entries to show
        #[clap(long, default_value_t = 10)]
        limit: usize,
    },

    /// Progress tracking: hours, completion, productivity, adherence
    Progress,

    /// Workspace registry management
    #[clap(subcommand)]
    Db(DbCommand),

    /// Reset all data to seed defaults
    Reset {
        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}
