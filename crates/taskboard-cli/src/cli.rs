use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskboard_domain::{DateRange, FilterState};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Browse and move tasks on a paginated task board", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the board file (or set TASKBOARD_FILE env var)
    #[arg(value_name = "FILE", env = "TASKBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Tasks per column page (overrides the config file)
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the first page of every visible column
    Columns,
    /// Show one column
    Show(ShowArgs),
    /// Move a task to another column
    Move(MoveArgs),
    /// Apply a filter and show the matching columns
    Filter(FilterArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct ShowArgs {
    /// Status id of the column
    pub status_id: String,
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
}

#[derive(Args)]
pub struct MoveArgs {
    #[arg(long)]
    pub task_id: String,
    /// Target status id
    #[arg(long)]
    pub to: String,
}

#[derive(Args, Default)]
pub struct FilterArgs {
    #[arg(long = "status", value_name = "STATUS_ID")]
    pub status_ids: Vec<String>,
    #[arg(long = "priority", value_name = "PRIORITY_ID")]
    pub priority_ids: Vec<String>,
    #[arg(long = "initiative", value_name = "INITIATIVE_ID")]
    pub initiative_ids: Vec<String>,
    #[arg(long = "assignee", value_name = "USER_ID")]
    pub assignee_ids: Vec<String>,
    #[arg(long = "reviewer", value_name = "USER_ID")]
    pub reviewer_ids: Vec<String>,
    #[arg(long = "ba", value_name = "USER_ID")]
    pub ba_ids: Vec<String>,
    #[arg(long = "member", value_name = "USER_ID")]
    pub member_ids: Vec<String>,
    /// Earliest due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_from: Option<NaiveDate>,
    /// Latest due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_to: Option<NaiveDate>,
    /// Earliest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub created_from: Option<NaiveDate>,
    /// Latest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub created_to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> FilterState {
        FilterState::new()
            .with_status_ids(&self.status_ids)
            .with_priority_ids(&self.priority_ids)
            .with_initiative_ids(&self.initiative_ids)
            .with_assignee_ids(&self.assignee_ids)
            .with_reviewer_ids(&self.reviewer_ids)
            .with_ba_ids(&self.ba_ids)
            .with_member_ids(&self.member_ids)
            .with_due_date_range(DateRange::new(self.due_from, self.due_to))
            .with_created_date_range(DateRange::new(self.created_from, self.created_to))
    }
}
