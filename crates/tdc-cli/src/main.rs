mod commands;
mod logging;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tdc", version, about = "Command-line client for Todoist")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct GlobalArgs {
    /// Enable debug logging on stderr
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,
    /// Todoist API token (defaults to TODOIST_API_TOKEN or TODOIST_API_KEY)
    #[arg(
        short = 'k',
        long = "api-key",
        visible_alias = "api-token",
        value_name = "TOKEN",
        global = true
    )]
    pub api_key: Option<String>,
    /// Remove emojis from displayed text
    #[arg(short = 'E', long, global = true)]
    pub strip_emojis: bool,
    /// Show ID columns
    #[arg(short = 'i', long = "ids", global = true)]
    pub ids: bool,
    /// Print JSON instead of a table
    #[arg(short = 'j', long, global = true)]
    pub json: bool,
    /// Project name fragment
    #[arg(short = 'p', long, global = true)]
    pub project: Option<String>,
    /// Include subtasks in listings
    #[arg(short = 's', long, global = true)]
    pub subtasks: bool,
    /// Section name fragment (needs --project)
    #[arg(short = 'S', long, global = true)]
    pub section: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Manage tasks
    #[command(visible_aliases = ["tasks", "t", "ta"])]
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Manage projects
    #[command(visible_aliases = ["projects", "proj", "pro", "p"])]
    Project {
        #[command(subcommand)]
        command: NameCommand,
    },
    /// Manage sections of a project
    #[command(visible_aliases = ["sections", "sect", "sec", "s"])]
    Section {
        #[command(subcommand)]
        command: NameCommand,
    },
    /// Manage labels
    #[command(visible_aliases = ["labels", "lab", "lbl"])]
    Label {
        #[command(subcommand)]
        command: NameCommand,
    },
}

#[derive(Subcommand)]
pub(crate) enum TaskCommand {
    /// List open tasks
    #[command(visible_aliases = ["ls", "l"])]
    List {
        /// Only tasks due today
        #[arg(long)]
        today: bool,
        /// Only overdue tasks
        #[arg(long)]
        overdue: bool,
        /// Only recurring tasks
        #[arg(long)]
        recurring: bool,
    },
    /// List tasks due today or overdue
    #[command(visible_aliases = ["td", "to"])]
    Today,
    /// Create a task
    #[command(visible_aliases = ["cr", "c", "add", "a"])]
    Create {
        content: String,
        /// 1 (normal) to 4 (urgent)
        #[arg(long)]
        priority: Option<u8>,
        /// Natural-language due date, e.g. "tomorrow 5pm"
        #[arg(long)]
        due: Option<String>,
        /// Natural-language reminder time
        #[arg(long)]
        reminder: Option<String>,
        /// Create even if an open task with the same content exists
        #[arg(long)]
        force: bool,
    },
    /// Update a task found by content fragment
    #[command(visible_aliases = ["upd", "u"])]
    Update {
        content: String,
        #[arg(long)]
        new_content: Option<String>,
        #[arg(long)]
        priority: Option<u8>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Complete a task found by content fragment
    Done { content: String },
    /// Delete a task found by content fragment
    #[command(visible_aliases = ["del", "d", "remove", "rm"])]
    Delete { content: String },
}

/// Subcommands shared by projects, sections and labels.
#[derive(Subcommand)]
pub(crate) enum NameCommand {
    #[command(visible_aliases = ["ls", "l"])]
    List,
    #[command(visible_aliases = ["cr", "c", "add", "a"])]
    Create { name: String },
    /// Rename the entity matching NAME
    #[command(visible_aliases = ["upd", "u"])]
    Update {
        name: String,
        #[arg(long)]
        new_name: String,
    },
    #[command(visible_aliases = ["del", "d", "remove", "rm"])]
    Delete { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.debug);
    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(commands::exit_code(&err))
        }
    }
}
