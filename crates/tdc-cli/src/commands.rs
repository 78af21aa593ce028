use anyhow::{anyhow, Context, Result};
use thiserror::Error;

use tdc_client::TodoistClient;
use tdc_core::config::{self, Overrides, Settings};
use tdc_core::due::DueFilter;
use tdc_core::model::{Task, TaskUpdate};
use tdc_core::ops::{self, CreateOutcome, ListOptions, TaskCreateOutcome, TaskDraft, TaskTarget};
use tdc_core::resolve::check_scope_args;
use tdc_core::sanitize::maybe_strip;
use tdc_render as render;

use crate::{Cli, Command, GlobalArgs, NameCommand, TaskCommand};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no Todoist API token: pass --api-key or set TODOIST_API_TOKEN")]
    MissingToken,
}

/// 2 for a missing token, 1 for everything else.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CliError>() {
        Some(CliError::MissingToken) => 2,
        None => 1,
    }
}

struct Invocation {
    global: GlobalArgs,
    settings: Settings,
}

impl Invocation {
    fn client(&self) -> Result<TodoistClient> {
        let token = self.settings.api_token.as_deref().ok_or(CliError::MissingToken)?;
        TodoistClient::new(token, &self.settings.api_base_url, self.settings.timeout)
            .context("failed to set up the Todoist client")
    }

    fn strip(&self) -> bool {
        self.settings.strip_emojis
    }

    fn show_ids(&self) -> bool {
        self.settings.show_ids
    }

    fn describe(&self, title: &str, id: &str) -> String {
        let title = maybe_strip(title, self.strip());
        if self.show_ids() {
            format!("'{title}' ({id})")
        } else {
            format!("'{title}'")
        }
    }

    fn describe_task(&self, task: &Task) -> String {
        self.describe(&task.title, &task.id)
    }

    fn task_target(&self, content: String) -> TaskTarget {
        TaskTarget {
            project: self.global.project.clone(),
            section: self.global.section.clone(),
            title: content,
        }
    }

    fn section_project(&self) -> Result<&str> {
        self.global
            .project
            .as_deref()
            .ok_or_else(|| anyhow!("section commands require --project"))
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let file = config::load_config().context("failed to load configuration")?;
    let overrides = Overrides {
        api_token: cli.global.api_key.clone(),
        strip_emojis: cli.global.strip_emojis,
        show_ids: cli.global.ids,
    };
    let settings = config::resolve_settings(&overrides, |key| std::env::var(key).ok(), file.as_ref())
        .context("invalid configuration")?;
    tracing::debug!(base_url = %settings.api_base_url, "settings resolved");

    let ctx = Invocation {
        global: cli.global,
        settings,
    };
    match cli.command {
        Command::Task { command } => run_task(&ctx, command),
        Command::Project { command } => run_project(&ctx, command),
        Command::Section { command } => run_section(&ctx, command),
        Command::Label { command } => run_label(&ctx, command),
    }
}

fn run_task(ctx: &Invocation, command: TaskCommand) -> Result<()> {
    check_scope_args(ctx.global.project.as_deref(), ctx.global.section.as_deref())?;
    match command {
        TaskCommand::List {
            today,
            overdue,
            recurring,
        } => list_tasks(
            ctx,
            DueFilter {
                today,
                overdue,
                recurring,
                reference: None,
            },
        ),
        TaskCommand::Today => list_tasks(ctx, DueFilter::due_now()),
        TaskCommand::Create {
            content,
            priority,
            due,
            reminder,
            force,
        } => {
            let client = ctx.client()?;
            let snapshot = fetch(&client)?;
            let draft = TaskDraft {
                title: content,
                project: ctx.global.project.clone(),
                section: ctx.global.section.clone(),
                priority,
                due,
                reminder,
                force,
            };
            match ops::create_task(&client, &snapshot, &draft)? {
                TaskCreateOutcome::AlreadyExists(task) => {
                    println!("Task {} already exists, skipping.", ctx.describe_task(&task));
                }
                TaskCreateOutcome::Created { task, reminder } => {
                    println!("Created task {}", ctx.describe_task(&task));
                    match reminder {
                        Some(Ok(())) => println!("Reminder set for {}", ctx.describe_task(&task)),
                        Some(Err(err)) => eprintln!("warning: failed to add reminder: {err}"),
                        None => {}
                    }
                }
            }
            Ok(())
        }
        TaskCommand::Update {
            content,
            new_content,
            priority,
            due,
        } => {
            let client = ctx.client()?;
            let snapshot = fetch(&client)?;
            let update = TaskUpdate {
                title: new_content,
                priority,
                due,
            };
            let task = ops::update_task(&client, &snapshot, &ctx.task_target(content), &update)?;
            println!("Updated task {}", ctx.describe_task(&task));
            Ok(())
        }
        TaskCommand::Done { content } => {
            let client = ctx.client()?;
            let snapshot = fetch(&client)?;
            let task = ops::complete_task(&client, &snapshot, &ctx.task_target(content))?;
            println!("Completed task {}", ctx.describe_task(&task));
            Ok(())
        }
        TaskCommand::Delete { content } => {
            let client = ctx.client()?;
            let snapshot = fetch(&client)?;
            let task = ops::delete_task(&client, &snapshot, &ctx.task_target(content))?;
            println!("Deleted task {}", ctx.describe_task(&task));
            Ok(())
        }
    }
}

fn fetch(client: &TodoistClient) -> Result<tdc_core::Snapshot> {
    ops::load_snapshot(client).context("failed to fetch data from Todoist")
}

fn list_tasks(ctx: &Invocation, due: DueFilter) -> Result<()> {
    let options = ListOptions {
        project: ctx.global.project.clone(),
        section: ctx.global.section.clone(),
        show_ids: ctx.show_ids(),
        show_subtasks: ctx.global.subtasks,
        strip_emojis: ctx.strip(),
        due,
    };
    options.validate()?;
    let client = ctx.client()?;
    let snapshot = fetch(&client)?;
    let rows = ops::list_tasks(&snapshot, &options)?;
    let entries = render::task_entries(&snapshot, &rows, options.strip_emojis);

    if ctx.global.json {
        println!("{}", render::tasks_json(&entries)?);
    } else if entries.is_empty() {
        println!("No tasks found.");
    } else {
        print!("{}", render::tasks_table(&entries, options.show_subtasks));
    }
    Ok(())
}

fn print_created<T>(ctx: &Invocation, kind: &str, outcome: CreateOutcome<T>, name_id: impl Fn(&T) -> (&str, &str)) {
    match outcome {
        CreateOutcome::Created(item) => {
            let (name, id) = name_id(&item);
            println!("Created {kind} {}", ctx.describe(name, id));
        }
        CreateOutcome::AlreadyExists(item) => {
            let (name, id) = name_id(&item);
            println!("The {kind} {} already exists.", ctx.describe(name, id));
        }
    }
}

fn run_project(ctx: &Invocation, command: NameCommand) -> Result<()> {
    let client = ctx.client()?;
    match command {
        NameCommand::List => {
            let projects = ops::list_projects(&client)?;
            if ctx.global.json {
                println!("{}", render::projects_json(&projects, ctx.strip())?);
            } else {
                print!("{}", render::projects_table(&projects, ctx.show_ids(), ctx.strip()));
            }
        }
        NameCommand::Create { name } => {
            let outcome = ops::create_project(&client, &name)?;
            print_created(ctx, "project", outcome, |p| (p.name.as_str(), p.id.as_str()));
        }
        NameCommand::Update { name, new_name } => {
            let project = ops::update_project(&client, &name, &new_name)?;
            println!("Renamed project to {}", ctx.describe(&project.name, &project.id));
        }
        NameCommand::Delete { name } => {
            let project = ops::delete_project(&client, &name)?;
            println!("Deleted project {}", ctx.describe(&project.name, &project.id));
        }
    }
    Ok(())
}

fn run_section(ctx: &Invocation, command: NameCommand) -> Result<()> {
    let project = ctx.section_project()?;
    let client = ctx.client()?;
    match command {
        NameCommand::List => {
            let (_, sections) = ops::list_sections(&client, project)?;
            if ctx.global.json {
                println!("{}", render::sections_json(&sections, ctx.strip())?);
            } else {
                print!("{}", render::sections_table(&sections, ctx.show_ids(), ctx.strip()));
            }
        }
        NameCommand::Create { name } => {
            let outcome = ops::create_section(&client, project, &name)?;
            print_created(ctx, "section", outcome, |s| (s.name.as_str(), s.id.as_str()));
        }
        NameCommand::Update { name, new_name } => {
            let section = ops::update_section(&client, project, &name, &new_name)?;
            println!("Renamed section to {}", ctx.describe(&section.name, &section.id));
        }
        NameCommand::Delete { name } => {
            let section = ops::delete_section(&client, project, &name)?;
            println!("Deleted section {}", ctx.describe(&section.name, &section.id));
        }
    }
    Ok(())
}

fn run_label(ctx: &Invocation, command: NameCommand) -> Result<()> {
    let client = ctx.client()?;
    match command {
        NameCommand::List => {
            let labels = ops::list_labels(&client)?;
            if ctx.global.json {
                println!("{}", render::labels_json(&labels, ctx.strip())?);
            } else {
                print!("{}", render::labels_table(&labels, ctx.show_ids(), ctx.strip()));
            }
        }
        NameCommand::Create { name } => {
            let outcome = ops::create_label(&client, &name)?;
            print_created(ctx, "label", outcome, |l| (l.name.as_str(), l.id.as_str()));
        }
        NameCommand::Update { name, new_name } => {
            let label = ops::update_label(&client, &name, &new_name)?;
            println!("Renamed label to {}", ctx.describe(&label.name, &label.id));
        }
        NameCommand::Delete { name } => {
            let label = ops::delete_label(&client, &name)?;
            println!("Deleted label {}", ctx.describe(&label.name, &label.id));
        }
    }
    Ok(())
}
