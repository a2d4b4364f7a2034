use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use todo_fridge::app::{TodoApp, ViewMode};
use todo_fridge::cache::{FolderStore, DEFAULT_FOLDER};
use todo_fridge::calendar::Month;
use todo_fridge::fallback::StaticResource;
use todo_fridge::gateway::Gateway;
use todo_fridge::utils::{print_calendar, print_snapshot};
use todo_fridge::{parse_due_date, parse_time};

/// A to-do list with a calendar view
#[derive(Parser, Debug)]
#[command(name = "todo", version)]
struct Cli {
    /// Folder the task list is stored in
    #[arg(long, default_value = DEFAULT_FOLDER)]
    data_dir: PathBuf,

    /// Document to start from when nothing is stored yet (a path, or an http(s) URL)
    #[arg(long)]
    fallback: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the active and completed tasks
    List,

    /// Add a task. Times and due date default to now
    Add {
        text: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// e.g. 09:30 or "9:30 AM"
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// e.g. 2024-03-05 or 2024-03-05T18:00
        #[arg(long)]
        due: Option<String>,
    },

    /// Mark the active task at this position as done
    Complete { index: usize },

    /// Move the completed task at this position back to the active tasks
    Restore { index: usize },

    /// Delete the active task at this position
    Remove { index: usize },

    /// Delete every task
    Clear,

    /// Show a month view (YYYY-MM, defaults to the current month)
    Calendar { month: Option<String> },

    /// Write the task list as a JSON document into a folder
    Export {
        #[arg(default_value = ".")]
        folder: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        log::error!("{}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let fallback = cli.fallback.as_deref()
        .map(StaticResource::from_location)
        .unwrap_or_default();
    let gateway = Gateway::new(FolderStore::new(&cli.data_dir), fallback);

    let mut app = TodoApp::new(gateway);
    app.load().await;

    match cli.cmd {
        Command::List => print_snapshot(&app.store().snapshot()),

        Command::Add { text, notes, start, end, due } => {
            app.set_input(text);
            app.set_notes(notes);
            if let Some(start) = start {
                app.set_start_time(parse_time(&start).ok_or_else(|| format!("Invalid start time {:?}", start))?);
            }
            if let Some(end) = end {
                app.set_end_time(parse_time(&end).ok_or_else(|| format!("Invalid end time {:?}", end))?);
            }
            if let Some(due) = due {
                app.set_due_date(parse_due_date(&due).ok_or_else(|| format!("Invalid due date {:?}", due))?);
            }
            match app.submit() {
                None => println!("Nothing to add: the text is blank"),
                Some(task) => println!("Added task {}", task.id()),
            }
        },

        Command::Complete { index } => app.complete(index)?,
        Command::Restore { index } => app.restore(index)?,
        Command::Remove { index } => {
            let task = app.remove(index)?;
            println!("Removed {:?}", task.text());
        },
        Command::Clear => app.clear_all(),

        Command::Calendar { month } => {
            let month = match month {
                None => Month::current(),
                Some(m) => parse_month(&m)?,
            };
            app.set_view_mode(ViewMode::Calendar);
            app.show_month(month);
            print_calendar(app.displayed_month(), app.store().active());
        },

        Command::Export { folder } => {
            let path = app.export(&folder)?;
            println!("Exported to {}", path.display());
        },
    }

    Ok(())
}

fn parse_month(input: &str) -> Result<Month, Box<dyn Error>> {
    let (year, month) = match input.split_once('-') {
        Some(parts) => parts,
        None => return Err(format!("Invalid month {:?}, expected YYYY-MM", input).into()),
    };
    Ok(Month::new(year.parse()?, month.parse()?)?)
}
