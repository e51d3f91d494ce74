use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use todostore::config::Config;
use todostore::{Priority, StatusFilter, Task, TaskStore};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "Manage a to-do list kept in a single JSON file")]
#[command(version)]
struct Cli {
    /// Path to the task file (default: from config, else the user data directory)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        #[arg(required = true)]
        text: Vec<String>,

        #[arg(short, long, default_value_t = Priority::Normal)]
        priority: Priority,
    },

    /// List tasks
    List {
        /// all, active or completed
        #[arg(long, default_value_t = StatusFilter::All)]
        filter: StatusFilter,

        /// Case-insensitive text to search for
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Flip a task between done and not done
    Toggle { index: usize },

    /// Mark a task done
    Done { index: usize },

    /// Replace the text of a task
    Edit {
        index: usize,

        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Delete a task
    Rm { index: usize },

    /// Delete all completed tasks
    Clear,

    /// Show task counts
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose)?;

    let path = config.resolve_data_file(cli.file);
    let mut store = TaskStore::open(&path);
    if let Some(warning) = store.load_warning() {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    let mut filter = StatusFilter::All;
    let mut search = String::new();

    match cli.command {
        Commands::Add { text, priority } => {
            store
                .add(&text.join(" "), priority)
                .wrap_err("Failed to add task")?;
        }
        Commands::List {
            filter: list_filter,
            search: term,
        } => {
            filter = list_filter;
            search = term;
        }
        Commands::Toggle { index } => {
            store.toggle_done(index).wrap_err("Failed to toggle task")?;
        }
        Commands::Done { index } => {
            store.mark_done(index).wrap_err("Failed to mark task done")?;
        }
        Commands::Edit { index, text } => {
            store
                .edit(index, &text.join(" "))
                .wrap_err("Failed to edit task")?;
        }
        Commands::Rm { index } => {
            let task = store.delete(index).wrap_err("Failed to delete task")?;
            println!("Deleted '{}'", task.text);
        }
        Commands::Clear => {
            let removed = store.clear_completed().wrap_err("Failed to clear completed tasks")?;
            println!("Removed {} completed task(s)", removed);
        }
        Commands::Stats => {
            let stats = store.stats();
            println!(
                "{} total, {} active, {} completed",
                stats.total, stats.active, stats.completed
            );
            return Ok(());
        }
    }

    render(&store, filter, &search);
    Ok(())
}

fn init_tracing(config: &Config, verbose: u8) -> Result<()> {
    let from_flags = match verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let level = config.level_filter()?.max(from_flags);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    Ok(())
}

fn render(store: &TaskStore, filter: StatusFilter, search: &str) {
    let mut shown = 0;
    for (index, task) in store.query(filter, search) {
        println!("{:>3}  {}", index, format_task(task));
        shown += 1;
    }

    if shown == 0 {
        println!("No tasks");
    }

    let stats = store.stats();
    println!("{}", format!("{} of {} left", stats.active, stats.total).dimmed());
}

fn format_task(task: &Task) -> String {
    let line = if task.done {
        format!("✓ {}", task.text).green()
    } else {
        format!("○ {}", task.text).red()
    };

    match task.priority {
        Priority::High => format!("{} {}", line, "(high)".bold()),
        Priority::Low => format!("{} {}", line, "(low)".dimmed()),
        Priority::Normal => line.to_string(),
    }
}
