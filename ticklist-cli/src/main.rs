use std::io::{self, Write};

use clap::Parser;

use ticklist_core::{FilterMode, Persistence, TaskListStore};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::display::{Style, TerminalPresenter, format_summary, render, supports_color};
use crate::error::{CliError, Result};
use crate::shell::{Shell, index_from_position};
use crate::storage::FileStore;
use crate::worker::PersistenceWorker;

mod cli;
mod config;
mod display;
mod error;
mod shell;
mod storage;
mod timer;
mod worker;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg: Config = confy::load("ticklist", None)?;
    let file_store = FileStore::new(cfg.store_path());
    log::debug!("Using store at {}", file_store.path().display());

    let use_color = cfg.color && !cli.no_color && supports_color();

    let persistence = PersistenceWorker::spawn(file_store.clone());
    let mut store = TaskListStore::new(persistence.clone());
    if matches!(cli.command, Commands::Shell) {
        store.subscribe(Box::new(TerminalPresenter::new(use_color)));
    }
    store.initialize();
    store.set_filter(FilterMode::from(cli.filter));

    match cli.command {
        Commands::Add { text } => {
            let text = text.join(" ");
            match store.add_task(&text) {
                Some(_) => println!("Task added: {}", text.trim()),
                None => println!("Nothing to add."),
            }
        }

        Commands::List => {
            let style = Style::new(store.theme(), use_color);
            println!("{}", render(&store.snapshot(), style));
        }

        Commands::Check { position } => {
            let index = index_from_position(position)?;
            let text = visible_text(&store, position, index)?;
            let completed = store
                .toggle_complete(index)
                .ok_or_else(|| no_task_at(position, store.filter()))?;
            let status = if completed { "done" } else { "open" };
            println!("Marked task {} as {}: {}", position, status, text);
        }

        Commands::Remove { position } => {
            let index = index_from_position(position)?;
            let removed = store
                .remove_task(index)
                .ok_or_else(|| no_task_at(position, store.filter()))?;
            println!("Removed: {}", removed.text);
        }

        Commands::Edit { position, text } => {
            let index = index_from_position(position)?;
            edit(&mut store, position, index, &text.join(" "))?;
        }

        Commands::Clear { force } => {
            let count = store.completed_count();
            if count == 0 {
                println!("No completed tasks to remove.");
            } else if !force && !confirm(&format!("Remove {} completed task(s)?", count))? {
                println!("Cancelled.");
            } else {
                let removed = store.clear_completed();
                println!("Removed {} completed task(s).", removed);
            }
        }

        Commands::Theme => {
            let dark = store.toggle_dark_mode();
            println!("Dark mode {}", if dark { "on" } else { "off" });
        }

        Commands::Count => {
            println!("{}", format_summary(store.remaining_count()));
        }

        Commands::Recover { force } => {
            recover(&file_store, force)?;
        }

        Commands::Shell => {
            Shell::new(&mut store, cfg.removal_delay(), use_color)
                .run()
                .await?;
        }
    }

    drop(store);
    persistence.flush().await;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn no_task_at(position: usize, filter: FilterMode) -> CliError {
    CliError::validation(
        "position",
        format!("No task at position {} in the {} view", position, filter),
    )
}

fn visible_text<P: Persistence>(
    store: &TaskListStore<P>,
    position: usize,
    index: usize,
) -> Result<String> {
    store
        .visible_tasks()
        .get(index)
        .map(|task| task.text.clone())
        .ok_or_else(|| no_task_at(position, store.filter()))
}

/// Drive one full edit session for a one-shot command
fn edit<P: Persistence>(
    store: &mut TaskListStore<P>,
    position: usize,
    index: usize,
    text: &str,
) -> Result<()> {
    let old_text = visible_text(store, position, index)?;

    if !store.start_edit(index) {
        return Err(CliError::validation(
            "edit",
            format!("Task {} is completed and cannot be edited", position),
        ));
    }

    store.update_draft(text);
    if !store.save_edit() {
        store.cancel_edit();
        return Err(CliError::validation("edit", "New text cannot be empty"));
    }

    println!("Edited task {}:", position);
    println!("  From: {}", old_text);
    println!("  To:   {}", text.trim());
    Ok(())
}

fn recover(file_store: &FileStore, force: bool) -> Result<()> {
    if !file_store.backup_exists() {
        return Err(CliError::storage("No backup file found"));
    }

    if !force && !confirm("Restore from backup? Current tasks will be replaced.")? {
        println!("Cancelled.");
        return Ok(());
    }

    file_store.recover()?;
    let mut restored = TaskListStore::new(file_store.clone());
    restored.initialize();
    println!("Recovered {} tasks from backup.", restored.tasks().len());
    Ok(())
}

/// Ask user for confirmation
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}
