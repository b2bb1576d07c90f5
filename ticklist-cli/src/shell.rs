//! Interactive shell
//!
//! Reads one intent per line and forwards it to the store. A single
//! `select!` loop handles both input lines and removal timers firing, so
//! the store is only ever touched from here.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use ticklist_core::{FilterMode, PendingRemoval, Persistence, TaskListStore};

use crate::display::{Style, render};
use crate::error::{CliError, Result};
use crate::timer::{RemovalQueue, RemovalTimer};

const HELP: &str = "\
Commands:
  add <text>        add a task
  input <text>      type into the new-task field
  submit            add what is in the new-task field
  check <n>         toggle task n done/not done
  rm <n>            remove task n
  edit <n>          start editing task n
  draft <text>      replace the edit draft
  save              save the edit
  cancel            discard the edit
  filter <mode>     all | active | completed
  theme             toggle dark mode
  clear             remove completed tasks
  list              show the list
  help              show this help
  quit              leave (pending removals are committed)
Positions refer to the list as currently filtered, starting at 1.";

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(String),
    Input(String),
    Submit,
    Check(usize),
    Remove(usize),
    Edit(usize),
    Draft(String),
    Save,
    Cancel,
    Filter(FilterMode),
    Theme,
    Clear,
    List,
    Help,
    Quit,
}

/// Parse a line into a command; blank lines yield `None`
///
/// Positions are 1-based on the line and 0-based in the result.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim_start();
    if line.trim().is_empty() {
        return Ok(None);
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_end_matches(['\r', '\n']);

    let command = match word.to_lowercase().as_str() {
        "add" | "a" => ShellCommand::Add(rest.to_string()),
        "input" | "type" => ShellCommand::Input(rest.to_string()),
        "submit" => ShellCommand::Submit,
        "check" | "toggle" | "x" => ShellCommand::Check(parse_position(rest)?),
        "rm" | "remove" | "delete" => ShellCommand::Remove(parse_position(rest)?),
        "edit" | "e" => ShellCommand::Edit(parse_position(rest)?),
        "draft" => ShellCommand::Draft(rest.to_string()),
        "save" => ShellCommand::Save,
        "cancel" | "esc" => ShellCommand::Cancel,
        "filter" | "f" => ShellCommand::Filter(rest.parse()?),
        "theme" | "dark" => ShellCommand::Theme,
        "clear" => ShellCommand::Clear,
        "list" | "ls" => ShellCommand::List,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(CliError::parse(format!("Unknown command: {}", other))),
    };

    Ok(Some(command))
}

/// Turn a 1-based position argument into a 0-based index
pub fn parse_position(arg: &str) -> Result<usize> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(CliError::validation("position", "A task position is required"));
    }

    let position: usize = arg
        .parse()
        .map_err(|e| CliError::parse_with_source(format!("Not a position: {}", arg), e))?;
    index_from_position(position)
}

/// 1-based position to 0-based index
pub fn index_from_position(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| CliError::validation("position", "Positions start at 1"))
}

/// Whether the loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Event loop state around a store
pub struct Shell<'a, P: Persistence> {
    store: &'a mut TaskListStore<P>,
    removal_delay: Duration,
    use_color: bool,
    removals: RemovalQueue,
    due_tx: mpsc::UnboundedSender<PendingRemoval>,
    due_rx: mpsc::UnboundedReceiver<PendingRemoval>,
}

impl<'a, P: Persistence> Shell<'a, P> {
    pub fn new(store: &'a mut TaskListStore<P>, removal_delay: Duration, use_color: bool) -> Self {
        let (due_tx, due_rx) = mpsc::unbounded_channel();
        Self {
            store,
            removal_delay,
            use_color,
            removals: RemovalQueue::new(),
            due_tx,
            due_rx,
        }
    }

    /// Run until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("Type 'help' for commands.");
        prompt();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = line.map_err(|e| CliError::io("Failed to read input", e))?;
                    let Some(line) = line else { break };

                    match parse_command(&line) {
                        Ok(Some(command)) => {
                            if self.apply(command) == Flow::Quit {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => eprintln!("{}", e),
                    }
                    prompt();
                }

                Some(pending) = self.due_rx.recv() => {
                    self.commit(pending);
                }
            }
        }

        if self.pending_removals() > 0 {
            log::debug!("Committing {} pending removal(s) on exit", self.pending_removals());
        }
        self.shutdown();
        Ok(())
    }

    /// Forward one command to the store
    pub fn apply(&mut self, command: ShellCommand) -> Flow {
        match command {
            ShellCommand::Add(text) => {
                self.store.add_task(&text);
            }
            ShellCommand::Input(text) => self.store.set_input(text),
            ShellCommand::Submit => {
                self.store.submit_input();
            }
            ShellCommand::Check(index) => {
                self.store.toggle_complete(index);
            }
            ShellCommand::Remove(index) => {
                if let Some(pending) = self.store.mark_for_removal(index) {
                    let timer =
                        RemovalTimer::schedule(pending, self.removal_delay, self.due_tx.clone());
                    self.removals.push(timer);
                }
            }
            ShellCommand::Edit(index) => {
                self.store.start_edit(index);
            }
            ShellCommand::Draft(text) => {
                self.store.update_draft(text);
            }
            ShellCommand::Save => {
                self.store.save_edit();
            }
            ShellCommand::Cancel => {
                self.store.cancel_edit();
            }
            ShellCommand::Filter(mode) => self.store.set_filter(mode),
            ShellCommand::Theme => {
                self.store.toggle_dark_mode();
            }
            ShellCommand::Clear => {
                self.store.clear_completed();
            }
            ShellCommand::List => {
                let style = Style::new(self.store.theme(), self.use_color);
                println!("\n{}", render(&self.store.snapshot(), style));
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Number of removals still waiting for their timer
    pub fn pending_removals(&self) -> usize {
        self.removals.len()
    }

    fn commit(&mut self, pending: PendingRemoval) {
        self.removals.settle(pending);
        self.store.commit_removal(pending);
    }

    /// Commit every removal that was requested but has not fired yet
    pub fn shutdown(&mut self) {
        if self.removals.is_empty() {
            return;
        }
        for pending in self.removals.cancel_all() {
            self.store.commit_removal(pending);
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
