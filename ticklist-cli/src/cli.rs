use clap::{Parser, Subcommand, ValueEnum};

use ticklist_core::FilterMode;

#[derive(Parser)]
#[command(name = "ticklist")]
#[command(about = "A small to-do list that remembers where you left off")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// View that task positions refer to
    #[arg(long, short = 'f', value_enum, default_value = "all", global = true)]
    pub filter: FilterArg,

    /// Disable colors
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => FilterMode::All,
            FilterArg::Active => FilterMode::Active,
            FilterArg::Completed => FilterMode::Completed,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adds a task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Lists tasks in the selected view
    List,

    /// Toggles task completion status
    Check {
        /// Position in the selected view, starting at 1
        #[arg(value_parser = clap::value_parser!(usize))]
        position: usize,
    },

    /// Removes a task
    Remove {
        /// Position in the selected view, starting at 1
        #[arg(value_parser = clap::value_parser!(usize))]
        position: usize,
    },

    /// Replace a task's text
    Edit {
        /// Position in the selected view, starting at 1
        #[arg(value_parser = clap::value_parser!(usize))]
        position: usize,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Remove all completed tasks
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        force: bool,
    },

    /// Toggle dark mode
    Theme,

    /// Print how many tasks are left
    Count,

    /// Restore the store from its backup file
    Recover {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        force: bool,
    },

    /// Interactive session with delayed removal
    Shell,
}
