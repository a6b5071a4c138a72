//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Hierarchical tri-state filter tree: toggle, persist and project filter selections
#[derive(Parser, Debug)]
#[command(name = "filtertree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Tree definition file (JSON or TOML)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub definition: Option<PathBuf>,

    /// Snapshot file (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the filter tree
    Show {
        /// Expand closed groups too
        #[arg(short, long)]
        all: bool,
    },

    /// Toggle the check state of a node
    Toggle {
        /// Node id
        id: String,
    },

    /// Open or close a group
    Open {
        /// Node id
        id: String,
    },

    /// Set the value of a slider, input or picker
    Set {
        /// Node id
        id: String,
        /// New value (numbers are parsed, anything else is text)
        value: String,
    },

    /// Print the effective selection (checked leaves and values)
    Project {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter a detections file by the current selection
    Filter {
        /// JSON array of detections, or {"detections": [...]}
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Discard the snapshot and start over from the definition
    Reset,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print a config template
    Template,
    /// Print the global config file location
    Path,
}
