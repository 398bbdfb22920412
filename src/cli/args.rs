//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Compose microservice architecture descriptors and draw their dependency graphs
#[derive(Parser, Debug)]
#[command(name = "archsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory for local config lookup (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Abort on the first rejected field write
    #[arg(long, global = true)]
    pub strict: bool,

    /// Emit compact JSON
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an edit script and print the descriptor document
    Compose {
        /// Edit script
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
    },

    /// Replay an edit script and print the descriptor hierarchy
    Tree {
        /// Edit script
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
    },

    /// Replay an edit script and list service or operation names
    Names {
        /// Edit script
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// List the operations of this service instead
        #[arg(short, long)]
        service: Option<String>,
    },

    /// Build and aggregate the dependency graph of a descriptor document
    Graph {
        /// Descriptor document (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        descriptor: PathBuf,
    },

    /// Aggregate a raw {nodes, links} graph document
    Aggregate {
        /// Graph document (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        graph: PathBuf,
    },

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
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
