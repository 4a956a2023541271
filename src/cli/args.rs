//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::Viewport;

/// Binary search tree visualizer: watch insert and search decisions step by step
#[derive(Parser, Debug)]
#[command(name = "bstviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Pause between animation steps in milliseconds (overrides config)
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Start from an empty tree instead of the sample
    #[arg(long, global = true)]
    pub empty: bool,

    /// Comma-separated keys to start from instead of the sample
    #[arg(long, global = true, conflicts_with = "empty", allow_hyphen_values = true)]
    pub seed: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tree and its statistics
    Show,

    /// Insert comma-separated keys, animating each decision path
    Insert {
        /// Keys, e.g. "45,10,65"; non-numeric tokens are ignored
        #[arg(allow_hyphen_values = true)]
        keys: String,
        /// Apply all insertions at once without animation
        #[arg(long)]
        instant: bool,
    },

    /// Search for a key, animating the decision path
    Search {
        /// Key to look for
        #[arg(allow_hyphen_values = true)]
        key: String,
    },

    /// Print node coordinates and canvas extent
    Layout {
        /// Available drawing area (WIDTHxHEIGHT) for the fit-to-viewport scale
        #[arg(long, value_parser = parse_viewport)]
        viewport: Option<Viewport>,
    },

    /// Interactive session reading commands from stdin
    Repl,

    /// Show effective settings
    Info,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn parse_viewport(s: &str) -> Result<Viewport, String> {
    s.parse::<Viewport>().map_err(|e| e.to_string())
}
