//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ideanator - ARISE idea interrogation
#[derive(Parser)]
#[command(
    name = "ideanator",
    about = "Turn a vague idea into a structured, validated idea statement",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Seed for few-shot example selection
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer the interviewer's questions yourself
    Interactive {
        /// The idea; prompted for when omitted
        idea: Option<String>,

        /// Also save the result to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run every idea in a file with a simulated respondent
    Batch {
        /// Ideas file: {"ideas": [{"content": "..."}]}
        #[arg(short, long)]
        file: PathBuf,

        /// Results file (defaults to output.path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}
