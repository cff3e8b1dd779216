// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for pipewright

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Browser, BumpLevel, Environment};

#[derive(Parser, Debug)]
#[command(name = "pipewright")]
#[command(about = "A build pipeline runner for front-end projects")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one or more pipeline tasks
    Run {
        #[arg(help = "Task names to run", default_value = "default")]
        tasks: Vec<String>,

        #[arg(long, help = "Target environment (prod, dev, test)")]
        env: Option<Environment>,

        #[arg(
            long,
            help = "Test browser (PhantomJS, Chrome, Firefox, Safari)"
        )]
        browsers: Option<Browser>,

        #[arg(long, help = "Rewrite asset URLs against the CDN base")]
        cdn: bool,

        #[arg(
            long = "type",
            value_name = "LEVEL",
            help = "Version bump level (major, minor, patch)"
        )]
        bump: Option<BumpLevel>,

        #[arg(long, help = "Maximum number of concurrent tasks")]
        max_concurrent: Option<usize>,

        #[arg(short, long, help = "Write the run result as JSON to a file")]
        output: Option<PathBuf>,
    },

    /// List the registered tasks and their prerequisites
    List,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
