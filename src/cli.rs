// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Deploy static sites to object storage with atomic activation and rollback")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output JSON lines for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Control-plane API token (overrides config and STAGEHAND_TOKEN)
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a stagehand.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Upload a build directory as a new version
    Deploy {
        /// Target to deploy to (configured name, control-plane id or nickname)
        target: String,

        /// Build output directory
        dir: PathBuf,

        /// Make the new version live immediately
        #[arg(short, long)]
        activate: bool,
    },

    /// Make an uploaded version live
    Activate {
        target: String,

        /// Version to activate (with or without the "v." prefix)
        version: String,
    },

    /// Permanently delete an uploaded version that is not live
    Flush {
        target: String,

        /// Version to delete (with or without the "v." prefix)
        version: String,
    },

    /// List uploaded versions, newest first
    Deployments { target: String },

    /// List control-plane targets
    Targets,

    /// Show the account the API token belongs to
    Whoami,

    /// Create an API token for CI (use with --token or STAGEHAND_TOKEN)
    Token,

    /// Purge cached pages for a target
    Invalidate {
        target: String,

        /// Comma-separated path globs
        #[arg(short, long, default_value = "*", value_delimiter = ',')]
        paths: Vec<String>,
    },
}
