//! Command-line interface definitions.
//!
//! `stencil <SITE> <COMMAND>`, using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stencil static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Site directory containing content/, layouts/, assets/ and extra/
    pub site: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared server arguments for Serve and Watch commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Interface to bind on
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Wipe the output directory and build the site once
    Build,

    /// Build once, then serve the output directory
    Serve {
        #[command(flatten)]
        server: ServeArgs,
    },

    /// Build, serve, and rebuild whenever a source file changes
    Watch {
        #[command(flatten)]
        server: ServeArgs,
    },
}

impl Cli {
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
}
