//! Command-line interface for the solution repository.

pub mod args;
mod commands;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app::{App, AppError};

pub use args::{GlobalArgs, InputSource, OutputSink};

// =============================================================================
// Error Types
// =============================================================================

/// Reasons a `solrepo` invocation exits with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Args(#[from] args::ArgsError),

    #[error("{0}")]
    App(#[from] AppError),

    /// The requested resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The repository reported a server error; details are in the log.
    #[error("{operation} of {identifier} failed")]
    ServerError {
        operation: &'static str,
        identifier: String,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// solrepo - Browse and edit a solution repository.
#[derive(Parser, Debug)]
#[command(name = "solrepo", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Repository operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the repository as a tree of folders and files.
    List(commands::repository::ListArgs),

    /// Print the content of a resource.
    Load(commands::repository::LoadArgs),

    /// Create or replace a resource.
    Save(commands::repository::SaveArgs),

    /// Delete a resource.
    Delete(commands::repository::DeleteArgs),
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Build the app from configuration and run the selected command.
    pub async fn run(self) -> Result<()> {
        let app = App::from_config(self.global.to_app_context())?;

        match self.command {
            Command::List(args) => args.run(&app, &self.global).await,
            Command::Load(args) => args.run(&app, &self.global).await,
            Command::Save(args) => args.run(&app, &self.global).await,
            Command::Delete(args) => args.run(&app, &self.global).await,
        }
    }
}

/// Parse the process arguments and run them.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}
