//! artup CLI entry point
//!
//! Parses the command line, runs the selected command and turns any failure
//! into a user-friendly message with exit status 1.
//!
//! - `upgrade` - replace an artifact with the newest download
//! - `rollback` - restore an artifact from its backup
//! - `check` - check a program's release channels for updates

use anyhow::Result;
use artup_cli::cli;
use artup_cli::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
