use crate::config::GlobalConfig;
use crate::upgrade::{CheckOutcome, VersionChecker};
use crate::version::Channel;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

/// Ask a check endpoint whether a program is on its newest release.
///
/// # Examples
///
/// ```bash
/// artup check thing
/// artup check --program Thing --version 1.0 --build 5 --url https://example.org/check
/// artup check thing --unstable --json
/// ```
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Name of a program in the configuration file.
    #[arg(value_name = "NAME", required_unless_present = "program", conflicts_with = "program")]
    target: Option<String>,

    /// Program name sent to the endpoint.
    #[arg(long, value_name = "PROGRAM", requires_all = ["program_version", "build", "url"])]
    program: Option<String>,

    /// Installed version, e.g. `1.0`.
    #[arg(long = "version", value_name = "VERSION")]
    program_version: Option<String>,

    /// Installed build number.
    #[arg(long, value_name = "BUILD")]
    build: Option<String>,

    /// Channel of the installed release.
    #[arg(long, value_name = "CHANNEL", default_value = "stable")]
    channel: String,

    /// Version-check endpoint.
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Let Alpha, Beta and Release Candidate releases count as updates.
    #[arg(long)]
    unstable: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    program: &'a str,
    outcome: CheckOutcome,
    current_version: &'a str,
    error: Option<String>,
}

impl CheckCommand {
    fn checker(&self, config: &GlobalConfig) -> Result<VersionChecker> {
        let options = config.upgrade.checker_options(self.unstable);

        if let Some(key) = &self.target {
            let entry = config.program(key)?;
            return VersionChecker::with_options(
                key,
                &entry.version,
                &entry.build,
                entry.channel()?,
                &entry.check_url,
                options,
            )
            .with_context(|| format!("Invalid program entry '{key}'"));
        }

        let channel: Channel = self.channel.parse()?;
        VersionChecker::with_options(
            self.program.as_deref().unwrap_or_default(),
            self.program_version.as_deref().unwrap_or_default(),
            self.build.as_deref().unwrap_or_default(),
            channel,
            self.url.as_deref().unwrap_or_default(),
            options,
        )
        .context("Invalid version check arguments")
    }

    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let mut checker = self.checker(config)?;
        let outcome = checker.is_latest().await;

        if self.json {
            let report = CheckReport {
                program: checker.program(),
                outcome,
                current_version: checker.current_version(),
                error: checker.last_error().map(ToString::to_string),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let message = checker.describe(outcome);
        match outcome {
            CheckOutcome::Latest => println!("{}", message.green()),
            CheckOutcome::UpdateAvailable => println!("{}", message.yellow()),
            CheckOutcome::Indeterminate => println!("{}", message.red()),
        }
        Ok(())
    }
}
