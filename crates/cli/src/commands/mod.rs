//! CLI command definitions and execution
//!
//! Each command parses its remote path, opens an authorized session for the
//! account it names, and maps library errors onto [`ExitCode`]s.

use std::sync::Arc;

use b2_core::{AccountManager, Bucket, ConfigManager, RemotePath, Session};
use b2_http::ReqwestTransport;
use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod account;
mod completions;
mod get;
mod hide;
mod ls;
mod mb;
mod put;
mod rb;
mod rm;
mod stat;
mod update;

/// b2 - Backblaze B2 cloud storage client
#[derive(Parser, Debug)]
#[command(name = "b2")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored application keys
    #[command(subcommand)]
    Account(account::AccountCommands),

    /// List buckets, or the files in a bucket
    Ls(ls::LsArgs),

    /// Create a bucket
    Mb(mb::MbArgs),

    /// Remove a bucket
    Rb(rb::RbArgs),

    /// Make a bucket public or private
    Update(update::UpdateArgs),

    /// Upload a file
    Put(put::PutArgs),

    /// Download a file
    Get(get::GetArgs),

    /// Show metadata of a file version
    Stat(stat::StatArgs),

    /// Hide a file
    Hide(hide::HideArgs),

    /// Delete a file version
    Rm(rm::RmArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    // Unreadable config falls back to defaults here; commands that need it report the error
    let defaults = ConfigManager::new()
        .and_then(|m| m.load())
        .map(|c| c.defaults)
        .unwrap_or_default();
    let output_config =
        OutputConfig::from_flags(cli.json, cli.no_color, cli.no_progress, cli.quiet, &defaults);

    match cli.command {
        Commands::Account(cmd) => account::execute(cmd, output_config).await,
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Mb(args) => mb::execute(args, output_config).await,
        Commands::Rb(args) => rb::execute(args, output_config).await,
        Commands::Update(args) => update::execute(args, output_config).await,
        Commands::Put(args) => put::execute(args, output_config).await,
        Commands::Get(args) => get::execute(args, output_config).await,
        Commands::Stat(args) => stat::execute(args, output_config).await,
        Commands::Hide(args) => hide::execute(args, output_config).await,
        Commands::Rm(args) => rm::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Authorize the stored account `name`
pub(crate) async fn connect(name: &str) -> b2_core::Result<Arc<Session>> {
    let account = AccountManager::new()?.get(name)?;
    Session::authorize(
        Arc::new(ReqwestTransport::new()),
        &account.auth_url,
        &account.account_id,
        &account.application_key,
    )
    .await
}

/// Authorize the path's account and look up its bucket
pub(crate) async fn open_bucket(path: &RemotePath) -> b2_core::Result<Bucket> {
    let bucket = path.require_bucket()?;
    connect(&path.account).await?.bucket(bucket).await
}

/// Report `error` and pick the matching exit code
pub(crate) fn fail(formatter: &Formatter, context: &str, error: &b2_core::Error) -> ExitCode {
    tracing::debug!(error = ?error, "{context}");
    formatter.error(&format!("{context}: {error}"));
    ExitCode::from_error(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["b2", "--json", "ls", "work"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Ls(_)));
    }

    #[test]
    fn test_fail_maps_error_to_exit_code() {
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let code = fail(
            &formatter,
            "Failed",
            &b2_core::Error::BucketNotFound("cats".into()),
        );
        assert_eq!(code, ExitCode::NotFound);
    }
}
