//! Account management commands
//!
//! An account is a named application key stored in the config file.

use b2_core::{Account, AccountManager, DEFAULT_AUTH_URL};
use clap::Subcommand;
use serde::Serialize;

use super::fail;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Account subcommands
#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// Add or update an account
    Set(SetArgs),

    /// List stored accounts
    List(ListArgs),

    /// Remove an account
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Account name used in paths (e.g., "work" in work/bucket/file)
    pub name: String,

    /// Application key id
    pub key_id: String,

    /// Application key
    #[arg(env = "B2_APPLICATION_KEY", hide_env_values = true)]
    pub application_key: String,

    /// Authorization endpoint
    #[arg(long, default_value = DEFAULT_AUTH_URL)]
    pub auth_url: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show the authorization endpoint too
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub name: String,
}

/// Account information for output (without the key)
#[derive(Debug, Serialize)]
struct AccountInfo {
    name: String,
    key_id: String,
    auth_url: String,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            key_id: account.account_id.clone(),
            auth_url: account.auth_url.clone(),
        }
    }
}

#[derive(Serialize)]
struct AccountListOutput {
    accounts: Vec<AccountInfo>,
}

#[derive(Serialize)]
struct AccountOperationOutput {
    success: bool,
    account: String,
    message: String,
}

/// Execute an account subcommand
pub async fn execute(cmd: AccountCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let manager = match AccountManager::new() {
        Ok(m) => m,
        Err(e) => return fail(&formatter, "Failed to open configuration", &e),
    };

    match cmd {
        AccountCommands::Set(args) => execute_set(args, &manager, &formatter),
        AccountCommands::List(args) => execute_list(args, &manager, &formatter),
        AccountCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn execute_set(args: SetArgs, manager: &AccountManager, formatter: &Formatter) -> ExitCode {
    if args.key_id.is_empty() || args.application_key.is_empty() {
        formatter.error("Key id and application key cannot be empty");
        return ExitCode::UsageError;
    }

    let mut account = Account::new(&args.name, args.key_id, args.application_key);
    account.auth_url = args.auth_url;

    match manager.set(account) {
        Ok(()) => {
            let message = format!("Account '{}' configured successfully", args.name);
            if formatter.is_json() {
                formatter.json(&AccountOperationOutput {
                    success: true,
                    account: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, "Failed to save account", &e),
    }
}

fn execute_list(args: ListArgs, manager: &AccountManager, formatter: &Formatter) -> ExitCode {
    let accounts = match manager.list() {
        Ok(accounts) => accounts,
        Err(e) => return fail(formatter, "Failed to load accounts", &e),
    };

    if formatter.is_json() {
        formatter.json(&AccountListOutput {
            accounts: accounts.iter().map(AccountInfo::from).collect(),
        });
    } else if accounts.is_empty() {
        formatter.println("No accounts configured.");
    } else {
        for account in &accounts {
            if args.long {
                formatter.println(&format!(
                    "{:<12} {} ({})",
                    account.name, account.account_id, account.auth_url
                ));
            } else {
                formatter.println(&format!("{:<12} {}", account.name, account.account_id));
            }
        }
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &AccountManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Account '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&AccountOperationOutput {
                    success: true,
                    account: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, "Failed to remove account", &e),
    }
}
