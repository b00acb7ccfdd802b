//! Stored accounts
//!
//! An account is a named application key. Commands refer to it by name as the
//! first segment of a remote path.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};
use crate::session::DEFAULT_AUTH_URL;

/// A named application key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique name for this account
    pub name: String,

    /// Application key id (or account id for the master key)
    pub account_id: String,

    pub application_key: String,

    /// Authorization endpoint
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        account_id: impl Into<String>,
        application_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            account_id: account_id.into(),
            application_key: application_key.into(),
            auth_url: default_auth_url(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("account_id", &self.account_id)
            .field("auth_url", &self.auth_url)
            .finish_non_exhaustive()
    }
}

/// CRUD over the accounts stored in the configuration file
pub struct AccountManager {
    config_manager: ConfigManager,
}

impl AccountManager {
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Use the default config location
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_manager: ConfigManager::new()?,
        })
    }

    pub fn list(&self) -> Result<Vec<Account>> {
        Ok(self.config_manager.load()?.accounts)
    }

    pub fn get(&self, name: &str) -> Result<Account> {
        self.config_manager
            .load()?
            .accounts
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::AccountNotFound(name.to_string()))
    }

    /// Add an account, replacing any existing one with the same name
    pub fn set(&self, account: Account) -> Result<()> {
        if account.name.is_empty() || account.name.contains('/') {
            return Err(Error::Config(format!(
                "Invalid account name '{}'",
                account.name
            )));
        }

        let mut config = self.config_manager.load()?;
        config.accounts.retain(|a| a.name != account.name);
        config.accounts.push(account);

        self.config_manager.save(&config)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.accounts.len();

        config.accounts.retain(|a| a.name != name);

        if config.accounts.len() == original_len {
            return Err(Error::AccountNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .config_manager
            .load()?
            .accounts
            .iter()
            .any(|a| a.name == name))
    }
}
