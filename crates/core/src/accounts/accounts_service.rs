use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_repository::AccountRepository;
use crate::accounts::{AccountError, Result};
use crate::transactions::TransactionService;

/// Service for managing accounts
pub struct AccountService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    transaction_service: Arc<TransactionService>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        transaction_service: Arc<TransactionService>,
    ) -> Self {
        Self {
            pool,
            transaction_service,
        }
    }

    /// Creates a new account with its current balance seeded from the
    /// initial balance
    pub async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        debug!("Creating account: {}", new_account.name);
        let repo = AccountRepository::new(self.pool.clone());
        repo.create(new_account)
    }

    /// Updates an existing account
    pub fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        let repo = AccountRepository::new(self.pool.clone());
        repo.update(account_update)
    }

    /// Retrieves an account by its ID
    pub fn get_account(&self, account_id: &str) -> Result<Account> {
        let repo = AccountRepository::new(self.pool.clone());
        repo.get_by_id(account_id)
    }

    /// Lists all accounts with optional filtering by archived status
    pub fn list_accounts(&self, archived_filter: Option<bool>) -> Result<Vec<Account>> {
        let repo = AccountRepository::new(self.pool.clone());
        repo.list(archived_filter)
    }

    /// Lists all accounts
    pub fn get_all_accounts(&self) -> Result<Vec<Account>> {
        self.list_accounts(None)
    }

    /// Lists only accounts that have not been archived
    pub fn get_active_accounts(&self) -> Result<Vec<Account>> {
        self.list_accounts(Some(false))
    }

    /// Archives an account. All transactions touching the account are
    /// reverted and removed first, which also restores the budgets and goal
    /// amounts they affected.
    pub async fn archive_account(&self, account_id: &str) -> Result<()> {
        debug!("Archiving account: {}", account_id);

        self.transaction_service
            .purge_account_transactions(account_id)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let repo = AccountRepository::new(self.pool.clone());
        repo.set_archived(account_id, true)
    }

    /// Deletes an account by its ID, reverting its transaction history the
    /// same way archival does
    pub async fn delete_account(&self, account_id: &str) -> Result<()> {
        debug!("Deleting account: {}", account_id);

        self.transaction_service
            .purge_account_transactions(account_id)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let repo = AccountRepository::new(self.pool.clone());
        repo.delete(account_id)?;
        Ok(())
    }
}
