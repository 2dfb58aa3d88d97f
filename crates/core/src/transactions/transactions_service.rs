use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::AccountRepository;
use crate::budgets::BudgetRepository;
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::goals::GoalRepository;
use crate::transactions::transactions_model::{
    format_date, NewTransaction, Transaction, TransactionDB, TransactionFilters, TransactionType,
    TransactionUpdate,
};
use crate::transactions::transactions_repository::TransactionRepository;

/// Service orchestrating transaction mutations.
///
/// Every mutation runs inside a single database transaction covering the
/// transaction row, the affected account balances, the matching budget's
/// spent amount, and any linked goal contribution. Readers always see one
/// consistent snapshot of those aggregates.
pub struct TransactionService {
    pool: Arc<DbPool>,
    repository: Arc<TransactionRepository>,
}

impl TransactionService {
    pub fn new(pool: Arc<DbPool>, repository: Arc<TransactionRepository>) -> Self {
        TransactionService { pool, repository }
    }

    pub fn list_transactions(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>> {
        self.repository.list(filters)
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.repository.get_by_id(transaction_id)
    }

    /// Records a transaction and applies its effects: balance deltas by
    /// type, and the budget spent amount for categorized expenses.
    pub async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        let mut row: TransactionDB = new_transaction.into();
        row.id = Uuid::new_v4().to_string();
        debug!("Creating transaction {} ({})", row.id, row.transaction_type);

        let created = self.pool.execute(|conn| -> std::result::Result<TransactionDB, Error> {
            let tx: Transaction = row.clone().into();

            match tx.transaction_type {
                TransactionType::Income => {
                    AccountRepository::apply_balance_delta(conn, &tx.account_id, tx.amount)?;
                }
                TransactionType::Expense => {
                    AccountRepository::apply_balance_delta(conn, &tx.account_id, -tx.amount)?;
                }
                TransactionType::Transfer => {
                    let destination = tx.transfer_to_account_id.as_deref().unwrap_or_default();
                    AccountRepository::apply_balance_delta(conn, &tx.account_id, -tx.amount)?;
                    AccountRepository::apply_balance_delta(conn, destination, tx.amount)?;
                }
            }

            if tx.transaction_type == TransactionType::Expense {
                if let Some(ref category) = tx.category_id {
                    BudgetRepository::apply_spent_delta(
                        conn,
                        category,
                        tx.transaction_date,
                        tx.amount,
                    )?;
                }
            }

            TransactionRepository::insert_with_conn(conn, &row)?;
            Ok(row.clone())
        })?;

        Ok(created.into())
    }

    /// Edits a transaction's amount, category, description or date. The old
    /// effect is reversed and the new one applied; a linked goal
    /// contribution is kept in step with the new amount.
    pub async fn update_transaction(
        &self,
        transaction_id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        update.validate()?;
        debug!("Updating transaction {}", transaction_id);

        let updated = self.pool.execute(|conn| -> std::result::Result<TransactionDB, Error> {
            let existing_db = TransactionRepository::get_db_by_id(conn, transaction_id)?;
            let existing: Transaction = existing_db.clone().into();

            match existing.transaction_type {
                TransactionType::Income => {
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        -existing.amount,
                    )?;
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        update.amount,
                    )?;
                }
                TransactionType::Expense => {
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        existing.amount,
                    )?;
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        -update.amount,
                    )?;
                }
                TransactionType::Transfer => {
                    let destination = existing.transfer_to_account_id.as_deref().unwrap_or_default();
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        existing.amount - update.amount,
                    )?;
                    AccountRepository::apply_balance_delta(
                        conn,
                        destination,
                        update.amount - existing.amount,
                    )?;
                }
            }

            if existing.transaction_type == TransactionType::Expense {
                if let Some(ref category) = existing.category_id {
                    BudgetRepository::apply_spent_delta(
                        conn,
                        category,
                        existing.transaction_date,
                        -existing.amount,
                    )?;
                }
                if let Some(ref category) = update.category_id {
                    BudgetRepository::apply_spent_delta(
                        conn,
                        category,
                        update.transaction_date,
                        update.amount,
                    )?;
                }
            }

            if let Some(contribution) =
                GoalRepository::find_contribution_by_transaction(conn, transaction_id)?
            {
                GoalRepository::adjust_contribution_amount(conn, &contribution, update.amount)?;
            }

            let row = TransactionDB {
                amount: update.amount.to_string(),
                category_id: update.category_id.clone(),
                description: update.description.clone(),
                transaction_date: format_date(update.transaction_date),
                updated_at: chrono::Utc::now().to_rfc3339(),
                ..existing_db
            };
            TransactionRepository::update_with_conn(conn, &row)?;
            Ok(row)
        })?;

        Ok(updated.into())
    }

    /// Deletes a transaction, reversing every effect it had: account
    /// balances, budget spent amount, and any goal contribution it backed.
    /// A goal that already completed stays completed.
    pub async fn delete_transaction(&self, transaction_id: &str) -> Result<()> {
        debug!("Deleting transaction {}", transaction_id);

        self.pool.execute(|conn| -> std::result::Result<(), Error> {
            let existing: Transaction =
                TransactionRepository::get_db_by_id(conn, transaction_id)?.into();

            match existing.transaction_type {
                TransactionType::Income => {
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        -existing.amount,
                    )?;
                }
                TransactionType::Expense => {
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        existing.amount,
                    )?;
                }
                TransactionType::Transfer => {
                    let destination = existing.transfer_to_account_id.as_deref().unwrap_or_default();
                    AccountRepository::apply_balance_delta(
                        conn,
                        &existing.account_id,
                        existing.amount,
                    )?;
                    AccountRepository::apply_balance_delta(conn, destination, -existing.amount)?;
                }
            }

            if existing.transaction_type == TransactionType::Expense {
                if let Some(ref category) = existing.category_id {
                    BudgetRepository::apply_spent_delta(
                        conn,
                        category,
                        existing.transaction_date,
                        -existing.amount,
                    )?;
                }
            }

            if let Some(contribution) =
                GoalRepository::find_contribution_by_transaction(conn, transaction_id)?
            {
                GoalRepository::revert_contribution(conn, &contribution)?;
            }

            TransactionRepository::delete_with_conn(conn, transaction_id)?;
            Ok(())
        })
    }

    /// Reverts and removes every transaction touching the account, as either
    /// source or transfer destination. Used by account archival and deletion.
    pub async fn purge_account_transactions(&self, account_id: &str) -> Result<usize> {
        let related = self.repository.list_touching_account(account_id)?;
        let count = related.len();

        for tx in related {
            self.delete_transaction(&tx.id).await?;
        }

        Ok(count)
    }
}
