use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::transactions;
use crate::schema::transactions::dsl::*;
use crate::transactions::transactions_errors::TransactionError;
use crate::transactions::transactions_model::{
    format_date, SortDirection, Transaction, TransactionDB, TransactionFilters, TransactionSortBy,
    TransactionType,
};

pub struct TransactionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        TransactionRepository { pool }
    }

    /// Lists transactions matching the given filters.
    ///
    /// Structural filters run in SQL; the amount range is applied after
    /// mapping because amounts are stored as text. Default order is date
    /// descending, newest first.
    pub fn list(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = transactions::table.into_boxed();

        if let Some(ref account) = filters.account_id {
            query = query.filter(account_id.eq(account.clone()));
        }
        if let Some(ref category) = filters.category_id {
            query = query.filter(category_id.eq(category.clone()));
        }
        if let Some(ref ty) = filters.transaction_type {
            query = query.filter(transaction_type.eq(ty.as_str()));
        }
        if let Some(start) = filters.start_date {
            query = query.filter(transaction_date.ge(format_date(start)));
        }
        if let Some(end) = filters.end_date {
            query = query.filter(transaction_date.le(format_date(end)));
        }
        if let Some(ref term) = filters.search {
            if !term.trim().is_empty() {
                query = query.filter(description.like(format!("%{}%", term.trim())));
            }
        }

        let rows = query
            .order(transaction_date.desc())
            .load::<TransactionDB>(&mut conn)?;

        let mut results: Vec<Transaction> = rows.into_iter().map(Transaction::from).collect();

        if let Some(min) = filters.min_amount {
            results.retain(|t| t.amount >= min);
        }
        if let Some(max) = filters.max_amount {
            results.retain(|t| t.amount <= max);
        }

        let ascending = matches!(filters.sort_direction, Some(SortDirection::Asc));
        match filters.sort_by {
            Some(TransactionSortBy::Amount) => {
                results.sort_by(|a, b| a.amount.cmp(&b.amount));
                if !ascending {
                    results.reverse();
                }
            }
            Some(TransactionSortBy::Date) if ascending => {
                results.reverse();
            }
            _ => {}
        }

        Ok(results)
    }

    pub fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        let row = Self::get_db_by_id(&mut conn, transaction_id)?;
        Ok(row.into())
    }

    /// Most recent transactions, newest first
    pub fn list_recent(&self, limit: i64) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions
            .order((transaction_date.desc(), created_at.desc()))
            .limit(limit)
            .load::<TransactionDB>(&mut conn)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    /// All transactions dated within the inclusive range
    pub fn list_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions
            .filter(transaction_date.ge(format_date(start)))
            .filter(transaction_date.le(format_date(end)))
            .load::<TransactionDB>(&mut conn)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    /// Transactions where the account is either the source or the transfer
    /// destination
    pub fn list_touching_account(&self, account: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions
            .filter(
                account_id
                    .eq(account)
                    .or(transfer_to_account_id.eq(account)),
            )
            .load::<TransactionDB>(&mut conn)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    /// Sum of EXPENSE amounts for a category within the inclusive date range.
    /// Used to seed a budget's spent amount from history.
    pub fn sum_expenses_for_category_between(
        &self,
        category: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions
            .filter(category_id.eq(category))
            .filter(transaction_type.eq(TransactionType::Expense.as_str()))
            .filter(transaction_date.ge(format_date(start)))
            .filter(transaction_date.le(format_date(end)))
            .load::<TransactionDB>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|row| row.amount.parse().unwrap_or(Decimal::ZERO))
            .sum())
    }

    // Connection-level helpers for composite mutations: a transaction row
    // commits together with the balance and budget adjustments it implies.

    pub(crate) fn get_db_by_id(
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> std::result::Result<TransactionDB, TransactionError> {
        transactions
            .find(transaction_id)
            .first::<TransactionDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TransactionError::NotFound(format!(
                    "Transaction with id {} not found",
                    transaction_id
                )),
                _ => TransactionError::DatabaseError(e.to_string()),
            })
    }

    pub(crate) fn insert_with_conn(
        conn: &mut SqliteConnection,
        row: &TransactionDB,
    ) -> std::result::Result<(), TransactionError> {
        diesel::insert_into(transactions::table)
            .values(row)
            .execute(conn)?;
        Ok(())
    }

    pub(crate) fn update_with_conn(
        conn: &mut SqliteConnection,
        row: &TransactionDB,
    ) -> std::result::Result<(), TransactionError> {
        diesel::update(transactions.find(&row.id))
            .set(row)
            .execute(conn)?;
        Ok(())
    }

    pub(crate) fn delete_with_conn(
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> std::result::Result<usize, TransactionError> {
        Ok(diesel::delete(transactions.find(transaction_id)).execute(conn)?)
    }
}
