use std::str::FromStr;

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transactions_errors::TransactionError;

pub const TRANSACTION_TYPE_INCOME: &str = "INCOME";
pub const TRANSACTION_TYPE_EXPENSE: &str = "EXPENSE";
pub const TRANSACTION_TYPE_TRANSFER: &str = "TRANSFER";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Enum representing the kinds of transactions.
///
/// Amounts are always positive; the type determines the direction the money
/// moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => TRANSACTION_TYPE_INCOME,
            TransactionType::Expense => TRANSACTION_TYPE_EXPENSE,
            TransactionType::Transfer => TRANSACTION_TYPE_TRANSFER,
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSACTION_TYPE_INCOME => Ok(TransactionType::Income),
            TRANSACTION_TYPE_EXPENSE => Ok(TransactionType::Expense),
            TRANSACTION_TYPE_TRANSFER => Ok(TransactionType::Transfer),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// Domain model for transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub transfer_to_account_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input model for recording a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account_id: String,
    pub category_id: Option<String>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub transfer_to_account_id: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> std::result::Result<(), TransactionError> {
        if self.amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidData(
                "Transaction amount must be positive".to_string(),
            ));
        }
        match self.transaction_type {
            TransactionType::Transfer => {
                let destination = self.transfer_to_account_id.as_deref().unwrap_or("");
                if destination.is_empty() {
                    return Err(TransactionError::InvalidData(
                        "Transfer destination account is required".to_string(),
                    ));
                }
                if destination == self.account_id {
                    return Err(TransactionError::InvalidData(
                        "Source and destination accounts must be different".to_string(),
                    ));
                }
            }
            _ => {
                if self.transfer_to_account_id.is_some() {
                    return Err(TransactionError::InvalidData(
                        "Only transfers may carry a destination account".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Input model for editing a transaction. Type and accounts are fixed once
/// recorded; editing those is modeled as delete + create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub amount: Decimal,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}

impl TransactionUpdate {
    pub fn validate(&self) -> std::result::Result<(), TransactionError> {
        if self.amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidData(
                "Transaction amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSortBy {
    Date,
    Amount,
}

/// Filters applied when listing transactions. All fields combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub search: Option<String>,
    pub sort_by: Option<TransactionSortBy>,
    pub sort_direction: Option<SortDirection>,
}

/// Database model for transactions
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub transaction_type: String,
    pub amount: String,
    pub description: Option<String>,
    pub transaction_date: String,
    pub transfer_to_account_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            account_id: db.account_id,
            category_id: db.category_id,
            transaction_type: TransactionType::from_str(&db.transaction_type)
                .unwrap_or(TransactionType::Expense),
            amount: db.amount.parse().unwrap_or(Decimal::ZERO),
            description: db.description,
            transaction_date: NaiveDate::parse_from_str(&db.transaction_date, DATE_FORMAT)
                .unwrap_or_default(),
            transfer_to_account_id: db.transfer_to_account_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewTransaction> for TransactionDB {
    fn from(domain: NewTransaction) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: domain.id.unwrap_or_default(),
            account_id: domain.account_id,
            category_id: domain.category_id,
            transaction_type: domain.transaction_type.as_str().to_string(),
            amount: domain.amount.to_string(),
            description: domain.description,
            transaction_date: domain.transaction_date.format(DATE_FORMAT).to_string(),
            transfer_to_account_id: domain.transfer_to_account_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_transaction(transaction_type: TransactionType) -> NewTransaction {
        NewTransaction {
            id: None,
            account_id: "acc-1".to_string(),
            category_id: None,
            transaction_type,
            amount: dec!(25),
            description: None,
            transaction_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            transfer_to_account_id: None,
        }
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut tx = new_transaction(TransactionType::Expense);
        tx.amount = dec!(0);
        assert!(tx.validate().is_err());
        tx.amount = dec!(-5);
        assert!(tx.validate().is_err());
    }

    #[test]
    fn transfer_requires_a_distinct_destination() {
        let mut tx = new_transaction(TransactionType::Transfer);
        assert!(tx.validate().is_err());

        tx.transfer_to_account_id = Some("acc-1".to_string());
        assert!(tx.validate().is_err());

        tx.transfer_to_account_id = Some("acc-2".to_string());
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn destination_is_rejected_outside_transfers() {
        let mut tx = new_transaction(TransactionType::Income);
        tx.transfer_to_account_id = Some("acc-2".to_string());
        assert!(tx.validate().is_err());
    }
}
