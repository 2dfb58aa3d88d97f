use std::str::FromStr;

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accounts_errors::{AccountError, Result};

/// Enum representing the kinds of accounts a user can hold.
///
/// `Savings` accounts are goal-dedicated: they are created and archived by the
/// goals module and are not a valid source of goal contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    BankAccount,
    CreditCard,
    Cash,
    InvestmentAccount,
    Savings,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        use crate::accounts::accounts_constants::*;
        match self {
            AccountType::BankAccount => ACCOUNT_TYPE_BANK_ACCOUNT,
            AccountType::CreditCard => ACCOUNT_TYPE_CREDIT_CARD,
            AccountType::Cash => ACCOUNT_TYPE_CASH,
            AccountType::InvestmentAccount => ACCOUNT_TYPE_INVESTMENT_ACCOUNT,
            AccountType::Savings => ACCOUNT_TYPE_SAVINGS,
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use crate::accounts::accounts_constants::*;
        match s {
            s if s == ACCOUNT_TYPE_BANK_ACCOUNT => Ok(AccountType::BankAccount),
            s if s == ACCOUNT_TYPE_CREDIT_CARD => Ok(AccountType::CreditCard),
            s if s == ACCOUNT_TYPE_CASH => Ok(AccountType::Cash),
            s if s == ACCOUNT_TYPE_INVESTMENT_ACCOUNT => Ok(AccountType::InvestmentAccount),
            s if s == ACCOUNT_TYPE_SAVINGS => Ok(AccountType::Savings),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

/// Domain model representing an account in the system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Input model for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub account_type: AccountType,
    pub currency: Option<String>,
    pub initial_balance: Option<Decimal>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewAccount {
    /// Validates the new account data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for updating an existing account.
///
/// Balances are never directly editable; they change only through
/// transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: Option<String>,
    pub name: String,
    pub account_type: AccountType,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl AccountUpdate {
    /// Validates the account update data
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() {
            return Err(AccountError::InvalidData(
                "Account ID is required for updates".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for accounts
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
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub initial_balance: String,
    pub current_balance: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

// Conversion implementations
impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            account_type: AccountType::from_str(&db.account_type)
                .unwrap_or(AccountType::BankAccount),
            currency: db.currency,
            initial_balance: db.initial_balance.parse().unwrap_or(Decimal::ZERO),
            current_balance: db.current_balance.parse().unwrap_or(Decimal::ZERO),
            description: db.description,
            color: db.color,
            icon: db.icon,
            is_archived: db.is_archived,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAccount> for AccountDB {
    fn from(domain: NewAccount) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let initial = domain.initial_balance.unwrap_or(Decimal::ZERO);
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            account_type: domain.account_type.as_str().to_string(),
            currency: domain
                .currency
                .unwrap_or_else(|| crate::constants::DEFAULT_CURRENCY.to_string()),
            initial_balance: initial.to_string(),
            current_balance: initial.to_string(),
            description: domain.description,
            color: domain.color,
            icon: domain.icon,
            is_archived: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_account_starts_with_current_equal_to_initial() {
        let new_account = NewAccount {
            id: None,
            name: "Checking".to_string(),
            account_type: AccountType::BankAccount,
            currency: None,
            initial_balance: Some(dec!(250.75)),
            description: None,
            color: None,
            icon: None,
        };

        let db: AccountDB = new_account.into();
        assert_eq!(db.initial_balance, "250.75");
        assert_eq!(db.current_balance, "250.75");
        assert!(!db.is_archived);
    }

    #[test]
    fn empty_name_is_rejected() {
        let new_account = NewAccount {
            id: None,
            name: "   ".to_string(),
            account_type: AccountType::Cash,
            currency: None,
            initial_balance: None,
            description: None,
            color: None,
            icon: None,
        };
        assert!(new_account.validate().is_err());
    }

    #[test]
    fn account_type_round_trips_through_str() {
        for ty in [
            AccountType::BankAccount,
            AccountType::CreditCard,
            AccountType::Cash,
            AccountType::InvestmentAccount,
            AccountType::Savings,
        ] {
            assert_eq!(AccountType::from_str(ty.as_str()), Ok(ty));
        }
    }
}
