use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountType;
use crate::transactions::Transaction;

/// Aggregated snapshot backing the dashboard view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_net_worth: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub account_summaries: Vec<AccountSummary>,
    pub category_expenses: Vec<CategoryExpense>,
    pub monthly_data: Vec<MonthlyData>,
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub currency: String,
    pub color: Option<String>,
}

/// One category's share of the current month's expenses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryExpense {
    pub category_id: Option<String>,
    pub category_name: String,
    pub color: Option<String>,
    pub amount: Decimal,
    pub percentage: f64,
}

/// Income and expense totals for one calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyData {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
}
