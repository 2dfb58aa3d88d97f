use chrono::{Datelike, Months};
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::accounts::AccountRepository;
use crate::budgets::month_bounds;
use crate::categories::{Category, CategoryRepository, CategoryRepositoryTrait};
use crate::constants::{DASHBOARD_HISTORY_MONTHS, DASHBOARD_RECENT_TRANSACTIONS};
use crate::dashboard::dashboard_model::{
    AccountSummary, CategoryExpense, DashboardSummary, MonthlyData,
};
use crate::errors::{Result, ValidationError};
use crate::transactions::{Transaction, TransactionRepository, TransactionType};

/// Read-only aggregation over accounts, transactions and categories
pub struct DashboardService {
    account_repository: Arc<AccountRepository>,
    transaction_repository: Arc<TransactionRepository>,
    category_repository: Arc<CategoryRepository>,
}

impl DashboardService {
    pub fn new(
        account_repository: Arc<AccountRepository>,
        transaction_repository: Arc<TransactionRepository>,
        category_repository: Arc<CategoryRepository>,
    ) -> Self {
        DashboardService {
            account_repository,
            transaction_repository,
            category_repository,
        }
    }

    pub fn get_dashboard(&self) -> Result<DashboardSummary> {
        debug!("Building dashboard summary");

        let accounts = self.account_repository.list(Some(false))?;
        let total_net_worth: Decimal = accounts.iter().map(|a| a.current_balance).sum();

        let today = chrono::Local::now().date_naive();
        let (start, end) = month_bounds(today.year(), today.month()).ok_or_else(|| {
            ValidationError::InvalidInput(format!("Invalid current month: {}", today))
        })?;
        let month_transactions = self.transaction_repository.list_between(start, end)?;

        let total_income = Self::sum_by_type(&month_transactions, TransactionType::Income);
        let total_expenses = Self::sum_by_type(&month_transactions, TransactionType::Expense);

        let account_summaries = accounts
            .into_iter()
            .map(|a| AccountSummary {
                id: a.id,
                name: a.name,
                account_type: a.account_type,
                balance: a.current_balance,
                currency: a.currency,
                color: a.color,
            })
            .collect();

        let categories = self.category_repository.get_all_categories()?;
        let category_expenses =
            Self::calculate_category_expenses(&categories, &month_transactions, total_expenses);

        let mut monthly_data = Vec::new();
        for months_back in (0..DASHBOARD_HISTORY_MONTHS).rev() {
            let Some(month_start) = today.checked_sub_months(Months::new(months_back)) else {
                continue;
            };
            let Some((start, end)) = month_bounds(month_start.year(), month_start.month()) else {
                continue;
            };
            let transactions = self.transaction_repository.list_between(start, end)?;
            monthly_data.push(MonthlyData {
                month: format!("{}-{:02}", start.year(), start.month()),
                income: Self::sum_by_type(&transactions, TransactionType::Income),
                expenses: Self::sum_by_type(&transactions, TransactionType::Expense),
            });
        }

        let recent_transactions = self
            .transaction_repository
            .list_recent(DASHBOARD_RECENT_TRANSACTIONS)?;

        Ok(DashboardSummary {
            total_net_worth,
            total_income,
            total_expenses,
            account_summaries,
            category_expenses,
            monthly_data,
            recent_transactions,
        })
    }

    fn sum_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> Decimal {
        transactions
            .iter()
            .filter(|t| t.transaction_type == transaction_type)
            .map(|t| t.amount)
            .sum()
    }

    /// Groups the month's expenses by category and computes each category's
    /// share of the total. Uncategorized spend is reported under its own
    /// entry; a transaction whose category was deleted keeps its id with a
    /// placeholder name. Shares are 0 when nothing was spent.
    fn calculate_category_expenses(
        categories: &[Category],
        transactions: &[Transaction],
        total_expenses: Decimal,
    ) -> Vec<CategoryExpense> {
        let mut by_category: HashMap<Option<String>, Decimal> = HashMap::new();
        for tx in transactions {
            if tx.transaction_type != TransactionType::Expense {
                continue;
            }
            *by_category.entry(tx.category_id.clone()).or_default() += tx.amount;
        }

        let category_lookup: HashMap<&str, &Category> =
            categories.iter().map(|c| (c.id.as_str(), c)).collect();

        let mut expenses: Vec<CategoryExpense> = by_category
            .into_iter()
            .map(|(category_id, amount)| {
                let percentage = if total_expenses.is_zero() {
                    0.0
                } else {
                    (amount / total_expenses * Decimal::ONE_HUNDRED)
                        .to_f64()
                        .unwrap_or(0.0)
                };

                match category_id {
                    None => CategoryExpense {
                        category_id: None,
                        category_name: "Uncategorized".to_string(),
                        color: Some("#9CA3AF".to_string()),
                        amount,
                        percentage,
                    },
                    Some(id) => {
                        let category = category_lookup.get(id.as_str());
                        CategoryExpense {
                            category_name: category
                                .map(|c| c.name.clone())
                                .unwrap_or_else(|| "Category Deleted".to_string()),
                            color: category
                                .and_then(|c| c.color.clone())
                                .or_else(|| Some("#808080".to_string())),
                            category_id: Some(id),
                            amount,
                            percentage,
                        }
                    }
                }
            })
            .collect();

        expenses.sort_by(|a, b| b.amount.cmp(&a.amount));
        expenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CategoryType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            category_type: CategoryType::Expense,
            color: Some("#FF0000".to_string()),
            icon: None,
            parent_id: None,
            is_default: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn expense(category_id: Option<&str>, amount: Decimal) -> Transaction {
        Transaction {
            id: "t".to_string(),
            account_id: "a".to_string(),
            category_id: category_id.map(str::to_string),
            transaction_type: TransactionType::Expense,
            amount,
            description: None,
            transaction_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            transfer_to_account_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn expenses_are_grouped_and_sorted_by_amount() {
        let categories = vec![category("food", "Food"), category("rent", "Rent")];
        let transactions = vec![
            expense(Some("food"), dec!(100)),
            expense(Some("rent"), dec!(700)),
            expense(Some("food"), dec!(100)),
        ];

        let result =
            DashboardService::calculate_category_expenses(&categories, &transactions, dec!(900));

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].category_name, "Rent");
        assert_eq!(result[0].amount, dec!(700));
        assert_eq!(result[1].amount, dec!(200));
    }

    #[test]
    fn zero_total_yields_zero_shares() {
        let result = DashboardService::calculate_category_expenses(&[], &[], dec!(0));
        assert!(result.is_empty());

        let transactions = vec![expense(Some("ghost"), dec!(50))];
        let result =
            DashboardService::calculate_category_expenses(&[], &transactions, dec!(0));
        assert_eq!(result[0].percentage, 0.0);
    }

    #[test]
    fn uncategorized_and_deleted_categories_are_labelled() {
        let transactions = vec![expense(None, dec!(30)), expense(Some("gone"), dec!(70))];
        let result =
            DashboardService::calculate_category_expenses(&[], &transactions, dec!(100));

        let uncategorized = result
            .iter()
            .find(|e| e.category_id.is_none())
            .expect("uncategorized entry");
        assert_eq!(uncategorized.category_name, "Uncategorized");
        assert_eq!(uncategorized.percentage, 30.0);

        let deleted = result
            .iter()
            .find(|e| e.category_id.as_deref() == Some("gone"))
            .expect("deleted-category entry");
        assert_eq!(deleted.category_name, "Category Deleted");
        assert_eq!(deleted.percentage, 70.0);
    }
}
