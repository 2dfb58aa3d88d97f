use async_trait::async_trait;
use chrono::Datelike;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::budgets::budgets_errors::BudgetError;
use crate::budgets::budgets_model::{
    month_bounds, Budget, BudgetDto, BudgetUpdate, BudgetsByPeriod, NewBudget, PeriodStatus,
};
use crate::budgets::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::errors::Result;
use crate::transactions::TransactionRepository;

pub struct BudgetService {
    repository: Arc<dyn BudgetRepositoryTrait>,
    transaction_repository: Arc<TransactionRepository>,
}

impl BudgetService {
    pub fn new(
        repository: Arc<dyn BudgetRepositoryTrait>,
        transaction_repository: Arc<TransactionRepository>,
    ) -> Self {
        BudgetService {
            repository,
            transaction_repository,
        }
    }

    /// Splits budgets into past/current/future relative to the given month.
    /// Future budgets are ordered nearest-first; past budgets most recent
    /// first.
    fn segment_by_period(
        budgets: Vec<Budget>,
        current_year: i32,
        current_month: i32,
    ) -> BudgetsByPeriod {
        let mut past = Vec::new();
        let mut current = Vec::new();
        let mut future = Vec::new();

        for budget in budgets {
            match budget.period_status(current_year, current_month) {
                PeriodStatus::Past => past.push(budget),
                PeriodStatus::Current => current.push(budget),
                PeriodStatus::Future => future.push(budget),
            }
        }

        past.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        future.sort_by(|a, b| (a.year, a.month).cmp(&(b.year, b.month)));

        BudgetsByPeriod {
            past: past.into_iter().map(BudgetDto::from).collect(),
            current: current.into_iter().map(BudgetDto::from).collect(),
            future: future.into_iter().map(BudgetDto::from).collect(),
        }
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    fn get_budgets(&self) -> Result<Vec<BudgetDto>> {
        let budgets = self.repository.get_budgets()?;
        Ok(budgets.into_iter().map(BudgetDto::from).collect())
    }

    fn get_budget(&self, budget_id: &str) -> Result<BudgetDto> {
        Ok(self.repository.get_budget_by_id(budget_id)?.into())
    }

    fn get_budgets_by_month(&self, year: i32, month: i32) -> Result<Vec<BudgetDto>> {
        let budgets = self.repository.get_budgets_by_month(year, month)?;
        Ok(budgets.into_iter().map(BudgetDto::from).collect())
    }

    fn get_budgets_by_period(&self) -> Result<BudgetsByPeriod> {
        let budgets = self.repository.get_budgets()?;
        let today = chrono::Local::now().date_naive();
        Ok(Self::segment_by_period(
            budgets,
            today.year(),
            today.month() as i32,
        ))
    }

    fn compare_budgets(
        &self,
        year1: i32,
        month1: i32,
        year2: i32,
        month2: i32,
    ) -> Result<Vec<BudgetDto>> {
        let mut combined = self.repository.get_budgets_by_month(year1, month1)?;
        combined.extend(self.repository.get_budgets_by_month(year2, month2)?);
        Ok(combined.into_iter().map(BudgetDto::from).collect())
    }

    /// Creates a budget for a (category, year, month). If one already exists
    /// for that period the existing budget is updated instead, so each
    /// category carries at most one budget per month. On a fresh insert the
    /// spent amount is seeded from the expense transactions already recorded
    /// in that period.
    async fn upsert_budget(&self, new_budget: NewBudget) -> Result<BudgetDto> {
        new_budget.validate()?;
        debug!(
            "Upserting budget for category {} in {}-{:02}",
            new_budget.category_id, new_budget.year, new_budget.month
        );

        if let Some(existing) = self.repository.find_by_category_and_period(
            &new_budget.category_id,
            new_budget.year,
            new_budget.month,
        )? {
            let update = BudgetUpdate {
                allocated_amount: new_budget.allocated_amount,
                alert_threshold: new_budget.alert_threshold,
            };
            let updated = self.repository.update_budget(&existing.id, update).await?;
            return Ok(updated.into());
        }

        let (start, end) = month_bounds(new_budget.year, new_budget.month as u32).ok_or_else(
            || BudgetError::InvalidData(format!("Invalid budget period {}-{}", new_budget.year, new_budget.month)),
        )?;
        let seeded_spent: Decimal = self
            .transaction_repository
            .sum_expenses_for_category_between(&new_budget.category_id, start, end)?;

        let created = self.repository.insert_budget(new_budget, seeded_spent).await?;
        Ok(created.into())
    }

    async fn update_budget(&self, budget_id: &str, update: BudgetUpdate) -> Result<BudgetDto> {
        update.validate()?;
        let updated = self.repository.update_budget(budget_id, update).await?;
        Ok(updated.into())
    }

    /// Deletes a budget. Transaction history is untouched: budgets are
    /// derived views over transactions, never the other way around.
    async fn delete_budget(&self, budget_id: &str) -> Result<usize> {
        self.repository.delete_budget(budget_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn budget(year: i32, month: i32) -> Budget {
        Budget {
            id: format!("{}-{}", year, month),
            category_id: "groceries".to_string(),
            year,
            month,
            allocated_amount: dec!(100),
            spent_amount: dec!(0),
            alert_threshold: 80,
            alert_at_80_sent: false,
            alert_at_100_sent: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn segmentation_partitions_every_budget() {
        let budgets = vec![
            budget(2025, 3),
            budget(2025, 6),
            budget(2025, 9),
            budget(2024, 12),
            budget(2026, 1),
        ];
        let segmented = BudgetService::segment_by_period(budgets, 2025, 6);

        assert_eq!(segmented.past.len(), 2);
        assert_eq!(segmented.current.len(), 1);
        assert_eq!(segmented.future.len(), 2);
    }

    #[test]
    fn future_budgets_are_sorted_nearest_first() {
        let budgets = vec![budget(2026, 2), budget(2025, 9), budget(2025, 7)];
        let segmented = BudgetService::segment_by_period(budgets, 2025, 6);

        let order: Vec<(i32, i32)> = segmented
            .future
            .iter()
            .map(|b| (b.year, b.month))
            .collect();
        assert_eq!(order, vec![(2025, 7), (2025, 9), (2026, 2)]);
    }

    #[test]
    fn past_budgets_are_sorted_most_recent_first() {
        let budgets = vec![budget(2024, 11), budget(2025, 5), budget(2025, 1)];
        let segmented = BudgetService::segment_by_period(budgets, 2025, 6);

        let order: Vec<(i32, i32)> = segmented.past.iter().map(|b| (b.year, b.month)).collect();
        assert_eq!(order, vec![(2025, 5), (2025, 1), (2024, 11)]);
    }
}
