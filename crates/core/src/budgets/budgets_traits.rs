use crate::budgets::budgets_model::{
    Budget, BudgetDto, BudgetUpdate, BudgetsByPeriod, NewBudget,
};
use crate::errors::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for budget repository operations
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    fn get_budgets(&self) -> Result<Vec<Budget>>;
    fn get_budget_by_id(&self, budget_id: &str) -> Result<Budget>;
    fn get_budgets_by_month(&self, year: i32, month: i32) -> Result<Vec<Budget>>;
    fn find_by_category_and_period(
        &self,
        category_id: &str,
        year: i32,
        month: i32,
    ) -> Result<Option<Budget>>;
    async fn insert_budget(&self, new_budget: NewBudget, seeded_spent: Decimal) -> Result<Budget>;
    async fn update_budget(&self, budget_id: &str, update: BudgetUpdate) -> Result<Budget>;
    async fn delete_budget(&self, budget_id: &str) -> Result<usize>;
}

/// Trait for budget service operations
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    fn get_budgets(&self) -> Result<Vec<BudgetDto>>;
    fn get_budget(&self, budget_id: &str) -> Result<BudgetDto>;
    fn get_budgets_by_month(&self, year: i32, month: i32) -> Result<Vec<BudgetDto>>;
    fn get_budgets_by_period(&self) -> Result<BudgetsByPeriod>;
    fn compare_budgets(
        &self,
        year1: i32,
        month1: i32,
        year2: i32,
        month2: i32,
    ) -> Result<Vec<BudgetDto>>;
    async fn upsert_budget(&self, new_budget: NewBudget) -> Result<BudgetDto>;
    async fn update_budget(&self, budget_id: &str, update: BudgetUpdate) -> Result<BudgetDto>;
    async fn delete_budget(&self, budget_id: &str) -> Result<usize>;
}
