use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::budgets::budgets_errors::BudgetError;
use crate::budgets::budgets_model::{Budget, BudgetDB, BudgetUpdate, NewBudget};
use crate::budgets::budgets_traits::BudgetRepositoryTrait;
use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::budgets;
use crate::schema::budgets::dsl::*;

use uuid::Uuid;

pub struct BudgetRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl BudgetRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        BudgetRepository { pool }
    }

    /// Adds a signed delta to the spent amount of the budget covering
    /// `category` in the month of `date`, updating the one-shot alert flags.
    /// A missing budget is not an error: spending in an unbudgeted category
    /// is simply not tracked.
    ///
    /// Runs on the caller's connection so that the adjustment commits
    /// atomically with the transaction mutation that caused it.
    pub fn apply_spent_delta(
        conn: &mut SqliteConnection,
        category: &str,
        date: NaiveDate,
        delta: Decimal,
    ) -> std::result::Result<(), BudgetError> {
        let row = budgets
            .filter(category_id.eq(category))
            .filter(year.eq(date.year()))
            .filter(month.eq(date.month() as i32))
            .first::<BudgetDB>(conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(());
        };

        let mut budget: Budget = row.into();
        budget.spent_amount += delta;

        let percentage = budget.spent_percentage_uncapped();
        if percentage >= 100.0 && !budget.alert_at_100_sent {
            budget.alert_at_100_sent = true;
        } else if percentage >= 80.0 && !budget.alert_at_80_sent {
            budget.alert_at_80_sent = true;
        }

        diesel::update(budgets.find(&budget.id))
            .set((
                spent_amount.eq(budget.spent_amount.to_string()),
                alert_at_80_sent.eq(budget.alert_at_80_sent),
                alert_at_100_sent.eq(budget.alert_at_100_sent),
                updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(conn)?;

        Ok(())
    }
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    fn get_budgets(&self) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = budgets
            .order((year.asc(), month.asc()))
            .load::<BudgetDB>(&mut conn)?;
        Ok(rows.into_iter().map(Budget::from).collect())
    }

    fn get_budget_by_id(&self, budget_id: &str) -> Result<Budget> {
        let mut conn = get_connection(&self.pool)?;
        let row = budgets
            .find(budget_id)
            .first::<BudgetDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    BudgetError::NotFound(format!("Budget with id {} not found", budget_id))
                }
                _ => BudgetError::DatabaseError(e.to_string()),
            })?;
        Ok(row.into())
    }

    fn get_budgets_by_month(&self, budget_year: i32, budget_month: i32) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = budgets
            .filter(year.eq(budget_year))
            .filter(month.eq(budget_month))
            .load::<BudgetDB>(&mut conn)?;
        Ok(rows.into_iter().map(Budget::from).collect())
    }

    fn find_by_category_and_period(
        &self,
        category: &str,
        budget_year: i32,
        budget_month: i32,
    ) -> Result<Option<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let row = budgets
            .filter(category_id.eq(category))
            .filter(year.eq(budget_year))
            .filter(month.eq(budget_month))
            .first::<BudgetDB>(&mut conn)
            .optional()?;
        Ok(row.map(Budget::from))
    }

    async fn insert_budget(&self, new_budget: NewBudget, seeded_spent: Decimal) -> Result<Budget> {
        let mut conn = get_connection(&self.pool)?;

        let mut budget_db = new_budget.into_db(seeded_spent);
        budget_db.id = Uuid::new_v4().to_string();

        diesel::insert_into(budgets::table)
            .values(&budget_db)
            .execute(&mut conn)?;

        Ok(budget_db.into())
    }

    async fn update_budget(&self, budget_id: &str, update: BudgetUpdate) -> Result<Budget> {
        let mut conn = get_connection(&self.pool)?;

        let existing = budgets
            .find(budget_id)
            .first::<BudgetDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    BudgetError::NotFound(format!("Budget with id {} not found", budget_id))
                }
                _ => BudgetError::DatabaseError(e.to_string()),
            })?;

        let threshold = update.alert_threshold.unwrap_or(existing.alert_threshold);

        diesel::update(budgets.find(budget_id))
            .set((
                allocated_amount.eq(update.allocated_amount.to_string()),
                alert_threshold.eq(threshold),
                updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)?;

        let row = budgets.find(budget_id).first::<BudgetDB>(&mut conn)?;
        Ok(row.into())
    }

    async fn delete_budget(&self, budget_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let affected = diesel::delete(budgets.find(budget_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(
                BudgetError::NotFound(format!("Budget with id {} not found", budget_id)).into(),
            );
        }

        Ok(affected)
    }
}
