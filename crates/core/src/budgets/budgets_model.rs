use chrono::NaiveDate;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ALERT_THRESHOLD;

use super::budgets_errors::BudgetError;

/// Domain model: one month's allocation for one expense category.
///
/// `spent_amount` is derived from the expense transactions recorded against
/// `category_id` within the budget period; it is recomputed by every mutation
/// that touches those transactions and is read-only everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    pub year: i32,
    pub month: i32,
    pub allocated_amount: Decimal,
    pub spent_amount: Decimal,
    pub alert_threshold: i32,
    pub alert_at_80_sent: bool,
    pub alert_at_100_sent: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Utilization metrics derived from a single budget snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEvaluation {
    pub spent_percentage: f64,
    pub is_over_budget: bool,
    pub is_near_limit: bool,
    pub remaining: Decimal,
}

/// Where a budget period sits relative to the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    Past,
    Current,
    Future,
}

/// Classifies a (year, month) pair against the current period. Total and
/// non-overlapping: every pair maps to exactly one status.
pub fn classify_period(
    year: i32,
    month: i32,
    current_year: i32,
    current_month: i32,
) -> PeriodStatus {
    if year < current_year || (year == current_year && month < current_month) {
        PeriodStatus::Past
    } else if year > current_year || (year == current_year && month > current_month) {
        PeriodStatus::Future
    } else {
        PeriodStatus::Current
    }
}

/// First and last day of a calendar month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next_month.pred_opt()?))
}

impl Budget {
    /// Computes presentation-ready utilization metrics for this budget.
    ///
    /// The percentage is capped at 100 for display. With a zero allocation
    /// the guard denominator is 1 and the x100 rescale is skipped, so a spend
    /// of 50 against nothing reads as 50%, not 100%. `is_over_budget` is
    /// computed on the uncapped amounts; `is_near_limit` compares the capped
    /// percentage against the alert threshold, so both flags can hold at
    /// once. `remaining` is exact and may be negative.
    pub fn evaluate(&self) -> BudgetEvaluation {
        let hundred = Decimal::ONE_HUNDRED;

        let uncapped = if self.allocated_amount.is_zero() {
            self.spent_amount
        } else {
            self.spent_amount / self.allocated_amount * hundred
        };
        let spent_percentage = uncapped.min(hundred).to_f64().unwrap_or(0.0);

        BudgetEvaluation {
            spent_percentage,
            is_over_budget: self.spent_amount > self.allocated_amount,
            is_near_limit: spent_percentage >= self.alert_threshold as f64,
            remaining: self.allocated_amount - self.spent_amount,
        }
    }

    /// Raw utilization used for the one-shot alert flags: uncapped, and 0
    /// when nothing is allocated.
    pub fn spent_percentage_uncapped(&self) -> f64 {
        if self.allocated_amount.is_zero() {
            return 0.0;
        }
        (self.spent_amount / self.allocated_amount * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    }

    pub fn period_status(&self, current_year: i32, current_month: i32) -> PeriodStatus {
        classify_period(self.year, self.month, current_year, current_month)
    }
}

/// Budgets segmented by period, as the budget overview presents them.
/// Future budgets are ordered nearest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetsByPeriod {
    pub past: Vec<BudgetDto>,
    pub current: Vec<BudgetDto>,
    pub future: Vec<BudgetDto>,
}

/// Presentation record for a budget, with the evaluation folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDto {
    pub id: String,
    pub category_id: String,
    pub year: i32,
    pub month: i32,
    pub allocated_amount: Decimal,
    pub spent_amount: Decimal,
    pub remaining_amount: Decimal,
    pub alert_threshold: i32,
    pub spent_percentage: f64,
    pub is_over_budget: bool,
    pub is_near_limit: bool,
}

impl From<Budget> for BudgetDto {
    fn from(budget: Budget) -> Self {
        let evaluation = budget.evaluate();
        BudgetDto {
            id: budget.id,
            category_id: budget.category_id,
            year: budget.year,
            month: budget.month,
            allocated_amount: budget.allocated_amount,
            spent_amount: budget.spent_amount,
            remaining_amount: evaluation.remaining,
            alert_threshold: budget.alert_threshold,
            spent_percentage: evaluation.spent_percentage,
            is_over_budget: evaluation.is_over_budget,
            is_near_limit: evaluation.is_near_limit,
        }
    }
}

/// Input for creating a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category_id: String,
    pub year: i32,
    pub month: i32,
    pub allocated_amount: Decimal,
    pub alert_threshold: Option<i32>,
}

impl NewBudget {
    pub fn validate(&self) -> std::result::Result<(), BudgetError> {
        if self.category_id.trim().is_empty() {
            return Err(BudgetError::InvalidData(
                "Budget category is required".to_string(),
            ));
        }
        if !(1..=12).contains(&self.month) {
            return Err(BudgetError::InvalidData(format!(
                "Budget month must be between 1 and 12, got {}",
                self.month
            )));
        }
        if self.allocated_amount < Decimal::ZERO {
            return Err(BudgetError::InvalidData(
                "Allocated amount cannot be negative".to_string(),
            ));
        }
        if let Some(threshold) = self.alert_threshold {
            if !(1..=100).contains(&threshold) {
                return Err(BudgetError::InvalidData(format!(
                    "Alert threshold must be between 1 and 100, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

/// Input for updating a budget: only the amount and threshold are mutable.
/// Category and period are fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub allocated_amount: Decimal,
    pub alert_threshold: Option<i32>,
}

impl BudgetUpdate {
    pub fn validate(&self) -> std::result::Result<(), BudgetError> {
        if self.allocated_amount < Decimal::ZERO {
            return Err(BudgetError::InvalidData(
                "Allocated amount cannot be negative".to_string(),
            ));
        }
        if let Some(threshold) = self.alert_threshold {
            if !(1..=100).contains(&threshold) {
                return Err(BudgetError::InvalidData(format!(
                    "Alert threshold must be between 1 and 100, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

/// Database model for budgets
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
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetDB {
    pub id: String,
    pub category_id: String,
    pub year: i32,
    pub month: i32,
    pub allocated_amount: String,
    pub spent_amount: String,
    pub alert_threshold: i32,
    pub alert_at_80_sent: bool,
    pub alert_at_100_sent: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BudgetDB> for Budget {
    fn from(db: BudgetDB) -> Self {
        Self {
            id: db.id,
            category_id: db.category_id,
            year: db.year,
            month: db.month,
            allocated_amount: db.allocated_amount.parse().unwrap_or(Decimal::ZERO),
            spent_amount: db.spent_amount.parse().unwrap_or(Decimal::ZERO),
            alert_threshold: db.alert_threshold,
            alert_at_80_sent: db.alert_at_80_sent,
            alert_at_100_sent: db.alert_at_100_sent,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Budget> for BudgetDB {
    fn from(domain: Budget) -> Self {
        Self {
            id: domain.id,
            category_id: domain.category_id,
            year: domain.year,
            month: domain.month,
            allocated_amount: domain.allocated_amount.to_string(),
            spent_amount: domain.spent_amount.to_string(),
            alert_threshold: domain.alert_threshold,
            alert_at_80_sent: domain.alert_at_80_sent,
            alert_at_100_sent: domain.alert_at_100_sent,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl NewBudget {
    pub(crate) fn into_db(self, seeded_spent: Decimal) -> BudgetDB {
        let now = chrono::Utc::now().to_rfc3339();
        BudgetDB {
            id: String::new(),
            category_id: self.category_id,
            year: self.year,
            month: self.month,
            allocated_amount: self.allocated_amount.to_string(),
            spent_amount: seeded_spent.to_string(),
            alert_threshold: self.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
            alert_at_80_sent: false,
            alert_at_100_sent: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn budget(allocated: Decimal, spent: Decimal, threshold: i32) -> Budget {
        Budget {
            id: "b1".to_string(),
            category_id: "c1".to_string(),
            year: 2025,
            month: 6,
            allocated_amount: allocated,
            spent_amount: spent,
            alert_threshold: threshold,
            alert_at_80_sent: false,
            alert_at_100_sent: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn at_threshold_is_near_limit_but_not_over() {
        let eval = budget(dec!(500), dec!(400), 80).evaluate();
        assert_eq!(eval.spent_percentage, 80.0);
        assert!(!eval.is_over_budget);
        assert!(eval.is_near_limit);
        assert_eq!(eval.remaining, dec!(100));
    }

    #[test]
    fn overspend_caps_percentage_but_keeps_exact_remaining() {
        let eval = budget(dec!(500), dec!(600), 80).evaluate();
        assert_eq!(eval.spent_percentage, 100.0);
        assert!(eval.is_over_budget);
        assert!(eval.is_near_limit);
        assert_eq!(eval.remaining, dec!(-100));
    }

    #[test]
    fn zero_allocation_uses_guard_denominator() {
        let eval = budget(dec!(0), dec!(50), 80).evaluate();
        assert_eq!(eval.spent_percentage, 50.0);
        assert!(eval.is_over_budget);
        assert_eq!(eval.remaining, dec!(-50));
    }

    #[test]
    fn spending_exactly_the_allocation_is_not_over() {
        let eval = budget(dec!(500), dec!(500), 80).evaluate();
        assert_eq!(eval.spent_percentage, 100.0);
        assert!(!eval.is_over_budget);
        assert!(eval.is_near_limit);
        assert_eq!(eval.remaining, dec!(0));
    }

    #[test]
    fn untouched_budget_reads_zero_percent() {
        let eval = budget(dec!(300), dec!(0), 80).evaluate();
        assert_eq!(eval.spent_percentage, 0.0);
        assert!(!eval.is_over_budget);
        assert!(!eval.is_near_limit);
        assert_eq!(eval.remaining, dec!(300));
    }

    #[test]
    fn uncapped_percentage_is_zero_without_allocation() {
        assert_eq!(budget(dec!(0), dec!(50), 80).spent_percentage_uncapped(), 0.0);
        assert_eq!(
            budget(dec!(200), dec!(300), 80).spent_percentage_uncapped(),
            150.0
        );
    }

    #[test]
    fn classification_matches_examples() {
        assert_eq!(classify_period(2025, 3, 2025, 6), PeriodStatus::Past);
        assert_eq!(classify_period(2025, 9, 2025, 6), PeriodStatus::Future);
        assert_eq!(classify_period(2025, 6, 2025, 6), PeriodStatus::Current);
        assert_eq!(classify_period(2024, 12, 2025, 1), PeriodStatus::Past);
        assert_eq!(classify_period(2026, 1, 2025, 12), PeriodStatus::Future);
    }

    #[test]
    fn month_bounds_handles_year_end() {
        assert_eq!(
            month_bounds(2025, 12),
            Some((
                NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
            ))
        );
        assert_eq!(month_bounds(2025, 13), None);
    }

    proptest! {
        #[test]
        fn spent_percentage_stays_in_display_range(
            allocated in 0u32..1_000_000,
            spent in 0u32..1_000_000,
            threshold in 1i32..=100,
        ) {
            let eval = budget(Decimal::from(allocated), Decimal::from(spent), threshold).evaluate();
            prop_assert!(eval.spent_percentage >= 0.0);
            prop_assert!(eval.spent_percentage <= 100.0);
        }

        #[test]
        fn over_budget_is_independent_of_capping(
            allocated in 0u32..1_000_000,
            spent in 0u32..1_000_000,
        ) {
            let b = budget(Decimal::from(allocated), Decimal::from(spent), 80);
            prop_assert_eq!(b.evaluate().is_over_budget, spent > allocated);
        }

        #[test]
        fn remaining_is_exact_and_uncapped(
            allocated in 0u32..1_000_000,
            spent in 0u32..1_000_000,
        ) {
            let b = budget(Decimal::from(allocated), Decimal::from(spent), 80);
            prop_assert_eq!(
                b.evaluate().remaining,
                Decimal::from(allocated) - Decimal::from(spent)
            );
        }

        #[test]
        fn classification_is_a_partition(
            year in 2000i32..2100,
            month in 1i32..=12,
            cy in 2000i32..2100,
            cm in 1i32..=12,
        ) {
            let status = classify_period(year, month, cy, cm);
            let expected = match (year, month).cmp(&(cy, cm)) {
                std::cmp::Ordering::Less => PeriodStatus::Past,
                std::cmp::Ordering::Equal => PeriodStatus::Current,
                std::cmp::Ordering::Greater => PeriodStatus::Future,
            };
            prop_assert_eq!(status, expected);
        }
    }
}
