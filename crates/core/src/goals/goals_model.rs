use std::str::FromStr;

use chrono::NaiveDate;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::goals_errors::GoalError;

pub const GOAL_PRIORITY_LOW: &str = "LOW";
pub const GOAL_PRIORITY_MEDIUM: &str = "MEDIUM";
pub const GOAL_PRIORITY_HIGH: &str = "HIGH";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalPriority {
    Low,
    Medium,
    High,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Low => GOAL_PRIORITY_LOW,
            GoalPriority::Medium => GOAL_PRIORITY_MEDIUM,
            GoalPriority::High => GOAL_PRIORITY_HIGH,
        }
    }
}

impl FromStr for GoalPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            GOAL_PRIORITY_LOW => Ok(GoalPriority::Low),
            GOAL_PRIORITY_MEDIUM => Ok(GoalPriority::Medium),
            GOAL_PRIORITY_HIGH => Ok(GoalPriority::High),
            _ => Err(format!("Unknown goal priority: {}", s)),
        }
    }
}

/// Domain model for savings goals.
///
/// `current_amount` is the sum of accepted contributions and only ever grows
/// through [`Goal::apply_contribution`]; completion fires the instant it
/// reaches the target. Once reached, completion is sticky: reverting a
/// contribution lowers the amount but leaves `is_completed` set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub priority: GoalPriority,
    pub savings_account_id: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Progress metrics derived from a goal snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub progress_percentage: f64,
    pub completed: bool,
}

impl Goal {
    /// Computes progress toward the target. The percentage is uncapped: an
    /// over-contributed goal reads above 100, and display layers may clamp.
    /// A zero target reads as 0.
    pub fn progress(&self) -> GoalProgress {
        let progress_percentage = if self.target_amount.is_zero() {
            0.0
        } else {
            (self.current_amount / self.target_amount * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(0.0)
        };

        GoalProgress {
            progress_percentage,
            completed: self.current_amount >= self.target_amount,
        }
    }

    /// Applies a contribution to the goal.
    ///
    /// Rejects non-positive amounts with `InvalidAmount`, leaving the goal
    /// untouched. On success the saved amount grows by `amount` (it never
    /// decreases through this operation) and completion is recomputed.
    pub fn apply_contribution(&mut self, amount: Decimal) -> std::result::Result<(), GoalError> {
        if amount <= Decimal::ZERO {
            return Err(GoalError::InvalidAmount(
                "Contribution amount must be positive".to_string(),
            ));
        }

        self.current_amount += amount;
        self.is_completed = self.is_completed || self.current_amount >= self.target_amount;
        Ok(())
    }
}

/// Presentation record for a goal, with progress folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub priority: GoalPriority,
    pub savings_account_id: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub completed: bool,
    pub progress_percentage: f64,
}

impl From<Goal> for GoalDto {
    fn from(goal: Goal) -> Self {
        let progress = goal.progress();
        GoalDto {
            id: goal.id,
            name: goal.name,
            description: goal.description,
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            deadline: goal.deadline,
            priority: goal.priority,
            savings_account_id: goal.savings_account_id,
            color: goal.color,
            icon: goal.icon,
            completed: goal.is_completed,
            progress_percentage: progress.progress_percentage,
        }
    }
}

/// Input model for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub priority: Option<GoalPriority>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewGoal {
    pub fn validate(&self) -> std::result::Result<(), GoalError> {
        if self.name.trim().is_empty() {
            return Err(GoalError::InvalidData(
                "Goal name cannot be empty".to_string(),
            ));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(GoalError::InvalidData(
                "Goal target amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for updating a goal's metadata and target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub priority: Option<GoalPriority>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl GoalUpdate {
    pub fn validate(&self) -> std::result::Result<(), GoalError> {
        if self.name.trim().is_empty() {
            return Err(GoalError::InvalidData(
                "Goal name cannot be empty".to_string(),
            ));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(GoalError::InvalidData(
                "Goal target amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single accepted contribution toward a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub goal_id: String,
    pub account_id: String,
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_at: String,
}

/// Request to contribute funds toward a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContribution {
    pub goal_id: String,
    pub account_id: String,
    pub amount: Decimal,
    pub note: Option<String>,
}

impl NewContribution {
    pub fn validate(&self) -> std::result::Result<(), GoalError> {
        if self.amount <= Decimal::ZERO {
            return Err(GoalError::InvalidAmount(
                "Contribution amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for goals
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
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: String,
    pub current_amount: String,
    pub deadline: Option<String>,
    pub priority: String,
    pub savings_account_id: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Database model for goal contributions
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
#[diesel(table_name = crate::schema::goal_contributions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContributionDB {
    pub id: String,
    pub goal_id: String,
    pub account_id: String,
    pub transaction_id: Option<String>,
    pub amount: String,
    pub note: Option<String>,
    pub created_at: String,
}

/// Database model for goal dependency edges
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::goal_dependencies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDependencyDB {
    pub id: String,
    pub goal_id: String,
    pub depends_on_goal_id: String,
}

impl From<GoalDB> for Goal {
    fn from(db: GoalDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            target_amount: db.target_amount.parse().unwrap_or(Decimal::ZERO),
            current_amount: db.current_amount.parse().unwrap_or(Decimal::ZERO),
            deadline: db
                .deadline
                .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
            priority: GoalPriority::from_str(&db.priority).unwrap_or(GoalPriority::Medium),
            savings_account_id: db.savings_account_id,
            color: db.color,
            icon: db.icon,
            is_completed: db.is_completed,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Goal> for GoalDB {
    fn from(domain: Goal) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            description: domain.description,
            target_amount: domain.target_amount.to_string(),
            current_amount: domain.current_amount.to_string(),
            deadline: domain.deadline.map(|d| d.format(DATE_FORMAT).to_string()),
            priority: domain.priority.as_str().to_string(),
            savings_account_id: domain.savings_account_id,
            color: domain.color,
            icon: domain.icon,
            is_completed: domain.is_completed,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl From<ContributionDB> for Contribution {
    fn from(db: ContributionDB) -> Self {
        Self {
            id: db.id,
            goal_id: db.goal_id,
            account_id: db.account_id,
            transaction_id: db.transaction_id,
            amount: db.amount.parse().unwrap_or(Decimal::ZERO),
            note: db.note,
            created_at: db.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn goal(target: Decimal, current: Decimal) -> Goal {
        Goal {
            id: "g1".to_string(),
            name: "Vacation".to_string(),
            description: None,
            target_amount: target,
            current_amount: current,
            deadline: None,
            priority: GoalPriority::Medium,
            savings_account_id: None,
            color: None,
            icon: None,
            is_completed: current >= target && !target.is_zero(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn contribution_reaching_target_completes_the_goal() {
        let mut g = goal(dec!(1000), dec!(0));
        g.apply_contribution(dec!(1000)).unwrap();
        assert_eq!(g.current_amount, dec!(1000));
        assert!(g.is_completed);
        assert_eq!(g.progress().progress_percentage, 100.0);
    }

    #[test]
    fn negative_contribution_is_rejected_and_leaves_amount_unchanged() {
        let mut g = goal(dec!(1000), dec!(900));
        let err = g.apply_contribution(dec!(-10)).unwrap_err();
        assert!(matches!(err, GoalError::InvalidAmount(_)));
        assert_eq!(g.current_amount, dec!(900));
        assert!(!g.is_completed);
    }

    #[test]
    fn zero_contribution_is_rejected() {
        let mut g = goal(dec!(1000), dec!(100));
        assert!(matches!(
            g.apply_contribution(dec!(0)),
            Err(GoalError::InvalidAmount(_))
        ));
        assert_eq!(g.current_amount, dec!(100));
    }

    #[test]
    fn completion_tracks_amount_after_every_contribution() {
        let mut g = goal(dec!(100), dec!(0));
        for _ in 0..9 {
            g.apply_contribution(dec!(10)).unwrap();
            assert_eq!(g.is_completed, g.current_amount >= g.target_amount);
        }
        g.apply_contribution(dec!(10)).unwrap();
        assert!(g.is_completed);
    }

    #[test]
    fn progress_is_uncapped_when_over_contributed() {
        let mut g = goal(dec!(100), dec!(90));
        g.apply_contribution(dec!(60)).unwrap();
        assert_eq!(g.progress().progress_percentage, 150.0);
        assert!(g.is_completed);
    }

    #[test]
    fn completion_is_sticky_once_reached() {
        let mut g = goal(dec!(100), dec!(100));
        assert!(g.is_completed);
        // Simulate a reverted contribution dropping the amount below target
        g.current_amount = dec!(50);
        g.apply_contribution(dec!(1)).unwrap();
        assert!(g.is_completed);
    }

    #[test]
    fn zero_target_reads_zero_progress() {
        let g = goal(dec!(0), dec!(0));
        assert_eq!(g.progress().progress_percentage, 0.0);
    }
}
