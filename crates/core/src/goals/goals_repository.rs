use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::goals::goals_errors::GoalError;
use crate::goals::goals_model::{
    Contribution, ContributionDB, Goal, GoalDB, GoalDependencyDB, GoalUpdate, NewContribution,
    NewGoal,
};
use crate::goals::goals_traits::GoalRepositoryTrait;
use crate::schema::{goal_contributions, goal_dependencies, goals};

use uuid::Uuid;

pub struct GoalRepository {
    pool: Arc<DbPool>,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        GoalRepository { pool }
    }

    fn get_goal_db(conn: &mut SqliteConnection, id: &str) -> std::result::Result<GoalDB, GoalError> {
        goals::table
            .find(id)
            .first::<GoalDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    GoalError::NotFound(format!("Goal with id {} not found", id))
                }
                _ => GoalError::DatabaseError(e.to_string()),
            })
    }

    /// Looks up the contribution backed by a given transfer transaction, if
    /// any. Used by transaction mutations to keep goals in step.
    pub fn find_contribution_by_transaction(
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> std::result::Result<Option<Contribution>, GoalError> {
        let row = goal_contributions::table
            .filter(goal_contributions::transaction_id.eq(transaction_id))
            .first::<ContributionDB>(conn)
            .optional()?;
        Ok(row.map(Contribution::from))
    }

    /// Reverts a contribution on the caller's connection: the goal's saved
    /// amount drops by the contribution amount and the record is removed.
    /// A goal that already completed stays completed.
    pub fn revert_contribution(
        conn: &mut SqliteConnection,
        contribution: &Contribution,
    ) -> std::result::Result<(), GoalError> {
        // A contribution may outlive its goal mid-deletion; only a present
        // goal is adjusted.
        match Self::get_goal_db(conn, &contribution.goal_id) {
            Ok(goal_db) => {
                let current: Decimal = goal_db.current_amount.parse().unwrap_or(Decimal::ZERO);
                let new_current = current - contribution.amount;

                diesel::update(goals::table.find(&contribution.goal_id))
                    .set((
                        goals::current_amount.eq(new_current.to_string()),
                        goals::updated_at.eq(chrono::Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)?;
            }
            Err(GoalError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        diesel::delete(goal_contributions::table.find(&contribution.id)).execute(conn)?;
        Ok(())
    }

    /// Re-points a contribution at a new amount, shifting the goal's saved
    /// amount by the difference. Completion is recomputed and stays set once
    /// reached.
    pub fn adjust_contribution_amount(
        conn: &mut SqliteConnection,
        contribution: &Contribution,
        new_amount: Decimal,
    ) -> std::result::Result<(), GoalError> {
        match Self::get_goal_db(conn, &contribution.goal_id) {
            Ok(goal_db) => {
                let mut goal: Goal = goal_db.into();
                goal.current_amount += new_amount - contribution.amount;
                goal.is_completed = goal.is_completed || goal.current_amount >= goal.target_amount;

                diesel::update(goals::table.find(&goal.id))
                    .set((
                        goals::current_amount.eq(goal.current_amount.to_string()),
                        goals::is_completed.eq(goal.is_completed),
                        goals::updated_at.eq(chrono::Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)?;
            }
            Err(GoalError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        diesel::update(goal_contributions::table.find(&contribution.id))
            .set(goal_contributions::amount.eq(new_amount.to_string()))
            .execute(conn)?;
        Ok(())
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn load_goals(&self) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .order(goals::created_at.desc())
            .load::<GoalDB>(&mut conn)?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }

    fn get_goal_by_id(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        Ok(Self::get_goal_db(&mut conn, goal_id)?.into())
    }

    async fn insert_new_goal(
        &self,
        new_goal: NewGoal,
        savings_account_id: Option<String>,
    ) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        let now = chrono::Utc::now().to_rfc3339();

        let goal_db = GoalDB {
            id: Uuid::new_v4().to_string(),
            name: new_goal.name,
            description: new_goal.description,
            target_amount: new_goal.target_amount.to_string(),
            current_amount: Decimal::ZERO.to_string(),
            deadline: new_goal.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
            priority: new_goal
                .priority
                .unwrap_or(crate::goals::GoalPriority::Medium)
                .as_str()
                .to_string(),
            savings_account_id,
            color: new_goal.color,
            icon: new_goal.icon,
            is_completed: false,
            created_at: now.clone(),
            updated_at: now,
        };

        diesel::insert_into(goals::table)
            .values(&goal_db)
            .execute(&mut conn)?;

        Ok(goal_db.into())
    }

    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        let existing = Self::get_goal_db(&mut conn, goal_id)?;

        let goal_db = GoalDB {
            id: existing.id.clone(),
            name: update.name,
            description: update.description,
            target_amount: update.target_amount.to_string(),
            current_amount: existing.current_amount,
            deadline: update.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
            priority: update
                .priority
                .map(|p| p.as_str().to_string())
                .unwrap_or(existing.priority),
            savings_account_id: existing.savings_account_id,
            color: update.color.or(existing.color),
            icon: update.icon,
            is_completed: existing.is_completed,
            created_at: existing.created_at,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };

        diesel::update(goals::table.find(goal_id))
            .set(&goal_db)
            .execute(&mut conn)?;

        Ok(goal_db.into())
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        // Contribution history goes with the goal; no orphaned records
        diesel::delete(
            goal_contributions::table.filter(goal_contributions::goal_id.eq(goal_id)),
        )
        .execute(&mut conn)?;
        diesel::delete(goal_dependencies::table.filter(goal_dependencies::goal_id.eq(goal_id)))
            .execute(&mut conn)?;

        let affected = diesel::delete(goals::table.find(goal_id)).execute(&mut conn)?;
        if affected == 0 {
            return Err(GoalError::NotFound(format!("Goal with id {} not found", goal_id)).into());
        }
        Ok(affected)
    }

    async fn set_completed(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        Self::get_goal_db(&mut conn, goal_id)?;

        diesel::update(goals::table.find(goal_id))
            .set((
                goals::is_completed.eq(true),
                goals::updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)?;

        Ok(Self::get_goal_db(&mut conn, goal_id)?.into())
    }

    async fn apply_contribution(
        &self,
        new_contribution: NewContribution,
        transaction_id: Option<String>,
    ) -> Result<(Goal, Contribution)> {
        self.pool
            .execute(|conn| -> std::result::Result<(Goal, Contribution), Error> {
                let goal_db = Self::get_goal_db(conn, &new_contribution.goal_id)?;
                let mut goal: Goal = goal_db.into();
                goal.apply_contribution(new_contribution.amount)?;

                diesel::update(goals::table.find(&goal.id))
                    .set((
                        goals::current_amount.eq(goal.current_amount.to_string()),
                        goals::is_completed.eq(goal.is_completed),
                        goals::updated_at.eq(chrono::Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)
                    .map_err(GoalError::from)?;

                let contribution_db = ContributionDB {
                    id: Uuid::new_v4().to_string(),
                    goal_id: new_contribution.goal_id,
                    account_id: new_contribution.account_id,
                    transaction_id,
                    amount: new_contribution.amount.to_string(),
                    note: new_contribution.note,
                    created_at: chrono::Utc::now().to_rfc3339(),
                };

                diesel::insert_into(goal_contributions::table)
                    .values(&contribution_db)
                    .execute(conn)
                    .map_err(GoalError::from)?;

                Ok((goal, contribution_db.into()))
            })
    }

    fn load_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goal_contributions::table
            .filter(goal_contributions::goal_id.eq(goal_id))
            .order(goal_contributions::created_at.desc())
            .load::<ContributionDB>(&mut conn)?;
        Ok(rows.into_iter().map(Contribution::from).collect())
    }

    fn load_dependencies(&self, goal_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let ids = goal_dependencies::table
            .filter(goal_dependencies::goal_id.eq(goal_id))
            .select(goal_dependencies::depends_on_goal_id)
            .load::<String>(&mut conn)?;
        Ok(ids)
    }

    fn load_all_dependency_edges(&self) -> Result<Vec<(String, String)>> {
        let mut conn = get_connection(&self.pool)?;
        let edges = goal_dependencies::table
            .select((
                goal_dependencies::goal_id,
                goal_dependencies::depends_on_goal_id,
            ))
            .load::<(String, String)>(&mut conn)?;
        Ok(edges)
    }

    fn find_dependents(&self, goal_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let ids = goal_dependencies::table
            .filter(goal_dependencies::depends_on_goal_id.eq(goal_id))
            .select(goal_dependencies::goal_id)
            .load::<String>(&mut conn)?;
        Ok(ids)
    }

    async fn add_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let edge = GoalDependencyDB {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.to_string(),
            depends_on_goal_id: depends_on_goal_id.to_string(),
        };

        diesel::insert_into(goal_dependencies::table)
            .values(&edge)
            .execute(&mut conn)?;
        Ok(())
    }

    async fn remove_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let affected = diesel::delete(
            goal_dependencies::table
                .filter(goal_dependencies::goal_id.eq(goal_id))
                .filter(goal_dependencies::depends_on_goal_id.eq(depends_on_goal_id)),
        )
        .execute(&mut conn)?;
        Ok(affected)
    }
}
