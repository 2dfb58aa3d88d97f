use crate::errors::Result;
use crate::goals::goals_model::{
    Contribution, Goal, GoalDto, GoalUpdate, NewContribution, NewGoal,
};
use async_trait::async_trait;

/// Trait for goal repository operations
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn load_goals(&self) -> Result<Vec<Goal>>;
    fn get_goal_by_id(&self, goal_id: &str) -> Result<Goal>;
    async fn insert_new_goal(
        &self,
        new_goal: NewGoal,
        savings_account_id: Option<String>,
    ) -> Result<Goal>;
    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: &str) -> Result<usize>;
    async fn set_completed(&self, goal_id: &str) -> Result<Goal>;

    /// Atomically applies a validated contribution: the goal's saved amount
    /// and the contribution record commit together.
    async fn apply_contribution(
        &self,
        new_contribution: NewContribution,
        transaction_id: Option<String>,
    ) -> Result<(Goal, Contribution)>;
    fn load_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>>;

    fn load_dependencies(&self, goal_id: &str) -> Result<Vec<String>>;
    fn load_all_dependency_edges(&self) -> Result<Vec<(String, String)>>;
    fn find_dependents(&self, goal_id: &str) -> Result<Vec<String>>;
    async fn add_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<()>;
    async fn remove_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<usize>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(&self) -> Result<Vec<GoalDto>>;
    fn get_goal(&self, goal_id: &str) -> Result<GoalDto>;
    fn get_active_goals(&self) -> Result<Vec<GoalDto>>;
    async fn create_goal(&self, new_goal: NewGoal) -> Result<GoalDto>;
    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<GoalDto>;
    async fn delete_goal(&self, goal_id: &str) -> Result<()>;
    async fn add_contribution(&self, new_contribution: NewContribution) -> Result<GoalDto>;
    fn get_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>>;
    async fn mark_completed(&self, goal_id: &str) -> Result<GoalDto>;
    async fn add_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<GoalDto>;
    async fn remove_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<GoalDto>;
    fn validate_dependencies(&self, goal_id: &str) -> Result<bool>;
}
