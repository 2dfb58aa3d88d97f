use async_trait::async_trait;
use log::{debug, info};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::accounts::{AccountService, AccountType, AccountUpdate, NewAccount};
use crate::constants::DEFAULT_GOAL_COLOR;
use crate::errors::Result;
use crate::goals::goals_errors::GoalError;
use crate::goals::goals_model::{
    Contribution, GoalDto, GoalUpdate, NewContribution, NewGoal,
};
use crate::goals::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::transactions::{NewTransaction, TransactionService, TransactionType};

pub struct GoalService<T: GoalRepositoryTrait> {
    goal_repo: Arc<T>,
    account_service: Arc<AccountService>,
    transaction_service: Arc<TransactionService>,
}

impl<T: GoalRepositoryTrait> GoalService<T> {
    pub fn new(
        goal_repo: Arc<T>,
        account_service: Arc<AccountService>,
        transaction_service: Arc<TransactionService>,
    ) -> Self {
        GoalService {
            goal_repo,
            account_service,
            transaction_service,
        }
    }

    /// True when making `goal_id` depend on `candidate` would close a cycle:
    /// `goal_id` is already reachable from `candidate` through the edges.
    fn creates_cycle(edges: &[(String, String)], goal_id: &str, candidate: &str) -> bool {
        if goal_id == candidate {
            return true;
        }

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for (from, to) in edges {
            adjacency.entry(from.as_str()).or_default().push(to.as_str());
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(candidate);

        while let Some(node) = queue.pop_front() {
            if node == goal_id {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(next) = adjacency.get(node) {
                queue.extend(next.iter().copied());
            }
        }

        false
    }
}

#[async_trait]
impl<T: GoalRepositoryTrait + Send + Sync> GoalServiceTrait for GoalService<T> {
    fn get_goals(&self) -> Result<Vec<GoalDto>> {
        let goals = self.goal_repo.load_goals()?;
        Ok(goals.into_iter().map(GoalDto::from).collect())
    }

    fn get_goal(&self, goal_id: &str) -> Result<GoalDto> {
        Ok(self.goal_repo.get_goal_by_id(goal_id)?.into())
    }

    fn get_active_goals(&self) -> Result<Vec<GoalDto>> {
        let goals = self.goal_repo.load_goals()?;
        Ok(goals
            .into_iter()
            .filter(|g| !g.is_completed)
            .map(GoalDto::from)
            .collect())
    }

    /// Creates a goal together with its dedicated savings account. The
    /// account carries the goal's name and color and receives contribution
    /// transfers.
    async fn create_goal(&self, mut new_goal: NewGoal) -> Result<GoalDto> {
        new_goal.validate()?;
        debug!("Creating goal: {}", new_goal.name);

        let color = new_goal
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_GOAL_COLOR.to_string());
        new_goal.color = Some(color.clone());

        let savings_account = self
            .account_service
            .create_account(NewAccount {
                id: None,
                name: new_goal.name.clone(),
                account_type: AccountType::Savings,
                currency: None,
                initial_balance: None,
                description: Some(format!("Savings account for goal: {}", new_goal.name)),
                color: Some(color),
                icon: new_goal.icon.clone(),
            })
            .await?;

        let goal = self
            .goal_repo
            .insert_new_goal(new_goal, Some(savings_account.id))
            .await?;

        info!("Created goal {}", goal.id);
        Ok(goal.into())
    }

    /// Updates a goal; a changed name or color is propagated to the
    /// savings account.
    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<GoalDto> {
        update.validate()?;

        let existing = self.goal_repo.get_goal_by_id(goal_id)?;

        if let Some(ref savings_account_id) = existing.savings_account_id {
            if let Ok(account) = self.account_service.get_account(savings_account_id) {
                let name_changed = account.name != update.name;
                let color_changed = update.color.is_some() && update.color != account.color;
                if name_changed || color_changed {
                    self.account_service.update_account(AccountUpdate {
                        id: Some(account.id.clone()),
                        name: update.name.clone(),
                        account_type: account.account_type,
                        description: account.description.clone(),
                        color: update.color.clone().or(account.color.clone()),
                        icon: account.icon.clone(),
                    })?;
                }
            }
        }

        let updated = self.goal_repo.update_goal(goal_id, update).await?;
        Ok(updated.into())
    }

    /// Deletes a goal. Refused while other goals depend on it. The savings
    /// account is archived, which reverts the contribution transfers made
    /// into it, and the contribution history goes with the goal.
    async fn delete_goal(&self, goal_id: &str) -> Result<()> {
        let goal = self.goal_repo.get_goal_by_id(goal_id)?;

        let dependents = self.goal_repo.find_dependents(goal_id)?;
        if !dependents.is_empty() {
            return Err(GoalError::InvalidData(
                "Cannot delete goal with dependent goals".to_string(),
            )
            .into());
        }

        if let Some(ref savings_account_id) = goal.savings_account_id {
            self.account_service
                .archive_account(savings_account_id)
                .await?;
        }

        self.goal_repo.delete_goal(goal_id).await?;
        info!("Deleted goal {}", goal_id);
        Ok(())
    }

    /// Applies a contribution: a TRANSFER transaction moves the funds from
    /// the source account into the goal's savings account, the contribution
    /// is recorded against that transaction, and the goal's saved amount and
    /// completion are recomputed.
    async fn add_contribution(&self, new_contribution: NewContribution) -> Result<GoalDto> {
        new_contribution.validate()?;

        let goal = self.goal_repo.get_goal_by_id(&new_contribution.goal_id)?;
        let savings_account_id = goal.savings_account_id.clone().ok_or_else(|| {
            GoalError::InvalidData(format!("Goal {} has no savings account", goal.id))
        })?;

        let source = self.account_service.get_account(&new_contribution.account_id)?;
        if source.account_type == AccountType::Savings {
            return Err(GoalError::InvalidData(
                "Savings accounts cannot be used to fund contributions".to_string(),
            )
            .into());
        }

        let today = chrono::Local::now().date_naive();
        let description = format!("{} {} Contribution", today.format("%b %d, %Y"), goal.name);

        let transaction = self
            .transaction_service
            .create_transaction(NewTransaction {
                id: None,
                account_id: new_contribution.account_id.clone(),
                category_id: None,
                transaction_type: TransactionType::Transfer,
                amount: new_contribution.amount,
                description: Some(description),
                transaction_date: today,
                transfer_to_account_id: Some(savings_account_id),
            })
            .await?;

        let (updated_goal, _contribution) = self
            .goal_repo
            .apply_contribution(new_contribution, Some(transaction.id))
            .await?;

        if updated_goal.is_completed && !goal.is_completed {
            info!("Goal {} completed", updated_goal.id);
        }

        Ok(updated_goal.into())
    }

    fn get_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>> {
        self.goal_repo.load_contributions(goal_id)
    }

    /// Explicitly marks a goal completed. Refused while any dependency is
    /// still open; automatic completion through contributions is not gated.
    async fn mark_completed(&self, goal_id: &str) -> Result<GoalDto> {
        for dependency_id in self.goal_repo.load_dependencies(goal_id)? {
            let dependency = self.goal_repo.get_goal_by_id(&dependency_id)?;
            if !dependency.is_completed {
                return Err(GoalError::InvalidData(format!(
                    "Cannot complete goal: dependency '{}' is not completed",
                    dependency.name
                ))
                .into());
            }
        }

        let goal = self.goal_repo.set_completed(goal_id).await?;
        Ok(goal.into())
    }

    async fn add_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<GoalDto> {
        self.goal_repo.get_goal_by_id(goal_id)?;
        self.goal_repo.get_goal_by_id(depends_on_goal_id)?;

        if self
            .goal_repo
            .load_dependencies(goal_id)?
            .iter()
            .any(|d| d == depends_on_goal_id)
        {
            return Err(GoalError::InvalidData("Dependency already exists".to_string()).into());
        }

        let edges = self.goal_repo.load_all_dependency_edges()?;
        if Self::creates_cycle(&edges, goal_id, depends_on_goal_id) {
            return Err(GoalError::InvalidData(
                "Cannot add dependency: this would create a circular dependency".to_string(),
            )
            .into());
        }

        self.goal_repo
            .add_dependency(goal_id, depends_on_goal_id)
            .await?;
        Ok(self.goal_repo.get_goal_by_id(goal_id)?.into())
    }

    async fn remove_dependency(&self, goal_id: &str, depends_on_goal_id: &str) -> Result<GoalDto> {
        self.goal_repo
            .remove_dependency(goal_id, depends_on_goal_id)
            .await?;
        Ok(self.goal_repo.get_goal_by_id(goal_id)?.into())
    }

    /// True when every dependency of the goal has completed
    fn validate_dependencies(&self, goal_id: &str) -> Result<bool> {
        for dependency_id in self.goal_repo.load_dependencies(goal_id)? {
            let dependency = self.goal_repo.get_goal_by_id(&dependency_id)?;
            if !dependency.is_completed {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::goals_repository::GoalRepository;

    fn edges(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        assert!(GoalService::<GoalRepository>::creates_cycle(&[], "a", "a"));
    }

    #[test]
    fn direct_back_edge_is_a_cycle() {
        let e = edges(&[("b", "a")]);
        assert!(GoalService::<GoalRepository>::creates_cycle(&e, "a", "b"));
    }

    #[test]
    fn transitive_back_edge_is_a_cycle() {
        let e = edges(&[("b", "c"), ("c", "a")]);
        assert!(GoalService::<GoalRepository>::creates_cycle(&e, "a", "b"));
    }

    #[test]
    fn unrelated_chains_are_not_cycles() {
        let e = edges(&[("b", "c"), ("c", "d")]);
        assert!(!GoalService::<GoalRepository>::creates_cycle(&e, "a", "b"));
    }

    #[test]
    fn diamond_dependencies_are_allowed() {
        let e = edges(&[("a", "b"), ("a", "c")]);
        assert!(!GoalService::<GoalRepository>::creates_cycle(&e, "b", "c"));
    }
}
