use chrono::NaiveDate;
use rust_decimal_macros::dec;

use phinance_core::budgets::{BudgetRepositoryTrait, BudgetUpdate, NewBudget};
use phinance_core::goals::{GoalError, NewContribution, NewGoal};
use phinance_core::transactions::{NewTransaction, TransactionFilters, TransactionType};
use phinance_core::Error;

mod common;

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn expense(account_id: &str, category_id: &str, amount: rust_decimal::Decimal, day: u32) -> NewTransaction {
    NewTransaction {
        id: None,
        account_id: account_id.to_string(),
        category_id: Some(category_id.to_string()),
        transaction_type: TransactionType::Expense,
        amount,
        description: None,
        transaction_date: march(day),
        transfer_to_account_id: None,
    }
}

#[tokio::test]
async fn expense_transactions_drive_budget_and_balance() {
    let ctx = common::setup();
    let account_id = common::create_checking_account(&ctx, "Checking").await;

    let budget = ctx
        .budget_service
        .upsert_budget(NewBudget {
            category_id: "cat-groceries".to_string(),
            year: 2025,
            month: 3,
            allocated_amount: dec!(500),
            alert_threshold: Some(80),
        })
        .await
        .expect("Failed to create budget");
    assert_eq!(budget.spent_amount, dec!(0));

    let tx = ctx
        .transaction_service
        .create_transaction(expense(&account_id, "cat-groceries", dec!(120), 10))
        .await
        .expect("Failed to create expense");

    let budget = ctx.budget_service.get_budget(&budget.id).expect("budget");
    assert_eq!(budget.spent_amount, dec!(120));
    assert_eq!(budget.spent_percentage, 24.0);
    assert_eq!(budget.remaining_amount, dec!(380));
    assert!(!budget.is_over_budget);

    let account = ctx.account_service.get_account(&account_id).expect("account");
    assert_eq!(account.current_balance, dec!(880));

    // Deleting the expense restores both aggregates
    ctx.transaction_service
        .delete_transaction(&tx.id)
        .await
        .expect("Failed to delete expense");

    let budget = ctx.budget_service.get_budget(&budget.id).expect("budget");
    assert_eq!(budget.spent_amount, dec!(0));

    let account = ctx.account_service.get_account(&account_id).expect("account");
    assert_eq!(account.current_balance, dec!(1000));
}

#[tokio::test]
async fn budget_creation_seeds_spent_from_history_and_upserts() {
    let ctx = common::setup();
    let account_id = common::create_checking_account(&ctx, "Checking").await;

    ctx.transaction_service
        .create_transaction(expense(&account_id, "cat-utilities", dec!(80), 5))
        .await
        .expect("Failed to create expense");
    // Outside the budget month, must not be counted
    let mut april_expense = expense(&account_id, "cat-utilities", dec!(40), 5);
    april_expense.transaction_date = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
    ctx.transaction_service
        .create_transaction(april_expense)
        .await
        .expect("Failed to create expense");

    let budget = ctx
        .budget_service
        .upsert_budget(NewBudget {
            category_id: "cat-utilities".to_string(),
            year: 2025,
            month: 3,
            allocated_amount: dec!(100),
            alert_threshold: None,
        })
        .await
        .expect("Failed to create budget");
    assert_eq!(budget.spent_amount, dec!(80));
    assert!(budget.is_near_limit);

    // Creating again for the same period updates the existing budget
    let updated = ctx
        .budget_service
        .upsert_budget(NewBudget {
            category_id: "cat-utilities".to_string(),
            year: 2025,
            month: 3,
            allocated_amount: dec!(200),
            alert_threshold: Some(50),
        })
        .await
        .expect("Failed to upsert budget");
    assert_eq!(updated.id, budget.id);
    assert_eq!(updated.allocated_amount, dec!(200));
    assert_eq!(updated.spent_amount, dec!(80));

    let month = ctx
        .budget_service
        .get_budgets_by_month(2025, 3)
        .expect("month budgets");
    assert_eq!(month.len(), 1);
}

#[tokio::test]
async fn overspending_sets_one_shot_alert_flags() {
    let ctx = common::setup();
    let account_id = common::create_checking_account(&ctx, "Checking").await;

    let budget = ctx
        .budget_service
        .upsert_budget(NewBudget {
            category_id: "cat-groceries".to_string(),
            year: 2025,
            month: 3,
            allocated_amount: dec!(100),
            alert_threshold: Some(80),
        })
        .await
        .expect("Failed to create budget");

    ctx.transaction_service
        .create_transaction(expense(&account_id, "cat-groceries", dec!(85), 8))
        .await
        .expect("Failed to create expense");

    let stored = ctx
        .budget_repository
        .get_budget_by_id(&budget.id)
        .expect("budget");
    assert!(stored.alert_at_80_sent);
    assert!(!stored.alert_at_100_sent);

    ctx.transaction_service
        .create_transaction(expense(&account_id, "cat-groceries", dec!(25), 9))
        .await
        .expect("Failed to create expense");

    let stored = ctx
        .budget_repository
        .get_budget_by_id(&budget.id)
        .expect("budget");
    assert!(stored.alert_at_100_sent);

    let evaluation = ctx.budget_service.get_budget(&budget.id).expect("budget");
    assert!(evaluation.is_over_budget);
    assert_eq!(evaluation.spent_percentage, 100.0);
    assert_eq!(evaluation.remaining_amount, dec!(-10));
}

#[tokio::test]
async fn deleting_a_budget_leaves_transactions_alone() {
    let ctx = common::setup();
    let account_id = common::create_checking_account(&ctx, "Checking").await;

    let budget = ctx
        .budget_service
        .upsert_budget(NewBudget {
            category_id: "cat-groceries".to_string(),
            year: 2025,
            month: 3,
            allocated_amount: dec!(500),
            alert_threshold: None,
        })
        .await
        .expect("Failed to create budget");

    ctx.transaction_service
        .create_transaction(expense(&account_id, "cat-groceries", dec!(60), 3))
        .await
        .expect("Failed to create expense");

    ctx.budget_service
        .delete_budget(&budget.id)
        .await
        .expect("Failed to delete budget");

    let transactions = ctx
        .transaction_service
        .list_transactions(&TransactionFilters::default())
        .expect("transactions");
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, dec!(60));
}

#[tokio::test]
async fn budget_update_only_touches_amount_and_threshold() {
    let ctx = common::setup();

    let budget = ctx
        .budget_service
        .upsert_budget(NewBudget {
            category_id: "cat-rent".to_string(),
            year: 2025,
            month: 7,
            allocated_amount: dec!(900),
            alert_threshold: Some(90),
        })
        .await
        .expect("Failed to create budget");

    let updated = ctx
        .budget_service
        .update_budget(
            &budget.id,
            BudgetUpdate {
                allocated_amount: dec!(950),
                alert_threshold: None,
            },
        )
        .await
        .expect("Failed to update budget");

    assert_eq!(updated.allocated_amount, dec!(950));
    assert_eq!(updated.alert_threshold, 90);
    assert_eq!(updated.year, 2025);
    assert_eq!(updated.month, 7);
}

#[tokio::test]
async fn contributions_complete_goals_and_move_funds() {
    let ctx = common::setup();
    let account_id = common::create_checking_account(&ctx, "Checking").await;

    let goal = ctx
        .goal_service
        .create_goal(NewGoal {
            name: "Vacation".to_string(),
            description: None,
            target_amount: dec!(500),
            deadline: None,
            priority: None,
            color: None,
            icon: None,
        })
        .await
        .expect("Failed to create goal");
    let savings_account_id = goal.savings_account_id.clone().expect("savings account");

    let goal = ctx
        .goal_service
        .add_contribution(NewContribution {
            goal_id: goal.id.clone(),
            account_id: account_id.clone(),
            amount: dec!(200),
            note: Some("first deposit".to_string()),
        })
        .await
        .expect("Failed to contribute");
    assert_eq!(goal.current_amount, dec!(200));
    assert_eq!(goal.progress_percentage, 40.0);
    assert!(!goal.completed);

    let goal = ctx
        .goal_service
        .add_contribution(NewContribution {
            goal_id: goal.id.clone(),
            account_id: account_id.clone(),
            amount: dec!(300),
            note: None,
        })
        .await
        .expect("Failed to contribute");
    assert!(goal.completed);
    assert_eq!(goal.progress_percentage, 100.0);

    let checking = ctx.account_service.get_account(&account_id).expect("account");
    assert_eq!(checking.current_balance, dec!(500));
    let savings = ctx
        .account_service
        .get_account(&savings_account_id)
        .expect("savings");
    assert_eq!(savings.current_balance, dec!(500));

    let contributions = ctx
        .goal_service
        .get_contributions(&goal.id)
        .expect("contributions");
    assert_eq!(contributions.len(), 2);
    assert!(contributions.iter().all(|c| c.transaction_id.is_some()));
}

#[tokio::test]
async fn rejected_contribution_leaves_goal_untouched() {
    let ctx = common::setup();
    let account_id = common::create_checking_account(&ctx, "Checking").await;

    let goal = ctx
        .goal_service
        .create_goal(NewGoal {
            name: "Emergency fund".to_string(),
            description: None,
            target_amount: dec!(1000),
            deadline: None,
            priority: None,
            color: None,
            icon: None,
        })
        .await
        .expect("Failed to create goal");

    let err = ctx
        .goal_service
        .add_contribution(NewContribution {
            goal_id: goal.id.clone(),
            account_id: account_id.clone(),
            amount: dec!(-10),
            note: None,
        })
        .await
        .expect_err("negative contribution must fail");
    assert!(matches!(err, Error::Goal(GoalError::InvalidAmount(_))));

    let goal = ctx.goal_service.get_goal(&goal.id).expect("goal");
    assert_eq!(goal.current_amount, dec!(0));
}

#[tokio::test]
async fn savings_accounts_cannot_fund_contributions() {
    let ctx = common::setup();
    let _ = common::create_checking_account(&ctx, "Checking").await;

    let first = ctx
        .goal_service
        .create_goal(NewGoal {
            name: "First".to_string(),
            description: None,
            target_amount: dec!(100),
            deadline: None,
            priority: None,
            color: None,
            icon: None,
        })
        .await
        .expect("goal");
    let second = ctx
        .goal_service
        .create_goal(NewGoal {
            name: "Second".to_string(),
            description: None,
            target_amount: dec!(100),
            deadline: None,
            priority: None,
            color: None,
            icon: None,
        })
        .await
        .expect("goal");

    let err = ctx
        .goal_service
        .add_contribution(NewContribution {
            goal_id: second.id.clone(),
            account_id: first.savings_account_id.clone().expect("savings account"),
            amount: dec!(50),
            note: None,
        })
        .await
        .expect_err("savings-funded contribution must fail");
    assert!(matches!(err, Error::Goal(GoalError::InvalidData(_))));
}

#[tokio::test]
async fn deleting_the_backing_transfer_reverts_the_amount_but_not_completion() {
    let ctx = common::setup();
    let account_id = common::create_checking_account(&ctx, "Checking").await;

    let goal = ctx
        .goal_service
        .create_goal(NewGoal {
            name: "Bike".to_string(),
            description: None,
            target_amount: dec!(300),
            deadline: None,
            priority: None,
            color: None,
            icon: None,
        })
        .await
        .expect("goal");

    let goal = ctx
        .goal_service
        .add_contribution(NewContribution {
            goal_id: goal.id.clone(),
            account_id: account_id.clone(),
            amount: dec!(300),
            note: None,
        })
        .await
        .expect("contribution");
    assert!(goal.completed);

    let contributions = ctx
        .goal_service
        .get_contributions(&goal.id)
        .expect("contributions");
    let transaction_id = contributions[0]
        .transaction_id
        .clone()
        .expect("backing transaction");

    ctx.transaction_service
        .delete_transaction(&transaction_id)
        .await
        .expect("Failed to delete transfer");

    let goal = ctx.goal_service.get_goal(&goal.id).expect("goal");
    assert_eq!(goal.current_amount, dec!(0));
    // Completion does not un-fire when contributions are reverted
    assert!(goal.completed);

    let contributions = ctx
        .goal_service
        .get_contributions(&goal.id)
        .expect("contributions");
    assert!(contributions.is_empty());
}

#[tokio::test]
async fn goal_dependencies_gate_explicit_completion() {
    let ctx = common::setup();
    let _ = common::create_checking_account(&ctx, "Checking").await;

    let car = ctx
        .goal_service
        .create_goal(NewGoal {
            name: "Car".to_string(),
            description: None,
            target_amount: dec!(5000),
            deadline: None,
            priority: None,
            color: None,
            icon: None,
        })
        .await
        .expect("goal");
    let license = ctx
        .goal_service
        .create_goal(NewGoal {
            name: "License".to_string(),
            description: None,
            target_amount: dec!(800),
            deadline: None,
            priority: None,
            color: None,
            icon: None,
        })
        .await
        .expect("goal");

    ctx.goal_service
        .add_dependency(&car.id, &license.id)
        .await
        .expect("dependency");

    // Circular dependency is refused
    let err = ctx
        .goal_service
        .add_dependency(&license.id, &car.id)
        .await
        .expect_err("cycle must be refused");
    assert!(matches!(err, Error::Goal(GoalError::InvalidData(_))));

    // Completion is gated on the open dependency
    let err = ctx
        .goal_service
        .mark_completed(&car.id)
        .await
        .expect_err("gated completion must fail");
    assert!(matches!(err, Error::Goal(GoalError::InvalidData(_))));
    assert!(!ctx
        .goal_service
        .validate_dependencies(&car.id)
        .expect("validate"));

    ctx.goal_service
        .mark_completed(&license.id)
        .await
        .expect("complete dependency");
    let car = ctx
        .goal_service
        .mark_completed(&car.id)
        .await
        .expect("complete goal");
    assert!(car.completed);

    // A goal with dependents cannot be deleted
    let err = ctx
        .goal_service
        .delete_goal(&license.id)
        .await
        .expect_err("delete must be refused");
    assert!(matches!(err, Error::Goal(GoalError::InvalidData(_))));
}
