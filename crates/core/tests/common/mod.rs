use std::sync::Arc;

use phinance_core::accounts::{AccountService, NewAccount};
use phinance_core::budgets::{
    BudgetRepository, BudgetRepositoryTrait, BudgetService, BudgetServiceTrait,
};
use phinance_core::db::{self, DbPool};
use phinance_core::goals::{GoalRepository, GoalService, GoalServiceTrait};
use phinance_core::transactions::{TransactionRepository, TransactionService};

pub struct TestContext {
    // Held so the database file outlives the services
    #[allow(dead_code)]
    pub tmp: tempfile::TempDir,
    pub account_service: Arc<AccountService>,
    pub transaction_service: Arc<TransactionService>,
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub budget_repository: Arc<BudgetRepository>,
}

pub fn setup() -> TestContext {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = tmp.path().join("app.db");
    let pool: Arc<DbPool> =
        db::create_pool(db_path.to_str().expect("utf-8 path")).expect("Failed to create pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
    let transaction_service = Arc::new(TransactionService::new(
        pool.clone(),
        transaction_repository.clone(),
    ));
    let account_service = Arc::new(AccountService::new(
        pool.clone(),
        transaction_service.clone(),
    ));

    let budget_repository = Arc::new(BudgetRepository::new(pool.clone()));
    let budget_service: Arc<dyn BudgetServiceTrait> = Arc::new(BudgetService::new(
        budget_repository.clone() as Arc<dyn BudgetRepositoryTrait>,
        transaction_repository.clone(),
    ));

    let goal_repository = Arc::new(GoalRepository::new(pool.clone()));
    let goal_service: Arc<dyn GoalServiceTrait> = Arc::new(GoalService::new(
        goal_repository,
        account_service.clone(),
        transaction_service.clone(),
    ));

    TestContext {
        tmp,
        account_service,
        transaction_service,
        budget_service,
        goal_service,
        budget_repository,
    }
}

pub async fn create_checking_account(ctx: &TestContext, name: &str) -> String {
    let account = ctx
        .account_service
        .create_account(NewAccount {
            id: None,
            name: name.to_string(),
            account_type: phinance_core::accounts::AccountType::BankAccount,
            currency: None,
            initial_balance: Some(rust_decimal_macros::dec!(1000)),
            description: None,
            color: None,
            icon: None,
        })
        .await
        .expect("Failed to create account");
    account.id
}
