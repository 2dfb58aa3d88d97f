use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use phinance_core::{
    accounts::{AccountRepository, AccountService},
    budgets::{BudgetRepository, BudgetRepositoryTrait, BudgetService, BudgetServiceTrait},
    categories::{CategoryRepository, CategoryService, CategoryServiceTrait},
    dashboard::DashboardService,
    db,
    goals::{GoalRepository, GoalService, GoalServiceTrait},
    transactions::{TransactionRepository, TransactionService},
};

pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub category_service: Arc<dyn CategoryServiceTrait + Send + Sync>,
    pub transaction_service: Arc<TransactionService>,
    pub budget_service: Arc<dyn BudgetServiceTrait + Send + Sync>,
    pub goal_service: Arc<dyn GoalServiceTrait + Send + Sync>,
    pub dashboard_service: Arc<DashboardService>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("PF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    // Ensure DATABASE_URL aligns with PF_DB_PATH so the core picks the right file
    std::env::set_var("DATABASE_URL", &config.db_path);
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;

    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
    let transaction_service = Arc::new(TransactionService::new(
        pool.clone(),
        transaction_repository.clone(),
    ));

    let account_service = Arc::new(AccountService::new(
        pool.clone(),
        transaction_service.clone(),
    ));

    let category_repository = Arc::new(CategoryRepository::new(pool.clone()));
    let category_service: Arc<dyn CategoryServiceTrait + Send + Sync> =
        Arc::new(CategoryService::new(category_repository.clone()));

    let budget_repository: Arc<dyn BudgetRepositoryTrait> =
        Arc::new(BudgetRepository::new(pool.clone()));
    let budget_service: Arc<dyn BudgetServiceTrait + Send + Sync> = Arc::new(BudgetService::new(
        budget_repository,
        transaction_repository.clone(),
    ));

    let goal_repository = Arc::new(GoalRepository::new(pool.clone()));
    let goal_service: Arc<dyn GoalServiceTrait + Send + Sync> = Arc::new(GoalService::new(
        goal_repository,
        account_service.clone(),
        transaction_service.clone(),
    ));

    let account_repository = Arc::new(AccountRepository::new(pool.clone()));
    let dashboard_service = Arc::new(DashboardService::new(
        account_repository,
        transaction_repository,
        category_repository,
    ));

    Ok(Arc::new(AppState {
        account_service,
        category_service,
        transaction_service,
        budget_service,
        goal_service,
        dashboard_service,
        db_path,
    }))
}
