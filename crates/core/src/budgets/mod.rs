pub mod budgets_errors;
pub mod budgets_model;
pub mod budgets_repository;
pub mod budgets_service;
pub mod budgets_traits;

pub use budgets_errors::BudgetError;
pub use budgets_model::{
    classify_period, month_bounds, Budget, BudgetDto, BudgetEvaluation, BudgetUpdate,
    BudgetsByPeriod, NewBudget, PeriodStatus,
};
pub use budgets_repository::BudgetRepository;
pub use budgets_service::BudgetService;
pub use budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
