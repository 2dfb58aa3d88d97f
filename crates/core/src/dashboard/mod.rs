pub mod dashboard_model;
pub mod dashboard_service;

pub use dashboard_model::{AccountSummary, CategoryExpense, DashboardSummary, MonthlyData};
pub use dashboard_service::DashboardService;
