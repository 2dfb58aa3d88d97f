use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use phinance_core::budgets::{BudgetDto, BudgetUpdate, BudgetsByPeriod, NewBudget};

#[derive(Deserialize)]
struct MonthQuery {
    year: i32,
    month: i32,
}

#[derive(Deserialize)]
struct CompareQuery {
    year1: i32,
    month1: i32,
    year2: i32,
    month2: i32,
}

async fn get_budgets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<BudgetDto>>> {
    let budgets = state.budget_service.get_budgets()?;
    Ok(Json(budgets))
}

/// Budgets segmented into past, current and future periods
async fn get_budget_overview(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BudgetsByPeriod>> {
    let overview = state.budget_service.get_budgets_by_period()?;
    Ok(Json(overview))
}

async fn get_budgets_by_month(
    Query(query): Query<MonthQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BudgetDto>>> {
    let budgets = state
        .budget_service
        .get_budgets_by_month(query.year, query.month)?;
    Ok(Json(budgets))
}

async fn compare_budgets(
    Query(query): Query<CompareQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BudgetDto>>> {
    let budgets = state.budget_service.compare_budgets(
        query.year1,
        query.month1,
        query.year2,
        query.month2,
    )?;
    Ok(Json(budgets))
}

async fn get_budget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BudgetDto>> {
    let budget = state.budget_service.get_budget(&id)?;
    Ok(Json(budget))
}

async fn create_budget(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewBudget>,
) -> ApiResult<Json<BudgetDto>> {
    let budget = state.budget_service.upsert_budget(payload).await?;
    Ok(Json(budget))
}

async fn update_budget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BudgetUpdate>,
) -> ApiResult<Json<BudgetDto>> {
    let budget = state.budget_service.update_budget(&id, payload).await?;
    Ok(Json(budget))
}

async fn delete_budget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.budget_service.delete_budget(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budgets", get(get_budgets).post(create_budget))
        .route("/budgets/overview", get(get_budget_overview))
        .route("/budgets/month", get(get_budgets_by_month))
        .route("/budgets/compare", get(compare_budgets))
        .route(
            "/budgets/{id}",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
}
