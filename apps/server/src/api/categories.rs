use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use phinance_core::categories::{Category, CategoryUpdate, NewCategory};

/// Get all categories (flat list)
async fn get_all_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.category_service.get_all_categories()?;
    Ok(Json(categories))
}

/// Get expense categories
async fn get_expense_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.category_service.get_expense_categories()?;
    Ok(Json(categories))
}

/// Get income categories
async fn get_income_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.category_service.get_income_categories()?;
    Ok(Json(categories))
}

/// Get a single category by ID
async fn get_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<Category>>> {
    let category = state.category_service.get_category(&id)?;
    Ok(Json(category))
}

/// Create a new category
async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCategory>,
) -> ApiResult<Json<Category>> {
    let category = state.category_service.create_category(payload).await?;
    Ok(Json(category))
}

/// Update a category
async fn update_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    let category = state.category_service.update_category(&id, payload).await?;
    Ok(Json(category))
}

/// Delete a category
async fn delete_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.category_service.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(get_all_categories).post(create_category))
        .route("/categories/expense", get(get_expense_categories))
        .route("/categories/income", get(get_income_categories))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}
