use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use phinance_core::goals::{Contribution, GoalDto, GoalUpdate, NewContribution, NewGoal};

async fn get_goals(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<GoalDto>>> {
    let goals = state.goal_service.get_goals()?;
    Ok(Json(goals))
}

async fn get_active_goals(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<GoalDto>>> {
    let goals = state.goal_service.get_active_goals()?;
    Ok(Json(goals))
}

async fn get_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GoalDto>> {
    let goal = state.goal_service.get_goal(&id)?;
    Ok(Json(goal))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewGoal>,
) -> ApiResult<Json<GoalDto>> {
    let goal = state.goal_service.create_goal(payload).await?;
    Ok(Json(goal))
}

async fn update_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GoalUpdate>,
) -> ApiResult<Json<GoalDto>> {
    let goal = state.goal_service.update_goal(&id, payload).await?;
    Ok(Json(goal))
}

async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.goal_service.delete_goal(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_completed(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GoalDto>> {
    let goal = state.goal_service.mark_completed(&id).await?;
    Ok(Json(goal))
}

async fn add_contribution(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewContribution>,
) -> ApiResult<Json<GoalDto>> {
    let goal = state.goal_service.add_contribution(payload).await?;
    Ok(Json(goal))
}

async fn get_contributions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Contribution>>> {
    let contributions = state.goal_service.get_contributions(&id)?;
    Ok(Json(contributions))
}

async fn add_dependency(
    Path((id, dep_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GoalDto>> {
    let goal = state.goal_service.add_dependency(&id, &dep_id).await?;
    Ok(Json(goal))
}

async fn remove_dependency(
    Path((id, dep_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GoalDto>> {
    let goal = state.goal_service.remove_dependency(&id, &dep_id).await?;
    Ok(Json(goal))
}

async fn validate_dependencies(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<bool>> {
    let satisfied = state.goal_service.validate_dependencies(&id)?;
    Ok(Json(satisfied))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(get_goals).post(create_goal))
        .route("/goals/active", get(get_active_goals))
        .route("/goals/contributions", post(add_contribution))
        .route(
            "/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route("/goals/{id}/complete", post(mark_completed))
        .route("/goals/{id}/contributions", get(get_contributions))
        .route(
            "/goals/{id}/dependencies/validate",
            get(validate_dependencies),
        )
        .route(
            "/goals/{id}/dependencies/{dep_id}",
            post(add_dependency).delete(remove_dependency),
        )
}
