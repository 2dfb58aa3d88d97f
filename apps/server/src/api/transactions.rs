use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use phinance_core::transactions::{
    NewTransaction, SortDirection, Transaction, TransactionFilters, TransactionSortBy,
    TransactionType, TransactionUpdate,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TransactionListQuery {
    account_id: Option<String>,
    category_id: Option<String>,
    transaction_type: Option<TransactionType>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    min_amount: Option<Decimal>,
    max_amount: Option<Decimal>,
    search: Option<String>,
    sort_by: Option<TransactionSortBy>,
    sort_direction: Option<SortDirection>,
}

impl From<TransactionListQuery> for TransactionFilters {
    fn from(query: TransactionListQuery) -> Self {
        TransactionFilters {
            account_id: query.account_id,
            category_id: query.category_id,
            transaction_type: query.transaction_type,
            start_date: query.start_date,
            end_date: query.end_date,
            min_amount: query.min_amount,
            max_amount: query.max_amount,
            search: query.search,
            sort_by: query.sort_by,
            sort_direction: query.sort_direction,
        }
    }
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionListQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let filters: TransactionFilters = query.into();
    let transactions = state.transaction_service.list_transactions(&filters)?;
    Ok(Json(transactions))
}

async fn get_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state.transaction_service.get_transaction(&id)?;
    Ok(Json(transaction))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewTransaction>,
) -> ApiResult<Json<Transaction>> {
    let created = state.transaction_service.create_transaction(payload).await?;
    Ok(Json(created))
}

async fn update_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TransactionUpdate>,
) -> ApiResult<Json<Transaction>> {
    let updated = state
        .transaction_service
        .update_transaction(&id, payload)
        .await?;
    Ok(Json(updated))
}

async fn delete_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.transaction_service.delete_transaction(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}
