use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use phinance_core::accounts::AccountError;
use phinance_core::budgets::BudgetError;
use phinance_core::categories::CategoryError;
use phinance_core::errors::Error as CoreError;
use phinance_core::goals::GoalError;
use phinance_core::transactions::TransactionError;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    // Surface the underlying error message to help debugging during development
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_error_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Account(AccountError::NotFound(_))
        | CoreError::Category(CategoryError::NotFound(_))
        | CoreError::Transaction(TransactionError::NotFound(_))
        | CoreError::Budget(BudgetError::NotFound(_))
        | CoreError::Goal(GoalError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Account(AccountError::InvalidData(_))
        | CoreError::Category(CategoryError::InvalidData(_))
        | CoreError::Transaction(TransactionError::InvalidData(_))
        | CoreError::Budget(BudgetError::InvalidData(_))
        | CoreError::Goal(GoalError::InvalidData(_))
        | CoreError::Goal(GoalError::InvalidAmount(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_error_status(e), e.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        ApiError::Core(CoreError::Account(err))
    }
}
