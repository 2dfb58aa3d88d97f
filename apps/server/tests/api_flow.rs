use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use phinance_server::{api::app_router, build_state, config::Config};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn budget_and_goal_flow() {
    let tmp = tempdir().unwrap();
    std::env::set_var("PF_DB_PATH", tmp.path().join("test.db"));
    let config = Config::from_env();
    let state = build_state(&config).await.unwrap();
    let app = app_router(state, &config);

    // Checking account to spend from
    let (status, account) = request(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(json!({
            "name": "Checking",
            "accountType": "BANK_ACCOUNT",
            "initialBalance": 2000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let account_id = account["id"].as_str().unwrap().to_string();

    // Budget for a seeded default category
    let (status, budget) = request(
        &app,
        "POST",
        "/api/v1/budgets",
        Some(json!({
            "categoryId": "cat-groceries",
            "year": 2025,
            "month": 3,
            "allocatedAmount": 500,
            "alertThreshold": 80
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(budget["spentAmount"].as_f64().unwrap(), 0.0);
    let budget_id = budget["id"].as_str().unwrap().to_string();

    // An expense in that category and month is reflected in the budget
    let (status, _) = request(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({
            "accountId": account_id,
            "categoryId": "cat-groceries",
            "transactionType": "EXPENSE",
            "amount": 120,
            "description": "Weekly shop",
            "transactionDate": "2025-03-10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, budget) =
        request(&app, "GET", &format!("/api/v1/budgets/{}", budget_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(budget["spentAmount"].as_f64().unwrap(), 120.0);
    assert_eq!(budget["spentPercentage"].as_f64().unwrap(), 24.0);
    assert_eq!(budget["isOverBudget"], Value::Bool(false));
    assert_eq!(budget["remainingAmount"].as_f64().unwrap(), 380.0);

    // The expense also debited the account
    let (_, account) = request(
        &app,
        "GET",
        &format!("/api/v1/accounts/{}", account_id),
        None,
    )
    .await;
    assert_eq!(account["currentBalance"].as_f64().unwrap(), 1880.0);

    // Budget creation over existing expenses seeds the spent amount
    let (status, _) = request(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({
            "accountId": account_id,
            "categoryId": "cat-utilities",
            "transactionType": "EXPENSE",
            "amount": 80,
            "transactionDate": "2025-03-12"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, seeded) = request(
        &app,
        "POST",
        "/api/v1/budgets",
        Some(json!({
            "categoryId": "cat-utilities",
            "year": 2025,
            "month": 3,
            "allocatedAmount": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seeded["spentAmount"].as_f64().unwrap(), 80.0);
    assert_eq!(seeded["isNearLimit"], Value::Bool(true));

    // Savings goal with contributions
    let (status, goal) = request(
        &app,
        "POST",
        "/api/v1/goals",
        Some(json!({
            "name": "Vacation",
            "targetAmount": 1000,
            "priority": "HIGH"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let goal_id = goal["id"].as_str().unwrap().to_string();
    assert_eq!(goal["currentAmount"].as_f64().unwrap(), 0.0);
    assert!(goal["savingsAccountId"].is_string());

    let (status, goal) = request(
        &app,
        "POST",
        "/api/v1/goals/contributions",
        Some(json!({
            "goalId": goal_id,
            "accountId": account_id,
            "amount": 400
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["currentAmount"].as_f64().unwrap(), 400.0);
    assert_eq!(goal["progressPercentage"].as_f64().unwrap(), 40.0);
    assert_eq!(goal["completed"], Value::Bool(false));

    // Non-positive contributions are rejected and change nothing
    let (status, _) = request(
        &app,
        "POST",
        "/api/v1/goals/contributions",
        Some(json!({
            "goalId": goal_id,
            "accountId": account_id,
            "amount": -10
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, goal) = request(&app, "GET", &format!("/api/v1/goals/{}", goal_id), None).await;
    assert_eq!(goal["currentAmount"].as_f64().unwrap(), 400.0);

    // Reaching the target completes the goal
    let (status, goal) = request(
        &app,
        "POST",
        "/api/v1/goals/contributions",
        Some(json!({
            "goalId": goal_id,
            "accountId": account_id,
            "amount": 600
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["completed"], Value::Bool(true));
    assert_eq!(goal["progressPercentage"].as_f64().unwrap(), 100.0);

    // Contributions moved money out of the checking account
    let (_, account) = request(
        &app,
        "GET",
        &format!("/api/v1/accounts/{}", account_id),
        None,
    )
    .await;
    assert_eq!(account["currentBalance"].as_f64().unwrap(), 800.0);

    // Dashboard aggregates without error
    let (status, dashboard) = request(&app, "GET", "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(dashboard["accountSummaries"].is_array());
}
