mod support;

use axum::http::StatusCode;
use domain::ProgressPolicy;
use serde_json::{Value, json};
use support::TestApp;

async fn place(app: &TestApp, token: &str, number: &str, quantity: i32) -> Value {
    let (status, order) = app
        .post(
            "/orders",
            token,
            json!({
                "order_number": number,
                "material": "Plywood",
                "quantity": quantity,
                "size": "2x4",
                "color": "natural"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", order);
    order
}

#[tokio::test]
async fn managers_place_orders() {
    let app = TestApp::new().await;
    let (manager_id, manager) = app.account("mia", "manager").await;
    let (_, worker) = app.account("wes", "worker").await;

    let order = place(&app, &manager, "A-1", 10).await;
    assert_eq!(order["status"], "created");
    assert_eq!(order["completed_quantity"], 0);
    assert_eq!(order["created_by"], manager_id);

    let (status, _) = app
        .post(
            "/orders",
            &worker,
            json!({ "order_number": "A-2", "material": "Oak", "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/orders",
            &manager,
            json!({ "order_number": "A-3", "material": "Oak", "quantity": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progress_advances_the_order() {
    let app = TestApp::new().await;
    let (_, manager) = app.account("mia", "manager").await;
    let (_, worker) = app.account("wes", "worker").await;
    let id = place(&app, &manager, "A-1", 10).await["id"].clone();

    let (status, order) = app
        .put("/orders", &worker, json!({ "id": id, "completed_delta": 4 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["completed_quantity"], 4);
    assert_eq!(order["status"], "in_progress");

    let (status, body) = app
        .put("/orders", &worker, json!({ "id": id, "completed_delta": 7 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, order) = app
        .put(
            "/orders",
            &worker,
            json!({ "id": id, "completed_quantity": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["completed_quantity"], 10);
    assert_eq!(order["status"], "completed");

    let (status, order) = app
        .put("/orders", &worker, json!({ "id": id, "status": "shipped" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "shipped");

    let (status, _) = app
        .put("/orders", &worker, json!({ "id": id, "completed_delta": 1 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn shipping_requires_completion() {
    let app = TestApp::new().await;
    let (_, manager) = app.account("mia", "manager").await;
    let id = place(&app, &manager, "A-1", 5).await["id"].clone();

    let (status, _) = app
        .put("/orders", &manager, json!({ "id": id, "status": "shipped" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .put("/orders", &manager, json!({ "id": id, "status": "packed" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_takes_exactly_one_change() {
    let app = TestApp::new().await;
    let (_, manager) = app.account("mia", "manager").await;
    let id = place(&app, &manager, "A-1", 5).await["id"].clone();

    let (status, _) = app
        .put(
            "/orders",
            &manager,
            json!({ "id": id, "completed_delta": 1, "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put("/orders", &manager, json!({ "id": id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn workers_cannot_set_planning_statuses() {
    let app = TestApp::new().await;
    let (_, manager) = app.account("mia", "manager").await;
    let (_, worker) = app.account("wes", "worker").await;
    let id = place(&app, &manager, "A-1", 5).await["id"].clone();

    let (status, _) = app
        .put("/orders", &worker, json!({ "id": id, "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, order) = app
        .put(
            "/orders",
            &manager,
            json!({ "id": id, "status": "in_progress" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "in_progress");
}

#[tokio::test]
async fn manual_statuses_under_quantity_only() {
    let app = TestApp::with_policy(ProgressPolicy::QuantityOnly).await;
    let (_, manager) = app.account("mia", "manager").await;
    let id = place(&app, &manager, "A-1", 10).await["id"].clone();

    let (_, order) = app
        .put(
            "/orders",
            &manager,
            json!({ "id": id, "status": "in_progress" }),
        )
        .await;
    assert_eq!(order["status"], "in_progress");

    let (_, order) = app
        .put(
            "/orders",
            &manager,
            json!({ "id": id, "completed_delta": 10 }),
        )
        .await;
    assert_eq!(order["completed_quantity"], 10);
    assert_eq!(order["status"], "in_progress");

    let (status, order) = app
        .put(
            "/orders",
            &manager,
            json!({ "id": id, "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "completed");
}

#[tokio::test]
async fn listing_filters_and_summarizes() {
    let app = TestApp::new().await;
    let (_, manager) = app.account("mia", "manager").await;
    let first = place(&app, &manager, "A-1", 2).await["id"].clone();
    place(&app, &manager, "A-2", 3).await;
    place(&app, &manager, "A-3", 4).await;

    app.put(
        "/orders",
        &manager,
        json!({ "id": first, "completed_delta": 2 }),
    )
    .await;

    let (status, all) = app.get("/orders", &manager).await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["order_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, ["A-3", "A-2", "A-1"]);

    let (_, completed) = app.get("/orders?status=completed", &manager).await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
    assert_eq!(completed[0]["id"], first);

    let (status, _) = app.get("/orders?status=lost", &manager).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, summary) = app.get("/orders/summary", &manager).await;
    assert_eq!(summary["all"], 3);
    assert_eq!(summary["created"], 2);
    assert_eq!(summary["completed"], 1);
    assert_eq!(summary["shipped"], 0);
}

#[tokio::test]
async fn any_role_may_delete() {
    let app = TestApp::new().await;
    let (_, manager) = app.account("mia", "manager").await;
    let (_, worker) = app.account("wes", "worker").await;
    let id = place(&app, &manager, "A-1", 2).await["id"].as_i64().unwrap();

    let (status, _) = app
        .delete(&format!("/orders?id={}", id), &worker, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .delete(&format!("/orders?id={}", id), &worker, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
