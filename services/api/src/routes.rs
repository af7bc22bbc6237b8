//! API service routes

use axum::{
    Json, Router,
    http::{Method, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::{middleware::auth_middleware, state::AppState};

mod auth;
mod materials;
mod orders;
mod schedule;
mod sections;
mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .delete(users::delete_user),
        )
        .route(
            "/materials",
            get(materials::list_materials)
                .post(materials::create_material)
                .put(materials::update_material)
                .delete(materials::delete_material),
        )
        .route("/materials/:id/movements", get(materials::list_movements))
        .route(
            "/sections",
            get(sections::list_sections)
                .post(sections::create_section)
                .delete(sections::delete_section),
        )
        .route(
            "/orders",
            get(orders::list_orders)
                .post(orders::create_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/summary", get(orders::summary))
        .route(
            "/schedule",
            get(schedule::list_month)
                .post(schedule::upsert_hours)
                .put(schedule::edit_hours),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(auth::login))
        .merge(protected_routes)
        .with_state(state)
}

/// Any origin may call the API
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "shopfloor-api"
    }))
}
