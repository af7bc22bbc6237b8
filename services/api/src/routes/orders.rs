//! Production orders

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use domain::{OrderStatus, Role};
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{CreateOrderRequest, IdQuery, OrdersQuery, UpdateOrderRequest},
    state::AppState,
};

const FLOOR_ROLES: [Role; 2] = [Role::Worker, Role::Manager];
const PLANNING_ROLES: [Role; 2] = [Role::Manager, Role::Admin];

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<impl IntoResponse> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    Ok(Json(state.orders.list_orders(status).await?))
}

pub async fn summary(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orders.summary().await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&PLANNING_ROLES)?;

    let order = state
        .orders
        .create_order(
            &payload.order_number,
            &payload.material,
            payload.quantity,
            &payload.size,
            &payload.color,
            Some(payload.created_by.unwrap_or(caller.id)),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Progress and shipping happen on the floor; other status changes are planning
pub async fn update_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<UpdateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = payload.id;
    let order = match (
        payload.completed_delta,
        payload.completed_quantity,
        payload.status,
    ) {
        (Some(delta), None, None) => {
            caller.require_any(&FLOOR_ROLES)?;
            state.orders.record_progress(id, delta).await?
        }
        (None, Some(total), None) => {
            caller.require_any(&FLOOR_ROLES)?;
            state.orders.record_progress_total(id, total).await?
        }
        (None, None, Some(status)) => match status.parse::<OrderStatus>()? {
            OrderStatus::Shipped => {
                caller.require_any(&FLOOR_ROLES)?;
                state.orders.mark_shipped(id).await?
            }
            status => {
                caller.require_any(&PLANNING_ROLES)?;
                state.orders.set_status(id, status).await?
            }
        },
        _ => {
            return Err(ApiError::BadRequest(
                "Provide exactly one of completed_delta, completed_quantity or status".to_string(),
            ));
        }
    };

    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<IdQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Manager, Role::Worker, Role::Admin])?;

    state.orders.delete_order(query.id).await?;
    Ok(Json(json!({ "success": true })))
}
