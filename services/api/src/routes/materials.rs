//! Materials and stock changes

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use domain::{MaterialDraft, Role};
use serde_json::{Value, json};

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::{IdQuery, MaterialUpdate, MaterialView},
    state::AppState,
};

pub async fn list_materials(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let materials = state.inventory.list_materials().await?;
    let sections = state.directory.section_lookup().await?;

    let views: Vec<MaterialView> = materials
        .into_iter()
        .map(|material| MaterialView {
            section_name: sections.label(material.section_id).to_string(),
            material,
        })
        .collect();

    Ok(Json(views))
}

pub async fn create_material(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(draft): Json<MaterialDraft>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin])?;

    let material = state.inventory.create_material(draft).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

/// Stock changes are open to every role; replacing the record is admin only
pub async fn update_material(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let material = match MaterialUpdate::from_json(payload)? {
        MaterialUpdate::Delta {
            id,
            quantity_change,
        } => {
            state
                .inventory
                .apply_delta(id, quantity_change, Some(caller.id))
                .await?
        }
        MaterialUpdate::Replace { id, draft } => {
            caller.require_any(&[Role::Admin])?;
            state.inventory.update_material(id, draft).await?
        }
    };

    Ok(Json(material))
}

pub async fn delete_material(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<IdQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin])?;

    state.inventory.delete_material(query.id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_movements(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.inventory.list_movements(id).await?))
}
