//! API models for request and response payloads

use chrono::NaiveDate;
use domain::{DomainError, DomainResult, Material, MaterialDraft, MonthSchedule, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: User,
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

/// Body of the deletes that identify the record in JSON
#[derive(Deserialize)]
pub struct IdPayload {
    pub id: i64,
}

/// Query of the deletes that identify the record in the URL
#[derive(Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

#[derive(Deserialize)]
pub struct UsersQuery {
    /// Accepted for compatibility; secrets are never returned
    pub include_passwords: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub full_name: String,
}

/// A material with its section label resolved
#[derive(Serialize, Deserialize)]
pub struct MaterialView {
    #[serde(flatten)]
    pub material: Material,
    pub section_name: String,
}

/// `PUT /materials` carries either a stock change or a full replacement
pub enum MaterialUpdate {
    Delta { id: i64, quantity_change: i32 },
    Replace { id: i64, draft: MaterialDraft },
}

#[derive(Deserialize)]
struct StockChange {
    id: i64,
    quantity_change: i32,
}

#[derive(Deserialize)]
struct Replacement {
    id: i64,
    #[serde(flatten)]
    draft: MaterialDraft,
}

impl MaterialUpdate {
    /// A body with a `quantity_change` key is a stock change, whatever its value
    pub fn from_json(body: Value) -> DomainResult<Self> {
        if body.get("quantity_change").is_some() {
            let change: StockChange = serde_json::from_value(body).map_err(|e| {
                DomainError::validation(format!("Invalid stock change: {}", e))
            })?;
            return Ok(MaterialUpdate::Delta {
                id: change.id,
                quantity_change: change.quantity_change,
            });
        }

        let replacement: Replacement = serde_json::from_value(body)
            .map_err(|e| DomainError::validation(format!("Invalid material: {}", e)))?;
        Ok(MaterialUpdate::Replace {
            id: replacement.id,
            draft: replacement.draft,
        })
    }
}

#[derive(Deserialize)]
pub struct CreateSectionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub created_by: Option<i64>,
}

/// `PUT /orders`; exactly one of the optional fields must be present
#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub id: i64,
    pub completed_delta: Option<i32>,
    pub completed_quantity: Option<i32>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ScheduleQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Serialize, Deserialize)]
pub struct MonthScheduleResponse {
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub schedule: MonthSchedule,
}

#[derive(Deserialize)]
pub struct UpsertScheduleRequest {
    pub user_id: i64,
    pub work_date: NaiveDate,
    pub hours: f64,
}

#[derive(Deserialize)]
pub struct EditScheduleRequest {
    pub id: i64,
    pub hours: f64,
}
