//! Typed HTTP client for the shop floor API
//!
//! Every mutating call first runs the same domain constructors the server
//! uses, so invalid input fails with [`ClientError::Validation`] without a
//! request being sent. Non-2xx answers become [`ClientError::RemoteFailure`]
//! carrying the server's `error` message.

use std::time::Duration;

use chrono::NaiveDate;
use domain::{
    DomainError, InventoryMovement, Material, MaterialDraft, MonthSchedule, NewOrder, NewSection,
    NewUser, Order, OrderStatus, OrderSummary, ScheduleEntry, ScheduleRecord, Section, User,
    WorkHours, YearMonth,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ClientResult},
    session::Session,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A material as listed by the server, with its section label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    #[serde(flatten)]
    pub material: Material,
    pub section_name: String,
}

/// One month of the schedule grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub schedule: MonthSchedule,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: User,
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ReplaceMaterial<'a> {
    id: i64,
    #[serde(flatten)]
    draft: &'a MaterialDraft,
}

fn encode(body: impl Serialize) -> ClientResult<Value> {
    serde_json::to_value(body).map_err(|e| ClientError::Encoding(e.to_string()))
}

#[derive(Clone)]
pub struct ShopClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl ShopClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Resume a previously saved session
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub async fn health(&self) -> ClientResult<Value> {
        self.send(self.http.get(self.url("/health"))).await
    }

    /// Log in and keep the resulting session for later calls
    pub async fn login(&mut self, login: &str, password: &str) -> ClientResult<&Session> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(DomainError::validation("Login and password are required").into());
        }

        let response: LoginResponse = self
            .send(
                self.http
                    .post(self.url("/auth/login"))
                    .json(&json!({ "login": login, "password": password })),
            )
            .await?;

        info!("Logged in as {}", response.user.login);
        let session = self.session.insert(Session {
            user: response.user,
            access_token: response.access_token,
        });
        Ok(&*session)
    }

    /// Revoke the token on the server and drop the local session
    pub async fn logout(&mut self) -> ClientResult<()> {
        let _: Value = self.call(Method::POST, "/auth/logout", None).await?;
        if let Some(session) = self.session.take() {
            info!("Logged out {}", session.user.login);
        }
        Ok(())
    }

    pub async fn me(&self) -> ClientResult<User> {
        self.call(Method::GET, "/auth/me", None).await
    }

    // Users

    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.call(Method::GET, "/users", None).await
    }

    pub async fn create_user(
        &self,
        login: &str,
        password: &str,
        role: &str,
        full_name: &str,
    ) -> ClientResult<User> {
        let user = NewUser::new(login, password, role, full_name)?;
        let body = json!({
            "login": user.login,
            "password": user.password,
            "role": user.role,
            "full_name": user.full_name,
        });
        self.call(Method::POST, "/users", Some(body)).await
    }

    pub async fn delete_user(&self, id: i64) -> ClientResult<()> {
        let _: Value = self
            .call(Method::DELETE, "/users", Some(json!({ "id": id })))
            .await?;
        Ok(())
    }

    // Materials

    pub async fn list_materials(&self) -> ClientResult<Vec<MaterialEntry>> {
        self.call(Method::GET, "/materials", None).await
    }

    pub async fn create_material(&self, draft: MaterialDraft) -> ClientResult<Material> {
        let draft = draft.validated()?;
        self.call(Method::POST, "/materials", Some(encode(&draft)?))
            .await
    }

    pub async fn replace_material(&self, id: i64, draft: MaterialDraft) -> ClientResult<Material> {
        let draft = draft.validated()?;
        let body = encode(ReplaceMaterial { id, draft: &draft })?;
        self.call(Method::PUT, "/materials", Some(body)).await
    }

    /// Signed stock change; the server rejects changes that would go negative
    pub async fn change_stock(&self, id: i64, quantity_change: i32) -> ClientResult<Material> {
        if quantity_change == 0 {
            return Err(DomainError::validation("Quantity change must not be zero").into());
        }
        self.call(
            Method::PUT,
            "/materials",
            Some(json!({ "id": id, "quantity_change": quantity_change })),
        )
        .await
    }

    pub async fn delete_material(&self, id: i64) -> ClientResult<()> {
        let path = format!("/materials?id={}", id);
        let _: Value = self.call(Method::DELETE, &path, None).await?;
        Ok(())
    }

    pub async fn movements(&self, material_id: i64) -> ClientResult<Vec<InventoryMovement>> {
        let path = format!("/materials/{}/movements", material_id);
        self.call(Method::GET, &path, None).await
    }

    // Sections

    pub async fn list_sections(&self) -> ClientResult<Vec<Section>> {
        self.call(Method::GET, "/sections", None).await
    }

    pub async fn create_section(&self, name: &str, description: &str) -> ClientResult<Section> {
        let section = NewSection::new(name, description)?;
        let body = json!({ "name": section.name, "description": section.description });
        self.call(Method::POST, "/sections", Some(body)).await
    }

    pub async fn delete_section(&self, id: i64) -> ClientResult<()> {
        let _: Value = self
            .call(Method::DELETE, "/sections", Some(json!({ "id": id })))
            .await?;
        Ok(())
    }

    // Orders

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> ClientResult<Vec<Order>> {
        let path = match status {
            Some(status) => format!("/orders?status={}", status),
            None => "/orders".to_string(),
        };
        self.call(Method::GET, &path, None).await
    }

    pub async fn order_summary(&self) -> ClientResult<OrderSummary> {
        self.call(Method::GET, "/orders/summary", None).await
    }

    /// Place an order; the server records the caller as its creator
    pub async fn create_order(
        &self,
        order_number: &str,
        material: &str,
        quantity: i32,
        size: &str,
        color: &str,
    ) -> ClientResult<Order> {
        let order = NewOrder::new(order_number, material, quantity, size, color, None)?;
        let body = json!({
            "order_number": order.order_number,
            "material": order.material,
            "quantity": order.quantity,
            "size": order.size,
            "color": order.color,
        });
        self.call(Method::POST, "/orders", Some(body)).await
    }

    pub async fn record_progress(&self, id: i64, delta: i32) -> ClientResult<Order> {
        if delta <= 0 {
            return Err(DomainError::validation("Completed amount must be positive").into());
        }
        self.call(
            Method::PUT,
            "/orders",
            Some(json!({ "id": id, "completed_delta": delta })),
        )
        .await
    }

    pub async fn record_progress_total(&self, id: i64, total: i32) -> ClientResult<Order> {
        if total <= 0 {
            return Err(DomainError::validation("Completed quantity must be positive").into());
        }
        self.call(
            Method::PUT,
            "/orders",
            Some(json!({ "id": id, "completed_quantity": total })),
        )
        .await
    }

    pub async fn mark_shipped(&self, id: i64) -> ClientResult<Order> {
        self.set_status(id, OrderStatus::Shipped).await
    }

    pub async fn set_status(&self, id: i64, status: OrderStatus) -> ClientResult<Order> {
        self.call(
            Method::PUT,
            "/orders",
            Some(json!({ "id": id, "status": status })),
        )
        .await
    }

    pub async fn delete_order(&self, id: i64) -> ClientResult<()> {
        let path = format!("/orders?id={}", id);
        let _: Value = self.call(Method::DELETE, &path, None).await?;
        Ok(())
    }

    // Schedule

    pub async fn month_schedule(&self, year: i32, month: u32) -> ClientResult<MonthView> {
        let month = YearMonth::new(year, month)?;
        let path = format!("/schedule?year={}&month={}", month.year(), month.month());
        self.call(Method::GET, &path, None).await
    }

    pub async fn upsert_hours(
        &self,
        user_id: i64,
        work_date: NaiveDate,
        hours: f64,
    ) -> ClientResult<ScheduleRecord> {
        let entry = ScheduleEntry::new(user_id, work_date, hours)?;
        let body = json!({
            "user_id": entry.user_id,
            "work_date": entry.work_date,
            "hours": entry.hours,
        });
        self.call(Method::POST, "/schedule", Some(body)).await
    }

    pub async fn edit_hours(&self, record_id: i64, hours: f64) -> ClientResult<ScheduleRecord> {
        let hours = WorkHours::try_from(hours)?;
        self.call(
            Method::PUT,
            "/schedule",
            Some(json!({ "id": record_id, "hours": hours })),
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticated request with an optional JSON body
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let session = self.session.as_ref().ok_or(ClientError::NotAuthenticated)?;
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&session.access_token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            debug!("{} {}", status, response.url().path());
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        warn!("Request to {} failed with {}: {}", path, status, message);

        Err(ClientError::RemoteFailure { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn unencodable_body_is_not_a_session_error() {
        let mut body = BTreeMap::new();
        body.insert((1, 2), "tuple keys have no JSON form");
        assert!(matches!(encode(&body), Err(ClientError::Encoding(_))));
    }

    #[test]
    fn material_bodies_flatten_the_draft() {
        let draft = MaterialDraft {
            name: "Plywood".to_string(),
            quantity: 4,
            ..Default::default()
        };
        let body = encode(ReplaceMaterial { id: 9, draft: &draft }).unwrap();
        assert_eq!(body["id"], 9);
        assert_eq!(body["name"], "Plywood");
        assert_eq!(body["quantity"], 4);
    }
}
