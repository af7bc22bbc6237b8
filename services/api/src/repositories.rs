//! Persistence traits and their implementations
//!
//! Every mutation that has to honor an invariant (non-negative stock, bounded
//! order progress) is a single store call. The PostgreSQL stores lock the row
//! for the duration of a transaction; the memory store holds one mutex over
//! all of its state. Either way the domain rule runs inside the critical
//! section, so concurrent callers see each other's effects.

use std::sync::Arc;

use async_trait::async_trait;
use common::error::DatabaseError;
use domain::{
    DomainError, InventoryMovement, Material, MaterialDraft, NewOrder, NewSection, NewUser, Order,
    OrderStatus, ProgressPolicy, ProgressUpdate, ScheduleEntry, ScheduleRecord, ScheduleUser,
    Section, User, WorkHours, YearMonth,
};
use sqlx::PgPool;
use thiserror::Error;

pub mod materials;
pub mod memory;
pub mod orders;
pub mod schedule;
pub mod sections;
pub mod users;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Failure outside the database, e.g. password hashing
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Query(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A user row including the secret needed to check a login
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn find(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_credentials(&self, login: &str) -> StoreResult<Option<UserCredentials>>;
    /// Fails with `Conflict` when the login is taken
    async fn insert(&self, user: &NewUser, password_hash: &str) -> StoreResult<User>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait MaterialStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Material>>;
    async fn find(&self, id: i64) -> StoreResult<Option<Material>>;
    async fn insert(&self, draft: &MaterialDraft) -> StoreResult<Material>;
    async fn replace(&self, id: i64, draft: &MaterialDraft) -> StoreResult<Material>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
    /// Apply a signed delta and record the movement atomically
    async fn apply_delta(&self, id: i64, delta: i32, actor: Option<i64>) -> StoreResult<Material>;
    async fn movements(&self, material_id: i64) -> StoreResult<Vec<InventoryMovement>>;
}

#[async_trait]
pub trait SectionStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Section>>;
    async fn insert(&self, section: &NewSection) -> StoreResult<Section>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Newest first, optionally restricted to one status
    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>>;
    async fn find(&self, id: i64) -> StoreResult<Option<Order>>;
    async fn insert(&self, order: &NewOrder) -> StoreResult<Order>;
    async fn record_progress(
        &self,
        id: i64,
        update: ProgressUpdate,
        policy: ProgressPolicy,
    ) -> StoreResult<Order>;
    async fn set_status(&self, id: i64, status: OrderStatus) -> StoreResult<Order>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Records of the month ordered by date, then employee name
    async fn month(&self, month: &YearMonth) -> StoreResult<Vec<ScheduleRecord>>;
    /// Managers and workers ordered by name
    async fn roster(&self) -> StoreResult<Vec<ScheduleUser>>;
    async fn upsert(&self, entry: &ScheduleEntry) -> StoreResult<ScheduleRecord>;
    async fn update_hours(&self, id: i64, hours: WorkHours) -> StoreResult<ScheduleRecord>;
}

/// The full set of stores backing one service instance
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub materials: Arc<dyn MaterialStore>,
    pub sections: Arc<dyn SectionStore>,
    pub orders: Arc<dyn OrderStore>,
    pub schedule: Arc<dyn ScheduleStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(users::UserRepository::new(pool.clone())),
            materials: Arc::new(materials::MaterialRepository::new(pool.clone())),
            sections: Arc::new(sections::SectionRepository::new(pool.clone())),
            orders: Arc::new(orders::OrderRepository::new(pool.clone())),
            schedule: Arc::new(schedule::ScheduleRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self {
            users: Arc::new(store.clone()),
            materials: Arc::new(store.clone()),
            sections: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            schedule: Arc::new(store),
        }
    }
}
