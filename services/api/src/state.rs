//! Application state shared across handlers

use common::cache::RevocationList;

use crate::{
    config::ApiConfig,
    jwt::JwtService,
    rate_limiter::RateLimiter,
    repositories::Stores,
    services::{DirectoryService, InventoryService, OrderService, ScheduleService},
};

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub inventory: InventoryService,
    pub schedule: ScheduleService,
    pub directory: DirectoryService,
    pub jwt: JwtService,
    pub revocations: RevocationList,
    pub login_limiter: RateLimiter,
}

impl AppState {
    pub fn new(stores: Stores, config: &ApiConfig, revocations: RevocationList) -> Self {
        Self {
            orders: OrderService::new(stores.orders, config.orders.progress_policy),
            inventory: InventoryService::new(stores.materials),
            schedule: ScheduleService::new(stores.schedule),
            directory: DirectoryService::new(stores.users, stores.sections),
            jwt: JwtService::new(&config.jwt),
            revocations,
            login_limiter: RateLimiter::new(config.login_throttle.clone()),
        }
    }
}
