//! Application services
//!
//! Each service owns the stores it needs, validates input with the domain
//! constructors and logs the outcome of every mutation.

use tracing::{error, warn};

use crate::repositories::StoreError;

pub mod directory;
pub mod inventory;
pub mod orders;
pub mod schedule;

pub use directory::DirectoryService;
pub use inventory::InventoryService;
pub use orders::OrderService;
pub use schedule::ScheduleService;

/// Rule rejections are expected traffic; store failures are not
pub(crate) fn log_failure(action: &str, err: &StoreError) {
    match err {
        StoreError::Domain(e) => warn!("{} rejected: {}", action, e),
        StoreError::Database(e) => error!("{} failed: {}", action, e),
        StoreError::Internal(e) => error!("{} failed: {:#}", action, e),
    }
}
