//! Domain model for the shop floor
//!
//! Typed records and the rules that govern them: the order lifecycle, the
//! inventory ledger, the work-hours schedule and the user/section directory.
//! Nothing in this crate performs I/O; stores and transports live in the
//! `api` and `client` crates.

pub mod error;
pub mod material;
pub mod order;
pub mod schedule;
pub mod section;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use material::{InventoryMovement, Material, MaterialDraft};
pub use order::{NewOrder, Order, OrderStatus, OrderSummary, ProgressPolicy, ProgressUpdate};
pub use schedule::{
    MonthSchedule, ScheduleEntry, ScheduleRecord, ScheduleUser, WorkHours, YearMonth,
};
pub use section::{NO_SECTION, NewSection, Section, SectionLookup};
pub use user::{NewUser, Role, User};
