//! Typed client for the shop floor API
//!
//! Holds the logged-in [`Session`], routes it to a role [`Dashboard`] and
//! wraps every endpoint in a validating method on [`ShopClient`].

pub mod client;
pub mod dashboard;
pub mod error;
pub mod refresh;
pub mod session;

pub use client::{MaterialEntry, MonthView, ShopClient};
pub use dashboard::{Dashboard, Tab};
pub use error::{ClientError, ClientResult};
pub use refresh::{DEFAULT_REFRESH_PERIOD, spawn_order_refresh};
pub use session::Session;
