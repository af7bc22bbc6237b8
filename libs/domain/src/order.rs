//! Production orders and their lifecycle
//!
//! An order moves `created -> in_progress -> completed -> shipped`. Shipped is
//! terminal. Progress is recorded as completed units; how progress feeds back
//! into the status is decided by a [`ProgressPolicy`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, required};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    InProgress,
    Completed,
    Shipped,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Created,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Shipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Shipped => "shipped",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation(format!("Unknown order status: {}", s)))
    }
}

/// How recorded progress affects the order status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPolicy {
    /// Full progress completes the order; first progress starts it
    #[default]
    AutoAdvance,
    /// Progress only moves the counter; status changes are manual
    QuantityOnly,
}

/// A progress report from the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Units finished since the last report
    Delta(i32),
    /// New absolute completed count
    Total(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    /// Material name; not checked against the inventory
    pub material: String,
    pub quantity: i32,
    pub size: String,
    pub color: String,
    pub status: OrderStatus,
    pub completed_quantity: i32,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Units still to be produced
    pub fn remaining(&self) -> i32 {
        self.quantity - self.completed_quantity
    }

    /// Record finished units and return the applied increment.
    pub fn record_progress(
        &mut self,
        update: ProgressUpdate,
        policy: ProgressPolicy,
    ) -> DomainResult<i32> {
        if self.status == OrderStatus::Shipped {
            return Err(DomainError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::InProgress,
            });
        }

        let delta = match update {
            ProgressUpdate::Delta(delta) => {
                if delta <= 0 {
                    return Err(DomainError::validation(
                        "Completed quantity increment must be positive",
                    ));
                }
                delta
            }
            ProgressUpdate::Total(total) => {
                if total <= self.completed_quantity {
                    return Err(DomainError::validation(format!(
                        "Completed quantity must exceed the current value {}",
                        self.completed_quantity
                    )));
                }
                total - self.completed_quantity
            }
        };

        if delta > self.remaining() {
            return Err(DomainError::validation(format!(
                "Completed quantity cannot exceed the ordered {} ({} remaining)",
                self.quantity,
                self.remaining()
            )));
        }
        let next = self.completed_quantity + delta;

        self.completed_quantity = next;

        if policy == ProgressPolicy::AutoAdvance {
            if next == self.quantity {
                self.status = OrderStatus::Completed;
            } else if self.status == OrderStatus::Created {
                self.status = OrderStatus::InProgress;
            }
        }

        Ok(delta)
    }

    pub fn mark_shipped(&mut self) -> DomainResult<()> {
        if self.status != OrderStatus::Completed {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Shipped,
            });
        }
        self.status = OrderStatus::Shipped;
        Ok(())
    }

    /// Manual status change. Shipping still requires a completed order.
    pub fn set_status(&mut self, target: OrderStatus) -> DomainResult<()> {
        if self.status == OrderStatus::Shipped {
            return Err(DomainError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: target,
            });
        }
        if target == OrderStatus::Shipped {
            return self.mark_shipped();
        }
        self.status = target;
        Ok(())
    }
}

/// Validated input for a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub material: String,
    pub quantity: i32,
    pub size: String,
    pub color: String,
    pub created_by: Option<i64>,
}

impl NewOrder {
    pub fn new(
        order_number: &str,
        material: &str,
        quantity: i32,
        size: &str,
        color: &str,
        created_by: Option<i64>,
    ) -> DomainResult<Self> {
        let order_number = required("Order number", order_number)?;
        let material = required("Material", material)?;
        if quantity <= 0 {
            return Err(DomainError::validation("Quantity must be positive"));
        }

        Ok(Self {
            order_number,
            material,
            quantity,
            size: size.trim().to_string(),
            color: color.trim().to_string(),
            created_by,
        })
    }
}

/// Order counts per status, as shown on the dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub all: usize,
    pub created: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub shipped: usize,
}

impl OrderSummary {
    pub fn from_orders(orders: &[Order]) -> Self {
        orders
            .iter()
            .fold(OrderSummary::default(), |mut summary, order| {
                summary.all += 1;
                match order.status {
                    OrderStatus::Created => summary.created += 1,
                    OrderStatus::InProgress => summary.in_progress += 1,
                    OrderStatus::Completed => summary.completed += 1,
                    OrderStatus::Shipped => summary.shipped += 1,
                }
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(quantity: i32) -> Order {
        let now = Utc::now();
        Order {
            id: 1,
            order_number: "A-100".to_string(),
            material: "Steel sheet".to_string(),
            quantity,
            size: String::new(),
            color: String::new(),
            status: OrderStatus::Created,
            completed_quantity: 0,
            created_by: Some(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn new_order_validation() {
        assert!(NewOrder::new("", "Steel", 5, "", "", None).is_err());
        assert!(NewOrder::new("A-1", " ", 5, "", "", None).is_err());
        assert!(NewOrder::new("A-1", "Steel", 0, "", "", None).is_err());
        assert!(NewOrder::new("A-1", "Steel", -3, "", "", None).is_err());
        assert_eq!(
            NewOrder::new(" A-1 ", "Steel", 5, "", "", None)
                .unwrap()
                .order_number,
            "A-1"
        );
    }

    #[test]
    fn progress_past_quantity_is_rejected() {
        let mut o = order(50);
        o.record_progress(ProgressUpdate::Delta(30), ProgressPolicy::QuantityOnly)
            .unwrap();
        let err = o
            .record_progress(ProgressUpdate::Delta(25), ProgressPolicy::QuantityOnly)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().contains("20 remaining"));
        assert_eq!(o.completed_quantity, 30);
        assert_eq!(o.remaining(), 20);

        o.record_progress(ProgressUpdate::Delta(20), ProgressPolicy::QuantityOnly)
            .unwrap();
        assert_eq!(o.remaining(), 0);
        assert!(
            o.record_progress(ProgressUpdate::Delta(i32::MAX), ProgressPolicy::QuantityOnly)
                .is_err()
        );
    }

    #[test]
    fn non_positive_delta_is_rejected() {
        let mut o = order(10);
        for delta in [0, -1] {
            assert!(matches!(
                o.record_progress(ProgressUpdate::Delta(delta), ProgressPolicy::AutoAdvance),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn manual_lifecycle_under_quantity_only() {
        let mut o = order(50);
        o.record_progress(ProgressUpdate::Delta(30), ProgressPolicy::QuantityOnly)
            .unwrap();
        o.record_progress(ProgressUpdate::Delta(20), ProgressPolicy::QuantityOnly)
            .unwrap();
        assert_eq!(o.completed_quantity, 50);
        assert_eq!(o.status, OrderStatus::Created);

        assert!(matches!(
            o.mark_shipped(),
            Err(DomainError::InvalidTransition { .. })
        ));
        o.set_status(OrderStatus::Completed).unwrap();
        o.mark_shipped().unwrap();
        assert_eq!(o.status, OrderStatus::Shipped);
    }

    #[test]
    fn auto_advance_starts_and_completes() {
        let mut o = order(50);
        o.record_progress(ProgressUpdate::Delta(10), ProgressPolicy::AutoAdvance)
            .unwrap();
        assert_eq!(o.status, OrderStatus::InProgress);
        o.record_progress(ProgressUpdate::Delta(40), ProgressPolicy::AutoAdvance)
            .unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        o.mark_shipped().unwrap();
    }

    #[test]
    fn auto_advance_never_demotes_completed() {
        let mut o = order(50);
        o.set_status(OrderStatus::Completed).unwrap();
        o.record_progress(ProgressUpdate::Delta(5), ProgressPolicy::AutoAdvance)
            .unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
    }

    #[test]
    fn shipped_is_terminal() {
        let mut o = order(5);
        o.record_progress(ProgressUpdate::Delta(5), ProgressPolicy::AutoAdvance)
            .unwrap();
        o.mark_shipped().unwrap();

        assert!(matches!(
            o.record_progress(ProgressUpdate::Delta(1), ProgressPolicy::AutoAdvance),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(o.set_status(OrderStatus::InProgress).is_err());
        assert!(o.mark_shipped().is_err());
    }

    #[test]
    fn total_is_converted_to_delta() {
        let mut o = order(20);
        assert_eq!(
            o.record_progress(ProgressUpdate::Total(8), ProgressPolicy::AutoAdvance),
            Ok(8)
        );
        assert_eq!(
            o.record_progress(ProgressUpdate::Total(12), ProgressPolicy::AutoAdvance),
            Ok(4)
        );
        assert_eq!(o.completed_quantity, 12);
    }

    #[test]
    fn repeated_total_is_rejected() {
        let mut o = order(20);
        o.record_progress(ProgressUpdate::Total(8), ProgressPolicy::AutoAdvance)
            .unwrap();
        assert!(matches!(
            o.record_progress(ProgressUpdate::Total(8), ProgressPolicy::AutoAdvance),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn status_parsing_uses_snake_case() {
        assert_eq!(
            "in_progress".parse::<OrderStatus>().unwrap(),
            OrderStatus::InProgress
        );
        assert!("done".parse::<OrderStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn summary_counts_each_status() {
        let mut orders = vec![order(1), order(1), order(2)];
        orders[1].status = OrderStatus::Shipped;
        orders[2].status = OrderStatus::InProgress;

        let summary = OrderSummary::from_orders(&orders);
        assert_eq!(summary.all, 3);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.shipped, 1);
    }
}
