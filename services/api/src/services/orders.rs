//! Order lifecycle service

use std::sync::Arc;

use domain::{NewOrder, Order, OrderStatus, OrderSummary, ProgressPolicy, ProgressUpdate};
use tracing::info;

use super::log_failure;
use crate::repositories::{OrderStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    policy: ProgressPolicy,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, policy: ProgressPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ProgressPolicy {
        self.policy
    }

    pub async fn create_order(
        &self,
        order_number: &str,
        material: &str,
        quantity: i32,
        size: &str,
        color: &str,
        created_by: Option<i64>,
    ) -> StoreResult<Order> {
        let new_order = NewOrder::new(order_number, material, quantity, size, color, created_by)
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("Order creation", e))?;

        let order = self
            .store
            .insert(&new_order)
            .await
            .inspect_err(|e| log_failure("Order creation", e))?;

        info!(
            "Created order {} ({} x {}) as #{}",
            order.order_number, order.quantity, order.material, order.id
        );
        Ok(order)
    }

    /// Add `delta` finished units to an order
    pub async fn record_progress(&self, order_id: i64, delta: i32) -> StoreResult<Order> {
        self.progress(order_id, ProgressUpdate::Delta(delta)).await
    }

    /// Set the finished count to `total`; must exceed the current count
    pub async fn record_progress_total(&self, order_id: i64, total: i32) -> StoreResult<Order> {
        self.progress(order_id, ProgressUpdate::Total(total)).await
    }

    async fn progress(&self, order_id: i64, update: ProgressUpdate) -> StoreResult<Order> {
        let order = self
            .store
            .record_progress(order_id, update, self.policy)
            .await
            .inspect_err(|e| log_failure("Order progress", e))?;

        info!(
            "Order {} progress {}/{} ({})",
            order.id, order.completed_quantity, order.quantity, order.status
        );
        Ok(order)
    }

    pub async fn mark_shipped(&self, order_id: i64) -> StoreResult<Order> {
        self.set_status(order_id, OrderStatus::Shipped).await
    }

    pub async fn set_status(&self, order_id: i64, status: OrderStatus) -> StoreResult<Order> {
        let order = self
            .store
            .set_status(order_id, status)
            .await
            .inspect_err(|e| log_failure("Order status change", e))?;

        info!("Order {} is now {}", order.id, order.status);
        Ok(order)
    }

    /// Orders can be deleted in any state
    pub async fn delete_order(&self, order_id: i64) -> StoreResult<()> {
        self.store
            .delete(order_id)
            .await
            .inspect_err(|e| log_failure("Order deletion", e))?;

        info!("Deleted order {}", order_id);
        Ok(())
    }

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        self.store
            .list(status)
            .await
            .inspect_err(|e| log_failure("Order listing", e))
    }

    pub async fn summary(&self) -> StoreResult<OrderSummary> {
        let orders = self.list_orders(None).await?;
        Ok(OrderSummary::from_orders(&orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;
    use domain::DomainError;

    fn service(policy: ProgressPolicy) -> OrderService {
        OrderService::new(Arc::new(MemoryStore::default()), policy)
    }

    async fn order(service: &OrderService, quantity: i32) -> Order {
        service
            .create_order("A-100", "Steel sheet", quantity, "2x1", "grey", Some(1))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creation_validates_input() {
        let service = service(ProgressPolicy::AutoAdvance);
        let err = service
            .create_order("A-1", "Steel", 0, "", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
        assert!(service.list_orders(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn literal_manual_lifecycle() {
        let service = service(ProgressPolicy::QuantityOnly);
        let o = order(&service, 50).await;

        service.record_progress(o.id, 30).await.unwrap();
        assert!(service.record_progress(o.id, 25).await.is_err());
        let o = service.record_progress(o.id, 20).await.unwrap();
        assert_eq!(o.completed_quantity, 50);
        assert_eq!(o.status, OrderStatus::Created);

        assert!(matches!(
            service.mark_shipped(o.id).await,
            Err(StoreError::Domain(DomainError::InvalidTransition { .. }))
        ));
        service
            .set_status(o.id, OrderStatus::Completed)
            .await
            .unwrap();
        let shipped = service.mark_shipped(o.id).await.unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn auto_advance_lifecycle() {
        let service = service(ProgressPolicy::AutoAdvance);
        let o = order(&service, 10).await;

        let o = service.record_progress(o.id, 4).await.unwrap();
        assert_eq!(o.status, OrderStatus::InProgress);
        let o = service.record_progress_total(o.id, 10).await.unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        service.mark_shipped(o.id).await.unwrap();
        assert!(service.record_progress(o.id, 1).await.is_err());
    }

    #[tokio::test]
    async fn racing_totals_cannot_both_succeed() {
        let service = service(ProgressPolicy::AutoAdvance);
        let o = order(&service, 10).await;

        let (a, b) = tokio::join!(
            service.record_progress_total(o.id, 6),
            service.record_progress_total(o.id, 6)
        );
        assert!(a.is_ok() != b.is_ok());
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let service = service(ProgressPolicy::AutoAdvance);
        assert!(matches!(
            service.delete_order(404).await,
            Err(StoreError::Domain(DomainError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn summary_counts_statuses() {
        let service = service(ProgressPolicy::AutoAdvance);
        let a = order(&service, 2).await;
        order(&service, 2).await;
        service.record_progress(a.id, 2).await.unwrap();

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.all, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.created, 1);
    }
}
