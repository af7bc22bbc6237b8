//! Background polling of the order list

use std::time::Duration;

use domain::Order;
use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{debug, warn};

use crate::client::ShopClient;

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(10);

/// Poll `GET /orders` every `period` and publish the latest list.
///
/// A failed poll keeps the previous list. The task ends once every receiver
/// has been dropped.
pub fn spawn_order_refresh(
    client: ShopClient,
    period: Duration,
) -> (watch::Receiver<Vec<Order>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(Vec::new());

    let handle = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            match client.list_orders(None).await {
                Ok(orders) => {
                    debug!("Refreshed {} orders", orders.len());
                    if tx.send(orders).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Order refresh failed: {}", e),
            }
        }
        debug!("Order refresh stopped");
    });

    (rx, handle)
}
