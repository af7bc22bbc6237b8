//! Order repository
//!
//! Progress and status changes lock the order row, run the lifecycle rule on
//! the locked copy and write the result back in the same transaction.

use async_trait::async_trait;
use domain::{
    DomainError, NewOrder, Order, OrderStatus, ProgressPolicy, ProgressUpdate,
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use super::{OrderStore, StoreResult};

const ORDER_COLUMNS: &str = "id, order_number, material, quantity, size, color, status, \
                             completed_quantity, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock(&self, tx: &mut Transaction<'_, Postgres>, id: i64) -> StoreResult<Order> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE id = $1 FOR UPDATE",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DomainError::not_found("order", id))?;

        order_from_row(&row)
    }

    async fn write_back(
        &self,
        mut tx: Transaction<'_, Postgres>,
        order: &Order,
    ) -> StoreResult<Order> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET status = $2, completed_quantity = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.completed_quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        order_from_row(&row)
    }
}

fn order_from_row(row: &PgRow) -> StoreResult<Order> {
    let status: String = row.get("status");
    Ok(Order {
        id: row.get("id"),
        order_number: row.get("order_number"),
        material: row.get("material"),
        quantity: row.get("quantity"),
        size: row.get("size"),
        color: row.get("color"),
        status: status.parse()?,
        completed_quantity: row.get("completed_quantity"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM orders
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn insert(&self, order: &NewOrder) -> StoreResult<Order> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (order_number, material, quantity, size, color, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&order.order_number)
        .bind(&order.material)
        .bind(order.quantity)
        .bind(&order.size)
        .bind(&order.color)
        .bind(order.created_by)
        .fetch_one(&self.pool)
        .await?;

        order_from_row(&row)
    }

    async fn record_progress(
        &self,
        id: i64,
        update: ProgressUpdate,
        policy: ProgressPolicy,
    ) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;
        let mut order = self.lock(&mut tx, id).await?;
        order.record_progress(update, policy)?;
        self.write_back(tx, &order).await
    }

    async fn set_status(&self, id: i64, status: OrderStatus) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;
        let mut order = self.lock(&mut tx, id).await?;
        order.set_status(status)?;
        self.write_back(tx, &order).await
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("order", id).into());
        }
        Ok(())
    }
}
