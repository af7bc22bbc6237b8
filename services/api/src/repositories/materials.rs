//! Material repository and inventory ledger

use async_trait::async_trait;
use domain::{DomainError, InventoryMovement, Material, MaterialDraft};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{MaterialStore, StoreResult};

const MATERIAL_COLUMNS: &str = "id, name, size, color, quantity, material_type, image_url, \
                                section_id, created_at, updated_at";

#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn material_from_row(row: &PgRow) -> Material {
    Material {
        id: row.get("id"),
        name: row.get("name"),
        size: row.get("size"),
        color: row.get("color"),
        quantity: row.get("quantity"),
        material_type: row.get("material_type"),
        image_url: row.get("image_url"),
        section_id: row.get("section_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl MaterialStore for MaterialRepository {
    async fn list(&self) -> StoreResult<Vec<Material>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM materials ORDER BY created_at DESC, id DESC",
            MATERIAL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(material_from_row).collect())
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Material>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM materials WHERE id = $1",
            MATERIAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(material_from_row))
    }

    async fn insert(&self, draft: &MaterialDraft) -> StoreResult<Material> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO materials (name, size, color, quantity, material_type, image_url, section_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.size)
        .bind(&draft.color)
        .bind(draft.quantity)
        .bind(&draft.material_type)
        .bind(&draft.image_url)
        .bind(draft.section_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(material_from_row(&row))
    }

    async fn replace(&self, id: i64, draft: &MaterialDraft) -> StoreResult<Material> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE materials
            SET name = $2, size = $3, color = $4, quantity = $5, material_type = $6,
                image_url = $7, section_id = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.size)
        .bind(&draft.color)
        .bind(draft.quantity)
        .bind(&draft.material_type)
        .bind(&draft.image_url)
        .bind(draft.section_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DomainError::not_found("material", id))?;

        Ok(material_from_row(&row))
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("material", id).into());
        }
        Ok(())
    }

    async fn apply_delta(&self, id: i64, delta: i32, actor: Option<i64>) -> StoreResult<Material> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM materials WHERE id = $1 FOR UPDATE",
            MATERIAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::not_found("material", id))?;

        // Rejections drop `tx`, which rolls back and releases the lock
        let mut material = material_from_row(&row);
        material.apply_delta(delta)?;

        let row = sqlx::query(&format!(
            "UPDATE materials SET quantity = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            MATERIAL_COLUMNS
        ))
        .bind(id)
        .bind(material.quantity)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO material_inventory (material_id, quantity_change, updated_by)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(material_from_row(&row))
    }

    async fn movements(&self, material_id: i64) -> StoreResult<Vec<InventoryMovement>> {
        if self.find(material_id).await?.is_none() {
            return Err(DomainError::not_found("material", material_id).into());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, material_id, quantity_change, updated_by, created_at
            FROM material_inventory
            WHERE material_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(material_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| InventoryMovement {
                id: row.get("id"),
                material_id: row.get("material_id"),
                quantity_change: row.get("quantity_change"),
                updated_by: row.get("updated_by"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
