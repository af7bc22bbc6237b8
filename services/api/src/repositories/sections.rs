//! Section repository

use async_trait::async_trait;
use domain::{DomainError, NewSection, Section};
use sqlx::{PgPool, Row};

use super::{SectionStore, StoreResult};

#[derive(Clone)]
pub struct SectionRepository {
    pool: PgPool,
}

impl SectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionStore for SectionRepository {
    async fn list(&self) -> StoreResult<Vec<Section>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, created_at
            FROM material_sections
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Section {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn insert(&self, section: &NewSection) -> StoreResult<Section> {
        let row = sqlx::query(
            r#"
            INSERT INTO material_sections (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&section.name)
        .bind(&section.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(Section {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            created_at: row.get("created_at"),
        })
    }

    /// Materials keep their `section_id`; it simply stops resolving
    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM material_sections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("section", id).into());
        }
        Ok(())
    }
}
