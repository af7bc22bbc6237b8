//! User repository for database operations

use async_trait::async_trait;
use common::error::is_unique_violation;
use domain::{DomainError, NewUser, User};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{StoreResult, UserCredentials, UserStore};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        login: row.get("login"),
        role: role.parse()?,
        full_name: row.get("full_name"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl UserStore for UserRepository {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, login, role, full_name, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn find(&self, id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, login, role, full_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_credentials(&self, login: &str) -> StoreResult<Option<UserCredentials>> {
        let row = sqlx::query(
            r#"
            SELECT id, login, role, full_name, created_at, password_hash
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(UserCredentials {
                user: user_from_row(&row)?,
                password_hash: row.get("password_hash"),
            })),
            None => Ok(None),
        }
    }

    async fn insert(&self, user: &NewUser, password_hash: &str) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (login, password_hash, role, full_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, login, role, full_name, created_at
            "#,
        )
        .bind(&user.login)
        .bind(password_hash)
        .bind(user.role.as_str())
        .bind(&user.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict(format!("Login '{}' is already taken", user.login)).into()
            } else {
                super::StoreError::from(e)
            }
        })?;

        user_from_row(&row)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user", id).into());
        }
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
