//! Integration tests for the infrastructure components
//!
//! These need a reachable PostgreSQL and Redis (see `DATABASE_URL` and
//! `REDIS_URL`) and are ignored by default.

use common::{
    cache::{RedisConfig, RedisPool, RevocationList},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_migrations_create_schema() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;
    // Running twice must be a no-op
    run_migrations(&pool).await?;

    for table in [
        "users",
        "material_sections",
        "materials",
        "material_inventory",
        "orders",
        "schedule",
    ] {
        let row = sqlx::query("SELECT to_regclass($1) IS NOT NULL AS present")
            .bind(table)
            .fetch_one(&pool)
            .await?;
        let present: bool = row.get("present");
        assert!(present, "table {} missing after migrations", table);
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_negative_stock_rejected_by_schema() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;

    let result = sqlx::query("INSERT INTO materials (name, quantity) VALUES ('Bolt', -1)")
        .execute(&pool)
        .await;
    assert!(result.is_err(), "CHECK (quantity >= 0) was not enforced");

    Ok(())
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    assert!(redis_pool.health_check().await?, "Redis health check failed");

    let revocations = RevocationList::Redis(redis_pool.clone());
    revocations.revoke("integration-jti", 10).await?;
    assert!(revocations.is_revoked("integration-jti").await?);

    redis_pool
        .delete(&redis_pool.key(&["revoked", "integration-jti"]))
        .await?;
    assert!(!revocations.is_revoked("integration-jti").await?);

    Ok(())
}
