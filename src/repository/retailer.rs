//! Retailer repository

use crate::domain::{Retailer, RetailerKind};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

/// Persistence record for a new retailer; the secret is already hashed.
#[derive(Debug, Clone)]
pub struct NewRetailer {
    pub name: String,
    pub kind: RetailerKind,
    pub secret_hash: String,
}

/// Persistence record for a retailer update. `secret_hash` is `None` when the
/// secret is not being rotated.
#[derive(Debug, Clone)]
pub struct RetailerChanges {
    pub name: String,
    pub secret_hash: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RetailerRepository: Send + Sync {
    async fn create(&self, input: &NewRetailer) -> Result<Retailer>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Retailer>>;
    async fn find_by_kind(&self, kind: RetailerKind) -> Result<Option<Retailer>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Retailer>>;
    async fn list(&self) -> Result<Vec<Retailer>>;
    async fn update(&self, id: i64, changes: &RetailerChanges) -> Result<Retailer>;
    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct RetailerRepositoryImpl {
    pool: MySqlPool,
}

impl RetailerRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RetailerRepository for RetailerRepositoryImpl {
    async fn create(&self, input: &NewRetailer) -> Result<Retailer> {
        let result = sqlx::query(
            r#"
            INSERT INTO retailers (name, kind, secret_hash, created_at, updated_at)
            VALUES (?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&input.name)
        .bind(input.kind)
        .bind(&input.secret_hash)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create retailer")))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Retailer>> {
        let retailer = sqlx::query_as::<_, Retailer>(
            r#"
            SELECT id, name, kind, secret_hash, created_at, updated_at
            FROM retailers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(retailer)
    }

    async fn find_by_kind(&self, kind: RetailerKind) -> Result<Option<Retailer>> {
        // The kind column carries a unique key, so at most one row can match.
        let retailer = sqlx::query_as::<_, Retailer>(
            r#"
            SELECT id, name, kind, secret_hash, created_at, updated_at
            FROM retailers
            WHERE kind = ?
            "#,
        )
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        Ok(retailer)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Retailer>> {
        let retailer = sqlx::query_as::<_, Retailer>(
            r#"
            SELECT id, name, kind, secret_hash, created_at, updated_at
            FROM retailers
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(retailer)
    }

    async fn list(&self) -> Result<Vec<Retailer>> {
        let retailers = sqlx::query_as::<_, Retailer>(
            r#"
            SELECT id, name, kind, secret_hash, created_at, updated_at
            FROM retailers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(retailers)
    }

    async fn update(&self, id: i64, changes: &RetailerChanges) -> Result<Retailer> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Retailer not found with id: {}", id)))?;

        let secret_hash = changes
            .secret_hash
            .as_ref()
            .unwrap_or(&existing.secret_hash);

        sqlx::query(
            r#"
            UPDATE retailers
            SET name = ?, secret_hash = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(secret_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update retailer")))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM retailers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Retailer not found with id: {}",
                id
            )));
        }

        Ok(())
    }
}
