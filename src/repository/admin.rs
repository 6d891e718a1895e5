//! Admin account repository

use crate::domain::AdminUser;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<AdminUser>>;
    async fn create(&self, user_name: &str, password_hash: &str) -> Result<AdminUser>;
    async fn count(&self) -> Result<i64>;
}

pub struct AdminUserRepositoryImpl {
    pool: MySqlPool,
}

impl AdminUserRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminUserRepository for AdminUserRepositoryImpl {
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<AdminUser>> {
        let admin = sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT id, user_name, password_hash, created_at
            FROM admin_users
            WHERE user_name = ?
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn create(&self, user_name: &str, password_hash: &str) -> Result<AdminUser> {
        sqlx::query(
            r#"
            INSERT INTO admin_users (user_name, password_hash, created_at)
            VALUES (?, ?, NOW())
            "#,
        )
        .bind(user_name)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        self.find_by_user_name(user_name)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create admin user")))
    }

    async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
