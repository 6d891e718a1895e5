//! Admin login domain model
//!
//! Admin accounts guard the retailer-management surface through HTTP Basic
//! authentication. They are entirely separate from the retailer API-key gate.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Admin account entity
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub user_name: String,
    /// Argon2id hash; never serialized, never logged.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Default for AdminUser {
    fn default() -> Self {
        Self {
            id: 0,
            user_name: String::new(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }
}
