//! Admin credential verification
//!
//! Backs the Basic-auth realm for the retailer-management surface.

use crate::crypto;
use crate::domain::AdminUser;
use crate::error::Result;
use crate::repository::AdminUserRepository;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AdminAuthService<A: AdminUserRepository> {
    repo: Arc<A>,
}

impl<A: AdminUserRepository> AdminAuthService<A> {
    pub fn new(repo: Arc<A>) -> Self {
        Self { repo }
    }

    /// Verify a username/password pair. A wrong password and an unknown user
    /// are indistinguishable to the caller: both are `None`.
    pub async fn verify_credentials(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<Option<AdminUser>> {
        let admin = match self.repo.find_by_user_name(user_name).await? {
            Some(admin) => admin,
            None => {
                warn!(user_name, "Unknown admin user");
                return Ok(None);
            }
        };

        if !crypto::verify_secret(password, &admin.password_hash) {
            warn!(user_name, "Admin password mismatch");
            return Ok(None);
        }

        Ok(Some(admin))
    }

    /// Seed a first admin account at startup. A no-op when any admin account
    /// already exists.
    pub async fn ensure_admin_account(&self, user_name: &str, password: &str) -> Result<()> {
        if self.repo.count().await? > 0 {
            return Ok(());
        }

        let password_hash = crypto::hash_secret(password)?;
        let admin = self.repo.create(user_name, &password_hash).await?;
        info!(user_name = %admin.user_name, "Seeded initial admin account");
        Ok(())
    }
}
