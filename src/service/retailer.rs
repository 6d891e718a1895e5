//! Retailer management business logic
//!
//! Admin-facing CRUD over the retailer directory. Uniqueness of both the
//! retailer name and the retailer kind is enforced here (the unique keys in
//! storage remain the backstop), and deletion is refused while any customer
//! still references the retailer.

use crate::crypto;
use crate::domain::{CreateRetailerInput, Retailer, RetailerKind, UpdateRetailerInput};
use crate::error::{AppError, Result};
use crate::repository::retailer::{NewRetailer, RetailerChanges};
use crate::repository::{CustomerRepository, RetailerRepository};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct RetailerService<R: RetailerRepository, C: CustomerRepository> {
    repo: Arc<R>,
    customer_repo: Arc<C>,
}

impl<R: RetailerRepository, C: CustomerRepository> RetailerService<R, C> {
    pub fn new(repo: Arc<R>, customer_repo: Arc<C>) -> Self {
        Self {
            repo,
            customer_repo,
        }
    }

    pub async fn create(&self, input: CreateRetailerInput) -> Result<Retailer> {
        input.validate()?;

        if self.repo.find_by_name(&input.name).await?.is_some() {
            warn!(name = %input.name, "Retailer name already taken");
            return Err(AppError::Conflict(format!(
                "Retailer '{}' already exists",
                input.name
            )));
        }

        // At most one retailer per kind: the tenant tag must resolve uniquely.
        if self.repo.find_by_kind(input.kind).await?.is_some() {
            warn!(kind = %input.kind, "Retailer kind already provisioned");
            return Err(AppError::Conflict(format!(
                "A retailer is already provisioned for kind {}",
                input.kind
            )));
        }

        let secret_hash = crypto::hash_secret(&input.api_key)?;
        let retailer = self
            .repo
            .create(&NewRetailer {
                name: input.name,
                kind: input.kind,
                secret_hash,
            })
            .await?;

        info!(retailer_id = retailer.id, name = %retailer.name, "Retailer created");
        Ok(retailer)
    }

    pub async fn get(&self, id: i64) -> Result<Retailer> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Retailer not found with id: {}", id)))
    }

    pub async fn list(&self) -> Result<Vec<Retailer>> {
        self.repo.list().await
    }

    /// Lookup used by the authentication gate to resolve a tenant tag.
    pub async fn find_by_kind(&self, kind: RetailerKind) -> Result<Option<Retailer>> {
        self.repo.find_by_kind(kind).await
    }

    pub async fn update(&self, id: i64, input: UpdateRetailerInput) -> Result<Retailer> {
        input.validate()?;

        let existing = self.get(id).await?;
        let name = input.name.unwrap_or_else(|| existing.name.clone());

        if name != existing.name {
            if let Some(other) = self.repo.find_by_name(&name).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!(
                        "Retailer '{}' already exists",
                        name
                    )));
                }
            }
        }

        // Rotate the secret only when a non-blank key is supplied.
        let secret_hash = match input.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(crypto::hash_secret(key)?),
            _ => None,
        };

        let retailer = self
            .repo
            .update(id, &RetailerChanges { name, secret_hash })
            .await?;

        info!(retailer_id = retailer.id, "Retailer updated");
        Ok(retailer)
    }

    /// Delete a retailer, refusing while any customer references it.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let retailer = self.get(id).await?;

        let customers = self.customer_repo.list_by_retailer(retailer.id).await?;
        if !customers.is_empty() {
            warn!(
                retailer_id = id,
                customers = customers.len(),
                "Retailer deletion blocked by existing customer references"
            );
            return Err(AppError::Conflict(format!(
                "Retailer {} cannot be deleted: {} customer record(s) still reference it through retailer_id",
                id,
                customers.len()
            )));
        }

        self.repo.delete(id).await?;
        info!(retailer_id = id, "Retailer deleted");
        Ok(())
    }
}
