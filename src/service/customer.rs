//! Customer business logic
//!
//! All operations take the resolved tenant (the authenticated [`Retailer`])
//! as an explicit argument; the owning retailer id is copied from it and never
//! from the request payload. Login-name uniqueness is scoped to that retailer
//! and checked before persistence — the composite unique key in storage stays
//! authoritative under concurrent creates.

use crate::domain::{Customer, CustomerInput, Retailer};
use crate::error::{AppError, Result};
use crate::repository::customer::NewCustomer;
use crate::repository::CustomerRepository;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct CustomerService<C: CustomerRepository> {
    repo: Arc<C>,
}

impl<C: CustomerRepository> CustomerService<C> {
    pub fn new(repo: Arc<C>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, retailer: &Retailer, input: CustomerInput) -> Result<Customer> {
        input.validate()?;
        self.ensure_login_name_free(retailer, &input.login_name, None)
            .await?;

        let customer = self
            .repo
            .create(&NewCustomer {
                retailer_id: retailer.id,
                first_name: input.first_name,
                last_name: input.last_name,
                date_of_birth: input.date_of_birth,
                login_name: input.login_name,
            })
            .await?;

        info!(
            customer_id = customer.id,
            retailer_id = retailer.id,
            "Customer created"
        );
        Ok(customer)
    }

    pub async fn get(&self, retailer: &Retailer, id: i64) -> Result<Customer> {
        self.repo
            .find_by_retailer_and_id(retailer.id, id)
            .await?
            .ok_or_else(|| {
                warn!(customer_id = id, retailer_id = retailer.id, "Customer not found in scope");
                AppError::NotFound(format!("Customer information is not found for ID: {}", id))
            })
    }

    pub async fn update(
        &self,
        retailer: &Retailer,
        id: i64,
        input: CustomerInput,
    ) -> Result<Customer> {
        input.validate()?;

        let existing = self.get(retailer, id).await?;
        self.ensure_login_name_free(retailer, &input.login_name, Some(existing.id))
            .await?;

        let customer = self
            .repo
            .update(&Customer {
                first_name: input.first_name,
                last_name: input.last_name,
                date_of_birth: input.date_of_birth,
                login_name: input.login_name,
                ..existing
            })
            .await?;

        info!(
            customer_id = customer.id,
            retailer_id = retailer.id,
            "Customer updated"
        );
        Ok(customer)
    }

    pub async fn delete(&self, retailer: &Retailer, id: i64) -> Result<()> {
        let customer = self.get(retailer, id).await?;
        self.repo.delete(retailer.id, customer.id).await?;

        info!(
            customer_id = id,
            retailer_id = retailer.id,
            "Customer deleted"
        );
        Ok(())
    }

    /// Scoped uniqueness check: fail when another customer of the same
    /// retailer already uses the login name. On update the candidate's own
    /// record is excluded so an unchanged login name remains valid.
    async fn ensure_login_name_free(
        &self,
        retailer: &Retailer,
        login_name: &str,
        exclude_id: Option<i64>,
    ) -> Result<()> {
        if let Some(existing) = self
            .repo
            .find_by_retailer_and_login_name(retailer.id, login_name)
            .await?
        {
            if exclude_id != Some(existing.id) {
                warn!(
                    retailer_id = retailer.id,
                    login_name, "Login name already exists for retailer"
                );
                return Err(AppError::Conflict(format!(
                    "Login name '{}' is already in use for this retailer",
                    login_name
                )));
            }
        }
        Ok(())
    }
}
