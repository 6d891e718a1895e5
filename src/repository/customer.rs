//! Customer repository
//!
//! Every read, update, and delete is a two-key lookup on
//! `(retailer_id, id)`: a caller holding a valid secret for one retailer can
//! never reach another retailer's rows, even with a guessed id.

use crate::domain::Customer;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

/// Persistence record for a new customer. The owning retailer comes from the
/// authenticated tenant context, never from the request payload.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub retailer_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: String,
    pub login_name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, input: &NewCustomer) -> Result<Customer>;
    async fn find_by_retailer_and_id(&self, retailer_id: i64, id: i64)
        -> Result<Option<Customer>>;
    async fn find_by_retailer_and_login_name(
        &self,
        retailer_id: i64,
        login_name: &str,
    ) -> Result<Option<Customer>>;
    async fn list_by_retailer(&self, retailer_id: i64) -> Result<Vec<Customer>>;
    async fn update(&self, customer: &Customer) -> Result<Customer>;
    async fn delete(&self, retailer_id: i64, id: i64) -> Result<()>;
}

pub struct CustomerRepositoryImpl {
    pool: MySqlPool,
}

impl CustomerRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for CustomerRepositoryImpl {
    async fn create(&self, input: &NewCustomer) -> Result<Customer> {
        let result = sqlx::query(
            r#"
            INSERT INTO customers
                (retailer_id, first_name, last_name, date_of_birth, login_name,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(input.retailer_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.date_of_birth)
        .bind(&input.login_name)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        self.find_by_retailer_and_id(input.retailer_id, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create customer")))
    }

    async fn find_by_retailer_and_id(
        &self,
        retailer_id: i64,
        id: i64,
    ) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, retailer_id, first_name, last_name, date_of_birth, login_name,
                   created_at, updated_at
            FROM customers
            WHERE retailer_id = ? AND id = ?
            "#,
        )
        .bind(retailer_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn find_by_retailer_and_login_name(
        &self,
        retailer_id: i64,
        login_name: &str,
    ) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, retailer_id, first_name, last_name, date_of_birth, login_name,
                   created_at, updated_at
            FROM customers
            WHERE retailer_id = ? AND login_name = ?
            "#,
        )
        .bind(retailer_id)
        .bind(login_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn list_by_retailer(&self, retailer_id: i64) -> Result<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, retailer_id, first_name, last_name, date_of_birth, login_name,
                   created_at, updated_at
            FROM customers
            WHERE retailer_id = ?
            ORDER BY id
            "#,
        )
        .bind(retailer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn update(&self, customer: &Customer) -> Result<Customer> {
        sqlx::query(
            r#"
            UPDATE customers
            SET first_name = ?, last_name = ?, date_of_birth = ?, login_name = ?,
                updated_at = NOW()
            WHERE retailer_id = ? AND id = ?
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.date_of_birth)
        .bind(&customer.login_name)
        .bind(customer.retailer_id)
        .bind(customer.id)
        .execute(&self.pool)
        .await?;

        self.find_by_retailer_and_id(customer.retailer_id, customer.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update customer")))
    }

    async fn delete(&self, retailer_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE retailer_id = ? AND id = ?")
            .bind(retailer_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Customer information is not found for ID: {}",
                id
            )));
        }

        Ok(())
    }
}
