//! Customer domain model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Customer entity, always owned by exactly one retailer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub retailer_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: String,
    pub login_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Customer {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            retailer_id: 0,
            first_name: String::new(),
            last_name: None,
            date_of_birth: String::new(),
            login_name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request payload for creating or updating a customer.
///
/// The owning retailer is never part of the payload; it always comes from the
/// authenticated tenant context.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 100), custom(function = "super::validate_not_blank"))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_date_of_birth"))]
    pub date_of_birth: String,
    #[validate(length(min = 1, max = 100), custom(function = "super::validate_not_blank"))]
    pub login_name: String,
}

/// Customer response payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: i64,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub date_of_birth: String,
    pub login_name: String,
    pub retailer_id: i64,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            date_of_birth: customer.date_of_birth,
            login_name: customer.login_name,
            retailer_id: customer.retailer_id,
        }
    }
}

/// Validate a `YYYY-MM-DD` date of birth as a real calendar date.
fn validate_date_of_birth(value: &str) -> Result<(), validator::ValidationError> {
    if !DOB_REGEX.is_match(value) {
        return Err(validator::ValidationError::new("invalid_date_format"));
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err(validator::ValidationError::new("invalid_calendar_date"));
    }
    Ok(())
}

lazy_static::lazy_static! {
    static ref DOB_REGEX: regex::Regex = regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}
