//! Customer API handlers
//!
//! Every handler takes the [`AuthRetailer`] extractor: requests that fail the
//! API-key gate never reach the service layer, and the resolved retailer is
//! the only source of the tenant scope.

use crate::api::{MessageResponse, SuccessResponse};
use crate::domain::{CustomerInput, CustomerResponse};
use crate::error::Result;
use crate::middleware::AuthRetailer;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Create a new customer under the authenticated retailer.
#[utoipa::path(
    post,
    path = "/api/v1/customer",
    tag = "Customer",
    request_body = CustomerInput,
    params(
        ("X-RETAILER" = String, Header, description = "Retailer tenant tag"),
        ("X-API-KEY" = String, Header, description = "Retailer shared secret"),
    ),
    responses(
        (status = 201, body = CustomerResponse),
        (status = 401, description = "Authentication failed"),
        (status = 409, description = "Login name already in use for this retailer"),
    )
)]
pub async fn create<S: HasServices>(
    State(state): State<S>,
    AuthRetailer(retailer): AuthRetailer,
    Json(input): Json<CustomerInput>,
) -> Result<impl IntoResponse> {
    tracing::info!(retailer_id = retailer.id, "Creating customer");
    let customer = state.customer_service().create(&retailer, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(CustomerResponse::from(customer))),
    ))
}

/// Get a customer by id within the authenticated retailer's scope.
#[utoipa::path(
    get,
    path = "/api/v1/customer/{id}",
    tag = "Customer",
    params(
        ("id" = i64, Path, description = "Customer id"),
        ("X-RETAILER" = String, Header, description = "Retailer tenant tag"),
        ("X-API-KEY" = String, Header, description = "Retailer shared secret"),
    ),
    responses(
        (status = 200, body = CustomerResponse),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "No such customer in this retailer's scope"),
    )
)]
pub async fn get<S: HasServices>(
    State(state): State<S>,
    AuthRetailer(retailer): AuthRetailer,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    tracing::info!(customer_id = id, retailer_id = retailer.id, "Fetching customer");
    let customer = state.customer_service().get(&retailer, id).await?;
    Ok(Json(SuccessResponse::new(CustomerResponse::from(customer))))
}

/// Update a customer within the authenticated retailer's scope.
#[utoipa::path(
    put,
    path = "/api/v1/customer/{id}",
    tag = "Customer",
    request_body = CustomerInput,
    params(
        ("id" = i64, Path, description = "Customer id"),
        ("X-RETAILER" = String, Header, description = "Retailer tenant tag"),
        ("X-API-KEY" = String, Header, description = "Retailer shared secret"),
    ),
    responses(
        (status = 200, body = CustomerResponse),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "No such customer in this retailer's scope"),
        (status = 409, description = "Login name already in use for this retailer"),
    )
)]
pub async fn update<S: HasServices>(
    State(state): State<S>,
    AuthRetailer(retailer): AuthRetailer,
    Path(id): Path<i64>,
    Json(input): Json<CustomerInput>,
) -> Result<impl IntoResponse> {
    tracing::info!(customer_id = id, retailer_id = retailer.id, "Updating customer");
    let customer = state
        .customer_service()
        .update(&retailer, id, input)
        .await?;
    Ok(Json(SuccessResponse::new(CustomerResponse::from(customer))))
}

/// Delete a customer within the authenticated retailer's scope.
#[utoipa::path(
    delete,
    path = "/api/v1/customer/{id}",
    tag = "Customer",
    params(
        ("id" = i64, Path, description = "Customer id"),
        ("X-RETAILER" = String, Header, description = "Retailer tenant tag"),
        ("X-API-KEY" = String, Header, description = "Retailer shared secret"),
    ),
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "No such customer in this retailer's scope"),
    )
)]
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    AuthRetailer(retailer): AuthRetailer,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    tracing::info!(customer_id = id, retailer_id = retailer.id, "Deleting customer");
    state.customer_service().delete(&retailer, id).await?;
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}
