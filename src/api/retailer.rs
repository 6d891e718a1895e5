//! Admin retailer API handlers
//!
//! Guarded by the [`AdminIdentity`] Basic-auth extractor, never by the
//! API-key gate.

use crate::api::{MessageResponse, SuccessResponse};
use crate::domain::{CreateRetailerInput, RetailerResponse, UpdateRetailerInput};
use crate::error::Result;
use crate::middleware::AdminIdentity;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Provision a new retailer.
#[utoipa::path(
    post,
    path = "/api/v1/admin/retailer",
    tag = "Admin",
    request_body = CreateRetailerInput,
    responses(
        (status = 201, body = RetailerResponse),
        (status = 401, description = "Authentication failed"),
        (status = 409, description = "Retailer name or kind already taken"),
    )
)]
pub async fn create<S: HasServices>(
    State(state): State<S>,
    AdminIdentity(admin): AdminIdentity,
    Json(input): Json<CreateRetailerInput>,
) -> Result<impl IntoResponse> {
    tracing::info!(admin = %admin.user_name, name = %input.name, "Creating retailer");
    let retailer = state.retailer_service().create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(RetailerResponse::from(retailer))),
    ))
}

/// Get a retailer by id.
#[utoipa::path(
    get,
    path = "/api/v1/admin/retailer/{id}",
    tag = "Admin",
    params(("id" = i64, Path, description = "Retailer id")),
    responses(
        (status = 200, body = RetailerResponse),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "No such retailer"),
    )
)]
pub async fn get<S: HasServices>(
    State(state): State<S>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    tracing::info!(admin = %admin.user_name, retailer_id = id, "Fetching retailer");
    let retailer = state.retailer_service().get(id).await?;
    Ok(Json(SuccessResponse::new(RetailerResponse::from(retailer))))
}

/// List all retailers.
#[utoipa::path(
    get,
    path = "/api/v1/admin/retailer",
    tag = "Admin",
    responses(
        (status = 200, body = Vec<RetailerResponse>),
        (status = 401, description = "Authentication failed"),
    )
)]
pub async fn list<S: HasServices>(
    State(state): State<S>,
    AdminIdentity(admin): AdminIdentity,
) -> Result<impl IntoResponse> {
    tracing::info!(admin = %admin.user_name, "Listing retailers");
    let retailers = state.retailer_service().list().await?;
    let responses: Vec<RetailerResponse> =
        retailers.into_iter().map(RetailerResponse::from).collect();
    Ok(Json(SuccessResponse::new(responses)))
}

/// Update a retailer's name and optionally rotate its secret.
#[utoipa::path(
    put,
    path = "/api/v1/admin/retailer/{id}",
    tag = "Admin",
    request_body = UpdateRetailerInput,
    params(("id" = i64, Path, description = "Retailer id")),
    responses(
        (status = 200, body = RetailerResponse),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "No such retailer"),
        (status = 409, description = "Retailer name already taken"),
    )
)]
pub async fn update<S: HasServices>(
    State(state): State<S>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<i64>,
    Json(input): Json<UpdateRetailerInput>,
) -> Result<impl IntoResponse> {
    tracing::info!(admin = %admin.user_name, retailer_id = id, "Updating retailer");
    let retailer = state.retailer_service().update(id, input).await?;
    Ok(Json(SuccessResponse::new(RetailerResponse::from(retailer))))
}

/// Delete a retailer; refused while customers still reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/retailer/{id}",
    tag = "Admin",
    params(("id" = i64, Path, description = "Retailer id")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "No such retailer"),
        (status = 409, description = "Customers still reference this retailer"),
    )
)]
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    tracing::info!(admin = %admin.user_name, retailer_id = id, "Deleting retailer");
    state.retailer_service().delete(id).await?;
    Ok(Json(MessageResponse::new("Retailer deleted successfully")))
}
