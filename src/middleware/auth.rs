//! Authentication extractors
//!
//! Provides:
//! - `AuthRetailer` extractor: the API-key gate for customer-facing routes.
//!   Resolves the `X-RETAILER` tenant tag, verifies `X-API-KEY` against the
//!   retailer's stored secret hash, and attaches the resolved retailer as the
//!   request's tenant context.
//! - `AdminIdentity` extractor: HTTP Basic realm for the admin routes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::crypto;
use crate::domain::{AdminUser, Retailer, RetailerKind};
use crate::state::HasServices;

/// Header carrying the plaintext shared secret.
pub const API_KEY_HEADER: &str = "X-API-KEY";
/// Header carrying the tenant tag, matched case-insensitively against the
/// retailer kind display names.
pub const RETAILER_HEADER: &str = "X-RETAILER";

/// The resolved tenant context of an authenticated customer-facing request.
#[derive(Debug, Clone)]
pub struct AuthRetailer(pub Retailer);

/// Gate rejections. Every variant answers 401 with a fixed plain-text body;
/// the exact strings are a compatibility contract for existing clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// `X-API-KEY` missing or blank
    MissingApiKey,
    /// Tenant tag unknown, or no retailer provisioned for it
    UnknownRetailer,
    /// Secret does not match the stored hash
    InvalidApiKey,
    /// Unexpected fault while authenticating; fails closed
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = match self {
            AuthError::MissingApiKey => "Missing API Key",
            AuthError::UnknownRetailer => "Invalid Retailer name or Reatiler data not present",
            AuthError::InvalidApiKey => "Invalid API Key",
            AuthError::Internal => "Invalid Retailer name or API Key",
        };

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Run the gate against the request headers.
///
/// The API key presence check runs first: a request without a key is rejected
/// the same way no matter what the tenant tag says.
async fn authenticate<S: HasServices>(
    headers: &HeaderMap,
    state: &S,
) -> Result<Retailer, AuthError> {
    let api_key = match headers.get(API_KEY_HEADER) {
        None => {
            tracing::warn!("Missing API key header in request");
            return Err(AuthError::MissingApiKey);
        }
        Some(value) => value.to_str().map_err(|_| {
            tracing::error!("API key header is not valid UTF-8");
            AuthError::Internal
        })?,
    };
    if api_key.trim().is_empty() {
        tracing::warn!("Blank API key header in request");
        return Err(AuthError::MissingApiKey);
    }

    let tag = headers
        .get(RETAILER_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let kind = match RetailerKind::from_name(tag) {
        Some(kind) => kind,
        None => {
            tracing::warn!(retailer = tag, "Invalid retailer name");
            return Err(AuthError::UnknownRetailer);
        }
    };

    let retailer = state
        .retailer_service()
        .find_by_kind(kind)
        .await
        .map_err(|e| {
            tracing::error!(retailer = tag, "Error while resolving retailer: {}", e);
            AuthError::Internal
        })?;

    let retailer = match retailer {
        Some(retailer) => retailer,
        None => {
            tracing::warn!(retailer = tag, "No retailer provisioned for tag");
            return Err(AuthError::UnknownRetailer);
        }
    };

    if !crypto::verify_secret(api_key, &retailer.secret_hash) {
        tracing::warn!(retailer = tag, "API key does not match for retailer");
        return Err(AuthError::InvalidApiKey);
    }

    Ok(retailer)
}

impl<S> FromRequestParts<S> for AuthRetailer
where
    S: HasServices,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).await.map(AuthRetailer)
    }
}

/// The authenticated admin of a retailer-management request.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub AdminUser);

/// Basic-auth rejections; all answer 401 with a `WWW-Authenticate` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAuthError {
    MissingCredentials,
    InvalidCredentials,
    Internal,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AdminAuthError::MissingCredentials => "Missing credentials",
            AdminAuthError::InvalidCredentials => "Invalid credentials",
            AdminAuthError::Internal => "Authentication failed",
        };

        let body = serde_json::json!({
            "error": "unauthorized",
            "message": message,
        });

        (
            StatusCode::UNAUTHORIZED,
            [("WWW-Authenticate", "Basic realm=\"admin\"")],
            axum::Json(body),
        )
            .into_response()
    }
}

/// Decode a `Basic` authorization header into a username/password pair.
fn parse_basic_credentials(headers: &HeaderMap) -> Result<(String, String), AdminAuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AdminAuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AdminAuthError::InvalidCredentials)?;

    let encoded = value
        .strip_prefix("Basic ")
        .ok_or(AdminAuthError::InvalidCredentials)?;

    let decoded = BASE64
        .decode(encoded)
        .map_err(|_| AdminAuthError::InvalidCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AdminAuthError::InvalidCredentials)?;

    let (user, password) = decoded
        .split_once(':')
        .ok_or(AdminAuthError::InvalidCredentials)?;

    Ok((user.to_string(), password.to_string()))
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: HasServices,
{
    type Rejection = AdminAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (user_name, password) = parse_basic_credentials(&parts.headers)?;

        let admin = state
            .admin_auth_service()
            .verify_credentials(&user_name, &password)
            .await
            .map_err(|e| {
                tracing::error!("Error while verifying admin credentials: {}", e);
                AdminAuthError::Internal
            })?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        Ok(AdminIdentity(admin))
    }
}
