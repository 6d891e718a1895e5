//! Retailer domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Closed set of supported retailer kinds.
///
/// The external tenant tag (`X-RETAILER` header) is matched case-insensitively
/// against the display names; at most one retailer row may exist per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RetailerKind {
    Amazon,
    Flipkart,
    Walmart,
    Zepto,
}

impl RetailerKind {
    pub const ALL: [RetailerKind; 4] = [
        RetailerKind::Amazon,
        RetailerKind::Flipkart,
        RetailerKind::Walmart,
        RetailerKind::Zepto,
    ];

    /// Human-readable display name, the form expected in the tenant-tag header.
    pub fn display_name(&self) -> &'static str {
        match self {
            RetailerKind::Amazon => "Amazon",
            RetailerKind::Flipkart => "Flipkart",
            RetailerKind::Walmart => "Walmart",
            RetailerKind::Zepto => "Zepto",
        }
    }

    /// Storage token, used for the database column and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetailerKind::Amazon => "AMAZON",
            RetailerKind::Flipkart => "FLIPKART",
            RetailerKind::Walmart => "WALMART",
            RetailerKind::Zepto => "ZEPTO",
        }
    }

    /// Map an external tenant tag onto a kind, case-insensitively.
    ///
    /// An unknown tag is a normal `None`, not a fault.
    pub fn from_name(name: &str) -> Option<RetailerKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.display_name().eq_ignore_ascii_case(name))
    }
}

impl std::str::FromStr for RetailerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RetailerKind::from_name(s).ok_or_else(|| format!("Unknown retailer kind: {}", s))
    }
}

impl std::fmt::Display for RetailerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl sqlx::Type<sqlx::MySql> for RetailerKind {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for RetailerKind {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for RetailerKind {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> std::result::Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Retailer entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Retailer {
    pub id: i64,
    pub name: String,
    pub kind: RetailerKind,
    /// Argon2id hash of the shared secret; never serialized, never logged.
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Retailer {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            kind: RetailerKind::Amazon,
            secret_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for provisioning a new retailer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRetailerInput {
    #[validate(length(min = 1, max = 255), custom(function = "super::validate_not_blank"))]
    pub name: String,
    pub kind: RetailerKind,
    /// Plaintext shared secret; hashed before storage, never persisted as-is.
    #[validate(length(min = 1, max = 255), custom(function = "super::validate_not_blank"))]
    pub api_key: String,
}

/// Input for updating a retailer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRetailerInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// When present and non-blank, the secret is re-hashed and rotated.
    pub api_key: Option<String>,
}

/// Retailer response payload; the secret hash is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RetailerResponse {
    pub id: i64,
    pub name: String,
}

impl From<Retailer> for RetailerResponse {
    fn from(retailer: Retailer) -> Self {
        Self {
            id: retailer.id,
            name: retailer.name,
        }
    }
}
