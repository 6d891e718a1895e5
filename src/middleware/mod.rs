//! HTTP middleware
//!
//! - API-key authentication gate and admin Basic-auth extractor
//! - Per-request trace-id span maker for request logging

pub mod auth;
pub mod trace;

pub use auth::{AdminIdentity, AuthError, AuthRetailer};
pub use trace::TraceIdMakeSpan;
