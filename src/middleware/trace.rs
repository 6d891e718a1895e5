//! Per-request trace span maker for `TraceLayer`.
//!
//! Every request span carries a fresh random trace identifier, so all log
//! lines emitted while handling the request can be correlated. The identifier
//! lives only in the span: when the request finishes the span closes and the
//! identifier is gone, never visible to a later request on a reused worker.
//! Sensitive query parameter values are redacted from the logged URI.

use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;
use uuid::Uuid;

/// Query parameter names whose values must be redacted in logs.
const SENSITIVE_PARAMS: &[&str] = &["api_key", "apikey", "token", "password", "secret"];

/// A `MakeSpan` implementation that stamps a per-request trace id and redacts
/// sensitive query parameters from the logged URI.
#[derive(Clone, Debug)]
pub struct TraceIdMakeSpan;

impl<B> MakeSpan<B> for TraceIdMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let trace_id = Uuid::new_v4();
        let sanitized = sanitize_uri(request.uri());

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %sanitized,
            trace_id = %trace_id,
        )
    }
}

/// Sanitize a URI by redacting the values of sensitive query parameters.
fn sanitize_uri(uri: &axum::http::Uri) -> String {
    let query = match uri.query() {
        Some(q) => q,
        None => return uri.path().to_string(),
    };

    let sanitized_pairs: Vec<String> = query
        .split('&')
        .map(|pair| {
            if let Some((key, _value)) = pair.split_once('=') {
                let key_lower = key.to_ascii_lowercase();
                if SENSITIVE_PARAMS.iter().any(|s| key_lower == *s) {
                    format!("{key}=[REDACTED]")
                } else {
                    pair.to_string()
                }
            } else {
                pair.to_string()
            }
        })
        .collect();

    format!("{}?{}", uri.path(), sanitized_pairs.join("&"))
}
