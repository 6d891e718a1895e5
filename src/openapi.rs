//! OpenAPI 3.0 documentation assembly
//!
//! Aggregates the handler path annotations and domain schemas into a single
//! specification, served through Swagger UI.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Retail Registry API",
        description = "Multi-tenant retailer and customer registry service",
    ),
    tags(
        (name = "System", description = "Health checks and system status"),
        (name = "Customer", description = "Tenant-scoped customer operations, authenticated by retailer API key"),
        (name = "Admin", description = "Retailer management, authenticated by HTTP Basic credentials"),
    ),
    paths(
        crate::api::health::health,
        crate::api::health::ready,
        crate::api::customer::create,
        crate::api::customer::get,
        crate::api::customer::update,
        crate::api::customer::delete,
        crate::api::retailer::create,
        crate::api::retailer::get,
        crate::api::retailer::list,
        crate::api::retailer::update,
        crate::api::retailer::delete,
    ),
    components(schemas(
        crate::api::MessageResponse,
        crate::api::health::HealthResponse,
        crate::domain::RetailerKind,
        crate::domain::CreateRetailerInput,
        crate::domain::UpdateRetailerInput,
        crate::domain::RetailerResponse,
        crate::domain::CustomerInput,
        crate::domain::CustomerResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();

        assert!(json.contains("/api/v1/customer"));
        assert!(json.contains("/api/v1/admin/retailer"));
    }
}
