//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::middleware::TraceIdMakeSpan;
use crate::repository::{
    admin::AdminUserRepositoryImpl, customer::CustomerRepositoryImpl,
    retailer::RetailerRepositoryImpl,
};
use crate::service::{AdminAuthService, CustomerService, RetailerService};
use crate::state::HasServices;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub retailer_service: Arc<RetailerService<RetailerRepositoryImpl, CustomerRepositoryImpl>>,
    pub customer_service: Arc<CustomerService<CustomerRepositoryImpl>>,
    pub admin_auth_service: Arc<AdminAuthService<AdminUserRepositoryImpl>>,
}

impl HasServices for AppState {
    type RetailerRepo = RetailerRepositoryImpl;
    type CustomerRepo = CustomerRepositoryImpl;
    type AdminRepo = AdminUserRepositoryImpl;

    fn retailer_service(&self) -> &RetailerService<Self::RetailerRepo, Self::CustomerRepo> {
        &self.retailer_service
    }

    fn customer_service(&self) -> &CustomerService<Self::CustomerRepo> {
        &self.customer_service
    }

    fn admin_auth_service(&self) -> &AdminAuthService<Self::AdminRepo> {
        &self.admin_auth_service
    }

    async fn db_ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok()
    }
}

/// Run the server
pub async fn run(config: Config) -> Result<()> {
    crate::migration::run_migrations(&config).await?;

    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    let retailer_repo = Arc::new(RetailerRepositoryImpl::new(db_pool.clone()));
    let customer_repo = Arc::new(CustomerRepositoryImpl::new(db_pool.clone()));
    let admin_repo = Arc::new(AdminUserRepositoryImpl::new(db_pool.clone()));

    let retailer_service = Arc::new(RetailerService::new(
        retailer_repo.clone(),
        customer_repo.clone(),
    ));
    let customer_service = Arc::new(CustomerService::new(customer_repo.clone()));
    let admin_auth_service = Arc::new(AdminAuthService::new(admin_repo.clone()));

    if let (Some(user), Some(password)) = (
        &config.bootstrap.admin_user,
        &config.bootstrap.admin_password,
    ) {
        admin_auth_service.ensure_admin_account(user, password).await?;
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        retailer_service,
        customer_service,
        admin_auth_service,
    };

    let app = build_router(state);

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router with generic state type
///
/// Generic over the state so it works with both the production `AppState`
/// and test states built from mock repositories.
pub fn build_router<S: HasServices>(state: S) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()),
        )
        // Health endpoints
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        // Customer endpoints (API-key gate)
        .route("/api/v1/customer", post(api::customer::create::<S>))
        .route(
            "/api/v1/customer/{id}",
            get(api::customer::get::<S>)
                .put(api::customer::update::<S>)
                .delete(api::customer::delete::<S>),
        )
        // Admin retailer endpoints (Basic auth)
        .route(
            "/api/v1/admin/retailer",
            get(api::retailer::list::<S>).post(api::retailer::create::<S>),
        )
        .route(
            "/api/v1/admin/retailer/{id}",
            get(api::retailer::get::<S>)
                .put(api::retailer::update::<S>)
                .delete(api::retailer::delete::<S>),
        )
        // Add middleware
        .layer(TraceLayer::new_for_http().make_span_with(TraceIdMakeSpan))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;
    use crate::domain::{AdminUser, Customer, Retailer, RetailerKind};
    use crate::repository::admin::MockAdminUserRepository;
    use crate::repository::customer::MockCustomerRepository;
    use crate::repository::retailer::MockRetailerRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use mockall::predicate::*;
    use tower::ServiceExt;

    #[derive(Clone)]
    struct TestState {
        retailer_service: Arc<RetailerService<MockRetailerRepository, MockCustomerRepository>>,
        customer_service: Arc<CustomerService<MockCustomerRepository>>,
        admin_auth_service: Arc<AdminAuthService<MockAdminUserRepository>>,
    }

    impl HasServices for TestState {
        type RetailerRepo = MockRetailerRepository;
        type CustomerRepo = MockCustomerRepository;
        type AdminRepo = MockAdminUserRepository;

        fn retailer_service(
            &self,
        ) -> &RetailerService<Self::RetailerRepo, Self::CustomerRepo> {
            &self.retailer_service
        }

        fn customer_service(&self) -> &CustomerService<Self::CustomerRepo> {
            &self.customer_service
        }

        fn admin_auth_service(&self) -> &AdminAuthService<Self::AdminRepo> {
            &self.admin_auth_service
        }

        async fn db_ready(&self) -> bool {
            true
        }
    }

    fn test_router(
        retailer_repo: MockRetailerRepository,
        customer_repo: MockCustomerRepository,
        admin_repo: MockAdminUserRepository,
    ) -> Router {
        let customer_repo = Arc::new(customer_repo);
        let state = TestState {
            retailer_service: Arc::new(RetailerService::new(
                Arc::new(retailer_repo),
                customer_repo.clone(),
            )),
            customer_service: Arc::new(CustomerService::new(customer_repo)),
            admin_auth_service: Arc::new(AdminAuthService::new(Arc::new(admin_repo))),
        };
        build_router(state)
    }

    fn provisioned_retailer(id: i64, kind: RetailerKind, secret: &str) -> Retailer {
        Retailer {
            id,
            name: format!("{} Marketplace", kind.display_name()),
            kind,
            secret_hash: crypto::hash_secret(secret).unwrap(),
            ..Default::default()
        }
    }

    fn admin_repo_with(user_name: &str, password: &str) -> MockAdminUserRepository {
        let admin = AdminUser {
            id: 1,
            user_name: user_name.to_string(),
            password_hash: crypto::hash_secret(password).unwrap(),
            ..Default::default()
        };
        let mut repo = MockAdminUserRepository::new();
        repo.expect_find_by_user_name()
            .returning(move |name| {
                if name == admin.user_name {
                    Ok(Some(admin.clone()))
                } else {
                    Ok(None)
                }
            });
        repo
    }

    fn basic_auth(user: &str, password: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:{}", user, password)))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = test_router(
            MockRetailerRepository::new(),
            MockCustomerRepository::new(),
            MockAdminUserRepository::new(),
        );

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_rejected_regardless_of_retailer_header() {
        for retailer_header in [None, Some("Amazon"), Some("garbage")] {
            let router = test_router(
                MockRetailerRepository::new(),
                MockCustomerRepository::new(),
                MockAdminUserRepository::new(),
            );

            let mut builder = Request::builder().uri("/api/v1/customer/1");
            if let Some(tag) = retailer_header {
                builder = builder.header("X-RETAILER", tag);
            }
            let response = router
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_text(response).await, "Missing API Key");
        }
    }

    #[tokio::test]
    async fn test_wrong_api_key_is_rejected() {
        let mut retailer_repo = MockRetailerRepository::new();
        let retailer = provisioned_retailer(1, RetailerKind::Amazon, "right-key");
        retailer_repo
            .expect_find_by_kind()
            .returning(move |_| Ok(Some(retailer.clone())));

        let router = test_router(
            retailer_repo,
            MockCustomerRepository::new(),
            MockAdminUserRepository::new(),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/customer/1")
                    .header("X-RETAILER", "AMAZON")
                    .header("X-API-KEY", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Invalid API Key");
    }

    #[tokio::test]
    async fn test_unknown_retailer_tag_is_rejected() {
        let router = test_router(
            MockRetailerRepository::new(),
            MockCustomerRepository::new(),
            MockAdminUserRepository::new(),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/customer/1")
                    .header("X-RETAILER", "no_such_tag")
                    .header("X-API-KEY", "key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_text(response).await,
            "Invalid Retailer name or Reatiler data not present"
        );
    }

    #[tokio::test]
    async fn test_create_customer_success() {
        let mut retailer_repo = MockRetailerRepository::new();
        let retailer = provisioned_retailer(1, RetailerKind::Amazon, "S");
        retailer_repo
            .expect_find_by_kind()
            .with(eq(RetailerKind::Amazon))
            .returning(move |_| Ok(Some(retailer.clone())));

        let mut customer_repo = MockCustomerRepository::new();
        customer_repo
            .expect_find_by_retailer_and_login_name()
            .with(eq(1), eq("alice.smith"))
            .returning(|_, _| Ok(None));
        customer_repo.expect_create().returning(|input| {
            Ok(Customer {
                id: 10,
                retailer_id: input.retailer_id,
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                date_of_birth: input.date_of_birth.clone(),
                login_name: input.login_name.clone(),
                ..Default::default()
            })
        });

        let router = test_router(retailer_repo, customer_repo, MockAdminUserRepository::new());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/customer")
                    .header("X-RETAILER", "AMAZON")
                    .header("X-API-KEY", "S")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "first_name": "Alice",
                            "date_of_birth": "1990-01-01",
                            "login_name": "alice.smith"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["id"], 10);
        assert_eq!(json["data"]["retailer_id"], 1);
        assert_eq!(json["data"]["login_name"], "alice.smith");
    }

    #[tokio::test]
    async fn test_create_customer_duplicate_login_conflicts() {
        let mut retailer_repo = MockRetailerRepository::new();
        let retailer = provisioned_retailer(1, RetailerKind::Amazon, "S");
        retailer_repo
            .expect_find_by_kind()
            .returning(move |_| Ok(Some(retailer.clone())));

        let mut customer_repo = MockCustomerRepository::new();
        customer_repo
            .expect_find_by_retailer_and_login_name()
            .returning(|_, _| {
                Ok(Some(Customer {
                    id: 10,
                    retailer_id: 1,
                    login_name: "alice.smith".to_string(),
                    ..Default::default()
                }))
            });

        let router = test_router(retailer_repo, customer_repo, MockAdminUserRepository::new());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/customer")
                    .header("X-RETAILER", "AMAZON")
                    .header("X-API-KEY", "S")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "first_name": "Alice",
                            "date_of_birth": "1990-01-01",
                            "login_name": "alice.smith"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert!(json["message"].as_str().unwrap().contains("already in use"));
    }

    #[tokio::test]
    async fn test_customer_of_other_retailer_is_not_found() {
        // Customer 7 belongs to the Amazon retailer; a caller authenticated
        // as Flipkart must get a plain not-found, never the data.
        let mut retailer_repo = MockRetailerRepository::new();
        let flipkart = provisioned_retailer(2, RetailerKind::Flipkart, "F");
        retailer_repo
            .expect_find_by_kind()
            .with(eq(RetailerKind::Flipkart))
            .returning(move |_| Ok(Some(flipkart.clone())));

        let mut customer_repo = MockCustomerRepository::new();
        customer_repo
            .expect_find_by_retailer_and_id()
            .with(eq(2), eq(7))
            .returning(|_, _| Ok(None));

        let router = test_router(retailer_repo, customer_repo, MockAdminUserRepository::new());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/customer/7")
                    .header("X-RETAILER", "Flipkart")
                    .header("X-API-KEY", "F")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("not found for ID: 7"));
    }

    #[tokio::test]
    async fn test_delete_customer_returns_message() {
        let mut retailer_repo = MockRetailerRepository::new();
        let retailer = provisioned_retailer(1, RetailerKind::Amazon, "S");
        retailer_repo
            .expect_find_by_kind()
            .returning(move |_| Ok(Some(retailer.clone())));

        let mut customer_repo = MockCustomerRepository::new();
        customer_repo
            .expect_find_by_retailer_and_id()
            .with(eq(1), eq(10))
            .returning(|_, _| {
                Ok(Some(Customer {
                    id: 10,
                    retailer_id: 1,
                    ..Default::default()
                }))
            });
        customer_repo
            .expect_delete()
            .with(eq(1), eq(10))
            .returning(|_, _| Ok(()));

        let router = test_router(retailer_repo, customer_repo, MockAdminUserRepository::new());

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/customer/10")
                    .header("X-RETAILER", "Amazon")
                    .header("X-API-KEY", "S")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Customer deleted successfully");
    }

    #[tokio::test]
    async fn test_admin_routes_require_credentials() {
        let router = test_router(
            MockRetailerRepository::new(),
            MockCustomerRepository::new(),
            MockAdminUserRepository::new(),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/admin/retailer")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("WWW-Authenticate").unwrap(),
            "Basic realm=\"admin\""
        );
    }

    #[tokio::test]
    async fn test_admin_create_retailer() {
        let mut retailer_repo = MockRetailerRepository::new();
        retailer_repo.expect_find_by_name().returning(|_| Ok(None));
        retailer_repo.expect_find_by_kind().returning(|_| Ok(None));
        retailer_repo.expect_create().returning(|input| {
            Ok(Retailer {
                id: 5,
                name: input.name.clone(),
                kind: input.kind,
                secret_hash: input.secret_hash.clone(),
                ..Default::default()
            })
        });

        let router = test_router(
            retailer_repo,
            MockCustomerRepository::new(),
            admin_repo_with("root", "admin-pass"),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/admin/retailer")
                    .header("Authorization", basic_auth("root", "admin-pass"))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "name": "Amazon Marketplace",
                            "kind": "AMAZON",
                            "api_key": "S"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["id"], 5);
        assert_eq!(json["data"]["name"], "Amazon Marketplace");
        // The secret never appears in a response.
        assert!(json["data"].get("secret_hash").is_none());
        assert!(json["data"].get("api_key").is_none());
    }

    #[tokio::test]
    async fn test_admin_wrong_password_rejected() {
        let router = test_router(
            MockRetailerRepository::new(),
            MockCustomerRepository::new(),
            admin_repo_with("root", "admin-pass"),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/admin/retailer")
                    .header("Authorization", basic_auth("root", "wrong"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_delete_retailer_blocked_by_customers() {
        let mut retailer_repo = MockRetailerRepository::new();
        retailer_repo.expect_find_by_id().with(eq(1)).returning(|_| {
            Ok(Some(Retailer {
                id: 1,
                ..Default::default()
            }))
        });

        let mut customer_repo = MockCustomerRepository::new();
        customer_repo
            .expect_list_by_retailer()
            .with(eq(1))
            .returning(|_| {
                Ok(vec![Customer {
                    id: 10,
                    retailer_id: 1,
                    ..Default::default()
                }])
            });

        let router = test_router(
            retailer_repo,
            customer_repo,
            admin_repo_with("root", "admin-pass"),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/admin/retailer/1")
                    .header("Authorization", basic_auth("root", "admin-pass"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("customer record"));
    }

    #[tokio::test]
    async fn test_admin_delete_retailer_without_customers_succeeds() {
        let mut retailer_repo = MockRetailerRepository::new();
        retailer_repo.expect_find_by_id().with(eq(1)).returning(|_| {
            Ok(Some(Retailer {
                id: 1,
                ..Default::default()
            }))
        });
        retailer_repo
            .expect_delete()
            .with(eq(1))
            .returning(|_| Ok(()));

        let mut customer_repo = MockCustomerRepository::new();
        customer_repo
            .expect_list_by_retailer()
            .with(eq(1))
            .returning(|_| Ok(vec![]));

        let router = test_router(
            retailer_repo,
            customer_repo,
            admin_repo_with("root", "admin-pass"),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/admin/retailer/1")
                    .header("Authorization", basic_auth("root", "admin-pass"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Retailer deleted successfully");
    }

    #[tokio::test]
    async fn test_invalid_customer_payload_is_a_validation_error() {
        let mut retailer_repo = MockRetailerRepository::new();
        let retailer = provisioned_retailer(1, RetailerKind::Amazon, "S");
        retailer_repo
            .expect_find_by_kind()
            .returning(move |_| Ok(Some(retailer.clone())));

        let router = test_router(
            retailer_repo,
            MockCustomerRepository::new(),
            MockAdminUserRepository::new(),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/customer")
                    .header("X-RETAILER", "Amazon")
                    .header("X-API-KEY", "S")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "first_name": "Alice",
                            "date_of_birth": "not-a-date",
                            "login_name": "alice.smith"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
