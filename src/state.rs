//! Application state abstraction
//!
//! The router, extractors, and handlers are generic over this trait so they
//! work against both the production `AppState` and test states built from
//! mock repositories.

use crate::repository::{AdminUserRepository, CustomerRepository, RetailerRepository};
use crate::service::{AdminAuthService, CustomerService, RetailerService};

pub trait HasServices: Clone + Send + Sync + 'static {
    type RetailerRepo: RetailerRepository + 'static;
    type CustomerRepo: CustomerRepository + 'static;
    type AdminRepo: AdminUserRepository + 'static;

    fn retailer_service(&self) -> &RetailerService<Self::RetailerRepo, Self::CustomerRepo>;
    fn customer_service(&self) -> &CustomerService<Self::CustomerRepo>;
    fn admin_auth_service(&self) -> &AdminAuthService<Self::AdminRepo>;

    /// Readiness probe against the backing store.
    fn db_ready(&self) -> impl std::future::Future<Output = bool> + Send;
}
