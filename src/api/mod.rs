//! Backend boundary: wire types, the `ProductApi` seam and its reqwest implementation.

mod client;
mod types;

pub use client::HttpApi;
pub use types::{Conversion, LoginRequest, LoginResponse, Product, ProductDraft, ProductStatus, RegisterRequest};

use crate::error::AppResult;
use crate::session::Credential;

/// Operations the views need from the backend. Every call that takes `auth`
/// sends it as a bearer token when present.
#[allow(async_fn_in_trait)]
pub trait ProductApi {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<LoginResponse>;
    async fn register(&self, req: &RegisterRequest) -> AppResult<()>;
    /// The backend scopes the listing by caller: own products, or all of them for admins.
    async fn list_products(&self, auth: Option<&Credential>) -> AppResult<Vec<Product>>;
    async fn create_product(&self, auth: Option<&Credential>, draft: &ProductDraft) -> AppResult<()>;
    async fn set_status(&self, auth: Option<&Credential>, id: i64, status: ProductStatus) -> AppResult<()>;
    async fn delete_product(&self, auth: Option<&Credential>, id: i64) -> AppResult<()>;
    async fn convert(&self, auth: Option<&Credential>, id: i64, currency: &str) -> AppResult<Conversion>;
}
