//! Pharmacy backend REST API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The backend is source of truth for products and accounts; nothing is
//!   synced locally except the logged-in user record
//! - In-memory caching via `moka` for product and category lookups
//!
//! # Endpoints
//!
//! Relative to the configured API base URL:
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | List products (paged) | GET | `products/get-all-products?page=&size=` |
//! | Product by ID | GET | `products/get-product/{id}` |
//! | Products in category | GET | `products/get-by-category/{category}` |
//! | Main image | GET | `products/{id}/image` |
//! | Sub-image | GET | `products/{id}/subimage/{index}` |
//! | Create user | POST | `users/create-user` |
//! | List users | GET | `users/get-all-users` |
//! | Login | POST | `users/login?mobile=&password=` |
//!
//! The storefront talks to the backend through the [`CatalogApi`] and
//! [`AccountApi`] traits so state managers can be exercised against stubs.

mod cache;
mod client;
#[cfg(test)]
pub(crate) mod stub;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use std::future::Future;

use medicare_core::{Phone, ProductId};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the response not received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the response body.
        message: String,
    },

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Whether the failure happened before any HTTP response was received.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Whether the backend rejected the request (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
            || matches!(self, Self::NotFound(_))
    }
}

/// Product catalog endpoints.
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of products.
    fn list_products(
        &self,
        page: u32,
        size: u32,
    ) -> impl Future<Output = Result<Page<BackendProduct>, BackendError>> + Send;

    /// Fetch a single product.
    ///
    /// Resolves to `BackendError::NotFound` when the backend answers 404.
    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<BackendProduct, BackendError>> + Send;

    /// Fetch every product in a category.
    fn products_by_category(
        &self,
        category: &str,
    ) -> impl Future<Output = Result<Vec<BackendProduct>, BackendError>> + Send;

    /// URL of a product's main image.
    fn image_url(&self, id: ProductId) -> String;

    /// URL of a product's `index`-th sub-image.
    fn sub_image_url(&self, id: ProductId, index: usize) -> String;
}

/// Account endpoints.
pub trait AccountApi: Send + Sync {
    /// Authenticate by mobile number and password.
    fn login(
        &self,
        phone: &Phone,
        password: &SecretString,
    ) -> impl Future<Output = Result<BackendUser, BackendError>> + Send;

    /// Register a new account.
    fn create_user(
        &self,
        user: &NewUser,
    ) -> impl Future<Output = Result<BackendUser, BackendError>> + Send;

    /// List every registered account.
    fn list_users(&self) -> impl Future<Output = Result<Vec<BackendUser>, BackendError>> + Send;
}
