//! HTTP client for the pharmacy backend.
//!
//! Uses `reqwest` 0.13 for HTTP. Product lookups are cached using `moka`
//! for the configured TTL; account calls are never cached.

use std::sync::Arc;
use std::time::Duration;

use medicare_core::{Phone, ProductId};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

use super::cache::{CacheKey, CacheValue};
use super::types::{BackendProduct, BackendUser, NewUser, Page};
use super::{AccountApi, BackendError, CatalogApi};

/// How much of an unexpected response body to keep in logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the pharmacy backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    /// API base URL, always ending in `/` so relative joins keep its path.
    base: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("medicare-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base: with_trailing_slash(config.api_base_url.clone()),
                cache: build_cache(config.product_cache_ttl),
            }),
        })
    }

    /// The API base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Drop every cached product response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        read_json(response, &url).await
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let hit = self.inner.cache.get(key).await;
        if hit.is_some() {
            debug!(?key, "Cache hit");
        }
        hit
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn build_cache(ttl: Duration) -> Cache<CacheKey, CacheValue> {
    if ttl.is_zero() {
        return Cache::builder().max_capacity(0).build();
    }
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(ttl)
        .build()
}

/// Decode a response body, mapping non-success statuses to errors.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &Url,
) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound(url.path().to_string()));
    }

    if !status.is_success() {
        tracing::error!(
            status = %status,
            path = %url.path(),
            body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            path = %url.path(),
            body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
            "Failed to parse backend response"
        );
        BackendError::Parse(e.to_string())
    })
}

/// Pull a human-readable message out of an error body.
///
/// Prefers the JSON `error` (then `message`) field, then the body text
/// itself, then the status reason phrase. HTML error pages are skipped.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["error", "message"] {
            if let Some(serde_json::Value::String(message)) = map.get(field)
                && !message.is_empty()
            {
                return message.clone();
            }
        }
    }

    let text = body.trim();
    if !text.is_empty() && !text.starts_with('<') {
        return text.to_string();
    }

    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}

// =============================================================================
// Catalog
// =============================================================================

impl CatalogApi for BackendClient {
    #[instrument(skip(self))]
    async fn list_products(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Page<BackendProduct>, BackendError> {
        let key = CacheKey::Products { page, size };
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            return Ok(products);
        }

        let mut url = self.endpoint("products/get-all-products")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());

        let products: Page<BackendProduct> = self.get_json(url).await?;
        debug!(count = products.content.len(), "Fetched product page");

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<BackendProduct, BackendError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/get-product/{id}"))?;
        let product: BackendProduct = self.get_json(url).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<BackendProduct>, BackendError> {
        let key = CacheKey::Category(category.to_string());
        if let Some(CacheValue::Category(products)) = self.cached(&key).await {
            return Ok(products);
        }

        let url = self.endpoint(&format!(
            "products/get-by-category/{}",
            urlencoding::encode(category)
        ))?;
        let products: Vec<BackendProduct> = self.get_json(url).await?;
        debug!(count = products.len(), "Fetched category");

        self.inner
            .cache
            .insert(key, CacheValue::Category(products.clone()))
            .await;

        Ok(products)
    }

    fn image_url(&self, id: ProductId) -> String {
        format!("{}products/{id}/image", self.inner.base)
    }

    fn sub_image_url(&self, id: ProductId, index: usize) -> String {
        format!("{}products/{id}/subimage/{index}", self.inner.base)
    }
}

// =============================================================================
// Accounts
// =============================================================================

impl AccountApi for BackendClient {
    #[instrument(skip(self, password), fields(phone = %phone))]
    async fn login(
        &self,
        phone: &Phone,
        password: &SecretString,
    ) -> Result<BackendUser, BackendError> {
        let mut url = self.endpoint("users/login")?;
        url.query_pairs_mut()
            .append_pair("mobile", phone.as_str())
            .append_pair("password", password.expose_secret());

        let response = self.inner.client.post(url.clone()).send().await?;
        let user: BackendUser = read_json(response, &url).await?;
        Ok(user.without_secrets())
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &NewUser) -> Result<BackendUser, BackendError> {
        let url = self.endpoint("users/create-user")?;
        let response = self
            .inner
            .client
            .post(url.clone())
            .json(user)
            .send()
            .await?;
        let created: BackendUser = read_json(response, &url).await?;
        Ok(created.without_secrets())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<BackendUser>, BackendError> {
        let url = self.endpoint("users/get-all-users")?;
        let users: Vec<BackendUser> = self.get_json(url).await?;
        Ok(users.into_iter().map(BackendUser::without_secrets).collect())
    }
}
