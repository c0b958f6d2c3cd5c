//! Integration tests for the MediCare storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Offline flows against an in-process backend
//! cargo test -p medicare-integration-tests
//!
//! # Live backend tests
//! MEDICARE_API_BASE_URL=http://localhost:8083/api \
//!     cargo test -p medicare-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_flows` - Command flows over file-backed stores
//! - `live_backend` - `BackendClient` against a running backend

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use medicare_core::{Phone, ProductId, UserId};
use medicare_storefront::backend::{BackendProduct, BackendUser, NewUser, Page};
use medicare_storefront::{AccountApi, BackendError, CatalogApi, Storefront, StorefrontConfig};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

/// Backend serving a fixed catalog and an in-memory account list.
#[derive(Debug)]
pub struct FakeBackend {
    products: Vec<BackendProduct>,
    accounts: Mutex<Vec<(String, String, BackendUser)>>,
    next_user_id: AtomicI64,
}

impl FakeBackend {
    #[must_use]
    pub fn new(products: Vec<BackendProduct>) -> Self {
        Self {
            products,
            accounts: Mutex::new(Vec::new()),
            next_user_id: AtomicI64::new(1),
        }
    }

    /// The pharmacy catalog used by most tests.
    #[must_use]
    pub fn pharmacy() -> Self {
        Self::new(vec![
            product(json!({
                "productId": 1, "productName": "Crocin Advance", "productPrice": 30,
                "productOriginalPrice": 35, "productDiscount": 14,
                "productCategory": "Pain Relief", "productBrand": "GSK",
                "productMainImage": "img", "productStock": 20
            })),
            product(json!({
                "productId": 2, "productName": "Volini Gel", "productPrice": 120,
                "productOriginalPrice": 150, "productDiscount": 20,
                "productCategory": "Pain Relief", "productBrand": "Sun Pharma",
                "productMainImage": "img", "productStock": 8
            })),
            product(json!({
                "productId": 3, "productName": "Azithral 500", "productPrice": 110,
                "productCategory": "Antibiotics", "productBrand": "Alembic",
                "prescriptionRequired": true, "productMainImage": "img", "productStock": 4
            })),
            product(json!({
                "productId": 4, "productName": "Cerelac Wheat", "productPrice": 250,
                "productOldPrice": 280, "productCategory": "Baby Care",
                "brandName": "Nestle", "productSizes": ["300g", "1kg"], "productStock": 12
            })),
            product(json!({
                "productId": 5, "productName": "Moov Spray", "productPrice": 180,
                "productCategory": "Pain Relief", "productBrand": "Reckitt",
                "productStock": 0
            })),
        ])
    }
}

fn product(value: serde_json::Value) -> BackendProduct {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("invalid test product: {e}"))
}

fn rejected(status: u16, message: &str) -> BackendError {
    BackendError::Api {
        status,
        message: message.to_string(),
    }
}

impl CatalogApi for FakeBackend {
    async fn list_products(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Page<BackendProduct>, BackendError> {
        let start = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        Ok(Page {
            content: self.products.iter().skip(start).take(size).cloned().collect(),
            total_elements: u64::try_from(self.products.len()).ok(),
            total_pages: Some(1),
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<BackendProduct, BackendError> {
        self.products
            .iter()
            .find(|p| p.product_id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("products/get-product/{id}")))
    }

    async fn products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<BackendProduct>, BackendError> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.product_category.as_deref() == Some(category))
            .cloned()
            .collect())
    }

    fn image_url(&self, id: ProductId) -> String {
        format!("http://fake/api/products/{id}/image")
    }

    fn sub_image_url(&self, id: ProductId, index: usize) -> String {
        format!("http://fake/api/products/{id}/subimage/{index}")
    }
}

impl AccountApi for FakeBackend {
    async fn login(
        &self,
        phone: &Phone,
        password: &SecretString,
    ) -> Result<BackendUser, BackendError> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| rejected(500, "account list poisoned"))?;
        accounts
            .iter()
            .find(|(p, pw, _)| p == phone.as_str() && pw == password.expose_secret())
            .map(|(_, _, user)| user.clone())
            .ok_or_else(|| rejected(401, "Invalid mobile or password"))
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<BackendUser, BackendError> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| rejected(500, "account list poisoned"))?;
        let email_taken = accounts
            .iter()
            .any(|(_, _, u)| u.extra.get("email").and_then(|e| e.as_str()) == Some(&new_user.email));
        if email_taken {
            return Err(rejected(400, "Email already exists"));
        }

        let mut extra = serde_json::Map::new();
        extra.insert("email".to_string(), json!(new_user.email));
        let user = BackendUser {
            user_id: UserId::new(self.next_user_id.fetch_add(1, Ordering::SeqCst)),
            first_name: Some(new_user.first_name.clone()),
            last_name: Some(new_user.last_name.clone()),
            extra,
        };
        accounts.push((
            new_user.phone.clone(),
            new_user.password.expose_secret().to_string(),
            user.clone(),
        ));
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<BackendUser>, BackendError> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| rejected(500, "account list poisoned"))?;
        Ok(accounts.iter().map(|(_, _, u)| u.clone()).collect())
    }
}

/// A storefront over file stores in a temporary data directory.
pub struct TestContext {
    pub dir: tempfile::TempDir,
    pub config: StorefrontConfig,
}

impl TestContext {
    /// Create a context with an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let config = StorefrontConfig {
            data_dir: dir.path().join("data"),
            ..StorefrontConfig::default()
        };
        Self { dir, config }
    }

    /// Open a storefront over this context's stores.
    ///
    /// # Panics
    ///
    /// Panics if the stores cannot be opened.
    #[must_use]
    pub fn open(&self, backend: FakeBackend) -> Storefront<FakeBackend> {
        Storefront::open(self.config.clone(), backend)
            .unwrap_or_else(|e| panic!("open storefront: {e}"))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
