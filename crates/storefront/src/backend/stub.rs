//! In-process backend for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use medicare_core::{Phone, ProductId, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use super::{AccountApi, BackendError, BackendProduct, BackendUser, CatalogApi, NewUser, Page};

/// Canned catalog and account data.
#[derive(Debug, Default)]
pub struct StubBackend {
    pub products: Vec<BackendProduct>,
    /// When set, every catalog call fails with this status.
    pub catalog_status: Option<u16>,
    /// Registered accounts as (phone, password, user).
    pub accounts: Mutex<Vec<(String, String, BackendUser)>>,
    /// When set, login fails with this status.
    pub login_status: Option<u16>,
    pub next_user_id: AtomicI64,
    pub catalog_calls: AtomicUsize,
}

impl StubBackend {
    pub fn with_products(products: Vec<BackendProduct>) -> Self {
        Self {
            products,
            next_user_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    pub fn with_account(self, phone: &str, password: &str, user: BackendUser) -> Self {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.push((phone.to_string(), password.to_string(), user));
        }
        self
    }

    fn catalog_guard(&self) -> Result<(), BackendError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        match self.catalog_status {
            Some(status) => Err(BackendError::Api {
                status,
                message: "Service Unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A backend product with the fields the storefront reads.
pub fn product(id: i64, name: &str, price: i64, category: &str, brand: &str) -> BackendProduct {
    serde_json::from_value(json!({
        "productId": id,
        "productName": name,
        "productPrice": price,
        "productOriginalPrice": price + 10,
        "productDiscount": 10,
        "productCategory": category,
        "productBrand": brand,
        "productMainImage": "present",
        "productStock": 5
    }))
    .unwrap_or_else(|e| panic!("invalid stub product: {e}"))
}

/// A backend user.
pub fn user(id: i64, first_name: &str) -> BackendUser {
    BackendUser {
        user_id: UserId::new(id),
        first_name: Some(first_name.to_string()),
        last_name: None,
        extra: serde_json::Map::new(),
    }
}

impl CatalogApi for StubBackend {
    async fn list_products(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Page<BackendProduct>, BackendError> {
        self.catalog_guard()?;
        let start = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        Ok(Page {
            content: self.products.iter().skip(start).take(size).cloned().collect(),
            total_elements: u64::try_from(self.products.len()).ok(),
            total_pages: None,
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<BackendProduct, BackendError> {
        self.catalog_guard()?;
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
        self.catalog_guard()?;
        Ok(self
            .products
            .iter()
            .filter(|p| p.product_category.as_deref() == Some(category))
            .cloned()
            .collect())
    }

    fn image_url(&self, id: ProductId) -> String {
        format!("http://stub/products/{id}/image")
    }

    fn sub_image_url(&self, id: ProductId, index: usize) -> String {
        format!("http://stub/products/{id}/subimage/{index}")
    }
}

impl AccountApi for StubBackend {
    async fn login(
        &self,
        phone: &Phone,
        password: &SecretString,
    ) -> Result<BackendUser, BackendError> {
        if let Some(status) = self.login_status {
            return Err(BackendError::Api {
                status,
                message: "Internal Server Error".to_string(),
            });
        }
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| BackendError::Parse("poisoned".to_string()))?;
        accounts
            .iter()
            .find(|(p, pw, _)| p == phone.as_str() && pw == password.expose_secret())
            .map(|(_, _, user)| user.clone())
            .ok_or_else(|| BackendError::Api {
                status: 401,
                message: "Invalid mobile or password".to_string(),
            })
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<BackendUser, BackendError> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| BackendError::Parse("poisoned".to_string()))?;
        if accounts
            .iter()
            .any(|(_, _, u)| u.extra.get("email").and_then(|e| e.as_str()) == Some(&new_user.email))
        {
            return Err(BackendError::Api {
                status: 400,
                message: "Email already exists".to_string(),
            });
        }

        let mut extra = serde_json::Map::new();
        extra.insert("email".to_string(), json!(new_user.email));
        extra.insert("phone".to_string(), json!(new_user.phone));
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
            .map_err(|_| BackendError::Parse("poisoned".to_string()))?;
        Ok(accounts.iter().map(|(_, _, u)| u.clone()).collect())
    }
}
