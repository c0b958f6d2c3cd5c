//! Storefront state and command dispatch.
//!
//! [`Storefront`] owns every service and the backend client. Commands are
//! applied through `&mut self`, so they are handled one at a time.

use std::path::Path;
use std::sync::Arc;

use medicare_core::ProductId;
use tracing::{error, info, instrument, warn};

use crate::backend::{AccountApi, BackendError, CatalogApi};
use crate::commands::{Command, Event};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, Severity};
use crate::models::{CartItem, Product, ProductDetail};
use crate::services::catalog;
use crate::services::prescription::{self, UPLOADED_MESSAGE};
use crate::services::{
    CartManager, CatalogView, Preferences, PrescriptionStore, SessionManager, UploadModal,
};
use crate::storage::{FileStore, Repository, StorageError};

/// Shown when a prescription is submitted before its file has been read.
const STILL_READING_MESSAGE: &str = "Please wait for the file to finish loading.";

/// Shown when the upload dialog is used while closed.
const NO_UPLOAD_MESSAGE: &str = "Open the prescription upload first.";

/// Client-side storefront state.
pub struct Storefront<B> {
    config: StorefrontConfig,
    backend: B,
    cart: CartManager,
    session: SessionManager,
    catalog: CatalogView,
    detail: Option<ProductDetail>,
    prescriptions: PrescriptionStore,
    upload: UploadModal,
    preferences: Preferences,
}

impl<B> std::fmt::Debug for Storefront<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cart_count", &self.cart.total_count())
            .field("catalog", &self.catalog.catalog().len())
            .field("upload", &self.upload)
            .finish_non_exhaustive()
    }
}

impl<B: CatalogApi + AccountApi> Storefront<B> {
    /// Open the storefront over the file stores in the configured data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be opened.
    pub fn open(config: StorefrontConfig, backend: B) -> std::result::Result<Self, StorageError> {
        let durable = open_store(&config.durable_store_path())?;
        let session = open_store(&config.session_store_path())?;
        Ok(Self::with_repositories(config, backend, durable, session))
    }

    /// Create a storefront whose state lives only in memory.
    #[must_use]
    pub fn in_memory(config: StorefrontConfig, backend: B) -> Self {
        Self::with_repositories(config, backend, Repository::in_memory(), Repository::in_memory())
    }

    /// Create a storefront over explicit durable and session repositories.
    #[must_use]
    pub fn with_repositories(
        config: StorefrontConfig,
        backend: B,
        durable: Repository,
        session: Repository,
    ) -> Self {
        Self {
            config,
            backend,
            cart: CartManager::load(durable.clone()),
            session: SessionManager::new(session),
            catalog: CatalogView::new(),
            detail: None,
            prescriptions: PrescriptionStore::new(durable.clone()),
            upload: UploadModal::default(),
            preferences: Preferences::new(durable),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogView {
        &self.catalog
    }

    /// The product page loaded by the last `ViewProduct`.
    #[must_use]
    pub const fn detail(&self) -> Option<&ProductDetail> {
        self.detail.as_ref()
    }

    #[must_use]
    pub const fn prescriptions(&self) -> &PrescriptionStore {
        &self.prescriptions
    }

    #[must_use]
    pub const fn upload(&self) -> &UploadModal {
        &self.upload
    }

    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Apply a command, turning any failure into a [`Event::Notice`].
    pub async fn dispatch(&mut self, command: Command) -> Vec<Event> {
        match self.try_dispatch(command).await {
            Ok(events) => events,
            Err(err) => {
                let notice = err.notice();
                match notice.severity {
                    Severity::Inline => info!(error = %err, "Command rejected"),
                    Severity::Log => error!(error = %err, "Command failed"),
                    Severity::Alert | Severity::Blocking => warn!(error = %err, "Command failed"),
                }
                vec![Event::Notice(notice)]
            }
        }
    }

    /// Apply a command.
    ///
    /// # Errors
    ///
    /// Returns the [`AppError`] that stopped the command. State committed
    /// before the failure is kept.
    #[instrument(skip(self))]
    pub async fn try_dispatch(&mut self, command: Command) -> Result<Vec<Event>> {
        match command {
            Command::AddToCart {
                product_id,
                variant,
                size,
            } => self.add_to_cart(product_id, variant, size).await,
            Command::BuyNow {
                product_id,
                variant,
                size,
            } => {
                let mut events = self.add_to_cart(product_id, variant, size).await?;
                events.push(Event::NavigateToCheckout);
                Ok(events)
            }
            Command::ClearCart => {
                self.cart.clear()?;
                Ok(vec![Event::CartCleared, Event::CartCountChanged(0)])
            }
            Command::FetchCatalog => {
                let page_size = self.config.catalog_page_size;
                let visible = self.catalog.fetch_all(&self.backend, page_size).await;
                Ok(vec![Event::CatalogUpdated(visible.to_vec())])
            }
            Command::SelectCategory(category) => {
                let visible = self.catalog.select_category(&self.backend, &category).await;
                Ok(vec![Event::CatalogUpdated(visible.to_vec())])
            }
            Command::SetBrandFilter(brands) => {
                let visible = self.catalog.set_brands(brands);
                Ok(vec![Event::CatalogUpdated(visible.to_vec())])
            }
            Command::SetSort(sort) => {
                let visible = self.catalog.set_sort(sort);
                Ok(vec![Event::CatalogUpdated(visible.to_vec())])
            }
            Command::ViewProduct(id) => self.view_product(id).await,
            Command::Login(credentials) => {
                let user = self.session.login(&self.backend, &credentials).await?;
                Ok(vec![Event::LoggedIn(Box::new(user))])
            }
            Command::Signup(form) => {
                let user = self.session.signup(&self.backend, &form).await?;
                Ok(vec![Event::LoggedIn(Box::new(user))])
            }
            Command::Logout => {
                self.session.logout()?;
                Ok(vec![Event::LoggedOut])
            }
            Command::OpenPrescription(id) => {
                self.upload.open(id);
                Ok(vec![Event::UploadOpened(id)])
            }
            Command::CapturePrescription { path } => self.capture_prescription(&path).await,
            Command::SubmitPrescription => self.submit_prescription(),
            Command::CancelPrescription => {
                self.upload.cancel();
                Ok(vec![Event::UploadClosed])
            }
            Command::SetPincode(raw) => {
                let estimate = self.preferences.set_pincode(&raw)?;
                Ok(vec![Event::DeliveryEstimate {
                    pincode: raw.trim().to_string(),
                    estimate,
                }])
            }
            Command::SetLanguage(choice) => {
                let locale = self.preferences.set_language(&choice)?;
                Ok(vec![Event::LanguageChanged(locale)])
            }
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Find a product in the loaded catalog, the open product page, or the
    /// backend.
    async fn resolve_product(&self, id: ProductId) -> Result<Product> {
        if let Some(product) = self.catalog.find(id) {
            return Ok(product.clone());
        }
        if let Some(detail) = self.detail.as_ref().filter(|d| d.product.id == id) {
            return Ok(detail.product.clone());
        }
        match self.backend.get_product(id).await {
            Ok(product) => Ok(Product::from_backend(
                &product,
                catalog::detail::card_image(&self.backend, &product),
            )),
            Err(BackendError::NotFound(_)) => Err(AppError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn add_to_cart(
        &mut self,
        id: ProductId,
        variant: Option<String>,
        size: Option<String>,
    ) -> Result<Vec<Event>> {
        let product = self.resolve_product(id).await?;
        if !product.in_stock {
            return Err(AppError::OutOfStock(id.to_string()));
        }

        let item = match self.detail.as_ref().filter(|d| d.product.id == id) {
            Some(detail) => CartItem::from_detail(detail, variant, size),
            None => CartItem::from_product(&product, variant, size),
        };
        let message = match &item.size {
            Some(size) => format!("{} ({size}) added to cart!", item.name),
            None => format!("{} added to cart!", item.name),
        };
        let name = item.name.clone();

        let quantity = self.cart.add_or_increment(item)?;
        info!(product_id = %id, quantity, "Added to cart");

        Ok(vec![
            Event::AddedToCart {
                product_id: id,
                name,
                quantity,
            },
            Event::CartCountChanged(self.cart.total_count()),
            Event::Message(message),
        ])
    }

    // =========================================================================
    // Product page
    // =========================================================================

    async fn view_product(&mut self, id: ProductId) -> Result<Vec<Event>> {
        let detail = catalog::load_detail(&self.backend, id).await?;
        let related =
            catalog::related(&self.backend, &detail.product.category, detail.product.id).await;
        self.detail = Some(detail.clone());
        Ok(vec![Event::ProductLoaded {
            detail: Box::new(detail),
            related,
        }])
    }

    // =========================================================================
    // Prescriptions
    // =========================================================================

    async fn capture_prescription(&mut self, path: &Path) -> Result<Vec<Event>> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.upload.begin_read(file_name) {
            return Err(AppError::InvalidState(NO_UPLOAD_MESSAGE.to_string()));
        }

        match prescription::capture(path).await {
            Ok(file) => {
                self.upload.finish_read(file.clone());
                Ok(vec![Event::PrescriptionPreview(file)])
            }
            Err(e) => {
                self.upload.fail_read();
                Err(e.into())
            }
        }
    }

    fn submit_prescription(&mut self) -> Result<Vec<Event>> {
        let Some(product_id) = self.upload.product_id() else {
            return Err(AppError::InvalidState(NO_UPLOAD_MESSAGE.to_string()));
        };
        if self.upload.is_reading() {
            return Err(AppError::InvalidState(STILL_READING_MESSAGE.to_string()));
        }

        let (file_name, data_url) = self
            .upload
            .ready_file()
            .cloned()
            .map(|f| (Some(f.file_name), f.data_url))
            .unwrap_or_default();
        let prescription =
            self.prescriptions
                .commit(product_id, file_name.as_deref(), data_url)?;
        self.upload.cancel();

        Ok(vec![
            Event::PrescriptionSaved {
                product_id,
                prescription,
            },
            Event::UploadClosed,
            Event::Message(UPLOADED_MESSAGE.to_string()),
        ])
    }
}

fn open_store(path: &Path) -> std::result::Result<Repository, StorageError> {
    Ok(Repository::new(Arc::new(FileStore::open(path)?)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::BackendProduct;
    use crate::backend::stub::{StubBackend, product, user};
    use crate::models::Credentials;
    use crate::services::prescription::MISSING_FILE_MESSAGE;

    fn out_of_stock(id: i64) -> BackendProduct {
        serde_json::from_value(json!({
            "productId": id,
            "productName": "Sold Out Syrup",
            "productPrice": 80,
            "productStock": 0
        }))
        .unwrap()
    }

    fn storefront() -> Storefront<StubBackend> {
        let backend = StubBackend::with_products(vec![
            product(1, "Crocin", 30, "Pain Relief", "GSK"),
            product(2, "Cerelac", 250, "Baby Care", "Nestle"),
            out_of_stock(3),
        ])
        .with_account("9876543210", "secret1", user(7, "Meera"));
        Storefront::in_memory(StorefrontConfig::default(), backend)
    }

    fn notice(events: &[Event]) -> &crate::error::Notice {
        match events {
            [Event::Notice(notice)] => notice,
            other => panic!("expected a single notice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_to_cart_resolves_from_backend() {
        let mut store = storefront();
        let events = store
            .dispatch(Command::AddToCart {
                product_id: ProductId::new(2),
                variant: None,
                size: Some("Large".to_string()),
            })
            .await;

        assert!(events.contains(&Event::CartCountChanged(1)));
        assert!(events.contains(&Event::Message("Cerelac (Large) added to cart!".to_string())));
        assert_eq!(store.cart().lines().len(), 1);
    }

    #[tokio::test]
    async fn test_add_twice_merges() {
        let mut store = storefront();
        store.dispatch(Command::FetchCatalog).await;
        for _ in 0..2 {
            store
                .dispatch(Command::AddToCart {
                    product_id: ProductId::new(1),
                    variant: None,
                    size: None,
                })
                .await;
        }
        assert_eq!(store.cart().lines().len(), 1);
        assert_eq!(store.cart().total_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_and_out_of_stock_block() {
        let mut store = storefront();
        let events = store
            .dispatch(Command::AddToCart {
                product_id: ProductId::new(99),
                variant: None,
                size: None,
            })
            .await;
        assert_eq!(notice(&events).message, "Product not found");
        assert_eq!(notice(&events).severity, Severity::Blocking);

        let events = store
            .dispatch(Command::AddToCart {
                product_id: ProductId::new(3),
                variant: None,
                size: None,
            })
            .await;
        assert_eq!(notice(&events).message, "Product is out of stock");
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_buy_now_uses_selected_variant() {
        let mut store = storefront();
        store.dispatch(Command::ViewProduct(ProductId::new(1))).await;
        assert_eq!(store.detail().unwrap().product.id, ProductId::new(1));

        let events = store
            .dispatch(Command::BuyNow {
                product_id: ProductId::new(1),
                variant: None,
                size: None,
            })
            .await;
        assert_eq!(events.last(), Some(&Event::NavigateToCheckout));
        assert_eq!(
            store.cart().lines().first().unwrap().variant.as_deref(),
            Some("30 tablets")
        );
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let mut store = storefront();
        let events = store
            .dispatch(Command::Login(Credentials::new("9876543210", "wrong")))
            .await;
        assert_eq!(notice(&events).severity, Severity::Inline);

        let events = store
            .dispatch(Command::Login(Credentials::new("9876543210", "secret1")))
            .await;
        assert!(matches!(events.as_slice(), [Event::LoggedIn(_)]));
        assert!(store.session().is_valid());

        store.dispatch(Command::Logout).await;
        assert!(!store.session().is_valid());
    }

    #[tokio::test]
    async fn test_submit_without_file_is_rejected() {
        let mut store = storefront();
        let events = store.dispatch(Command::SubmitPrescription).await;
        assert_eq!(notice(&events).message, NO_UPLOAD_MESSAGE);

        store.dispatch(Command::OpenPrescription(ProductId::new(1))).await;
        let events = store.dispatch(Command::SubmitPrescription).await;
        assert_eq!(notice(&events).message, MISSING_FILE_MESSAGE);
        assert!(store.upload().is_open());
    }

    #[tokio::test]
    async fn test_prescription_upload_flow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let mut store = storefront();
        store.dispatch(Command::OpenPrescription(ProductId::new(2))).await;
        let events = store
            .dispatch(Command::CapturePrescription { path: path.clone() })
            .await;
        assert!(matches!(events.as_slice(), [Event::PrescriptionPreview(_)]));

        let events = store.dispatch(Command::SubmitPrescription).await;
        assert!(events.contains(&Event::Message(UPLOADED_MESSAGE.to_string())));
        assert!(!store.upload().is_open());
        assert_eq!(
            store.prescriptions().get(ProductId::new(2)).unwrap().file_name,
            "rx.pdf"
        );
    }

    #[tokio::test]
    async fn test_image_upload_keeps_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.png");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();

        let mut store = storefront();
        store.dispatch(Command::OpenPrescription(ProductId::new(1))).await;
        store.dispatch(Command::CapturePrescription { path }).await;
        store.dispatch(Command::SubmitPrescription).await;

        let saved = store.prescriptions().get(ProductId::new(1)).unwrap();
        assert_eq!(saved.file_name, "rx.png");
        assert!(
            saved
                .data_url
                .as_deref()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[tokio::test]
    async fn test_failed_capture_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = storefront();
        store.dispatch(Command::OpenPrescription(ProductId::new(2))).await;

        let events = store
            .dispatch(Command::CapturePrescription {
                path: dir.path().join("missing.png"),
            })
            .await;
        assert_eq!(notice(&events).severity, Severity::Alert);
        assert!(store.upload().is_open());
        assert!(!store.upload().is_reading());
    }

    #[tokio::test]
    async fn test_preferences_commands() {
        let mut store = storefront();
        let events = store.dispatch(Command::SetPincode("560001".to_string())).await;
        assert!(matches!(
            events.as_slice(),
            [Event::DeliveryEstimate { pincode, .. }] if pincode == "560001"
        ));

        let events = store.dispatch(Command::SetPincode("56".to_string())).await;
        assert_eq!(notice(&events).severity, Severity::Inline);

        let events = store.dispatch(Command::SetLanguage("Hindi".to_string())).await;
        assert_eq!(events, vec![Event::LanguageChanged(medicare_core::Locale::Hi)]);
    }

    #[tokio::test]
    async fn test_catalog_commands_update_listing() {
        let mut store = storefront();
        let events = store.dispatch(Command::FetchCatalog).await;
        assert!(matches!(events.as_slice(), [Event::CatalogUpdated(p)] if p.len() == 3));

        let events = store
            .dispatch(Command::SetBrandFilter(vec!["Nestle".to_string()]))
            .await;
        assert!(matches!(events.as_slice(), [Event::CatalogUpdated(p)] if p.len() == 1));

        let events = store.dispatch(Command::SelectCategory("Pain Relief".to_string())).await;
        assert!(matches!(events.as_slice(), [Event::CatalogUpdated(p)] if p.is_empty()));
    }
}
