//! Commands accepted by the storefront and the events they produce.
//!
//! A front end turns user interactions into [`Command`]s and renders the
//! resulting [`Event`]s. See [`crate::state::Storefront::dispatch`].

use std::path::PathBuf;

use medicare_core::{DeliveryEstimate, Locale, ProductId};

use crate::backend::BackendUser;
use crate::error::Notice;
use crate::models::{Credentials, Prescription, PrescriptionFile, Product, ProductDetail, SignupForm};
use crate::services::catalog::SortMode;

/// A user interaction.
#[derive(Debug, Clone)]
pub enum Command {
    /// Add one unit of a product to the cart.
    AddToCart {
        product_id: ProductId,
        variant: Option<String>,
        size: Option<String>,
    },
    ClearCart,
    /// Load the first page of the catalog.
    FetchCatalog,
    /// Load one category.
    SelectCategory(String),
    /// Show only these brands; empty shows all.
    SetBrandFilter(Vec<String>),
    SetSort(SortMode),
    /// Load the product page and its related products.
    ViewProduct(ProductId),
    Login(Credentials),
    Signup(Box<SignupForm>),
    Logout,
    /// Open the prescription upload dialog for a product.
    OpenPrescription(ProductId),
    /// Read a prescription file into the open dialog.
    CapturePrescription { path: PathBuf },
    /// Store the file chosen in the open dialog.
    SubmitPrescription,
    CancelPrescription,
    SetPincode(String),
    SetLanguage(String),
    /// Add a product to the cart and continue to checkout.
    BuyNow {
        product_id: ProductId,
        variant: Option<String>,
        size: Option<String>,
    },
}

/// Something the front end should reflect.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Total item count for the header badge.
    CartCountChanged(u32),
    /// A cart line now has `quantity` units.
    AddedToCart {
        product_id: ProductId,
        name: String,
        quantity: u32,
    },
    CartCleared,
    /// The visible catalog listing changed.
    CatalogUpdated(Vec<Product>),
    ProductLoaded {
        detail: Box<ProductDetail>,
        related: Vec<Product>,
    },
    LoggedIn(Box<BackendUser>),
    LoggedOut,
    UploadOpened(ProductId),
    /// A file was read and can be submitted.
    PrescriptionPreview(PrescriptionFile),
    PrescriptionSaved {
        product_id: ProductId,
        prescription: Prescription,
    },
    UploadClosed,
    DeliveryEstimate {
        pincode: String,
        estimate: DeliveryEstimate,
    },
    LanguageChanged(Locale),
    /// Continue to the checkout page.
    NavigateToCheckout,
    /// Confirmation text for a completed action.
    Message(String),
    /// A failed command.
    Notice(Notice),
}

impl Event {
    /// Whether this event reports a failure.
    #[must_use]
    pub const fn is_notice(&self) -> bool {
        matches!(self, Self::Notice(_))
    }
}
