//! Product view types.

use medicare_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::backend::BackendProduct;

/// Image shown when a product has no main image.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/500x400?text=No+Image";

/// Brand shown for products without one.
pub const GENERIC_BRAND: &str = "Generic";

/// Text shown for an empty ingredients or benefits list.
pub const NOT_SPECIFIED: &str = "Not specified.";

/// Text shown for a product without a description.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Variants offered when the backend lists none.
pub const DEFAULT_VARIANTS: [&str; 3] = ["30 tablets", "60 tablets", "90 tablets"];

/// A product card in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub original_price: Option<Price>,
    /// `"N% off"`, or empty when there is no discount.
    pub discount: String,
    pub category: String,
    pub brand: String,
    pub image: String,
    pub prescription_required: bool,
    pub description: Option<String>,
    pub in_stock: bool,
}

impl Product {
    /// Map a backend product to a card, using `image` as its picture.
    #[must_use]
    pub fn from_backend(product: &BackendProduct, image: String) -> Self {
        Self {
            id: product.product_id,
            name: product.product_name.clone(),
            price: product.product_price,
            original_price: product.original_price(),
            discount: discount_label(product.product_discount),
            category: product.product_category.clone().unwrap_or_default(),
            brand: product.brand().unwrap_or_default().to_string(),
            image,
            prescription_required: product.prescription_required.unwrap_or(false),
            description: product.product_description.clone(),
            in_stock: product.in_stock(),
        }
    }

    /// Brand to display, falling back to [`GENERIC_BRAND`].
    #[must_use]
    pub fn display_brand(&self) -> &str {
        if self.brand.is_empty() {
            GENERIC_BRAND
        } else {
            &self.brand
        }
    }
}

fn discount_label(discount: Option<Decimal>) -> String {
    match discount {
        Some(d) if d > Decimal::ZERO => format!("{}% off", d.normalize()),
        _ => String::new(),
    }
}

/// Extra content block shown for some categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CareSection {
    BabyCare,
    MotherCare,
}

impl CareSection {
    /// The section shown for `category`, if any.
    #[must_use]
    pub fn for_category(category: &str) -> Option<Self> {
        match category {
            "Baby Care" => Some(Self::BabyCare),
            "Mother Care" | "Feminine Care" => Some(Self::MotherCare),
            _ => None,
        }
    }
}

/// Everything the product page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    /// Whole-number discount when the old price is above the price.
    pub discount_percent: Option<u32>,
    pub description: String,
    pub ingredients: String,
    pub benefits: String,
    /// Main image first, then one entry per sub-image.
    pub thumbnails: Vec<String>,
    pub variants: Vec<String>,
    pub sizes: Vec<String>,
    pub selected_variant: Option<String>,
    pub selected_size: Option<String>,
    pub care_section: Option<CareSection>,
}

impl ProductDetail {
    /// Select a variant; `false` if the product does not offer it.
    pub fn select_variant(&mut self, variant: &str) -> bool {
        if self.variants.iter().any(|v| v == variant) {
            self.selected_variant = Some(variant.to_string());
            true
        } else {
            false
        }
    }

    /// Select a size; `false` if the product does not offer it.
    pub fn select_size(&mut self, size: &str) -> bool {
        if self.sizes.iter().any(|s| s == size) {
            self.selected_size = Some(size.to_string());
            true
        } else {
            false
        }
    }
}
