//! Cart line types.

use medicare_core::{Price, ProductId};
use serde::{Deserialize, Deserializer, Serialize};

use super::product::{Product, ProductDetail};

/// Key two cart lines are merged on.
///
/// The same product in a different variant or size is a different line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub product_id: ProductId,
    pub variant: Option<String>,
    pub size: Option<String>,
}

/// One line of the persisted cart.
///
/// Serialized with the field names the `cart` key has always used, so an
/// existing cart survives upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(deserialize_with = "number_or_string")]
    pub id: ProductId,
    pub name: String,
    /// Unit price.
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub prescription_required: bool,
}

const fn default_quantity() -> u32 {
    1
}

/// Product pages have historically stored the ID as a string.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProductId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(id) => Ok(ProductId::new(id)),
        Raw::Text(id) => id.parse().map_err(serde::de::Error::custom),
    }
}

impl CartLine {
    /// The key this line merges on.
    #[must_use]
    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            product_id: self.id,
            variant: self.variant.clone(),
            size: self.size.clone(),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::new(self.price.amount() * rust_decimal::Decimal::from(self.quantity))
    }
}

/// A product as it is about to be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub image: Option<String>,
    pub variant: Option<String>,
    pub size: Option<String>,
    pub prescription_required: bool,
}

impl CartItem {
    /// Build an item from a catalog card.
    #[must_use]
    pub fn from_product(product: &Product, variant: Option<String>, size: Option<String>) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            original_price: product.original_price,
            image: Some(product.image.clone()),
            variant,
            size,
            prescription_required: product.prescription_required,
        }
    }

    /// Build an item from a detail view, defaulting to its selected options.
    #[must_use]
    pub fn from_detail(
        detail: &ProductDetail,
        variant: Option<String>,
        size: Option<String>,
    ) -> Self {
        Self::from_product(
            &detail.product,
            variant.or_else(|| detail.selected_variant.clone()),
            size.or_else(|| detail.selected_size.clone()),
        )
    }

    /// The key this item merges on.
    #[must_use]
    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            product_id: self.id,
            variant: self.variant.clone(),
            size: self.size.clone(),
        }
    }

    /// A fresh cart line with quantity 1.
    #[must_use]
    pub fn into_line(self) -> CartLine {
        CartLine {
            id: self.id,
            name: self.name,
            price: self.price,
            original_price: self.original_price,
            image: self.image,
            quantity: 1,
            variant: self.variant,
            size: self.size,
            prescription_required: self.prescription_required,
        }
    }
}
