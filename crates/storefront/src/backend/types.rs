//! Wire types for the pharmacy backend.
//!
//! Field names follow the backend's camelCase JSON. Most product fields are
//! optional because the backend omits or nulls them freely.

use medicare_core::{Price, ProductId, UserId};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Pagination
// =============================================================================

/// A page of results from a paged endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Total number of items across all pages, when reported.
    #[serde(default)]
    pub total_elements: Option<u64>,
    /// Total number of pages, when reported.
    #[serde(default)]
    pub total_pages: Option<u32>,
}

// =============================================================================
// Products
// =============================================================================

/// A list field the backend sends either as an array or as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextList {
    /// Array of entries.
    Items(Vec<String>),
    /// Pre-formatted text.
    Text(String),
}

impl TextList {
    /// Render as display text, joining arrays with ", ".
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Items(items) => items.join(", "),
            Self::Text(text) => text.clone(),
        }
    }
}

/// A product as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_price: Price,
    /// Pre-discount price (listing endpoints).
    #[serde(default)]
    pub product_original_price: Option<Price>,
    /// Pre-discount price (detail endpoint).
    #[serde(default)]
    pub product_old_price: Option<Price>,
    /// Discount percentage.
    #[serde(default)]
    pub product_discount: Option<Decimal>,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub product_brand: Option<String>,
    /// Brand as reported by some endpoints instead of `productBrand`.
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub prescription_required: Option<bool>,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub product_stock: Option<i64>,
    /// Image payload; only its presence matters to the client.
    #[serde(default)]
    pub product_main_image: Option<serde_json::Value>,
    #[serde(default)]
    pub product_sub_images: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub product_sizes: Option<Vec<String>>,
    #[serde(default)]
    pub ingredients_list: Option<TextList>,
    #[serde(default)]
    pub benefits_list: Option<TextList>,
}

impl BackendProduct {
    /// Pre-discount price from whichever field the endpoint populated.
    #[must_use]
    pub fn original_price(&self) -> Option<Price> {
        self.product_original_price.or(self.product_old_price)
    }

    /// Brand from whichever field the endpoint populated.
    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.product_brand
            .as_deref()
            .or(self.brand_name.as_deref())
            .filter(|b| !b.is_empty())
    }

    /// Whether the product has a main image worth requesting.
    #[must_use]
    pub fn has_main_image(&self) -> bool {
        match &self.product_main_image {
            None | Some(serde_json::Value::Null | serde_json::Value::Bool(false)) => false,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(serde_json::Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// Number of sub-images.
    #[must_use]
    pub fn sub_image_count(&self) -> usize {
        self.product_sub_images.as_ref().map_or(0, Vec::len)
    }

    /// Whether at least one unit is in stock.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.product_stock.unwrap_or(0) > 0
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// A user account as returned by the backend.
///
/// Only `userId` and the display names are interpreted; everything else is
/// kept verbatim so the stored session record matches what the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => format!("user {}", self.user_id),
        }
    }

    /// Drop credential material the backend may echo back.
    #[must_use]
    pub fn without_secrets(mut self) -> Self {
        self.extra.remove("password");
        self
    }
}

/// Signup payload for `users/create-user`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    pub address_landmark: String,
    pub address_area: String,
    pub address_city: String,
    pub address_pincode: String,
    pub address_state: String,
    pub address_country: String,
    pub address_type: String,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_with_sparse_fields() {
        let product: BackendProduct = serde_json::from_value(json!({
            "productId": 12,
            "productName": "Paracetamol 500mg",
            "productPrice": 30.5,
            "productSubImages": null,
            "productStock": 0
        }))
        .unwrap();

        assert_eq!(product.product_id, ProductId::new(12));
        assert!(!product.in_stock());
        assert!(!product.has_main_image());
        assert_eq!(product.sub_image_count(), 0);
        assert_eq!(product.original_price(), None);
        assert_eq!(product.brand(), None);
    }

    #[test]
    fn test_original_price_falls_back_to_old_price() {
        let product: BackendProduct = serde_json::from_value(json!({
            "productId": 1,
            "productName": "Cough Syrup",
            "productPrice": 90,
            "productOldPrice": 120,
            "brandName": "Acme"
        }))
        .unwrap();

        assert_eq!(
            product.original_price(),
            Some(Price::new(Decimal::new(120, 0)))
        );
        assert_eq!(product.brand(), Some("Acme"));
    }

    #[test]
    fn test_text_list_accepts_both_shapes() {
        let items: TextList = serde_json::from_value(json!(["Menthol", "Eucalyptus"])).unwrap();
        assert_eq!(items.to_text(), "Menthol, Eucalyptus");

        let text: TextList = serde_json::from_value(json!("Menthol")).unwrap();
        assert_eq!(text.to_text(), "Menthol");
    }

    #[test]
    fn test_user_keeps_unknown_fields() {
        let user: BackendUser = serde_json::from_value(json!({
            "userId": 5,
            "firstName": "Asha",
            "addressCity": "Pune",
            "password": "hunter22"
        }))
        .unwrap();

        let user = user.without_secrets();
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["addressCity"], "Pune");
        assert_eq!(value["userId"], 5);
        assert!(value.get("password").is_none());
        assert_eq!(user.display_name(), "Asha");
    }

    #[test]
    fn test_new_user_serializes_password() {
        let user = NewUser {
            first_name: "Asha".to_string(),
            last_name: "Patil".to_string(),
            email: "asha@example.in".to_string(),
            phone: "9876543210".to_string(),
            password: SecretString::from("s3cret!"),
            address_landmark: "Near temple".to_string(),
            address_area: "Kothrud".to_string(),
            address_city: "Pune".to_string(),
            address_pincode: "411038".to_string(),
            address_state: "Maharashtra".to_string(),
            address_country: "India".to_string(),
            address_type: "home".to_string(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["password"], "s3cret!");
        assert_eq!(value["addressPincode"], "411038");
    }
}
