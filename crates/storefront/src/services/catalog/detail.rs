//! Product page assembly.

use medicare_core::ProductId;
use tracing::{debug, instrument, warn};

use crate::backend::{BackendError, BackendProduct, CatalogApi, TextList};
use crate::error::AppError;
use crate::models::product::{
    CareSection, DEFAULT_VARIANTS, NO_DESCRIPTION, NOT_SPECIFIED, PLACEHOLDER_IMAGE,
};
use crate::models::{Product, ProductDetail};

/// Most related products shown under a product.
pub const RELATED_LIMIT: usize = 4;

/// Products scanned from the full catalog when topping up related products.
const TOP_UP_PAGE_SIZE: u32 = 10;

/// Card image for a product, or the placeholder when it has none.
pub(crate) fn card_image<A: CatalogApi>(api: &A, product: &BackendProduct) -> String {
    if product.has_main_image() {
        api.image_url(product.product_id)
    } else {
        PLACEHOLDER_IMAGE.to_string()
    }
}

fn text_or_default(list: Option<&TextList>) -> String {
    list.map(TextList::to_text)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// Build the product page for `product`.
#[must_use]
pub fn build_detail<A: CatalogApi>(api: &A, product: &BackendProduct) -> ProductDetail {
    let id = product.product_id;
    let card = Product::from_backend(product, card_image(api, product));

    let discount_percent = product
        .original_price()
        .and_then(|old| product.product_price.discount_from(old));

    let description = product
        .product_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION)
        .to_string();

    let thumbnails = std::iter::once(api.image_url(id))
        .chain((0..product.sub_image_count()).map(|i| api.sub_image_url(id, i)))
        .collect();

    let variants: Vec<String> = DEFAULT_VARIANTS.iter().map(ToString::to_string).collect();
    let sizes = product.product_sizes.clone().unwrap_or_default();

    ProductDetail {
        care_section: CareSection::for_category(&card.category),
        selected_variant: variants.first().cloned(),
        selected_size: sizes.first().cloned(),
        product: card,
        discount_percent,
        description,
        ingredients: text_or_default(product.ingredients_list.as_ref()),
        benefits: text_or_default(product.benefits_list.as_ref()),
        thumbnails,
        variants,
        sizes,
    }
}

/// Load the product page for `id`.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown product and
/// [`AppError::Backend`] for any other backend failure.
#[instrument(skip(api))]
pub async fn load_detail<A: CatalogApi>(api: &A, id: ProductId) -> Result<ProductDetail, AppError> {
    let product = api.get_product(id).await.map_err(|e| match e {
        BackendError::NotFound(_) => AppError::NotFound(id.to_string()),
        other => AppError::Backend(other),
    })?;
    debug!(name = %product.product_name, "Loaded product");
    Ok(build_detail(api, &product))
}

/// Products to show alongside `current_id`.
///
/// Takes up to [`RELATED_LIMIT`] products from `category`, then tops up from
/// the first page of the catalog with products from other categories. A
/// failed fetch keeps whatever was already collected.
#[instrument(skip(api))]
pub async fn related<A: CatalogApi>(api: &A, category: &str, current_id: ProductId) -> Vec<Product> {
    let mut related: Vec<Product> = match api.products_by_category(category).await {
        Ok(products) => products
            .iter()
            .filter(|p| p.product_id != current_id)
            .take(RELATED_LIMIT)
            .map(|p| Product::from_backend(p, card_image(api, p)))
            .collect(),
        Err(e) => {
            warn!(error = %e, "Failed to load related products");
            return Vec::new();
        }
    };

    if related.len() < RELATED_LIMIT {
        match api.list_products(0, TOP_UP_PAGE_SIZE).await {
            Ok(page) => {
                let missing = RELATED_LIMIT - related.len();
                related.extend(
                    page.content
                        .iter()
                        .filter(|p| {
                            p.product_category.as_deref() != Some(category)
                                && p.product_id != current_id
                        })
                        .take(missing)
                        .map(|p| Product::from_backend(p, card_image(api, p))),
                );
            }
            Err(e) => warn!(error = %e, "Failed to top up related products"),
        }
    }

    related
}
