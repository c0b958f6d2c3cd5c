//! Catalog listing and product pages.

use medicare_core::ProductId;
use medicare_storefront::Command;
use medicare_storefront::models::{Product, ProductDetail};
use medicare_storefront::services::catalog::SortMode;

use super::{CliError, Store, report};

/// List the catalog or one category, with optional brand filter and sort.
pub async fn products(
    store: &mut Store,
    category: Option<String>,
    brands: Vec<String>,
    sort: Option<String>,
) -> Result<(), CliError> {
    let mut events = store.dispatch(Command::FetchCatalog).await;
    if let Some(category) = category {
        events = store.dispatch(Command::SelectCategory(category)).await;
    }
    if !brands.is_empty() {
        events = store.dispatch(Command::SetBrandFilter(brands)).await;
    }
    if let Some(sort) = sort {
        events = store.dispatch(Command::SetSort(SortMode::parse(&sort))).await;
    }
    report(events)?;
    print_facets(store);
    Ok(())
}

/// Show one product page with related products.
pub async fn product(store: &mut Store, id: i64) -> Result<(), CliError> {
    let events = store.dispatch(Command::ViewProduct(ProductId::new(id))).await;
    report(events)
}

#[allow(clippy::print_stdout)]
fn print_facets(store: &Store) {
    let catalog = store.catalog();
    if !catalog.categories().is_empty() {
        println!("\nCategories: {}", catalog.categories().join(", "));
    }
    if !catalog.brands().is_empty() {
        println!("Brands: {}", catalog.brands().join(", "));
    }
}

#[allow(clippy::print_stdout)]
pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for product in products {
        let mut line = format!(
            "{:>6}  {}  {}  [{}]",
            product.id,
            product.name,
            product.price,
            product.display_brand()
        );
        if !product.discount.is_empty() {
            line.push_str("  ");
            line.push_str(&product.discount);
        }
        if product.prescription_required {
            line.push_str("  Rx");
        }
        if !product.in_stock {
            line.push_str("  (out of stock)");
        }
        println!("{line}");
    }
}

#[allow(clippy::print_stdout)]
pub fn print_detail(detail: &ProductDetail, related: &[Product]) {
    let product = &detail.product;
    println!("{} ({})", product.name, product.display_brand());
    match (product.original_price, detail.discount_percent) {
        (Some(original), Some(percent)) => {
            println!("Price: {}  was {original}  {percent}% off", product.price);
        }
        _ => println!("Price: {}", product.price),
    }
    if product.prescription_required {
        println!("Prescription required");
    }
    if !product.in_stock {
        println!("Out of stock");
    }
    println!("\n{}", detail.description);
    println!("\nIngredients: {}", detail.ingredients);
    println!("Benefits: {}", detail.benefits);
    println!("Variants: {}", detail.variants.join(", "));
    if !detail.sizes.is_empty() {
        println!("Sizes: {}", detail.sizes.join(", "));
    }
    println!("Images: {}", detail.thumbnails.len());

    if !related.is_empty() {
        println!("\nRelated products:");
        print_products(related);
    }
}
