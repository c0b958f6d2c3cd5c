//! Product catalog view.
//!
//! Holds the first catalog page, the product cards for the current scope (the
//! whole catalog or one category) and the brand and sort selections, and
//! derives the visible list from them. Facets and lookups always use the
//! catalog page so that narrowing to a category keeps every choice on offer.
//! Backend failures degrade the view to empty instead of failing.

pub mod detail;
pub mod filters;

pub use detail::{build_detail, load_detail, related};
pub use filters::{SortMode, apply_filters, parse_discount_percent};

use std::collections::{BTreeSet, HashSet};

use medicare_core::ProductId;
use tracing::{info, instrument, warn};

use crate::backend::{BackendProduct, CatalogApi};
use crate::models::Product;

/// What the loaded products cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogScope {
    /// First page of the whole catalog.
    #[default]
    All,
    /// A single category.
    Category(String),
}

/// Product listing with brand filter and sort order.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    scope: CatalogScope,
    catalog: Vec<Product>,
    scoped: Vec<Product>,
    brands: BTreeSet<String>,
    sort: SortMode,
    visible: Vec<Product>,
}

impl CatalogView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cards<A: CatalogApi>(api: &A, products: &[BackendProduct]) -> Vec<Product> {
        products
            .iter()
            .map(|p| Product::from_backend(p, api.image_url(p.product_id)))
            .collect()
    }

    /// Load the first page of the catalog.
    ///
    /// A failed fetch leaves an empty catalog and is only logged.
    #[instrument(skip(self, api))]
    pub async fn fetch_all<A: CatalogApi>(&mut self, api: &A, page_size: u32) -> &[Product] {
        self.catalog = match api.list_products(0, page_size).await {
            Ok(page) => {
                info!(count = page.content.len(), total = ?page.total_elements, "Catalog loaded");
                Self::cards(api, &page.content)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                Vec::new()
            }
        };
        self.scoped.clone_from(&self.catalog);
        self.scope = CatalogScope::All;
        self.refresh();
        &self.visible
    }

    /// Load one category and re-apply the current filters to it.
    ///
    /// The catalog page backing the facets is left alone. A failed fetch
    /// leaves the category empty.
    #[instrument(skip(self, api))]
    pub async fn select_category<A: CatalogApi>(&mut self, api: &A, category: &str) -> &[Product] {
        self.scoped = match api.products_by_category(category).await {
            Ok(products) => {
                info!(count = products.len(), "Category loaded");
                Self::cards(api, &products)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load category");
                Vec::new()
            }
        };
        self.scope = CatalogScope::Category(category.to_string());
        self.refresh();
        &self.visible
    }

    /// Restrict the listing to `brands`; an empty set shows every brand.
    pub fn set_brands<I, S>(&mut self, brands: I) -> &[Product]
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = brands.into_iter().map(Into::into).collect();
        self.refresh();
        &self.visible
    }

    pub fn set_sort(&mut self, sort: SortMode) -> &[Product] {
        self.sort = sort;
        self.refresh();
        &self.visible
    }

    fn refresh(&mut self) {
        self.visible = apply_filters(&self.scoped, &self.brands, self.sort);
    }

    /// Products after filtering and sorting.
    #[must_use]
    pub fn visible(&self) -> &[Product] {
        &self.visible
    }

    /// Products in the current scope, in backend order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.scoped
    }

    /// The first catalog page, whatever the scope.
    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    #[must_use]
    pub const fn scope(&self) -> &CatalogScope {
        &self.scope
    }

    #[must_use]
    pub const fn sort(&self) -> SortMode {
        self.sort
    }

    #[must_use]
    pub const fn selected_brands(&self) -> &BTreeSet<String> {
        &self.brands
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.catalog.iter().map(|p| p.category.as_str()))
    }

    /// Distinct brands in first-seen order.
    #[must_use]
    pub fn brands(&self) -> Vec<&str> {
        distinct(self.catalog.iter().map(|p| p.brand.as_str()))
    }

    /// A loaded product by id, from the catalog page or the current scope.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.catalog
            .iter()
            .chain(&self.scoped)
            .find(|p| p.id == id)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .collect()
}
