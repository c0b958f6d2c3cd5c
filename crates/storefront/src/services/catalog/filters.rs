//! Client-side brand filtering and sorting of product cards.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::Product;

/// Leading number of a discount label such as `"12.5% off"`.
static DISCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").expect("Invalid regex"));

/// Catalog sort order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Backend order.
    #[default]
    None,
    PriceAscending,
    PriceDescending,
    /// Largest discount first.
    DiscountDescending,
}

impl SortMode {
    /// Parse a sort option label or parameter value.
    ///
    /// Unknown values fall back to [`SortMode::None`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Price: Low to High" | "price-ascending" | "price_asc" => Self::PriceAscending,
            "Price: High to Low" | "price-descending" | "price_desc" => Self::PriceDescending,
            "Discount" | "discount" => Self::DiscountDescending,
            _ => Self::None,
        }
    }

    /// Parameter value for this sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PriceAscending => "price-ascending",
            Self::PriceDescending => "price-descending",
            Self::DiscountDescending => "discount",
        }
    }

    /// Label shown in the sort selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Sort by",
            Self::PriceAscending => "Price: Low to High",
            Self::PriceDescending => "Price: High to Low",
            Self::DiscountDescending => "Discount",
        }
    }
}

/// Percentage at the start of a discount label, or zero.
#[must_use]
pub fn parse_discount_percent(label: &str) -> Decimal {
    DISCOUNT_RE
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(Decimal::ZERO)
}

/// Restrict `source` to `brands` and order it by `sort`.
///
/// An empty brand set keeps every product. Sorting is stable, so products
/// that compare equal keep their backend order.
#[must_use]
pub fn apply_filters(source: &[Product], brands: &BTreeSet<String>, sort: SortMode) -> Vec<Product> {
    let mut products: Vec<Product> = source
        .iter()
        .filter(|p| brands.is_empty() || brands.contains(&p.brand))
        .cloned()
        .collect();

    match sort {
        SortMode::None => {}
        SortMode::PriceAscending => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortMode::PriceDescending => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortMode::DiscountDescending => products.sort_by_cached_key(|p| {
            std::cmp::Reverse(parse_discount_percent(&p.discount))
        }),
    }

    products
}
