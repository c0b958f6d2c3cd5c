//! Cache types for backend catalog responses.

use medicare_core::ProductId;

use super::types::{BackendProduct, Page};

/// Cache key for product lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products { page: u32, size: u32 },
    Category(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<BackendProduct>),
    Products(Page<BackendProduct>),
    Category(Vec<BackendProduct>),
}
