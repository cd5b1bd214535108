//! Catalog store boundary (the query executor).
//!
//! Stores execute a fully composed [`CatalogQuery`]; they never interpret raw
//! request parameters. SKU uniqueness is a store responsibility: `insert` and
//! `replace` fail with [`StoreError::DuplicateSku`] atomically, so callers do
//! not pre-check.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

use async_trait::async_trait;
use thiserror::Error;

use storefront_catalog::{CatalogQuery, Predicate, Product};
use storefront_core::ProductId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("a product with sku '{0}' already exists")]
    DuplicateSku(String),

    #[error("product not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("failed to decode product row: {0}")]
    Decode(String),
}

/// Async catalog store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Records matching the query's predicate, ordered and windowed.
    async fn find(&self, query: &CatalogQuery) -> Result<Vec<Product>, StoreError>;

    /// Number of records matching a predicate (ignores ordering and window).
    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Lookup by id, regardless of the active flag.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    /// Overwrite an existing record (matched by id).
    async fn replace(&self, product: Product) -> Result<Product, StoreError>;
}
