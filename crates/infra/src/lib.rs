//! Infrastructure layer: catalog storage adapters.

pub mod catalog_store;

pub use catalog_store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, StoreError};
