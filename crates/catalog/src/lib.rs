//! Product catalog domain module.
//!
//! This crate contains the catalog record and the query translation layer
//! (filter builder, sort resolver, paginator), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod filter;
pub mod pagination;
pub mod product;
pub mod query;
pub mod sort;
pub mod text;

pub use filter::{build_filter, Condition, FilterParams, Predicate, PriceRange};
pub use pagination::{PageParams, PageRequest, PaginationEnvelope, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use product::{Dimensions, NewProduct, Product, ProductPatch, Rating};
pub use query::{CatalogQuery, FEATURED_LIMIT, SUGGESTION_LIMIT};
pub use sort::SortSpec;
