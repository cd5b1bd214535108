//! `storefront-api` — HTTP surface for the product catalog.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
