//! Sort resolver: `sortBy` token → ordering.

use core::cmp::Ordering;

use crate::product::Product;

/// Result ordering for catalog queries.
///
/// Ties are broken by product id so that paging over equal keys is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortSpec {
    PriceAsc,
    PriceDesc,
    /// Rating average, highest first.
    RatingDesc,
    /// Creation time, newest first.
    #[default]
    Newest,
    NameAsc,
    /// Text relevance, best first. Only meaningful with a text condition;
    /// never produced by [`SortSpec::resolve`].
    Relevance,
}

impl SortSpec {
    /// Map a `sortBy` token to an ordering. Total: unknown or missing tokens
    /// fall back to newest first.
    pub fn resolve(token: Option<&str>) -> Self {
        match token {
            Some("price_asc") => SortSpec::PriceAsc,
            Some("price_desc") => SortSpec::PriceDesc,
            Some("rating") => SortSpec::RatingDesc,
            Some("newest") => SortSpec::Newest,
            Some("name") => SortSpec::NameAsc,
            _ => SortSpec::Newest,
        }
    }

    /// Compare two products by this ordering's key.
    ///
    /// `Relevance` has no key of its own here; callers rank by score first and
    /// fall back to this (newest first) for equal scores.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self {
            SortSpec::PriceAsc => a.price.total_cmp(&b.price),
            SortSpec::PriceDesc => b.price.total_cmp(&a.price),
            SortSpec::RatingDesc => b.rating.average.total_cmp(&a.rating.average),
            SortSpec::Newest | SortSpec::Relevance => b.created_at.cmp(&a.created_at),
            SortSpec::NameAsc => a.name.cmp(&b.name),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::NewProduct;
    use chrono::{Duration, Utc};
    use storefront_core::{ProductId, UserId};

    fn product(name: &str, price: f64, age_days: i64) -> Product {
        Product::create(
            ProductId::new(),
            NewProduct {
                name: name.to_string(),
                description: "d".to_string(),
                price,
                category: "c".to_string(),
                ..NewProduct::default()
            },
            UserId::new(),
            Utc::now() - Duration::days(age_days),
        )
        .unwrap()
    }

    #[test]
    fn known_tokens_resolve() {
        assert_eq!(SortSpec::resolve(Some("price_asc")), SortSpec::PriceAsc);
        assert_eq!(SortSpec::resolve(Some("price_desc")), SortSpec::PriceDesc);
        assert_eq!(SortSpec::resolve(Some("rating")), SortSpec::RatingDesc);
        assert_eq!(SortSpec::resolve(Some("newest")), SortSpec::Newest);
        assert_eq!(SortSpec::resolve(Some("name")), SortSpec::NameAsc);
    }

    #[test]
    fn missing_empty_and_unknown_tokens_default_to_newest() {
        assert_eq!(SortSpec::resolve(None), SortSpec::Newest);
        assert_eq!(SortSpec::resolve(Some("")), SortSpec::Newest);
        assert_eq!(SortSpec::resolve(Some("PRICE_ASC")), SortSpec::Newest);
        assert_eq!(SortSpec::resolve(Some("relevance")), SortSpec::Newest);
        assert_eq!(SortSpec::default(), SortSpec::Newest);
    }

    #[test]
    fn compare_orders_by_key() {
        let cheap_old = product("b", 5.0, 10);
        let pricey_new = product("a", 50.0, 1);

        assert_eq!(SortSpec::PriceAsc.compare(&cheap_old, &pricey_new), Ordering::Less);
        assert_eq!(SortSpec::PriceDesc.compare(&cheap_old, &pricey_new), Ordering::Greater);
        assert_eq!(SortSpec::Newest.compare(&pricey_new, &cheap_old), Ordering::Less);
        assert_eq!(SortSpec::NameAsc.compare(&pricey_new, &cheap_old), Ordering::Less);
    }

    #[test]
    fn rating_sorts_highest_first() {
        let mut low = product("x", 1.0, 1);
        let mut high = product("y", 1.0, 1);
        low.rating.average = 2.5;
        high.rating.average = 4.8;
        assert_eq!(SortSpec::RatingDesc.compare(&high, &low), Ordering::Less);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the resolver is total and anything outside the five
            /// known tokens lands on the default.
            #[test]
            fn resolve_is_total(token in proptest::option::of(".{0,12}")) {
                let spec = SortSpec::resolve(token.as_deref());
                let known = matches!(
                    token.as_deref(),
                    Some("price_asc" | "price_desc" | "rating" | "newest" | "name")
                );
                if !known {
                    prop_assert_eq!(spec, SortSpec::Newest);
                }
                prop_assert_ne!(spec, SortSpec::Relevance);
            }
        }
    }
}
