//! Filter builder: raw listing query parameters → catalog predicate.

use std::collections::BTreeSet;

use serde::Deserialize;

use storefront_core::{DomainError, DomainResult};

use crate::product::Product;
use crate::text;

/// Untyped listing filter parameters, exactly as received on the query string.
///
/// Empty strings are treated the same as absent parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub brand: Option<String>,
    pub in_stock: Option<String>,
    pub featured: Option<String>,
}

/// Inclusive price bounds; either side may be open.
///
/// Inverted bounds (`min > max`) are kept as given and simply match nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// A single predicate condition over a product record.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `isActive == value`.
    Active(bool),
    /// Free-text match on the normalized search terms. Empty terms match
    /// nothing.
    Text(Vec<String>),
    /// Exact category equality (no case folding at this level).
    Category(String),
    /// Exact subcategory equality.
    Subcategory(String),
    Price(PriceRange),
    /// Brand is a member of the set.
    BrandIn(BTreeSet<String>),
    /// `stock > 0`.
    InStock,
    /// `isFeatured == true`.
    Featured,
}

impl Condition {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Condition::Active(v) => product.is_active == *v,
            Condition::Text(terms) => text::matches(product, terms),
            Condition::Category(c) => product.category == *c,
            Condition::Subcategory(s) => product.subcategory.as_deref() == Some(s.as_str()),
            Condition::Price(range) => range.contains(product.price),
            Condition::BrandIn(brands) => product
                .brand
                .as_ref()
                .is_some_and(|b| brands.contains(b)),
            Condition::InStock => product.in_stock(),
            Condition::Featured => product.is_featured,
        }
    }
}

/// Conjunction of conditions. An empty predicate matches every record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// The default listing predicate: active products only.
    pub fn active() -> Self {
        Self {
            conditions: vec![Condition::Active(true)],
        }
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.conditions.iter().all(|c| c.matches(product))
    }

    /// Search terms of the text condition, if any.
    pub fn text_terms(&self) -> Option<&[String]> {
        self.conditions.iter().find_map(|c| match c {
            Condition::Text(terms) => Some(terms.as_slice()),
            _ => None,
        })
    }
}

/// Build the listing predicate from raw parameters.
///
/// Only parameters actually supplied contribute a condition; unknown
/// parameters never reach this point (they are dropped by deserialization).
pub fn build_filter(params: &FilterParams) -> DomainResult<Predicate> {
    let mut predicate = Predicate::active();

    if let Some(search) = present(&params.search) {
        // no searchable terms: the condition is kept and matches nothing
        predicate = predicate.and(Condition::Text(text::terms(search)));
    }

    if let Some(category) = present(&params.category) {
        predicate = predicate.and(Condition::Category(category.to_string()));
    }

    let min = present(&params.min_price)
        .map(|v| parse_price("minPrice", v))
        .transpose()?;
    let max = present(&params.max_price)
        .map(|v| parse_price("maxPrice", v))
        .transpose()?;
    if min.is_some() || max.is_some() {
        predicate = predicate.and(Condition::Price(PriceRange { min, max }));
    }

    if let Some(brand) = present(&params.brand) {
        let brands: BTreeSet<String> = brand
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();
        if !brands.is_empty() {
            predicate = predicate.and(Condition::BrandIn(brands));
        }
    }

    if present(&params.in_stock) == Some("true") {
        predicate = predicate.and(Condition::InStock);
    }

    if present(&params.featured) == Some("true") {
        predicate = predicate.and(Condition::Featured);
    }

    Ok(predicate)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_price(name: &str, raw: &str) -> DomainResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DomainError::validation(format!(
            "{name} must be a number, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FilterParams {
        FilterParams::default()
    }

    fn sample_product() -> Product {
        Product::create(
            storefront_core::ProductId::new(),
            crate::product::NewProduct {
                name: "Wireless mouse".to_string(),
                description: "Quiet clicks".to_string(),
                price: 20.0,
                category: "electronics".to_string(),
                ..Default::default()
            },
            storefront_core::UserId::new(),
            chrono::Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_params_yield_active_only() {
        let p = build_filter(&params()).unwrap();
        assert_eq!(p.conditions(), &[Condition::Active(true)]);
    }

    #[test]
    fn empty_strings_are_treated_as_absent() {
        let p = build_filter(&FilterParams {
            search: Some(String::new()),
            category: Some(String::new()),
            min_price: Some(String::new()),
            max_price: Some(String::new()),
            brand: Some(String::new()),
            in_stock: Some(String::new()),
            featured: Some(String::new()),
        })
        .unwrap();
        assert_eq!(p, Predicate::active());
    }

    #[test]
    fn each_parameter_adds_its_condition() {
        let p = build_filter(&FilterParams {
            search: Some("wireless mouse".to_string()),
            category: Some("Electronics".to_string()),
            min_price: Some("10".to_string()),
            max_price: Some("50.5".to_string()),
            brand: Some("Logitech, Razer".to_string()),
            in_stock: Some("true".to_string()),
            featured: Some("true".to_string()),
        })
        .unwrap();

        let brands: BTreeSet<String> = ["Logitech", "Razer"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            p.conditions(),
            &[
                Condition::Active(true),
                Condition::Text(vec!["wireless".to_string(), "mouse".to_string()]),
                Condition::Category("Electronics".to_string()),
                Condition::Price(PriceRange {
                    min: Some(10.0),
                    max: Some(50.5)
                }),
                Condition::BrandIn(brands),
                Condition::InStock,
                Condition::Featured,
            ]
        );
    }

    #[test]
    fn category_is_not_case_folded_for_general_listing() {
        let p = build_filter(&FilterParams {
            category: Some("Electronics".to_string()),
            ..params()
        })
        .unwrap();
        assert!(p.conditions().contains(&Condition::Category("Electronics".to_string())));
    }

    #[test]
    fn single_price_bound_leaves_other_side_open() {
        let p = build_filter(&FilterParams {
            max_price: Some("20".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(
            p.conditions()[1],
            Condition::Price(PriceRange {
                min: None,
                max: Some(20.0)
            })
        );
    }

    #[test]
    fn inverted_price_bounds_pass_through() {
        let p = build_filter(&FilterParams {
            min_price: Some("50".to_string()),
            max_price: Some("10".to_string()),
            ..params()
        })
        .unwrap();
        let range = PriceRange {
            min: Some(50.0),
            max: Some(10.0),
        };
        assert_eq!(p.conditions()[1], Condition::Price(range));
        assert!(!range.contains(30.0));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        for raw in ["abc", "NaN", "inf", "10abc"] {
            let err = build_filter(&FilterParams {
                min_price: Some(raw.to_string()),
                ..params()
            })
            .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{raw} accepted");
        }
    }

    #[test]
    fn only_literal_true_activates_flags() {
        for raw in ["false", "TRUE", "1", "yes"] {
            let p = build_filter(&FilterParams {
                in_stock: Some(raw.to_string()),
                featured: Some(raw.to_string()),
                ..params()
            })
            .unwrap();
            assert_eq!(p, Predicate::active(), "{raw} activated a flag");
        }
    }

    #[test]
    fn brand_list_is_deduplicated() {
        let p = build_filter(&FilterParams {
            brand: Some("Sony,Sony,,Bose".to_string()),
            ..params()
        })
        .unwrap();
        match &p.conditions()[1] {
            Condition::BrandIn(set) => {
                assert_eq!(set.len(), 2);
                assert!(set.contains("Sony") && set.contains("Bose"));
            }
            other => panic!("expected BrandIn, got {other:?}"),
        }
    }

    #[test]
    fn punctuation_only_search_matches_nothing() {
        let p = build_filter(&FilterParams {
            search: Some("!!!".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(p, Predicate::active().and(Condition::Text(Vec::new())));
        assert_eq!(p.text_terms(), Some(&[][..]));
        assert!(!p.matches(&sample_product()));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn opt_value() -> impl Strategy<Value = Option<String>> {
            prop_oneof![Just(None), "[a-z]{1,8}".prop_map(Some)]
        }

        proptest! {
            /// Property: the predicate holds one condition per supplied filter
            /// parameter (prices share one range condition), plus the active flag.
            #[test]
            fn conditions_track_supplied_parameters(
                category in opt_value(),
                brand in opt_value(),
                min in proptest::option::of(0u32..10_000),
                max in proptest::option::of(0u32..10_000),
                in_stock in any::<bool>(),
                featured in any::<bool>(),
            ) {
                let params = FilterParams {
                    search: None,
                    category: category.clone(),
                    min_price: min.map(|v| v.to_string()),
                    max_price: max.map(|v| v.to_string()),
                    brand: brand.clone(),
                    in_stock: in_stock.then(|| "true".to_string()),
                    featured: featured.then(|| "true".to_string()),
                };
                let p = build_filter(&params).unwrap();

                let expected = 1
                    + category.is_some() as usize
                    + brand.is_some() as usize
                    + (min.is_some() || max.is_some()) as usize
                    + in_stock as usize
                    + featured as usize;
                prop_assert_eq!(p.conditions().len(), expected);
                prop_assert_eq!(&p.conditions()[0], &Condition::Active(true));
            }
        }
    }
}
