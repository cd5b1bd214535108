//! Catalog query composition: predicate + ordering + window, per endpoint.

use storefront_core::DomainResult;

use crate::filter::{build_filter, Condition, FilterParams, Predicate};
use crate::pagination::PageRequest;
use crate::sort::SortSpec;
use crate::text;

/// Fixed size of the featured products strip.
pub const FEATURED_LIMIT: u64 = 8;

/// Maximum number of search suggestions returned.
pub const SUGGESTION_LIMIT: u64 = 10;

/// A complete query handed to the catalog store.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub predicate: Predicate,
    pub sort: SortSpec,
    pub skip: u64,
    /// `None` means no upper bound on returned rows.
    pub limit: Option<u64>,
}

impl CatalogQuery {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            sort: SortSpec::default(),
            skip: 0,
            limit: None,
        }
    }

    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn paged(mut self, page: &PageRequest) -> Self {
        self.skip = page.skip();
        self.limit = Some(page.limit());
        self
    }

    pub fn limited(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// General listing: filter parameters, `sortBy` token and page window.
    pub fn listing(
        filter: &FilterParams,
        sort_by: Option<&str>,
        page: &PageRequest,
    ) -> DomainResult<Self> {
        let predicate = build_filter(filter)?;
        Ok(Self::new(predicate)
            .sorted(SortSpec::resolve(sort_by))
            .paged(page))
    }

    /// Category listing. The category is lower-cased here (and only here);
    /// the general listing compares it verbatim.
    pub fn by_category(category: &str, subcategory: Option<&str>, page: &PageRequest) -> Self {
        let mut predicate = Predicate::active().and(Condition::Category(category.to_lowercase()));
        if let Some(sub) = subcategory.filter(|s| !s.is_empty()) {
            predicate = predicate.and(Condition::Subcategory(sub.to_string()));
        }
        Self::new(predicate).sorted(SortSpec::Newest).paged(page)
    }

    /// Featured strip: featured, active, in stock, newest first.
    pub fn featured() -> Self {
        let predicate = Predicate::active()
            .and(Condition::Featured)
            .and(Condition::InStock);
        Self::new(predicate)
            .sorted(SortSpec::Newest)
            .limited(FEATURED_LIMIT)
    }

    /// Search suggestions for `q`, best matches first.
    ///
    /// Returns `None` when `q` holds no searchable term; callers should then
    /// answer with an empty list without querying the store.
    pub fn suggestions(q: Option<&str>) -> Option<Self> {
        let terms = text::terms(q.unwrap_or_default());
        if terms.is_empty() {
            return None;
        }
        let predicate = Predicate::active().and(Condition::Text(terms));
        Some(
            Self::new(predicate)
                .sorted(SortSpec::Relevance)
                .limited(SUGGESTION_LIMIT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageParams;

    #[test]
    fn listing_composes_filter_sort_and_window() {
        let page = PageRequest::from_params(&PageParams {
            page: Some("2".to_string()),
            limit: Some("5".to_string()),
        })
        .unwrap();
        let q = CatalogQuery::listing(
            &FilterParams {
                min_price: Some("10".to_string()),
                max_price: Some("50".to_string()),
                ..FilterParams::default()
            },
            Some("price_asc"),
            &page,
        )
        .unwrap();

        assert_eq!(q.sort, SortSpec::PriceAsc);
        assert_eq!(q.skip, 5);
        assert_eq!(q.limit, Some(5));
        assert_eq!(q.predicate.conditions().len(), 2);
    }

    #[test]
    fn listing_propagates_filter_validation_errors() {
        let res = CatalogQuery::listing(
            &FilterParams {
                max_price: Some("cheap".to_string()),
                ..FilterParams::default()
            },
            None,
            &PageRequest::default(),
        );
        assert!(res.is_err());
    }

    #[test]
    fn by_category_lowercases_and_adds_subcategory() {
        let a = CatalogQuery::by_category("Electronics", Some("Audio"), &PageRequest::default());
        let b = CatalogQuery::by_category("electronics", Some("Audio"), &PageRequest::default());
        assert_eq!(a, b);
        assert_eq!(
            a.predicate.conditions(),
            &[
                Condition::Active(true),
                Condition::Category("electronics".to_string()),
                Condition::Subcategory("Audio".to_string()),
            ]
        );
        assert_eq!(a.sort, SortSpec::Newest);
    }

    #[test]
    fn by_category_ignores_empty_subcategory() {
        let q = CatalogQuery::by_category("toys", Some(""), &PageRequest::default());
        assert_eq!(q.predicate.conditions().len(), 2);
    }

    #[test]
    fn featured_is_fixed_window_of_eight() {
        let q = CatalogQuery::featured();
        assert_eq!(q.limit, Some(FEATURED_LIMIT));
        assert_eq!(q.skip, 0);
        assert_eq!(q.sort, SortSpec::Newest);
        assert_eq!(
            q.predicate.conditions(),
            &[Condition::Active(true), Condition::Featured, Condition::InStock]
        );
    }

    #[test]
    fn suggestions_short_circuit_on_empty_query() {
        assert_eq!(CatalogQuery::suggestions(None), None);
        assert_eq!(CatalogQuery::suggestions(Some("")), None);
        assert_eq!(CatalogQuery::suggestions(Some("  ")), None);

        let q = CatalogQuery::suggestions(Some("usb cable")).unwrap();
        assert_eq!(q.sort, SortSpec::Relevance);
        assert_eq!(q.limit, Some(SUGGESTION_LIMIT));
        assert_eq!(q.predicate.text_terms().map(|t| t.len()), Some(2));
    }
}
