//! Paginator: `page` / `limit` parameters → offset + response envelope.

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 12;

/// Untyped pagination parameters from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated page request (`page >= 1`, `limit >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::validation("page must be a positive integer"));
        }
        if limit == 0 {
            return Err(DomainError::validation("limit must be a positive integer"));
        }
        // skip must be representable
        if (page - 1).checked_mul(limit).is_none() {
            return Err(DomainError::validation("page is out of range"));
        }
        Ok(Self { page, limit })
    }

    /// Parse raw parameters.
    ///
    /// Values are read like a leading-integer parse truncating toward zero
    /// (`"3.9"` → 3, `"2abc"` → 2). Absent or empty values take the defaults;
    /// values without a numeric prefix or below 1 are rejected.
    pub fn from_params(params: &PageParams) -> DomainResult<Self> {
        let page = parse_positive("page", params.page.as_deref(), DEFAULT_PAGE)?;
        let limit = parse_positive("limit", params.limit.as_deref(), DEFAULT_LIMIT)?;
        Self::new(page, limit)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records to skip: `(page - 1) * limit`.
    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    /// Build the response envelope once the total match count is known.
    pub fn envelope(&self, total: u64) -> PaginationEnvelope {
        let total_pages = total.div_ceil(self.limit);
        PaginationEnvelope {
            current: self.page,
            total_pages,
            total_products: total,
            has_next: Some(self.page < total_pages),
            has_prev: Some(self.page > 1),
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationEnvelope {
    pub current: u64,
    pub total_pages: u64,
    pub total_products: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_prev: Option<bool>,
}

impl PaginationEnvelope {
    /// Drop the `hasNext` / `hasPrev` hints (category listing shape).
    pub fn without_navigation(self) -> Self {
        Self {
            has_next: None,
            has_prev: None,
            ..self
        }
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> DomainResult<u64> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(v) => v,
    };

    match parse_int_prefix(raw) {
        Some(v) if v >= 1 => Ok(v as u64),
        Some(_) => Err(DomainError::validation(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
        None => Err(DomainError::validation(format!(
            "{name} must be an integer, got '{raw}'"
        ))),
    }
}

/// Leading-integer parse: optional sign, then digits; anything after the
/// digits is ignored. `None` when no digit follows the sign.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn defaults_are_page_one_of_twelve() {
        let req = PageRequest::from_params(&params(None, None)).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.skip(), 0);
        assert_eq!(req.limit(), 12);
    }

    #[test]
    fn skip_is_page_minus_one_times_limit() {
        let req = PageRequest::from_params(&params(Some("3"), Some("10"))).unwrap();
        assert_eq!(req.skip(), 20);
        assert_eq!(PageRequest::new(1, 12).unwrap().skip(), 0);
    }

    #[test]
    fn leading_integer_prefix_truncates() {
        let req = PageRequest::from_params(&params(Some("2.9"), Some("5abc"))).unwrap();
        assert_eq!(req.page(), 2);
        assert_eq!(req.limit(), 5);
    }

    #[test]
    fn empty_values_take_defaults() {
        let req = PageRequest::from_params(&params(Some(""), Some(" "))).unwrap();
        assert_eq!(req, PageRequest::default());
    }

    #[test]
    fn non_positive_and_non_numeric_values_are_rejected() {
        for (page, limit) in [
            (Some("0"), None),
            (Some("-1"), None),
            (None, Some("0")),
            (None, Some("-5")),
            (Some("abc"), None),
            (None, Some("ten")),
            (Some("-"), None),
        ] {
            let err = PageRequest::from_params(&params(page, limit)).unwrap_err();
            assert!(
                matches!(err, DomainError::Validation(_)),
                "accepted page={page:?} limit={limit:?}"
            );
        }
    }

    #[test]
    fn overflowing_offset_is_rejected() {
        assert!(PageRequest::new(u64::MAX, u64::MAX).is_err());
    }

    #[test]
    fn envelope_for_empty_result() {
        let env = PageRequest::default().envelope(0);
        assert_eq!(env.total_pages, 0);
        assert_eq!(env.total_products, 0);
        assert_eq!(env.has_next, Some(false));
        assert_eq!(env.has_prev, Some(false));
    }

    #[test]
    fn envelope_rounds_total_pages_up() {
        let env = PageRequest::new(2, 5).unwrap().envelope(7);
        assert_eq!(env.current, 2);
        assert_eq!(env.total_pages, 2);
        assert_eq!(env.has_next, Some(false));
        assert_eq!(env.has_prev, Some(true));

        let env = PageRequest::new(1, 5).unwrap().envelope(11);
        assert_eq!(env.total_pages, 3);
        assert_eq!(env.has_next, Some(true));
    }

    #[test]
    fn envelope_serializes_camel_case_and_omits_navigation_when_dropped() {
        let env = PageRequest::new(1, 10).unwrap().envelope(25);
        let json = serde_json::to_value(env).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalProducts"], 25);
        assert_eq!(json["hasNext"], true);

        let json = serde_json::to_value(env.without_navigation()).unwrap();
        assert!(json.get("hasNext").is_none());
        assert!(json.get("hasPrev").is_none());
        assert_eq!(json["current"], 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: total pages is the smallest page count covering all
            /// records, and the navigation hints agree with it.
            #[test]
            fn envelope_is_consistent(page in 1u64..500, limit in 1u64..200, total in 0u64..100_000) {
                let req = PageRequest::new(page, limit).unwrap();
                let env = req.envelope(total);

                prop_assert!(env.total_pages * limit >= total);
                if env.total_pages > 0 {
                    prop_assert!((env.total_pages - 1) * limit < total);
                }
                prop_assert_eq!(env.has_next, Some(page < env.total_pages));
                prop_assert_eq!(env.has_prev, Some(page > 1));
                prop_assert_eq!(req.skip(), (page - 1) * limit);
            }
        }
    }
}
