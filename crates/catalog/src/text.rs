//! Free-text matching over the product text index fields.
//!
//! Indexed fields are name, category, brand and description. Matching is
//! case-insensitive whole-word and disjunctive: a product matches when any
//! query term appears in any indexed field.

use crate::product::Product;

/// Split free text into lowercase alphanumeric terms, deduplicated in order.
pub fn terms(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in words(text) {
        if !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

/// Number of term occurrences across the indexed fields (0 = no match).
pub fn relevance(product: &Product, terms: &[String]) -> u32 {
    if terms.is_empty() {
        return 0;
    }

    indexed_fields(product)
        .flat_map(words)
        .filter(|w| terms.contains(w))
        .count() as u32
}

pub fn matches(product: &Product, terms: &[String]) -> bool {
    relevance(product, terms) > 0
}

fn indexed_fields(product: &Product) -> impl Iterator<Item = &str> {
    [
        Some(product.name.as_str()),
        Some(product.category.as_str()),
        product.brand.as_deref(),
        Some(product.description.as_str()),
    ]
    .into_iter()
    .flatten()
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}
