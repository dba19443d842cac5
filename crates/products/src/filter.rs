use serde::{Deserialize, Serialize};

use bazaar_core::{Filter, VendorId, matches_search};

use crate::product::{ProductRecord, ProductStatus, Sourcing};

/// Product table filter: search AND status AND category AND vendor AND sourcing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
    pub category: Option<String>,
    pub vendor_id: Option<VendorId>,
    pub sourcing: Option<Sourcing>,
}

impl ProductFilter {
    pub fn status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    pub fn sourcing(mut self, sourcing: Sourcing) -> Self {
        self.sourcing = Some(sourcing);
        self
    }

    /// The storefront view: only what customers may see.
    pub fn customer_visible(items: &[ProductRecord]) -> Vec<ProductRecord> {
        items
            .iter()
            .filter(|p| p.status.is_customer_visible())
            .cloned()
            .collect()
    }
}

impl Filter<ProductRecord> for ProductFilter {
    fn matches(&self, product: &ProductRecord) -> bool {
        matches_search(self.search.as_deref(), &[&product.name, &product.description])
            && self.status.is_none_or(|s| product.status == s)
            && self
                .category
                .as_deref()
                .is_none_or(|c| product.category.eq_ignore_ascii_case(c))
            && self.vendor_id.is_none_or(|v| product.vendor_id == v)
            && self.sourcing.is_none_or(|s| product.sourcing == s)
    }
}
