//! Convenience builders for HTTP query parameters.
//!
//! CloudControl list operations share the same paging parameters and a handful of optional
//! filters; these helpers turn them into URL query pairs.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: ToString,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Append the paging parameters, if any are set.
    pub fn push_paging(&mut self, paging: Option<&Paging>) {
        if let Some(paging) = paging {
            self.push_opt("pageNumber", paging.page_number);
            self.push_opt("pageSize", paging.page_size);
        }
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Paging information for list operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// 1-based page number.
    pub page_number: Option<u32>,
    /// Number of items per page (CloudControl caps this at 250).
    pub page_size: Option<u32>,
}

impl Paging {
    /// Request a specific page.
    #[must_use]
    pub const fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: Some(page_number),
            page_size: Some(page_size),
        }
    }

    /// Paging for the page following this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page_number: Some(self.page_number.unwrap_or(1) + 1),
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("name", Option::<String>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn push_paging_adds_both_fields() {
        let mut params = QueryParams::new();
        params.push("networkDomainId", "abc");
        params.push_paging(Some(&Paging::page(2, 50)));
        assert_eq!(
            params.into_pairs(),
            vec![
                ("networkDomainId", "abc".to_string()),
                ("pageNumber", "2".to_string()),
                ("pageSize", "50".to_string()),
            ]
        );
    }

    #[test]
    fn paging_next_starts_after_first_page() {
        assert_eq!(Paging::default().next().page_number, Some(2));
        assert_eq!(Paging::page(3, 10).next(), Paging::page(4, 10));
    }
}
