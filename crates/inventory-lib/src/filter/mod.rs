//! Query-string parsing into typed report filters
//!
//! Every report endpoint receives its parameters as a flat string map. The
//! helpers on [`QueryParams`] turn those strings into typed values and fail
//! with a [`FilterError`] naming the offending parameter. Empty values are
//! treated exactly like absent ones, and the legacy `-1` sentinel for numeric
//! bounds maps to `None`.

mod alerts;
mod hosts;
mod report;

pub use alerts::{AlertsMode, AlertsSearchFilter, AlertsSelection};
pub use hosts::{ClusterCriterion, HostCriteria, HostsFilter, HostsMode, Range};
pub use report::{
    ClustersFilter, ClustersMode, GlobalFilter, PatchAdvisorsFilter, PatchAdvisorsQuery,
    ReportFilter, SearchFilter, SortBy, TimeRange,
};

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use crate::pagination::PageRequest;

/// A query parameter could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for parameter '{field}': expected {expected}")]
pub struct FilterError {
    pub field: String,
    pub value: String,
    pub expected: String,
}

impl FilterError {
    pub fn new(field: &str, value: &str, expected: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;

/// Sentinel accepted on the wire for "no bound"
const UNBOUNDED: &str = "-1";

/// Raw query parameters of a single request
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl From<HashMap<String, String>> for QueryParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl QueryParams {
    /// Raw value, `None` when absent or empty
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// Boolean defaulting to `false`
    pub fn bool(&self, key: &str) -> FilterResult<bool> {
        Ok(self.optional_bool(key)?.unwrap_or(false))
    }

    /// Tri-state boolean, `None` when absent
    pub fn optional_bool(&self, key: &str) -> FilterResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(other) => Err(FilterError::new(key, other, "'true' or 'false'")),
        }
    }

    pub fn int(&self, key: &str) -> FilterResult<Option<i64>> {
        match self.get(key) {
            None | Some(UNBOUNDED) => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| FilterError::new(key, raw, "an integer")),
        }
    }

    pub fn float(&self, key: &str) -> FilterResult<Option<f64>> {
        match self.get(key) {
            None | Some(UNBOUNDED) => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| FilterError::new(key, raw, "a number")),
        }
    }

    /// RFC3339 timestamp, `None` when absent
    pub fn time(&self, key: &str) -> FilterResult<Option<DateTime<Utc>>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(|_| FilterError::new(key, raw, "an RFC3339 timestamp")),
        }
    }

    /// One of a closed set of values, `None` when absent
    pub fn choice<T: FromStr>(&self, key: &str, expected: &str) -> FilterResult<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| FilterError::new(key, raw, expected)),
        }
    }

    /// Whitespace separated search terms
    pub fn keywords(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Comma separated list, empty items dropped
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `page` and `size`; both must be bounded for the result to be paged
    pub fn page_request(&self) -> FilterResult<Option<PageRequest>> {
        let page = self.int("page")?;
        let size = self.int("size")?;
        match (page, size) {
            (Some(page), Some(size)) => {
                let number = u32::try_from(page)
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| FilterError::new("page", &page.to_string(), "a page number >= 1"))?;
                let size = u32::try_from(size)
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| FilterError::new("size", &size.to_string(), "a page size >= 1"))?;
                Ok(Some(PageRequest::new(number, size)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_bool_defaults_to_false() {
        let p = params(&[]);
        assert!(!p.bool("sort-desc").unwrap());
        assert_eq!(p.optional_bool("is-member-of-cluster").unwrap(), None);
    }

    #[test]
    fn test_bool_rejects_other_values() {
        let p = params(&[("sort-desc", "yes")]);
        let err = p.bool("sort-desc").unwrap_err();
        assert_eq!(err.field, "sort-desc");
        assert_eq!(err.value, "yes");
    }

    #[test]
    fn test_int_sentinel_and_errors() {
        let p = params(&[("page", "-1"), ("size", "abc"), ("cpu-cores-lte", "8")]);
        assert_eq!(p.int("page").unwrap(), None);
        assert_eq!(p.int("cpu-cores-lte").unwrap(), Some(8));
        assert_eq!(p.int("size").unwrap_err().field, "size");
    }

    #[test]
    fn test_float_parsing() {
        let p = params(&[("memory-total-lte", "12.5"), ("swap-total-gte", "NaN")]);
        assert_eq!(p.float("memory-total-lte").unwrap(), Some(12.5));
        assert!(p.float("swap-total-gte").is_err());
        assert_eq!(p.float("missing").unwrap(), None);
    }

    #[test]
    fn test_time_parsing() {
        let p = params(&[("older-than", "2020-06-10T11:54:59Z"), ("from", "yesterday")]);
        let t = p.time("older-than").unwrap().unwrap();
        assert_eq!(t.to_rfc3339(), "2020-06-10T11:54:59+00:00");
        assert_eq!(p.time("from").unwrap_err().field, "from");
        assert_eq!(p.time("to").unwrap(), None);
    }

    #[test]
    fn test_keywords_and_lists() {
        let p = params(&[("search", "  foo   bar "), ("location", "Italy,,Germany")]);
        assert_eq!(p.keywords("search"), vec!["foo", "bar"]);
        assert_eq!(p.list("location"), vec!["Italy", "Germany"]);
        assert!(p.keywords("missing").is_empty());
    }

    #[test]
    fn test_empty_value_is_absent() {
        let p = params(&[("page", ""), ("sort-desc", "")]);
        assert_eq!(p.int("page").unwrap(), None);
        assert!(!p.bool("sort-desc").unwrap());
    }

    #[test]
    fn test_page_request_requires_both_bounds() {
        assert_eq!(params(&[("page", "2")]).page_request().unwrap(), None);
        assert_eq!(
            params(&[("page", "2"), ("size", "3")]).page_request().unwrap(),
            Some(PageRequest::new(2, 3))
        );
        assert_eq!(
            params(&[("page", "2"), ("size", "-1")]).page_request().unwrap(),
            None
        );
    }

    #[test]
    fn test_page_request_rejects_zero_page() {
        let err = params(&[("page", "0"), ("size", "3")])
            .page_request()
            .unwrap_err();
        assert_eq!(err.field, "page");
    }
}
