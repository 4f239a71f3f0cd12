use chrono::{DateTime, Utc};
use std::str::FromStr;

use super::{FilterError, FilterResult, QueryParams};
use crate::models::PatchStatus;
use crate::pagination::PageRequest;

/// Location, environment and point-in-time selection shared by most reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalFilter {
    /// Empty means every location
    pub locations: Vec<String>,
    pub environment: Option<String>,
    pub older_than: Option<DateTime<Utc>>,
}

impl GlobalFilter {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        Ok(Self {
            locations: params.list("location"),
            environment: params.string("environment"),
            older_than: params.time("older-than")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub descending: bool,
}

/// Free-text search, sorting and paging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub keywords: Vec<String>,
    pub sort: Option<SortBy>,
    pub page: Option<PageRequest>,
}

impl SortBy {
    /// Accepts a dotted document path; operators and empty segments are refused
    fn parse(field: String, descending: bool) -> FilterResult<Self> {
        let valid = !field.starts_with('$')
            && !field.contains('\0')
            && field.split('.').all(|segment| !segment.is_empty());
        if !valid {
            return Err(FilterError::new("sort-by", &field, "a field name"));
        }
        Ok(Self { field, descending })
    }
}

impl SearchFilter {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        let descending = params.bool("sort-desc")?;
        let sort = params
            .string("sort-by")
            .map(|field| SortBy::parse(field, descending))
            .transpose()?;
        Ok(Self {
            keywords: params.keywords("search"),
            sort,
            page: params.page_request()?,
        })
    }

    /// Exports always carry every matching row
    pub fn unpaged(mut self) -> Self {
        self.page = None;
        self
    }
}

/// Parameters of the plain tabular reports (ADDM, segment advisor, PostgreSQL instances)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub global: GlobalFilter,
    pub search: SearchFilter,
}

impl ReportFilter {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        Ok(Self {
            global: GlobalFilter::parse(params)?,
            search: SearchFilter::parse(params)?,
        })
    }

    pub fn unpaged(mut self) -> Self {
        self.search = self.search.unpaged();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchAdvisorsFilter {
    pub report: ReportFilter,
    /// Age in months a PSU may have before the database is reported as KO
    pub window_months: Option<u32>,
    pub status: Option<PatchStatus>,
}

impl PatchAdvisorsFilter {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        let window_months = match params.int("window-time")? {
            None => None,
            Some(months) => Some(u32::try_from(months).map_err(|_| {
                FilterError::new("window-time", &months.to_string(), "a number of months >= 0")
            })?),
        };
        Ok(Self {
            report: ReportFilter::parse(params)?,
            window_months,
            status: params.choice("status", "'', 'OK' or 'KO'")?,
        })
    }
}

/// Patch advisor filter with the window resolved against the current time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchAdvisorsQuery {
    pub report: ReportFilter,
    pub window_start: Option<DateTime<Utc>>,
    pub status: Option<PatchStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClustersMode {
    #[default]
    Full,
    ClusterNames,
}

impl FromStr for ClustersMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "clusternames" => Ok(Self::ClusterNames),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClustersFilter {
    pub mode: ClustersMode,
    pub report: ReportFilter,
}

impl ClustersFilter {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        Ok(Self {
            mode: params
                .choice("mode", "'full' or 'clusternames'")?
                .unwrap_or_default(),
            report: ReportFilter::parse(params)?,
        })
    }
}

/// Inclusive time window, either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub newer_than: Option<DateTime<Utc>>,
    pub older_than: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        Ok(Self {
            newer_than: params.time("newer-than")?,
            older_than: params.time("older-than")?,
        })
    }
}
