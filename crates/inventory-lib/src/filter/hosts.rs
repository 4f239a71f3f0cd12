use std::str::FromStr;

use super::{FilterError, FilterResult, QueryParams, ReportFilter};

/// Output shape requested from `GET /hosts`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostsMode {
    #[default]
    Full,
    Summary,
    Lms,
    Mhd,
}

impl FromStr for HostsMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "summary" => Ok(Self::Summary),
            "lms" => Ok(Self::Lms),
            "mhd" => Ok(Self::Mhd),
            _ => Err(()),
        }
    }
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range<T> {
    pub lte: Option<T>,
    pub gte: Option<T>,
}

impl<T> Range<T> {
    pub fn is_unbounded(&self) -> bool {
        self.lte.is_none() && self.gte.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClusterCriterion {
    #[default]
    Any,
    /// Only hosts that are not a VM of any known cluster (`cluster=NULL`)
    Unclustered,
    Named(String),
}

/// Host-specific predicates of `GET /hosts`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostCriteria {
    pub hostname: Option<String>,
    pub database: Option<String>,
    pub asset: Option<String>,
    pub hardware_abstraction_technology: Option<String>,
    pub cluster: ClusterCriterion,
    pub physical_host: Option<String>,
    pub operating_system: Option<String>,
    pub kernel: Option<String>,
    pub memory_total: Range<f64>,
    pub swap_total: Range<f64>,
    pub is_member_of_cluster: Option<bool>,
    pub cpu_model: Option<String>,
    pub cpu_cores: Range<i64>,
    pub cpu_threads: Range<i64>,
}

impl HostCriteria {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        let asset = match params.get("asset") {
            None => None,
            Some(raw)
                if raw
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') =>
            {
                Some(raw.to_string())
            }
            Some(raw) => return Err(FilterError::new("asset", raw, "an asset name")),
        };

        let cluster = match params.get("cluster") {
            None => ClusterCriterion::Any,
            Some("NULL") => ClusterCriterion::Unclustered,
            Some(name) => ClusterCriterion::Named(name.to_string()),
        };

        Ok(Self {
            hostname: params.string("hostname"),
            database: params.string("database"),
            asset,
            hardware_abstraction_technology: params.string("hardware-abstraction-technology"),
            cluster,
            physical_host: params.string("physical-host"),
            operating_system: params.string("operating-system"),
            kernel: params.string("kernel"),
            memory_total: Range {
                lte: params.float("memory-total-lte")?,
                gte: params.float("memory-total-gte")?,
            },
            swap_total: Range {
                lte: params.float("swap-total-lte")?,
                gte: params.float("swap-total-gte")?,
            },
            is_member_of_cluster: params.optional_bool("is-member-of-cluster")?,
            cpu_model: params.string("cpu-model"),
            cpu_cores: Range {
                lte: params.int("cpu-cores-lte")?,
                gte: params.int("cpu-cores-gte")?,
            },
            cpu_threads: Range {
                lte: params.int("cpu-threads-lte")?,
                gte: params.int("cpu-threads-gte")?,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostsFilter {
    pub mode: HostsMode,
    pub report: ReportFilter,
    pub criteria: HostCriteria,
}

impl HostsFilter {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        Ok(Self {
            mode: params
                .choice("mode", "'full', 'summary', 'lms' or 'mhd'")?
                .unwrap_or_default(),
            report: ReportFilter::parse(params)?,
            criteria: HostCriteria::parse(params)?,
        })
    }
}
