//! Response rendering: media type negotiation and spreadsheet exports

mod reports;
mod xlsx;

pub use reports::{
    ADDM_LAYOUT, ALERTS_LAYOUT, CLUSTERS_LAYOUT, CLUSTER_VMS_LAYOUT, HOSTS_LAYOUT, LMS_LAYOUT,
    PATCH_ADVISOR_LAYOUT, POSTGRESQL_INSTANCES_LAYOUT, SEGMENT_ADVISOR_LAYOUT,
};
pub use xlsx::{build_workbook, Cell, SheetLayout, SheetRow};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Output formats a route may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Json,
    Xlsx,
    LmsXlsx,
    ExtendedJson,
}

impl MediaType {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::LmsXlsx => {
                "application/vnd.oracle.lms+vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::ExtendedJson => "application/vnd.ercole.mongohostdata+json",
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Xlsx | Self::LmsXlsx)
    }
}

/// One `Accept` entry
#[derive(Debug, Clone, PartialEq)]
struct MediaRange<'a> {
    kind: &'a str,
    subtype: &'a str,
    quality: f32,
}

impl<'a> MediaRange<'a> {
    fn parse(entry: &'a str) -> Option<Self> {
        let mut parts = entry.split(';');
        let (kind, subtype) = parts.next()?.trim().split_once('/')?;
        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.trim().split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse().ok()?;
                }
            }
        }
        Some(Self {
            kind: kind.trim(),
            subtype: subtype.trim(),
            quality,
        })
    }

    /// Higher is more specific, `None` when the range does not cover `mime`
    fn specificity(&self, mime: &str) -> Option<u8> {
        let (kind, subtype) = mime.split_once('/')?;
        match (self.kind, self.subtype) {
            ("*", "*") => Some(0),
            (k, "*") if k.eq_ignore_ascii_case(kind) => Some(1),
            (k, s) if k.eq_ignore_ascii_case(kind) && s.eq_ignore_ascii_case(subtype) => Some(2),
            _ => None,
        }
    }
}

/// Picks the offered media type the client prefers.
///
/// Each offer takes the quality of the most specific matching range; `q=0`
/// excludes it. Ties go to the earlier offer. Without an acceptable offer the
/// response is JSON.
pub fn negotiate(accept: Option<&str>, offered: &[MediaType]) -> MediaType {
    let Some(accept) = accept.filter(|a| !a.trim().is_empty()) else {
        return MediaType::Json;
    };
    let ranges: Vec<MediaRange<'_>> = accept.split(',').filter_map(MediaRange::parse).collect();

    let mut best: Option<(MediaType, f32)> = None;
    for offer in offered {
        let quality = ranges
            .iter()
            .filter_map(|range| range.specificity(offer.mime()).map(|s| (s, range.quality)))
            .max_by_key(|(specificity, _)| *specificity)
            .map(|(_, quality)| quality);
        match quality {
            Some(q) if q > 0.0 && best.map_or(true, |(_, b)| q > b) => best = Some((*offer, q)),
            _ => {}
        }
    }
    best.map_or(MediaType::Json, |(media, _)| media)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &[MediaType] = &[MediaType::Json, MediaType::Xlsx];
    const HOSTS: &[MediaType] = &[
        MediaType::Json,
        MediaType::Xlsx,
        MediaType::LmsXlsx,
        MediaType::ExtendedJson,
    ];

    #[test]
    fn test_missing_accept_is_json() {
        assert_eq!(negotiate(None, REPORT), MediaType::Json);
        assert_eq!(negotiate(Some(""), REPORT), MediaType::Json);
    }

    #[test]
    fn test_exact_spreadsheet() {
        assert_eq!(
            negotiate(Some(MediaType::Xlsx.mime()), REPORT),
            MediaType::Xlsx
        );
    }

    #[test]
    fn test_lms_is_not_confused_with_plain_xlsx() {
        assert_eq!(
            negotiate(Some(MediaType::LmsXlsx.mime()), HOSTS),
            MediaType::LmsXlsx
        );
    }

    #[test]
    fn test_quality_values_rank_offers() {
        let accept = "application/json;q=0.5, application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
        assert_eq!(negotiate(Some(accept), REPORT), MediaType::Xlsx);
    }

    #[test]
    fn test_zero_quality_excludes() {
        let accept = "*/*, application/json;q=0";
        assert_eq!(negotiate(Some(accept), REPORT), MediaType::Xlsx);
    }

    #[test]
    fn test_wildcards_prefer_first_offer() {
        assert_eq!(negotiate(Some("*/*"), REPORT), MediaType::Json);
        assert_eq!(negotiate(Some("application/*"), HOSTS), MediaType::Json);
    }

    #[test]
    fn test_unsupported_type_falls_back_to_json() {
        assert_eq!(negotiate(Some("text/html"), REPORT), MediaType::Json);
    }

    #[test]
    fn test_extended_json() {
        let accept = "application/vnd.ercole.mongohostdata+json";
        assert_eq!(negotiate(Some(accept), HOSTS), MediaType::ExtendedJson);
        assert_eq!(negotiate(Some(accept), REPORT), MediaType::Json);
    }
}
