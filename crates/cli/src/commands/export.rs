//! Spreadsheet downloads

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::Path;

use crate::client::{ApiClient, LMS_MEDIA_TYPE, XLSX_MEDIA_TYPE};
use crate::output::print_success;

/// Reports that can be downloaded as a workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Report {
    Hosts,
    /// Oracle LMS "Database & EBS" sheet
    Lms,
    Addms,
    SegmentAdvisors,
    PatchAdvisors,
    Clusters,
    Alerts,
    PostgresqlInstances,
}

impl Report {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Hosts | Self::Lms => "hosts",
            Self::Addms => "addms",
            Self::SegmentAdvisors => "segment-advisors",
            Self::PatchAdvisors => "patch-advisors",
            Self::Clusters => "clusters",
            Self::Alerts => "alerts",
            Self::PostgresqlInstances => "postgresql/instances",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Lms => LMS_MEDIA_TYPE,
            _ => XLSX_MEDIA_TYPE,
        }
    }
}

pub async fn export_report(
    client: &ApiClient,
    report: Report,
    query: Vec<(&'static str, String)>,
    output: &Path,
) -> Result<()> {
    let bytes = client
        .download(report.path(), &query, report.media_type())
        .await?;

    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    print_success(&format!(
        "Exported {} ({} bytes) to {}",
        report.path(),
        bytes.len(),
        output.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_export_writes_workbook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/segment-advisors")
            .match_query(mockito::Matcher::UrlEncoded(
                "location".into(),
                "Italy".into(),
            ))
            .match_header("accept", XLSX_MEDIA_TYPE)
            .with_header("content-type", XLSX_MEDIA_TYPE)
            .with_body(b"PK\x03\x04workbook")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("segment_advisors.xlsx");
        let client = ApiClient::new(&server.url()).unwrap();

        export_report(
            &client,
            Report::SegmentAdvisors,
            vec![("location", "Italy".to_string())],
            &output,
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read(&output).unwrap(), b"PK\x03\x04workbook");
    }

    #[tokio::test]
    async fn test_failed_export_leaves_no_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/addms")
            .match_query(mockito::Matcher::Any)
            .with_status(422)
            .with_body(r#"{"error":"invalid older-than","message":"Unprocessable Entity"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("addms.xlsx");
        let client = ApiClient::new(&server.url()).unwrap();

        let err = export_report(
            &client,
            Report::Addms,
            vec![("older-than", "yesterday".to_string())],
            &output,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("invalid older-than"));
        assert!(!output.exists());
    }

    #[test]
    fn test_lms_uses_hosts_route() {
        assert_eq!(Report::Lms.path(), "hosts");
        assert_eq!(Report::Lms.media_type(), LMS_MEDIA_TYPE);
        assert_eq!(Report::PostgresqlInstances.path(), "postgresql/instances");
    }
}
