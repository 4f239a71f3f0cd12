//! HTTP client for the inventory reporting API

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Spreadsheet media type accepted by the export routes
pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Oracle LMS workbook media type, only offered by `/hosts`
pub const LMS_MEDIA_TYPE: &str =
    "application/vnd.oracle.lms+vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A non-success answer from the server
#[derive(Debug, Error)]
#[error("API error ({status}): {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Error body written by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        // Paths are joined relative to the base, which must end with a slash
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)
        } else {
            Url::parse(&format!("{base_url}/"))
        }
        .context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path).context("Invalid path")?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ApiError { status, message }.into());
        }
        Ok(response)
    }

    /// GET a JSON document
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path, query)?;
        let response = self
            .send(self.client.get(url).header(header::ACCEPT, "application/json"))
            .await?;

        response.json().await.context("Failed to parse response")
    }

    /// GET a binary export negotiated through `accept`
    pub async fn download(
        &self,
        path: &str,
        query: &[(&str, String)],
        accept: &str,
    ) -> Result<Vec<u8>> {
        let url = self.url(path, query)?;
        let response = self.send(self.client.get(url).header(header::ACCEPT, accept)).await?;

        let bytes = response.bytes().await.context("Failed to read response")?;
        Ok(bytes.to_vec())
    }

    /// POST a JSON body, decoding the JSON answer
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path, &[])?;
        let response = self.send(self.client.post(url).json(body)).await?;

        response.json().await.context("Failed to parse response")
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path, &[])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PagingMetadata {
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// A report answer, enveloped when the request was paged
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    #[serde(rename_all = "PascalCase")]
    Paged {
        content: Vec<T>,
        metadata: PagingMetadata,
    },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Self::Paged { content, .. } => content,
            Self::Plain(items) => items,
        }
    }

    pub fn metadata(&self) -> Option<&PagingMetadata> {
        match self {
            Self::Paged { metadata, .. } => Some(metadata),
            Self::Plain(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Host {
    pub hostname: String,
    pub location: String,
    pub environment: String,
    #[serde(rename = "OS", default)]
    pub os: String,
    #[serde(rename = "CPUCores", default)]
    pub cpu_cores: i64,
    #[serde(default)]
    pub databases: Vec<String>,
    #[serde(default)]
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Addm {
    pub hostname: String,
    pub dbname: String,
    pub environment: String,
    pub finding: String,
    pub benefit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SegmentAdvisor {
    pub hostname: String,
    pub dbname: String,
    pub segment_owner: String,
    pub segment_name: String,
    pub segment_type: String,
    pub reclaimable: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatchAdvisor {
    pub hostname: String,
    pub dbname: String,
    pub dbver: String,
    #[serde(default)]
    pub date: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cluster {
    pub name: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "CPU", default)]
    pub cpu: i64,
    #[serde(default)]
    pub sockets: i64,
    #[serde(rename = "VMsCount", default)]
    pub vms_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub alert_code: String,
    pub alert_severity: String,
    pub alert_status: String,
    pub date: String,
    #[serde(default)]
    pub hostname: String,
    pub description: String,
}

/// Body of the alert status routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsSelection {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_severity: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedAlerts {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_sends_query_and_accepts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/addms")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("location".into(), "Italy".into()),
                mockito::Matcher::UrlEncoded("search".into(), "foo bar".into()),
            ]))
            .match_header("accept", "application/json")
            .with_body(
                r#"[{"Hostname":"test-db","Dbname":"ERCOLE","Environment":"TST","Finding":"f","Benefit":83.34}]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let addms: Listing<Addm> = client
            .get(
                "addms",
                &[("location", "Italy".to_string()), ("search", "foo bar".to_string())],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(addms.metadata().is_none());
        assert_eq!(addms.items()[0].dbname, "ERCOLE");
    }

    #[tokio::test]
    async fn test_paged_listing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/hosts")
            .match_query(mockito::Matcher::Any)
            .with_body(
                r#"{"Content":[{"Hostname":"h1","Location":"Italy","Environment":"PRD"}],
                    "Metadata":{"Number":1,"Size":1,"TotalElements":4,"TotalPages":4,
                                "First":true,"Last":false,"Empty":false}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let hosts: Listing<Host> = client.get("hosts", &[]).await.unwrap();

        assert_eq!(hosts.items().len(), 1);
        assert_eq!(hosts.metadata().unwrap().total_pages, 4);
    }

    #[tokio::test]
    async fn test_error_body_becomes_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/hosts/foobar")
            .with_status(403)
            .with_body(r#"{"error":"the server is in read-only mode","message":"Forbidden"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.delete("hosts/foobar").await.unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();

        assert_eq!(api_error.status, StatusCode::FORBIDDEN);
        assert_eq!(api_error.message, "the server is in read-only mode");
    }

    #[tokio::test]
    async fn test_download_negotiates_media_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/hosts")
            .match_header("accept", LMS_MEDIA_TYPE)
            .with_body(vec![0x50, 0x4b, 0x03, 0x04])
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let bytes = client.download("hosts", &[], LMS_MEDIA_TYPE).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    }
}
