// # DNSimple DNS Provider
//
// This crate provides a DNSimple API v2 implementation of `DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per trait call; no retry, backoff or caching
// - HTTP timeout configured (30 seconds)
// - Reads with a non-success status are errors
// - Writes return the raw status and body; the core decides what success is
// - The zone apex (`@` in the core) is sent as the empty name
//
// ## Security Requirements
//
// - API token NEVER appears in logs
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - DNSimple API v2: https://developer.dnsimple.com/v2/
// - List Zones: GET `/:account/zones?per_page=100&page=N`
// - List Records: GET `/:account/zones/:zone/records?name=...&type=...`
// - Create Record: POST `/:account/zones/:zone/records` (201)
// - Update Record: PATCH `/:account/zones/:zone/records/:record` (200)
// - Delete Record: DELETE `/:account/zones/:zone/records/:record` (204)

use anyhow::Context;
use async_trait::async_trait;
use dnshook_core::config::ProviderConfig;
use dnshook_core::model::{ExistingRecord, RecordId, RecordName, RecordType, ZoneId};
use dnshook_core::traits::{DnsProvider, RecordPage, WriteResponse, ZoneEntry, ZonePage};
use dnshook_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// DNSimple production API base URL
pub const DNSIMPLE_API_BASE: &str = "https://api.dnsimple.com/v2";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "dnsimple";

/// Failures talking to the API, before the core sees them
#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication failed: invalid API token or insufficient permissions. Status: {0}")]
    Unauthorized(u16),

    #[error("Rate limit exceeded. Status: {0}")]
    RateLimited(u16),

    #[error("{context}: {status} - {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::provider(PROVIDER, err.to_string())
    }
}

/// `{"data": ..., "pagination": {...}}` response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    fn total_pages(&self) -> u32 {
        self.pagination.as_ref().map_or(1, |p| p.total_pages)
    }
}

#[derive(Debug, Deserialize)]
struct Pagination {
    total_pages: u32,
}

/// DNSimple ids are integers; accept strings too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireZone {
    id: WireId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    id: WireId,
    content: String,
    ttl: u32,
}

#[derive(Debug, Serialize)]
struct CreateRecord<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    content: &'a str,
    ttl: u32,
}

#[derive(Debug, Serialize)]
struct UpdateRecord<'a> {
    name: &'a str,
    content: &'a str,
    ttl: u32,
}

/// Name as DNSimple expects it: the apex is the empty string
fn wire_name(name: &str) -> &str {
    if name == RecordName::APEX { "" } else { name }
}

/// DNSimple DNS provider
///
/// Stateless apart from the HTTP client. One instance serves every zone in
/// the account.
pub struct DnsimpleProvider {
    /// `{api_base}/{account_id}`
    account_url: String,

    /// Bearer token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DnsimpleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsimpleProvider")
            .field("account_url", &self.account_url)
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

impl DnsimpleProvider {
    /// Create a new DNSimple provider
    ///
    /// # Parameters
    ///
    /// - `api_base`: API root, normally [`DNSIMPLE_API_BASE`]
    /// - `account_id`: account the zones belong to
    /// - `api_token`: token with zone read/write access
    pub fn new(
        api_base: impl AsRef<str>,
        account_id: impl AsRef<str>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("DNSimple API token cannot be empty"));
        }

        let account_id = account_id.as_ref();
        if account_id.is_empty() {
            return Err(Error::config("DNSimple account id cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            account_url: format!("{}/{}", api_base.as_ref().trim_end_matches('/'), account_id),
            api_token,
            client,
        })
    }

    /// Build a provider from its configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Dnsimple {
                account_id,
                api_token,
                api_base,
            } => Self::new(api_base, account_id, api_token.clone()),
            other => Err(Error::config(format!(
                "Invalid config for DNSimple provider: {}",
                other.type_name()
            ))),
        }
    }

    fn records_url(&self, zone_id: &ZoneId) -> String {
        format!("{}/zones/{}/records", self.account_url, zone_id)
    }

    fn record_url(&self, zone_id: &ZoneId, record_id: &RecordId) -> String {
        format!("{}/zones/{}/records/{}", self.account_url, zone_id, record_id)
    }

    /// GET a listing and decode its envelope
    async fn get_listing<T>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        context: &'static str,
    ) -> std::result::Result<Envelope<T>, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status {
                401 | 403 => ApiError::Unauthorized(status),
                429 => ApiError::RateLimited(status),
                _ => ApiError::Status {
                    context,
                    status,
                    body,
                },
            });
        }

        Ok(response.json().await?)
    }

    /// Send a write and hand back whatever came back
    async fn send_write(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<WriteResponse, ApiError> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(WriteResponse::new(status, body))
    }
}

#[async_trait]
impl DnsProvider for DnsimpleProvider {
    async fn list_zones(&self, page: u32, page_size: u32) -> Result<ZonePage> {
        tracing::debug!(page, page_size, "listing dnsimple zones");

        let url = format!("{}/zones", self.account_url);
        let page_param = page.to_string();
        let per_page_param = page_size.to_string();
        let envelope: Envelope<Vec<WireZone>> = self
            .get_listing(
                &url,
                &[("per_page", &per_page_param), ("page", &page_param)],
                "Zone listing failed",
            )
            .await?;

        let total_pages = envelope.total_pages();
        let zones = envelope
            .data
            .into_iter()
            .map(|zone| ZoneEntry {
                id: ZoneId(zone.id.into_string()),
                name: zone.name,
            })
            .collect();

        Ok(ZonePage { zones, total_pages })
    }

    async fn list_records(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
    ) -> Result<RecordPage> {
        tracing::debug!(%zone_id, name, %record_type, "listing dnsimple records");

        let envelope: Envelope<Vec<WireRecord>> = self
            .get_listing(
                &self.records_url(zone_id),
                &[("name", wire_name(name)), ("type", record_type.as_str())],
                "Record listing failed",
            )
            .await?;

        let total_pages = envelope.total_pages();
        let records = envelope
            .data
            .into_iter()
            .map(|record| ExistingRecord {
                id: RecordId(record.id.into_string()),
                content: record.content,
                ttl: record.ttl,
            })
            .collect();

        Ok(RecordPage {
            records,
            total_pages,
        })
    }

    async fn create_record(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse> {
        let payload = CreateRecord {
            name: wire_name(name),
            record_type: record_type.as_str(),
            content,
            ttl,
        };
        let request = self.client.post(self.records_url(zone_id)).json(&payload);
        Ok(self.send_write(request).await?)
    }

    async fn update_record(
        &self,
        zone_id: &ZoneId,
        record_id: &RecordId,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse> {
        let payload = UpdateRecord {
            name: wire_name(name),
            content,
            ttl,
        };
        let request = self
            .client
            .patch(self.record_url(zone_id, record_id))
            .json(&payload);
        Ok(self.send_write(request).await?)
    }

    async fn delete_record(&self, zone_id: &ZoneId, record_id: &RecordId) -> Result<WriteResponse> {
        let request = self.client.delete(self.record_url(zone_id, record_id));
        Ok(self.send_write(request).await?)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{DELETE, GET, PATCH, POST};
    use httpmock::MockServer;
    use serde_json::json;

    const TOKEN: &str = "test_token";

    fn provider(server: &MockServer) -> DnsimpleProvider {
        DnsimpleProvider::new(server.base_url(), "1010", TOKEN).unwrap()
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = DnsimpleProvider::new(DNSIMPLE_API_BASE, "1010", "");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_config_rejects_other_providers() {
        let config = ProviderConfig::Memory { zones: vec![] };
        assert!(DnsimpleProvider::from_config(&config).is_err());

        let config = ProviderConfig::dnsimple("1010", "token");
        let provider = DnsimpleProvider::from_config(&config).unwrap();
        assert_eq!(provider.account_url, "https://api.dnsimple.com/v2/1010");
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = DnsimpleProvider::new(DNSIMPLE_API_BASE, "1010", "secret_token_12345").unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("DnsimpleProvider"));
    }

    #[test]
    fn test_apex_maps_to_empty_name() {
        assert_eq!(wire_name("@"), "");
        assert_eq!(wire_name("test"), "test");
    }

    #[tokio::test]
    async fn test_list_zones() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/1010/zones")
                    .query_param("per_page", "100")
                    .query_param("page", "2")
                    .header("Authorization", "Bearer test_token");
                then.status(200).json_body(json!({
                    "data": [
                        { "id": 1, "account_id": 1010, "name": "example.com", "reverse": false },
                        { "id": 2, "account_id": 1010, "name": "example.org", "reverse": false }
                    ],
                    "pagination": { "current_page": 2, "per_page": 100, "total_entries": 102, "total_pages": 2 }
                }));
            })
            .await;

        let page = provider(&server).list_zones(2, 100).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.zones.len(), 2);
        assert_eq!(page.zones[0].id, ZoneId("1".into()));
        assert_eq!(page.zones[1].name, "example.org");
    }

    #[tokio::test]
    async fn test_list_records_for_apex() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/1010/zones/1/records")
                    .query_param("name", "")
                    .query_param("type", "TXT");
                then.status(200).json_body(json!({
                    "data": [
                        { "id": 5, "zone_id": "example.com", "name": "", "content": "abc", "ttl": 60, "type": "TXT" }
                    ],
                    "pagination": { "current_page": 1, "per_page": 30, "total_entries": 1, "total_pages": 1 }
                }));
            })
            .await;

        let page = provider(&server)
            .list_records(&ZoneId("1".into()), "@", RecordType::Txt)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.total_pages, 1);
        assert_eq!(
            page.records,
            vec![ExistingRecord {
                id: RecordId("5".into()),
                content: "abc".into(),
                ttl: 60
            }]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/1010/zones");
                then.status(500).body("upstream broke");
            })
            .await;

        let err = provider(&server).list_zones(1, 100).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"), "{}", message);
        assert!(message.contains("upstream broke"), "{}", message);
    }

    #[tokio::test]
    async fn test_unauthorized_listing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/1010/zones");
                then.status(401).body("{\"message\":\"Authentication failed\"}");
            })
            .await;

        let err = provider(&server).list_zones(1, 100).await.unwrap_err();
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[tokio::test]
    async fn test_create_sends_type() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/1010/zones/1/records")
                    .json_body(json!({ "name": "test", "type": "TXT", "content": "abc123", "ttl": 60 }));
                then.status(201).json_body(json!({ "data": { "id": 9 } }));
            })
            .await;

        let response = provider(&server)
            .create_record(&ZoneId("1".into()), "test", RecordType::Txt, "abc123", 60)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_update_omits_type() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/1010/zones/1/records/5")
                    .json_body(json!({ "name": "", "content": "192.0.2.1", "ttl": 60 }));
                then.status(200).json_body(json!({ "data": { "id": 5 } }));
            })
            .await;

        let response = provider(&server)
            .update_record(&ZoneId("1".into()), &RecordId("5".into()), "@", "192.0.2.1", 60)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_write_status_passed_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/1010/zones/1/records/5");
                then.status(404).body("{\"message\":\"Record `5` not found\"}");
            })
            .await;

        let response = provider(&server)
            .delete_record(&ZoneId("1".into()), &RecordId("5".into()))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(response.body.contains("not found"));
    }
}
