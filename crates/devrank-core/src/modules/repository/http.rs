use async_trait::async_trait;
use devrank_types::models::StoreConfig;
use devrank_types::{Category, DeviceScoreRecord, LeaderboardEntry, StoreError};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{LeaderboardStore, StoreResult};

/// Document store reached over a JSON REST endpoint.
///
/// ```text
/// POST {base}/v1/collections/{collection}/documents                      -> {"id": "..."}
/// GET  {base}/v1/collections/{collection}/documents?category=&limit=     -> [DeviceScoreRecord]
/// GET  {base}/v1/collections/{collection}/documents?normalizedDeviceId=&limit= -> [LeaderboardEntry]
/// ```
pub struct HttpDocumentStore {
    http_client: Client,
    documents_url: Url,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct CreatedDocument {
    id: String,
}

impl HttpDocumentStore {
    /// Accepts a pre-built client so TLS setup stays outside the async runtime.
    pub fn new(http_client: Client, base_url: &str, collection: &str) -> Result<Self, StoreError> {
        let base = base_url.trim().trim_end_matches('/');
        let documents_url = Url::parse(&format!("{}/v1/collections/{}/documents", base, collection))
            .map_err(|e| StoreError::Unavailable {
                message: format!("invalid store url {:?}: {}", base_url, e),
            })?;
        Ok(Self { http_client, documents_url, api_key: None })
    }

    /// Build from configuration; `None` when no base URL is configured.
    pub fn from_config(config: &StoreConfig) -> Result<Option<Self>, StoreError> {
        let Some(base_url) = config.base_url.as_deref() else {
            return Ok(None);
        };
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoreError::Unavailable { message: e.to_string() })?;
        let mut store = Self::new(http_client, base_url, &config.collection)?;
        store.api_key = config.api_key.clone();
        Ok(Some(store))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable { message: e.to_string() })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound { what: self.documents_url.to_string() });
        }
        Err(StoreError::Rejected { status: status.as_u16(), message: body })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable { message: e.to_string() })?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::from_json_error(&e))
    }

    async fn query<T: DeserializeOwned>(&self, filter: (&str, &str), limit: usize) -> StoreResult<T> {
        let mut url = self.documents_url.clone();
        url.query_pairs_mut()
            .append_pair(filter.0, filter.1)
            .append_pair("limit", &limit.to_string());
        let response = self.send(self.http_client.get(url)).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl LeaderboardStore for HttpDocumentStore {
    async fn append_entry(&self, entry: &LeaderboardEntry) -> StoreResult<String> {
        let request = self.http_client.post(self.documents_url.clone()).json(entry);
        let response = self.send(request).await?;
        let created: CreatedDocument = Self::decode(response).await?;
        tracing::debug!("[HttpStore] Created document {}", created.id);
        Ok(created.id)
    }

    async fn fetch_category(
        &self,
        category: Category,
        limit: usize,
    ) -> StoreResult<Vec<DeviceScoreRecord>> {
        self.query(("category", category.as_str()), limit).await
    }

    async fn fetch_device_entries(
        &self,
        normalized_device_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        self.query(("normalizedDeviceId", normalized_device_id), limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCS_PATH: &str = "/v1/collections/leaderboard_entries/documents";

    fn entry() -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: "user-1".to_string(),
            normalized_device_id: "google_pixel_7".to_string(),
            hardware_id: "google_panther".to_string(),
            timestamp: 1_700_000_000_000,
            normalized_brand: "Google".to_string(),
            normalized_model: "Pixel 7".to_string(),
            display_name: "Google Pixel 7".to_string(),
            os_version: "14".to_string(),
            scores: BTreeMap::from([(Category::PowerEfficiency, 59.0)]),
            data_quality: 3,
            measurement_count: 9,
            last_measurement_date: Some("2023-11-14".to_string()),
        }
    }

    fn store(server: &MockServer) -> HttpDocumentStore {
        HttpDocumentStore::new(Client::new(), &server.uri(), "leaderboard_entries")
            .unwrap()
            .with_api_key("secret")
    }

    #[tokio::test]
    async fn test_append_posts_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DOCS_PATH))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "normalizedDeviceId": "google_pixel_7",
                "scores": {"power_efficiency": 59.0}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "doc-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = store(&server).append_entry(&entry()).await.unwrap();
        assert_eq!(id, "doc-1");
    }

    #[tokio::test]
    async fn test_rejection_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DOCS_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("write denied"))
            .mount(&server)
            .await;

        let err = store(&server).append_entry(&entry()).await.unwrap_err();
        assert_eq!(err, StoreError::Rejected { status: 403, message: "write denied".to_string() });
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_category_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOCS_PATH))
            .and(query_param("category", "thermal_efficiency"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "normalizedDeviceId": "google_pixel_7",
                "displayName": "Google Pixel 7",
                "brand": "Google",
                "model": "Pixel 7",
                "score": 72.5,
                "userCount": 4,
                "topScore": 90.0,
                "dataQuality": 3
            }])))
            .mount(&server)
            .await;

        let records =
            store(&server).fetch_category(Category::ThermalEfficiency, 100).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_count, 4);
        assert_eq!(records[0].top_score, 90.0);
    }

    #[tokio::test]
    async fn test_bad_payload_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOCS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = store(&server).fetch_device_entries("google_pixel_7", 10).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_is_transient() {
        let store =
            HttpDocumentStore::new(Client::new(), "http://127.0.0.1:9", "leaderboard_entries")
                .unwrap();
        let err = store.append_entry(&entry()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn test_from_config_without_url() {
        assert!(HttpDocumentStore::from_config(&StoreConfig::default()).unwrap().is_none());
    }
}
