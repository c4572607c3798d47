use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use salesdesk_core::{
    CallOutcomeRecord, FetchHints, MutationRequest, MutationSummary, Record, UserOption,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{BackendError, FailureKind};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Root of the REST API, e.g. `https://crm.example.com/api`.
    pub base_url: String,
    pub api_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Data-access operations the console core depends on.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Snapshot fetch. Hints are advisory; callers re-filter locally.
    async fn fetch_records(&self, hints: &FetchHints) -> Result<Vec<Record>, BackendError>;

    async fn fetch_users(&self) -> Result<Vec<UserOption>, BackendError>;

    async fn mutate(&self, request: &MutationRequest) -> Result<MutationSummary, BackendError>;

    async fn save_call_outcome(&self, record: &CallOutcomeRecord) -> Result<(), BackendError>;
}

#[derive(Debug, Clone)]
pub struct RestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, BackendError> {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.settings.api_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::new(
                FailureKind::Unauthorized,
                status.to_string(),
            ));
        }
        if !status.is_success() {
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn get_json<T: DeserializeOwned + Send>(&self, url: Url) -> Result<T, BackendError> {
        let bytes = self.send(Method::GET, url, None).await?;
        decode(&bytes)
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Vec<u8>, BackendError> {
        let body = serde_json::to_vec(body)
            .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))?;
        self.send(Method::POST, url, Some(body)).await
    }

    fn too_large(&self, actual: Option<u64>) -> BackendError {
        BackendError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual,
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Backend for RestBackend {
    async fn fetch_records(&self, hints: &FetchHints) -> Result<Vec<Record>, BackendError> {
        let mut url = self.endpoint("records")?;
        {
            let mut pairs = url.query_pairs_mut();
            let hint_pairs = [
                ("q", &hints.query),
                ("territory", &hints.territory),
                ("industry", &hints.industry),
                ("owner", &hints.owner),
            ];
            for (key, value) in hint_pairs {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_json(url).await
    }

    async fn fetch_users(&self) -> Result<Vec<UserOption>, BackendError> {
        let url = self.endpoint("users")?;
        self.get_json(url).await
    }

    async fn mutate(&self, request: &MutationRequest) -> Result<MutationSummary, BackendError> {
        let url = self.endpoint("records/bulk")?;
        let bytes = self.post_json(url, request).await?;
        decode(&bytes)
    }

    async fn save_call_outcome(&self, record: &CallOutcomeRecord) -> Result<(), BackendError> {
        let url = self.endpoint("calls")?;
        self.post_json(url, record).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BackendError> {
    serde_json::from_slice(bytes)
        .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
