//! HTTP client for the attendance REST API.
//!
//! Wraps `reqwest` with bearer authentication, envelope unwrapping and
//! backend error-message extraction. Reads are retried on transient failures;
//! submissions are sent exactly once.

use std::time::Duration;

use attend_core::{AppConfig, AttendanceRecord, Branch};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, FALLBACK_MESSAGE};
use crate::retry::retry_with_backoff;
use crate::types::{BranchDto, CheckRequest, DataEnvelope, ErrorBody};

const BRANCHES_PATH: &str = "branches";
const TODAY_PATH: &str = "attendance-records/today";
const CHECK_IN_PATH: &str = "attendance-records/check-in";
const CHECK_OUT_PATH: &str = "attendance-records/check-out";

/// Client for the attendance REST API.
///
/// Use [`AttendanceClient::from_config`] in binaries or
/// [`AttendanceClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct AttendanceClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for AttendanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl AttendanceClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be built, or [`ClientError::InvalidBaseUrl`] if the configured
    /// base URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.http_user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(&config.api_base_url)?,
            token: config.api_token.clone(),
            max_retries: config.http_max_retries,
            backoff_base_ms: config.http_retry_backoff_base_ms,
        })
    }

    /// Creates a client with a custom base URL and no retries (for testing
    /// with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`AttendanceClient::from_config`].
    pub fn with_base_url(base_url: &str, token: Option<&str>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("attend/0.1 (attendance-kiosk)")
            .build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            token: token.map(str::to_owned),
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Overrides the read retry policy.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches every branch the caller may check in at.
    ///
    /// Branches with an invalid radius are dropped with a warning; branches
    /// without coordinates are kept.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure after retries.
    /// - [`ClientError::Deserialize`] if the body does not match the envelope.
    pub async fn list_branches(&self) -> Result<Vec<Branch>, ClientError> {
        let url = self.build_url(BRANCHES_PATH)?;
        let envelope: DataEnvelope<Vec<BranchDto>> = self.get_json(&url).await?;
        let total = envelope.data.len();
        let branches: Vec<Branch> = envelope
            .data
            .into_iter()
            .filter_map(BranchDto::into_branch)
            .collect();
        tracing::debug!(total, usable = branches.len(), "fetched branches");
        Ok(branches)
    }

    /// Fetches today's attendance record; `None` if nothing is recorded yet.
    ///
    /// # Errors
    ///
    /// Same as [`AttendanceClient::list_branches`].
    pub async fn today_record(&self) -> Result<Option<AttendanceRecord>, ClientError> {
        let url = self.build_url(TODAY_PATH)?;
        let envelope: DataEnvelope<Option<AttendanceRecord>> = self.get_json(&url).await?;
        Ok(envelope.data)
    }

    /// Submits a check-in. Not retried.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] carrying the backend's `message` (or a generic
    ///   fallback) on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    pub async fn check_in(&self, request: &CheckRequest) -> Result<(), ClientError> {
        self.submit(CHECK_IN_PATH, request).await
    }

    /// Submits a check-out. Not retried.
    ///
    /// # Errors
    ///
    /// Same as [`AttendanceClient::check_in`].
    pub async fn check_out(&self, request: &CheckRequest) -> Result<(), ClientError> {
        self.submit(CHECK_OUT_PATH, request).await
    }

    async fn submit(&self, path: &str, request: &CheckRequest) -> Result<(), ClientError> {
        let url = self.build_url(path)?;
        tracing::info!(
            endpoint = path,
            branch_id = %request.branch_id,
            client_time = %request.client_time,
            "submitting attendance"
        );
        let response = self.authorize(self.client.post(url)).json(request).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Joins `path` onto the base URL.
    pub(crate) fn build_url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a GET with retries and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ClientError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.authorize(self.client.get(url.clone())).send().await?;
            let response = Self::check_status(response).await?;
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: url.path().to_string(),
                source: e,
            })
        })
        .await
    }

    /// Passes 2xx responses through; turns anything else into
    /// [`ClientError::Api`] with the backend's message when present.
    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: extract_message(&body),
        })
    }
}

/// Normalises the base URL to end in exactly one slash so relative joins
/// append to the path instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Pulls `message` out of an error body, falling back to a generic text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
