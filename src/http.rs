//! Thin HTTP GET layer shared by the forecast fetcher and the grid locator.
//! Every request is bounded by a timeout and transient failures are retried.

use crate::retry::{with_retry, RetryConfig, RetryError};
use log::debug;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    BodyRead(String, #[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub(crate) struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    pub(crate) fn new(timeout: Duration, retry: RetryConfig) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RequestError::ClientBuild)?;
        Ok(Self { client, retry })
    }

    /// GETs `url` and returns the raw body bytes. Callers decode the bytes
    /// themselves, so the declared charset of the response is never trusted.
    pub(crate) async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        with_retry(|| self.get_once(url), &self.retry).await
    }

    async fn get_once(&self, url: &str) -> Result<Vec<u8>, RetryError<RequestError>> {
        let safe_url = redact(url);
        debug!("GET {}", safe_url);

        let response = self.client.get(url).send().await.map_err(|e| {
            let retryable = e.is_timeout() || e.is_connect() || e.is_request();
            classify(retryable, RequestError::NetworkRequest(safe_url.clone(), e.without_url()))
        })?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => classify(
                        is_retryable_status(status),
                        RequestError::HttpStatus {
                            url: safe_url,
                            status,
                            source: e.without_url(),
                        },
                    ),
                    None => RetryError::NonRetryable(RequestError::NetworkRequest(safe_url, e.without_url())),
                });
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RetryError::Retryable(RequestError::BodyRead(safe_url, e.without_url())))?;
        Ok(bytes.to_vec())
    }
}

fn classify(retryable: bool, err: RequestError) -> RetryError<RequestError> {
    if retryable {
        RetryError::Retryable(err)
    } else {
        RetryError::NonRetryable(err)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Masks the `serviceKey` query value so keys never end up in logs or errors.
pub(crate) fn redact(url: &str) -> String {
    const KEY: &str = "serviceKey=";
    match url.find(KEY) {
        Some(start) => {
            let value_start = start + KEY.len();
            let value_end = url[value_start..]
                .find('&')
                .map(|i| value_start + i)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
