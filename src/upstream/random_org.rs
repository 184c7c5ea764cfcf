//! random.org JSON-RPC client.
//!
//! Calls the `generateIntegers` method and maps transport, HTTP and
//! JSON-RPC failures into [`FetchError`].

use crate::config::UpstreamConfig;
use crate::error::FetchError;
use crate::models::{FetchRequest, FetchResult};
use crate::upstream::Fetcher;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Inclusive lower bound of every generated value.
pub const VALUE_MIN: i64 = 1;

/// Inclusive upper bound of every generated value.
pub const VALUE_MAX: i64 = 10;

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: GenerateIntegersParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateIntegersParams<'a> {
    api_key: &'a str,
    n: usize,
    min: i64,
    max: i64,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<RpcResult>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    random: RandomData,
}

#[derive(Debug, Deserialize)]
struct RandomData {
    data: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

/// Client for the random.org `generateIntegers` method.
pub struct RandomOrgClient {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
    request_id: u64,
    timeout_seconds: u64,
}

impl RandomOrgClient {
    /// Build a client from upstream settings. A missing key is sent as an empty
    /// string and rejected by the service.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            url: config.url.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            request_id: config.request_id,
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn build_request(&self, length: usize) -> RpcRequest<'_> {
        RpcRequest {
            jsonrpc: "2.0",
            method: "generateIntegers",
            params: GenerateIntegersParams {
                api_key: &self.api_key,
                n: length,
                min: VALUE_MIN,
                max: VALUE_MAX,
            },
            id: self.request_id,
        }
    }

    fn classify_error(&self, e: &reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_seconds)
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Turn a decoded JSON-RPC response into the requested sequence.
fn interpret_response(response: RpcResponse, expected: usize) -> FetchResult {
    if let Some(error) = response.error {
        return Err(FetchError::Api(error.message));
    }

    let data = response
        .result
        .ok_or(FetchError::MissingResult)?
        .random
        .data;

    if data.len() != expected {
        return Err(FetchError::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }

    if let Some(&value) = data.iter().find(|v| !(VALUE_MIN..=VALUE_MAX).contains(*v)) {
        return Err(FetchError::OutOfRange {
            value,
            min: VALUE_MIN,
            max: VALUE_MAX,
        });
    }

    Ok(data)
}

#[async_trait::async_trait]
impl Fetcher for RandomOrgClient {
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        let start = tokio::time::Instant::now();
        debug!(
            slot = request.slot,
            length = request.length,
            url = %self.url,
            "upstream fetch start"
        );

        let response = self
            .http_client
            .post(&self.url)
            .json(&self.build_request(request.length))
            .send()
            .await
            .map_err(|e| {
                warn!(slot = request.slot, error = %e, "upstream request failed");
                self.classify_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| self.classify_error(&e))?;

        let result = interpret_response(body, request.length);
        debug!(
            slot = request.slot,
            latency_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "upstream fetch done"
        );
        result
    }
}
