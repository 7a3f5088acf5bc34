// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP plumbing shared by the provider clients.
//!
//! Requests are sent once; there are no retries and no timeouts beyond the client
//! defaults. Status handling is left to the caller because "not found" means a
//! different thing on every endpoint, but authentication failures map the same way
//! everywhere (see [`status_error`]).

use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::errors::{Result, SyncError};

/// A fully read response.
#[derive(Debug)]
pub(crate) struct ApiResponse {
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decode the body into the endpoint's schema.
    pub(crate) fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| SyncError::MalformedResponse {
            endpoint: self.url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Build the HTTP client used for one provider.
pub(crate) fn build_client(config: &ApiConfig) -> Result<HttpClient> {
    HttpClient::builder()
        .user_agent(concat!("ztdns/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| SyncError::Transport {
            url: config.base_url.to_string(),
            source,
        })
}

/// Send one request with bearer authentication and read the whole body.
///
/// # Errors
///
/// Returns [`SyncError::Transport`] if no response was received or the body could
/// not be read. Non-success statuses are returned as a normal [`ApiResponse`].
pub(crate) async fn send<T: Serialize + ?Sized>(
    client: &HttpClient,
    token: &str,
    method: Method,
    url: Url,
    body: Option<&T>,
) -> Result<ApiResponse> {
    debug!(method = %method, url = %url, "HTTP API request");
    if let Some(payload) = body {
        debug!(
            body = %serde_json::to_string(payload).unwrap_or_default(),
            "HTTP API request body"
        );
    }

    let mut request = client.request(method.clone(), url.clone()).bearer_auth(token);
    if let Some(payload) = body {
        request = request.json(payload);
    }

    let response = request.send().await.map_err(|source| SyncError::Transport {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|source| SyncError::Transport {
        url: url.to_string(),
        source,
    })?;

    debug!(
        method = %method,
        url = %url,
        status = %status,
        response_len = body.len(),
        body = %body,
        "HTTP API response"
    );

    Ok(ApiResponse { url, status, body })
}

/// Error for a response that the endpoint-specific handling did not accept.
///
/// 401 and 403 always mean the token was rejected.
pub(crate) fn status_error(provider: &str, response: ApiResponse) -> SyncError {
    match response.status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Authentication {
            provider: provider.to_string(),
        },
        status => SyncError::Http {
            url: response.url.to_string(),
            status: status.as_u16(),
            body: response.body,
        },
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
