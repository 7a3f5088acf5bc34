// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! ZeroTier Central API client (membership source).
//!
//! Two calls per run:
//!
//! - `GET /network/{id}` for the network name and its active roster
//! - `GET /network/{id}/member` for every member, once
//!
//! Members are matched against the roster locally, so the number of requests does
//! not grow with the number of members.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::constants::PROVIDER_ZEROTIER;
use crate::errors::{Result, SyncError};
use crate::http::{build_client, send, status_error, ApiResponse};
use crate::types::{Member, Network};

/// Where network metadata and members come from.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// Fetch a network and its active roster.
    ///
    /// # Errors
    ///
    /// [`SyncError::NetworkNotFound`] if the network does not exist,
    /// [`SyncError::Authentication`] if the token is rejected.
    async fn fetch_network(&self, network_id: &str) -> Result<Network>;

    /// Fetch the members on `network`'s active roster, in roster order.
    ///
    /// # Errors
    ///
    /// Same as [`MembershipSource::fetch_network`].
    async fn fetch_active_members(&self, network: &Network) -> Result<Vec<Member>>;
}

// ============================================================================
// Response schemas
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkResponse {
    id: String,
    config: NetworkConfig,
    active_members: ActiveRoster,
}

#[derive(Debug, Deserialize)]
struct NetworkConfig {
    #[serde(default)]
    name: Option<String>,
}

/// Older API revisions key the roster by node id, newer ones send a plain list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActiveRoster {
    Keyed(serde_json::Map<String, serde_json::Value>),
    Listed(Vec<String>),
}

impl ActiveRoster {
    fn into_node_ids(self) -> Vec<String> {
        match self {
            Self::Keyed(map) => map.into_iter().map(|(id, _)| id).collect(),
            Self::Listed(ids) => ids,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberResponse {
    network_id: String,
    node_id: String,
    #[serde(default)]
    name: Option<String>,
    config: MemberConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberConfig {
    authorized: bool,
    #[serde(default)]
    ip_assignments: Option<Vec<String>>,
}

impl From<MemberResponse> for Member {
    fn from(response: MemberResponse) -> Self {
        Self {
            node_id: response.node_id,
            network_id: response.network_id,
            name: response.name.unwrap_or_default(),
            authorized: response.config.authorized,
            ip_assignments: response.config.ip_assignments.unwrap_or_default(),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the ZeroTier Central API.
#[derive(Debug)]
pub struct ZeroTierClient {
    config: ApiConfig,
    http: HttpClient,
}

impl ZeroTierClient {
    /// Create a client for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = build_client(&config)?;
        Ok(Self { config, http })
    }

    /// GET a resource under a network; 404 means the network does not exist.
    async fn get_network_resource(
        &self,
        network_id: &str,
        segments: &[&str],
    ) -> Result<ApiResponse> {
        let url = self.config.endpoint(segments)?;
        let response =
            send(&self.http, &self.config.token, Method::GET, url, None::<&()>).await?;

        match response.status {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(SyncError::NetworkNotFound {
                network_id: network_id.to_string(),
            }),
            _ => Err(status_error(PROVIDER_ZEROTIER, response)),
        }
    }
}

#[async_trait]
impl MembershipSource for ZeroTierClient {
    async fn fetch_network(&self, network_id: &str) -> Result<Network> {
        debug!(network_id = %network_id, "Getting network");

        let response = self
            .get_network_resource(network_id, &["network", network_id])
            .await?;
        let decoded: NetworkResponse = response.decode()?;

        let network = Network {
            id: decoded.id,
            name: decoded.config.name.unwrap_or_default(),
            active_members: decoded.active_members.into_node_ids(),
        };

        debug!(
            network_id = %network.id,
            active = network.active_members.len(),
            "Fetched network roster"
        );
        Ok(network)
    }

    async fn fetch_active_members(&self, network: &Network) -> Result<Vec<Member>> {
        let response = self
            .get_network_resource(&network.id, &["network", network.id.as_str(), "member"])
            .await?;
        let decoded: Vec<MemberResponse> = response.decode()?;
        let total = decoded.len();

        let mut by_node: HashMap<String, Member> = decoded
            .into_iter()
            .map(|m| (m.node_id.clone(), Member::from(m)))
            .collect();

        let mut members = Vec::with_capacity(network.active_members.len());
        for node_id in &network.active_members {
            match by_node.remove(node_id) {
                Some(member) => members.push(member),
                None => debug!(node_id = %node_id, "Active node is not a listed member"),
            }
        }

        info!(
            network_id = %network.id,
            members = total,
            active = members.len(),
            "Fetched network members"
        );
        Ok(members)
    }
}

#[cfg(test)]
#[path = "zerotier_tests.rs"]
mod zerotier_tests;
