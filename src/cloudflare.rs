// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloudflare v4 API client (zone snapshot source and change applier).
//!
//! Cloudflare stores one record per value, while ztdns reasons about record sets.
//! Listing groups records that share a name and type into one [`ExistingRecord`];
//! applying translates each record-set upsert into the per-value operations of a
//! single `dns_records/batch` request, which Cloudflare executes atomically:
//!
//! | Desired value | Existing record | Batch operation |
//! |---------------|-----------------|-----------------|
//! | present | missing | `posts` |
//! | present | present, other TTL | `patches` |
//! | present | present, same TTL | none |
//! | absent | present | `deletes` |
//!
//! # Known limitation
//!
//! The snapshot is requested with a `name.endswith` filter. Records outside the
//! filter are never compared, so a changeset is only meaningful for names under
//! the record suffix.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::constants::{
    CLOUDFLARE_ERROR_INVALID_ZONE, CLOUDFLARE_ERROR_MISSING_ZONE,
    CLOUDFLARE_ERROR_UNAUTHORIZED_RESOURCE, CLOUDFLARE_RECORDS_PER_PAGE, PROVIDER_CLOUDFLARE,
};
use crate::errors::{Result, SyncError};
use crate::http::{build_client, send, status_error, ApiResponse};
use crate::types::{
    ChangeOp, ChangeReceipt, ExistingRecord, ExistingValue, RecordSet, RecordType,
};

/// Status reported for a batch Cloudflare accepted
pub const STATUS_APPLIED: &str = "applied";

/// Status reported when a changeset translated to no provider operations
pub const STATUS_NOOP: &str = "noop";

/// Where the zone snapshot comes from and where changesets go.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Resolve a zone id to its domain name.
    ///
    /// # Errors
    ///
    /// [`SyncError::ZoneNotFound`] if the id does not resolve.
    async fn zone_name(&self, zone_id: &str) -> Result<String>;

    /// Read the managed record sets of a zone, optionally only names ending in
    /// `name_suffix`.
    ///
    /// # Errors
    ///
    /// [`SyncError::ZoneNotFound`] if the id does not resolve.
    async fn fetch_records(
        &self,
        zone_id: &str,
        name_suffix: Option<&str>,
    ) -> Result<Vec<ExistingRecord>>;

    /// Apply a changeset as one atomic batch.
    ///
    /// # Errors
    ///
    /// [`SyncError::Apply`] if the provider rejects the batch; nothing is applied.
    async fn submit(&self, zone_id: &str, changes: &[ChangeOp]) -> Result<ChangeReceipt>;
}

// ============================================================================
// Response schemas
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ZoneInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    content: String,
    ttl: u32,
}

#[derive(Debug, Default, Deserialize)]
struct BatchResult {
    #[serde(default)]
    posts: Vec<DnsRecord>,
    #[serde(default)]
    patches: Vec<DnsRecord>,
}

/// Only the error part of an envelope, for failed responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

// ============================================================================
// Batch request
// ============================================================================

/// Body of `POST /zones/{id}/dns_records/batch`.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchRequest {
    /// Records to remove
    pub deletes: Vec<BatchDelete>,
    /// Records whose TTL changes
    pub patches: Vec<BatchPatch>,
    /// Records to create
    pub posts: Vec<BatchPost>,
}

impl BatchRequest {
    /// Translate a changeset into per-value record operations.
    ///
    /// Ops that share a (name, type) key are merged: the last one owns the final
    /// value set and every existing record id is deleted at most once.
    #[must_use]
    pub fn from_changes(changes: &[ChangeOp]) -> Self {
        let mut batch = Self::default();
        let mut deleted: HashSet<&str> = HashSet::new();

        for (position, change) in changes.iter().enumerate() {
            let desired = &change.record;
            let superseded = changes[position + 1..]
                .iter()
                .any(|later| later.record.same_key(&desired.name, desired.record_type));
            if superseded {
                continue;
            }

            let mut unclaimed: Vec<&ExistingValue> = change
                .replaces
                .as_ref()
                .map(|existing| existing.entries.iter().collect())
                .unwrap_or_default();

            for value in &desired.values {
                match unclaimed.iter().position(|entry| &entry.value == value) {
                    Some(index) => {
                        let entry = unclaimed.remove(index);
                        if entry.ttl != desired.ttl {
                            batch.patches.push(BatchPatch {
                                id: entry.id.clone(),
                                ttl: desired.ttl,
                            });
                        }
                    }
                    None => batch.posts.push(BatchPost {
                        name: desired.name.clone(),
                        record_type: desired.record_type.as_str().to_string(),
                        content: value.clone(),
                        ttl: desired.ttl,
                        proxied: false,
                    }),
                }
            }

            for entry in unclaimed {
                if deleted.insert(entry.id.as_str()) {
                    batch.deletes.push(BatchDelete {
                        id: entry.id.clone(),
                    });
                }
            }
        }

        batch
    }

    /// Whether the batch contains no operation at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.patches.is_empty() && self.posts.is_empty()
    }
}

/// Delete one record.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BatchDelete {
    /// Record id
    pub id: String,
}

/// Change the TTL of one record.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BatchPatch {
    /// Record id
    pub id: String,
    /// New TTL
    pub ttl: u32,
}

/// Create one record.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BatchPost {
    /// Fully qualified name
    pub name: String,
    /// `A` or `AAAA`
    #[serde(rename = "type")]
    pub record_type: String,
    /// Address
    pub content: String,
    /// TTL in seconds
    pub ttl: u32,
    /// Never proxied; these are private addresses
    pub proxied: bool,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the Cloudflare v4 API.
#[derive(Debug)]
pub struct CloudflareClient {
    config: ApiConfig,
    http: HttpClient,
}

impl CloudflareClient {
    /// Create a client for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = build_client(&config)?;
        Ok(Self { config, http })
    }

    /// Map a failed zone-scoped response: unknown zones become `ZoneNotFound`.
    ///
    /// A 403 carrying code 9109 means the token is valid but not scoped to this
    /// zone; from the caller's side the zone does not exist.
    fn zone_error(zone_id: &str, response: ApiResponse) -> SyncError {
        let codes: Vec<i64> = response
            .decode::<ErrorEnvelope>()
            .map(|envelope| envelope.errors.iter().map(|e| e.code).collect())
            .unwrap_or_default();
        let has_code = |code: i64| codes.contains(&code);

        let unknown_zone = response.status == StatusCode::NOT_FOUND
            || has_code(CLOUDFLARE_ERROR_INVALID_ZONE)
            || has_code(CLOUDFLARE_ERROR_MISSING_ZONE)
            || (response.status == StatusCode::FORBIDDEN
                && has_code(CLOUDFLARE_ERROR_UNAUTHORIZED_RESOURCE));

        if unknown_zone {
            SyncError::ZoneNotFound {
                zone_id: zone_id.to_string(),
            }
        } else {
            status_error(PROVIDER_CLOUDFLARE, response)
        }
    }

    /// GET a zone-scoped resource and decode its envelope.
    async fn get_zone_resource<T: serde::de::DeserializeOwned>(
        &self,
        zone_id: &str,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Envelope<T>> {
        let mut url = self.config.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let response =
            send(&self.http, &self.config.token, Method::GET, url, None::<&()>).await?;
        if !response.status.is_success() {
            return Err(Self::zone_error(zone_id, response));
        }

        let envelope: Envelope<T> = response.decode()?;
        if !envelope.success {
            return Err(Self::zone_error(zone_id, response));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl ZoneProvider for CloudflareClient {
    async fn zone_name(&self, zone_id: &str) -> Result<String> {
        let envelope: Envelope<ZoneInfo> = self
            .get_zone_resource(zone_id, &["zones", zone_id], &[])
            .await?;

        envelope
            .result
            .map(|zone| zone.name)
            .ok_or_else(|| SyncError::ZoneNotFound {
                zone_id: zone_id.to_string(),
            })
    }

    async fn fetch_records(
        &self,
        zone_id: &str,
        name_suffix: Option<&str>,
    ) -> Result<Vec<ExistingRecord>> {
        let mut records: Vec<DnsRecord> = Vec::new();
        let mut page = 1;

        loop {
            let mut query = vec![
                ("page", page.to_string()),
                ("per_page", CLOUDFLARE_RECORDS_PER_PAGE.to_string()),
            ];
            if let Some(suffix) = name_suffix {
                query.push(("name.endswith", suffix.to_string()));
            }

            let envelope: Envelope<Vec<DnsRecord>> = self
                .get_zone_resource(zone_id, &["zones", zone_id, "dns_records"], &query)
                .await?;
            let listed = envelope.result.unwrap_or_default();
            if listed.is_empty() {
                break;
            }
            records.extend(listed);

            match envelope.result_info {
                Some(info) if page < info.total_pages => page += 1,
                _ => break,
            }
        }

        let grouped = group_records(records);
        info!(
            zone_id = %zone_id,
            suffix = name_suffix.unwrap_or_default(),
            record_sets = grouped.len(),
            "Fetched zone records"
        );
        Ok(grouped)
    }

    async fn submit(&self, zone_id: &str, changes: &[ChangeOp]) -> Result<ChangeReceipt> {
        let batch = BatchRequest::from_changes(changes);
        if batch.is_empty() {
            debug!(zone_id = %zone_id, "Changeset needs no record operations");
            return Ok(ChangeReceipt {
                change_id: None,
                status: STATUS_NOOP.to_string(),
                record_ids: Vec::new(),
            });
        }

        info!(
            zone_id = %zone_id,
            posts = batch.posts.len(),
            patches = batch.patches.len(),
            deletes = batch.deletes.len(),
            "Submitting record batch"
        );

        let url = self
            .config
            .endpoint(&["zones", zone_id, "dns_records", "batch"])?;
        let response =
            send(&self.http, &self.config.token, Method::POST, url, Some(&batch)).await?;

        if matches!(
            response.status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(status_error(PROVIDER_CLOUDFLARE, response));
        }

        let envelope = response
            .decode::<Envelope<BatchResult>>()
            .ok()
            .filter(|envelope| envelope.success && response.status.is_success());

        let Some(envelope) = envelope else {
            return Err(SyncError::Apply {
                zone_id: zone_id.to_string(),
                detail: rejection_detail(&response),
            });
        };

        let result = envelope.result.unwrap_or_default();
        let record_ids = result
            .posts
            .into_iter()
            .chain(result.patches)
            .map(|record| record.id)
            .collect();

        // The batch endpoint issues no change-tracking id
        Ok(ChangeReceipt {
            change_id: None,
            status: STATUS_APPLIED.to_string(),
            record_ids,
        })
    }
}

/// Provider error messages of a rejected batch, or the raw status and body.
fn rejection_detail(response: &ApiResponse) -> String {
    let messages: Vec<String> = response
        .decode::<ErrorEnvelope>()
        .map(|envelope| {
            envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        format!("HTTP {}: {}", response.status.as_u16(), response.body)
    } else {
        messages.join("; ")
    }
}

/// Group per-value records into record sets keyed by (name, type), keeping the
/// order in which each set was first seen. Types other than A/AAAA are dropped.
fn group_records(records: Vec<DnsRecord>) -> Vec<ExistingRecord> {
    let mut sets: Vec<ExistingRecord> = Vec::new();

    for record in records {
        let Some(record_type) = RecordType::from_provider(&record.record_type) else {
            continue;
        };

        let entry = ExistingValue {
            id: record.id,
            value: record.content,
            ttl: record.ttl,
        };

        match sets
            .iter_mut()
            .find(|set| set.record.same_key(&record.name, record_type))
        {
            Some(set) => {
                set.record.values.push(entry.value.clone());
                set.entries.push(entry);
            }
            None => sets.push(ExistingRecord {
                record: RecordSet {
                    name: record.name,
                    record_type,
                    ttl: entry.ttl,
                    values: vec![entry.value.clone()],
                },
                entries: vec![entry],
            }),
        }
    }

    sets
}

#[cfg(test)]
#[path = "cloudflare_tests.rs"]
mod cloudflare_tests;
