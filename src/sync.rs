// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! One synchronization run.
//!
//! The flow is strictly sequential: network, members, zone, records, reconcile,
//! apply. Any error ends the run before the changeset is submitted.

use serde::Serialize;
use std::net::Ipv6Addr;
use tracing::{debug, info, warn};

use crate::address::derive_address;
use crate::cloudflare::ZoneProvider;
use crate::errors::Result;
use crate::reconciler::{reconcile, record_suffix};
use crate::types::{ChangeOp, ChangeReceipt, Member, Network};
use crate::zerotier::MembershipSource;

/// Parameters of a sync run.
#[derive(Clone, Debug)]
pub struct SyncRequest {
    /// ZeroTier network id
    pub network_id: String,
    /// DNS provider zone id
    pub zone_id: String,
    /// Optional label inserted between member name and zone name
    pub subdomain: Option<String>,
    /// Compute and report the changeset without submitting it
    pub dry_run: bool,
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SyncOutcome {
    /// Every desired record already existed
    NoChanges,
    /// A non-empty changeset was computed and not submitted
    DryRun,
    /// The changeset was accepted by the provider
    Applied(ChangeReceipt),
}

/// Everything a run computed.
#[derive(Clone, Debug, Serialize)]
pub struct SyncReport {
    /// Network as fetched
    pub network: Network,
    /// Zone name as resolved from the zone id
    pub zone_name: String,
    /// Suffix appended to member names
    pub record_suffix: String,
    /// The computed changeset, in submission order
    pub changes: Vec<ChangeOp>,
    /// What happened to the changeset
    pub outcome: SyncOutcome,
}

/// Fetch both sides, reconcile, and apply (or report) the changeset.
///
/// # Errors
///
/// Returns the first provider, decoding or address-derivation error encountered.
pub async fn run_sync(
    membership: &dyn MembershipSource,
    zones: &dyn ZoneProvider,
    request: &SyncRequest,
) -> Result<SyncReport> {
    if request.dry_run {
        info!("Dry run mode is active");
    }

    let network = membership.fetch_network(&request.network_id).await?;
    info!("Network {network}");
    let members = membership.fetch_active_members(&network).await?;

    let zone_name = zones.zone_name(&request.zone_id).await?;
    let suffix = record_suffix(request.subdomain.as_deref(), &zone_name);
    debug!(
        zone_id = %request.zone_id,
        zone_name = %zone_name,
        suffix = %suffix,
        "Resolved zone"
    );

    let existing = zones.fetch_records(&request.zone_id, Some(&suffix)).await?;
    let changes = reconcile(&members, &suffix, &existing)?;

    let outcome = apply(zones, &request.zone_id, &changes, request.dry_run).await?;

    Ok(SyncReport {
        network,
        zone_name,
        record_suffix: suffix,
        changes,
        outcome,
    })
}

/// Submit `changes` as one batch unless it is empty or `dry_run` is set.
///
/// # Errors
///
/// Returns [`crate::errors::SyncError::Apply`] if the provider rejects the batch.
pub async fn apply(
    zones: &dyn ZoneProvider,
    zone_id: &str,
    changes: &[ChangeOp],
    dry_run: bool,
) -> Result<SyncOutcome> {
    if changes.is_empty() {
        info!("No changes");
        return Ok(SyncOutcome::NoChanges);
    }

    debug!(
        changeset = %serde_json::to_string(changes).unwrap_or_default(),
        "Sending changeset"
    );
    info!(zone_id = %zone_id, changes = changes.len(), "Sending DNS changeset");

    if dry_run {
        for change in changes {
            info!("Would upsert {}", change.record);
        }
        info!("Dry run mode - no changes made");
        return Ok(SyncOutcome::DryRun);
    }

    let receipt = zones.submit(zone_id, changes).await?;
    info!("{receipt}");
    Ok(SyncOutcome::Applied(receipt))
}

/// A roster entry as shown by the `members` command.
#[derive(Clone, Debug, Serialize)]
pub struct MemberSummary {
    /// The member as fetched
    pub member: Member,
    /// Whether it would get DNS records
    pub eligible: bool,
    /// Its derived address, if its identifiers are well formed
    pub derived_address: Option<Ipv6Addr>,
}

/// Fetch the active members of a network with their derived addresses.
///
/// # Errors
///
/// Returns the membership provider's error.
pub async fn list_members(
    membership: &dyn MembershipSource,
    network_id: &str,
) -> Result<(Network, Vec<MemberSummary>)> {
    let network = membership.fetch_network(network_id).await?;
    let members = membership.fetch_active_members(&network).await?;

    let summaries = members
        .into_iter()
        .map(|member| {
            let derived_address = match derive_address(&member.network_id, &member.node_id) {
                Ok(addr) => Some(addr),
                Err(e) => {
                    warn!(node_id = %member.node_id, error = %e, "Cannot derive address");
                    None
                }
            };
            MemberSummary {
                eligible: member.is_eligible(),
                derived_address,
                member,
            }
        })
        .collect();

    Ok((network, summaries))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod sync_tests;
