// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Changeset computation.
//!
//! The reconciler turns the active member roster into desired record sets and
//! compares them against a snapshot of the zone. The result is the ordered list of
//! upserts needed to make the zone match:
//!
//! 1. Skip members that are not authorized or have no name
//! 2. Name each record `member.subdomain.zone` (empty segments dropped)
//! 3. Desire one `A` set with the assigned addresses and one `AAAA` set with the
//!    derived address, both with a 60 second TTL
//! 4. Emit an upsert for each desired set that is not already in the zone verbatim
//!
//! Output follows roster order, `A` before `AAAA` within a member. When two members
//! share a name, the one later in roster order owns the record and the earlier
//! one is skipped with a warning, so repeated runs settle on the same values.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::address::derive_address;
use crate::constants::MEMBER_RECORD_TTL_SECS;
use crate::errors::Result;
use crate::types::{
    normalize_name, ChangeAction, ChangeOp, ExistingRecord, Member, RecordSet, RecordType,
};

/// Suffix appended to every member name, and the server-side filter for the
/// zone snapshot: `subdomain.zone`, or just `zone`.
#[must_use]
pub fn record_suffix(subdomain: Option<&str>, zone_name: &str) -> String {
    join_labels(&[subdomain.unwrap_or_default(), zone_name])
}

/// Fully qualified record name for a member.
#[must_use]
pub fn record_name(member_name: &str, suffix: &str) -> String {
    join_labels(&[member_name, suffix])
}

fn join_labels(labels: &[&str]) -> String {
    labels
        .iter()
        .filter(|label| !label.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

/// The `A` and `AAAA` record sets a member should have, in that order.
///
/// A member without assigned addresses still gets an `A` set, with no values.
///
/// # Errors
///
/// Returns [`crate::errors::SyncError::InvalidIdentifier`] if the member's network
/// or node id cannot be used to derive its address.
pub fn desired_records(member: &Member, suffix: &str) -> Result<[RecordSet; 2]> {
    let name = record_name(&member.name, suffix);
    let derived = derive_address(&member.network_id, &member.node_id)?;

    let assigned = RecordSet {
        name: name.clone(),
        record_type: RecordType::A,
        ttl: MEMBER_RECORD_TTL_SECS,
        values: member.ip_assignments.clone(),
    };
    let rfc4193 = RecordSet {
        name,
        record_type: RecordType::AAAA,
        ttl: MEMBER_RECORD_TTL_SECS,
        values: vec![derived.to_string()],
    };

    Ok([assigned, rfc4193])
}

/// Compute the upserts that bring `existing` in line with `members`.
///
/// # Errors
///
/// Returns [`crate::errors::SyncError::InvalidIdentifier`] if an eligible member
/// has an identifier that cannot be turned into an address. No partial changeset is
/// returned.
pub fn reconcile(
    members: &[Member],
    suffix: &str,
    existing: &[ExistingRecord],
) -> Result<Vec<ChangeOp>> {
    let mut desired = Vec::new();
    for member in members {
        if !member.is_eligible() {
            debug!(
                node_id = %member.node_id,
                name = %member.name,
                authorized = member.authorized,
                "Skipping member without name or authorization"
            );
            continue;
        }
        for record in desired_records(member, suffix)? {
            desired.push((member, record));
        }
    }

    let owned = owned_records(desired);
    let mut changes = Vec::new();

    for desired in owned {
        info!("{desired}");

        if existing.iter().any(|e| e.matches(&desired)) {
            debug!(
                name = %desired.name,
                record_type = %desired.record_type,
                "Record already up to date"
            );
            continue;
        }

        let replaces = existing
            .iter()
            .find(|e| e.record.same_key(&desired.name, desired.record_type))
            .cloned();

        changes.push(ChangeOp {
            action: ChangeAction::Upsert,
            record: desired,
            replaces,
        });
    }

    Ok(changes)
}

/// Keep one desired set per (name, type): the last one in roster order.
fn owned_records(desired: Vec<(&Member, RecordSet)>) -> Vec<RecordSet> {
    let mut seen: HashSet<(String, RecordType)> = HashSet::new();
    let mut owned: Vec<RecordSet> = Vec::with_capacity(desired.len());

    for (member, record) in desired.into_iter().rev() {
        if seen.insert((normalize_name(&record.name), record.record_type)) {
            owned.push(record);
        } else {
            warn!(
                node_id = %member.node_id,
                name = %record.name,
                record_type = %record.record_type,
                "Name is taken by a later member, skipping"
            );
        }
    }

    owned.reverse();
    owned
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
