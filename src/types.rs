// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Snapshot types shared by the providers and the reconciler.
//!
//! Everything here is an immutable snapshot built once from a provider response.
//! Nothing is written back through these types; changing provider state always
//! goes through an explicit client call.

use serde::Serialize;
use std::fmt;

use crate::constants::{RECORD_TYPE_A, RECORD_TYPE_AAAA};

/// A ZeroTier network and its active roster at fetch time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Network {
    /// 16 hex digit network id
    pub id: String,
    /// Display name
    pub name: String,
    /// Node ids currently observed online, in provider order
    pub active_members: Vec<String>,
}

impl Network {
    /// Whether `node_id` is on the active roster.
    #[must_use]
    pub fn is_active(&self, node_id: &str) -> bool {
        self.active_members.iter().any(|id| id == node_id)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.id, self.name)
    }
}

/// A device registered on a network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Member {
    /// 10 hex digit node id, unique within the network
    pub node_id: String,
    /// Id of the network this member belongs to
    pub network_id: String,
    /// Display name; may be empty
    pub name: String,
    /// Administrative authorization flag
    pub authorized: bool,
    /// Addresses assigned by the network, in provider order
    pub ip_assignments: Vec<String>,
}

impl Member {
    /// A member gets DNS records only if it is authorized and named.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.authorized && !self.name.is_empty()
    }
}

/// The two record types ztdns manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RecordType {
    /// Assigned (primary family) addresses
    A,
    /// Derived RFC 4193 address
    #[allow(clippy::upper_case_acronyms)]
    AAAA,
}

impl RecordType {
    /// Wire name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => RECORD_TYPE_A,
            Self::AAAA => RECORD_TYPE_AAAA,
        }
    }

    /// Parse a provider type string; other record types are not managed.
    #[must_use]
    pub fn from_provider(value: &str) -> Option<Self> {
        match value {
            RECORD_TYPE_A => Some(Self::A),
            RECORD_TYPE_AAAA => Some(Self::AAAA),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value of a record set as read from the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExistingValue {
    /// Provider record id of this value
    pub id: String,
    /// Record content (an address)
    pub value: String,
    /// TTL of this particular provider record
    pub ttl: u32,
}

/// A (name, type, values, ttl) tuple, either desired or read from the zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    /// Fully qualified name, without trailing dot
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Time to live in seconds
    pub ttl: u32,
    /// Record contents
    pub values: Vec<String>,
}

impl RecordSet {
    /// Whether `other` describes the same record: same name (case-insensitive,
    /// ignoring a trailing dot), same type, same TTL and the same values in any order.
    #[must_use]
    pub fn matches(&self, other: &RecordSet) -> bool {
        self.same_key(&other.name, other.record_type)
            && self.ttl == other.ttl
            && sorted(&self.values) == sorted(&other.values)
    }

    /// Whether this set is keyed by `name` and `record_type`.
    #[must_use]
    pub fn same_key(&self, name: &str, record_type: RecordType) -> bool {
        self.record_type == record_type && normalize_name(&self.name) == normalize_name(name)
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}",
            self.name,
            self.record_type,
            self.values.join(" ")
        )
    }
}

/// A record set read from the zone, with the provider ids of its values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExistingRecord {
    /// Name, type, TTL and values of the set
    pub record: RecordSet,
    /// Provider records backing each value, in listing order
    pub entries: Vec<ExistingValue>,
}

impl ExistingRecord {
    /// Whether this set already is `desired`, including the TTL of every value.
    #[must_use]
    pub fn matches(&self, desired: &RecordSet) -> bool {
        self.record.matches(desired) && self.entries.iter().all(|e| e.ttl == desired.ttl)
    }
}

/// What a [`ChangeOp`] does to its record set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create the set, or replace its values and TTL
    Upsert,
}

/// One entry of a changeset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeOp {
    /// Always [`ChangeAction::Upsert`]
    pub action: ChangeAction,
    /// The record set as it should be after the change
    pub record: RecordSet,
    /// The set currently in the zone under the same name and type, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaces: Option<ExistingRecord>,
}

/// What the DNS provider reported for an applied changeset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeReceipt {
    /// Provider change-tracking id, for providers that issue one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_id: Option<String>,
    /// Provider status of the batch
    pub status: String,
    /// Ids of the provider records the batch created or modified
    pub record_ids: Vec<String>,
}

impl fmt::Display for ChangeReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change_id {
            Some(id) => write!(f, "Changeset {id} status: {}", self.status),
            None if self.record_ids.is_empty() => {
                write!(f, "Batch {} without change id", self.status)
            }
            None => write!(
                f,
                "Batch {} without change id, records: {}",
                self.status,
                self.record_ids.join(",")
            ),
        }
    }
}

/// Lowercase and strip a trailing dot so provider and desired names compare equal.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

fn sorted(values: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = values.iter().map(String::as_str).collect();
    out.sort_unstable();
    out
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
