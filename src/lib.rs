// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # ztdns - ZeroTier members to DNS
//!
//! ztdns publishes DNS records for the members of a ZeroTier network. For every
//! authorized, named, online member it maintains two records in a hosted zone:
//!
//! - `A` with the addresses the network assigned to the member
//! - `AAAA` with the member's RFC4193 address, derived from the network and node ids
//!
//! Runs are one-shot and idempotent: a second run against an unchanged network
//! submits nothing.
//!
//! ## Modules
//!
//! - [`address`] - RFC4193 address derivation
//! - [`zerotier`] - Membership source backed by ZeroTier Central
//! - [`cloudflare`] - Zone snapshot source and change applier backed by Cloudflare
//! - [`reconciler`] - Desired records and changeset computation
//! - [`sync`] - One complete run
//! - [`cli`] - Command line interface
//!
//! ## Example
//!
//! ```rust
//! use ztdns::reconciler::{desired_records, record_suffix};
//! use ztdns::types::Member;
//!
//! let member = Member {
//!     node_id: "abcdef0123".to_string(),
//!     network_id: "8056c2e21c000001".to_string(),
//!     name: "alice".to_string(),
//!     authorized: true,
//!     ip_assignments: vec!["10.147.17.5".to_string()],
//! };
//!
//! let suffix = record_suffix(Some("zt"), "example.com");
//! let [a, aaaa] = desired_records(&member, &suffix).unwrap();
//! assert_eq!(a.name, "alice.zt.example.com");
//! assert_eq!(aaaa.values, vec!["fd80:56c2:e21c:0:199:93ab:cdef:123".to_string()]);
//! ```

pub mod address;
pub mod cli;
pub mod cloudflare;
pub mod config;
pub mod constants;
pub mod errors;
mod http;
pub mod reconciler;
pub mod sync;
pub mod types;
pub mod zerotier;
