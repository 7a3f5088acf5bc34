// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for ztdns.
//!
//! Every failure a sync run can hit is one variant of [`SyncError`]. None of them
//! is recoverable inside a run: the first error aborts the run before any change
//! reaches the DNS provider, and [`SyncError::exit_code`] decides how the process
//! exits.

use thiserror::Error;

use crate::constants::{EXIT_NETWORK_OR_AUTH, EXIT_PROVIDER_ERROR, EXIT_ZONE_NOT_FOUND};

/// Errors that can occur while fetching provider state or applying a changeset.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The provider rejected the API token (HTTP 401 or 403)
    #[error("{provider} rejected the API credential")]
    Authentication {
        /// Provider label (`zerotier` or `cloudflare`)
        provider: String,
    },

    /// No token was passed on the command line, in the environment or in the token file
    #[error("no {provider} API token found in {searched}")]
    MissingCredential {
        /// Provider label
        provider: String,
        /// Human readable list of the places that were searched
        searched: String,
    },

    /// The ZeroTier network does not exist or is not visible to the token
    #[error("network {network_id} not found")]
    NetworkNotFound {
        /// Network id that was requested
        network_id: String,
    },

    /// The hosted zone id could not be resolved
    #[error("no hosted zone found with id {zone_id}")]
    ZoneNotFound {
        /// Zone id that was requested
        zone_id: String,
    },

    /// A network or node id is not usable for address derivation
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// The offending identifier (or the concatenated value)
        identifier: String,
        /// What is wrong with it
        reason: String,
    },

    /// The DNS provider rejected the change batch; nothing was applied
    #[error("change batch for zone {zone_id} was rejected: {detail}")]
    Apply {
        /// Zone the batch was sent to
        zone_id: String,
        /// Error detail reported by the provider
        detail: String,
    },

    /// A provider response could not be decoded into the expected schema
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// URL of the endpoint that produced the response
        endpoint: String,
        /// Decoder error
        reason: String,
    },

    /// The provider answered with an unexpected non-success status
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset, ...)
    #[error("failed to send request to {url}")]
    Transport {
        /// Request URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// A configured base URL could not be parsed or extended
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as configured
        url: String,
        /// Parser error
        reason: String,
    },
}

impl SyncError {
    /// Process exit code for this error.
    ///
    /// | Error | Code |
    /// |-------|------|
    /// | `NetworkNotFound`, `Authentication`, `MissingCredential` | 1 |
    /// | `ZoneNotFound` | 2 |
    /// | anything else | 3 |
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NetworkNotFound { .. }
            | Self::Authentication { .. }
            | Self::MissingCredential { .. } => EXIT_NETWORK_OR_AUTH,
            Self::ZoneNotFound { .. } => EXIT_ZONE_NOT_FOUND,
            _ => EXIT_PROVIDER_ERROR,
        }
    }
}

/// Convenience alias used by every fallible library function.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
