// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for ztdns.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Record Constants
// ============================================================================

/// TTL applied to every record ztdns publishes (1 minute)
pub const MEMBER_RECORD_TTL_SECS: u32 = 60;

/// Record type carrying the addresses ZeroTier assigned to a member
pub const RECORD_TYPE_A: &str = "A";

/// Record type carrying the derived RFC 4193 address of a member
pub const RECORD_TYPE_AAAA: &str = "AAAA";

// ============================================================================
// Address Derivation Constants
// ============================================================================

/// Leading byte of every derived address (`fd00::/8` unique local block)
pub const DERIVED_ADDRESS_PREFIX: &str = "fd";

/// Fixed marker placed between the network id and the node id (ZeroTier's port)
pub const DERIVED_ADDRESS_MARKER: &str = "9993";

// ============================================================================
// Provider API Constants
// ============================================================================

/// Default base URL of the ZeroTier Central API
pub const ZEROTIER_API_URL: &str = "https://api.zerotier.com/api/v1";

/// Default base URL of the Cloudflare v4 API
pub const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Page size requested when listing zone records
pub const CLOUDFLARE_RECORDS_PER_PAGE: u32 = 100;

/// Cloudflare error code for an unknown zone id ("Invalid zone identifier")
pub const CLOUDFLARE_ERROR_INVALID_ZONE: i64 = 7003;

/// Cloudflare error code for an unknown object ("Invalid or missing zone id")
pub const CLOUDFLARE_ERROR_MISSING_ZONE: i64 = 1001;

/// Cloudflare error code for a resource the token is not scoped to
pub const CLOUDFLARE_ERROR_UNAUTHORIZED_RESOURCE: i64 = 9109;

/// Provider label used in logs and errors for ZeroTier
pub const PROVIDER_ZEROTIER: &str = "zerotier";

/// Provider label used in logs and errors for Cloudflare
pub const PROVIDER_CLOUDFLARE: &str = "cloudflare";

// ============================================================================
// Credential Constants
// ============================================================================

/// Environment variable holding the ZeroTier API token
pub const ENV_ZT_API_TOKEN: &str = "ZT_API_TOKEN";

/// Environment variable holding the Cloudflare API token
pub const ENV_CF_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";

/// Environment variable overriding the ZeroTier API base URL
pub const ENV_ZT_API_URL: &str = "ZT_API_URL";

/// Environment variable overriding the Cloudflare API base URL
pub const ENV_CF_API_URL: &str = "CLOUDFLARE_API_URL";

/// Token file consulted when no ZeroTier token is passed, relative to `$HOME`
pub const ZT_TOKEN_FILE: &str = ".zerotier/api_token";

// ============================================================================
// Logging Constants
// ============================================================================

/// Setting this environment variable (to anything non-empty) enables debug output
pub const ENV_DEBUG: &str = "DEBUG";

/// Selects the log output format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Exit Codes
// ============================================================================

/// Network missing, credentials rejected or not found
pub const EXIT_NETWORK_OR_AUTH: i32 = 1;

/// Hosted zone could not be resolved
pub const EXIT_ZONE_NOT_FOUND: i32 = 2;

/// Any other provider or data failure
pub const EXIT_PROVIDER_ERROR: i32 = 3;
