// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Derived RFC 4193 addresses for ZeroTier members.
//!
//! ZeroTier gives every member of a network a predictable IPv6 address in the
//! `fd00::/8` block. The address is the hex string
//! `"fd" + network_id + "9993" + node_id` read as one 128-bit number, so it can be
//! computed offline from the two identifiers without asking the API.
//!
//! # Example
//!
//! ```rust
//! use ztdns::address::derive_address;
//!
//! let addr = derive_address("8056c2e21c000001", "abcdef0123").unwrap();
//! assert_eq!(addr.to_string(), "fd80:56c2:e21c:0:199:93ab:cdef:123");
//! ```

use std::net::Ipv6Addr;

use crate::constants::{DERIVED_ADDRESS_MARKER, DERIVED_ADDRESS_PREFIX};
use crate::errors::{Result, SyncError};

/// Number of hex digits in a 128-bit address
const ADDRESS_HEX_DIGITS: usize = 32;

/// Compute the derived address of node `node_id` on network `network_id`.
///
/// # Errors
///
/// Returns [`SyncError::InvalidIdentifier`] if either identifier is empty or contains
/// a non-hexadecimal character, or if the concatenated value does not fit in 128 bits.
pub fn derive_address(network_id: &str, node_id: &str) -> Result<Ipv6Addr> {
    ensure_hex(network_id)?;
    ensure_hex(node_id)?;

    let combined =
        format!("{DERIVED_ADDRESS_PREFIX}{network_id}{DERIVED_ADDRESS_MARKER}{node_id}");

    // The prefix is non-zero, so every digit counts toward the width.
    if combined.len() > ADDRESS_HEX_DIGITS {
        return Err(SyncError::InvalidIdentifier {
            identifier: combined.clone(),
            reason: format!(
                "{} hex digits exceed the 128-bit address width",
                combined.len()
            ),
        });
    }

    let value = u128::from_str_radix(&combined, 16).map_err(|e| SyncError::InvalidIdentifier {
        identifier: combined.clone(),
        reason: e.to_string(),
    })?;

    Ok(Ipv6Addr::from(value))
}

/// `from_str_radix` accepts a leading `+`, so digits are checked explicitly.
fn ensure_hex(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(SyncError::InvalidIdentifier {
            identifier: String::new(),
            reason: "identifier is empty".to_string(),
        });
    }

    if let Some(bad) = identifier.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(SyncError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: format!("'{bad}' is not a hexadecimal digit"),
        });
    }

    Ok(())
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod address_tests;
