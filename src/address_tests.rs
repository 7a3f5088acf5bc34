// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for derived address computation.

#[cfg(test)]
mod tests {
    use crate::address::derive_address;
    use crate::errors::SyncError;
    use std::net::Ipv6Addr;

    const NETWORK_ID: &str = "8056c2e21c000001";

    #[test]
    fn test_derive_address_layout() {
        let addr = derive_address(NETWORK_ID, "abcdef0123").unwrap();

        assert_eq!(addr.to_string(), "fd80:56c2:e21c:0:199:93ab:cdef:123");
        assert_eq!(
            addr,
            Ipv6Addr::new(0xfd80, 0x56c2, 0xe21c, 0x0000, 0x0199, 0x93ab, 0xcdef, 0x0123)
        );
    }

    #[test]
    fn test_derive_address_is_deterministic() {
        let first = derive_address(NETWORK_ID, "0123456789").unwrap();
        let second = derive_address(NETWORK_ID, "0123456789").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_nodes_get_distinct_addresses() {
        let nodes = ["0000000001", "0000000002", "abcdef0123", "ABCDEF0124", "ffffffffff"];
        let addrs: Vec<Ipv6Addr> = nodes
            .iter()
            .map(|node| derive_address(NETWORK_ID, node).unwrap())
            .collect();

        for (i, a) in addrs.iter().enumerate() {
            for b in &addrs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_derived_address_is_unique_local() {
        let addr = derive_address(NETWORK_ID, "abcdef0123").unwrap();

        assert_eq!(addr.octets()[0], 0xfd);
    }

    #[test]
    fn test_uppercase_hex_is_accepted() {
        let lower = derive_address(NETWORK_ID, "abcdef0123").unwrap();
        let upper = derive_address(&NETWORK_ID.to_uppercase(), "ABCDEF0123").unwrap();

        assert_eq!(lower, upper);
    }

    #[test]
    fn test_non_hex_node_id_is_rejected() {
        let err = derive_address(NETWORK_ID, "abcdefxyz0").unwrap_err();

        match err {
            SyncError::InvalidIdentifier { identifier, reason } => {
                assert_eq!(identifier, "abcdefxyz0");
                assert!(reason.contains('x'));
            }
            other => panic!("expected InvalidIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn test_plus_sign_is_rejected() {
        let err = derive_address("+056c2e21c000001", "abcdef0123").unwrap_err();

        assert!(matches!(err, SyncError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert!(matches!(
            derive_address("", "abcdef0123"),
            Err(SyncError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            derive_address(NETWORK_ID, ""),
            Err(SyncError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_oversized_identifiers_are_rejected() {
        let err = derive_address(NETWORK_ID, "abcdef012345").unwrap_err();

        match err {
            SyncError::InvalidIdentifier { identifier, reason } => {
                assert!(identifier.starts_with("fd8056c2e21c000001"));
                assert!(reason.contains("128-bit"));
            }
            other => panic!("expected InvalidIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn test_short_identifiers_still_derive() {
        let addr = derive_address("1", "2").unwrap();

        assert_eq!(addr, Ipv6Addr::from(0x00fd_1999_32_u128));
    }
}
