// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for snapshot types.

#[cfg(test)]
mod tests {
    use crate::types::{
        normalize_name, ChangeAction, ChangeOp, ChangeReceipt, Member, Network, RecordSet,
        RecordType,
    };

    fn record(name: &str, record_type: RecordType, ttl: u32, values: &[&str]) -> RecordSet {
        RecordSet {
            name: name.to_string(),
            record_type,
            ttl,
            values: values.iter().map(ToString::to_string).collect(),
        }
    }

    fn member(name: &str, authorized: bool) -> Member {
        Member {
            node_id: "abcdef0123".to_string(),
            network_id: "8056c2e21c000001".to_string(),
            name: name.to_string(),
            authorized,
            ip_assignments: vec!["10.0.0.5".to_string()],
        }
    }

    // =====================================================
    // Member / Network Tests
    // =====================================================

    #[test]
    fn test_member_eligibility() {
        assert!(member("alice", true).is_eligible());
        assert!(!member("alice", false).is_eligible());
        assert!(!member("", true).is_eligible());
        assert!(!member("", false).is_eligible());
    }

    #[test]
    fn test_network_display_and_roster() {
        let network = Network {
            id: "8056c2e21c000001".to_string(),
            name: "home".to_string(),
            active_members: vec!["abcdef0123".to_string()],
        };

        assert_eq!(network.to_string(), "8056c2e21c000001 - home");
        assert!(network.is_active("abcdef0123"));
        assert!(!network.is_active("0000000001"));
    }

    // =====================================================
    // RecordType Tests
    // =====================================================

    #[test]
    fn test_record_type_round_trip_names() {
        assert_eq!(RecordType::A.as_str(), "A");
        assert_eq!(RecordType::AAAA.to_string(), "AAAA");
        assert_eq!(RecordType::from_provider("A"), Some(RecordType::A));
        assert_eq!(RecordType::from_provider("AAAA"), Some(RecordType::AAAA));
        assert_eq!(RecordType::from_provider("CNAME"), None);
        assert_eq!(RecordType::from_provider("a"), None);
    }

    // =====================================================
    // RecordSet Comparison Tests
    // =====================================================

    #[test]
    fn test_matches_identical_record() {
        let a = record("alice.example.com", RecordType::A, 60, &["10.0.0.5"]);

        assert!(a.matches(&a.clone()));
    }

    #[test]
    fn test_matches_ignores_case_trailing_dot_and_value_order() {
        let desired = record("alice.example.com", RecordType::A, 60, &["10.0.0.5", "10.0.0.6"]);
        let existing = record("Alice.Example.com.", RecordType::A, 60, &["10.0.0.6", "10.0.0.5"]);

        assert!(desired.matches(&existing));
    }

    #[test]
    fn test_matches_detects_differences() {
        let desired = record("alice.example.com", RecordType::A, 60, &["10.0.0.5"]);

        assert!(!desired.matches(&record("alice.example.com", RecordType::A, 300, &["10.0.0.5"])));
        assert!(!desired.matches(&record("alice.example.com", RecordType::AAAA, 60, &["10.0.0.5"])));
        assert!(!desired.matches(&record("bob.example.com", RecordType::A, 60, &["10.0.0.5"])));
        assert!(!desired.matches(&record("alice.example.com", RecordType::A, 60, &["10.0.0.7"])));
        assert!(!desired.matches(&record(
            "alice.example.com",
            RecordType::A,
            60,
            &["10.0.0.5", "10.0.0.5"]
        )));
    }

    #[test]
    fn test_record_display_is_tab_separated() {
        let a = record("alice.example.com", RecordType::A, 60, &["10.0.0.5", "10.0.0.6"]);

        assert_eq!(a.to_string(), "alice.example.com\tA\t10.0.0.5 10.0.0.6");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Alice.Example.COM."), "alice.example.com");
        assert_eq!(normalize_name("example.com"), "example.com");
    }

    #[test]
    fn test_change_op_serializes_action_uppercase() {
        let op = ChangeOp {
            action: ChangeAction::Upsert,
            record: record("alice.example.com", RecordType::A, 60, &["10.0.0.5"]),
            replaces: None,
        };

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["action"], "UPSERT");
        assert_eq!(json["record"]["record_type"], "A");
        assert!(json.get("replaces").is_none());
    }

    #[test]
    fn test_receipt_without_change_id_lists_records() {
        let receipt = ChangeReceipt {
            change_id: None,
            status: "applied".to_string(),
            record_ids: vec!["r1".to_string(), "r2".to_string()],
        };

        assert_eq!(
            receipt.to_string(),
            "Batch applied without change id, records: r1,r2"
        );
        assert!(serde_json::to_value(&receipt)
            .unwrap()
            .get("change_id")
            .is_none());
    }

    #[test]
    fn test_receipt_display_with_change_id() {
        let receipt = ChangeReceipt {
            change_id: Some("C2682N5HXP0BZ4".to_string()),
            status: "PENDING".to_string(),
            record_ids: Vec::new(),
        };

        assert_eq!(receipt.to_string(), "Changeset C2682N5HXP0BZ4 status: PENDING");
    }

    #[test]
    fn test_noop_receipt_display() {
        let receipt = ChangeReceipt {
            change_id: None,
            status: "noop".to_string(),
            record_ids: Vec::new(),
        };

        assert_eq!(receipt.to_string(), "Batch noop without change id");
    }
}
