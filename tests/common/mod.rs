// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mock ZeroTier Central and Cloudflare servers shared by integration tests.

#![allow(dead_code)]

use clap::Parser;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ztdns::cli::Cli;

pub const NETWORK_ID: &str = "8056c2e21c000001";
pub const ZONE_ID: &str = "023e105f4ecef8ad9ca31a8372d0c353";
pub const ZONE_NAME: &str = "example.com";

/// Both provider mocks for one test.
pub struct Providers {
    pub zerotier: MockServer,
    pub cloudflare: MockServer,
}

impl Providers {
    pub async fn start() -> Self {
        Self {
            zerotier: MockServer::start().await,
            cloudflare: MockServer::start().await,
        }
    }

    /// Parse a command line that points both clients at the mocks.
    pub fn cli(&self, args: &[&str]) -> Cli {
        let zt_url = self.zerotier.uri();
        let cf_url = self.cloudflare.uri();
        let mut argv = vec![
            "ztdns",
            "--zt-api-token",
            "zt-token",
            "--cf-api-token",
            "cf-token",
            "--zt-api-url",
            zt_url.as_str(),
            "--cf-api-url",
            cf_url.as_str(),
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    /// Serve a network whose roster lists `active` node ids.
    pub async fn mount_network(&self, active: &[&str]) {
        let roster: serde_json::Map<String, Value> = active
            .iter()
            .map(|node_id| ((*node_id).to_string(), json!(1)))
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/network/{NETWORK_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": NETWORK_ID,
                "config": {"name": "home"},
                "activeMembers": roster
            })))
            .mount(&self.zerotier)
            .await;
    }

    pub async fn mount_members(&self, members: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/network/{NETWORK_ID}/member")))
            .respond_with(ResponseTemplate::new(200).set_body_json(members))
            .mount(&self.zerotier)
            .await;
    }

    pub async fn mount_zone(&self) {
        Mock::given(method("GET"))
            .and(path(format!("/zones/{ZONE_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "id": ZONE_ID,
                "name": ZONE_NAME
            }))))
            .mount(&self.cloudflare)
            .await;
    }

    /// Serve `records` as a single page of the zone listing.
    pub async fn mount_records(&self, records: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/zones/{ZONE_ID}/dns_records")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "messages": [],
                "result": records,
                "result_info": {"page": 1, "per_page": 100, "total_pages": 1}
            })))
            .mount(&self.cloudflare)
            .await;
    }
}

pub fn envelope(result: Value) -> Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result
    })
}

pub fn member_json(node_id: &str, name: &str, authorized: bool, ips: &[&str]) -> Value {
    json!({
        "id": format!("{NETWORK_ID}-{node_id}"),
        "networkId": NETWORK_ID,
        "nodeId": node_id,
        "name": name,
        "config": {
            "authorized": authorized,
            "ipAssignments": ips
        }
    })
}

pub fn dns_record(id: &str, record_type: &str, name: &str, content: &str, ttl: u32) -> Value {
    json!({
        "id": id,
        "type": record_type,
        "name": name,
        "content": content,
        "ttl": ttl,
        "proxied": false
    })
}
