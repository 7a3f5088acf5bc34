// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command line interface.
//!
//! ```text
//! ztdns sync <network_id> <hosted_zone_id> [--subdomain <s>] [--dry-run]
//! ztdns members <network_id>
//! ```
//!
//! Tokens and API URLs can be given as flags or through the environment; see
//! [`crate::config`] for the lookup order.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::cloudflare::CloudflareClient;
use crate::config::{resolve_cloudflare_token, resolve_zerotier_token, ApiConfig};
use crate::constants::{
    CLOUDFLARE_API_URL, ENV_CF_API_TOKEN, ENV_CF_API_URL, ENV_ZT_API_TOKEN, ENV_ZT_API_URL,
    EXIT_PROVIDER_ERROR, ZEROTIER_API_URL,
};
use crate::errors::SyncError;
use crate::sync::{list_members, run_sync, MemberSummary, SyncRequest};
use crate::zerotier::ZeroTierClient;

/// Publish DNS records for the active members of a ZeroTier network.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// ZeroTier Central API token (falls back to ~/.zerotier/api_token)
    #[arg(long, env = ENV_ZT_API_TOKEN, global = true, hide_env_values = true)]
    pub zt_api_token: Option<String>,

    /// Cloudflare API token with DNS edit permission on the zone
    #[arg(long, env = ENV_CF_API_TOKEN, global = true, hide_env_values = true)]
    pub cf_api_token: Option<String>,

    /// ZeroTier Central API base URL
    #[arg(long, env = ENV_ZT_API_URL, default_value = ZEROTIER_API_URL, global = true)]
    pub zt_api_url: String,

    /// Cloudflare API base URL
    #[arg(long, env = ENV_CF_API_URL, default_value = CLOUDFLARE_API_URL, global = true)]
    pub cf_api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or update A/AAAA records for every authorized, named, online member
    Sync {
        /// ZeroTier network id
        network_id: String,

        /// Cloudflare zone id
        hosted_zone_id: String,

        /// DNS names will be name.subdomain.zone
        #[arg(long)]
        subdomain: Option<String>,

        /// Compute and log the changeset without submitting it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the online members of a network with their derived addresses
    Members {
        /// ZeroTier network id
        network_id: String,
    },
}

/// Run the parsed command to completion.
///
/// `home` locates the ZeroTier token file.
///
/// # Errors
///
/// Returns any [`SyncError`] raised by the run, wrapped in `anyhow`.
pub async fn execute(cli: Cli, home: Option<PathBuf>) -> anyhow::Result<()> {
    let zt_token = resolve_zerotier_token(cli.zt_api_token.as_deref(), home.as_deref())?;
    let zerotier = ZeroTierClient::new(ApiConfig::new(zt_token, &cli.zt_api_url)?)?;

    match cli.command {
        Command::Sync {
            network_id,
            hosted_zone_id,
            subdomain,
            dry_run,
        } => {
            let cf_token = resolve_cloudflare_token(cli.cf_api_token.as_deref())?;
            let cloudflare =
                CloudflareClient::new(ApiConfig::new(cf_token, &cli.cf_api_url)?)?;

            let request = SyncRequest {
                network_id,
                zone_id: hosted_zone_id,
                subdomain: subdomain.filter(|s| !s.is_empty()),
                dry_run,
            };
            let report = run_sync(&zerotier, &cloudflare, &request).await?;
            info!(
                network_id = %report.network.id,
                zone = %report.zone_name,
                changes = report.changes.len(),
                "Sync finished"
            );
        }
        Command::Members { network_id } => {
            let (network, summaries) = list_members(&zerotier, &network_id).await?;

            let mut out = std::io::stdout().lock();
            writeln!(out, "{network}")?;
            for summary in &summaries {
                writeln!(out, "{}", member_line(summary))?;
            }
        }
    }

    Ok(())
}

/// One tab-separated line of `members` output:
/// node id, name, eligibility, assigned addresses, derived address.
#[must_use]
pub fn member_line(summary: &MemberSummary) -> String {
    let member = &summary.member;
    let name = if member.name.is_empty() {
        "-"
    } else {
        member.name.as_str()
    };
    let eligibility = if summary.eligible {
        "eligible"
    } else {
        "skipped"
    };
    let derived = summary
        .derived_address
        .map_or_else(|| "-".to_string(), |addr| addr.to_string());

    format!(
        "{}\t{}\t{}\t{}\t{}",
        member.node_id,
        name,
        eligibility,
        member.ip_assignments.join(","),
        derived
    )
}

/// Exit code for an error returned by [`execute`].
#[must_use]
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<SyncError>()
        .map_or(EXIT_PROVIDER_ERROR, SyncError::exit_code)
}

/// Exit code for a command line that failed to parse.
///
/// `--help` and `--version` exit 0. Usage errors exit 3 rather than clap's
/// default 2, which is reserved for an unknown zone.
#[must_use]
pub fn usage_exit_code(error: &clap::Error) -> i32 {
    if error.use_stderr() {
        EXIT_PROVIDER_ERROR
    } else {
        0
    }
}

/// Default log level when `RUST_LOG` is not set: `debug` if `DEBUG` is set to a
/// non-empty value, `info` otherwise.
#[must_use]
pub fn default_log_level(debug_env: Option<&str>) -> &'static str {
    match debug_env {
        Some(value) if !value.is_empty() => "debug",
        _ => "info",
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
