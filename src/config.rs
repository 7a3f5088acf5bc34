// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider connection settings and credential lookup.
//!
//! Each provider client is built from an explicit [`ApiConfig`]; there is no
//! process-wide client state. Tokens are resolved in this order:
//!
//! | Provider | Sources |
//! |----------|---------|
//! | ZeroTier | `--zt-api-token`, `ZT_API_TOKEN`, `~/.zerotier/api_token` |
//! | Cloudflare | `--cf-api-token`, `CLOUDFLARE_API_TOKEN` |
//!
//! The flag and the environment variable are merged by the CLI parser, so this
//! module only sees one optional "explicit" value per provider.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::constants::{
    ENV_CF_API_TOKEN, ENV_ZT_API_TOKEN, PROVIDER_CLOUDFLARE, PROVIDER_ZEROTIER, ZT_TOKEN_FILE,
};
use crate::errors::{Result, SyncError};

/// Credential and endpoint for one provider API.
#[derive(Clone)]
pub struct ApiConfig {
    /// Bearer token
    pub token: String,
    /// API root; request paths are appended to it
    pub base_url: Url,
}

impl ApiConfig {
    /// Build a config from a token and a base URL string.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(token: impl Into<String>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| SyncError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            token: token.into(),
            base_url,
        })
    }

    /// Append path segments to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidUrl`] if the base URL cannot carry a path
    /// (for example `mailto:` URLs).
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

// The token must never end up in logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Location of the ZeroTier token file under `home`.
#[must_use]
pub fn zerotier_token_path(home: &Path) -> PathBuf {
    home.join(ZT_TOKEN_FILE)
}

/// Resolve the ZeroTier token from the flag/env value or the token file.
///
/// # Errors
///
/// Returns [`SyncError::MissingCredential`] if no source yields a non-empty token.
pub fn resolve_zerotier_token(explicit: Option<&str>, home: Option<&Path>) -> Result<String> {
    if let Some(token) = non_empty(explicit) {
        return Ok(token);
    }

    let searched = match home {
        Some(home) => {
            let path = zerotier_token_path(home);
            debug!(path = %path.display(), "Reading ZeroTier API token file");
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    if let Some(token) = non_empty(Some(&contents)) {
                        return Ok(token);
                    }
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => debug!(path = %path.display(), error = %e, "Token file unreadable"),
            }
            format!("--zt-api-token, {ENV_ZT_API_TOKEN} or {}", path.display())
        }
        None => format!("--zt-api-token or {ENV_ZT_API_TOKEN} (HOME is not set)"),
    };

    Err(SyncError::MissingCredential {
        provider: PROVIDER_ZEROTIER.to_string(),
        searched,
    })
}

/// Resolve the Cloudflare token from the flag/env value.
///
/// # Errors
///
/// Returns [`SyncError::MissingCredential`] if the value is absent or blank.
pub fn resolve_cloudflare_token(explicit: Option<&str>) -> Result<String> {
    non_empty(explicit).ok_or_else(|| SyncError::MissingCredential {
        provider: PROVIDER_CLOUDFLARE.to_string(),
        searched: format!("--cf-api-token or {ENV_CF_API_TOKEN}"),
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
