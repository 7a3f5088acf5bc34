// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, error};
use ztdns::cli::{default_log_level, execute, exit_code, usage_exit_code, Cli};
use ztdns::constants::{ENV_DEBUG, ENV_LOG_FORMAT, EXIT_PROVIDER_ERROR};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version output land here too
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };
    init_logging();
    debug!("Logging initialized with file and line number tracking");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {e}");
            std::process::exit(EXIT_PROVIDER_ERROR);
        }
    };

    let home = std::env::var_os("HOME").map(PathBuf::from);
    if let Err(e) = runtime.block_on(execute(cli, home)) {
        error!("{e:#}");
        std::process::exit(exit_code(&e));
    }
}

/// Logs go to stderr so `members` output stays clean on stdout.
///
/// `RUST_LOG` wins if set. Otherwise the level is `info`, or `debug` when `DEBUG`
/// is set. `RUST_LOG_FORMAT=json` switches to JSON lines.
fn init_logging() {
    let debug_env = std::env::var(ENV_DEBUG).ok();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(default_log_level(debug_env.as_deref()))
    });

    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .compact()
                .init();
        }
    }
}
