// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line access to the Atome API.
//!
//! # Usage
//!
//! ```text
//! keyatome -u <email> -p <password> live
//! keyatome -u <email> -p <password> --period week consumption
//! keyatome -u <email> -p <password> -l 2 --debug live
//! ```

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use keyatome::{AtomeClient, ClientConfig, LinkyNumber, Period};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Get your energy consumption from an Atome Linky device
#[derive(Parser, Debug)]
#[command(name = "keyatome")]
#[command(version)]
struct Args {
    /// Atome username
    #[arg(short, long, env = "ATOME_USERNAME")]
    username: String,

    /// Atome password
    #[arg(short, long, env = "ATOME_PASSWORD", hide_env_values = true)]
    password: String,

    /// Subscription to read, counting from 1
    #[arg(
        short = 'l',
        long = "atome-linky-number",
        visible_alias = "atome_linky_number",
        default_value = "1"
    )]
    linky_number: LinkyNumber,

    /// Period (only used with the consumption action)
    #[arg(long, default_value = "day")]
    period: Period,

    /// Request timeout in seconds
    #[arg(long, default_value_t = ClientConfig::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Print debug messages to stderr
    #[arg(long)]
    debug: bool,

    /// Data to fetch
    #[arg(value_enum)]
    action: Action,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    /// Instantaneous measurement
    Live,
    /// Consumption over --period
    Consumption,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(client: &mut AtomeClient, action: Action, period: Period) -> keyatome::Result<Value> {
    client.login().await?;
    match action {
        Action::Live => client.get_live().await,
        Action::Consumption => client.get_consumption(period).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let config = ClientConfig::new()
        .with_linky_number(args.linky_number)
        .with_timeout(Duration::from_secs(args.timeout));
    let mut client = AtomeClient::with_config(args.username, args.password, config);

    let result = run(&mut client, args.action, args.period).await;
    client.close_session();

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::debug!(error = ?e, "Request failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
