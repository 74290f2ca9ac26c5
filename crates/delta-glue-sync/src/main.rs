// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! `delta-glue-sync` binary entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use delta_glue_sync::Cli;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = Cli::parse().config();
    tracing::debug!(?config, "starting mirror run");

    // Sequential pipeline; one thread drives every client.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Per-table failures are already reported; only bootstrap errors reach here.
    runtime.block_on(delta_glue_sync::sync::run(&config))?;
    Ok(())
}
