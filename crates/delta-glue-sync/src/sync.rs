// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Bootstrap and the mirror run.
//!
//! Everything up to and including the namespace listing is bootstrap: a
//! failure there aborts the run. After that, every table is reported on its
//! own console line and failures stay local to the table.

use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tracing::info;

use delta_glue_sync_catalog::{
    AwsCredentials, Connector, DatabricksSecretStore, DatabricksSecretsConfig, EnvSecretStore,
    GlueCatalog, GlueConfig, MirrorReport, Registrar, SecretStore, TableOutcome,
    UnityCatalogConfig, UnityCatalogProvider,
};

use crate::table_readers::default_schema_readers;
use crate::{Config, SecretsBackend};

/// Build the secret store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the Databricks backend is selected without a host.
pub fn build_secret_store(config: &Config) -> Result<Box<dyn SecretStore>> {
    match config.secrets_backend {
        SecretsBackend::Env => Ok(Box::new(EnvSecretStore)),
        SecretsBackend::Databricks => {
            let host = config.databricks_host.as_ref().context(
                "Databricks host is required for the databricks secrets backend. Set DATABRICKS_HOST or use --databricks-host",
            )?;
            let mut secrets = DatabricksSecretsConfig::new(host);
            secrets.timeout_secs = Some(config.timeout_secs);
            if let Some(token) = &config.databricks_token {
                secrets = secrets.with_token(token);
            }
            Ok(Box::new(DatabricksSecretStore::new(secrets)?))
        }
    }
}

/// Wire the Unity Catalog source, the schema readers and the Glue registrar.
///
/// # Errors
///
/// Returns an error if no Unity Catalog URL can be determined or a client
/// cannot be built.
pub fn build_connector(config: &Config, credentials: &AwsCredentials) -> Result<Connector> {
    let uc_url = config.unity_catalog_url().context(
        "Unity Catalog URL is required. Set DATABRICKS_HOST, DELTA_GLUE_UC_URL or use --uc-url",
    )?;
    let mut uc = UnityCatalogConfig::new(uc_url, &config.uc_catalog).with_timeout(config.timeout_secs);
    if let Some(token) = &config.databricks_token {
        uc = uc.with_token(token);
    }
    let source = UnityCatalogProvider::new(uc)?;

    let mut glue = GlueConfig::new(&config.region);
    if let Some(endpoint) = &config.glue_endpoint {
        glue = glue.with_endpoint_url(endpoint);
    }
    let target = GlueCatalog::new(&glue, credentials);

    let registrar = Registrar::new(
        Arc::new(target),
        &config.target_database,
        config.format.data_source_format(),
    );

    Ok(Connector::new(Arc::new(source), default_schema_readers(), registrar)
        .with_storage_options(credentials.storage_options(&config.region)))
}

/// Console line for a processed table; skipped tables print nothing.
pub fn outcome_line(outcome: &TableOutcome) -> Option<String> {
    match outcome {
        TableOutcome::Registered {
            source, outcome, ..
        } => Some(format!("{} {}", outcome, source.ident)),
        TableOutcome::Skipped { .. } => None,
        TableOutcome::Failed { ident, error } => {
            Some(format!("Failed for {}: {}", ident.name, error))
        }
    }
}

fn print_outcome(outcome: &TableOutcome) {
    let Some(line) = outcome_line(outcome) else {
        return;
    };
    match outcome {
        TableOutcome::Failed { .. } => println!("{} {}", "✗".red(), line),
        _ => println!("{} {}", "✓".green(), line),
    }
}

/// Run one mirror pass with the secret store chosen by the configuration.
///
/// # Errors
///
/// Returns an error only for bootstrap failures; per-table failures are
/// printed and recorded in the report.
pub async fn run(config: &Config) -> Result<MirrorReport> {
    let secrets = build_secret_store(config)?;
    run_with_secrets(config, secrets.as_ref()).await
}

/// Run one mirror pass with an explicit secret store.
///
/// # Errors
///
/// Returns an error only for bootstrap failures.
pub async fn run_with_secrets(config: &Config, secrets: &dyn SecretStore) -> Result<MirrorReport> {
    let credentials = AwsCredentials::resolve(secrets, &config.secrets_config())
        .await
        .context("Failed to resolve AWS credentials")?;
    let connector = build_connector(config, &credentials)?;

    let report = connector
        .mirror_namespace(&config.source_namespace, print_outcome)
        .await
        .with_context(|| format!("Failed to mirror namespace '{}'", config.source_namespace))?;

    info!(
        namespace = %config.source_namespace,
        database = %config.target_database,
        registered = report.registered(),
        skipped = report.skipped(),
        failed = report.failed(),
        "mirror run finished"
    );
    Ok(report)
}
