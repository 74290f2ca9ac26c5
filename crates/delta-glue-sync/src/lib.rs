// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! # delta-glue-sync
//!
//! Mirrors the tables of one Unity Catalog schema into an AWS Glue database
//! as external table definitions. Each run lists the schema, keeps the tables
//! stored in the mirrored format, reads their column schema from storage and
//! creates or overwrites the matching Glue table.
//!
//! ## Configuration
//!
//! Every flag has an environment fallback:
//!
//! - `DATABRICKS_HOST` / `DATABRICKS_TOKEN` - workspace serving Unity Catalog and secrets
//! - `DELTA_GLUE_SOURCE_NAMESPACE` - schema to mirror (default: `analytics_prod`)
//! - `DELTA_GLUE_TARGET_DATABASE` - Glue database (default: `uc_delta_mirror`, or
//!   `uc_parquet_mirror` with `--format parquet`)
//! - `DELTA_GLUE_REGION` - Glue region (default: `us-east-1`)
//! - `DELTA_GLUE_SECRET_SCOPE` - scope holding the AWS key pair (default: `your_scope`)

pub mod sync;
pub mod table_readers;

use clap::Parser;
use delta_glue_sync_catalog::{DataSourceFormat, SecretsConfig};

/// Mirror Unity Catalog tables into the AWS Glue Data Catalog.
#[derive(Parser)]
#[command(name = "delta-glue-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Databricks workspace URL, used for Unity Catalog and secret scopes.
    #[arg(long, env = "DATABRICKS_HOST")]
    pub databricks_host: Option<String>,

    /// Databricks personal access token.
    #[arg(long, env = "DATABRICKS_TOKEN", hide_env_values = true)]
    pub databricks_token: Option<String>,

    /// Unity Catalog REST base URL. Defaults to `<host>/api/2.1/unity-catalog`.
    #[arg(long, env = "DELTA_GLUE_UC_URL")]
    pub uc_url: Option<String>,

    /// Unity Catalog catalog containing the source namespace.
    #[arg(long, env = "DELTA_GLUE_UC_CATALOG", default_value = "main")]
    pub uc_catalog: String,

    /// Source namespace (Unity Catalog schema) to mirror.
    #[arg(long, env = "DELTA_GLUE_SOURCE_NAMESPACE", default_value = "analytics_prod")]
    pub source_namespace: String,

    /// Glue database receiving the definitions.
    #[arg(long, env = "DELTA_GLUE_TARGET_DATABASE")]
    pub target_database: Option<String>,

    /// AWS region of the Glue catalog.
    #[arg(long, env = "DELTA_GLUE_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Glue endpoint override.
    #[arg(long, env = "DELTA_GLUE_GLUE_ENDPOINT")]
    pub glue_endpoint: Option<String>,

    /// Storage format to mirror.
    #[arg(long, env = "DELTA_GLUE_FORMAT", default_value = "delta")]
    pub format: TargetFormat,

    /// Where the AWS key pair is looked up.
    #[arg(long, env = "DELTA_GLUE_SECRETS_BACKEND", default_value = "databricks")]
    pub secrets_backend: SecretsBackend,

    /// Secret scope holding the AWS key pair.
    #[arg(long, env = "DELTA_GLUE_SECRET_SCOPE", default_value = "your_scope")]
    pub secret_scope: String,

    /// Secret key of the AWS access key id.
    #[arg(long, env = "DELTA_GLUE_ACCESS_KEY_SECRET", default_value = "aws_glue_access_key")]
    pub access_key_secret: String,

    /// Secret key of the AWS secret access key.
    #[arg(long, env = "DELTA_GLUE_SECRET_KEY_SECRET", default_value = "aws_glue_secret_key")]
    pub secret_key_secret: String,

    /// HTTP timeout in seconds for Unity Catalog and secret lookups.
    #[arg(long, env = "DELTA_GLUE_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,
}

impl Cli {
    /// Get the effective configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            databricks_host: self
                .databricks_host
                .as_ref()
                .map(|h| h.trim_end_matches('/').to_string()),
            databricks_token: self.databricks_token.clone(),
            uc_url: self.uc_url.clone(),
            uc_catalog: self.uc_catalog.clone(),
            source_namespace: self.source_namespace.clone(),
            target_database: self
                .target_database
                .clone()
                .unwrap_or_else(|| self.format.default_database().to_string()),
            region: self.region.clone(),
            glue_endpoint: self.glue_endpoint.clone(),
            format: self.format,
            secrets_backend: self.secrets_backend,
            secret_scope: self.secret_scope.clone(),
            access_key_secret: self.access_key_secret.clone(),
            secret_key_secret: self.secret_key_secret.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Storage format mirrored in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TargetFormat {
    /// Delta Lake tables; schema read from the transaction log.
    #[default]
    Delta,
    /// Plain Parquet tables; schema read from a data file footer.
    Parquet,
}

impl TargetFormat {
    pub fn data_source_format(self) -> DataSourceFormat {
        match self {
            Self::Delta => DataSourceFormat::Delta,
            Self::Parquet => DataSourceFormat::Parquet,
        }
    }

    /// Glue database used when none is configured.
    pub fn default_database(self) -> &'static str {
        match self {
            Self::Delta => "uc_delta_mirror",
            Self::Parquet => "uc_parquet_mirror",
        }
    }
}

/// Secret backend for the AWS key pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SecretsBackend {
    /// Databricks secret scopes.
    #[default]
    Databricks,
    /// Environment variables named `<SCOPE>_<KEY>`.
    Env,
}

/// Run configuration, constructed once and passed to every component.
#[derive(Clone)]
pub struct Config {
    pub databricks_host: Option<String>,
    pub databricks_token: Option<String>,
    pub uc_url: Option<String>,
    pub uc_catalog: String,
    pub source_namespace: String,
    pub target_database: String,
    pub region: String,
    pub glue_endpoint: Option<String>,
    pub format: TargetFormat,
    pub secrets_backend: SecretsBackend,
    pub secret_scope: String,
    pub access_key_secret: String,
    pub secret_key_secret: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("databricks_host", &self.databricks_host)
            .field(
                "databricks_token",
                &self.databricks_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("uc_url", &self.uc_url)
            .field("uc_catalog", &self.uc_catalog)
            .field("source_namespace", &self.source_namespace)
            .field("target_database", &self.target_database)
            .field("region", &self.region)
            .field("glue_endpoint", &self.glue_endpoint)
            .field("format", &self.format)
            .field("secrets_backend", &self.secrets_backend)
            .field("secret_scope", &self.secret_scope)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Unity Catalog REST base URL, explicit or derived from the workspace host.
    pub fn unity_catalog_url(&self) -> Option<String> {
        self.uc_url.clone().or_else(|| {
            self.databricks_host
                .as_ref()
                .map(|host| format!("{}/api/2.1/unity-catalog", host))
        })
    }

    pub fn secrets_config(&self) -> SecretsConfig {
        SecretsConfig::new(
            &self.secret_scope,
            &self.access_key_secret,
            &self.secret_key_secret,
        )
    }
}
