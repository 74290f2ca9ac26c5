// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Credential lookup for the target catalog client.
//!
//! The Glue client is built from an access key pair fetched through a
//! [`SecretStore`] by two named lookups in one secret scope. Stores are
//! injected, never read from ambient globals.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::catalog_provider::{CatalogError, CatalogResult};

/// A source of named secrets grouped in scopes.
///
/// # Extensibility
///
/// - Databricks secret scopes (provided, behind the `unity-catalog` feature)
/// - Environment variables (provided)
/// - Static map (provided, for tests)
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store (e.g., "databricks").
    fn name(&self) -> &str;

    /// Fetch the secret `key` from `scope`.
    async fn get_secret(&self, scope: &str, key: &str) -> CatalogResult<String>;
}

/// Where the AWS key pair lives inside a [`SecretStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretsConfig {
    pub scope: String,
    pub access_key_name: String,
    pub secret_key_name: String,
}

impl SecretsConfig {
    pub fn new(
        scope: impl Into<String>,
        access_key_name: impl Into<String>,
        secret_key_name: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            access_key_name: access_key_name.into(),
            secret_key_name: secret_key_name.into(),
        }
    }
}

/// Static AWS access key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    access_key_id: String,
    secret_access_key: String,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Performs the access key and secret key lookups.
    pub async fn resolve(store: &dyn SecretStore, config: &SecretsConfig) -> CatalogResult<Self> {
        let access_key_id = store
            .get_secret(&config.scope, &config.access_key_name)
            .await?;
        let secret_access_key = store
            .get_secret(&config.scope, &config.secret_key_name)
            .await?;
        tracing::debug!(store = store.name(), scope = %config.scope, "resolved AWS credentials");
        Ok(Self::new(access_key_id, secret_access_key))
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Object store options granting the same identity read access to table storage.
    pub fn storage_options(&self, region: &str) -> HashMap<String, String> {
        HashMap::from([
            ("aws_access_key_id".to_string(), self.access_key_id.clone()),
            (
                "aws_secret_access_key".to_string(),
                self.secret_access_key.clone(),
            ),
            ("aws_region".to_string(), region.to_string()),
        ])
    }
}

/// In-memory secret store.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<(String, String), String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(
        mut self,
        scope: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.secrets
            .insert((scope.into(), key.into()), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn get_secret(&self, scope: &str, key: &str) -> CatalogResult<String> {
        self.secrets
            .get(&(scope.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| CatalogError::Secret(format!("secret '{}/{}' not found", scope, key)))
    }
}

/// Reads secrets from environment variables named `<SCOPE>_<KEY>`, uppercased,
/// with every non-alphanumeric character replaced by `_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn variable_name(scope: &str, key: &str) -> String {
        format!("{}_{}", scope, key)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_secret(&self, scope: &str, key: &str) -> CatalogResult<String> {
        let variable = Self::variable_name(scope, key);
        match std::env::var(&variable) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(CatalogError::Secret(format!(
                "environment variable {} is not set",
                variable
            ))),
        }
    }
}

#[cfg(feature = "unity-catalog")]
pub use databricks::{DatabricksSecretStore, DatabricksSecretsConfig};

#[cfg(feature = "unity-catalog")]
mod databricks {
    use async_trait::async_trait;
    use base64::Engine as _;
    use reqwest::Client;
    use serde::Deserialize;
    use tracing::instrument;

    use super::SecretStore;
    use crate::catalog_provider::{CatalogError, CatalogResult};
    use crate::unity_catalog::handle_response;

    /// Connection settings for the Databricks secrets API.
    #[derive(Clone)]
    pub struct DatabricksSecretsConfig {
        /// Workspace URL (e.g., `https://adb-123.azuredatabricks.net`).
        pub host: String,
        pub token: Option<String>,
        pub timeout_secs: Option<u64>,
    }

    impl std::fmt::Debug for DatabricksSecretsConfig {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DatabricksSecretsConfig")
                .field("host", &self.host)
                .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
                .field("timeout_secs", &self.timeout_secs)
                .finish()
        }
    }

    impl DatabricksSecretsConfig {
        pub fn new(host: impl Into<String>) -> Self {
            Self {
                host: host.into().trim_end_matches('/').to_string(),
                token: None,
                timeout_secs: None,
            }
        }

        pub fn with_token(mut self, token: impl Into<String>) -> Self {
            self.token = Some(token.into());
            self
        }
    }

    /// Secret scopes of a Databricks workspace (`GET /api/2.0/secrets/get`).
    pub struct DatabricksSecretStore {
        config: DatabricksSecretsConfig,
        client: Client,
    }

    #[derive(Deserialize)]
    struct GetSecretResponse {
        value: String,
    }

    impl DatabricksSecretStore {
        pub fn new(config: DatabricksSecretsConfig) -> CatalogResult<Self> {
            let client = Client::builder()
                .timeout(std::time::Duration::from_secs(
                    config.timeout_secs.unwrap_or(30),
                ))
                .build()
                .map_err(|e| {
                    CatalogError::ConnectionError(format!("Failed to build HTTP client: {}", e))
                })?;
            Ok(Self { config, client })
        }
    }

    #[async_trait]
    impl SecretStore for DatabricksSecretStore {
        fn name(&self) -> &str {
            "databricks"
        }

        #[instrument(skip(self))]
        async fn get_secret(&self, scope: &str, key: &str) -> CatalogResult<String> {
            let url = format!("{}/api/2.0/secrets/get", self.config.host);
            let mut req = self
                .client
                .get(&url)
                .query(&[("scope", scope), ("key", key)]);
            if let Some(token) = &self.config.token {
                req = req.bearer_auth(token);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| CatalogError::ConnectionError(e.to_string()))?;
            let body: GetSecretResponse = handle_response(resp, &format!("secret '{}/{}'", scope, key))
                .await
                .map_err(|e| match e {
                    CatalogError::NotFound(msg) => CatalogError::Secret(msg),
                    other => other,
                })?;

            let decoded = base64::engine::general_purpose::STANDARD
                .decode(body.value.as_bytes())
                .map_err(|e| CatalogError::Secret(format!("secret '{}/{}' is not base64: {}", scope, key, e)))?;
            String::from_utf8(decoded)
                .map_err(|e| CatalogError::Secret(format!("secret '{}/{}' is not UTF-8: {}", scope, key, e)))
        }
    }
}
