// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Unity Catalog REST API client implementing the [`SourceCatalog`] trait.
//!
//! A namespace is a UC schema inside the configured UC catalog, so the table
//! identifier `analytics_prod.events` resolves to the UC full name
//! `<catalog>.analytics_prod.events`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::catalog_provider::*;

/// Configuration for connecting to a Unity Catalog server.
#[derive(Debug, Clone)]
pub struct UnityCatalogConfig {
    /// Base URL of the UC API (e.g., `https://host/api/2.1/unity-catalog`).
    pub base_url: String,
    /// UC catalog that holds the mirrored namespaces.
    pub catalog_name: String,
    /// Optional bearer token for authenticated access.
    pub bearer_token: Option<String>,
    /// Optional request timeout in seconds (default: 30).
    pub timeout_secs: Option<u64>,
}

impl UnityCatalogConfig {
    pub fn new(base_url: impl Into<String>, catalog_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            catalog_name: catalog_name.into(),
            bearer_token: None,
            timeout_secs: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Unity Catalog REST API client.
pub struct UnityCatalogProvider {
    config: UnityCatalogConfig,
    client: Client,
}

impl UnityCatalogProvider {
    pub fn new(config: UnityCatalogConfig) -> CatalogResult<Self> {
        let timeout = config.timeout_secs.unwrap_or(30);
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .build()
            .map_err(|e| {
                CatalogError::ConnectionError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref token) = self.config.bearer_token {
            req = req.bearer_auth(token);
        }
        req
    }

    fn full_name(&self, ident: &TableIdent) -> String {
        format!(
            "{}.{}.{}",
            self.config.catalog_name, ident.namespace, ident.name
        )
    }
}

/// Maps a UC/Databricks HTTP response onto [`CatalogError`] and decodes the body.
pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    resource_name: &str,
) -> CatalogResult<T> {
    let status = resp.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(CatalogError::NotFound(format!("{} not found", resource_name)));
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = resp.text().await.unwrap_or_default();
        return Err(CatalogError::AuthError(format!("HTTP {}: {}", status, body)));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(CatalogError::ConnectionError(format!(
            "HTTP {}: {}",
            status, body
        )));
    }

    resp.json::<T>()
        .await
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
}

// ---- Serde models for UC REST API JSON responses ----

#[derive(Deserialize)]
struct ListTablesResponse {
    #[serde(default)]
    tables: Vec<UcTableSummary>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct UcTableSummary {
    name: String,
    schema_name: String,
}

#[derive(Deserialize)]
struct UcTable {
    name: String,
    schema_name: String,
    data_source_format: Option<String>,
    storage_location: Option<String>,
}

impl From<UcTable> for TableDetail {
    fn from(uc: UcTable) -> Self {
        TableDetail {
            ident: TableIdent::new(uc.schema_name, uc.name),
            format: match uc.data_source_format.as_deref() {
                Some(raw) => DataSourceFormat::parse(raw),
                None => DataSourceFormat::Other("UNKNOWN".to_string()),
            },
            location: uc.storage_location,
        }
    }
}

// ---- SourceCatalog implementation ----

#[async_trait]
impl SourceCatalog for UnityCatalogProvider {
    fn name(&self) -> &str {
        "unity-catalog"
    }

    #[instrument(skip(self), fields(catalog = %self.config.catalog_name))]
    async fn list_tables(&self, namespace: &str) -> CatalogResult<Vec<TableIdent>> {
        let mut idents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self.request(reqwest::Method::GET, "/tables").query(&[
                ("catalog_name", self.config.catalog_name.as_str()),
                ("schema_name", namespace),
            ]);
            if let Some(token) = page_token.as_deref() {
                req = req.query(&[("page_token", token)]);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| CatalogError::ConnectionError(e.to_string()))?;
            let body: ListTablesResponse = handle_response(
                resp,
                &format!("tables in '{}.{}'", self.config.catalog_name, namespace),
            )
            .await?;

            idents.extend(
                body.tables
                    .into_iter()
                    .map(|t| TableIdent::new(t.schema_name, t.name)),
            );

            match body.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = idents.len(), "listed unity catalog tables");
        Ok(idents)
    }

    #[instrument(skip(self), fields(table = %ident))]
    async fn describe_table(&self, ident: &TableIdent) -> CatalogResult<TableDetail> {
        let full_name = self.full_name(ident);
        let resp = self
            .request(reqwest::Method::GET, &format!("/tables/{}", full_name))
            .send()
            .await
            .map_err(|e| CatalogError::ConnectionError(e.to_string()))?;

        let body: UcTable = handle_response(resp, &format!("table '{}'", full_name)).await?;
        Ok(body.into())
    }
}
