// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Source catalog trait and data types for the tables being mirrored.
//!
//! The source catalog owns the tables, their storage locations and their
//! formats. This module defines the read-only interface the mirror needs from
//! it: list the tables of a namespace and describe one table.

use std::fmt;

use async_trait::async_trait;

/// Identifier of a table inside the source catalog (`namespace.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableIdent {
    pub namespace: String,
    pub name: String,
}

impl TableIdent {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Fully qualified `namespace.name` form.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Data format of the underlying storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSourceFormat {
    Delta,
    Parquet,
    Csv,
    Json,
    Avro,
    Orc,
    Text,
    Other(String),
}

impl DataSourceFormat {
    /// Parses a format tag case-insensitively (`DELTA`, `delta`, ...).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DELTA" => Self::Delta,
            "PARQUET" => Self::Parquet,
            "CSV" => Self::Csv,
            "JSON" => Self::Json,
            "AVRO" => Self::Avro,
            "ORC" => Self::Orc,
            "TEXT" => Self::Text,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Lowercase tag, also used as the Glue `classification` parameter.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Delta => "delta",
            Self::Parquet => "parquet",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Avro => "avro",
            Self::Orc => "orc",
            Self::Text => "text",
            Self::Other(other) => other.as_str(),
        }
    }
}

impl fmt::Display for DataSourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format and location of a table, as reported by the source catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDetail {
    pub ident: TableIdent,
    pub format: DataSourceFormat,
    /// Physical storage location (URI). Views and some managed tables have none.
    pub location: Option<String>,
}

/// A column as read from the table's storage, typed with engine type names
/// such as `LongType` or `StringType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    pub engine_type: String,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, engine_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine_type: engine_type.into(),
        }
    }
}

/// Read-only snapshot of a table eligible for mirroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    pub ident: TableIdent,
    pub format: DataSourceFormat,
    pub location: String,
    /// Columns in schema order.
    pub columns: Vec<SourceColumn>,
}

/// Errors that can occur while talking to either catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Network or HTTP error.
    #[error("Catalog connection error: {0}")]
    ConnectionError(String),
    /// Resource not found (catalog, schema, table or secret).
    #[error("Not found: {0}")]
    NotFound(String),
    /// Authentication or authorization failure.
    #[error("Auth error: {0}")]
    AuthError(String),
    /// Invalid or unparsable response from a catalog server.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The target catalog rejected or could not build a table definition.
    #[error("Invalid table definition: {0}")]
    InvalidDefinition(String),
    /// The table schema could not be read from storage.
    #[error("Schema read error: {0}")]
    SchemaRead(String),
    /// A credential lookup failed.
    #[error("Secret lookup failed: {0}")]
    Secret(String),
    /// Other errors.
    #[error("Catalog error: {0}")]
    Other(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Read-only interface to the catalog that owns the mirrored tables.
///
/// # Extensibility
///
/// - Unity Catalog (provided, behind the `unity-catalog` feature)
/// - In-memory (provided, for tests)
/// - Hive Metastore (future)
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// Human-readable name of this catalog (e.g., "unity-catalog").
    fn name(&self) -> &str;

    /// List the identifiers of every table in a namespace, in catalog order.
    async fn list_tables(&self, namespace: &str) -> CatalogResult<Vec<TableIdent>>;

    /// Describe a single table: its storage format and location.
    async fn describe_table(&self, ident: &TableIdent) -> CatalogResult<TableDetail>;
}
