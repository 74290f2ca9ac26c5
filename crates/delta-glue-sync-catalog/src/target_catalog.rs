// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Target catalog trait and the table definitions written into it.
//!
//! The target catalog is the system of record for mirrored definitions. A
//! lookup distinguishes "absent" from failure explicitly through
//! [`TableLookup`], so callers never have to treat a not-found error as
//! control flow.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::catalog_provider::CatalogResult;

/// Glue `TableType` for tables whose data lives outside the catalog.
pub const EXTERNAL_TABLE: &str = "EXTERNAL_TABLE";

/// Table parameter holding the data format tag (`delta`, `parquet`).
pub const CLASSIFICATION_PARAMETER: &str = "classification";

/// A column of a target table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetColumn {
    pub name: String,
    /// Glue/Hive column type (`bigint`, `string`, ...).
    pub data_type: String,
}

impl TargetColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Input/output formats and SerDe of a storage descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFormat {
    pub input_format: String,
    pub output_format: String,
    pub serialization_library: String,
}

impl StorageFormat {
    pub const PARQUET_INPUT_FORMAT: &'static str =
        "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat";
    pub const PARQUET_OUTPUT_FORMAT: &'static str =
        "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat";
    pub const PARQUET_SERDE: &'static str =
        "org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe";

    /// Hive parquet descriptor; Delta and plain Parquet tables both store
    /// their data files as parquet.
    pub fn hive_parquet() -> Self {
        Self {
            input_format: Self::PARQUET_INPUT_FORMAT.to_string(),
            output_format: Self::PARQUET_OUTPUT_FORMAT.to_string(),
            serialization_library: Self::PARQUET_SERDE.to_string(),
        }
    }
}

/// Full definition of a mirrored table as registered in the target catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTableDefinition {
    /// Derived name, see [`crate::registrar::derive_target_name`].
    pub name: String,
    pub columns: Vec<TargetColumn>,
    pub location: String,
    pub storage: StorageFormat,
    pub stored_as_sub_directories: bool,
    /// Always [`EXTERNAL_TABLE`] for definitions built by the registrar.
    pub table_type: String,
    pub parameters: BTreeMap<String, String>,
}

impl TargetTableDefinition {
    /// The `classification` parameter, if present.
    pub fn classification(&self) -> Option<&str> {
        self.parameters
            .get(CLASSIFICATION_PARAMETER)
            .map(String::as_str)
    }
}

/// Result of looking a table up in the target catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLookup {
    /// An entry with that name exists.
    Found(TargetTableDefinition),
    /// No entry with that name exists.
    Absent,
}

impl TableLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Management interface of the catalog receiving mirrored definitions.
///
/// Writes are unconditional: there is no version check between a lookup and
/// the following create or update.
#[async_trait]
pub trait TargetCatalog: Send + Sync {
    /// Human-readable name of this catalog (e.g., "aws-glue").
    fn name(&self) -> &str;

    /// Look a table up by database and name.
    ///
    /// Returns [`TableLookup::Absent`] when the table does not exist; every
    /// other failure is an error.
    async fn get_table(&self, database: &str, name: &str) -> CatalogResult<TableLookup>;

    /// Create a new table in `database`.
    async fn create_table(
        &self,
        database: &str,
        definition: &TargetTableDefinition,
    ) -> CatalogResult<()>;

    /// Replace the table named `definition.name` in `database` in full.
    async fn update_table(
        &self,
        database: &str,
        definition: &TargetTableDefinition,
    ) -> CatalogResult<()>;
}
