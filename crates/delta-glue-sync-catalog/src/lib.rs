// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Catalog SPI for mirroring lakehouse tables into AWS Glue.
//!
//! This crate provides the Service Provider Interface layer between the
//! catalog that owns the tables and the catalog receiving their definitions:
//!
//! - [`SourceCatalog`]: list and describe tables (Unity Catalog)
//! - [`SchemaReader`]: read a table's column schema from its storage location
//! - [`TargetCatalog`]: get, create and update external table definitions (Glue)
//! - [`SecretStore`]: named credential lookups for the target client
//! - [`Registrar`]: idempotent create-or-update of one table
//! - [`Connector`]: the sequential mirror pipeline over all of the above

pub mod catalog_provider;
pub mod connector;
pub mod credentials;
#[cfg(feature = "glue")]
pub mod glue;
pub mod memory;
pub mod registrar;
pub mod table_reader;
pub mod target_catalog;
pub mod type_mapping;
#[cfg(feature = "unity-catalog")]
pub mod unity_catalog;

pub use catalog_provider::{
    CatalogError, CatalogResult, DataSourceFormat, SourceCatalog, SourceColumn, SourceTable,
    TableDetail, TableIdent,
};
pub use connector::{Connector, MirrorReport, TableOutcome};
pub use credentials::{AwsCredentials, EnvSecretStore, SecretStore, SecretsConfig, StaticSecretStore};
pub use registrar::{
    build_definition, derive_target_name, Registrar, Registration, RegistrationOutcome,
};
pub use table_reader::SchemaReader;
pub use target_catalog::{
    StorageFormat, TableLookup, TargetCatalog, TargetColumn, TargetTableDefinition,
};
pub use type_mapping::{columns_to_glue, engine_type_to_glue};

#[cfg(feature = "unity-catalog")]
pub use credentials::{DatabricksSecretStore, DatabricksSecretsConfig};
#[cfg(feature = "glue")]
pub use glue::{GlueCatalog, GlueConfig};
#[cfg(feature = "unity-catalog")]
pub use unity_catalog::{UnityCatalogConfig, UnityCatalogProvider};
