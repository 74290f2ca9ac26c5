// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Schema reader trait for format-specific schema discovery.
//!
//! The source catalog reports where a table lives and in which format; the
//! authoritative column list comes from the table's own storage. Each
//! implementation handles one or more data formats and is reusable across any
//! [`SourceCatalog`](crate::SourceCatalog).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::catalog_provider::{CatalogResult, DataSourceFormat, SourceColumn};

/// Reads the column schema of a table directly from its storage location.
///
/// # Extensibility
///
/// - Delta Lake transaction log (provided by the `delta-glue-sync` crate)
/// - Parquet footers (provided by the `delta-glue-sync` crate)
/// - Iceberg metadata (future)
#[async_trait]
pub trait SchemaReader: Send + Sync {
    /// Human-readable name of this reader (e.g., "delta", "parquet").
    fn name(&self) -> &str;

    /// The data format(s) this reader can handle.
    fn supported_formats(&self) -> &[DataSourceFormat];

    /// Read the ordered column list of the table stored at `location`.
    ///
    /// Column types are engine type names (`LongType`, `StringType`, ...), the
    /// vocabulary understood by [`crate::type_mapping::engine_type_to_glue`].
    ///
    /// * `storage_options` - Key-value pairs for cloud storage credentials
    ///   (e.g., `aws_access_key_id`, `aws_region`).
    async fn read_schema(
        &self,
        location: &str,
        storage_options: &HashMap<String, String>,
    ) -> CatalogResult<Vec<SourceColumn>>;
}
