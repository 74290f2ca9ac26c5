// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Built-in [`SchemaReader`] implementations.
//!
//! - [`DeltaLogSchemaReader`]: current schema of a Delta table, via `deltalake`.
//! - [`ParquetSchemaReader`]: arrow schema from the footer of one data file.
//!
//! Both report columns with engine type names (`LongType`, `StringType`, ...)
//! so the same type mapping applies to either format.

use std::collections::HashMap;
use std::sync::{Arc, Once};

use arrow_schema::DataType;
use async_trait::async_trait;
use deltalake::kernel::{DataType as DeltaDataType, PrimitiveType};
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{ObjectMeta, ObjectStore};
use parquet::arrow::async_reader::ParquetObjectReader;
use parquet::arrow::ParquetRecordBatchStreamBuilder;
use tracing::{debug, instrument};
use url::Url;

use delta_glue_sync_catalog::{
    CatalogError, CatalogResult, DataSourceFormat, SchemaReader, SourceColumn,
};

fn schema_error(location: &str, err: impl std::fmt::Display) -> CatalogError {
    CatalogError::SchemaRead(format!("{}: {}", location, err))
}

/// Parse a table location as a URL.
///
/// Accepts URLs (`s3://`, `file://`, ...) and absolute local paths.
fn table_url(location: &str) -> CatalogResult<Url> {
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::from_directory_path(location)
            .map_err(|_| schema_error(location, "not a URL or absolute path")),
        Err(e) => Err(schema_error(location, e)),
    }
}

/// Resolve a table location into a store and the table root inside it.
fn open_store(
    location: &str,
    storage_options: &HashMap<String, String>,
) -> CatalogResult<(Arc<dyn ObjectStore>, Path)> {
    let url = table_url(location)?;
    let (store, root) = object_store::parse_url_opts(&url, storage_options.iter())
        .map_err(|e| schema_error(location, e))?;
    Ok((Arc::from(store), root))
}

// ---- Delta ----

static REGISTER_S3: Once = Once::new();

/// Reads the current table schema through `deltalake`.
///
/// Log replay (JSON commits, classic and V2 checkpoints, `_last_checkpoint`)
/// is left to the Delta kernel; only the resulting struct type is mapped.
pub struct DeltaLogSchemaReader;

/// Engine type name of a Delta schema type (`long` → `LongType`).
pub fn delta_type_to_engine(data_type: &DeltaDataType) -> String {
    match data_type {
        DeltaDataType::Primitive(primitive) => match primitive {
            PrimitiveType::String => "StringType".into(),
            PrimitiveType::Long => "LongType".into(),
            PrimitiveType::Integer => "IntegerType".into(),
            PrimitiveType::Short => "ShortType".into(),
            PrimitiveType::Byte => "ByteType".into(),
            PrimitiveType::Float => "FloatType".into(),
            PrimitiveType::Double => "DoubleType".into(),
            PrimitiveType::Boolean => "BooleanType".into(),
            PrimitiveType::Binary => "BinaryType".into(),
            PrimitiveType::Date => "DateType".into(),
            PrimitiveType::Timestamp => "TimestampType".into(),
            PrimitiveType::TimestampNtz => "TimestampNTZType".into(),
            PrimitiveType::Decimal(..) => "DecimalType".into(),
        },
        DeltaDataType::Struct(_) => "StructType".into(),
        DeltaDataType::Array(_) => "ArrayType".into(),
        DeltaDataType::Map(_) => "MapType".into(),
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other),
    }
}

#[async_trait]
impl SchemaReader for DeltaLogSchemaReader {
    fn name(&self) -> &str {
        "delta"
    }

    fn supported_formats(&self) -> &[DataSourceFormat] {
        &[DataSourceFormat::Delta]
    }

    #[instrument(skip(self, storage_options))]
    async fn read_schema(
        &self,
        location: &str,
        storage_options: &HashMap<String, String>,
    ) -> CatalogResult<Vec<SourceColumn>> {
        REGISTER_S3.call_once(|| deltalake::aws::register_handlers(None));

        let url = table_url(location)?;
        let table = deltalake::open_table_with_storage_options(url, storage_options.clone())
            .await
            .map_err(|e| schema_error(location, e))?;
        debug!(version = ?table.version(), "opened delta table");

        let snapshot = table.snapshot().map_err(|e| schema_error(location, e))?;
        Ok(snapshot
            .schema()
            .fields()
            .map(|f| SourceColumn::new(f.name(), delta_type_to_engine(f.data_type())))
            .collect())
    }
}

// ---- Parquet ----

/// Reads the arrow schema of the first data file under a Parquet table location.
///
/// Files and directories whose names start with `_` or `.` are ignored. Only
/// the footer of the chosen file is fetched.
pub struct ParquetSchemaReader;

/// Engine type name of an arrow type (`Int64` → `LongType`).
///
/// Types without an engine counterpart keep their arrow name.
pub fn arrow_type_to_engine(data_type: &DataType) -> String {
    match data_type {
        DataType::Int8 => "ByteType".into(),
        DataType::Int16 => "ShortType".into(),
        DataType::Int32 => "IntegerType".into(),
        DataType::Int64 => "LongType".into(),
        DataType::Float32 => "FloatType".into(),
        DataType::Float64 => "DoubleType".into(),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "StringType".into(),
        DataType::Boolean => "BooleanType".into(),
        DataType::Binary | DataType::LargeBinary | DataType::BinaryView => "BinaryType".into(),
        DataType::Date32 | DataType::Date64 => "DateType".into(),
        DataType::Timestamp(_, _) => "TimestampType".into(),
        DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => "DecimalType".into(),
        DataType::Struct(_) => "StructType".into(),
        DataType::List(_) | DataType::LargeList(_) | DataType::FixedSizeList(_, _) => {
            "ArrayType".into()
        }
        DataType::Map(_, _) => "MapType".into(),
        other => other.to_string(),
    }
}

fn is_data_file(meta: &ObjectMeta, root: &Path) -> bool {
    let Some(parts) = meta.location.prefix_match(root) else {
        return false;
    };
    let parts: Vec<_> = parts.collect();
    let hidden = parts.iter().any(|p| {
        let name = p.as_ref();
        name.starts_with('_') || name.starts_with('.')
    });
    !hidden
        && parts
            .last()
            .is_some_and(|name| name.as_ref().ends_with(".parquet"))
}

/// First data file under `root`, in path order.
async fn first_data_file(
    store: &dyn ObjectStore,
    root: &Path,
    location: &str,
) -> CatalogResult<ObjectMeta> {
    let mut files: Vec<ObjectMeta> = store
        .list(Some(root))
        .try_collect::<Vec<_>>()
        .await
        .map_err(|e| schema_error(location, e))?
        .into_iter()
        .filter(|meta| is_data_file(meta, root))
        .collect();
    files.sort_by(|a, b| a.location.cmp(&b.location));
    files
        .into_iter()
        .next()
        .ok_or_else(|| schema_error(location, "no parquet data files found"))
}

#[async_trait]
impl SchemaReader for ParquetSchemaReader {
    fn name(&self) -> &str {
        "parquet"
    }

    fn supported_formats(&self) -> &[DataSourceFormat] {
        &[DataSourceFormat::Parquet]
    }

    #[instrument(skip(self, storage_options))]
    async fn read_schema(
        &self,
        location: &str,
        storage_options: &HashMap<String, String>,
    ) -> CatalogResult<Vec<SourceColumn>> {
        let (store, root) = open_store(location, storage_options)?;

        let file = if location.ends_with(".parquet") {
            store
                .head(&root)
                .await
                .map_err(|e| schema_error(location, e))?
        } else {
            first_data_file(store.as_ref(), &root, location).await?
        };

        debug!(file = %file.location, size = file.size, "reading parquet footer");
        let path = file.location.clone();
        let reader = ParquetObjectReader::new(store, file.location).with_file_size(file.size);
        let builder = ParquetRecordBatchStreamBuilder::new(reader)
            .await
            .map_err(|e| schema_error(path.as_ref(), e))?;

        Ok(builder
            .schema()
            .fields()
            .iter()
            .map(|f| SourceColumn::new(f.name(), arrow_type_to_engine(f.data_type())))
            .collect())
    }
}

/// Returns the default set of schema readers: Delta and Parquet.
pub fn default_schema_readers() -> Vec<Arc<dyn SchemaReader>> {
    vec![Arc::new(DeltaLogSchemaReader), Arc::new(ParquetSchemaReader)]
}
