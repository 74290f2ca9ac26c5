// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! AWS Glue Data Catalog client implementing the [`TargetCatalog`] trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_glue::config::retry::RetryConfig;
use aws_sdk_glue::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_glue::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_glue::types::{Column, SerDeInfo, StorageDescriptor, Table, TableInput};
use aws_sdk_glue::Client;
use tracing::{debug, instrument};

use crate::catalog_provider::{CatalogError, CatalogResult};
use crate::credentials::AwsCredentials;
use crate::target_catalog::*;

const PROVIDER_NAME: &str = "delta-glue-sync";

/// Configuration for connecting to the Glue Data Catalog.
#[derive(Debug, Clone)]
pub struct GlueConfig {
    /// AWS region of the Glue catalog (e.g., `us-east-1`).
    pub region: String,
    /// Endpoint override, for VPC endpoints and local testing.
    pub endpoint_url: Option<String>,
}

impl GlueConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint_url: None,
        }
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

/// Glue Data Catalog client.
pub struct GlueCatalog {
    client: Client,
}

impl GlueCatalog {
    /// Build a client from explicit static credentials.
    ///
    /// SDK retries are disabled: a failed call fails the table it belongs to.
    pub fn new(config: &GlueConfig, credentials: &AwsCredentials) -> Self {
        let credentials = Credentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            None,
            None,
            PROVIDER_NAME,
        );

        let mut builder = aws_sdk_glue::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint_url) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn sdk_error<E, R>(operation: &str, err: &SdkError<E, R>) -> CatalogError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = format!("{} failed: {}", operation, DisplayErrorContext(err));
    match err {
        SdkError::ServiceError(service) => match service.err().code() {
            Some("AccessDeniedException") => CatalogError::AuthError(message),
            Some("InvalidInputException") | Some("AlreadyExistsException") => {
                CatalogError::InvalidDefinition(message)
            }
            Some("EntityNotFoundException") => CatalogError::NotFound(message),
            _ => CatalogError::Other(message),
        },
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            CatalogError::ConnectionError(message)
        }
        _ => CatalogError::Other(message),
    }
}

fn to_table_input(definition: &TargetTableDefinition) -> CatalogResult<TableInput> {
    let columns = definition
        .columns
        .iter()
        .map(|col| {
            Column::builder()
                .name(&col.name)
                .r#type(&col.data_type)
                .build()
                .map_err(|e| CatalogError::InvalidDefinition(e.to_string()))
        })
        .collect::<CatalogResult<Vec<_>>>()?;

    let storage_descriptor = StorageDescriptor::builder()
        .set_columns(Some(columns))
        .location(&definition.location)
        .input_format(&definition.storage.input_format)
        .output_format(&definition.storage.output_format)
        .serde_info(
            SerDeInfo::builder()
                .serialization_library(&definition.storage.serialization_library)
                .build(),
        )
        .stored_as_sub_directories(definition.stored_as_sub_directories)
        .build();

    let mut builder = TableInput::builder()
        .name(&definition.name)
        .storage_descriptor(storage_descriptor)
        .table_type(&definition.table_type);
    for (key, value) in &definition.parameters {
        builder = builder.parameters(key, value);
    }

    builder
        .build()
        .map_err(|e| CatalogError::InvalidDefinition(e.to_string()))
}

fn from_glue_table(table: &Table) -> TargetTableDefinition {
    let descriptor = table.storage_descriptor();
    let columns = descriptor
        .map(|sd| {
            sd.columns()
                .iter()
                .map(|col| TargetColumn::new(col.name(), col.r#type().unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default();
    let text = |value: Option<&str>| value.unwrap_or_default().to_string();

    TargetTableDefinition {
        name: table.name().to_string(),
        columns,
        location: text(descriptor.and_then(|sd| sd.location())),
        storage: StorageFormat {
            input_format: text(descriptor.and_then(|sd| sd.input_format())),
            output_format: text(descriptor.and_then(|sd| sd.output_format())),
            serialization_library: text(
                descriptor
                    .and_then(|sd| sd.serde_info())
                    .and_then(|serde| serde.serialization_library()),
            ),
        },
        stored_as_sub_directories: descriptor
            .map(|sd| sd.stored_as_sub_directories())
            .unwrap_or_default(),
        table_type: text(table.table_type()),
        parameters: table
            .parameters()
            .map(|params| {
                params
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<BTreeMap<_, _>>()
            })
            .unwrap_or_default(),
    }
}

#[async_trait]
impl TargetCatalog for GlueCatalog {
    fn name(&self) -> &str {
        "aws-glue"
    }

    #[instrument(skip(self))]
    async fn get_table(&self, database: &str, name: &str) -> CatalogResult<TableLookup> {
        let result = self
            .client
            .get_table()
            .database_name(database)
            .name(name)
            .send()
            .await;

        match result {
            Ok(output) => {
                let table = output.table().ok_or_else(|| {
                    CatalogError::InvalidResponse(format!(
                        "GetTable returned no table for '{}.{}'",
                        database, name
                    ))
                })?;
                Ok(TableLookup::Found(from_glue_table(table)))
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_entity_not_found_exception()) =>
            {
                debug!("glue table absent");
                Ok(TableLookup::Absent)
            }
            Err(err) => Err(sdk_error("GetTable", &err)),
        }
    }

    #[instrument(skip(self, definition), fields(table = %definition.name))]
    async fn create_table(
        &self,
        database: &str,
        definition: &TargetTableDefinition,
    ) -> CatalogResult<()> {
        let input = to_table_input(definition)?;
        self.client
            .create_table()
            .database_name(database)
            .table_input(input)
            .send()
            .await
            .map_err(|e| sdk_error("CreateTable", &e))?;
        Ok(())
    }

    #[instrument(skip(self, definition), fields(table = %definition.name))]
    async fn update_table(
        &self,
        database: &str,
        definition: &TargetTableDefinition,
    ) -> CatalogResult<()> {
        let input = to_table_input(definition)?;
        self.client
            .update_table()
            .database_name(database)
            .table_input(input)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateTable", &e))?;
        Ok(())
    }
}
