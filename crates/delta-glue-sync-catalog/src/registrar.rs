// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Create-or-update registration of mirrored tables in the target catalog.
//!
//! Per table the registrar moves through:
//!
//! ```text
//! Unregistered --absent--> Create --ok--> Registered
//! Registered   --found---> Update --ok--> Registered
//! any          --error---> Failed
//! ```
//!
//! Nothing is retried and there is no version check between the lookup and
//! the write, so a concurrent writer is overwritten (last writer wins).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::catalog_provider::{CatalogResult, DataSourceFormat, SourceColumn};
use crate::target_catalog::*;
use crate::type_mapping::columns_to_glue;

/// Derive the target-catalog name of a source table.
///
/// Every `.` separator becomes `__`: `analytics_prod.events` →
/// `analytics_prod__events`. The transform is not injective (`a.b__c` and
/// `a__b.c` collide); [`crate::Connector`] reports collisions it sees.
pub fn derive_target_name(qualified_name: &str) -> String {
    qualified_name.replace('.', "__")
}

/// Build the full external-table definition for a source table.
pub fn build_definition(
    qualified_name: &str,
    location: &str,
    columns: &[SourceColumn],
    format: &DataSourceFormat,
) -> TargetTableDefinition {
    TargetTableDefinition {
        name: derive_target_name(qualified_name),
        columns: columns_to_glue(columns),
        location: location.to_string(),
        storage: StorageFormat::hive_parquet(),
        stored_as_sub_directories: false,
        table_type: EXTERNAL_TABLE.to_string(),
        parameters: BTreeMap::from([(
            CLASSIFICATION_PARAMETER.to_string(),
            format.as_str().to_string(),
        )]),
    }
}

/// Which write path a successful registration took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created,
    Updated,
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("Created"),
            Self::Updated => f.write_str("Updated"),
        }
    }
}

/// Successful registration of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub target_name: String,
    pub outcome: RegistrationOutcome,
}

/// Registers tables of one format into one target database.
pub struct Registrar {
    target: Arc<dyn TargetCatalog>,
    database: String,
    format: DataSourceFormat,
}

impl Registrar {
    pub fn new(
        target: Arc<dyn TargetCatalog>,
        database: impl Into<String>,
        format: DataSourceFormat,
    ) -> Self {
        Self {
            target,
            database: database.into(),
            format,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn format(&self) -> &DataSourceFormat {
        &self.format
    }

    pub fn target(&self) -> &dyn TargetCatalog {
        self.target.as_ref()
    }

    /// Create or fully overwrite the target entry for a table.
    #[instrument(skip(self, columns), fields(database = %self.database))]
    pub async fn register(
        &self,
        qualified_name: &str,
        location: &str,
        columns: &[SourceColumn],
    ) -> CatalogResult<Registration> {
        let definition = build_definition(qualified_name, location, columns, &self.format);

        let outcome = match self
            .target
            .get_table(&self.database, &definition.name)
            .await?
        {
            TableLookup::Found(_) => {
                self.target
                    .update_table(&self.database, &definition)
                    .await?;
                RegistrationOutcome::Updated
            }
            TableLookup::Absent => {
                self.target
                    .create_table(&self.database, &definition)
                    .await?;
                RegistrationOutcome::Created
            }
        };

        debug!(target_name = %definition.name, %outcome, "registered table");
        Ok(Registration {
            target_name: definition.name,
            outcome,
        })
    }
}
