// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Connector facade that bundles a [`SourceCatalog`], [`SchemaReader`]s and a
//! [`Registrar`] into the mirror pipeline.
//!
//! The pipeline is strictly sequential: one table is described, its schema
//! read, and its definition registered before the next table is looked at.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::catalog_provider::*;
use crate::registrar::{derive_target_name, Registrar, RegistrationOutcome};
use crate::table_reader::SchemaReader;

/// Result of processing one listed table.
#[derive(Debug)]
pub enum TableOutcome {
    /// The table was created or updated in the target catalog.
    Registered {
        source: SourceTable,
        target_name: String,
        outcome: RegistrationOutcome,
    },
    /// The table is stored in a format other than the one being mirrored.
    Skipped {
        ident: TableIdent,
        format: DataSourceFormat,
    },
    /// Describing, reading or registering the table failed.
    Failed { ident: TableIdent, error: CatalogError },
}

impl TableOutcome {
    pub fn ident(&self) -> &TableIdent {
        match self {
            Self::Registered { source, .. } => &source.ident,
            Self::Skipped { ident, .. } | Self::Failed { ident, .. } => ident,
        }
    }
}

/// Everything that happened during one [`Connector::mirror_namespace`] call.
#[derive(Debug, Default)]
pub struct MirrorReport {
    /// One entry per listed table, in listing order.
    pub outcomes: Vec<TableOutcome>,
    /// Derived names claimed by more than one source table, with the
    /// identifiers that claimed them in encounter order.
    pub collisions: Vec<(String, Vec<TableIdent>)>,
}

impl MirrorReport {
    /// Tables that reached the target catalog.
    pub fn registered(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Registered { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&TableOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

enum Candidate {
    Eligible(SourceTable),
    OtherFormat(DataSourceFormat),
}

/// Bundles the source catalog, the schema readers and the registrar.
///
/// # Extensibility
///
/// - Swap the source: pass a different `SourceCatalog` (e.g., Hive Metastore).
/// - Add formats: pass additional `SchemaReader`s (e.g., Iceberg).
/// - Swap the target: build the `Registrar` over another `TargetCatalog`.
pub struct Connector {
    source: Arc<dyn SourceCatalog>,
    readers: Vec<Arc<dyn SchemaReader>>,
    registrar: Registrar,
    storage_options: HashMap<String, String>,
}

impl Connector {
    pub fn new(
        source: Arc<dyn SourceCatalog>,
        readers: Vec<Arc<dyn SchemaReader>>,
        registrar: Registrar,
    ) -> Self {
        Self {
            source,
            readers,
            registrar,
            storage_options: HashMap::new(),
        }
    }

    /// Options handed to every schema read (object store credentials, region).
    pub fn with_storage_options(mut self, storage_options: HashMap<String, String>) -> Self {
        self.storage_options = storage_options;
        self
    }

    pub fn source(&self) -> &dyn SourceCatalog {
        self.source.as_ref()
    }

    pub fn registrar(&self) -> &Registrar {
        &self.registrar
    }

    /// Find a schema reader that supports the given data format.
    pub fn reader_for(&self, format: &DataSourceFormat) -> Option<&dyn SchemaReader> {
        self.readers
            .iter()
            .find(|r| r.supported_formats().contains(format))
            .map(|r| r.as_ref())
    }

    /// Mirror every table of `namespace` stored in the registrar's format.
    ///
    /// `on_outcome` is called once per listed table as soon as it has been
    /// processed. Per-table errors end up in [`TableOutcome::Failed`] and never
    /// stop the loop; only a missing reader or a failed listing is returned
    /// as an error.
    #[instrument(skip(self, on_outcome), fields(source = self.source.name(), target = self.registrar.target().name()))]
    pub async fn mirror_namespace(
        &self,
        namespace: &str,
        mut on_outcome: impl FnMut(&TableOutcome),
    ) -> CatalogResult<MirrorReport> {
        let format = self.registrar.format();
        let reader = self.reader_for(format).ok_or_else(|| {
            CatalogError::Other(format!("No schema reader supports format '{}'", format))
        })?;

        let idents = self.source.list_tables(namespace).await?;
        info!(tables = idents.len(), "listed source namespace");

        let mut report = MirrorReport::default();
        let mut claimed: HashMap<String, Vec<TableIdent>> = HashMap::new();

        for ident in idents {
            let outcome = self.mirror_table(ident, reader, &mut claimed).await;
            if let TableOutcome::Failed { ident, error } = &outcome {
                // The caller reports failed tables on the console.
                debug!(table = %ident, %error, "failed to mirror table");
            }
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }

        let mut collisions: Vec<_> = claimed
            .into_iter()
            .filter(|(_, idents)| idents.len() > 1)
            .collect();
        collisions.sort();
        report.collisions = collisions;
        Ok(report)
    }

    async fn mirror_table(
        &self,
        ident: TableIdent,
        reader: &dyn SchemaReader,
        claimed: &mut HashMap<String, Vec<TableIdent>>,
    ) -> TableOutcome {
        match self.read_source_table(&ident, reader).await {
            Ok(Candidate::OtherFormat(format)) => TableOutcome::Skipped { ident, format },
            Ok(Candidate::Eligible(source)) => {
                let qualified_name = source.ident.qualified_name();
                let target_name = derive_target_name(&qualified_name);
                let owners = claimed.entry(target_name.clone()).or_default();
                if let Some(first) = owners.first() {
                    warn!(
                        target_name = %target_name,
                        first = %first,
                        second = %source.ident,
                        "derived target name collision, later table overwrites earlier one"
                    );
                }
                owners.push(source.ident.clone());

                match self
                    .registrar
                    .register(&qualified_name, &source.location, &source.columns)
                    .await
                {
                    Ok(registration) => TableOutcome::Registered {
                        target_name: registration.target_name,
                        outcome: registration.outcome,
                        source,
                    },
                    Err(error) => TableOutcome::Failed {
                        ident: source.ident,
                        error,
                    },
                }
            }
            Err(error) => TableOutcome::Failed { ident, error },
        }
    }

    /// Describe a table and, when it is in the mirrored format, read its schema.
    async fn read_source_table(
        &self,
        ident: &TableIdent,
        reader: &dyn SchemaReader,
    ) -> CatalogResult<Candidate> {
        let detail = self.source.describe_table(ident).await?;
        if &detail.format != self.registrar.format() {
            return Ok(Candidate::OtherFormat(detail.format));
        }

        let location = detail.location.ok_or_else(|| {
            CatalogError::InvalidResponse(format!("Table '{}' has no storage location", ident))
        })?;
        let columns = reader.read_schema(&location, &self.storage_options).await?;

        Ok(Candidate::Eligible(SourceTable {
            ident: ident.clone(),
            format: detail.format,
            location,
            columns,
        }))
    }
}
