// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! In-memory catalogs and schema reader.
//!
//! Used by tests. State lives behind `RwLock`s and is lost when
//! the process exits. Each double can be told to fail specific calls so that
//! per-table failure handling can be exercised without a network.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::catalog_provider::*;
use crate::table_reader::SchemaReader;
use crate::target_catalog::*;

fn poison_err<T>(_: PoisonError<T>) -> CatalogError {
    CatalogError::Other("lock poisoned".to_string())
}

/// Source catalog backed by a list of tables per namespace.
#[derive(Debug, Default)]
pub struct InMemorySourceCatalog {
    tables: Vec<TableDetail>,
    failing_describe: HashSet<TableIdent>,
    failing_list: HashSet<String>,
}

impl InMemorySourceCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. Listing returns tables in insertion order.
    #[must_use]
    pub fn with_table(
        mut self,
        ident: TableIdent,
        format: DataSourceFormat,
        location: Option<&str>,
    ) -> Self {
        self.tables.push(TableDetail {
            ident,
            format,
            location: location.map(str::to_string),
        });
        self
    }

    /// Make `describe_table` fail for `ident`.
    #[must_use]
    pub fn with_failing_describe(mut self, ident: TableIdent) -> Self {
        self.failing_describe.insert(ident);
        self
    }

    /// Make `list_tables` fail for `namespace`.
    #[must_use]
    pub fn with_failing_list(mut self, namespace: impl Into<String>) -> Self {
        self.failing_list.insert(namespace.into());
        self
    }
}

#[async_trait]
impl SourceCatalog for InMemorySourceCatalog {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn list_tables(&self, namespace: &str) -> CatalogResult<Vec<TableIdent>> {
        if self.failing_list.contains(namespace) {
            return Err(CatalogError::ConnectionError(format!(
                "listing namespace '{}' failed",
                namespace
            )));
        }
        Ok(self
            .tables
            .iter()
            .filter(|t| t.ident.namespace == namespace)
            .map(|t| t.ident.clone())
            .collect())
    }

    async fn describe_table(&self, ident: &TableIdent) -> CatalogResult<TableDetail> {
        if self.failing_describe.contains(ident) {
            return Err(CatalogError::ConnectionError(format!(
                "describing '{}' failed",
                ident
            )));
        }
        self.tables
            .iter()
            .find(|t| &t.ident == ident)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Table '{}' not found", ident)))
    }
}

/// One call recorded by [`InMemoryTargetCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOperation {
    Get(String),
    Create(String),
    Update(String),
}

/// Which target call to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetCall {
    Get,
    Create,
    Update,
}

/// Target catalog holding definitions keyed by `(database, name)`.
#[derive(Debug, Default)]
pub struct InMemoryTargetCatalog {
    tables: RwLock<HashMap<(String, String), TargetTableDefinition>>,
    operations: RwLock<Vec<TargetOperation>>,
    failures: HashSet<(TargetCall, String)>,
}

impl InMemoryTargetCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `call` fail for the table named `name`.
    #[must_use]
    pub fn with_failure(mut self, call: TargetCall, name: impl Into<String>) -> Self {
        self.failures.insert((call, name.into()));
        self
    }

    /// Current definition of `database.name`, if registered.
    pub fn table(&self, database: &str, name: &str) -> Option<TargetTableDefinition> {
        self.tables
            .read()
            .ok()?
            .get(&(database.to_string(), name.to_string()))
            .cloned()
    }

    /// Number of registered tables across all databases.
    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every call made so far, in order.
    pub fn operations(&self) -> Vec<TargetOperation> {
        self.operations
            .read()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: TargetCall, name: &str) -> CatalogResult<()> {
        let op = match call {
            TargetCall::Get => TargetOperation::Get(name.to_string()),
            TargetCall::Create => TargetOperation::Create(name.to_string()),
            TargetCall::Update => TargetOperation::Update(name.to_string()),
        };
        self.operations.write().map_err(poison_err)?.push(op);

        if self.failures.contains(&(call, name.to_string())) {
            return Err(CatalogError::Other(format!(
                "injected {:?} failure for '{}'",
                call, name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TargetCatalog for InMemoryTargetCatalog {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn get_table(&self, database: &str, name: &str) -> CatalogResult<TableLookup> {
        self.record(TargetCall::Get, name)?;
        let tables = self.tables.read().map_err(poison_err)?;
        Ok(match tables.get(&(database.to_string(), name.to_string())) {
            Some(def) => TableLookup::Found(def.clone()),
            None => TableLookup::Absent,
        })
    }

    async fn create_table(
        &self,
        database: &str,
        definition: &TargetTableDefinition,
    ) -> CatalogResult<()> {
        self.record(TargetCall::Create, &definition.name)?;
        let mut tables = self.tables.write().map_err(poison_err)?;
        let key = (database.to_string(), definition.name.clone());
        if tables.contains_key(&key) {
            return Err(CatalogError::InvalidDefinition(format!(
                "Table '{}.{}' already exists",
                database, definition.name
            )));
        }
        tables.insert(key, definition.clone());
        Ok(())
    }

    async fn update_table(
        &self,
        database: &str,
        definition: &TargetTableDefinition,
    ) -> CatalogResult<()> {
        self.record(TargetCall::Update, &definition.name)?;
        let mut tables = self.tables.write().map_err(poison_err)?;
        let key = (database.to_string(), definition.name.clone());
        match tables.get_mut(&key) {
            Some(existing) => {
                *existing = definition.clone();
                Ok(())
            }
            None => Err(CatalogError::NotFound(format!(
                "Table '{}.{}' not found",
                database, definition.name
            ))),
        }
    }
}

/// Schema reader returning fixed columns per storage location.
#[derive(Debug)]
pub struct StaticSchemaReader {
    formats: Vec<DataSourceFormat>,
    schemas: HashMap<String, Vec<SourceColumn>>,
    failing: HashSet<String>,
}

impl StaticSchemaReader {
    #[must_use]
    pub fn new(format: DataSourceFormat) -> Self {
        Self {
            formats: vec![format],
            schemas: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, location: impl Into<String>, columns: Vec<SourceColumn>) -> Self {
        self.schemas.insert(location.into(), columns);
        self
    }

    /// Make `read_schema` fail for `location`.
    #[must_use]
    pub fn with_failing_location(mut self, location: impl Into<String>) -> Self {
        self.failing.insert(location.into());
        self
    }
}

#[async_trait]
impl SchemaReader for StaticSchemaReader {
    fn name(&self) -> &str {
        "static"
    }

    fn supported_formats(&self) -> &[DataSourceFormat] {
        &self.formats
    }

    async fn read_schema(
        &self,
        location: &str,
        _storage_options: &HashMap<String, String>,
    ) -> CatalogResult<Vec<SourceColumn>> {
        if self.failing.contains(location) {
            return Err(CatalogError::SchemaRead(format!(
                "cannot read schema at '{}'",
                location
            )));
        }
        self.schemas.get(location).cloned().ok_or_else(|| {
            CatalogError::SchemaRead(format!("no table found at '{}'", location))
        })
    }
}
