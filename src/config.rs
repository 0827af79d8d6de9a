//! Table configuration.
//!
//! A [`TableConfig`] maps table keys to [`TableSpec`]s and is usually decoded from YAML:
//!
//! ```yaml
//! tables:
//!   active-adults:
//!     data-source: { service: people, operation: findAll }
//!     columns:
//!       - { field: id, label: ID }
//!       - { field: name, label: Name }
//!     filter:
//!       type: and
//!       conditions:
//!         - { type: equals, field: status, value: active }
//!         - { type: range, field: age, min: 18 }
//! ```
//!
//! [`TableCatalog`] holds the loaded configuration for the life of the process. Readers take a
//! snapshot; a reload swaps the whole configuration at once.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::filter::FilterNode;
use crate::source::DataSourceRef;
use crate::types::{ColumnDef, Value};

/// Declarative description of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableSpec {
    /// Where the records come from.
    pub data_source: DataSourceRef,
    /// Projection and display order.
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    /// Filter applied before projection; `None` keeps every record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,
    /// Shorthand exact-match criteria, conjoined with `filter`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub criteria: IndexMap<String, Value>,
}

impl TableSpec {
    pub fn new(data_source: DataSourceRef, columns: Vec<ColumnDef>) -> Self {
        Self {
            data_source,
            columns,
            filter: None,
            criteria: IndexMap::new(),
        }
    }

    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_criterion(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.criteria.insert(field.into(), value.into());
        self
    }

    /// The filter actually applied: `filter` and every criterion, conjoined.
    pub fn effective_filter(&self) -> Option<Cow<'_, FilterNode>> {
        if self.criteria.is_empty() {
            return self.filter.as_ref().map(Cow::Borrowed);
        }
        let criteria = self
            .criteria
            .iter()
            .map(|(field, value)| FilterNode::equals(field.as_str(), value.clone()));
        let conditions = self.filter.iter().cloned().chain(criteria);
        Some(Cow::Owned(FilterNode::and(conditions)))
    }

    /// Check names are present; `key` is used for error context.
    pub fn validate(&self, key: &str) -> TableResult<()> {
        if self.data_source.service.trim().is_empty() || self.data_source.operation.trim().is_empty()
        {
            return Err(TableError::invalid_config(format!(
                "table '{key}': data source needs a service and an operation"
            )));
        }
        if let Some(i) = self.columns.iter().position(|c| c.field.trim().is_empty()) {
            return Err(TableError::invalid_config(format!(
                "table '{key}': column {} has an empty field name",
                i + 1
            )));
        }
        if let Some(filter) = &self.filter {
            filter
                .check()
                .map_err(|message| TableError::invalid_config(format!("table '{key}': {message}")))?;
        }
        Ok(())
    }
}

/// All configured tables, by key, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub tables: IndexMap<String, TableSpec>,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, key: impl Into<String>, spec: TableSpec) -> Self {
        self.tables.insert(key.into(), spec);
        self
    }

    /// Decode and validate YAML.
    pub fn from_yaml_str(input: &str) -> TableResult<Self> {
        let config: Self = serde_yaml::from_str(input).map_err(|e| TableError::ConfigParse {
            format: "yaml",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Decode and validate JSON.
    pub fn from_json_str(input: &str) -> TableResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| TableError::ConfigParse {
            format: "json",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; the format is chosen by extension (`yaml`, `yml`, `json`).
    pub fn from_path(path: impl AsRef<Path>) -> TableResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&fs::read_to_string(path)?),
            "json" => Self::from_json_str(&fs::read_to_string(path)?),
            _ => Err(TableError::invalid_config(format!(
                "unsupported table config format for path ({})",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> TableResult<()> {
        self.tables
            .iter()
            .try_for_each(|(key, spec)| spec.validate(key))
    }

    pub fn get(&self, key: &str) -> Option<&TableSpec> {
        self.tables.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tables.contains_key(key)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

/// Process-wide, read-only table configuration with whole-config replacement.
#[derive(Debug, Default)]
pub struct TableCatalog {
    current: RwLock<Arc<TableConfig>>,
}

impl TableCatalog {
    pub fn new(config: TableConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// The configuration as of now. Later replacements do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<TableConfig> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a new configuration, returning the previous one.
    pub fn replace(&self, config: TableConfig) -> Arc<TableConfig> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(config))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.snapshot().contains(key)
    }

    /// A copy of the spec currently configured under `key`.
    pub fn get(&self, key: &str) -> Option<TableSpec> {
        self.snapshot().get(key).cloned()
    }

    /// Table keys in configuration order.
    pub fn table_names(&self) -> Vec<String> {
        self.snapshot().table_names().map(str::to_string).collect()
    }
}
