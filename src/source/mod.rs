//! Data sources: named references to record-producing operations, and their resolution.
//!
//! In configuration a data source is either a map or the shorthand `"service.operation"`
//! (a trailing `()` is accepted):
//!
//! ```yaml
//! data-source: { service: people, operation: findAll }
//! # or
//! data-source: people.findAll()
//! ```

pub mod json;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::registry::ServiceRegistry;
use crate::types::Record;

/// Logical pointer to a zero-argument operation returning records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DataSourceRepr")]
pub struct DataSourceRef {
    pub service: String,
    pub operation: String,
}

impl DataSourceRef {
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
        }
    }
}

impl fmt::Display for DataSourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.operation)
    }
}

impl FromStr for DataSourceRef {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        let expr = expr.strip_suffix("()").unwrap_or(expr);
        match expr.split_once('.') {
            Some((service, operation))
                if !service.trim().is_empty()
                    && !operation.trim().is_empty()
                    && !operation.contains('.') =>
            {
                Ok(Self::new(service.trim(), operation.trim()))
            }
            _ => Err(TableError::invalid_config(format!(
                "data source '{s}' is not of the form 'service.operation'"
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataSourceRepr {
    Expr(String),
    Named {
        #[serde(alias = "bean-name")]
        service: String,
        #[serde(alias = "method-name")]
        operation: String,
    },
}

impl TryFrom<DataSourceRepr> for DataSourceRef {
    type Error = TableError;

    fn try_from(raw: DataSourceRepr) -> Result<Self, Self::Error> {
        match raw {
            DataSourceRepr::Expr(expr) => expr.parse(),
            DataSourceRepr::Named { service, operation } => Ok(Self::new(service, operation)),
        }
    }
}

/// Fetches the raw records behind a [`DataSourceRef`].
#[derive(Clone, Copy)]
pub struct DataSourceResolver<'a> {
    registry: &'a dyn ServiceRegistry,
}

impl<'a> DataSourceResolver<'a> {
    pub fn new(registry: &'a dyn ServiceRegistry) -> Self {
        Self { registry }
    }

    /// Resolve and invoke the operation.
    ///
    /// - unknown service: [`TableError::ServiceResolution`]
    /// - unknown operation or wrong signature: [`TableError::OperationResolution`]
    /// - the operation fails: [`TableError::Invocation`]
    ///
    /// An operation that returns no record list yields an empty `Vec`.
    pub fn fetch(&self, source: &DataSourceRef) -> TableResult<Vec<Record>> {
        let operation = self
            .registry
            .resolve_data_operation(&source.service, &source.operation)?;
        let records = operation().map_err(|err| TableError::Invocation {
            service: source.service.clone(),
            operation: source.operation.clone(),
            source: err,
        })?;
        Ok(records.unwrap_or_default())
    }
}
