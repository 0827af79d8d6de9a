//! Service registry: resolves `service.operation` names to callables.
//!
//! The pipeline only depends on the [`ServiceRegistry`] trait. [`InMemoryServiceRegistry`] is
//! the explicit name → callable map most applications build once at startup:
//!
//! ```rust
//! use table_pipeline::registry::{InMemoryServiceRegistry, Service};
//! use table_pipeline::types::{Record, Value};
//!
//! let registry = InMemoryServiceRegistry::new().with_service(
//!     "people",
//!     Service::new()
//!         .static_data("all", vec![Record::new().with("id", 1).with("vip", true)])
//!         .predicate_operation("vipOnly", || {
//!             Ok::<_, std::convert::Infallible>(|r: &Record| matches!(r.get("vip"), Value::Bool(true)))
//!         }),
//! );
//! assert!(registry.contains_service("people"));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{BoxError, TableError, TableResult};
use crate::filter::RecordPredicate;
use crate::types::Record;

/// Zero-argument operation producing records. `Ok(None)` is treated as "no records".
pub type DataOperation = Arc<dyn Fn() -> Result<Option<Vec<Record>>, BoxError> + Send + Sync>;

/// Zero-argument operation producing a record predicate.
pub type PredicateOperation = Arc<dyn Fn() -> Result<RecordPredicate, BoxError> + Send + Sync>;

/// Name resolution used by the data source resolver and by `custom` filter nodes.
///
/// Implementations must be safe to call from concurrent pipeline runs.
pub trait ServiceRegistry: Send + Sync {
    /// Resolve a record-producing operation.
    fn resolve_data_operation(&self, service: &str, operation: &str) -> TableResult<DataOperation>;

    /// Resolve and build a custom record predicate.
    ///
    /// Failures raised while building the predicate are [`TableError::Invocation`].
    fn resolve_custom_predicate(
        &self,
        service: &str,
        operation: &str,
    ) -> TableResult<RecordPredicate>;
}

impl<T: ServiceRegistry + ?Sized> ServiceRegistry for Arc<T> {
    fn resolve_data_operation(&self, service: &str, operation: &str) -> TableResult<DataOperation> {
        (**self).resolve_data_operation(service, operation)
    }

    fn resolve_custom_predicate(
        &self,
        service: &str,
        operation: &str,
    ) -> TableResult<RecordPredicate> {
        (**self).resolve_custom_predicate(service, operation)
    }
}

/// A registered operation, tagged by what it returns.
#[derive(Clone)]
pub enum Operation {
    Data(DataOperation),
    Predicate(PredicateOperation),
}

impl Operation {
    fn signature(&self) -> &'static str {
        match self {
            Self::Data(_) => "() -> records",
            Self::Predicate(_) => "() -> predicate",
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature())
    }
}

/// A named group of operations.
#[derive(Clone, Default)]
pub struct Service {
    operations: IndexMap<String, Operation>,
}

impl Service {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record-producing operation.
    ///
    /// The closure may return `Vec<Record>` or `Option<Vec<Record>>`.
    pub fn data_operation<F, R, E>(mut self, name: impl Into<String>, op: F) -> Self
    where
        F: Fn() -> Result<R, E> + Send + Sync + 'static,
        R: Into<Option<Vec<Record>>>,
        E: Into<BoxError>,
    {
        let op: DataOperation = Arc::new(move || op().map(Into::into).map_err(Into::into));
        self.operations.insert(name.into(), Operation::Data(op));
        self
    }

    /// Register an operation that always returns a copy of `records`.
    pub fn static_data(mut self, name: impl Into<String>, records: Vec<Record>) -> Self {
        let op: DataOperation = Arc::new(move || Ok(Some(records.clone())));
        self.operations.insert(name.into(), Operation::Data(op));
        self
    }

    /// Register an operation that builds a record predicate.
    pub fn predicate_operation<F, P, E>(mut self, name: impl Into<String>, op: F) -> Self
    where
        F: Fn() -> Result<P, E> + Send + Sync + 'static,
        P: Fn(&Record) -> bool + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let op: PredicateOperation =
            Arc::new(move || op().map(|p| Arc::new(p) as RecordPredicate).map_err(Into::into));
        self.operations.insert(name.into(), Operation::Predicate(op));
        self
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.operations.iter()).finish()
    }
}

/// Explicit name → [`Service`] map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceRegistry {
    services: IndexMap<String, Service>,
}

impl InMemoryServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Self::register`].
    pub fn with_service(mut self, name: impl Into<String>, service: Service) -> Self {
        self.register(name, service);
        self
    }

    /// Register (or replace) a service.
    pub fn register(&mut self, name: impl Into<String>, service: Service) -> Option<Service> {
        self.services.insert(name.into(), service)
    }

    pub fn contains_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    fn lookup(&self, service: &str, operation: &str) -> TableResult<&Operation> {
        let svc = self
            .services
            .get(service)
            .ok_or_else(|| TableError::ServiceResolution {
                service: service.to_string(),
                operation: operation.to_string(),
            })?;
        svc.operation(operation)
            .ok_or_else(|| TableError::OperationResolution {
                service: service.to_string(),
                operation: operation.to_string(),
                reason: "no such operation".to_string(),
            })
    }
}

fn signature_mismatch(service: &str, operation: &str, expected: &str, found: &Operation) -> TableError {
    TableError::OperationResolution {
        service: service.to_string(),
        operation: operation.to_string(),
        reason: format!("expected {expected}, found {}", found.signature()),
    }
}

impl ServiceRegistry for InMemoryServiceRegistry {
    fn resolve_data_operation(&self, service: &str, operation: &str) -> TableResult<DataOperation> {
        match self.lookup(service, operation)? {
            Operation::Data(op) => Ok(Arc::clone(op)),
            other => Err(signature_mismatch(service, operation, "() -> records", other)),
        }
    }

    fn resolve_custom_predicate(
        &self,
        service: &str,
        operation: &str,
    ) -> TableResult<RecordPredicate> {
        match self.lookup(service, operation)? {
            Operation::Predicate(op) => op().map_err(|source| TableError::Invocation {
                service: service.to_string(),
                operation: operation.to_string(),
                source,
            }),
            other => Err(signature_mismatch(service, operation, "() -> predicate", other)),
        }
    }
}
