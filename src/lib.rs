//! `table-pipeline` turns declarative table specifications into render-ready [`types::TableData`].
//!
//! A [`config::TableSpec`] names a data-producing service operation, the columns to project,
//! and a filter expression tree. [`pipeline::TablePipeline::run`] fetches the records, compiles
//! the filter into a predicate, keeps the matching records in source order, and projects the
//! configured columns.
//!
//! ## Records and values
//!
//! Records are schema-less, insertion-ordered maps from field name to [`types::Value`]:
//!
//! - [`types::Value::Null`] (also what a missing field reads as)
//! - [`types::Value::Bool`], [`types::Value::Int64`], [`types::Value::Float64`],
//!   [`types::Value::Utf8`]
//! - [`types::Value::Opaque`] for application values that only need equality, ordering and a
//!   display form
//!
//! ## Filters
//!
//! [`filter::FilterNode`] covers equality, ranges, membership, substring tests, null checks,
//! strict ordering, `and`/`or`/`not` combinators and `custom` predicates supplied by a service.
//! Evaluation never fails per record: comparisons that do not make sense evaluate to `false`.
//!
//! ## Services
//!
//! Data sources and custom predicates are resolved by name through a
//! [`registry::ServiceRegistry`]; [`registry::InMemoryServiceRegistry`] is an explicit
//! name → callable map built at startup.
//!
//! ## End-to-end example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use table_pipeline::config::{TableCatalog, TableConfig};
//! use table_pipeline::pipeline::TablePipeline;
//! use table_pipeline::registry::{InMemoryServiceRegistry, Service};
//! use table_pipeline::types::Record;
//!
//! # fn main() -> Result<(), table_pipeline::TableError> {
//! let config = TableConfig::from_yaml_str(
//!     r#"
//! tables:
//!   active-adults:
//!     data-source: people.findAll
//!     columns: [{ field: id }, { field: name, label: Name }]
//!     filter:
//!       type: and
//!       conditions:
//!         - { type: equals, field: status, value: active }
//!         - { type: range, field: age, min: 18 }
//! "#,
//! )?;
//!
//! let registry = InMemoryServiceRegistry::new().with_service(
//!     "people",
//!     Service::new().static_data(
//!         "findAll",
//!         vec![
//!             Record::new().with("id", 1).with("name", "A").with("status", "active").with("age", 30),
//!             Record::new().with("id", 2).with("name", "B").with("status", "inactive").with("age", 40),
//!             Record::new().with("id", 3).with("name", "C").with("status", "active").with("age", 10),
//!         ],
//!     ),
//! );
//!
//! let catalog = TableCatalog::new(config);
//! let table = TablePipeline::new(Arc::new(registry)).run_table(&catalog, "active-adults")?;
//!
//! assert_eq!(table.rows, vec![Record::new().with("id", 1).with("name", "A")]);
//! assert_eq!(table.labels().collect::<Vec<_>>(), vec!["id", "Name"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: records, values, column and table shapes
//! - [`filter`]: filter trees and the predicate compiler
//! - [`registry`]: service name resolution
//! - [`source`]: data source references and record fetching
//! - [`processing`]: record filtering and column projection
//! - [`pipeline`]: the end-to-end table pipeline, observers and metrics
//! - [`config`]: table configuration loading and the catalog
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod processing;
pub mod registry;
pub mod source;
pub mod types;

pub use error::{BoxError, ErrorKind, TableError, TableResult};
