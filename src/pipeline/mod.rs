//! The table pipeline: fetch → compile → filter → project.
//!
//! [`TablePipeline`] owns the service registry plus optional observability hooks, and produces
//! [`TableData`] from a [`TableSpec`]. Each run is synchronous and sequential; concurrent runs
//! share nothing but the registry and the metrics counters.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use table_pipeline::config::TableSpec;
//! use table_pipeline::filter::FilterNode;
//! use table_pipeline::pipeline::TablePipeline;
//! use table_pipeline::registry::{InMemoryServiceRegistry, Service};
//! use table_pipeline::source::DataSourceRef;
//! use table_pipeline::types::{ColumnDef, Record};
//!
//! # fn main() -> Result<(), table_pipeline::TableError> {
//! let registry = InMemoryServiceRegistry::new().with_service(
//!     "people",
//!     Service::new().static_data(
//!         "all",
//!         vec![
//!             Record::new().with("id", 1).with("name", "A").with("age", 30),
//!             Record::new().with("id", 2).with("name", "B").with("age", 12),
//!         ],
//!     ),
//! );
//!
//! let spec = TableSpec::new(
//!     DataSourceRef::new("people", "all"),
//!     vec![ColumnDef::new("name", "Name")],
//! )
//! .with_filter(FilterNode::greater_than("age", 17));
//!
//! let table = TablePipeline::new(Arc::new(registry)).run(&spec)?;
//! assert_eq!(table.rows, vec![Record::new().with("name", "A")]);
//! # Ok(())
//! # }
//! ```

mod observer;

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use crate::config::{TableCatalog, TableSpec};
use crate::error::{TableError, TableResult};
use crate::filter::{FilterNode, PredicateCompiler, RecordPredicate};
use crate::processing::{filter_records, project_records};
use crate::registry::ServiceRegistry;
use crate::source::{DataSourceRef, DataSourceResolver};
use crate::types::{Record, TableData};

pub use observer::{
    CompositeObserver, LogObserver, PipelineEvent, PipelineMetrics, PipelineMetricsSnapshot,
    PipelineObserver,
};

/// Produces [`TableData`] from table specs.
pub struct TablePipeline {
    registry: Arc<dyn ServiceRegistry>,
    observer: Option<Arc<dyn PipelineObserver>>,
    metrics: Arc<PipelineMetrics>,
}

impl TablePipeline {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self {
            registry,
            observer: None,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Attach an observer for pipeline events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to the cumulative run metrics.
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Compile a filter tree against this pipeline's registry.
    pub fn compile(&self, filter: Option<&FilterNode>) -> TableResult<RecordPredicate> {
        PredicateCompiler::new(self.registry.as_ref()).compile(filter)
    }

    /// Fetch the raw records for a data source.
    pub fn fetch(&self, source: &DataSourceRef) -> TableResult<Vec<Record>> {
        DataSourceResolver::new(self.registry.as_ref()).fetch(source)
    }

    /// Produce the table described by `spec`.
    ///
    /// Any resolution, invocation or compile failure aborts the run; no partial table is
    /// returned.
    pub fn run(&self, spec: &TableSpec) -> TableResult<TableData> {
        self.observed(None, |this| this.execute(spec))
    }

    /// Look up `key` in the catalog and produce that table.
    ///
    /// Fails with [`TableError::UnknownTable`] when the key is not configured. Any other
    /// failure is wrapped in [`TableError::Table`] so the caller sees which table aborted.
    pub fn run_table(&self, catalog: &TableCatalog, key: &str) -> TableResult<TableData> {
        let config = catalog.snapshot();
        self.observed(Some(key), |this| {
            let spec = config
                .get(key)
                .ok_or_else(|| TableError::UnknownTable { key: key.to_string() })?;
            this.execute(spec).map_err(|err| err.in_table(key))
        })
    }

    fn execute(&self, spec: &TableSpec) -> TableResult<TableData> {
        let records = self.fetch(&spec.data_source)?;
        let fetched = records.len();
        self.metrics.on_records_fetched(fetched);
        self.emit(PipelineEvent::RecordsFetched { count: fetched });
        debug!("fetched {fetched} records from {}", spec.data_source);

        let filter = spec.effective_filter();
        let predicate = self.compile(filter.as_deref())?;
        self.emit(PipelineEvent::PredicateCompiled);

        let kept = filter_records(records, predicate.as_ref());
        self.metrics.on_records_kept(kept.len());
        self.emit(PipelineEvent::RecordsFiltered {
            kept: kept.len(),
            dropped: fetched - kept.len(),
        });

        let rows = project_records(&kept, &spec.columns);
        Ok(TableData::new(spec.columns.clone(), rows))
    }

    fn observed<F>(&self, table: Option<&str>, run: F) -> TableResult<TableData>
    where
        F: FnOnce(&Self) -> TableResult<TableData>,
    {
        let start = Instant::now();
        let table = table.map(str::to_string);
        self.metrics.on_run_start();
        self.emit(PipelineEvent::RunStarted {
            table: table.clone(),
        });

        let result = run(self);

        let elapsed = start.elapsed();
        self.metrics.on_run_end(result.is_ok(), elapsed);
        match &result {
            Ok(data) => self.emit(PipelineEvent::RunFinished {
                table,
                rows: data.row_count(),
                elapsed,
            }),
            Err(err) => {
                warn!(
                    "table {} failed: {err}",
                    table.as_deref().unwrap_or("<inline>")
                );
                self.emit(PipelineEvent::RunFailed {
                    table,
                    kind: err.kind(),
                    message: err.to_string(),
                });
            }
        }
        result
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
