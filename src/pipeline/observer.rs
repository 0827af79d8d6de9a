use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::ErrorKind;

/// Events emitted by [`super::TablePipeline`] while producing a table.
///
/// `table` is the catalog key for [`super::TablePipeline::run_table`] and `None` for inline
/// specs passed to [`super::TablePipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStarted { table: Option<String> },
    RecordsFetched { count: usize },
    PredicateCompiled,
    RecordsFiltered { kept: usize, dropped: usize },
    RunFinished {
        table: Option<String>,
        rows: usize,
        elapsed: Duration,
    },
    RunFailed {
        table: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

/// Observer hook for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Forwards pipeline events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { table } => {
                debug!("[table][start] table={}", table_label(table))
            }
            PipelineEvent::RecordsFetched { count } => debug!("[table][fetch] records={count}"),
            PipelineEvent::PredicateCompiled => debug!("[table][compile] ok"),
            PipelineEvent::RecordsFiltered { kept, dropped } => {
                debug!("[table][filter] kept={kept} dropped={dropped}")
            }
            PipelineEvent::RunFinished {
                table,
                rows,
                elapsed,
            } => info!(
                "[table][ok] table={} rows={rows} elapsed={elapsed:?}",
                table_label(table)
            ),
            PipelineEvent::RunFailed {
                table,
                kind,
                message,
            } => warn!(
                "[table][{kind}] table={} err={message}",
                table_label(table)
            ),
        }
    }
}

fn table_label(table: &Option<String>) -> &str {
    table.as_deref().unwrap_or("<inline>")
}

/// Fans events out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &PipelineEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Cumulative counters across every run of one pipeline.
///
/// Safe to update from concurrent runs; callers can snapshot them at any time.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    runs_started: AtomicU64,
    runs_succeeded: AtomicU64,
    runs_failed: AtomicU64,
    records_fetched: AtomicU64,
    records_kept: AtomicU64,
    elapsed_ns: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_run_start(&self) {
        self.runs_started.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn on_records_fetched(&self, n: usize) {
        self.records_fetched.fetch_add(n as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_records_kept(&self, n: usize) {
        self.records_kept.fetch_add(n as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_run_end(&self, ok: bool, elapsed: Duration) {
        if ok {
            self.runs_succeeded.fetch_add(1, Ordering::SeqCst);
        } else {
            self.runs_failed.fetch_add(1, Ordering::SeqCst);
        }
        let add = elapsed.as_nanos().min(u64::MAX as u128) as u64;
        self.elapsed_ns.fetch_add(add, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::SeqCst),
            runs_succeeded: self.runs_succeeded.load(Ordering::SeqCst),
            runs_failed: self.runs_failed.load(Ordering::SeqCst),
            records_fetched: self.records_fetched.load(Ordering::SeqCst),
            records_kept: self.records_kept.load(Ordering::SeqCst),
            elapsed: Duration::from_nanos(self.elapsed_ns.load(Ordering::SeqCst)),
        }
    }
}

/// Immutable snapshot of [`PipelineMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMetricsSnapshot {
    pub runs_started: u64,
    pub runs_succeeded: u64,
    pub runs_failed: u64,
    pub records_fetched: u64,
    pub records_kept: u64,
    pub elapsed: Duration,
}

impl fmt::Display for PipelineMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "runs={}/{} failed={}, records kept={}/{}, elapsed={:?}",
            self.runs_succeeded,
            self.runs_started,
            self.runs_failed,
            self.records_kept,
            self.records_fetched,
            self.elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::{
        CompositeObserver, LogObserver, PipelineEvent, PipelineMetrics, PipelineObserver,
    };

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl PipelineObserver for Counting {
        fn on_event(&self, _event: &PipelineEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn composite_fans_out_to_every_observer() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let composite = CompositeObserver::new(vec![a.clone(), b.clone(), Arc::new(LogObserver)]);

        composite.on_event(&PipelineEvent::PredicateCompiled);
        composite.on_event(&PipelineEvent::RecordsFetched { count: 2 });

        assert_eq!(a.0.load(Ordering::SeqCst), 2);
        assert_eq!(b.0.load(Ordering::SeqCst), 2);
        assert_eq!(format!("{composite:?}"), "CompositeObserver { observers_len: 3 }");
    }

    #[test]
    fn metrics_accumulate_across_runs() {
        let metrics = PipelineMetrics::new();
        metrics.on_run_start();
        metrics.on_records_fetched(10);
        metrics.on_records_kept(4);
        metrics.on_run_end(true, Duration::from_millis(2));
        metrics.on_run_start();
        metrics.on_run_end(false, Duration::from_millis(1));

        let snap = metrics.snapshot();
        assert_eq!(snap.runs_started, 2);
        assert_eq!(snap.runs_succeeded, 1);
        assert_eq!(snap.runs_failed, 1);
        assert_eq!(snap.elapsed, Duration::from_millis(3));
        assert_eq!(
            snap.to_string(),
            "runs=1/2 failed=1, records kept=4/10, elapsed=3ms"
        );
    }
}
