use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed error raised by a registered service operation.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Convenience result type for table pipeline operations.
pub type TableResult<T> = Result<T, TableError>;

/// Coarse classification of a [`TableError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A table key, config file, or config value is missing or malformed.
    Configuration,
    /// A service or operation name could not be resolved through the registry.
    Resolution,
    /// A resolved operation ran and failed.
    Invocation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Resolution => "resolution",
            Self::Invocation => "invocation",
        };
        f.write_str(s)
    }
}

/// Error type returned by compilation, resolution and pipeline runs.
///
/// Record-level evaluation never produces one of these: leaf predicates that
/// cannot compare their operands evaluate to `false` instead.
#[derive(Debug, Error)]
pub enum TableError {
    /// No table with this key exists in the catalog.
    #[error("table config not found: '{key}'")]
    UnknownTable { key: String },

    /// Configuration decoded fine but is not usable.
    #[error("invalid table config: {message}")]
    InvalidConfig { message: String },

    /// Configuration text could not be decoded.
    #[error("invalid {format} table config: {message}")]
    ConfigParse { format: &'static str, message: String },

    /// Config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The registry has no service with this name.
    #[error("service not found: '{service}' (resolving {service}.{operation})")]
    ServiceResolution { service: String, operation: String },

    /// The service exists but has no usable operation with this name.
    #[error("operation '{operation}' not resolvable on service '{service}': {reason}")]
    OperationResolution {
        service: String,
        operation: String,
        reason: String,
    },

    /// The resolved operation itself failed.
    #[error("failed to invoke {service}.{operation}: {source}")]
    Invocation {
        service: String,
        operation: String,
        #[source]
        source: BoxError,
    },

    /// A run of a configured table failed; `source` is the underlying failure.
    #[error("table '{key}': {source}")]
    Table {
        key: String,
        #[source]
        source: Box<TableError>,
    },
}

impl TableError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTable { .. }
            | Self::InvalidConfig { .. }
            | Self::ConfigParse { .. }
            | Self::Io(_) => ErrorKind::Configuration,
            Self::ServiceResolution { .. } | Self::OperationResolution { .. } => {
                ErrorKind::Resolution
            }
            Self::Invocation { .. } => ErrorKind::Invocation,
            Self::Table { source, .. } => source.kind(),
        }
    }

    /// The table key this error was raised for, if it came out of a catalog run.
    pub fn table_key(&self) -> Option<&str> {
        match self {
            Self::UnknownTable { key } | Self::Table { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    /// The innermost error, with any table context peeled off.
    pub fn root(&self) -> &TableError {
        match self {
            Self::Table { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn in_table(self, key: &str) -> Self {
        match self {
            Self::UnknownTable { .. } | Self::Table { .. } => self,
            other => Self::Table {
                key: key.to_string(),
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
