//! In-memory record transformations used by the table pipeline.
//!
//! - [`filter_records`]: order-preserving filter by predicate
//! - [`project_records`]: column projection with empty-string defaults
//!
//! ## Example: filter → project
//!
//! ```rust
//! use table_pipeline::processing::{filter_records, project_records};
//! use table_pipeline::types::{ColumnDef, Record, Value};
//!
//! let records = vec![
//!     Record::new().with("id", 1).with("active", true),
//!     Record::new().with("id", 2).with("active", false),
//!     Record::new().with("id", 3),
//! ];
//!
//! let kept = filter_records(records, |r| !matches!(r.get("active"), Value::Bool(false)));
//! let rows = project_records(&kept, &[ColumnDef::from_field("id"), ColumnDef::from_field("active")]);
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].get("active"), &Value::from(""));
//! ```

pub mod filter;
pub mod project;

pub use filter::filter_records;
pub use project::{project_record, project_records};
