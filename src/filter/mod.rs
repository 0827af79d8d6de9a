//! Filter expression trees and the predicate compiler.
//!
//! - [`FilterNode`]: declarative, serde-decodable boolean expression over record fields
//! - [`PredicateCompiler`]: turns a tree into a [`RecordPredicate`]
//!
//! ```rust
//! use table_pipeline::filter::{FilterNode, PredicateCompiler};
//! use table_pipeline::registry::InMemoryServiceRegistry;
//! use table_pipeline::types::Record;
//!
//! let registry = InMemoryServiceRegistry::new();
//! let node = FilterNode::and([
//!     FilterNode::equals("status", "active").ignore_case(),
//!     FilterNode::range("age", Some(18), None::<i64>),
//! ]);
//! let predicate = PredicateCompiler::new(&registry).compile(Some(&node)).unwrap();
//!
//! assert!(predicate(&Record::new().with("status", "Active").with("age", 30)));
//! assert!(!predicate(&Record::new().with("status", "Active")));
//! ```

pub mod compiler;
pub mod node;

pub use compiler::{constant, PredicateCompiler, RecordPredicate};
pub use node::FilterNode;
