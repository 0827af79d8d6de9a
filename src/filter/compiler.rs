//! Compiles [`FilterNode`] trees into record predicates.
//!
//! Compilation is eager and recursive: every node of the tree is turned into a closure before
//! any record is evaluated, and `custom` nodes are resolved through the registry here, once,
//! rather than per record. The resulting predicate is total: a leaf whose operands cannot be
//! compared (missing field, null, mismatched types) evaluates to `false`.

use std::cmp::Ordering;
use std::sync::Arc;

use super::node::FilterNode;
use crate::error::TableResult;
use crate::registry::ServiceRegistry;
use crate::types::{Record, Value};

/// Compiled, shareable record predicate.
pub type RecordPredicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Predicate that ignores the record and returns `result`.
pub fn constant(result: bool) -> RecordPredicate {
    Arc::new(move |_: &Record| result)
}

/// Builds [`RecordPredicate`]s, resolving `custom` nodes through a [`ServiceRegistry`].
#[derive(Clone, Copy)]
pub struct PredicateCompiler<'a> {
    registry: &'a dyn ServiceRegistry,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(registry: &'a dyn ServiceRegistry) -> Self {
        Self { registry }
    }

    /// Compile an optional filter tree. No filter compiles to the always-true predicate.
    ///
    /// Fails only when a `custom` node cannot be resolved or its factory fails.
    pub fn compile(&self, node: Option<&FilterNode>) -> TableResult<RecordPredicate> {
        match node {
            None => Ok(constant(true)),
            Some(node) => self.compile_node(node),
        }
    }

    fn compile_node(&self, node: &FilterNode) -> TableResult<RecordPredicate> {
        let predicate: RecordPredicate = match node {
            FilterNode::Equals {
                field,
                value,
                case_insensitive,
            } => equals(field, value, *case_insensitive),
            FilterNode::NotEquals {
                field,
                value,
                case_insensitive,
            } => negate(equals(field, value, *case_insensitive)),
            FilterNode::Range { field, min, max } => range(field, min.as_ref(), max.as_ref()),
            FilterNode::In {
                field,
                values,
                case_insensitive,
            } => membership(field, values.as_deref(), *case_insensitive),
            FilterNode::NotIn {
                field,
                values,
                case_insensitive,
            } => negate(membership(field, values.as_deref(), *case_insensitive)),
            FilterNode::Contains {
                field,
                value,
                case_insensitive,
            } => text_match(field, value, *case_insensitive, TextMatch::Contains),
            FilterNode::StartsWith {
                field,
                value,
                case_insensitive,
            } => text_match(field, value, *case_insensitive, TextMatch::StartsWith),
            FilterNode::EndsWith {
                field,
                value,
                case_insensitive,
            } => text_match(field, value, *case_insensitive, TextMatch::EndsWith),
            FilterNode::IsNull { field } => {
                let field = field.clone();
                Arc::new(move |r: &Record| r.get(&field).is_null())
            }
            FilterNode::IsNotNull { field } => {
                let field = field.clone();
                Arc::new(move |r: &Record| !r.get(&field).is_null())
            }
            FilterNode::GreaterThan { field, value } => strictly(field, value, Ordering::Greater),
            FilterNode::LessThan { field, value } => strictly(field, value, Ordering::Less),
            FilterNode::And { conditions } => {
                if conditions.is_empty() {
                    return Ok(constant(true));
                }
                let children = self.compile_all(conditions)?;
                Arc::new(move |r: &Record| children.iter().all(|p| p(r)))
            }
            FilterNode::Or { conditions } => {
                if conditions.is_empty() {
                    return Ok(constant(false));
                }
                let children = self.compile_all(conditions)?;
                Arc::new(move |r: &Record| children.iter().any(|p| p(r)))
            }
            // Only the first condition is negated.
            FilterNode::Not { conditions } => match conditions.first() {
                None => constant(true),
                Some(first) => negate(self.compile_node(first)?),
            },
            FilterNode::Custom { service, operation } => {
                self.registry.resolve_custom_predicate(service, operation)?
            }
        };
        Ok(predicate)
    }

    fn compile_all(&self, nodes: &[FilterNode]) -> TableResult<Vec<RecordPredicate>> {
        nodes.iter().map(|n| self.compile_node(n)).collect()
    }
}

fn negate(inner: RecordPredicate) -> RecordPredicate {
    Arc::new(move |r: &Record| !inner(r))
}

fn equals(field: &str, expected: &Value, case_insensitive: bool) -> RecordPredicate {
    let field = field.to_string();
    let expected = expected.clone();
    let folded = (case_insensitive && !expected.is_null())
        .then(|| expected.to_string_form().to_lowercase());

    Arc::new(move |r: &Record| match (r.get(&field), &expected) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Utf8(actual), _) if folded.is_some() => {
            folded.as_deref() == Some(actual.to_lowercase().as_str())
        }
        (actual, expected) => actual == expected,
    })
}

fn range(field: &str, min: Option<&Value>, max: Option<&Value>) -> RecordPredicate {
    let field = field.to_string();
    let min = min.filter(|v| !v.is_null()).cloned();
    let max = max.filter(|v| !v.is_null()).cloned();

    Arc::new(move |r: &Record| {
        let actual = r.get(&field);
        if actual.is_null() {
            return false;
        }
        let above_min = min.as_ref().is_none_or(|m| {
            matches!(actual.compare(m), Some(Ordering::Greater | Ordering::Equal))
        });
        let below_max = max.as_ref().is_none_or(|m| {
            matches!(actual.compare(m), Some(Ordering::Less | Ordering::Equal))
        });
        above_min && below_max
    })
}

fn membership(field: &str, values: Option<&[Value]>, case_insensitive: bool) -> RecordPredicate {
    let Some(values) = values else {
        return constant(false);
    };
    let field = field.to_string();
    let values = values.to_vec();
    let folded: Option<Vec<String>> = case_insensitive.then(|| {
        values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| v.to_string_form().to_lowercase())
            .collect()
    });

    Arc::new(move |r: &Record| match (r.get(&field), &folded) {
        (Value::Utf8(actual), Some(folded)) => {
            let actual = actual.to_lowercase();
            folded.iter().any(|v| *v == actual)
        }
        (actual, _) => values.contains(actual),
    })
}

#[derive(Debug, Clone, Copy)]
enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextMatch {
    fn test(self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::Contains => haystack.contains(needle),
            Self::StartsWith => haystack.starts_with(needle),
            Self::EndsWith => haystack.ends_with(needle),
        }
    }
}

fn text_match(field: &str, value: &Value, case_insensitive: bool, mode: TextMatch) -> RecordPredicate {
    if value.is_null() {
        return constant(false);
    }
    let field = field.to_string();
    let needle = if case_insensitive {
        value.to_string_form().to_lowercase()
    } else {
        value.to_string_form()
    };

    Arc::new(move |r: &Record| {
        let actual = r.get(&field);
        if actual.is_null() {
            return false;
        }
        let haystack = actual.to_string_form();
        if case_insensitive {
            mode.test(&haystack.to_lowercase(), &needle)
        } else {
            mode.test(&haystack, &needle)
        }
    })
}

fn strictly(field: &str, value: &Value, wanted: Ordering) -> RecordPredicate {
    if value.is_null() {
        return constant(false);
    }
    let field = field.to_string();
    let value = value.clone();

    Arc::new(move |r: &Record| r.get(&field).compare(&value) == Some(wanted))
}
