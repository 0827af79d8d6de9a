//! Declarative filter expression trees.
//!
//! A [`FilterNode`] is pure data: it is decoded from table configuration (tag key `type`,
//! kebab-case variant and field names) and turned into a [`super::RecordPredicate`] by
//! [`super::PredicateCompiler`].
//!
//! ```yaml
//! type: and
//! conditions:
//!   - { type: equals, field: status, value: active, case-insensitive: true }
//!   - { type: range, field: age, min: 18 }
//! ```

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::types::Value;

/// One node of a filter expression tree.
///
/// The `type` tag is matched case-insensitively: `EQUALS`, `Equals` and `equals` are the
/// same node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    remote = "Self",
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case"
)]
pub enum FilterNode {
    /// `field == value`.
    Equals {
        field: String,
        #[serde(default)]
        value: Value,
        #[serde(default)]
        case_insensitive: bool,
    },
    /// Negation of [`FilterNode::Equals`].
    NotEquals {
        field: String,
        #[serde(default)]
        value: Value,
        #[serde(default)]
        case_insensitive: bool,
    },
    /// `min <= field <= max`; a missing (or null) bound is unconstrained.
    Range {
        field: String,
        #[serde(default, alias = "min-value", skip_serializing_if = "Option::is_none")]
        min: Option<Value>,
        #[serde(default, alias = "max-value", skip_serializing_if = "Option::is_none")]
        max: Option<Value>,
    },
    /// `field` is one of `values`. Absent `values` never matches.
    In {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        values: Option<Vec<Value>>,
        #[serde(default)]
        case_insensitive: bool,
    },
    /// Negation of [`FilterNode::In`].
    NotIn {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        values: Option<Vec<Value>>,
        #[serde(default)]
        case_insensitive: bool,
    },
    Contains {
        field: String,
        #[serde(default)]
        value: Value,
        #[serde(default)]
        case_insensitive: bool,
    },
    StartsWith {
        field: String,
        #[serde(default)]
        value: Value,
        #[serde(default)]
        case_insensitive: bool,
    },
    EndsWith {
        field: String,
        #[serde(default)]
        value: Value,
        #[serde(default)]
        case_insensitive: bool,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    /// Strict `field > value`.
    GreaterThan {
        field: String,
        #[serde(default)]
        value: Value,
    },
    /// Strict `field < value`.
    LessThan {
        field: String,
        #[serde(default)]
        value: Value,
    },
    /// All conditions hold. Empty is true.
    And {
        #[serde(default)]
        conditions: Vec<FilterNode>,
    },
    /// At least one condition holds. Empty is false.
    Or {
        #[serde(default)]
        conditions: Vec<FilterNode>,
    },
    /// Negates the first condition only; the rest are ignored. Empty is true.
    Not {
        #[serde(default)]
        conditions: Vec<FilterNode>,
    },
    /// Predicate supplied by a registered service operation.
    Custom {
        #[serde(alias = "custom-bean")]
        service: String,
        #[serde(alias = "custom-method")]
        operation: String,
    },
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FilterNode::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = serde_json::Value::deserialize(deserializer)?;
        if let Some(serde_json::Value::String(tag)) = raw.get_mut("type") {
            tag.make_ascii_lowercase();
        }
        FilterNode::deserialize(raw).map_err(de::Error::custom)
    }
}

impl FilterNode {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
            case_insensitive: false,
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEquals {
            field: field.into(),
            value: value.into(),
            case_insensitive: false,
        }
    }

    pub fn range(
        field: impl Into<String>,
        min: Option<impl Into<Value>>,
        max: Option<impl Into<Value>>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            min: min.map(Into::into),
            max: max.map(Into::into),
        }
    }

    pub fn one_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::In {
            field: field.into(),
            values: Some(values.into_iter().map(Into::into).collect()),
            case_insensitive: false,
        }
    }

    pub fn not_one_of<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::NotIn {
            field: field.into(),
            values: Some(values.into_iter().map(Into::into).collect()),
            case_insensitive: false,
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
            case_insensitive: false,
        }
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::StartsWith {
            field: field.into(),
            value: value.into(),
            case_insensitive: false,
        }
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::EndsWith {
            field: field.into(),
            value: value.into(),
            case_insensitive: false,
        }
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull { field: field.into() }
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::IsNotNull { field: field.into() }
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::GreaterThan {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::LessThan {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn and(conditions: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::And {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn or(conditions: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::Or {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn not(condition: FilterNode) -> Self {
        Self::Not {
            conditions: vec![condition],
        }
    }

    pub fn custom(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Custom {
            service: service.into(),
            operation: operation.into(),
        }
    }

    /// Turn on case-insensitive matching for node types that support it; other nodes are
    /// returned unchanged.
    pub fn ignore_case(mut self) -> Self {
        match &mut self {
            Self::Equals { case_insensitive, .. }
            | Self::NotEquals { case_insensitive, .. }
            | Self::In { case_insensitive, .. }
            | Self::NotIn { case_insensitive, .. }
            | Self::Contains { case_insensitive, .. }
            | Self::StartsWith { case_insensitive, .. }
            | Self::EndsWith { case_insensitive, .. } => *case_insensitive = true,
            _ => {}
        }
        self
    }

    /// Field read by a leaf node; `None` for combinators and custom nodes.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Equals { field, .. }
            | Self::NotEquals { field, .. }
            | Self::Range { field, .. }
            | Self::In { field, .. }
            | Self::NotIn { field, .. }
            | Self::Contains { field, .. }
            | Self::StartsWith { field, .. }
            | Self::EndsWith { field, .. }
            | Self::IsNull { field }
            | Self::IsNotNull { field }
            | Self::GreaterThan { field, .. }
            | Self::LessThan { field, .. } => Some(field),
            Self::And { .. } | Self::Or { .. } | Self::Not { .. } | Self::Custom { .. } => None,
        }
    }

    /// Child nodes of a combinator; empty for leaves.
    pub fn children(&self) -> &[FilterNode] {
        match self {
            Self::And { conditions } | Self::Or { conditions } | Self::Not { conditions } => {
                conditions
            }
            _ => &[],
        }
    }

    /// Check structural well-formedness: leaves name a field, custom nodes name a service and
    /// an operation. Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if let Self::Custom { service, operation } = self {
            if service.trim().is_empty() || operation.trim().is_empty() {
                return Err("custom filter needs both a service and an operation".to_string());
            }
        }
        if let Some(field) = self.field() {
            if field.trim().is_empty() {
                return Err(format!("{} filter has an empty field name", self.type_name()));
            }
        }
        self.children().iter().try_for_each(FilterNode::check)
    }

    /// The configuration tag of this node.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Equals { .. } => "equals",
            Self::NotEquals { .. } => "not-equals",
            Self::Range { .. } => "range",
            Self::In { .. } => "in",
            Self::NotIn { .. } => "not-in",
            Self::Contains { .. } => "contains",
            Self::StartsWith { .. } => "starts-with",
            Self::EndsWith { .. } => "ends-with",
            Self::IsNull { .. } => "is-null",
            Self::IsNotNull { .. } => "is-not-null",
            Self::GreaterThan { .. } => "greater-than",
            Self::LessThan { .. } => "less-than",
            Self::And { .. } => "and",
            Self::Or { .. } => "or",
            Self::Not { .. } => "not",
            Self::Custom { .. } => "custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FilterNode;
    use crate::types::Value;

    #[test]
    fn decodes_nested_tree_from_yaml() {
        let yaml = r#"
type: and
conditions:
  - type: equals
    field: status
    value: Active
    case-insensitive: true
  - type: range
    field: age
    min-value: 18
  - type: not
    conditions:
      - type: in
        field: region
        values: [eu, us]
  - type: custom
    custom-bean: rules
    custom-method: vipOnly
"#;
        let node: FilterNode = serde_yaml::from_str(yaml).unwrap();
        let expected = FilterNode::and([
            FilterNode::equals("status", "Active").ignore_case(),
            FilterNode::range("age", Some(18), None::<Value>),
            FilterNode::not(FilterNode::one_of("region", ["eu", "us"])),
            FilterNode::custom("rules", "vipOnly"),
        ]);
        assert_eq!(node, expected);
    }

    #[test]
    fn missing_value_means_null() {
        let node: FilterNode = serde_json::from_str(r#"{"type": "equals", "field": "x"}"#).unwrap();
        assert_eq!(node, FilterNode::equals("x", Value::Null));
    }

    #[test]
    fn null_range_bounds_are_absent() {
        let node: FilterNode =
            serde_json::from_str(r#"{"type": "range", "field": "x", "min": null, "max": 3}"#).unwrap();
        assert_eq!(node, FilterNode::range("x", None::<Value>, Some(3)));
    }

    #[test]
    fn type_tag_is_case_insensitive() {
        let yaml = r#"
type: OR
conditions:
  - { type: Equals, field: status, value: active }
  - { type: IS-NULL, field: status }
"#;
        let node: FilterNode = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            node,
            FilterNode::or([FilterNode::equals("status", "active"), FilterNode::is_null("status")])
        );

        let json = serde_json::to_value(FilterNode::not_equals("a", 1)).unwrap();
        assert_eq!(json["type"], "not-equals");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = serde_json::from_str::<FilterNode>(r#"{"type": "between", "field": "x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn check_reports_empty_leaf_field() {
        let node = FilterNode::or([FilterNode::is_null("a"), FilterNode::is_null(" ")]);
        assert_eq!(
            node.check().unwrap_err(),
            "is-null filter has an empty field name"
        );
        assert!(FilterNode::custom("", "op").check().is_err());
        assert!(FilterNode::and([]).check().is_ok());
    }
}
