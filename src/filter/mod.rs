//! Feature Filter Module
//!
//! A filter is a tree: composite nodes join children with `and`/`or`,
//! leaf nodes compare one feature property against a value.
//!
//! The default filter is `and` over zero clauses, which accepts every
//! feature. `or` over zero clauses accepts none.

mod evaluate;

pub use evaluate::{filter_geojson, satisfies};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a composite node combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    And,
    Or,
}

/// Leaf comparison operator
///
/// Operator names outside the known set are kept verbatim as
/// [`Operator::Unknown`] and never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "notin",
            Self::Contains => "contains",
            Self::DoesNotContain => "doesnotcontain",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::IsNull => "isnull",
            Self::IsNotNull => "isnotnull",
            Self::IsEmpty => "isempty",
            Self::IsNotEmpty => "isnotempty",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "notin" => Self::NotIn,
            "contains" => Self::Contains,
            "doesnotcontain" => Self::DoesNotContain,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "isnull" => Self::IsNull,
            "isnotnull" => Self::IsNotNull,
            "isempty" => Self::IsEmpty,
            "isnotempty" => Self::IsNotEmpty,
            _ => Self::Unknown(name),
        }
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A node of the filter tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Composite {
        #[serde(alias = "logic")]
        condition: Condition,
        #[serde(default)]
        filters: Vec<FilterNode>,
    },
    Leaf {
        field: String,
        operator: Operator,
        #[serde(default)]
        value: Value,
    },
}

impl FilterNode {
    /// `and` over the given children
    pub fn all(filters: Vec<FilterNode>) -> Self {
        FilterNode::Composite {
            condition: Condition::And,
            filters,
        }
    }

    /// `or` over the given children
    pub fn any(filters: Vec<FilterNode>) -> Self {
        FilterNode::Composite {
            condition: Condition::Or,
            filters,
        }
    }

    /// A single property comparison
    pub fn leaf(field: impl Into<String>, operator: impl Into<Operator>, value: Value) -> Self {
        FilterNode::Leaf {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }

    /// True for the always-accepting default filter
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            FilterNode::Composite { condition: Condition::And, filters } if filters.is_empty()
        )
    }
}

impl Default for FilterNode {
    fn default() -> Self {
        FilterNode::all(Vec::new())
    }
}
