//! Declarative rule specifications.
//!
//! Rules are parsed once at load time into an explicit sum type and never
//! mutated afterwards; evaluation pattern-matches over the variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Default comparison tolerance.
pub const DEFAULT_EPS: f64 = 1e-6;

fn default_eps() -> f64 {
    DEFAULT_EPS
}

/// Threshold comparison against a single context field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdOp {
    Lt,
    Gt,
    Eq,
}

/// Binary comparison between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

/// Operand of a binary comparison: a context key or a literal number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Literal(f64),
    Field(String),
}

/// Reference to a rule: either a name resolved against the rule table, or an
/// inline nested spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleRef {
    Named(String),
    Inline(Box<RuleSpec>),
}

impl RuleRef {
    /// Display label used in decision reasons and audit payloads.
    pub fn label(&self) -> String {
        match self {
            RuleRef::Named(name) => name.clone(),
            RuleRef::Inline(spec) => spec.label(),
        }
    }
}

/// Field-level overrides applied when resolving an [`RuleSpec::Alias`].
///
/// Only fields present here replace the base rule's values; the shared base
/// definition is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<ThresholdOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl RuleOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A single rule specification. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Compare `context[field]` against `value` using `op`, tolerant by `eps`.
    /// Optional `min`/`max` bounds further constrain the field to a band.
    FieldThreshold {
        field: String,
        op: ThresholdOp,
        value: f64,
        #[serde(default = "default_eps")]
        eps: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Compare two operands, each a context key or literal.
    BinaryCompare {
        op: CompareOp,
        left: Operand,
        right: Operand,
        #[serde(default = "default_eps")]
        eps: f64,
    },
    /// Passes iff every child passes. Vacuously true when empty.
    AllOf { children: Vec<RuleRef> },
    /// Passes iff at least one child passes. False when empty.
    AnyOf { children: Vec<RuleRef> },
    /// A named rule with field-level overrides applied on a copy of the base.
    Alias {
        name: String,
        #[serde(default, skip_serializing_if = "RuleOverrides::is_empty")]
        overrides: RuleOverrides,
    },
}

impl RuleSpec {
    /// Short label for reasons and issue messages.
    pub fn label(&self) -> String {
        match self {
            RuleSpec::FieldThreshold { field, op, value, .. } => {
                format!("{}_{:?}_{}", field, op, value).to_lowercase()
            }
            RuleSpec::BinaryCompare { .. } => "binary_compare".to_string(),
            RuleSpec::AllOf { .. } => "all_of".to_string(),
            RuleSpec::AnyOf { .. } => "any_of".to_string(),
            RuleSpec::Alias { name, .. } => name.clone(),
        }
    }

    /// Names directly referenced by this spec (aliases and named children).
    pub fn direct_dependencies(&self) -> Vec<String> {
        let mut deps = Vec::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut Vec<String>) {
        match self {
            RuleSpec::Alias { name, .. } => {
                if !deps.contains(name) {
                    deps.push(name.clone());
                }
            }
            RuleSpec::AllOf { children } | RuleSpec::AnyOf { children } => {
                for child in children {
                    match child {
                        RuleRef::Named(name) => {
                            if !deps.contains(name) {
                                deps.push(name.clone());
                            }
                        }
                        RuleRef::Inline(spec) => spec.collect_dependencies(deps),
                    }
                }
            }
            RuleSpec::FieldThreshold { .. } | RuleSpec::BinaryCompare { .. } => {}
        }
    }
}

/// Result of evaluating one rule spec against a context.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub passed: bool,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, Value>,
}

impl RuleOutcome {
    pub fn passed(value: Option<f64>) -> Self {
        Self { passed: true, value, meta: HashMap::new() }
    }

    pub fn failed(value: Option<f64>) -> Self {
        Self { passed: false, value, meta: HashMap::new() }
    }

    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }
}
