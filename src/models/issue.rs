//! Static analysis findings over the validation configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Contradiction,
    Redundancy,
    CircularDependency,
    UnreachableRule,
    ConflictingThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A structural defect in the rule configuration, produced once per load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub affected_rules: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, Value>,
}

impl ConsistencyIssue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        message: impl Into<String>,
        affected_rules: Vec<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            affected_rules,
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}
