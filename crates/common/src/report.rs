//! Sub-agent execution reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result class of a sub-agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    ValidationFailure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("SUCCESS"),
            Outcome::ValidationFailure => f.write_str("VALIDATION FAILURE"),
        }
    }
}

/// What a sub-agent hands back to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcome: Outcome,

    /// Human-readable narrative
    pub message: String,

    /// Named result values echoed back (patient id, action, ticket, ...)
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl ExecutionReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn validation_failure(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::ValidationFailure,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
