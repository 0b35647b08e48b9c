//! Parameter schemas declared by each sub-agent.
//!
//! Schemas are static: they are built from constants at startup and are what
//! the resolver sees when it decides which sub-agent to call.

use carelink_common::{Arguments, ExecutionReport};
use serde::Serialize;

/// Argument names shared by several sub-agents.
pub mod params {
    pub const ACTION: &str = "action";
    pub const PATIENT_ID: &str = "patient_id";
    pub const PATIENT_DETAILS: &str = "patient_details";
    pub const APPOINTMENT_DETAILS: &str = "appointment_details";
    pub const REQUESTED_SUMMARY_TYPE: &str = "requested_summary_type";
    pub const FINANCIAL_DETAILS: &str = "financial_details";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

impl ParameterSpec {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: false,
            description,
        }
    }
}

/// Declared interface of one sub-agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParameterSpec],
}

impl HandlerSchema {
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parameters.iter().filter(|p| p.required).map(|p| p.name)
    }

    /// Required parameters that are absent or blank in `args`.
    pub fn missing_required(&self, args: &Arguments) -> Vec<&'static str> {
        self.required_names()
            .filter(|name| argument(args, name).is_none())
            .collect()
    }

    /// Function-declaration style JSON schema, as sent to the resolver.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.to_string(),
                    serde_json::json!({ "type": "string", "description": p.description }),
                )
            })
            .collect();

        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": self.required_names().collect::<Vec<_>>(),
            }
        })
    }
}

/// Look up an argument, treating blank values as absent.
pub fn argument<'a>(args: &'a Arguments, name: &str) -> Option<&'a str> {
    args.get(name)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

/// Corrective report for arguments the schema requires but the call lacks.
pub(crate) fn missing_fields_report(schema: &HandlerSchema, missing: &[&str]) -> ExecutionReport {
    ExecutionReport::validation_failure(format!(
        "[ERROR] {} cannot proceed: missing required field(s): {}.\n\
         Please resubmit the request including this information.",
        schema.name,
        missing.join(", ")
    ))
    .with_field("missing", missing.join(","))
}
