//! Medical records sub-agent - history, lab results, diagnoses, care plans.
//!
//! The identifier is not re-validated here; the schema already requires it.

use crate::schema::{argument, missing_fields_report, params, HandlerSchema, ParameterSpec};
use carelink_common::{Arguments, ExecutionReport};

const PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::required(params::PATIENT_ID, "Patient ID."),
    ParameterSpec::required(
        params::REQUESTED_SUMMARY_TYPE,
        "Kind of medical data requested (e.g. 'Lab Results', 'Diagnosis', 'History').",
    ),
];

pub const SCHEMA: HandlerSchema = HandlerSchema {
    name: "MedicalRecords",
    description: "Retrieves and summarizes medical history, lab results, diagnoses, \
                  and treatment plans.",
    parameters: PARAMETERS,
};

/// Which canned summary a request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryKind {
    LabResults,
    Diagnosis,
    TreatmentPlan,
    History,
}

impl SummaryKind {
    fn classify(requested: &str) -> Self {
        let lower = requested.to_lowercase();
        if lower.contains("lab") {
            Self::LabResults
        } else if lower.contains("diagnos") {
            Self::Diagnosis
        } else if lower.contains("treatment")
            || lower.contains("care plan")
            || lower.contains("perawatan")
        {
            Self::TreatmentPlan
        } else {
            Self::History
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Self::LabResults => {
                "Latest lab panel shows cholesterol within the normal range. \
                 No abnormal values flagged."
            }
            Self::Diagnosis => {
                "Active diagnosis: mild hypertension (recorded 2023), managed without complications."
            }
            Self::TreatmentPlan => {
                "Current plan: low-sodium diet, quarterly blood pressure review, \
                 no medication changes scheduled."
            }
            Self::History => {
                "Patient has a history of mild hypertension (2023). Latest lab results show \
                 normal cholesterol levels. No drug allergies on record."
            }
        }
    }
}

pub(crate) fn execute(args: &Arguments) -> ExecutionReport {
    let missing = SCHEMA.missing_required(args);
    if !missing.is_empty() {
        return missing_fields_report(&SCHEMA, &missing);
    }

    let patient_id = argument(args, params::PATIENT_ID).unwrap_or_default();
    let requested = argument(args, params::REQUESTED_SUMMARY_TYPE).unwrap_or_default();
    let summary = SummaryKind::classify(requested).summary();

    ExecutionReport::success(format!(
        "[CONFIDENTIAL] Medical record access granted.\n\
         Patient ID: {patient_id}\n\
         Data Type: {requested}\n\n\
         Summary: {summary}"
    ))
    .with_field(params::PATIENT_ID, patient_id)
    .with_field(params::REQUESTED_SUMMARY_TYPE, requested)
    .with_field("summary", summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn summary_is_keyed_by_requested_type() {
        let lab = execute(&args(&[
            ("patient_id", "P12345"),
            ("requested_summary_type", "Lab Results"),
        ]));
        let diagnosis = execute(&args(&[
            ("patient_id", "P12345"),
            ("requested_summary_type", "Diagnosis"),
        ]));

        assert!(lab.is_success() && diagnosis.is_success());
        assert_ne!(lab.field("summary"), diagnosis.field("summary"));
        assert!(lab.message.contains("cholesterol"));
    }

    #[test]
    fn identifier_format_is_not_rechecked() {
        let report = execute(&args(&[
            ("patient_id", "legacy-7"),
            ("requested_summary_type", "History"),
        ]));
        assert!(report.is_success());
        assert_eq!(report.field("patient_id"), Some("legacy-7"));
    }

    #[test]
    fn classify_falls_back_to_history() {
        assert_eq!(SummaryKind::classify("Riwayat"), SummaryKind::History);
        assert_eq!(SummaryKind::classify("hasil LAB"), SummaryKind::LabResults);
        assert_eq!(SummaryKind::classify("rencana perawatan"), SummaryKind::TreatmentPlan);
    }

    #[test]
    fn missing_summary_type_is_reported() {
        let report = execute(&args(&[("patient_id", "P12345")]));
        assert!(!report.is_success());
        assert_eq!(report.field("missing"), Some("requested_summary_type"));
    }
}
