//! Patient management sub-agent - registration, contact updates, demographics.

use crate::identifier::{validate_patient_id, PATIENT_ID_FORMAT};
use crate::schema::{argument, missing_fields_report, params, HandlerSchema, ParameterSpec};
use carelink_common::{Arguments, ExecutionReport};

/// Marker stored in place of an identifier for new registrations.
pub const AUTO_ASSIGNED: &str = "to be auto-assigned";

const PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::required(
        params::ACTION,
        "Action to perform (e.g. 'New Registration', 'Update Info', 'Check Data')",
    ),
    ParameterSpec::optional(
        params::PATIENT_ID,
        "Patient ID. REQUIRED format: letter 'P' followed by 5 digits (e.g. P12345). \
         Leave empty for a new registration.",
    ),
    ParameterSpec::optional(
        params::PATIENT_DETAILS,
        "Patient details such as name, address, or the data to change.",
    ),
];

pub const SCHEMA: HandlerSchema = HandlerSchema {
    name: "PatientManagement",
    description: "Registers new patients, updates contact information, and retrieves \
                  basic demographic data.",
    parameters: PARAMETERS,
};

pub(crate) fn execute(args: &Arguments) -> ExecutionReport {
    let missing = SCHEMA.missing_required(args);
    if !missing.is_empty() {
        return missing_fields_report(&SCHEMA, &missing);
    }

    let patient_id = argument(args, params::PATIENT_ID);
    if let Some(id) = patient_id {
        if !validate_patient_id(id) {
            return ExecutionReport::validation_failure(format!(
                "[ERROR] Invalid patient ID format: \"{id}\".\n\
                 Please use the standard format: {PATIENT_ID_FORMAT}."
            ))
            .with_field(params::PATIENT_ID, id);
        }
    }

    let action = argument(args, params::ACTION).unwrap_or_default();
    let id_display = patient_id.unwrap_or(AUTO_ASSIGNED);
    let details = argument(args, params::PATIENT_DETAILS).unwrap_or("-");

    ExecutionReport::success(format!(
        "[SUCCESS] Patient data processed.\n\
         Action: {action}\n\
         Patient ID: {id_display}\n\
         Details: {details}\n\
         Status: Verified in the registration database."
    ))
    .with_field(params::ACTION, action)
    .with_field(params::PATIENT_ID, id_display)
    .with_field(params::PATIENT_DETAILS, details)
    .with_field("auto_assigned", patient_id.is_none().to_string())
}
