//! Appointment scheduler sub-agent - booking, rescheduling, cancellation.

use crate::identifier::{validate_patient_id, PATIENT_ID_FORMAT};
use crate::schema::{argument, missing_fields_report, params, HandlerSchema, ParameterSpec};
use carelink_common::{Arguments, ExecutionReport};

const PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::required(
        params::ACTION,
        "Kind of scheduling action (e.g. 'Book', 'Cancel', 'Reschedule')",
    ),
    ParameterSpec::required(
        params::PATIENT_ID,
        "Patient ID. REQUIRED format: letter 'P' followed by 5 digits (e.g. P12345).",
    ),
    ParameterSpec::required(
        params::APPOINTMENT_DETAILS,
        "Time, doctor, or clinic the appointment is for.",
    ),
];

pub const SCHEMA: HandlerSchema = HandlerSchema {
    name: "AppointmentScheduler",
    description: "Handles booking, rescheduling, or cancelling appointments.",
    parameters: PARAMETERS,
};

pub(crate) fn execute(args: &Arguments) -> ExecutionReport {
    // The identifier is checked first so a missing one gets the format hint.
    let patient_id = match argument(args, params::PATIENT_ID) {
        Some(id) if validate_patient_id(id) => id,
        other => {
            let shown = other.unwrap_or("(empty)");
            return ExecutionReport::validation_failure(format!(
                "[ERROR] Could not process the appointment. Patient ID is invalid or missing.\n\
                 Input: \"{shown}\"\n\
                 Correct format: {PATIENT_ID_FORMAT}."
            ))
            .with_field(params::PATIENT_ID, shown);
        }
    };

    let missing = SCHEMA.missing_required(args);
    if !missing.is_empty() {
        return missing_fields_report(&SCHEMA, &missing);
    }

    let action = argument(args, params::ACTION).unwrap_or_default();
    let details = argument(args, params::APPOINTMENT_DETAILS).unwrap_or_default();
    let ticket = queue_ticket();

    ExecutionReport::success(format!(
        "[CONFIRMED] Appointment arranged.\n\
         Action: {action}\n\
         Patient ID: {patient_id}\n\
         Details: {details}\n\
         Queue Ticket: {ticket}"
    ))
    .with_field(params::ACTION, action)
    .with_field(params::PATIENT_ID, patient_id)
    .with_field(params::APPOINTMENT_DETAILS, details)
    .with_field("queue_ticket", ticket)
}

/// `A-<n>` with `n` in `0..100`. The format is fixed, the number is not.
fn queue_ticket() -> String {
    use rand::Rng;

    let n = rand::thread_rng().gen_range(0..100);
    format!("A-{n}")
}
