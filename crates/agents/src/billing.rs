//! Billing and insurance sub-agent - invoices, payments, insurance claims.

use crate::schema::{argument, missing_fields_report, params, HandlerSchema, ParameterSpec};
use carelink_common::{Arguments, ExecutionReport};

const PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::required(
        params::ACTION,
        "Financial action (e.g. 'Check Bill', 'Pay', 'Insurance Claim').",
    ),
    ParameterSpec::required(params::PATIENT_ID, "Patient ID."),
    ParameterSpec::optional(
        params::FINANCIAL_DETAILS,
        "Amount or insurance policy number, if relevant.",
    ),
];

pub const SCHEMA: HandlerSchema = HandlerSchema {
    name: "BillingAndInsurance",
    description: "Handles billing questions, processes payments, issues invoices, and \
                  helps verify insurance claims.",
    parameters: PARAMETERS,
};

const PAYMENT_STATUS: &str = "PAID / CLAIM SUBMITTED";

pub(crate) fn execute(args: &Arguments) -> ExecutionReport {
    let missing = SCHEMA.missing_required(args);
    if !missing.is_empty() {
        return missing_fields_report(&SCHEMA, &missing);
    }

    let action = argument(args, params::ACTION).unwrap_or_default();
    let patient_id = argument(args, params::PATIENT_ID).unwrap_or_default();
    let details = argument(args, params::FINANCIAL_DETAILS).unwrap_or("-");

    ExecutionReport::success(format!(
        "[BILLING] Transaction processed.\n\
         Action: {action}\n\
         Patient ID: {patient_id}\n\
         Details: {details}\n\
         Payment Status: {PAYMENT_STATUS}."
    ))
    .with_field(params::ACTION, action)
    .with_field(params::PATIENT_ID, patient_id)
    .with_field(params::FINANCIAL_DETAILS, details)
    .with_field("payment_status", PAYMENT_STATUS)
}
