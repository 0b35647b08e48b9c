//! Integration tests for the sub-agent registry.
//!
//! These go through `SubAgentRegistry::resolve` the same way the coordinator
//! does, so they cover name lookup, schema enforcement and the mock logic.

use carelink_agents::{SubAgent, SubAgentRegistry, AUTO_ASSIGNED, PATIENT_ID_FORMAT};
use carelink_common::{Arguments, CarelinkError, Outcome};

fn args(pairs: &[(&str, &str)]) -> Arguments {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn run(name: &str, pairs: &[(&str, &str)]) -> carelink_common::ExecutionReport {
    let registry = SubAgentRegistry::new();
    registry.resolve(name).unwrap().execute(&args(pairs))
}

// ============================================================================
// Identifier policy
// ============================================================================

#[test]
fn test_scheduler_without_patient_id_fails_with_format() {
    let report = run(
        "AppointmentScheduler",
        &[("action", "Book"), ("appointment_details", "Dental, Friday")],
    );
    assert_eq!(report.outcome, Outcome::ValidationFailure);
    assert!(report.message.contains(PATIENT_ID_FORMAT));
}

#[test]
fn test_registration_without_patient_id_is_auto_assigned() {
    let report = run("PatientManagement", &[("action", "New Registration")]);
    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(report.field("patient_id"), Some(AUTO_ASSIGNED));
}

#[test]
fn test_registration_with_bad_patient_id_cites_value() {
    let report = run(
        "PatientManagement",
        &[("action", "Update Info"), ("patient_id", "P12-45")],
    );
    assert_eq!(report.outcome, Outcome::ValidationFailure);
    assert!(report.message.contains("P12-45"));
    assert!(report.message.contains(PATIENT_ID_FORMAT));
}

#[test]
fn test_scheduler_rechecks_format_regardless_of_source() {
    // Lowercase prefix looks plausible to a resolver but is not the grammar.
    let report = run(
        "AppointmentScheduler",
        &[
            ("action", "Reschedule"),
            ("patient_id", "p12345"),
            ("appointment_details", "Next Tuesday"),
        ],
    );
    assert_eq!(report.outcome, Outcome::ValidationFailure);
}

// ============================================================================
// Happy paths
// ============================================================================

#[test]
fn test_every_sub_agent_succeeds_with_complete_arguments() {
    let cases: [(SubAgent, &[(&str, &str)]); 4] = [
        (
            SubAgent::PatientManagement,
            &[("action", "Check Data"), ("patient_id", "P11111")],
        ),
        (
            SubAgent::AppointmentScheduler,
            &[
                ("action", "Book"),
                ("patient_id", "P22222"),
                ("appointment_details", "Dr. Rina, 10:00"),
            ],
        ),
        (
            SubAgent::MedicalRecords,
            &[("patient_id", "P33333"), ("requested_summary_type", "Lab Results")],
        ),
        (
            SubAgent::BillingAndInsurance,
            &[("action", "Pay"), ("patient_id", "P44444")],
        ),
    ];

    for (agent, pairs) in cases {
        let report = run(agent.name(), pairs);
        assert_eq!(report.outcome, Outcome::Success, "{agent} should succeed");
        assert!(!report.message.is_empty());
    }
}

#[test]
fn test_execution_is_deterministic_apart_from_ticket() {
    let pairs = [
        ("action", "Book"),
        ("patient_id", "P12345"),
        ("appointment_details", "Cardiology"),
    ];
    let mut first = run("AppointmentScheduler", &pairs);
    let mut second = run("AppointmentScheduler", &pairs);
    first.fields.remove("queue_ticket");
    second.fields.remove("queue_ticket");
    assert_eq!(first.fields, second.fields);
}

// ============================================================================
// Registry lookups
// ============================================================================

#[test]
fn test_unknown_sub_agent_is_an_error_not_a_panic() {
    let registry = SubAgentRegistry::new();
    let result = registry.resolve("Radiology");
    assert!(matches!(result, Err(CarelinkError::UnknownSubAgent(_))));
}

#[test]
fn test_schemas_mark_required_fields() {
    let registry = SubAgentRegistry::new();
    let scheduler = registry.resolve("AppointmentScheduler").unwrap().schema();
    let required: Vec<_> = scheduler.required_names().collect();
    assert_eq!(required, vec!["action", "patient_id", "appointment_details"]);

    let registration = registry.resolve("PatientManagement").unwrap().schema();
    assert!(!registration.parameter("patient_id").unwrap().required);
}
