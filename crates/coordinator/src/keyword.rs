//! Keyword-based intent resolver.
//!
//! Offline fallback used when no LLM is configured or the client cannot be
//! built. Deterministic: the same text always yields the same resolution.
//! Keyword tables cover English and Indonesian phrasing.

use crate::resolver::{IntentResolver, Resolution, ResolutionRequest};
use async_trait::async_trait;
use carelink_agents::schema::params;
use carelink_agents::{SubAgent, PATIENT_ID_FORMAT};
use carelink_common::{Arguments, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Anything shaped like an identifier, valid or not. Handlers do the real check.
static ID_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]\d{3,}\b").expect("identifier candidate pattern"));

/// Case-insensitive match of any alternative as a whole word.
/// Alternatives are regex fragments, so stems are written as `diagnos\w*`.
fn word_set(alternatives: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).expect("keyword table pattern")
}

// Routing tables, checked in order; the first table with a hit wins.
static SCHEDULER_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"appointments?",
        r"schedul\w*",
        r"reschedul\w*",
        r"book\w*",
        "janji",
        r"jadwal\w*",
        "temu",
        "bertemu",
        "pesan",
    ])
});
static RECORDS_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"records?",
        "history",
        r"labs?",
        "laboratory",
        r"diagnos\w*",
        r"test results?",
        "rekam medis",
        "riwayat",
        "hasil",
    ])
});
static BILLING_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"bill\w*",
        r"invoices?",
        r"payments?",
        r"pay(?:ing)?",
        "insurance",
        r"claims?",
        "tagihan",
        r"(?:mem)?bayar",
        "asuransi",
        "biaya",
    ])
});
static REGISTRATION_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"regist\w*",
        "new patient",
        r"updat\w*",
        "address",
        "phone",
        r"(?:men)?daftar",
        "pasien baru",
        "ubah",
        "alamat",
    ])
});

// Action and summary-type hints.
static UPDATE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[r"updat\w*", r"chang\w*", "ubah", "perbarui", "address", "alamat", "phone"])
});
static REGISTER_WORDS: LazyLock<Regex> =
    LazyLock::new(|| word_set(&[r"regist\w*", "new", r"(?:men)?daftar", "baru"]));
static CANCEL_WORDS: LazyLock<Regex> =
    LazyLock::new(|| word_set(&[r"cancel\w*", r"batal\w*", "membatalkan"]));
static RESCHEDULE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[r"reschedul\w*", "move", r"chang\w*", "ubah", r"pindah\w*"])
});
static CLAIM_WORDS: LazyLock<Regex> =
    LazyLock::new(|| word_set(&["insurance", r"claims?", "asuransi", "klaim"]));
static PAY_WORDS: LazyLock<Regex> =
    LazyLock::new(|| word_set(&[r"pay(?:ing|ment)?", r"(?:mem)?bayar"]));
static LAB_WORDS: LazyLock<Regex> = LazyLock::new(|| word_set(&[r"labs?", "laboratory", "hasil"]));
static DIAGNOSIS_WORDS: LazyLock<Regex> = LazyLock::new(|| word_set(&[r"diagnos\w*"]));
static TREATMENT_WORDS: LazyLock<Regex> =
    LazyLock::new(|| word_set(&[r"treatments?", "perawatan", "pengobatan"]));

const GENERIC_QUESTION: &str = "Could you tell me what you need help with? I can register \
    patients or update their data, book or change appointments, look up medical records, \
    and handle billing or insurance.";

/// Deterministic resolver driven by keyword tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordResolver;

impl KeywordResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve without going through the async trait.
    pub fn classify(&self, text: &str) -> Resolution {
        let Some(sub_agent) = detect_sub_agent(text) else {
            return Resolution::Clarification(GENERIC_QUESTION.to_string());
        };

        let patient_id = ID_CANDIDATE
            .find(text)
            .map(|m| m.as_str().to_uppercase());

        let mut arguments = Arguments::new();
        arguments.insert(params::ACTION.to_string(), derive_action(sub_agent, text).to_string());
        if let Some(id) = patient_id {
            arguments.insert(params::PATIENT_ID.to_string(), id);
        }

        match sub_agent {
            SubAgent::PatientManagement => {
                arguments.insert(params::PATIENT_DETAILS.to_string(), text.trim().to_string());
            }
            SubAgent::AppointmentScheduler => {
                arguments.insert(params::APPOINTMENT_DETAILS.to_string(), text.trim().to_string());
            }
            SubAgent::MedicalRecords => {
                arguments.insert(
                    params::REQUESTED_SUMMARY_TYPE.to_string(),
                    summary_type(text).to_string(),
                );
            }
            SubAgent::BillingAndInsurance => {
                arguments.insert(params::FINANCIAL_DETAILS.to_string(), text.trim().to_string());
            }
        }

        // Ask instead of delegating when the schema cannot be filled.
        let missing = sub_agent.schema().missing_required(&arguments);
        if let Some(first) = missing.first() {
            debug!(sub_agent = %sub_agent, missing = ?missing, "Keyword resolver needs more input");
            return Resolution::Clarification(question_for(sub_agent, first));
        }

        Resolution::Delegation {
            sub_agent: sub_agent.name().to_string(),
            arguments,
        }
    }
}

#[async_trait]
impl IntentResolver for KeywordResolver {
    async fn resolve(&self, request: &ResolutionRequest) -> Result<Resolution> {
        Ok(self.classify(&request.user_text))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

fn detect_sub_agent(text: &str) -> Option<SubAgent> {
    if SCHEDULER_KEYWORDS.is_match(text) {
        Some(SubAgent::AppointmentScheduler)
    } else if RECORDS_KEYWORDS.is_match(text) {
        Some(SubAgent::MedicalRecords)
    } else if BILLING_KEYWORDS.is_match(text) {
        Some(SubAgent::BillingAndInsurance)
    } else if REGISTRATION_KEYWORDS.is_match(text) {
        Some(SubAgent::PatientManagement)
    } else {
        None
    }
}

fn derive_action(sub_agent: SubAgent, text: &str) -> &'static str {
    match sub_agent {
        SubAgent::PatientManagement => {
            if UPDATE_WORDS.is_match(text) {
                "Update"
            } else if REGISTER_WORDS.is_match(text) {
                "Register"
            } else {
                "Inquiry"
            }
        }
        SubAgent::AppointmentScheduler => {
            if CANCEL_WORDS.is_match(text) {
                "Cancel"
            } else if RESCHEDULE_WORDS.is_match(text) {
                "Reschedule"
            } else {
                "Book"
            }
        }
        SubAgent::MedicalRecords => "Retrieve",
        SubAgent::BillingAndInsurance => {
            if CLAIM_WORDS.is_match(text) {
                "Insurance Claim"
            } else if PAY_WORDS.is_match(text) {
                "Pay"
            } else {
                "Check Bill"
            }
        }
    }
}

fn summary_type(text: &str) -> &'static str {
    if LAB_WORDS.is_match(text) {
        "Lab Results"
    } else if DIAGNOSIS_WORDS.is_match(text) {
        "Diagnosis"
    } else if TREATMENT_WORDS.is_match(text) {
        "Treatment"
    } else {
        "History"
    }
}

fn question_for(sub_agent: SubAgent, field: &str) -> String {
    if field == params::PATIENT_ID {
        format!(
            "To continue with {sub_agent}, I need the patient ID. \
             Please provide it as {PATIENT_ID_FORMAT}."
        )
    } else {
        format!("To continue with {sub_agent}, please tell me the {field}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_agents::SubAgentRegistry;

    fn delegation(text: &str) -> (String, Arguments) {
        match KeywordResolver::new().classify(text) {
            Resolution::Delegation { sub_agent, arguments } => (sub_agent, arguments),
            other => panic!("expected delegation for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn booking_with_id_delegates_to_scheduler() {
        let (agent, args) = delegation("Please book an appointment for P12345 with Dr. Sari on Monday");
        assert_eq!(agent, "AppointmentScheduler");
        assert_eq!(args["patient_id"], "P12345");
        assert_eq!(args["action"], "Book");
        assert!(args["appointment_details"].contains("Dr. Sari"));
    }

    #[test]
    fn booking_without_id_asks_for_it() {
        let Resolution::Clarification(question) =
            KeywordResolver::new().classify("I want to book an appointment tomorrow")
        else {
            panic!("expected clarification");
        };
        assert!(question.contains("patient ID"));
        assert!(question.contains("P12345"));
    }

    #[test]
    fn malformed_id_is_still_delegated() {
        // Format validation belongs to the handler.
        let (agent, args) = delegation("cancel appointment for p123");
        assert_eq!(agent, "AppointmentScheduler");
        assert_eq!(args["patient_id"], "P123");
        assert_eq!(args["action"], "Cancel");
    }

    #[test]
    fn registration_does_not_require_id() {
        let (agent, args) = delegation("I'd like to register as a new patient, name Budi");
        assert_eq!(agent, "PatientManagement");
        assert_eq!(args["action"], "Register");
        assert!(!args.contains_key("patient_id"));
    }

    #[test]
    fn indonesian_phrasing_is_recognized() {
        let (agent, args) = delegation("Tolong cek tagihan pasien P54321");
        assert_eq!(agent, "BillingAndInsurance");
        assert_eq!(args["action"], "Check Bill");

        let (agent, args) = delegation("Saya mau lihat hasil lab P11111");
        assert_eq!(agent, "MedicalRecords");
        assert_eq!(args["requested_summary_type"], "Lab Results");
    }

    #[test]
    fn insurance_maps_to_claim_action() {
        let (_, args) = delegation("Submit an insurance claim for P22222, policy AXA-991");
        assert_eq!(args["action"], "Insurance Claim");
    }

    #[test]
    fn keywords_match_whole_words_only() {
        for text in [
            "Is the doctor available Monday?",
            "Can you print a label for P12345?",
            "I need to repay my friend",
        ] {
            assert_eq!(
                KeywordResolver::new().classify(text),
                Resolution::Clarification(GENERIC_QUESTION.to_string()),
                "{text:?}"
            );
        }
    }

    #[test]
    fn stems_still_match_inflections() {
        let (agent, args) = delegation("Rescheduling P12345 to Friday please");
        assert_eq!(agent, "AppointmentScheduler");
        assert_eq!(args["action"], "Reschedule");

        let (agent, _) = delegation("What were the diagnoses for P12345?");
        assert_eq!(agent, "MedicalRecords");
    }

    #[test]
    fn unrelated_text_gets_generic_question() {
        assert_eq!(
            KeywordResolver::new().classify("hello there"),
            Resolution::Clarification(GENERIC_QUESTION.to_string())
        );
    }

    #[tokio::test]
    async fn resolves_through_trait() {
        let registry = SubAgentRegistry::new();
        let request = ResolutionRequest::new("diagnosis for P12345", Vec::new(), &registry);
        let resolution = KeywordResolver::new().resolve(&request).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::Delegation { ref sub_agent, ref arguments }
                if sub_agent == "MedicalRecords" && arguments["requested_summary_type"] == "Diagnosis"
        ));
    }
}
