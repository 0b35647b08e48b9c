//! Intent resolver contract.
//!
//! The resolver is the one external capability the coordinator depends on:
//! given the user's text, some conversation context and the sub-agent
//! schemas, it either asks a clarifying question or picks exactly one
//! sub-agent and extracts its arguments. How it decides is not our concern;
//! what it may answer is.

use async_trait::async_trait;
use carelink_agents::{HandlerSchema, SubAgentRegistry};
use carelink_common::{Arguments, ConversationEntry, Result, Speaker};
use serde::Serialize;

/// Delegation rules handed to the resolver with every request.
pub const SYSTEM_POLICY: &str = r#"You are the Central Coordinator of an integrated hospital information desk. Your job is to analyse every user request critically and pin down what the user actually wants.

MAIN ROLE: delegate each request EXCLUSIVELY to ONE sub-agent from the list provided.

STRICT DELEGATION RULES:
1. Choose EXACTLY ONE sub-agent per request, never more.
2. NEVER answer a domain question yourself when a sub-agent covers it.
3. Extract ALL relevant details and parameters from the user's request into the call arguments.
4. If information required by the chosen sub-agent is missing (for example the patient ID), do NOT delegate. Ask a specific, clear question for exactly what is missing.
5. PATIENT ID FORMAT: a patient ID is the letter 'P' followed by exactly 5 digits (example: P12345).

Available sub-agents:
- PatientManagement: registration, data updates, demographic information.
- AppointmentScheduler: booking, cancelling, rescheduling appointments.
- MedicalRecords: medical history, lab results, diagnoses.
- BillingAndInsurance: finances, bills, insurance."#;

/// What the resolver decided for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not enough information; ask the user this.
    Clarification(String),
    /// Route to a single sub-agent. The name is unchecked at this point.
    Delegation {
        sub_agent: String,
        arguments: Arguments,
    },
}

/// A prior log entry as the resolver sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextLine {
    pub speaker: Speaker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_agent: Option<String>,
    pub text: String,
}

impl From<&ConversationEntry> for ContextLine {
    fn from(entry: &ConversationEntry) -> Self {
        Self {
            speaker: entry.speaker,
            sub_agent: entry.produced_by.clone(),
            text: entry.text(),
        }
    }
}

/// Everything the resolver receives for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionRequest {
    pub user_text: String,
    pub context: Vec<ContextLine>,
    pub policy: &'static str,
    pub schemas: Vec<&'static HandlerSchema>,
}

impl ResolutionRequest {
    pub fn new(
        user_text: impl Into<String>,
        context: Vec<ContextLine>,
        registry: &SubAgentRegistry,
    ) -> Self {
        Self {
            user_text: user_text.into(),
            context,
            policy: SYSTEM_POLICY,
            schemas: registry.schemas(),
        }
    }
}

/// Turns free text into a clarification or a single delegation.
///
/// Errors are split by cause: `ResolverTransport`/`LlmStatus` when the
/// remote capability could not be reached, `ResolverContract` when it
/// answered with something that is neither variant.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    async fn resolve(&self, request: &ResolutionRequest) -> Result<Resolution>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
