//! Conversation entries produced by a turn.

use crate::report::ExecutionReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat argument map handed from the resolver to a sub-agent.
///
/// Ordered so that rendered reports and logs are stable.
pub type Arguments = BTreeMap<String, String>;

/// Who produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Coordinator,
    Handler,
}

/// Entry content: free text for people, a structured report for sub-agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntryBody {
    Text(String),
    Report(ExecutionReport),
}

impl EntryBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntryBody::Text(text) => Some(text),
            EntryBody::Report(_) => None,
        }
    }

    pub fn as_report(&self) -> Option<&ExecutionReport> {
        match self {
            EntryBody::Report(report) => Some(report),
            EntryBody::Text(_) => None,
        }
    }
}

/// One message in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Unique entry ID
    pub id: String,

    pub speaker: Speaker,

    pub body: EntryBody,

    /// Sub-agent that produced the entry (handler entries only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produced_by: Option<String>,

    /// Timestamp (Unix millis)
    pub created_at: u64,

    /// Exactly what was delegated (handler entries only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_arguments: Option<Arguments>,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, EntryBody::Text(text.into()), None, None)
    }

    pub fn coordinator(text: impl Into<String>) -> Self {
        Self::new(Speaker::Coordinator, EntryBody::Text(text.into()), None, None)
    }

    /// A report from a registered sub-agent.
    pub fn handler(
        sub_agent: impl Into<String>,
        arguments: Arguments,
        report: ExecutionReport,
    ) -> Self {
        Self::new(
            Speaker::Handler,
            EntryBody::Report(report),
            Some(sub_agent.into()),
            Some(arguments),
        )
    }

    /// A handler-style entry for a delegation that named no registered sub-agent.
    pub fn unattributed_report(arguments: Arguments, report: ExecutionReport) -> Self {
        Self::new(Speaker::Handler, EntryBody::Report(report), None, Some(arguments))
    }

    fn new(
        speaker: Speaker,
        body: EntryBody,
        produced_by: Option<String>,
        call_arguments: Option<Arguments>,
    ) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            speaker,
            body,
            produced_by,
            created_at: now_millis(),
            call_arguments,
        }
    }

    /// Plain text rendering, used for resolver context and simple front ends.
    pub fn text(&self) -> String {
        match &self.body {
            EntryBody::Text(text) => text.clone(),
            EntryBody::Report(report) => report.message.clone(),
        }
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Outcome;

    #[test]
    fn user_and_coordinator_entries_carry_no_handler_fields() {
        let user = ConversationEntry::user("Saya ingin daftar");
        let coord = ConversationEntry::coordinator("Mohon sebutkan ID pasien");

        assert_eq!(user.speaker, Speaker::User);
        assert_eq!(coord.speaker, Speaker::Coordinator);
        assert!(user.produced_by.is_none() && user.call_arguments.is_none());
        assert!(coord.produced_by.is_none() && coord.call_arguments.is_none());
        assert_eq!(user.body.as_text(), Some("Saya ingin daftar"));
        assert!(user.id.starts_with("msg_"));
        assert!(user.created_at > 0);
    }

    #[test]
    fn handler_entry_records_arguments() {
        let mut args = Arguments::new();
        args.insert("action".into(), "Cek Tagihan".into());
        let report = ExecutionReport::success("ok");

        let entry = ConversationEntry::handler("BillingAndInsurance", args.clone(), report);

        assert_eq!(entry.speaker, Speaker::Handler);
        assert_eq!(entry.produced_by.as_deref(), Some("BillingAndInsurance"));
        assert_eq!(entry.call_arguments, Some(args));
        assert_eq!(entry.body.as_report().map(|r| r.outcome), Some(Outcome::Success));
    }

    #[test]
    fn entry_ids_are_unique() {
        let a = ConversationEntry::user("a");
        let b = ConversationEntry::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn entry_serialization_skips_absent_fields() {
        let entry = ConversationEntry::coordinator("Halo");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["speaker"], "coordinator");
        assert_eq!(json["body"]["kind"], "text");
        assert!(json.get("produced_by").is_none());
        assert!(json.get("call_arguments").is_none());
    }
}
